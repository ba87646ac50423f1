//! Line oriented command interface for [`PlaybackControl`].
//!
//! ```text
//! > seek 30      absolute seek, seconds
//! > seek +5      relative seek forward
//! > seek -5      relative seek backward
//! > play | pause
//! > pos          prints the position, e.g. "12s"
//! > rate -1      rate used by the next seek
//! > status       element states
//! > exit
//! ```

use crate::error::{Error, Result};
use crate::player::PlaybackControl;
use std::io::{BufRead, Write};

/// Split a line into words the way a POSIX shell would.
///
/// Whitespace separates words. Single quotes keep everything literally,
/// double quotes keep whitespace but honour backslash escapes, and a
/// backslash outside quotes escapes the next character. An unterminated
/// quote runs to the end of the line.
pub fn split_like_shell(line: &str) -> Vec<String> {
    #[derive(PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Seek to an absolute position in seconds.
    SeekAbs(u64),
    /// Seek relative to the current position in seconds.
    SeekRel(i64),
    /// Resume playback.
    Play,
    /// Pause playback.
    Pause,
    /// Print the position.
    Position,
    /// Set the rate for subsequent seeks.
    Rate(f64),
    /// Print element states.
    Status,
    /// Leave the command loop.
    Exit,
}

impl Command {
    /// Parse already split words.
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some(command) = args.first() else {
            return Err(Error::command("empty command"));
        };
        match command.as_str() {
            "seek" => {
                let [_, time] = args else {
                    return Err(Error::command("usage: seek <SECONDS|+SECONDS|-SECONDS>"));
                };
                if time.starts_with('+') || time.starts_with('-') {
                    let digits = time.strip_prefix('+').unwrap_or(time);
                    digits
                        .parse::<i64>()
                        .map(Command::SeekRel)
                        .map_err(|_| Error::command(format!("invalid offset '{time}'")))
                } else {
                    time.parse::<u64>()
                        .map(Command::SeekAbs)
                        .map_err(|_| Error::command(format!("invalid position '{time}'")))
                }
            }
            "rate" => {
                let [_, rate] = args else {
                    return Err(Error::command("usage: rate <RATE>"));
                };
                rate.parse::<f64>()
                    .map(Command::Rate)
                    .map_err(|_| Error::command(format!("invalid rate '{rate}'")))
            }
            "play" => Ok(Command::Play),
            "pause" => Ok(Command::Pause),
            "pos" => Ok(Command::Position),
            "status" => Ok(Command::Status),
            "exit" => Ok(Command::Exit),
            _ => Err(Error::command("unknown command")),
        }
    }

    /// Run the command against `control`, writing any output to `out`.
    pub fn execute(&self, control: &mut impl PlaybackControl, out: &mut impl Write) -> Result<()> {
        match *self {
            Command::SeekAbs(secs) => control.seek_abs(secs),
            Command::SeekRel(diff) => control.seek_rel(diff),
            Command::Play => control.play(),
            Command::Pause => control.pause(),
            Command::Position => {
                let pos = control.position()?;
                writeln!(out, "{}s", pos)?;
                Ok(())
            }
            Command::Rate(rate) => control.set_rate(rate),
            Command::Status => {
                for line in control.status()? {
                    writeln!(out, "{}", line)?;
                }
                Ok(())
            }
            Command::Exit => Ok(()),
        }
    }
}

/// Read-eval-print loop over a [`PlaybackControl`].
pub struct Repl<C> {
    control: C,
    prompt: String,
}

impl<C: PlaybackControl> Repl<C> {
    /// Create a loop driving `control`.
    pub fn new(control: C) -> Self {
        Self {
            control,
            prompt: "> ".to_string(),
        }
    }

    /// Replace the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Borrow the controlled object.
    pub fn control(&self) -> &C {
        &self.control
    }

    /// Process lines from `input` until end of input or `exit`.
    ///
    /// Successful commands are acknowledged with `done`. Failing commands
    /// are logged and the loop continues.
    pub fn run(&mut self, mut input: impl BufRead, mut out: impl Write) -> Result<()> {
        let mut line = String::new();
        loop {
            write!(out, "{}", self.prompt)?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let args = split_like_shell(&line);
            if args.is_empty() {
                continue;
            }

            let command = match Command::parse(&args) {
                Ok(Command::Exit) => return Ok(()),
                Ok(command) => command,
                Err(e) => {
                    tracing::error!("{}", e);
                    continue;
                }
            };
            match command.execute(&mut self.control, &mut out) {
                Ok(()) => writeln!(out, "done")?,
                Err(e) => tracing::error!("{:?} failed: {}", command, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        split_like_shell(line)
    }

    #[test]
    fn test_split_plain() {
        assert_eq!(words("seek  +10 "), vec!["seek", "+10"]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn test_split_quotes() {
        assert_eq!(words(r#"open "my file.mp4""#), vec!["open", "my file.mp4"]);
        assert_eq!(words("a 'b \\ c' d"), vec!["a", "b \\ c", "d"]);
        assert_eq!(words(r#"x"y z"w"#), vec!["xy zw"]);
        assert_eq!(words("''"), vec![""]);
    }

    #[test]
    fn test_split_escapes() {
        assert_eq!(words(r"a\ b c"), vec!["a b", "c"]);
        assert_eq!(words(r#""say \"hi\"""#), vec![r#"say "hi""#]);
    }

    #[test]
    fn test_split_unterminated_quote() {
        assert_eq!(words("seek 'abc"), vec!["seek", "abc"]);
    }

    fn parse(line: &str) -> Result<Command> {
        Command::parse(&split_like_shell(line))
    }

    #[test]
    fn test_parse_seek() {
        assert_eq!(parse("seek 30").unwrap(), Command::SeekAbs(30));
        assert_eq!(parse("seek +5").unwrap(), Command::SeekRel(5));
        assert_eq!(parse("seek -5").unwrap(), Command::SeekRel(-5));
        assert!(parse("seek").is_err());
        assert!(parse("seek 1 2").is_err());
        assert!(parse("seek abc").is_err());
        assert!(parse("seek +").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("play").unwrap(), Command::Play);
        assert_eq!(parse("pause").unwrap(), Command::Pause);
        assert_eq!(parse("pos").unwrap(), Command::Position);
        assert_eq!(parse("status").unwrap(), Command::Status);
        assert_eq!(parse("exit").unwrap(), Command::Exit);
        assert_eq!(parse("rate -1.5").unwrap(), Command::Rate(-1.5));
    }

    #[test]
    fn test_parse_unknown() {
        let err = parse("rewind").unwrap_err();
        assert_eq!(err.to_string(), "invalid command: unknown command");
    }

    /// Records calls instead of touching a pipeline.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        position: u64,
        fail_seek: bool,
    }

    impl PlaybackControl for Recorder {
        fn play(&mut self) -> Result<()> {
            self.calls.push("play".into());
            Ok(())
        }
        fn pause(&mut self) -> Result<()> {
            self.calls.push("pause".into());
            Ok(())
        }
        fn position(&mut self) -> Result<u64> {
            Ok(self.position)
        }
        fn seek_abs(&mut self, secs: u64) -> Result<()> {
            if self.fail_seek {
                return Err(Error::Seek(gst::ClockTime::from_seconds(secs)));
            }
            self.calls.push(format!("seek_abs {secs}"));
            self.position = secs;
            Ok(())
        }
        fn seek_rel(&mut self, diff: i64) -> Result<()> {
            self.calls.push(format!("seek_rel {diff}"));
            self.position = self.position.saturating_add_signed(diff);
            Ok(())
        }
        fn set_rate(&mut self, rate: f64) -> Result<()> {
            self.calls.push(format!("rate {rate}"));
            Ok(())
        }
        fn status(&mut self) -> Result<Vec<String>> {
            Ok(vec!["GstFakeSink(sink) state=PLAYING pending=VOID_PENDING".into()])
        }
    }

    fn run(control: Recorder, input: &str) -> (Recorder, String) {
        let mut repl = Repl::new(control);
        let mut out = Vec::new();
        repl.run(input.as_bytes(), &mut out).unwrap();
        (repl.control, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_repl_session() {
        let (rec, out) = run(Recorder::default(), "play\nseek 10\nseek -3\npos\npause\n");
        assert_eq!(
            rec.calls,
            vec!["play", "seek_abs 10", "seek_rel -3", "pause"]
        );
        assert_eq!(out, "> done\n> done\n> done\n> 7s\ndone\n> done\n> ");
    }

    #[test]
    fn test_repl_exit_stops_reading() {
        let (rec, out) = run(Recorder::default(), "play\nexit\npause\n");
        assert_eq!(rec.calls, vec!["play"]);
        assert_eq!(out, "> done\n> ");
    }

    #[test]
    fn test_repl_skips_blank_and_bad_lines() {
        let (rec, out) = run(Recorder::default(), "\n   \nbogus\nseek\nplay\n");
        assert_eq!(rec.calls, vec!["play"]);
        assert_eq!(out, "> > > > > done\n> ");
    }

    #[test]
    fn test_repl_failed_command_has_no_done() {
        let control = Recorder {
            fail_seek: true,
            ..Default::default()
        };
        let (_, out) = run(control, "seek 4\n");
        assert_eq!(out, "> > ");
    }

    #[test]
    fn test_repl_status_and_prompt() {
        let mut repl = Repl::new(Recorder::default()).with_prompt("$ ");
        let mut out = Vec::new();
        repl.run("status\n".as_bytes(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "$ GstFakeSink(sink) state=PLAYING pending=VOID_PENDING\ndone\n$ "
        );
    }
}
