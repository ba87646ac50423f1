//! Play/pause/seek control of a running pipeline.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pipeline::{ElementStatus, status_of_all};
use gst::prelude::*;

/// Parameters of a time based seek.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekPlan {
    /// Playback rate; negative plays backwards.
    pub rate: f64,
    /// Seek flags.
    pub flags: gst::SeekFlags,
    /// How `start` is interpreted.
    pub start_type: gst::SeekType,
    /// Segment start.
    pub start: gst::ClockTime,
    /// How `stop` is interpreted.
    pub stop_type: gst::SeekType,
    /// Segment stop.
    pub stop: gst::ClockTime,
}

impl SeekPlan {
    /// Plan a flushing key-unit seek to `position` at `rate`.
    ///
    /// Forward playback starts at `position` and runs to the end of the
    /// stream. Reverse playback starts at `position` and runs back to zero,
    /// which the engine expresses as the segment `[0, position]`.
    pub fn new(rate: f64, position: gst::ClockTime) -> Self {
        let flags = gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT;
        if rate > 0.0 {
            Self {
                rate,
                flags,
                start_type: gst::SeekType::Set,
                start: position,
                stop_type: gst::SeekType::End,
                stop: gst::ClockTime::ZERO,
            }
        } else {
            Self {
                rate,
                flags,
                start_type: gst::SeekType::Set,
                start: gst::ClockTime::ZERO,
                stop_type: gst::SeekType::Set,
                stop: position,
            }
        }
    }

    /// Build the seek event.
    pub fn to_event(&self) -> gst::Event {
        gst::event::Seek::new(
            self.rate,
            self.flags,
            self.start_type,
            self.start,
            self.stop_type,
            self.stop,
        )
    }
}

/// Operations the command line drives.
///
/// Positions are whole seconds.
pub trait PlaybackControl {
    /// Start or resume playback.
    fn play(&mut self) -> Result<()>;
    /// Pause playback.
    fn pause(&mut self) -> Result<()>;
    /// Current position.
    fn position(&mut self) -> Result<u64>;
    /// Seek to an absolute position.
    fn seek_abs(&mut self, secs: u64) -> Result<()>;
    /// Seek relative to the current position.
    fn seek_rel(&mut self, diff: i64) -> Result<()>;
    /// Change the rate used by subsequent seeks.
    fn set_rate(&mut self, rate: f64) -> Result<()>;
    /// One line per element describing its state.
    fn status(&mut self) -> Result<Vec<String>>;
}

/// Controls a pipeline built elsewhere.
#[derive(Debug, Clone)]
pub struct Player {
    pipeline: gst::Pipeline,
    rate: f64,
    state_timeout: gst::ClockTime,
}

impl Player {
    /// Control `pipeline` at normal rate.
    pub fn new(pipeline: &gst::Pipeline) -> Self {
        Self {
            pipeline: pipeline.clone(),
            rate: 1.0,
            state_timeout: Config::default().state_timeout,
        }
    }

    /// Use `timeout` for the per-element state queries of [`Self::element_status`].
    pub fn with_state_timeout(mut self, timeout: gst::ClockTime) -> Self {
        self.state_timeout = timeout;
        self
    }

    /// Rate used for seeks.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Request a state change.
    ///
    /// Succeeds if the engine completed the change or will complete it
    /// asynchronously.
    pub fn set_state(&self, state: gst::State) -> Result<()> {
        match self.pipeline.set_state(state) {
            Ok(gst::StateChangeSuccess::Success) | Ok(gst::StateChangeSuccess::Async) => Ok(()),
            _ => Err(Error::StateChange {
                element: self.pipeline.name().to_string(),
                state,
            }),
        }
    }

    /// Current position in seconds.
    pub fn query_position(&self) -> Result<u64> {
        self.pipeline
            .query_position::<gst::ClockTime>()
            .map(|pos| pos.seconds())
            .ok_or(Error::Query)
    }

    /// Element states of the whole pipeline.
    pub fn element_status(&self) -> Result<Vec<ElementStatus>> {
        status_of_all(&self.pipeline, self.state_timeout)
    }
}

impl PlaybackControl for Player {
    fn play(&mut self) -> Result<()> {
        self.set_state(gst::State::Playing)
    }

    fn pause(&mut self) -> Result<()> {
        self.set_state(gst::State::Paused)
    }

    fn position(&mut self) -> Result<u64> {
        self.query_position()
    }

    fn seek_abs(&mut self, secs: u64) -> Result<()> {
        let position = gst::ClockTime::SECOND
            .checked_mul(secs)
            .ok_or(Error::SeekOutOfRange(secs))?;
        let plan = SeekPlan::new(self.rate, position);
        tracing::debug!("seek {:?}", plan);
        if self.pipeline.send_event(plan.to_event()) {
            Ok(())
        } else {
            Err(Error::Seek(position))
        }
    }

    fn seek_rel(&mut self, diff: i64) -> Result<()> {
        let pos = self.query_position()?;
        let target = pos.saturating_add_signed(diff);
        self.seek_abs(target)
    }

    fn set_rate(&mut self, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate == 0.0 {
            return Err(Error::command(format!("invalid rate {rate}")));
        }
        self.rate = rate;
        Ok(())
    }

    fn status(&mut self) -> Result<Vec<String>> {
        Ok(self
            .element_status()?
            .iter()
            .map(ToString::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_plan() {
        let plan = SeekPlan::new(1.0, gst::ClockTime::from_seconds(12));
        assert_eq!(plan.start_type, gst::SeekType::Set);
        assert_eq!(plan.start, gst::ClockTime::from_seconds(12));
        assert_eq!(plan.stop_type, gst::SeekType::End);
        assert_eq!(plan.stop, gst::ClockTime::ZERO);
        assert!(plan.flags.contains(gst::SeekFlags::FLUSH));
        assert!(plan.flags.contains(gst::SeekFlags::KEY_UNIT));
    }

    #[test]
    fn test_reverse_plan() {
        let plan = SeekPlan::new(-2.0, gst::ClockTime::from_seconds(30));
        assert_eq!(plan.start_type, gst::SeekType::Set);
        assert_eq!(plan.start, gst::ClockTime::ZERO);
        assert_eq!(plan.stop_type, gst::SeekType::Set);
        assert_eq!(plan.stop, gst::ClockTime::from_seconds(30));
        assert_eq!(plan.rate, -2.0);
    }

    #[test]
    fn test_seek_event_fields() {
        gst::init().unwrap();
        let event = SeekPlan::new(1.0, gst::ClockTime::from_seconds(5)).to_event();
        let gst::EventView::Seek(seek) = event.view() else {
            panic!("not a seek event");
        };
        let (rate, flags, start_type, start, stop_type, _stop) = seek.get();
        assert_eq!(rate, 1.0);
        assert!(flags.contains(gst::SeekFlags::FLUSH));
        assert_eq!(start_type, gst::SeekType::Set);
        assert_eq!(stop_type, gst::SeekType::End);
        assert_eq!(
            start,
            gst::GenericFormattedValue::from(gst::ClockTime::from_seconds(5))
        );
    }

    #[test]
    fn test_seek_beyond_clock_range_is_an_error() {
        gst::init().unwrap();
        let mut player = Player::new(&gst::Pipeline::new());
        assert!(matches!(
            player.seek_abs(u64::MAX),
            Err(Error::SeekOutOfRange(u64::MAX))
        ));
        assert!(matches!(
            player.seek_abs(18_446_744_074),
            Err(Error::SeekOutOfRange(_))
        ));
    }

    #[test]
    fn test_state_timeout_follows_config() {
        gst::init().unwrap();
        let config = Config::default().with_state_timeout(gst::ClockTime::from_mseconds(5));
        let player =
            Player::new(&gst::Pipeline::new()).with_state_timeout(config.state_timeout);
        assert_eq!(player.state_timeout, gst::ClockTime::from_mseconds(5));
        assert!(player.element_status().unwrap().is_empty());
    }

    #[test]
    fn test_set_rate_validation() {
        gst::init().unwrap();
        let mut player = Player::new(&gst::Pipeline::new());
        assert!(player.set_rate(0.0).is_err());
        assert!(player.set_rate(f64::NAN).is_err());
        player.set_rate(-1.0).unwrap();
        assert_eq!(player.rate(), -1.0);
    }
}
