//! Swap the sink of a running pipeline every second.
//!
//! ```text
//! videotestsrc ! fakesink
//!        ⇅  (pad blocked while swapping)
//! videotestsrc ! videoconvert ! <video sink>
//! ```
//!
//! Run with: cargo run --example dynamic_pipeline_switch -- --interval 1000

use clap::{Arg, Command};
use parallax_gst::config::Config;
use parallax_gst::error::Result;
use parallax_gst::pipeline::{PipelineGuard, builder, run_pipeline};
use parallax_gst::probe::SinkSwitcher;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parallax_gst=info")),
        )
        .init();

    let matches = Command::new("dynamic_pipeline_switch")
        .about("Toggle between a fake sink and a display sink while playing")
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("MILLISECONDS")
                .help("Time between switches")
                .value_parser(clap::value_parser!(u64))
                .default_value("1000"),
        )
        .get_matches();
    let interval = Duration::from_millis(matches.get_one::<u64>("interval").copied().unwrap_or(1000));

    parallax_gst::init()?;
    let config = Config::from_env();
    let pipeline = PipelineGuard::new();

    let videotestsrc = builder::add_new_element(&*pipeline, "videotestsrc")?;
    builder::set_live(&videotestsrc);

    let switcher = SinkSwitcher::new(&pipeline, &videotestsrc, config.video_sink.clone())?;

    let _toggler = thread::spawn(move || {
        loop {
            thread::sleep(interval);
            println!("switch (currently {:?})", switcher.current());
            if let Err(e) = switcher.request_toggle() {
                tracing::error!("switch request failed: {}", e);
                return;
            }
        }
    });

    run_pipeline(&pipeline)?;
    Ok(())
}
