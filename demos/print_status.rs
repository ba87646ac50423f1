//! Element state dump of a running pipeline.
//!
//! Builds the test pattern pipeline, plays it for a moment and prints the
//! state of every element, then prints it again after pausing.
//!
//! Run with: cargo run --example print_status -- --seconds 2

use clap::{Arg, Command};
use parallax_gst::config::Config;
use parallax_gst::error::Result;
use parallax_gst::pipeline::{PipelineGuard, builder, print_status_of_all};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parallax_gst=info")),
        )
        .init();

    let matches = Command::new("print_status")
        .about("Print element states of a live test pipeline")
        .arg(
            Arg::new("seconds")
                .short('s')
                .long("seconds")
                .value_name("SECONDS")
                .help("How long to play before dumping states")
                .value_parser(clap::value_parser!(u64))
                .default_value("1"),
        )
        .get_matches();
    let seconds = matches.get_one::<u64>("seconds").copied().unwrap_or(1);

    parallax_gst::init()?;
    let config = Config::from_env();

    let pipeline = PipelineGuard::new();
    let videotestsrc = builder::add_new_element(&*pipeline, "videotestsrc")?;
    let videoconvert = builder::add_new_element(&*pipeline, "videoconvert")?;
    let videosink = builder::add_new_element(&*pipeline, &config.video_sink)?;
    builder::set_live(&videotestsrc);
    builder::set_async(&videosink, false);
    builder::link_many(&[&videotestsrc, &videoconvert, &videosink])?;

    println!("--- before start ---");
    print_status_of_all(&*pipeline, config.state_timeout)?;

    builder::set_state(&*pipeline, gst::State::Playing)?;
    thread::sleep(Duration::from_secs(seconds));
    println!("--- playing ---");
    print_status_of_all(&*pipeline, config.state_timeout)?;

    builder::set_state(&*pipeline, gst::State::Paused)?;
    println!("--- paused ---");
    print_status_of_all(&*pipeline, config.state_timeout)?;

    Ok(())
}
