//! Interactive player for an MP4 file.
//!
//! ```text
//! filesrc ! qtdemux ~video_N~> avdec_h264 ! videoconvert ! <video sink>
//! ```
//!
//! Commands: `seek 30`, `seek +5`, `seek -5`, `play`, `pause`, `pos`,
//! `rate -1`, `status`, `exit`.
//!
//! Run with: cargo run --example seek -- /path/to/video.mp4

use clap::{Arg, Command};
use gst::prelude::*;
use parallax_gst::cli::Repl;
use parallax_gst::config::Config;
use parallax_gst::error::{Error, Result};
use parallax_gst::pipeline::{PipelineGuard, builder};
use parallax_gst::player::Player;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link demuxer video pads to the decoder as they appear.
fn link_video_pad(src_pad: &gst::Pad, decoder: &gst::Element) -> Result<()> {
    let name = src_pad.name();
    tracing::info!("pad added {}", name);
    if !name.starts_with("video_") {
        return Ok(());
    }
    let sink_pad = decoder.static_pad("sink").ok_or_else(|| Error::MissingPad {
        element: decoder.name().to_string(),
        pad: "sink".to_string(),
    })?;
    src_pad.link(&sink_pad).map_err(|reason| Error::PadLink {
        pad: name.to_string(),
        reason,
    })?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parallax_gst=info")),
        )
        .init();

    let matches = Command::new("seek")
        .about("Play an MP4 file and control it from the command line")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Video file to play")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    let mut config = Config::from_env();
    if let Some(file) = matches.get_one::<PathBuf>("file") {
        config = config.with_video_file(file.clone());
    }

    parallax_gst::init()?;
    let pipeline = PipelineGuard::new();

    let filesrc = builder::add_new_element(&*pipeline, "filesrc")?;
    let location = config.video_file.to_string_lossy().into_owned();
    filesrc.set_property("location", location.as_str());
    let qtdemux = builder::add_new_element(&*pipeline, "qtdemux")?;
    let avdec_h264 = builder::add_new_element(&*pipeline, "avdec_h264")?;
    let videoconvert = builder::add_new_element(&*pipeline, "videoconvert")?;
    let videosink = builder::add_new_element(&*pipeline, &config.video_sink)?;

    builder::link(&filesrc, &qtdemux)?;
    let decoder = avdec_h264.clone();
    qtdemux.connect_pad_added(move |_demux, src_pad| {
        if let Err(e) = link_video_pad(src_pad, &decoder) {
            tracing::error!("{}", e);
        }
    });
    builder::link_many(&[&avdec_h264, &videoconvert, &videosink])?;

    let ret = builder::set_state(&*pipeline, gst::State::Playing)?;
    println!("state: {:?}", ret);

    let mut repl = Repl::new(Player::new(&pipeline).with_state_timeout(config.state_timeout));
    repl.run(io::stdin().lock(), io::stdout())?;

    builder::set_state(&*pipeline, gst::State::Null)?;
    Ok(())
}
