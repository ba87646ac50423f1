//! Change output size and frame rate of a live source from stdin.
//!
//! ```text
//! videotestsrc ! capsfilter(RGBA 1280x720@30) ! videorate
//!     !(framerate) videoscale ! capsfilter(WxH) ! <video sink>
//! ```
//!
//! Type `WIDTH HEIGHT FRAMERATE` (e.g. `640 360 10`) and press enter; the
//! middle of the pipeline is rebuilt while the source pad is blocked.
//!
//! Run with: cargo run --example change_resolution

use gst::prelude::*;
use parallax_gst::config::Config;
use parallax_gst::error::Result;
use parallax_gst::pipeline::{PipelineGuard, builder, run_pipeline};
use parallax_gst::probe::{Resolution, ResolutionChanger};
use std::io::{self, BufRead};
use std::thread;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parallax_gst=info")),
        )
        .init();

    parallax_gst::init()?;
    let config = Config::from_env();
    let pipeline = PipelineGuard::new();

    let videotestsrc = builder::add_new_element(&*pipeline, "videotestsrc")?;
    builder::set_live(&videotestsrc);
    videotestsrc.set_property_from_str("pattern", "circular");
    videotestsrc.set_property("horizontal-speed", 2i32);

    let videosink = builder::add_new_element(&*pipeline, &config.video_sink)?;
    builder::set_async(&videosink, false);

    let changer = ResolutionChanger::new(&pipeline, &videotestsrc, &videosink, Resolution::default())?;

    let _reader = thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match line.parse::<Resolution>() {
                Ok(resolution) => {
                    println!("changing to {}", resolution);
                    if let Err(e) = changer.request(resolution) {
                        tracing::error!("resolution change failed: {}", e);
                    }
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }
    });

    run_pipeline(&pipeline)?;
    Ok(())
}
