//! Live test pattern on screen.
//!
//! ```text
//! videotestsrc ! videoconvert ! <video sink>
//! ```
//!
//! The sink defaults to `waylandsink`; set `PARALLAX_GST_VIDEO_SINK` to use
//! another one.
//!
//! Run with: cargo run --example simple

use parallax_gst::config::Config;
use parallax_gst::error::Result;
use parallax_gst::pipeline::{PipelineGuard, builder, run_pipeline};
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
    let videoconvert = builder::add_new_element(&*pipeline, "videoconvert")?;
    let videosink = builder::add_new_element(&*pipeline, &config.video_sink)?;

    builder::set_async(&videosink, false);
    builder::set_live(&videotestsrc);

    builder::link_many(&[&videotestsrc, &videoconvert, &videosink])?;

    let outcome = run_pipeline(&pipeline)?;
    println!("Finished: {:?}", outcome);

    Ok(())
}
