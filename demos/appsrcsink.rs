//! Encode, packetize and hand RTP packets through the application.
//!
//! ```text
//! sender:   videotestsrc ! x264enc ! rtph264pay ! appsink
//!                                                   │ SampleRelay
//! receiver: appsrc ! rtph264depay ! avdec_h264 ! videoconvert ! <video sink>
//! ```
//!
//! Both branches live in the same pipeline; the only connection between
//! them is the relay copying each RTP packet out of the appsink and into
//! the appsrc.
//!
//! Run with: cargo run --example appsrcsink

use gst::prelude::*;
use parallax_gst::bridge::SampleRelay;
use parallax_gst::caps::{RTP_H264_CAPS, parse_caps};
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

    // sender
    let videotestsrc = builder::add_new_element(&*pipeline, "videotestsrc")?;
    builder::set_live(&videotestsrc);
    let x264enc = builder::add_new_element(&*pipeline, "x264enc")?;
    let rtph264pay = builder::add_new_element(&*pipeline, "rtph264pay")?;
    let appsink: gst_app::AppSink = builder::add_new_typed(&*pipeline, "appsink")?;
    builder::set_async(appsink.upcast_ref::<gst::Element>(), false);
    builder::link_many(&[&videotestsrc, &x264enc, &rtph264pay, appsink.upcast_ref::<gst::Element>()])?;

    // receiver
    let payload_caps = parse_caps(RTP_H264_CAPS)?;
    let appsrc: gst_app::AppSrc = builder::add_new_typed(&*pipeline, "appsrc")?;
    appsrc.set_property("format", gst::Format::Time);
    let rtph264depay = builder::add_new_element(&*pipeline, "rtph264depay")?;
    let avdec_h264 = builder::add_new_element(&*pipeline, "avdec_h264")?;
    let videoconvert = builder::add_new_element(&*pipeline, "videoconvert")?;
    let videosink = builder::add_new_element(&*pipeline, &config.video_sink)?;
    builder::set_async(&videosink, false);
    builder::set_sync(&videosink, false);
    builder::link_filtered(appsrc.upcast_ref::<gst::Element>(), &rtph264depay, &payload_caps)?;
    builder::link_many(&[&rtph264depay, &avdec_h264, &videoconvert, &videosink])?;

    let relay = SampleRelay::new(&appsrc);
    let stats = relay.stats();
    relay.install(&appsink);

    let result = run_pipeline(&pipeline);
    println!(
        "Relayed {} packets ({} bytes)",
        stats.samples(),
        stats.bytes()
    );
    result.map(|_| ())
}
