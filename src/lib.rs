//! # parallax-gst
//!
//! Small helpers for building and driving GStreamer pipelines, plus the
//! example programs under `demos/` that use them.
//!
//! The engine does the real work (scheduling, negotiation, clocking,
//! codecs). This crate covers the glue around it:
//!
//! - **Construction**: create elements by factory name, add, link, remove
//! - **Running**: play until EOS or error, bus messages as async events
//! - **Hot swapping**: block a pad and re-link the branch behind it
//! - **Control**: play/pause/seek and a tiny command line for it
//! - **App bridging**: copy samples from an appsink into an appsrc
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parallax_gst::prelude::*;
//!
//! parallax_gst::init()?;
//! let pipeline = PipelineGuard::new();
//! let src = builder::add_new_element(&*pipeline, "videotestsrc")?;
//! let convert = builder::add_new_element(&*pipeline, "videoconvert")?;
//! let sink = builder::add_new_element(&*pipeline, "autovideosink")?;
//! builder::link_many(&[&src, &convert, &sink])?;
//! run_pipeline(&pipeline)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod caps;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod player;
pub mod probe;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bridge::SampleRelay;
    pub use crate::cli::{Command, Repl};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{Outcome, PipelineGuard, builder, run_pipeline};
    pub use crate::player::{PlaybackControl, Player};
    pub use crate::probe::{Resolution, ResolutionChanger, SinkSwitcher};
}

pub use error::{Error, Result};

/// Initialize the engine.
///
/// Safe to call more than once.
pub fn init() -> Result<()> {
    gst::init()?;
    tracing::debug!("GStreamer {}", gst::version_string());
    Ok(())
}
