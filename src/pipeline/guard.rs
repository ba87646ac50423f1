//! Ownership wrapper for a top-level pipeline.

use gst::prelude::*;
use std::ops::Deref;

/// Owns a [`gst::Pipeline`] and shuts it down when dropped.
///
/// The bindings already reference count the pipeline; the guard only adds
/// the NULL transition the engine expects before the last reference goes
/// away.
#[derive(Debug)]
pub struct PipelineGuard {
    pipeline: gst::Pipeline,
}

impl PipelineGuard {
    /// Create a guard around a new, empty pipeline.
    pub fn new() -> Self {
        Self {
            pipeline: gst::Pipeline::new(),
        }
    }

    /// Take ownership of an existing pipeline.
    pub fn from_pipeline(pipeline: gst::Pipeline) -> Self {
        Self { pipeline }
    }

    /// Borrow the pipeline.
    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }
}

impl Default for PipelineGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for PipelineGuard {
    type Target = gst::Pipeline;

    fn deref(&self) -> &gst::Pipeline {
        &self.pipeline
    }
}

impl AsRef<gst::Pipeline> for PipelineGuard {
    fn as_ref(&self) -> &gst::Pipeline {
        &self.pipeline
    }
}

impl Drop for PipelineGuard {
    fn drop(&mut self) {
        if self.pipeline.current_state() == gst::State::Null
            && self.pipeline.pending_state() == gst::State::VoidPending
        {
            return;
        }
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            tracing::warn!("failed to stop {} on drop: {}", self.pipeline.name(), e);
        }
    }
}
