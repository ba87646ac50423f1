//! Pad blocking and live re-linking.
//!
//! Elements downstream of a running source can only be replaced while no
//! data is flowing through the link. [`block_and_run`] installs a blocking
//! probe on the source pad and runs the re-linking code from the probe
//! callback, i.e. on the streaming thread while the pad is held. Returning
//! [`gst::PadProbeReturn::Remove`] lets data flow again into whatever is
//! linked afterwards.
//!
//! Two ready-made swaps are provided:
//!
//! - [`SinkSwitcher`]: toggle between a `fakesink` and a display branch
//! - [`ResolutionChanger`]: rebuild the scaling/rate chain for a new size

mod resolution;
mod switch;

pub use resolution::{Resolution, ResolutionChanger, SOURCE_CAPS};
pub use switch::{BranchKind, SinkSwitcher};

use crate::error::{Error, Result};
use gst::prelude::*;
use std::sync::Mutex;

/// Block `pad` downstream and run `f` once while it is blocked.
///
/// The probe removes itself after `f` ran, whether `f` succeeded or not.
/// Errors from `f` are logged; they cannot be propagated out of the
/// streaming thread.
pub fn block_and_run<F>(pad: &gst::Pad, f: F) -> Option<gst::PadProbeId>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let task = Mutex::new(Some(f));
    pad.add_probe(gst::PadProbeType::BLOCK_DOWNSTREAM, move |pad, _info| {
        let task = task.lock().ok().and_then(|mut t| t.take());
        if let Some(task) = task {
            tracing::info!("blocked {}", pad.name());
            if let Err(e) = task() {
                tracing::error!("re-linking while blocked failed: {}", e);
            }
            tracing::info!("unblocking {}", pad.name());
        }
        gst::PadProbeReturn::Remove
    })
}

/// The `src` pad of an element.
pub fn src_pad(element: &gst::Element) -> Result<gst::Pad> {
    element.static_pad("src").ok_or_else(|| Error::MissingPad {
        element: element.name().to_string(),
        pad: "src".to_string(),
    })
}
