//! Element state dump for a whole bin tree.

use crate::error::{Error, Result};
use gst::prelude::*;
use std::fmt;

/// Snapshot of one element's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementStatus {
    /// Nesting level below the inspected bin.
    pub depth: usize,
    /// Registered type name, e.g. `GstVideoTestSrc`.
    pub type_name: String,
    /// Element instance name.
    pub name: String,
    /// Current state.
    pub current: gst::State,
    /// Pending state.
    pub pending: gst::State,
}

impl fmt::Display for ElementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:indent$}{}({}) state={} pending={}",
            "",
            self.type_name,
            self.name,
            state_name(self.current),
            state_name(self.pending),
            indent = self.depth * 2
        )
    }
}

/// Engine name of a state, as printed by the GStreamer tools.
pub fn state_name(state: gst::State) -> &'static str {
    match state {
        gst::State::VoidPending => "VOID_PENDING",
        gst::State::Null => "NULL",
        gst::State::Ready => "READY",
        gst::State::Paused => "PAUSED",
        gst::State::Playing => "PLAYING",
        _ => "UNKNOWN",
    }
}

/// Collect the state of every element in `bin`, descending into child bins.
///
/// Each element's state is queried with `timeout`; an element whose state
/// change failed turns the whole query into an error.
pub fn status_of_all(
    bin: &impl IsA<gst::Bin>,
    timeout: gst::ClockTime,
) -> Result<Vec<ElementStatus>> {
    let mut out = Vec::new();
    collect(bin.upcast_ref::<gst::Bin>(), 0, timeout, &mut out)?;
    Ok(out)
}

fn collect(
    bin: &gst::Bin,
    depth: usize,
    timeout: gst::ClockTime,
    out: &mut Vec<ElementStatus>,
) -> Result<()> {
    for element in bin.children() {
        let (ret, current, pending) = element.state(timeout);
        if ret.is_err() {
            return Err(Error::StateChange {
                element: element.name().to_string(),
                state: pending,
            });
        }
        out.push(ElementStatus {
            depth,
            type_name: element.type_().name().to_string(),
            name: element.name().to_string(),
            current,
            pending,
        });
        if let Some(child) = element.downcast_ref::<gst::Bin>() {
            collect(child, depth + 1, timeout, out)?;
        }
    }
    Ok(())
}

/// Print the state of every element in `bin`.
pub fn print_status_of_all(bin: &impl IsA<gst::Bin>, timeout: gst::ClockTime) -> Result<()> {
    for status in status_of_all(bin, timeout)? {
        println!("{}", status);
    }
    Ok(())
}
