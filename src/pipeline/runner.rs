//! Blocking pipeline runner.

use crate::error::{Error, Result};
use crate::pipeline::builder::set_state;
use gst::prelude::*;

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// End of stream was reached.
    Eos,
    /// The bus delivered a message the runner did not ask for.
    Unexpected,
}

/// Run `pipeline` until it reports end of stream or an error.
///
/// Sets the pipeline to PLAYING, blocks on the bus for the first ERROR or
/// EOS message and always sets the pipeline back to NULL before returning.
/// An ERROR message is returned as [`Error::Stream`].
pub fn run_pipeline(pipeline: &gst::Pipeline) -> Result<Outcome> {
    let bus = pipeline.bus().ok_or(Error::NoBus)?;
    set_state(pipeline, gst::State::Playing)?;
    tracing::info!("{} playing", pipeline.name());

    let result = wait_for_end(&bus);

    set_state(pipeline, gst::State::Null)?;
    tracing::info!("{} stopped", pipeline.name());
    result
}

/// Block on `bus` until an EOS or ERROR message arrives.
///
/// A bus that is flushing yields no message and ends the wait with
/// [`Error::BusFlushing`].
pub fn wait_for_end(bus: &gst::Bus) -> Result<Outcome> {
    let msg = bus
        .timed_pop_filtered(
            gst::ClockTime::NONE,
            &[gst::MessageType::Error, gst::MessageType::Eos],
        )
        .ok_or(Error::BusFlushing)?;

    match msg.view() {
        gst::MessageView::Eos(..) => {
            tracing::info!("End-Of-Stream reached.");
            Ok(Outcome::Eos)
        }
        gst::MessageView::Error(err) => {
            let error = stream_error(&msg, err);
            if let Error::Stream { src, message, debug: debug_info } = &error {
                tracing::error!("Error received from element {}: {}", src, message);
                tracing::error!("Debugging information: {}", debug_info);
            }
            Err(error)
        }
        _ => {
            tracing::warn!("Unexpected message received.");
            Ok(Outcome::Unexpected)
        }
    }
}

/// Convert an ERROR bus message into [`Error::Stream`].
pub(crate) fn stream_error(msg: &gst::Message, err: &gst::message::Error) -> Error {
    Error::Stream {
        src: msg
            .src()
            .map(|s| s.path_string().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        message: err.error().to_string(),
        debug: err
            .debug()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".to_string()),
    }
}
