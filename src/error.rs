//! Error types for parallax-gst.

use thiserror::Error;

/// Result type alias using parallax-gst's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pipeline construction and control.
#[derive(Error, Debug)]
pub enum Error {
    /// GStreamer could not be initialized.
    #[error("failed to initialize GStreamer: {0}")]
    Init(#[from] gst::glib::Error),

    /// No element factory with this name, or the factory refused to build.
    #[error("failed to create element '{factory}'")]
    ElementCreate {
        /// Factory name that was requested.
        factory: String,
    },

    /// A bin refused to add or remove a child.
    #[error("bin operation failed for '{element}': {reason}")]
    Bin {
        /// Element name.
        element: String,
        /// What went wrong.
        reason: String,
    },

    /// Two elements could not be linked.
    #[error("failed to link '{src}' -> '{sink}'")]
    Link {
        /// Upstream element name.
        src: String,
        /// Downstream element name.
        sink: String,
    },

    /// Two pads could not be linked.
    #[error("failed to link pad '{pad}': {reason:?}")]
    PadLink {
        /// Name of the source pad.
        pad: String,
        /// Engine link result.
        reason: gst::PadLinkError,
    },

    /// The element has no static pad with this name.
    #[error("element '{element}' has no pad '{pad}'")]
    MissingPad {
        /// Element name.
        element: String,
        /// Requested pad name.
        pad: String,
    },

    /// The engine rejected a state change.
    #[error("state change of '{element}' to {state:?} failed")]
    StateChange {
        /// Element name.
        element: String,
        /// Requested target state.
        state: gst::State,
    },

    /// Caps string could not be parsed.
    #[error("invalid caps '{0}'")]
    Caps(String),

    /// Position query was not answered.
    #[error("position query failed")]
    Query,

    /// The pipeline did not accept a seek event.
    #[error("seek to {0} rejected")]
    Seek(gst::ClockTime),

    /// The seek target cannot be expressed as a clock time.
    #[error("seek position {0}s out of range")]
    SeekOutOfRange(u64),

    /// An element posted an error message on the bus.
    #[error("error from element {src}: {message} (debug: {debug})")]
    Stream {
        /// Path of the element that posted the error.
        src: String,
        /// Human readable message.
        message: String,
        /// Debug information, or "none".
        debug: String,
    },

    /// The pipeline has no bus.
    #[error("pipeline has no bus")]
    NoBus,

    /// The bus returned no message because it is flushing.
    #[error("bus is flushing, pipeline was shut down")]
    BusFlushing,

    /// A REPL command could not be parsed.
    #[error("invalid command: {0}")]
    Command(String),

    /// Generic binding failure.
    #[error("GStreamer call failed: {0}")]
    Glib(#[from] gst::glib::BoolError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convenience constructor for [`Error::Command`].
    pub fn command(msg: impl Into<String>) -> Self {
        Error::Command(msg.into())
    }
}
