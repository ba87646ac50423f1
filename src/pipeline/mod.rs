//! Pipeline construction and execution.
//!
//! This module wraps the parts of the engine API every demo needs:
//!
//! - [`builder`]: create elements by factory name, add and link them
//! - [`PipelineGuard`]: owns a pipeline and stops it on drop
//! - [`run_pipeline`]: play until EOS or error
//! - [`PipelineEvent`]: bus messages as async events
//! - [`status_of_all`]: state dump of a bin tree
//!
//! # Example
//!
//! ```rust,ignore
//! use parallax_gst::pipeline::{PipelineGuard, builder, run_pipeline};
//!
//! let pipeline = PipelineGuard::new();
//! let src = builder::add_new_element(&*pipeline, "videotestsrc")?;
//! let sink = builder::add_new_element(&*pipeline, "fakesink")?;
//! builder::link(&src, &sink)?;
//! run_pipeline(&pipeline)?;
//! ```

pub mod builder;
mod events;
mod guard;
mod runner;
mod status;

pub use events::{EventReceiver, EventSender, EventStream, PipelineEvent, watch_bus};
pub use guard::PipelineGuard;
pub use runner::{Outcome, run_pipeline, wait_for_end};
pub use status::{ElementStatus, print_status_of_all, state_name, status_of_all};
