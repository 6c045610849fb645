//! Caller-side commands.
//!
//! - [`plan`]: Turn a recipient, a task and a file list into a [`Job`](crate::core::Job)
//! - [`stamp_files`]: Run a planned job and report its progress

pub mod plan;
mod stamp;

pub use plan::{JobPlan, PreparedJob, SkipReason, SkippedInput, opacity_from_percent, select_inputs};
pub use stamp::{ConsoleReporter, StampOptions, orchestrator_from_config, stamp_files};
