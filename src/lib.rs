// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use core::{Job, JobItem, Opacity, ResizeLimit, RunEvent, RunReport, RunState, RunStatus, ItemOutcome, StampReport};
pub use utils::{StampError, StampResult};
pub use processing::{Orchestrator, RunHandle, MediaResizer, WatermarkStamper, StampRequest};

// This library file is the public API; the command-line entry point is in main.rs.
