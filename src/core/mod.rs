//! Core types for stamping runs.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`Job`]: A batch of items plus the watermark to apply
//! - [`RunState`]: Lifecycle of one run
//! - [`RunEvent`]: Progress and terminal events emitted by a run
//! - [`ItemOutcome`] / [`RunReport`]: Per-item and aggregated results
//! - [`ToolConfig`]: External tools backing the pipeline primitives

pub mod config;
mod job;
mod progress;
mod state;
mod types;

pub use config::{ToolCommand, ToolConfig};
pub use job::{Job, JobItem, Opacity, ResizeLimit};
pub use progress::{MainProgress, RunEvent, SubProgress};
pub use state::RunState;
pub use types::{ItemOutcome, RunReport, RunStatus, StampReport};
