//! Core types for stamping results.

use std::path::PathBuf;
use std::time::Duration;
use serde::{Serialize, Serializer};

/// What the stamp primitive hands back for a successful item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampReport {
    /// Path of the written, stamped file
    pub output_path: PathBuf,
    /// Size of the written file in bytes
    pub output_size: u64,
}

/// Result of processing one item.
///
/// Outcomes are produced strictly in item order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    /// Position of the item in the job
    pub index: usize,
    /// Original input path as given in the job
    pub input_path: PathBuf,
    /// Path the stamped copy was written to
    pub output_path: PathBuf,
    /// Whether a resized temp copy was stamped instead of the original
    pub resized: bool,
    /// Whether stamping succeeded
    pub success: bool,
    /// Size of the stamped file in bytes (0 on failure)
    pub output_size: u64,
    /// Error message if stamping failed
    pub error: Option<String>,
}

impl ItemOutcome {
    pub fn succeeded(index: usize, input_path: PathBuf, resized: bool, report: StampReport) -> Self {
        Self {
            index,
            input_path,
            output_path: report.output_path,
            resized,
            success: true,
            output_size: report.output_size,
            error: None,
        }
    }

    pub fn failed(
        index: usize,
        input_path: PathBuf,
        output_path: PathBuf,
        resized: bool,
        error: impl Into<String>,
    ) -> Self {
        Self {
            index,
            input_path,
            output_path,
            resized,
            success: false,
            output_size: 0,
            error: Some(error.into()),
        }
    }
}

/// Aggregated result carried by `RunCompleted`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// One outcome per item, ordered by index
    pub outcomes: Vec<ItemOutcome>,
    /// Wall time from start to the end of the loop
    #[serde(rename = "elapsedSecs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunStatus {
    Completed(RunReport),
    Cancelled,
}

impl RunStatus {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
