use std::path::PathBuf;
use serde::Serialize;
use crate::core::{ItemOutcome, RunReport};

/// Coarse, per-item counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MainProgress {
    /// Items finished so far (or the index of the item being started)
    pub completed: usize,
    /// Total number of items in the job
    pub total: usize,
}

impl MainProgress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Progress percentage (0-100)
    pub fn percentage(&self) -> usize {
        if self.total > 0 {
            (self.completed * 100) / self.total
        } else {
            0
        }
    }
}

/// Fine-grained counter reported by a primitive while it works on one item.
///
/// Values are forwarded as the primitive reported them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubProgress {
    /// Index of the item the primitive is working on
    pub index: usize,
    pub current: u64,
    pub total: u64,
}

impl SubProgress {
    pub fn percentage(&self) -> u64 {
        if self.total > 0 {
            (self.current.min(self.total) * 100) / self.total
        } else {
            0
        }
    }
}

/// Everything a run reports, in emission order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RunEvent {
    /// Item `index` is about to be processed; `progress.completed == index`
    #[serde(rename_all = "camelCase")]
    ItemStarted {
        index: usize,
        input_path: PathBuf,
        progress: MainProgress,
    },
    SubProgress(SubProgress),
    ItemCompleted(ItemOutcome),
    /// Emitted right after `ItemCompleted`; `completed == index + 1`
    MainProgress(MainProgress),
    RunCompleted(RunReport),
    RunCancelled,
}

impl RunEvent {
    /// `RunCompleted` and `RunCancelled` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RunCompleted(_) | Self::RunCancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_handle_empty_totals() {
        assert_eq!(MainProgress::new(1, 4).percentage(), 25);
        assert_eq!(MainProgress::new(0, 0).percentage(), 0);
        let sub = SubProgress { index: 0, current: 5, total: 4 };
        assert_eq!(sub.percentage(), 100);
        assert_eq!(SubProgress { index: 0, current: 3, total: 0 }.percentage(), 0);
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let json = serde_json::to_value(RunEvent::MainProgress(MainProgress::new(2, 3))).unwrap();
        assert_eq!(json["event"], "mainProgress");
        assert_eq!(json["completed"], 2);
        assert_eq!(serde_json::to_value(RunEvent::RunCancelled).unwrap()["event"], "runCancelled");
    }
}
