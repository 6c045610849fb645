//! Run lifecycle.

use serde::Serialize;

/// `Idle → Running → {Completed | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn is_running(&self) -> bool {
        *self == Self::Running
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Cancelled)
        )
    }
}
