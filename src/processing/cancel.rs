use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{debug, info};
use crate::core::RunState;

/// Cooperative cancellation flag shared by a caller and one run.
///
/// The run reads it only between items.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag; returns `true` only for the call that set it.
    pub fn cancel(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Requests cancellation of a run from anywhere, e.g. a Ctrl-C handler.
#[derive(Debug, Clone)]
pub struct RunCanceller {
    flag: CancelFlag,
    state: watch::Receiver<RunState>,
}

impl RunCanceller {
    pub(crate) fn new(flag: CancelFlag, state: watch::Receiver<RunState>) -> Self {
        Self { flag, state }
    }

    /// Asks the run to stop before its next item.
    ///
    /// Idempotent, and a no-op unless the run is still `Running`.
    pub fn cancel(&self) {
        let state = *self.state.borrow();
        if !state.is_running() {
            debug!("Ignoring cancel request, run is {:?}", state);
            return;
        }
        if self.flag.cancel() {
            info!("Cancellation requested, the run stops before its next item");
        }
    }

    pub fn is_requested(&self) -> bool {
        self.flag.is_cancelled()
    }
}
