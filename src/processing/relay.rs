//! Delivery of run events from the background loop to observers.
//!
//! The run loop publishes on three paths:
//! - an unbounded, ordered event stream (every [`RunEvent`], never blocks);
//! - a `watch` channel per progress level holding only the latest value, so a
//!   coarse indicator and a fine one can be polled at different rates;
//! - a `watch` channel for the [`RunState`].

use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error};
use crate::core::{ItemOutcome, MainProgress, RunEvent, RunReport, RunState, SubProgress};

/// Receiving side handed to the caller when a run starts.
pub(crate) struct RelayReceivers {
    pub events: mpsc::UnboundedReceiver<RunEvent>,
    pub progress: ProgressWatch,
    pub state: watch::Receiver<RunState>,
}

/// Publishing side owned by the run loop.
///
/// If the loop is torn down before it publishes a terminal event, dropping the
/// relay publishes `RunCancelled` so observers still see exactly one.
pub(crate) struct ProgressRelay {
    events: mpsc::UnboundedSender<RunEvent>,
    main: watch::Sender<MainProgress>,
    sub: Arc<watch::Sender<Option<SubProgress>>>,
    state: watch::Sender<RunState>,
    total: usize,
    finished: bool,
}

impl ProgressRelay {
    pub fn new(total: usize) -> (Self, RelayReceivers) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (main_tx, main_rx) = watch::channel(MainProgress::new(0, total));
        let (sub_tx, sub_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(RunState::Idle);

        let relay = Self {
            events: events_tx,
            main: main_tx,
            sub: Arc::new(sub_tx),
            state: state_tx,
            total,
            finished: false,
        };
        let receivers = RelayReceivers {
            events: events_rx,
            progress: ProgressWatch { main: main_rx, sub: sub_rx },
            state: state_rx,
        };
        (relay, receivers)
    }

    /// Moves the published state forward; illegal transitions are ignored.
    pub fn transition(&self, next: RunState) -> bool {
        let current = *self.state.borrow();
        if !current.can_transition_to(next) {
            debug!("Ignoring run state change {:?} -> {:?}", current, next);
            return false;
        }
        self.state.send_replace(next);
        debug!("Run state {:?} -> {:?}", current, next);
        true
    }

    pub fn item_started(&self, index: usize, input_path: &Path) {
        let progress = MainProgress::new(index, self.total);
        self.main.send_replace(progress);
        self.sub.send_replace(None);
        self.emit(RunEvent::ItemStarted {
            index,
            input_path: input_path.to_path_buf(),
            progress,
        });
    }

    /// A sender the stamp primitive's progress callback can own.
    pub fn sub_progress_sink(&self, index: usize) -> SubProgressSink {
        SubProgressSink {
            index,
            events: self.events.clone(),
            sub: Arc::clone(&self.sub),
        }
    }

    pub fn item_completed(&self, outcome: &ItemOutcome) {
        let progress = MainProgress::new(outcome.index + 1, self.total);
        self.emit(RunEvent::ItemCompleted(outcome.clone()));
        self.main.send_replace(progress);
        self.emit(RunEvent::MainProgress(progress));
    }

    pub fn completed(&mut self, report: RunReport) {
        self.finished = true;
        self.transition(RunState::Completed);
        self.emit(RunEvent::RunCompleted(report));
    }

    pub fn cancelled(&mut self) {
        self.finished = true;
        self.transition(RunState::Cancelled);
        self.sub.send_replace(None);
        self.emit(RunEvent::RunCancelled);
    }

    fn emit(&self, event: RunEvent) {
        // Observers may stop listening at any time.
        let _ = self.events.send(event);
    }
}

impl Drop for ProgressRelay {
    fn drop(&mut self) {
        if !self.finished {
            error!("Stamp run stopped before reaching a terminal state");
            self.cancelled();
        }
    }
}

/// Forwards one item's fine-grained progress.
#[derive(Clone)]
pub struct SubProgressSink {
    index: usize,
    events: mpsc::UnboundedSender<RunEvent>,
    sub: Arc<watch::Sender<Option<SubProgress>>>,
}

impl SubProgressSink {
    pub fn report(&self, current: u64, total: u64) {
        let progress = SubProgress { index: self.index, current, total };
        self.sub.send_replace(Some(progress));
        let _ = self.events.send(RunEvent::SubProgress(progress));
    }
}

/// Latest main and sub progress of a run.
///
/// Cheap to clone; each clone tracks "changed" on its own.
#[derive(Debug, Clone)]
pub struct ProgressWatch {
    main: watch::Receiver<MainProgress>,
    sub: watch::Receiver<Option<SubProgress>>,
}

impl ProgressWatch {
    pub fn main(&self) -> MainProgress {
        *self.main.borrow()
    }

    /// `None` between items and after the run ends.
    pub fn sub(&self) -> Option<SubProgress> {
        *self.sub.borrow()
    }

    /// Waits for the next main progress change; `None` once the run is gone.
    pub async fn main_changed(&mut self) -> Option<MainProgress> {
        self.main.changed().await.ok()?;
        Some(*self.main.borrow_and_update())
    }

    /// Waits for the next sub progress change; `None` once the run is gone.
    pub async fn sub_changed(&mut self) -> Option<Option<SubProgress>> {
        self.sub.changed().await.ok()?;
        Some(*self.sub.borrow_and_update())
    }
}

/// Callbacks for a single-threaded consumer of run events.
///
/// Every method defaults to doing nothing.
pub trait RunObserver {
    fn on_item_started(&mut self, _index: usize, _input_path: &Path, _progress: MainProgress) {}
    fn on_sub_progress(&mut self, _progress: SubProgress) {}
    fn on_item_completed(&mut self, _outcome: &ItemOutcome) {}
    fn on_main_progress(&mut self, _progress: MainProgress) {}
    fn on_run_completed(&mut self, _report: &RunReport) {}
    fn on_run_cancelled(&mut self) {}
}

/// Routes one event to the matching observer callback.
pub fn dispatch<O: RunObserver + ?Sized>(observer: &mut O, event: &RunEvent) {
    match event {
        RunEvent::ItemStarted { index, input_path, progress } => {
            observer.on_item_started(*index, input_path, *progress)
        }
        RunEvent::SubProgress(progress) => observer.on_sub_progress(*progress),
        RunEvent::ItemCompleted(outcome) => observer.on_item_completed(outcome),
        RunEvent::MainProgress(progress) => observer.on_main_progress(*progress),
        RunEvent::RunCompleted(report) => observer.on_run_completed(report),
        RunEvent::RunCancelled => observer.on_run_cancelled(),
    }
}
