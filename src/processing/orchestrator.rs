//! Batch orchestrator: runs a job item by item on a background task.
//!
//! Each primitive call is dispatched with `tokio::task::spawn_blocking` and
//! awaited before the next one starts, so items are processed strictly in
//! order and primitives are never called concurrently.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::{ItemOutcome, Job, RunEvent, RunReport, RunState, RunStatus};
use crate::utils::{StampError, StampResult, file_name, format_from_path, validate_job};

use super::cancel::{CancelFlag, RunCanceller};
use super::primitives::{MediaResizer, PassthroughResizer, StampRequest, WatermarkStamper};
use super::relay::{ProgressRelay, ProgressWatch, RunObserver, dispatch};
use super::temp_files::TempFileSet;

/// Starts stamping runs, one at a time.
///
/// Clones share the active-run slot, so a clone cannot start a second run
/// while the first is still `Running`.
#[derive(Clone)]
pub struct Orchestrator {
    stamper: Arc<dyn WatermarkStamper>,
    resizer: Arc<dyn MediaResizer>,
    active: Arc<Mutex<Option<watch::Receiver<RunState>>>>,
}

impl Orchestrator {
    /// Creates an orchestrator that never resizes.
    pub fn new(stamper: Arc<dyn WatermarkStamper>) -> Self {
        Self {
            stamper,
            resizer: Arc::new(PassthroughResizer),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_resizer(mut self, resizer: Arc<dyn MediaResizer>) -> Self {
        self.resizer = resizer;
        self
    }

    /// State of the most recent run, `Idle` before the first one.
    pub fn state(&self) -> RunState {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        latest_state(&active)
    }

    /// Validates `job` and starts running it in the background.
    ///
    /// Must be called from within a Tokio runtime. Fails with
    /// [`StampError::Busy`] while the previous run is still `Running` and with
    /// [`StampError::InvalidJob`] when the job does not pass validation.
    pub fn start(&mut self, job: Job) -> StampResult<RunHandle> {
        // Held until the new run is registered.
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if latest_state(&active).is_running() {
            return Err(StampError::Busy);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StampError::Runtime(e.to_string()))?;

        validate_job(&job)?;

        let job = Arc::new(job);
        let cancel = CancelFlag::new();
        let (relay, receivers) = ProgressRelay::new(job.len());
        relay.transition(RunState::Running);
        *active = Some(receivers.state.clone());

        info!(
            "Starting stamp run: {} items, resize limit: {}",
            job.len(),
            job.resize_limit.map_or_else(|| "none".to_string(), |l| l.to_string())
        );

        let run = StampRun {
            job: Arc::clone(&job),
            stamper: Arc::clone(&self.stamper),
            resizer: Arc::clone(&self.resizer),
            cancel: cancel.clone(),
            relay,
        };
        let task = runtime.spawn(run.execute());

        Ok(RunHandle {
            job,
            canceller: RunCanceller::new(cancel, receivers.state.clone()),
            events: receivers.events,
            progress: receivers.progress,
            state: receivers.state,
            task,
        })
    }
}

fn latest_state(active: &Option<watch::Receiver<RunState>>) -> RunState {
    active
        .as_ref()
        .map(|state| *state.borrow())
        .unwrap_or(RunState::Idle)
}

/// Caller's view of one run.
#[derive(Debug)]
pub struct RunHandle {
    job: Arc<Job>,
    canceller: RunCanceller,
    events: mpsc::UnboundedReceiver<RunEvent>,
    progress: ProgressWatch,
    state: watch::Receiver<RunState>,
    task: JoinHandle<RunStatus>,
}

impl RunHandle {
    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Requests cooperative cancellation; see [`RunCanceller::cancel`].
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> RunCanceller {
        self.canceller.clone()
    }

    pub fn progress(&self) -> ProgressWatch {
        self.progress.clone()
    }

    /// Next event in emission order; `None` once the run has ended and every
    /// event has been received.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Feeds every remaining event to `observer`, then waits for the run.
    pub async fn observe<O: RunObserver + ?Sized>(
        mut self,
        observer: &mut O,
    ) -> StampResult<RunStatus> {
        while let Some(event) = self.events.recv().await {
            dispatch(observer, &event);
        }
        self.wait().await
    }

    /// Waits for the run to reach its terminal state.
    pub async fn wait(self) -> StampResult<RunStatus> {
        self.task
            .await
            .map_err(|e| StampError::processing(format!("Stamp run aborted: {e}")))
    }
}

/// Everything the background task owns for one run.
struct StampRun {
    job: Arc<Job>,
    stamper: Arc<dyn WatermarkStamper>,
    resizer: Arc<dyn MediaResizer>,
    cancel: CancelFlag,
    relay: ProgressRelay,
}

impl StampRun {
    async fn execute(mut self) -> RunStatus {
        let started = Instant::now();
        let job = Arc::clone(&self.job);
        let total = job.len();
        let mut temp_files = TempFileSet::new();
        let mut outcomes = Vec::with_capacity(total);
        let mut cancelled = false;

        for (index, item) in job.items.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("Run cancelled, skipping {} remaining items", total - index);
                cancelled = true;
                break;
            }

            debug!("Working on file ({}/{}): {}", index + 1, total, item.input_path.display());
            self.relay.item_started(index, &item.input_path);

            let (effective_input, resized) = self.resize_item(index, &mut temp_files).await;
            let outcome = self.stamp_item(index, effective_input, resized).await;

            self.relay.item_completed(&outcome);
            outcomes.push(outcome);
        }

        let elapsed = started.elapsed();
        temp_files.cleanup();

        if cancelled {
            self.relay.cancelled();
            return RunStatus::Cancelled;
        }

        let report = RunReport { outcomes, elapsed };
        let failed = report.failed().count();
        if failed > 0 {
            warn!(
                "Stamp run finished in {:.2}s with {} failed items out of {}",
                elapsed.as_secs_f64(),
                failed,
                total
            );
        } else {
            info!("Stamp run finished in {:.2}s: {} files stamped", elapsed.as_secs_f64(), total);
        }
        self.relay.completed(report.clone());
        RunStatus::Completed(report)
    }

    /// Returns the path to stamp and whether it is a resized temp copy.
    ///
    /// Any resize failure falls back to the original input.
    async fn resize_item(&self, index: usize, temp_files: &mut TempFileSet) -> (PathBuf, bool) {
        let original = self.job.items[index].input_path.clone();
        let Some(limit) = self.job.resize_limit else {
            return (original, false);
        };

        match format_from_path(&original) {
            Ok(format) if format.is_resizable() => {}
            _ => {
                debug!("Skipping resize for {}: format is not resizable", file_name(&original));
                return (original, false);
            }
        }

        let resizer = Arc::clone(&self.resizer);
        let input = original.clone();
        let result = tokio::task::spawn_blocking(move || resizer.resize(&input, limit))
            .await
            .unwrap_or_else(|e| Err(StampError::resize(format!("Resize panicked: {e}"))));

        match result {
            Ok(Some(temp)) if temp == original => {
                warn!("Resizer returned the input path for {}, ignoring", original.display());
                (original, false)
            }
            Ok(Some(temp)) => {
                info!("Resized to temp: {}", temp.display());
                temp_files.track(temp.clone());
                (temp, true)
            }
            Ok(None) => {
                debug!("{} is within the resize limit", file_name(&original));
                (original, false)
            }
            Err(e) => {
                warn!("Resize failed for {}, stamping the original: {}", original.display(), e);
                (original, false)
            }
        }
    }

    async fn stamp_item(&self, index: usize, effective_input: PathBuf, resized: bool) -> ItemOutcome {
        let job = Arc::clone(&self.job);
        let stamper = Arc::clone(&self.stamper);
        let sink = self.relay.sub_progress_sink(index);

        let result = tokio::task::spawn_blocking(move || {
            let item = &job.items[index];
            let request = StampRequest {
                input_path: &effective_input,
                overlay_path: &job.overlay_path,
                text: &job.overlay_text,
                opacity: job.opacity,
                output_path: &item.output_path,
            };
            stamper.stamp(&request, &mut |current: u64, total: u64| sink.report(current, total))
        })
        .await
        .unwrap_or_else(|e| Err(StampError::processing(format!("Stamping panicked: {e}"))));

        let item = &self.job.items[index];
        match result {
            Ok(report) => {
                debug!("Stamped {} -> {}", file_name(&item.input_path), report.output_path.display());
                ItemOutcome::succeeded(index, item.input_path.clone(), resized, report)
            }
            Err(e) => {
                warn!("Stamping failed for {}: {}", item.input_path.display(), e);
                ItemOutcome::failed(
                    index,
                    item.input_path.clone(),
                    item.output_path.clone(),
                    resized,
                    e.to_string(),
                )
            }
        }
    }
}
