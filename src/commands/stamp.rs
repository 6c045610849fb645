//! The `stamp` command: plan a job, run it, and report progress.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::core::{ItemOutcome, MainProgress, Opacity, ResizeLimit, RunReport, RunStatus, SubProgress, ToolConfig};
use crate::processing::command::{CommandResizer, CommandStamper};
use crate::processing::{Orchestrator, RunHandle, RunObserver};
use crate::utils::{StampError, StampResult, file_name};

use super::plan::JobPlan;

/// Everything the `stamp` command needs besides the tool config.
#[derive(Debug, Clone)]
pub struct StampOptions {
    pub recipient: String,
    pub task: String,
    pub date: NaiveDate,
    pub inputs: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub overlay: PathBuf,
    pub opacity: Opacity,
    pub resize_limit: Option<ResizeLimit>,
    /// Print one JSON object per event on stdout instead of log lines
    pub json: bool,
}

/// Builds an orchestrator backed by the configured external tools.
pub fn orchestrator_from_config(tools: &ToolConfig) -> Orchestrator {
    let orchestrator = Orchestrator::new(Arc::new(CommandStamper::new(tools.stamp.clone())));
    match &tools.resize {
        Some(command) => orchestrator.with_resizer(Arc::new(CommandResizer::new(command.clone()))),
        None => orchestrator,
    }
}

/// Stamps every input, honouring Ctrl-C as a cancellation request.
pub async fn stamp_files(tools: &ToolConfig, options: StampOptions) -> StampResult<RunStatus> {
    if options.resize_limit.is_some() && tools.resize.is_none() {
        warn!("A resize limit was given but no resize tool is configured, files keep their size");
    }

    let plan = JobPlan::new(&options.recipient, &options.task, options.date)?;
    let prepared = plan
        .prepare(
            &options.inputs,
            &options.output_root,
            options.overlay.clone(),
            options.opacity,
            options.resize_limit,
        )
        .await?;
    if !prepared.skipped.is_empty() {
        warn!("{} of {} files were skipped", prepared.skipped.len(), options.inputs.len());
    }
    info!("Stamping \"{}\" into {}", prepared.job.overlay_text, prepared.output_dir.display());

    let mut orchestrator = orchestrator_from_config(tools);
    let handle = orchestrator.start(prepared.job)?;

    let canceller = handle.canceller();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current file before stopping");
            canceller.cancel();
        }
    });

    let status = if options.json {
        print_json_events(handle).await
    } else {
        handle.observe(&mut ConsoleReporter::default()).await
    };

    interrupt.abort();
    status
}

async fn print_json_events(mut handle: RunHandle) -> StampResult<RunStatus> {
    while let Some(event) = handle.next_event().await {
        let line = serde_json::to_string(&event)
            .map_err(|e| StampError::processing(format!("Failed to serialize event: {e}")))?;
        println!("{line}");
    }
    handle.wait().await
}

/// Logs run progress in a human-readable form.
///
/// Sub progress is logged in 10% steps to keep per-frame tools quiet.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    last_sub_step: Option<u64>,
    current_file: String,
}

impl RunObserver for ConsoleReporter {
    fn on_item_started(&mut self, _index: usize, input_path: &Path, progress: MainProgress) {
        self.last_sub_step = None;
        self.current_file = file_name(input_path);
        info!(
            "Working on file: ({}/{}) {}",
            progress.completed + 1,
            progress.total,
            self.current_file
        );
    }

    fn on_sub_progress(&mut self, progress: SubProgress) {
        let step = progress.percentage() / 10;
        if self.last_sub_step != Some(step) {
            self.last_sub_step = Some(step);
            debug!("{}: {}%", self.current_file, step * 10);
        }
    }

    fn on_item_completed(&mut self, outcome: &ItemOutcome) {
        if let Some(error) = &outcome.error {
            warn!("{} failed: {}", self.current_file, error);
        }
    }

    fn on_main_progress(&mut self, progress: MainProgress) {
        debug!("Overall progress: {}%", progress.percentage());
    }

    fn on_run_completed(&mut self, report: &RunReport) {
        info!(
            "Finished in {:.2} sec: {} stamped, {} failed",
            report.elapsed.as_secs_f64(),
            report.succeeded(),
            report.failed().count()
        );
        for failed in report.failed() {
            warn!("  {}: {}", failed.input_path.display(), failed.error.as_deref().unwrap_or("unknown error"));
        }
    }

    fn on_run_cancelled(&mut self) {
        warn!("Stamping cancelled");
    }
}
