//! Turns user input into a validated-ready [`Job`].
//!
//! Builds the overlay text and the dated output folder, and filters the input
//! list the way a drop list does.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::config::{MAX_OPACITY, MIN_OPACITY};
use crate::core::{Job, JobItem, Opacity, ResizeLimit};
use crate::utils::{StampResult, ValidationError, is_supported, validate_overlay_path};

/// Why an input was left out of the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// Extension is not a supported media format
    Unsupported,
    /// The same path was given more than once
    Duplicate,
    /// Another input with the same file name would write the same output
    NameClash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedInput {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Inputs split into those that will be stamped and those that will not.
#[derive(Debug, Default)]
pub struct InputSelection {
    pub accepted: Vec<PathBuf>,
    pub skipped: Vec<SkippedInput>,
}

/// Filters `inputs`, keeping the first occurrence of each usable file.
pub fn select_inputs(inputs: &[PathBuf]) -> InputSelection {
    let mut selection = InputSelection::default();
    let mut seen_paths: HashSet<&Path> = HashSet::new();
    let mut seen_names: HashSet<OsString> = HashSet::new();

    for path in inputs {
        let reason = if !is_supported(path) {
            Some(SkipReason::Unsupported)
        } else if !seen_paths.insert(path.as_path()) {
            Some(SkipReason::Duplicate)
        } else if !seen_names.insert(path.file_name().map(OsString::from).unwrap_or_default()) {
            Some(SkipReason::NameClash)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                warn!("Skipping {} ({:?})", path.display(), reason);
                selection.skipped.push(SkippedInput { path: path.clone(), reason });
            }
            None => selection.accepted.push(path.clone()),
        }
    }
    selection
}

/// Converts a whole-percent opacity request into a fixed opacity.
pub fn opacity_from_percent(percent: u32) -> StampResult<Opacity> {
    let value = percent as f32 / 100.0;
    if !(MIN_OPACITY..=MAX_OPACITY).contains(&value) {
        return Err(ValidationError::settings(format!(
            "Opacity must be between {:.0}% and {:.0}%, got {}%",
            MIN_OPACITY * 100.0,
            MAX_OPACITY * 100.0,
            percent
        ))
        .into());
    }
    Ok(Opacity::Fixed(value))
}

/// Who the stamped copies are for, and when.
#[derive(Debug, Clone)]
pub struct JobPlan {
    recipient: String,
    task: String,
    date: NaiveDate,
}

/// A job ready to start, plus what was left out of it.
#[derive(Debug)]
pub struct PreparedJob {
    pub job: Job,
    pub output_dir: PathBuf,
    pub skipped: Vec<SkippedInput>,
}

impl JobPlan {
    /// Recipient and task must be non-empty ASCII.
    pub fn new(recipient: impl Into<String>, task: impl Into<String>, date: NaiveDate) -> StampResult<Self> {
        let recipient = recipient.into().trim().to_string();
        let task = task.into().trim().to_string();

        if recipient.is_empty() || !recipient.is_ascii() {
            return Err(ValidationError::settings("Please fill the name of the recipient in English").into());
        }
        if task.is_empty() || !task.is_ascii() {
            return Err(ValidationError::settings("Please fill the task name in English").into());
        }

        Ok(Self { recipient, task, date })
    }

    /// e.g. `For Ann - comp - 26/10/17`
    pub fn overlay_text(&self) -> String {
        format!(
            "For {} - {} - {}",
            self.recipient,
            self.task,
            self.date.format("%y/%m/%d")
        )
    }

    /// e.g. `Ann_261017`
    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.recipient, self.date.format("%y%m%d"))
    }

    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(self.folder_name())
    }

    /// Maps each input to a file of the same name inside `output_dir`.
    pub fn items(inputs: &[PathBuf], output_dir: &Path) -> Vec<JobItem> {
        inputs
            .iter()
            .map(|input| {
                let name = input.file_name().unwrap_or(input.as_os_str());
                JobItem::new(input.clone(), output_dir.join(name))
            })
            .collect()
    }

    /// Filters the inputs, creates the output folder and assembles the job.
    pub async fn prepare(
        &self,
        inputs: &[PathBuf],
        output_root: &Path,
        overlay_path: PathBuf,
        opacity: Opacity,
        resize_limit: Option<ResizeLimit>,
    ) -> StampResult<PreparedJob> {
        let selection = select_inputs(inputs);
        if selection.accepted.is_empty() {
            return Err(ValidationError::EmptyJob.into());
        }

        // A rejected job must not leave an output folder behind.
        validate_overlay_path(&overlay_path)?;

        let output_dir = self.output_dir(output_root);
        tokio::fs::create_dir_all(&output_dir).await?;
        debug!("Output directory ready: {}", output_dir.display());

        let job = Job::new(
            Self::items(&selection.accepted, &output_dir),
            self.overlay_text(),
            overlay_path,
            opacity,
        )
        .with_resize_limit(resize_limit);

        Ok(PreparedJob {
            job,
            output_dir,
            skipped: selection.skipped,
        })
    }
}
