//! Job definition: what a stamping run is asked to do.

use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

/// One input/output file pair within a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobItem {
    /// Path to the source media file
    pub input_path: PathBuf,
    /// Path where the stamped copy will be written
    pub output_path: PathBuf,
}

impl JobItem {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }
}

/// Watermark opacity, either fixed or chosen per item by the stamper.
///
/// The orchestrator passes this through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opacity {
    Fixed(f32),
    Adaptive { low: f32, high: f32 },
}

impl fmt::Display for Opacity {
    /// Renders `0.12` for a fixed value and `0.075:0.15` for a range.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => write!(f, "{value}"),
            Self::Adaptive { low, high } => write!(f, "{low}:{high}"),
        }
    }
}

/// Upper size bound handed to the resize primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResizeLimit(NonZeroU32);

impl ResizeLimit {
    /// Returns `None` for zero.
    pub fn new(limit: u32) -> Option<Self> {
        NonZeroU32::new(limit).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ResizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A batch stamping request.
///
/// Immutable once accepted by the orchestrator: the run holds it behind an
/// `Arc` and never hands out a mutable reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Ordered input/output pairs
    pub items: Vec<JobItem>,
    /// Text burned into every item
    pub overlay_text: String,
    /// Overlay image composited under the text
    pub overlay_path: PathBuf,
    pub opacity: Opacity,
    /// Optional size bound for resize-eligible items
    #[serde(default)]
    pub resize_limit: Option<ResizeLimit>,
}

impl Job {
    pub fn new(
        items: Vec<JobItem>,
        overlay_text: impl Into<String>,
        overlay_path: impl Into<PathBuf>,
        opacity: Opacity,
    ) -> Self {
        Self {
            items,
            overlay_text: overlay_text.into(),
            overlay_path: overlay_path.into(),
            opacity,
            resize_limit: None,
        }
    }

    pub fn with_resize_limit(mut self, limit: Option<ResizeLimit>) -> Self {
        self.resize_limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn input_paths(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().map(|item| item.input_path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_renders_for_tools() {
        assert_eq!(Opacity::Fixed(0.12).to_string(), "0.12");
        assert_eq!(
            Opacity::Adaptive { low: 0.075, high: 0.15 }.to_string(),
            "0.075:0.15"
        );
    }

    #[test]
    fn zero_resize_limit_is_unrepresentable() {
        assert!(ResizeLimit::new(0).is_none());
        assert_eq!(ResizeLimit::new(4096).map(|l| l.get()), Some(4096));
    }

    #[test]
    fn opacity_deserializes_as_tagged_variant() {
        let fixed: Opacity = serde_json::from_str(r#"{"fixed":0.2}"#).unwrap();
        assert_eq!(fixed, Opacity::Fixed(0.2));
        let adaptive: Opacity =
            serde_json::from_str(r#"{"adaptive":{"low":0.1,"high":0.3}}"#).unwrap();
        assert_eq!(adaptive, Opacity::Adaptive { low: 0.1, high: 0.3 });
    }
}
