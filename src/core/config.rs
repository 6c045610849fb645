//! Tool configuration and stamping defaults.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::core::{Opacity, ResizeLimit};
use crate::utils::{StampError, StampResult};

/// Fixed opacity used when none is requested.
pub const DEFAULT_OPACITY: f32 = 0.12;
/// Bounds for a requested fixed opacity, as fractions.
pub const MIN_OPACITY: f32 = 0.05;
pub const MAX_OPACITY: f32 = 0.50;
/// Range the stamper picks from when opacity is adaptive.
pub const ADAPTIVE_OPACITY_RANGE: (f32, f32) = (0.075, 0.15);
/// Resize limits are offered in multiples of this many pixels.
pub const RESIZE_STEP: u32 = 512;
pub const DEFAULT_RESIZE_STEPS: u32 = 8;
pub const MAX_RESIZE_STEPS: u32 = 16;

pub fn default_opacity() -> Opacity {
    Opacity::Fixed(DEFAULT_OPACITY)
}

pub fn adaptive_opacity() -> Opacity {
    let (low, high) = ADAPTIVE_OPACITY_RANGE;
    Opacity::Adaptive { low, high }
}

pub fn default_resize_limit() -> Option<ResizeLimit> {
    ResizeLimit::new(RESIZE_STEP * DEFAULT_RESIZE_STEPS)
}

/// An external program plus its argument template.
///
/// Arguments may contain the placeholders `{input}`, `{output}`,
/// `{overlay}`, `{text}`, `{opacity}` and `{limit}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Expands placeholders in every argument.
    pub fn render_args(&self, values: &[(&str, String)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                values.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect()
    }
}

/// Which external tools implement the pipeline primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Watermark stamping tool
    pub stamp: ToolCommand,
    /// Resize tool; without it resizing is skipped
    #[serde(default)]
    pub resize: Option<ToolCommand>,
    /// Overlay image used when none is given on the command line
    #[serde(default)]
    pub overlay: Option<PathBuf>,
}

impl ToolConfig {
    pub fn load(path: impl AsRef<Path>) -> StampResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StampError::config(format!("Cannot read tool config {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&raw)?;
        debug!("Loaded tool config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> StampResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        if config.stamp.program.as_os_str().is_empty() {
            return Err(StampError::config("Stamp tool program is empty"));
        }
        Ok(config)
    }
}
