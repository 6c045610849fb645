//! Pipeline primitives consumed by the orchestrator.
//!
//! Both calls are synchronous and may take seconds; the orchestrator runs them
//! on tokio's blocking pool, one at a time.

use std::path::{Path, PathBuf};
use crate::core::{Opacity, ResizeLimit, StampReport};
use crate::utils::StampResult;

/// Everything the stamp primitive needs for one item.
#[derive(Debug, Clone, Copy)]
pub struct StampRequest<'a> {
    /// Effective input, possibly a resized temp copy
    pub input_path: &'a Path,
    pub overlay_path: &'a Path,
    pub text: &'a str,
    pub opacity: Opacity,
    pub output_path: &'a Path,
}

/// Composites the watermark onto one media file.
pub trait WatermarkStamper: Send + Sync {
    /// Writes the stamped copy to `request.output_path`.
    ///
    /// `on_progress(current, total)` may be called any number of times while
    /// the item is processed. Ordinary per-item failures come back as `Err`.
    fn stamp(
        &self,
        request: &StampRequest<'_>,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> StampResult<StampReport>;
}

/// Downscales one media file into a new temporary file.
pub trait MediaResizer: Send + Sync {
    /// Returns the temp path when a downscaled copy was written, `None` when
    /// the source is already within `limit`. Never touches `input_path`.
    fn resize(&self, input_path: &Path, limit: ResizeLimit) -> StampResult<Option<PathBuf>>;
}

/// Resizer for setups without a resize tool: every source is kept as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResizer;

impl MediaResizer for PassthroughResizer {
    fn resize(&self, _input_path: &Path, _limit: ResizeLimit) -> StampResult<Option<PathBuf>> {
        Ok(None)
    }
}
