//! Temp files created by resize substitution during one run.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use crate::utils::{StampError, remove_file_if_exists};

/// Owns the resized temp copies of a single run.
///
/// [`cleanup`](Self::cleanup) drains the set, so every path is removed at most
/// once. Dropping a set that still holds paths removes them too, which covers
/// a run task that dies before reaching its cleanup step.
#[derive(Debug, Default)]
pub struct TempFileSet {
    paths: Vec<PathBuf>,
}

impl TempFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: PathBuf) {
        debug!("Tracking temp file: {}", path.display());
        self.paths.push(path);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Deletes every tracked file and returns how many were removed.
    ///
    /// Files that are already gone are not counted. A failed deletion is
    /// logged and does not stop the remaining ones.
    pub fn cleanup(&mut self) -> usize {
        if self.paths.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for path in self.paths.drain(..) {
            match remove_file_if_exists(&path) {
                Ok(true) => removed += 1,
                Ok(false) => debug!("Temp file already gone: {}", path.display()),
                Err(e) => {
                    let err = StampError::cleanup(format!("{}: {}", path.display(), e));
                    warn!("{}", err);
                }
            }
        }
        info!("{} temp files removed", removed);
        removed
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

impl Drop for TempFileSet {
    fn drop(&mut self) {
        if !self.paths.is_empty() {
            warn!("Run ended without cleanup, removing {} temp files", self.paths.len());
            self.cleanup();
        }
    }
}
