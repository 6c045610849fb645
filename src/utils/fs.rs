use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Get file size in bytes, 0 when the file cannot be read
pub fn file_size(path: impl AsRef<Path>) -> u64 {
    std::fs::metadata(path.as_ref())
        .map(|m| m.len())
        .unwrap_or(0)
}

/// Removes a file, treating an already-missing file as success.
///
/// Returns `true` when a file was actually deleted.
pub fn remove_file_if_exists(path: impl AsRef<Path>) -> io::Result<bool> {
    match std::fs::remove_file(path.as_ref()) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Builds a fresh path in the system temp directory.
///
/// The file is not created. `extension` is appended without a leading dot.
pub fn unique_temp_path(prefix: &str, extension: Option<&str>) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = match extension {
        Some(ext) => format!("{prefix}-{}-{stamp}-{seq}.{ext}", std::process::id()),
        None => format!("{prefix}-{}-{stamp}-{seq}", std::process::id()),
    };
    std::env::temp_dir().join(name)
}

/// Get file name component as a display string
pub fn file_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
