//! Error types for the watermark stamper.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use serde::Serialize;

/// Validation errors raised before a run is allowed to start.
#[derive(Error, Debug, Serialize)]
pub enum ValidationError {
    /// The job contains no items
    #[error("Job has no items to stamp")]
    EmptyJob,
    /// Path-related validation error
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
}

/// File path errors.
#[derive(Error, Debug, Serialize)]
pub enum PathError {
    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    /// Path exists but is not a file
    #[error("Not a file: {0}")]
    NotFile(PathBuf),
    /// The directory an output would be written to does not exist
    #[error("Output directory does not exist: {0}")]
    MissingParent(PathBuf),
    /// Output path would overwrite its own input
    #[error("Output path is the same as the input: {0}")]
    SameAsInput(PathBuf),
    /// IO error accessing the path
    #[error("IO error: {0}")]
    IO(String),
}

/// Main error type for the stamper.
#[derive(Error, Debug, Serialize)]
pub enum StampError {
    /// Job failed pre-flight validation; the run never began
    #[error("Invalid job: {0}")]
    InvalidJob(#[from] ValidationError),

    /// Stamping a single item failed
    #[error("Processing error: {0}")]
    Processing(String),

    /// Resizing a single item failed
    #[error("Resize error: {0}")]
    Resize(String),

    /// A temp file could not be removed
    #[error("Cleanup error: {0}")]
    Cleanup(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Unsupported or invalid media format
    #[error("Format error: {0}")]
    Format(String),

    /// External tool could not be run or misbehaved
    #[error("Tool error: {0}")]
    Tool(String),

    /// Tool configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// No async runtime available to host the run
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Another run is still in progress on this orchestrator
    #[error("A stamping run is already in progress")]
    Busy,
}

/// Convenience result type for stamper operations.
pub type StampResult<T> = Result<T, StampError>;

// Helper methods for error creation
impl StampError {
    pub fn processing<T: Into<String>>(msg: T) -> Self {
        Self::Processing(msg.into())
    }

    pub fn resize<T: Into<String>>(msg: T) -> Self {
        Self::Resize(msg.into())
    }

    pub fn cleanup<T: Into<String>>(msg: T) -> Self {
        Self::Cleanup(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn tool<T: Into<String>>(msg: T) -> Self {
        Self::Tool(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// Returns `true` for errors that reject a job before it runs.
    pub fn is_invalid_job(&self) -> bool {
        matches!(self, Self::InvalidJob(_))
    }
}

// Helper methods for validation error creation
impl ValidationError {
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotFound(path.into()))
    }

    pub fn not_a_file(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotFile(path.into()))
    }

    pub fn missing_parent(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::MissingParent(path.into()))
    }

    pub fn same_as_input(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::SameAsInput(path.into()))
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

// Convert std::io::Error to StampError
impl From<io::Error> for StampError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert io::Error to PathError
impl From<io::Error> for PathError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert PathError to StampError
impl From<PathError> for StampError {
    fn from(err: PathError) -> Self {
        Self::InvalidJob(ValidationError::Path(err))
    }
}

impl From<serde_json::Error> for StampError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
