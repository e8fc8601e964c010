//! Error types for the probe module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while probing a file.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Input file not found.
    #[error("Input file not found: {path}")]
    NotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    ProberNotFound { path: PathBuf },

    /// The prober ran but could not read the file.
    #[error("Failed to probe media file: {reason}")]
    Failed { reason: String },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse probe output: {reason}")]
    Parse { reason: String },

    /// I/O error while running the prober.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
