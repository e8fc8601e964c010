//! Error types shared by the media model, planner and writer.

use std::path::PathBuf;
use thiserror::Error;

use crate::media::StreamKind;
use crate::probe::ProbeError;

/// Errors raised while editing, planning or writing media files.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The probing tool could not read the file.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Codec override is not allowed for the stream's kind.
    #[error("Codec '{codec}' is not supported for {kind} streams")]
    UnsupportedCodec { codec: String, kind: StreamKind },

    /// Extension has no support table for the stream kind.
    #[error("Extension '{extension}' does not support {kind} streams")]
    UnsupportedExtension { extension: String, kind: StreamKind },

    /// A fresh path was required but the path already exists.
    #[error("Path already exists: {path}")]
    PathCollision { path: PathBuf },

    /// Invalid combination of planner inputs.
    #[error("Invalid plan: {reason}")]
    Planner { reason: String },

    /// Operation not valid for an inner/outer stream or container.
    #[error("Operation '{operation}' is not allowed: {reason}")]
    OperationMode {
        operation: &'static str,
        reason: String,
    },

    /// A kind-specific setter was called on a stream of another kind.
    #[error("Expected a {expected} stream, found {actual}")]
    KindMismatch {
        expected: StreamKind,
        actual: StreamKind,
    },

    /// The object has no path to operate on.
    #[error("No path set for {what}")]
    MissingPath { what: &'static str },

    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    EncoderNotFound { path: PathBuf },

    /// The external encoder exited with a non-zero status.
    #[error("Encoder exited with code {code:?}")]
    ProcessFailure {
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// Encoder run timed out.
    #[error("Encoder timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Encoder run was cancelled.
    #[error("Encoder run cancelled")]
    Cancelled,

    /// I/O error while preparing or swapping output files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Creates a planner error.
    pub fn planner(reason: impl Into<String>) -> Self {
        Self::Planner {
            reason: reason.into(),
        }
    }

    /// Creates an operation mode error.
    pub fn operation_mode(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::OperationMode {
            operation,
            reason: reason.into(),
        }
    }

    /// Creates an unsupported extension error.
    pub fn unsupported_extension(extension: impl Into<String>, kind: StreamKind) -> Self {
        Self::UnsupportedExtension {
            extension: extension.into(),
            kind,
        }
    }

    /// Whether this error is retryable.
    ///
    /// The encoder is deterministic, so only interrupted runs qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Cancelled | Self::Io(_))
    }
}
