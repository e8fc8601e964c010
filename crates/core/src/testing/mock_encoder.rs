//! Mock encoder for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::MediaError;
use crate::writer::Encoder;

/// A recorded encoder invocation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    /// Planned arguments, without the output path.
    pub args: Vec<String>,
    /// Output path the encoder was pointed at.
    pub output: PathBuf,
}

/// Mock implementation of the Encoder trait.
///
/// Writes a fixed payload to the output path and exits with a configurable
/// status. The payload is written even when the exit status is non-zero,
/// mimicking a half-written output.
///
/// # Example
///
/// ```rust,ignore
/// use remux_core::testing::MockEncoder;
///
/// let encoder = MockEncoder::new();
/// encoder.set_exit_code(Some(1)).await;
///
/// let result = encoder.run(&args, Path::new("/tmp/out.mkv"), &cancel).await;
/// assert!(result.is_err());
/// assert_eq!(encoder.run_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockEncoder {
    /// Recorded invocations.
    runs: Arc<RwLock<Vec<RecordedRun>>>,
    /// Bytes written to every output.
    payload: Arc<RwLock<Vec<u8>>>,
    /// Non-zero exit code to report, if any.
    exit_code: Arc<RwLock<Option<i32>>>,
    /// If set, the next run will fail with this error without writing.
    next_error: Arc<RwLock<Option<MediaError>>>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Create a new mock encoder that succeeds and writes `b"encoded"`.
    pub fn new() -> Self {
        Self {
            runs: Arc::new(RwLock::new(Vec::new())),
            payload: Arc::new(RwLock::new(b"encoded".to_vec())),
            exit_code: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded runs.
    pub async fn recorded_runs(&self) -> Vec<RecordedRun> {
        self.runs.read().await.clone()
    }

    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }

    /// Set the bytes written to the output path.
    pub async fn set_payload(&self, payload: impl Into<Vec<u8>>) {
        *self.payload.write().await = payload.into();
    }

    /// Make every run exit with `code`; `None` restores success.
    pub async fn set_exit_code(&self, code: Option<i32>) {
        *self.exit_code.write().await = code;
    }

    /// Configure the next run to fail with the given error.
    pub async fn set_next_error(&self, error: MediaError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        args: &[String],
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), MediaError> {
        self.runs.write().await.push(RecordedRun {
            args: args.to_vec(),
            output: output.to_path_buf(),
        });

        if cancel.is_cancelled() {
            return Err(MediaError::Cancelled);
        }
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let payload = self.payload.read().await.clone();
        tokio::fs::write(output, payload).await?;

        match *self.exit_code.read().await {
            Some(code) if code != 0 => Err(MediaError::ProcessFailure {
                code: Some(code),
                stderr: Some("mock encoder failure".to_string()),
            }),
            _ => Ok(()),
        }
    }

    async fn validate(&self) -> Result<(), MediaError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_payload_and_records() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.mkv");
        let encoder = MockEncoder::new();
        encoder.set_payload("data").await;

        encoder
            .run(&["-i".to_string()], &output, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"data");
        let runs = encoder.recorded_runs().await;
        assert_eq!(runs[0].args, vec!["-i"]);
        assert_eq!(runs[0].output, output);
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.mkv");
        let encoder = MockEncoder::new();

        encoder.set_next_error(MediaError::Timeout { timeout_secs: 5 }).await;
        let result = encoder.run(&[], &output, &CancellationToken::new()).await;
        assert!(matches!(result, Err(MediaError::Timeout { .. })));
        assert!(!output.exists());

        encoder.set_exit_code(Some(2)).await;
        let result = encoder.run(&[], &output, &CancellationToken::new()).await;
        assert!(matches!(
            result,
            Err(MediaError::ProcessFailure { code: Some(2), .. })
        ));
        assert!(output.exists());
        assert_eq!(encoder.run_count().await, 2);
    }
}
