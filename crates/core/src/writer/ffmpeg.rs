//! FFmpeg-backed encoder.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::traits::Encoder;
use crate::config::RemuxConfig;
use crate::error::MediaError;

/// Lines of encoder output worth reporting on failure.
static ERROR_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(error|invalid|could not|unable|no such)\b").ok());

/// Runs the configured ffmpeg binary.
pub struct FfmpegEncoder {
    config: RemuxConfig,
}

impl FfmpegEncoder {
    /// Creates a new encoder with the given configuration.
    pub fn new(config: RemuxConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RemuxConfig::default())
    }

    fn spawn_error(&self, e: std::io::Error) -> MediaError {
        if e.kind() == std::io::ErrorKind::NotFound {
            MediaError::EncoderNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            MediaError::Io(e)
        }
    }
}

fn is_error_line(line: &str) -> bool {
    ERROR_LINE.as_ref().is_some_and(|re| re.is_match(line))
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn run(
        &self,
        args: &[String],
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), MediaError> {
        if cancel.is_cancelled() {
            return Err(MediaError::Cancelled);
        }

        debug!(
            ffmpeg = %self.config.ffmpeg_path.display(),
            args = ?args,
            output = %output.display(),
            "Starting encoder"
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(args)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::Io(std::io::Error::other("encoder stderr not captured")))?;
        let mut reader = BufReader::new(stderr);

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let run = async {
            // Encoder output is not guaranteed to be UTF-8; stderr must be
            // drained to the end or the child blocks on a full pipe.
            let mut error_output = String::new();
            let mut buf = Vec::new();
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf).await? == 0 {
                    break;
                }
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end();
                if is_error_line(line) {
                    error_output.push_str(line);
                    error_output.push('\n');
                }
            }
            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => None,
            result = timeout(timeout_duration, run) => Some(result),
        };

        match outcome {
            None => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill cancelled encoder: {}", e);
                }
                Err(MediaError::Cancelled)
            }
            Some(Err(_)) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out encoder: {}", e);
                }
                Err(MediaError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
            Some(Ok(Err(e))) => Err(MediaError::Io(e)),
            Some(Ok(Ok((status, error_output)))) => {
                if status.success() {
                    Ok(())
                } else {
                    Err(MediaError::ProcessFailure {
                        code: status.code(),
                        stderr: if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    })
                }
            }
        }
    }

    async fn validate(&self) -> Result<(), MediaError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(MediaError::ProcessFailure {
                code: output.status.code(),
                stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
            });
        }
        Ok(())
    }
}
