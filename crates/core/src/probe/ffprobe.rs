//! FFprobe-based prober implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::error::ProbeError;
use super::traits::Prober;
use super::types::ProbeReport;
use crate::config::RemuxConfig;

/// FFprobe-based prober implementation.
pub struct FfprobeProber {
    config: RemuxConfig,
}

impl FfprobeProber {
    /// Creates a new prober with the given configuration.
    pub fn new(config: RemuxConfig) -> Self {
        Self { config }
    }

    /// Creates a prober with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RemuxConfig::default())
    }

    /// Parses ffprobe JSON output into a report.
    ///
    /// ffprobe leaves `filename` as given on the command line; it is pinned
    /// to the probed path so later saves read from exactly this location.
    fn parse_probe_output(path: &Path, output: &str) -> Result<ProbeReport, ProbeError> {
        let mut report: ProbeReport =
            serde_json::from_str(output).map_err(|e| ProbeError::Parse {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;
        report.format.filename = Some(path.to_string_lossy().to_string());
        Ok(report)
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-show_chapters",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::ProberNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    ProbeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(ProbeError::probe_failed(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = Self::parse_probe_output(path, &stdout)?;
        tracing::debug!(
            path = %path.display(),
            streams = report.streams.len(),
            chapters = report.chapters.len(),
            "Probed media file"
        );
        Ok(report)
    }

    async fn validate(&self) -> Result<(), ProbeError> {
        let result = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ProbeError::ProberNotFound {
                path: self.config.ffprobe_path.clone(),
            }),
            Err(e) => Err(ProbeError::Io(e)),
        }
    }
}
