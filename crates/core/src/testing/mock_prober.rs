//! Mock prober for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::probe::{ProbeError, ProbeReport, Prober};

/// Mock implementation of the Prober trait.
///
/// Returns canned reports per path and records every probed path.
///
/// # Example
///
/// ```rust,ignore
/// use remux_core::testing::{fixtures, MockProber};
///
/// let prober = MockProber::new();
/// prober.set_report("/movies/movie.mkv", fixtures::movie_report()).await;
///
/// let report = prober.probe(Path::new("/movies/movie.mkv")).await?;
/// assert_eq!(prober.probe_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockProber {
    /// Canned reports by path.
    reports: Arc<RwLock<HashMap<PathBuf, ProbeReport>>>,
    /// Paths probed so far, in order.
    probed: Arc<RwLock<Vec<PathBuf>>>,
    /// If set, the next probe will fail with this error.
    next_error: Arc<RwLock<Option<ProbeError>>>,
}

impl Default for MockProber {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProber {
    /// Create a new mock prober.
    pub fn new() -> Self {
        Self {
            reports: Arc::new(RwLock::new(HashMap::new())),
            probed: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the report returned for a specific path.
    pub async fn set_report(&self, path: impl AsRef<Path>, report: ProbeReport) {
        self.reports
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), report);
    }

    /// Configure the next probe to fail with the given error.
    pub async fn set_next_error(&self, error: ProbeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Paths probed so far.
    pub async fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed.read().await.clone()
    }

    pub async fn probe_count(&self) -> usize {
        self.probed.read().await.len()
    }
}

#[async_trait]
impl Prober for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError> {
        self.probed.write().await.push(path.to_path_buf());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let mut report = self
            .reports
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| ProbeError::NotFound {
                path: path.to_path_buf(),
            })?;
        report.format.filename = Some(path.to_string_lossy().to_string());
        Ok(report)
    }

    async fn validate(&self) -> Result<(), ProbeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_canned_report() {
        let prober = MockProber::new();
        prober.set_report("/m/movie.mkv", fixtures::movie_report()).await;

        let report = prober.probe(Path::new("/m/movie.mkv")).await.unwrap();
        assert_eq!(report.streams.len(), 3);
        assert_eq!(report.format.filename.as_deref(), Some("/m/movie.mkv"));
        assert_eq!(prober.probe_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_path_and_injected_error() {
        let prober = MockProber::new();
        let missing = prober.probe(Path::new("/m/none.mkv")).await;
        assert!(matches!(missing, Err(ProbeError::NotFound { .. })));

        prober.set_report("/m/movie.mkv", fixtures::movie_report()).await;
        prober
            .set_next_error(ProbeError::probe_failed("corrupt header"))
            .await;
        assert!(prober.probe(Path::new("/m/movie.mkv")).await.is_err());
        assert!(prober.probe(Path::new("/m/movie.mkv")).await.is_ok());
        assert_eq!(prober.probed_paths().await.len(), 3);
    }
}
