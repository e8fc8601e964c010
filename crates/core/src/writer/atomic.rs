//! Crash-safe writes of planned commands.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::fs;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::traits::Encoder;
use crate::error::MediaError;
use crate::planner::Plan;

/// One async lock per final output path, shared by every writer in the process.
static PATH_LOCKS: Lazy<StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| StdMutex::new(HashMap::new()));

fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    // Locks nobody holds anymore.
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    Arc::clone(
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(()))),
    )
}

/// Picks the first `"<stem> (temp N).<ext>"` sibling of `path` that does not exist.
pub fn choose_temp_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().to_string());
    let mut i = 1u32;
    loop {
        let name = match &extension {
            Some(ext) => format!("{} (temp {}).{}", stem, i, ext),
            None => format!("{} (temp {})", stem, i),
        };
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    /// Where the output now lives.
    pub path: PathBuf,
    /// Temporary file the output was encoded into before replacing `path`.
    pub temp_path: Option<PathBuf>,
}

impl WriteOutcome {
    /// Whether an existing file was replaced.
    pub fn replaced_existing(&self) -> bool {
        self.temp_path.is_some()
    }
}

/// Runs plans through an encoder without ever losing the original file.
pub struct AtomicWriter {
    encoder: Arc<dyn Encoder>,
}

impl AtomicWriter {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self { encoder }
    }

    /// Writes `plan` to `target`.
    ///
    /// A missing target is encoded directly. An existing one is encoded into
    /// a temporary sibling, then replaced by renaming the temporary file over
    /// it. If the encoder fails, the original stays byte-identical.
    pub async fn write(
        &self,
        plan: &Plan,
        target: &Path,
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, MediaError> {
        let lock = path_lock(target);
        let _guard = lock.lock().await;

        if !fs::try_exists(target).await? {
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            if let Err(e) = self.encoder.run(&plan.args, target, cancel).await {
                remove_leftover(target).await;
                return Err(e);
            }
            info!(path = %target.display(), encoder = self.encoder.name(), "Wrote new file");
            return Ok(WriteOutcome {
                path: target.to_path_buf(),
                temp_path: None,
            });
        }

        let temp = choose_temp_path(target);
        if let Err(e) = self.encoder.run(&plan.args, &temp, cancel).await {
            remove_leftover(&temp).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp, target).await {
            remove_leftover(&temp).await;
            return Err(MediaError::Io(e));
        }
        info!(
            path = %target.display(),
            temp = %temp.display(),
            encoder = self.encoder.name(),
            "Replaced file in place"
        );
        Ok(WriteOutcome {
            path: target.to_path_buf(),
            temp_path: Some(temp),
        })
    }
}

async fn remove_leftover(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove leftover output {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEncoder;
    use tempfile::TempDir;

    fn plan() -> Plan {
        Plan {
            args: vec!["-i".to_string(), "in.mkv".to_string()],
            streams: vec![],
        }
    }

    #[test]
    fn test_choose_temp_path() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("movie.mkv");
        assert_eq!(choose_temp_path(&target), temp.path().join("movie (temp 1).mkv"));

        std::fs::write(temp.path().join("movie (temp 1).mkv"), b"x").unwrap();
        std::fs::write(temp.path().join("movie (temp 2).mkv"), b"x").unwrap();
        let chosen = choose_temp_path(&target);
        assert_eq!(chosen, temp.path().join("movie (temp 3).mkv"));
        assert!(!chosen.exists());
        assert_eq!(choose_temp_path(&target), chosen);
    }

    #[test]
    fn test_choose_temp_path_without_extension() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("movie");
        assert_eq!(choose_temp_path(&target), temp.path().join("movie (temp 1)"));
    }

    #[tokio::test]
    async fn test_write_new_file_directly() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out").join("movie.mkv");
        let encoder = Arc::new(MockEncoder::new());
        let writer = AtomicWriter::new(encoder.clone());

        let outcome = writer
            .write(&plan(), &target, &CancellationToken::new())
            .await
            .unwrap();

        assert!(!outcome.replaced_existing());
        assert_eq!(std::fs::read(&target).unwrap(), b"encoded");
        let runs = encoder.recorded_runs().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].output, target);
        assert_eq!(runs[0].args, plan().args);
    }

    #[tokio::test]
    async fn test_replace_existing_file() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("movie.mkv");
        std::fs::write(&target, b"original").unwrap();
        let encoder = Arc::new(MockEncoder::new());
        let writer = AtomicWriter::new(encoder.clone());

        let outcome = writer
            .write(&plan(), &target, &CancellationToken::new())
            .await
            .unwrap();

        let temp_path = temp.path().join("movie (temp 1).mkv");
        assert_eq!(outcome.temp_path.as_deref(), Some(temp_path.as_path()));
        assert_eq!(encoder.recorded_runs().await[0].output, temp_path);
        assert_eq!(std::fs::read(&target).unwrap(), b"encoded");
        assert!(!temp_path.exists());
    }

    #[tokio::test]
    async fn test_failure_keeps_original() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("movie.mkv");
        std::fs::write(&target, b"original").unwrap();
        let encoder = Arc::new(MockEncoder::new());
        encoder.set_exit_code(Some(1)).await;
        let writer = AtomicWriter::new(encoder.clone());

        let result = writer.write(&plan(), &target, &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(MediaError::ProcessFailure { code: Some(1), .. })
        ));
        assert_eq!(std::fs::read(&target).unwrap(), b"original");
        assert!(!temp.path().join("movie (temp 1).mkv").exists());
    }

    #[tokio::test]
    async fn test_failed_new_file_is_removed() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("movie.srt");
        let encoder = Arc::new(MockEncoder::new());
        encoder.set_exit_code(Some(1)).await;
        let writer = AtomicWriter::new(encoder);

        let result = writer.write(&plan(), &target, &CancellationToken::new()).await;
        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_cancelled_write_keeps_original() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("movie.mkv");
        std::fs::write(&target, b"original").unwrap();
        let writer = AtomicWriter::new(Arc::new(MockEncoder::new()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = writer.write(&plan(), &target, &cancel).await;
        assert!(matches!(result, Err(MediaError::Cancelled)));
        assert_eq!(std::fs::read(&target).unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_same_path_shares_lock() {
        let first = path_lock(Path::new("/tmp/remux-lock-test.mkv"));
        let second = path_lock(Path::new("/tmp/remux-lock-test.mkv"));
        assert!(Arc::ptr_eq(&first, &second));

        let _guard = first.lock().await;
        assert!(second.try_lock().is_err());
    }
}
