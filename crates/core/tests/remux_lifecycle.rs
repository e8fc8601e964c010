//! Save and extract lifecycle integration tests.
//!
//! These tests drive the remuxer with a mock prober and encoder over real
//! files in a temporary directory:
//! - In-place saves go through a temporary sibling and replace the original
//! - Saves to new paths and extractions write directly
//! - Path collisions are rejected before the encoder runs
//! - Encoder failures leave the original file untouched

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use remux_core::{
    media::StreamKind,
    testing::{fixtures, MockEncoder, MockProber},
    CodecDecision, Container, MediaError, PlanSettings, RemuxConfig, Remuxer, Stream,
};

/// Test helper wiring a remuxer to mocks and a scratch directory.
struct TestHarness {
    remuxer: Remuxer,
    prober: Arc<MockProber>,
    encoder: Arc<MockEncoder>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let prober = Arc::new(MockProber::new());
        let encoder = Arc::new(MockEncoder::new());
        let remuxer = Remuxer::new(RemuxConfig::default(), prober.clone(), encoder.clone());
        Self {
            remuxer,
            prober,
            encoder,
            temp_dir,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Creates `name` on disk with `contents` and registers its probe report.
    async fn add_file(&self, name: &str, contents: &[u8], report: remux_core::ProbeReport) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("Failed to write fixture file");
        self.prober.set_report(&path, report).await;
        path
    }

    async fn open_container(&self, path: &Path) -> Container {
        self.remuxer
            .open(path)
            .await
            .expect("Failed to open container")
            .into_container()
            .expect("Expected a container")
    }

    async fn open_stream(&self, path: &Path) -> Stream {
        self.remuxer
            .open(path)
            .await
            .expect("Failed to open stream")
            .into_stream()
            .expect("Expected a stream")
    }
}

#[tokio::test]
async fn test_save_in_place_replaces_original() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let mut container = harness.open_container(&path).await;

    container.streams_mut()[0].set_codec("h265").unwrap();
    let outcome = harness
        .remuxer
        .save_container(&mut container, PlanSettings::with_crf(22))
        .await
        .unwrap();

    let temp_path = harness.path("movie (temp 1).mkv");
    assert_eq!(outcome.temp_path.as_deref(), Some(temp_path.as_path()));
    assert!(!temp_path.exists());
    assert_eq!(std::fs::read(&path).unwrap(), b"encoded");

    let runs = harness.encoder.recorded_runs().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].output, temp_path);
    let args = &runs[0].args;
    let input = args.iter().position(|a| a == "-i").unwrap();
    assert_eq!(args[input + 1], path.to_string_lossy());
    assert_eq!(args.iter().filter(|a| a.as_str() == "-crf").count(), 1);
    assert_eq!(args.iter().filter(|a| a.as_str() == "-map").count(), 3);

    // Re-probed from the final path: back to an unmodified state.
    assert_eq!(harness.prober.probed_paths().await, vec![path.clone(), path.clone()]);
    assert!(!container.is_modified());
    assert_eq!(container.path(), Some(path.as_path()));
}

#[tokio::test]
async fn test_save_as_new_extension_writes_directly() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let target = harness.path("movie.mp4");
    harness.prober.set_report(&target, fixtures::movie_report()).await;
    let mut container = harness.open_container(&path).await;

    container.streams_mut()[0].set_codec("h265").unwrap();
    let outcome = harness
        .remuxer
        .save_container_as(&mut container, &target, PlanSettings::default())
        .await
        .unwrap();

    assert!(!outcome.replaced_existing());
    assert_eq!(std::fs::read(&path).unwrap(), b"original");
    assert_eq!(std::fs::read(&target).unwrap(), b"encoded");
    assert_eq!(container.path(), Some(target.as_path()));
    assert_eq!(container.default_path(), Some(target.as_path()));

    let args = &harness.encoder.recorded_runs().await[0].args;
    let codec = args.iter().position(|a| a == "-c:0").unwrap();
    assert_eq!(args[codec + 1], "libx265");
    assert!(args.iter().any(|a| a == "-tag:0"));
    // SubRip is not storable in MP4 and falls back to mov_text.
    let subtitle = args.iter().position(|a| a == "-c:2").unwrap();
    assert_eq!(args[subtitle + 1], "mov_text");
}

#[tokio::test]
async fn test_save_as_existing_path_is_rejected() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let other = harness.add_file("other.mkv", b"other", fixtures::movie_report()).await;
    let mut container = harness.open_container(&path).await;

    let result = harness
        .remuxer
        .save_container_as(&mut container, &other, PlanSettings::default())
        .await;

    assert!(matches!(result, Err(MediaError::PathCollision { .. })));
    assert_eq!(harness.encoder.run_count().await, 0);
    assert_eq!(std::fs::read(&other).unwrap(), b"other");
    assert_eq!(container.path(), Some(path.as_path()));
}

#[tokio::test]
async fn test_failed_save_keeps_original() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let mut container = harness.open_container(&path).await;
    container.remove_streams(|s| s.kind() == StreamKind::Subtitle);
    harness.encoder.set_exit_code(Some(1)).await;

    let result = harness
        .remuxer
        .save_container(&mut container, PlanSettings::default())
        .await;

    assert!(matches!(result, Err(MediaError::ProcessFailure { .. })));
    assert_eq!(std::fs::read(&path).unwrap(), b"original");
    assert!(!harness.path("movie (temp 1).mkv").exists());
    // The edit survives for a retry.
    assert!(container.is_modified());
    assert_eq!(container.streams().len(), 2);
}

#[tokio::test]
async fn test_failed_save_as_keeps_previous_path() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let mut container = harness.open_container(&path).await;
    harness.encoder.set_exit_code(Some(1)).await;
    let target = harness.path("movie.mp4");

    let result = harness
        .remuxer
        .save_container_as(&mut container, &target, PlanSettings::default())
        .await;

    assert!(matches!(result, Err(MediaError::ProcessFailure { .. })));
    assert!(!target.exists());
    assert_eq!(container.path(), Some(path.as_path()));

    let subtitle = harness
        .add_file("movie.srt", b"subs", fixtures::subtitle_report())
        .await;
    let mut stream = harness.open_stream(&subtitle).await;
    let no_extension = harness.path("movie-subs");

    let result = harness
        .remuxer
        .save_stream_as(&mut stream, &no_extension, PlanSettings::default())
        .await;

    assert!(matches!(result, Err(MediaError::Planner { .. })));
    assert_eq!(stream.path(), Some(subtitle.as_path()));
    assert_eq!(harness.encoder.run_count().await, 1);
}

#[tokio::test]
async fn test_cancelled_save_keeps_original() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let mut container = harness.open_container(&path).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = harness
        .remuxer
        .save_container_with_cancel(&mut container, PlanSettings::default(), &cancel)
        .await;

    assert!(matches!(result, Err(MediaError::Cancelled)));
    assert_eq!(std::fs::read(&path).unwrap(), b"original");
}

#[tokio::test]
async fn test_extract_subtitle_to_new_file() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let target = harness.path("movie.en.srt");
    harness.prober.set_report(&target, fixtures::subtitle_report()).await;
    let container = harness.open_container(&path).await;

    let subtitle = container.subtitles()[0];
    let extracted = harness
        .remuxer
        .extract(subtitle, &target, PlanSettings::default())
        .await
        .unwrap();

    assert!(extracted.is_outer());
    assert_eq!(extracted.kind(), StreamKind::Subtitle);
    assert_eq!(extracted.path(), Some(target.as_path()));

    let runs = harness.encoder.recorded_runs().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].output, target);
    let map = runs[0].args.iter().position(|a| a == "-map").unwrap();
    assert_eq!(runs[0].args[map + 1], "0:2");
    assert_eq!(std::fs::read(&path).unwrap(), b"original");
}

#[tokio::test]
async fn test_extract_to_existing_path_is_rejected() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let taken = harness
        .add_file("movie.srt", b"1\n", fixtures::subtitle_report())
        .await;
    let container = harness.open_container(&path).await;

    let result = harness
        .remuxer
        .extract(container.subtitles()[0], &taken, PlanSettings::default())
        .await;

    assert!(matches!(result, Err(MediaError::PathCollision { .. })));
    assert_eq!(harness.encoder.run_count().await, 0);
}

#[tokio::test]
async fn test_add_loose_subtitle_to_container() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let subtitle_path = harness
        .add_file("movie.fr.srt", b"1\n", fixtures::subtitle_report())
        .await;
    let mut container = harness.open_container(&path).await;
    let subtitle = harness.open_stream(&subtitle_path).await;

    container.push_stream(subtitle);
    harness
        .remuxer
        .save_container(&mut container, PlanSettings::default())
        .await
        .unwrap();

    let run = &harness.encoder.recorded_runs().await[0];
    assert_eq!(run.args.iter().filter(|a| a.as_str() == "-i").count(), 2);
    assert!(run.args.iter().any(|a| a == "1:0"));
    assert!(run.args.iter().any(|a| a == "-c:3"));
}

#[tokio::test]
async fn test_save_stream_with_new_extension() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.srt", b"1\n", fixtures::subtitle_report())
        .await;
    let target = harness.path("movie.ass");
    harness.prober.set_report(&target, fixtures::subtitle_report()).await;
    let mut stream = harness.open_stream(&path).await;

    stream.set_extension("ass").unwrap();
    harness
        .remuxer
        .save_stream(&mut stream, PlanSettings::default())
        .await
        .unwrap();

    let run = &harness.encoder.recorded_runs().await[0];
    assert_eq!(run.output, target);
    let codec = run.args.iter().position(|a| a == "-c:0").unwrap();
    assert_eq!(run.args[codec + 1], "ass");
    assert_eq!(stream.path(), Some(target.as_path()));
    assert!(!stream.is_modified());
}

#[tokio::test]
async fn test_planned_decisions_for_unchanged_mkv() {
    let harness = TestHarness::new();
    let path = harness
        .add_file("movie.mkv", b"original", fixtures::movie_report())
        .await;
    let container = harness.open_container(&path).await;

    let plan = remux_core::Planner::new(harness.remuxer.config())
        .plan_container(&container, &path, PlanSettings::default())
        .unwrap();

    assert_eq!(plan.mapped_count(), 3);
    assert!(plan
        .streams
        .iter()
        .all(|s| s.decision == CodecDecision::Copy));
    let outputs: Vec<usize> = plan.streams.iter().map(|s| s.output).collect();
    assert_eq!(outputs, vec![0, 1, 2]);
}
