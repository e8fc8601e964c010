//! Open, edit and save media files.
//!
//! `open` classifies a path as a container or a single stream. `Remuxer`
//! saves edited entities through the planner and the atomic writer, then
//! re-probes the written file so the entity reflects what is on disk.

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::RemuxConfig;
use crate::error::MediaError;
use crate::media::{Container, Stream};
use crate::planner::{PlanInput, PlanSettings, Planner};
use crate::probe::{FfprobeProber, ProbeError, Prober};
use crate::writer::{AtomicWriter, Encoder, FfmpegEncoder, WriteOutcome};

/// A probed file.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaFile {
    /// More than one stream.
    Container(Container),
    /// Exactly one stream, standing alone.
    Stream(Stream),
}

impl MediaFile {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Container(container) => container.path(),
            Self::Stream(stream) => stream.path(),
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Container(container) => Some(container),
            Self::Stream(_) => None,
        }
    }

    pub fn into_container(self) -> Option<Container> {
        match self {
            Self::Container(container) => Some(container),
            Self::Stream(_) => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Self::Stream(stream) => Some(stream),
            Self::Container(_) => None,
        }
    }

    pub fn into_stream(self) -> Option<Stream> {
        match self {
            Self::Stream(stream) => Some(stream),
            Self::Container(_) => None,
        }
    }
}

/// Probes `path` once and builds the matching entity.
pub async fn open(path: &Path, prober: &dyn Prober) -> Result<MediaFile, MediaError> {
    let report = prober.probe(path).await?;
    match report.streams.len() {
        0 => Err(ProbeError::probe_failed(format!("no streams found in {}", path.display())).into()),
        1 => Ok(MediaFile::Stream(Stream::outer_from_report(path, &report)?)),
        _ => Ok(MediaFile::Container(Container::from_report(path, &report))),
    }
}

/// Fails when `target` exists and is not the file the entity was probed from.
fn ensure_writable(target: &Path, probed: Option<&Path>) -> Result<(), MediaError> {
    if target.exists() && probed != Some(target) {
        return Err(MediaError::PathCollision {
            path: target.to_path_buf(),
        });
    }
    Ok(())
}

/// Saves and extracts media through external tools.
pub struct Remuxer {
    config: RemuxConfig,
    prober: Arc<dyn Prober>,
    writer: AtomicWriter,
}

impl Remuxer {
    pub fn new(config: RemuxConfig, prober: Arc<dyn Prober>, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            config,
            prober,
            writer: AtomicWriter::new(encoder),
        }
    }

    /// Creates a remuxer backed by ffprobe and ffmpeg.
    pub fn from_config(config: RemuxConfig) -> Self {
        let prober = Arc::new(FfprobeProber::new(config.clone()));
        let encoder = Arc::new(FfmpegEncoder::new(config.clone()));
        Self::new(config, prober, encoder)
    }

    pub fn config(&self) -> &RemuxConfig {
        &self.config
    }

    pub async fn open(&self, path: &Path) -> Result<MediaFile, MediaError> {
        open(path, self.prober.as_ref()).await
    }

    /// Writes the container to its current path.
    pub async fn save_container(
        &self,
        container: &mut Container,
        settings: PlanSettings,
    ) -> Result<WriteOutcome, MediaError> {
        self.save_container_with_cancel(container, settings, &CancellationToken::new())
            .await
    }

    pub async fn save_container_with_cancel(
        &self,
        container: &mut Container,
        settings: PlanSettings,
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, MediaError> {
        let target = container
            .path()
            .ok_or(MediaError::MissingPath { what: "container" })?
            .to_path_buf();
        self.write_container(container, &target, settings, cancel)
            .await
    }

    /// Writes `container` to `target` and rebinds it to the written file.
    ///
    /// The entity is left untouched when planning or encoding fails.
    async fn write_container(
        &self,
        container: &mut Container,
        target: &Path,
        settings: PlanSettings,
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, MediaError> {
        ensure_writable(target, container.default_path())?;

        let plan = Planner::new(&self.config).plan_container(container, target, settings)?;
        let outcome = self.writer.write(&plan, target, cancel).await?;

        let report = self.prober.probe(target).await?;
        *container = Container::from_report(target, &report);
        info!(
            path = %target.display(),
            streams = container.streams().len(),
            "Saved container"
        );
        Ok(outcome)
    }

    /// Writes the container to a new path.
    pub async fn save_container_as(
        &self,
        container: &mut Container,
        path: &Path,
        settings: PlanSettings,
    ) -> Result<WriteOutcome, MediaError> {
        self.save_container_as_with_cancel(container, path, settings, &CancellationToken::new())
            .await
    }

    pub async fn save_container_as_with_cancel(
        &self,
        container: &mut Container,
        path: &Path,
        settings: PlanSettings,
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, MediaError> {
        self.write_container(container, path, settings, cancel).await
    }

    /// Writes a standalone stream to its current path.
    pub async fn save_stream(
        &self,
        stream: &mut Stream,
        settings: PlanSettings,
    ) -> Result<WriteOutcome, MediaError> {
        self.save_stream_with_cancel(stream, settings, &CancellationToken::new())
            .await
    }

    pub async fn save_stream_with_cancel(
        &self,
        stream: &mut Stream,
        settings: PlanSettings,
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, MediaError> {
        if stream.is_inner() {
            return Err(MediaError::operation_mode(
                "save",
                "inner streams are saved through their container",
            ));
        }
        let target = stream
            .path()
            .ok_or(MediaError::MissingPath { what: "stream" })?
            .to_path_buf();
        self.write_stream(stream, &target, settings, cancel).await
    }

    /// Writes an outer stream to `target` and rebinds it to the written file.
    ///
    /// The entity is left untouched when planning or encoding fails.
    async fn write_stream(
        &self,
        stream: &mut Stream,
        target: &Path,
        settings: PlanSettings,
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, MediaError> {
        ensure_writable(target, stream.default_path())?;

        let plan = Planner::new(&self.config).plan(&[PlanInput::Stream(stream)], target, settings)?;
        let outcome = self.writer.write(&plan, target, cancel).await?;

        let report = self.prober.probe(target).await?;
        *stream = Stream::outer_from_report(target, &report)?;
        info!(path = %target.display(), kind = %stream.kind(), "Saved stream");
        Ok(outcome)
    }

    /// Writes a standalone stream to a new path.
    pub async fn save_stream_as(
        &self,
        stream: &mut Stream,
        path: &Path,
        settings: PlanSettings,
    ) -> Result<WriteOutcome, MediaError> {
        self.save_stream_as_with_cancel(stream, path, settings, &CancellationToken::new())
            .await
    }

    pub async fn save_stream_as_with_cancel(
        &self,
        stream: &mut Stream,
        path: &Path,
        settings: PlanSettings,
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, MediaError> {
        if stream.is_inner() {
            return Err(MediaError::operation_mode(
                "save",
                "inner streams are saved through their container",
            ));
        }
        self.write_stream(stream, path, settings, cancel).await
    }

    /// Copies an inner stream out to a new standalone file.
    pub async fn extract(
        &self,
        stream: &Stream,
        path: &Path,
        settings: PlanSettings,
    ) -> Result<Stream, MediaError> {
        self.extract_with_cancel(stream, path, settings, &CancellationToken::new())
            .await
    }

    pub async fn extract_with_cancel(
        &self,
        stream: &Stream,
        path: &Path,
        settings: PlanSettings,
        cancel: &CancellationToken,
    ) -> Result<Stream, MediaError> {
        if stream.is_outer() {
            return Err(MediaError::operation_mode(
                "extract",
                "only streams inside a container can be extracted",
            ));
        }
        ensure_writable(path, None)?;

        let plan = Planner::new(&self.config).plan_extraction(stream, path, settings)?;
        self.writer.write(&plan, path, cancel).await?;

        let report = self.prober.probe(path).await?;
        let extracted = Stream::outer_from_report(path, &report)?;
        info!(
            path = %path.display(),
            index = stream.index(),
            kind = %stream.kind(),
            "Extracted stream"
        );
        Ok(extracted)
    }
}
