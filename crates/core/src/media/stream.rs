//! Elementary streams, inner (inside a container) or outer (a file of their own).

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::codec::{Codec, StreamKind};
use super::types::{extension_of, FileInfo, FrameRate};
use crate::compat;
use crate::error::MediaError;
use crate::probe::{ProbeReport, ProbeStream};

/// Video-only fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VideoDetails {
    pub frame_rate: Option<FrameRate>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Audio-only fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AudioDetails {
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
}

/// Subtitle-only fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubtitleDetails {
    pub forced: bool,
}

/// Kind-specific payload of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamDetails {
    Video(VideoDetails),
    Audio(AudioDetails),
    Subtitle(SubtitleDetails),
    Data,
    Image,
    Attachment,
}

impl StreamDetails {
    fn from_probe(kind: StreamKind, probe: &ProbeStream) -> Self {
        match kind {
            StreamKind::Video => Self::Video(VideoDetails {
                frame_rate: probe
                    .avg_frame_rate
                    .as_deref()
                    .and_then(|r| r.parse().ok())
                    .or_else(|| probe.r_frame_rate.as_deref().and_then(|r| r.parse().ok())),
                width: probe.width,
                height: probe.height,
            }),
            StreamKind::Audio => Self::Audio(AudioDetails {
                channels: probe.channels,
                sample_rate: probe.sample_rate_hz(),
            }),
            StreamKind::Subtitle => Self::Subtitle(SubtitleDetails {
                forced: probe.disposition.forced == 1,
            }),
            StreamKind::Data => Self::Data,
            StreamKind::Image => Self::Image,
            StreamKind::Attachment => Self::Attachment,
        }
    }

    pub fn kind(&self) -> StreamKind {
        match self {
            Self::Video(_) => StreamKind::Video,
            Self::Audio(_) => StreamKind::Audio,
            Self::Subtitle(_) => StreamKind::Subtitle,
            Self::Data => StreamKind::Data,
            Self::Image => StreamKind::Image,
            Self::Attachment => StreamKind::Attachment,
        }
    }
}

/// Every value of a stream that can be overridden.
///
/// A stream holds two of these: the probed snapshot, written once, and the
/// current state that setters change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamState {
    pub codec: Codec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub is_default: bool,
    pub metadata: BTreeMap<String, String>,
    pub details: StreamDetails,
}

/// Where an inner stream lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamOrigin {
    /// Probed path of the owning container.
    pub container_path: PathBuf,
    /// Probed extension of the owning container, without the dot.
    pub container_extension: Option<String>,
}

impl StreamOrigin {
    pub fn new(container_path: &Path) -> Self {
        Self {
            container_path: container_path.to_path_buf(),
            container_extension: extension_of(container_path),
        }
    }
}

/// A single elementary stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stream {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<StreamOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<FileInfo>,
    defaults: StreamState,
    current: StreamState,
}

impl Stream {
    fn from_parts(
        probe: &ProbeStream,
        origin: Option<StreamOrigin>,
        path: Option<PathBuf>,
        file: Option<FileInfo>,
    ) -> Self {
        let kind = StreamKind::from_codec_type(
            probe.codec_type.as_deref().unwrap_or("data"),
            probe.disposition.attached_pic == 1,
        );
        let state = StreamState {
            codec: Codec::from_name(probe.codec_name.as_deref().unwrap_or("unknown")),
            path,
            is_default: probe.disposition.default == 1,
            metadata: probe.tags.clone(),
            details: StreamDetails::from_probe(kind, probe),
        };
        Self {
            index: probe.index,
            origin,
            file,
            defaults: state.clone(),
            current: state,
        }
    }

    /// Builds a stream that belongs to the container probed at `container_path`.
    pub fn inner_from_probe(probe: &ProbeStream, container_path: &Path) -> Self {
        Self::from_parts(probe, Some(StreamOrigin::new(container_path)), None, None)
    }

    /// Builds a standalone stream from a single-stream probe report.
    pub fn outer_from_report(path: &Path, report: &ProbeReport) -> Result<Self, MediaError> {
        let probe = report.streams.first().ok_or_else(|| {
            crate::probe::ProbeError::probe_failed(format!(
                "no streams found in {}",
                path.display()
            ))
        })?;
        Ok(Self::from_parts(
            probe,
            None,
            Some(path.to_path_buf()),
            Some(FileInfo::from_probe(&report.format)),
        ))
    }

    /// Position of the stream within its source file.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> StreamKind {
        self.current.details.kind()
    }

    pub fn is_video(&self) -> bool {
        self.kind() == StreamKind::Video
    }

    pub fn is_audio(&self) -> bool {
        self.kind() == StreamKind::Audio
    }

    pub fn is_subtitle(&self) -> bool {
        self.kind() == StreamKind::Subtitle
    }

    pub fn is_attachment(&self) -> bool {
        self.kind() == StreamKind::Attachment
    }

    pub fn origin(&self) -> Option<&StreamOrigin> {
        self.origin.as_ref()
    }

    /// Whether the stream is part of a container.
    pub fn is_inner(&self) -> bool {
        self.origin.is_some()
    }

    /// Whether the stream is a standalone file.
    pub fn is_outer(&self) -> bool {
        self.origin.is_none()
    }

    /// Whether the stream belongs to the container probed at `container_path`.
    pub fn belongs_to(&self, container_path: &Path) -> bool {
        self.origin
            .as_ref()
            .is_some_and(|o| o.container_path == container_path)
    }

    /// File-level attributes of an outer stream.
    pub fn file_info(&self) -> Option<&FileInfo> {
        self.file.as_ref()
    }

    pub fn state(&self) -> &StreamState {
        &self.current
    }

    /// The probed snapshot.
    pub fn defaults(&self) -> &StreamState {
        &self.defaults
    }

    pub fn codec(&self) -> &Codec {
        &self.current.codec
    }

    pub fn default_codec(&self) -> &Codec {
        &self.defaults.codec
    }

    /// Sets the codec the stream should have after saving.
    pub fn set_codec(&mut self, codec: impl Into<Codec>) -> Result<(), MediaError> {
        let codec = codec.into();
        let kind = self.kind();
        if !codec.is_allowed_for(kind) {
            return Err(MediaError::UnsupportedCodec {
                codec: codec.name().to_string(),
                kind,
            });
        }
        self.current.codec = codec;
        Ok(())
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.current.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.current.metadata
    }

    pub fn default_metadata(&self) -> &BTreeMap<String, String> {
        &self.defaults.metadata
    }

    pub fn is_default(&self) -> bool {
        self.current.is_default
    }

    pub fn set_default(&mut self, value: bool) {
        self.current.is_default = value;
    }

    pub fn frame_rate(&self) -> Option<FrameRate> {
        match self.current.details {
            StreamDetails::Video(v) => v.frame_rate,
            _ => None,
        }
    }

    pub fn width(&self) -> Option<u32> {
        match self.current.details {
            StreamDetails::Video(v) => v.width,
            _ => None,
        }
    }

    pub fn height(&self) -> Option<u32> {
        match self.current.details {
            StreamDetails::Video(v) => v.height,
            _ => None,
        }
    }

    pub fn channels(&self) -> Option<u32> {
        match self.current.details {
            StreamDetails::Audio(a) => a.channels,
            _ => None,
        }
    }

    pub fn sample_rate(&self) -> Option<u32> {
        match self.current.details {
            StreamDetails::Audio(a) => a.sample_rate,
            _ => None,
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(self.current.details, StreamDetails::Subtitle(s) if s.forced)
    }

    fn video_mut(&mut self) -> Result<&mut VideoDetails, MediaError> {
        let actual = self.kind();
        match &mut self.current.details {
            StreamDetails::Video(v) => Ok(v),
            _ => Err(MediaError::KindMismatch {
                expected: StreamKind::Video,
                actual,
            }),
        }
    }

    fn audio_mut(&mut self) -> Result<&mut AudioDetails, MediaError> {
        let actual = self.kind();
        match &mut self.current.details {
            StreamDetails::Audio(a) => Ok(a),
            _ => Err(MediaError::KindMismatch {
                expected: StreamKind::Audio,
                actual,
            }),
        }
    }

    pub fn set_frame_rate(&mut self, rate: FrameRate) -> Result<(), MediaError> {
        self.video_mut()?.frame_rate = Some(rate);
        Ok(())
    }

    pub fn set_frame_size(&mut self, width: u32, height: u32) -> Result<(), MediaError> {
        let video = self.video_mut()?;
        video.width = Some(width);
        video.height = Some(height);
        Ok(())
    }

    pub fn set_channels(&mut self, channels: u32) -> Result<(), MediaError> {
        self.audio_mut()?.channels = Some(channels);
        Ok(())
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), MediaError> {
        self.audio_mut()?.sample_rate = Some(sample_rate);
        Ok(())
    }

    pub fn set_forced(&mut self, forced: bool) -> Result<(), MediaError> {
        let actual = self.kind();
        match &mut self.current.details {
            StreamDetails::Subtitle(s) => {
                s.forced = forced;
                Ok(())
            }
            _ => Err(MediaError::KindMismatch {
                expected: StreamKind::Subtitle,
                actual,
            }),
        }
    }

    pub fn changed_frame_rate(&self) -> bool {
        match (self.defaults.details, self.current.details) {
            (StreamDetails::Video(d), StreamDetails::Video(c)) => d.frame_rate != c.frame_rate,
            _ => false,
        }
    }

    pub fn changed_frame_size(&self) -> bool {
        match (self.defaults.details, self.current.details) {
            (StreamDetails::Video(d), StreamDetails::Video(c)) => {
                d.width != c.width || d.height != c.height
            }
            _ => false,
        }
    }

    pub fn changed_channels(&self) -> bool {
        match (self.defaults.details, self.current.details) {
            (StreamDetails::Audio(d), StreamDetails::Audio(c)) => d.channels != c.channels,
            _ => false,
        }
    }

    pub fn changed_sample_rate(&self) -> bool {
        match (self.defaults.details, self.current.details) {
            (StreamDetails::Audio(d), StreamDetails::Audio(c)) => d.sample_rate != c.sample_rate,
            _ => false,
        }
    }

    /// Whether the default/forced flags differ from the probed ones.
    pub fn changed_disposition(&self) -> bool {
        self.defaults.is_default != self.current.is_default
            || matches!(
                (self.defaults.details, self.current.details),
                (StreamDetails::Subtitle(d), StreamDetails::Subtitle(c)) if d.forced != c.forced
            )
    }

    /// Whether a filter-level change forbids copying the encoded data.
    pub fn needs_filtering(&self) -> bool {
        self.changed_frame_rate()
            || self.changed_frame_size()
            || self.changed_channels()
            || self.changed_sample_rate()
    }

    pub fn is_modified(&self) -> bool {
        self.current != self.defaults
    }

    /// Current path of an outer stream.
    pub fn path(&self) -> Option<&Path> {
        self.current.path.as_deref()
    }

    /// Probed path of an outer stream.
    pub fn default_path(&self) -> Option<&Path> {
        self.defaults.path.as_deref()
    }

    /// The file this stream is read from when planning.
    pub fn source_path(&self) -> Option<&Path> {
        match &self.origin {
            Some(origin) => Some(origin.container_path.as_path()),
            None => self.default_path(),
        }
    }

    pub fn extension(&self) -> Option<String> {
        self.path().and_then(extension_of)
    }

    pub fn default_extension(&self) -> Option<String> {
        self.default_path().and_then(extension_of)
    }

    /// Extension of the file the stream was probed from.
    pub fn source_extension(&self) -> Option<String> {
        match &self.origin {
            Some(origin) => origin.container_extension.clone(),
            None => self.default_extension(),
        }
    }

    /// Sets the path an outer stream is saved to.
    ///
    /// The path must not exist yet, unless it is the probed path itself.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> Result<(), MediaError> {
        if self.is_inner() {
            return Err(MediaError::operation_mode(
                "set_path",
                "inner streams have no path of their own",
            ));
        }
        let path = path.into();
        if path.exists() && self.default_path() != Some(path.as_path()) {
            return Err(MediaError::PathCollision { path });
        }
        self.current.path = Some(path);
        Ok(())
    }

    /// Replaces the extension of an outer stream's path.
    pub fn set_extension(&mut self, extension: &str) -> Result<(), MediaError> {
        if self.is_inner() {
            return Err(MediaError::operation_mode(
                "set_extension",
                "inner streams have no path of their own",
            ));
        }
        let kind = self.kind();
        if !compat::is_supported_extension(kind, extension) {
            return Err(MediaError::unsupported_extension(extension, kind));
        }
        let path = self
            .path()
            .ok_or(MediaError::MissingPath { what: "stream" })?
            .with_extension(extension.trim_start_matches('.'));
        self.set_path(path)
    }
}
