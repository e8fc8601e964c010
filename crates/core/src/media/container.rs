//! Multi-stream containers.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::codec::StreamKind;
use super::stream::Stream;
use super::types::{extension_of, Chapter, FileInfo};
use crate::compat;
use crate::error::MediaError;
use crate::probe::ProbeReport;

/// Values captured when the container was probed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSnapshot {
    pub path: PathBuf,
    pub file: FileInfo,
    pub metadata: BTreeMap<String, String>,
    /// Indices of the probed streams, in order.
    pub stream_indices: Vec<usize>,
}

/// A file holding several elementary streams.
///
/// Stream order is output order. A container is either empty (built with
/// [`Container::new`]) or bound to a probed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Container {
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<ContainerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    metadata: BTreeMap<String, String>,
    streams: Vec<Stream>,
    chapters: Vec<Chapter>,
}

impl Container {
    /// An empty, unbound container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bound container from the probe report of `path`.
    pub fn from_report(path: &Path, report: &ProbeReport) -> Self {
        let file = FileInfo::from_probe(&report.format);
        let metadata = report.format.tags.clone();
        Self {
            snapshot: Some(ContainerSnapshot {
                path: path.to_path_buf(),
                file,
                metadata: metadata.clone(),
                stream_indices: report.streams.iter().map(|s| s.index).collect(),
            }),
            path: Some(path.to_path_buf()),
            metadata,
            streams: report
                .streams
                .iter()
                .map(|s| Stream::inner_from_probe(s, path))
                .collect(),
            chapters: report.chapters.iter().map(Chapter::from).collect(),
        }
    }

    /// Whether the container is backed by a probed file.
    pub fn is_bound(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&ContainerSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Probed path; `None` for an empty container.
    pub fn default_path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(|s| s.path.as_path())
    }

    pub fn extension(&self) -> Option<String> {
        self.path().and_then(extension_of)
    }

    pub fn default_extension(&self) -> Option<String> {
        self.default_path().and_then(extension_of)
    }

    /// Sets the path the container is saved to.
    ///
    /// The path must not exist yet, unless it is the probed path itself.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> Result<(), MediaError> {
        let path = path.into();
        if path.exists() && self.default_path() != Some(path.as_path()) {
            return Err(MediaError::PathCollision { path });
        }
        self.path = Some(path);
        Ok(())
    }

    /// Replaces the extension of the container path.
    pub fn set_extension(&mut self, extension: &str) -> Result<(), MediaError> {
        if !compat::is_container_extension(extension) {
            return Err(MediaError::unsupported_extension(
                extension,
                StreamKind::Video,
            ));
        }
        let path = self
            .path()
            .ok_or(MediaError::MissingPath { what: "container" })?
            .with_extension(extension.trim_start_matches('.'));
        self.set_path(path)
    }

    fn file(&self) -> Option<&FileInfo> {
        self.snapshot.as_ref().map(|s| &s.file)
    }

    /// File size in bytes.
    pub fn size(&self) -> Option<u64> {
        self.file().and_then(|f| f.size_bytes)
    }

    pub fn bit_rate(&self) -> Option<u64> {
        self.file().and_then(|f| f.bit_rate)
    }

    /// Duration in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.file().and_then(|f| f.duration_secs)
    }

    pub fn format_name(&self) -> Option<&str> {
        self.file().and_then(|f| f.format_name.as_deref())
    }

    pub fn human_size(&self) -> Option<String> {
        self.file().and_then(FileInfo::human_size)
    }

    pub fn human_duration(&self) -> Option<String> {
        self.file().and_then(FileInfo::human_duration)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.metadata
    }

    /// Probed container-level tags.
    pub fn default_metadata(&self) -> Option<&BTreeMap<String, String>> {
        self.snapshot.as_ref().map(|s| &s.metadata)
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn streams_mut(&mut self) -> &mut [Stream] {
        &mut self.streams
    }

    pub fn stream_mut(&mut self, position: usize) -> Option<&mut Stream> {
        self.streams.get_mut(position)
    }

    /// Appends a stream; it keeps its own origin.
    pub fn push_stream(&mut self, stream: Stream) {
        self.streams.push(stream);
    }

    pub fn extend_streams(&mut self, streams: impl IntoIterator<Item = Stream>) {
        self.streams.extend(streams);
    }

    /// Drops every stream matching `predicate` and returns how many were removed.
    pub fn remove_streams<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Stream) -> bool,
    {
        let before = self.streams.len();
        self.streams.retain(|s| !predicate(s));
        before - self.streams.len()
    }

    fn filtered(&self, kind: StreamKind) -> Vec<&Stream> {
        self.streams.iter().filter(|s| s.kind() == kind).collect()
    }

    pub fn videos(&self) -> Vec<&Stream> {
        self.filtered(StreamKind::Video)
    }

    pub fn audios(&self) -> Vec<&Stream> {
        self.filtered(StreamKind::Audio)
    }

    pub fn subtitles(&self) -> Vec<&Stream> {
        self.filtered(StreamKind::Subtitle)
    }

    pub fn data(&self) -> Vec<&Stream> {
        self.filtered(StreamKind::Data)
    }

    pub fn attachments(&self) -> Vec<&Stream> {
        self.filtered(StreamKind::Attachment)
    }

    pub fn images(&self) -> Vec<&Stream> {
        self.filtered(StreamKind::Image)
    }

    /// Streams read from this container's probed file.
    pub fn own_streams(&self) -> impl Iterator<Item = &Stream> {
        let path = self.default_path();
        self.streams
            .iter()
            .filter(move |s| path.is_some_and(|p| s.belongs_to(p)))
    }

    /// Standalone streams added to this container.
    pub fn outer_streams(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter().filter(|s| s.is_outer())
    }

    /// Inner streams that belong to some other container.
    pub fn foreign_streams(&self) -> impl Iterator<Item = &Stream> {
        let path = self.default_path();
        self.streams
            .iter()
            .filter(move |s| s.is_inner() && !path.is_some_and(|p| s.belongs_to(p)))
    }

    /// Whether saving would produce something other than the probed file.
    pub fn is_modified(&self) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return !self.streams.is_empty() || !self.metadata.is_empty();
        };
        let indices: Vec<usize> = self.streams.iter().map(Stream::index).collect();
        self.path.as_deref() != Some(snapshot.path.as_path())
            || self.metadata != snapshot.metadata
            || self.streams.len() != self.own_streams().count()
            || indices != snapshot.stream_indices
            || self.streams.iter().any(Stream::is_modified)
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "Container(path={}, size={}, duration={})",
            path,
            self.human_size().unwrap_or_else(|| "None".to_string()),
            self.human_duration().unwrap_or_else(|| "None".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeFormat, ProbeStream};

    fn probe_stream(index: usize, codec: &str, codec_type: &str) -> ProbeStream {
        ProbeStream {
            index,
            codec_name: Some(codec.to_string()),
            codec_type: Some(codec_type.to_string()),
            ..Default::default()
        }
    }

    fn movie_report() -> ProbeReport {
        let mut tags = BTreeMap::new();
        tags.insert("title".to_string(), "Movie".to_string());
        ProbeReport {
            format: ProbeFormat {
                format_name: Some("matroska,webm".to_string()),
                size: Some("1536".to_string()),
                duration: Some("3725.0".to_string()),
                bit_rate: Some("800000".to_string()),
                tags,
                ..Default::default()
            },
            streams: vec![
                probe_stream(0, "h264", "video"),
                probe_stream(1, "aac", "audio"),
                probe_stream(2, "subrip", "subtitle"),
                probe_stream(3, "ttf", "attachment"),
            ],
            chapters: vec![],
        }
    }

    #[test]
    fn test_empty_container() {
        let container = Container::new();
        assert!(!container.is_bound());
        assert!(container.streams().is_empty());
        assert!(container.default_path().is_none());
        assert!(container.size().is_none());
        assert_eq!(
            container.to_string(),
            "Container(path=None, size=None, duration=None)"
        );
    }

    #[test]
    fn test_from_report() {
        let container = Container::from_report(Path::new("/m/movie.mkv"), &movie_report());
        assert!(container.is_bound());
        assert_eq!(container.streams().len(), 4);
        assert_eq!(container.videos().len(), 1);
        assert_eq!(container.audios().len(), 1);
        assert_eq!(container.subtitles().len(), 1);
        assert_eq!(container.attachments().len(), 1);
        assert!(container.data().is_empty());
        assert_eq!(container.format_name(), Some("matroska"));
        assert_eq!(container.size(), Some(1536));
        assert_eq!(container.metadata().get("title").map(String::as_str), Some("Movie"));
        assert_eq!(container.own_streams().count(), 4);
        assert!(!container.is_modified());
        assert_eq!(
            container.to_string(),
            "Container(path=/m/movie.mkv, size=1.50 KB, duration=01:02:05)"
        );
    }

    #[test]
    fn test_remove_streams_preserves_order() {
        let mut container = Container::from_report(Path::new("/m/movie.mkv"), &movie_report());
        let removed = container.remove_streams(|s| s.kind() == StreamKind::Audio);
        assert_eq!(removed, 1);
        let indices: Vec<usize> = container.streams().iter().map(Stream::index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        assert!(container.is_modified());
    }

    #[test]
    fn test_push_streams_keep_origin() {
        let mut container = Container::from_report(Path::new("/m/movie.mkv"), &movie_report());
        let other = Container::from_report(Path::new("/m/other.mkv"), &movie_report());
        container.push_stream(other.streams()[1].clone());

        assert_eq!(container.foreign_streams().count(), 1);
        assert_eq!(container.outer_streams().count(), 0);
        assert_eq!(container.own_streams().count(), 4);
    }

    #[test]
    fn test_set_path_and_extension() {
        let temp = tempfile::TempDir::new().unwrap();
        let original = temp.path().join("movie.mkv");
        std::fs::write(&original, b"x").unwrap();
        let taken = temp.path().join("taken.mp4");
        std::fs::write(&taken, b"x").unwrap();

        let mut container = Container::from_report(&original, &movie_report());
        assert!(matches!(
            container.set_path(&taken),
            Err(MediaError::PathCollision { .. })
        ));

        container.set_extension(".mp4").unwrap();
        assert_eq!(container.extension().as_deref(), Some("mp4"));
        assert_eq!(container.default_extension().as_deref(), Some("mkv"));
        assert!(container.is_modified());

        assert!(container.set_extension("srt").is_err());
        container.set_path(&original).unwrap();
        assert!(!container.is_modified());
    }

    #[test]
    fn test_set_extension_requires_path() {
        let mut container = Container::new();
        assert!(matches!(
            container.set_extension("mkv"),
            Err(MediaError::MissingPath { .. })
        ));
    }
}
