//! Copy-or-re-encode decisions.

use serde::Serialize;
use std::fmt;

use super::tables::{audio_codecs, is_container_extension, normalize, subtitle_codecs, video_codecs};
use crate::error::MediaError;
use crate::media::{Codec, Stream, StreamKind};

/// What happens to a stream's encoded data in the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "codec", rename_all = "snake_case")]
pub enum CodecDecision {
    /// Reuse the encoded bytes verbatim.
    Copy,
    /// Encode into the given codec.
    Reencode(Codec),
}

impl CodecDecision {
    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy)
    }

    /// Value of the codec directive.
    pub fn encoder(&self) -> &str {
        match self {
            Self::Copy => "copy",
            Self::Reencode(codec) => codec.ffmpeg_encoder(),
        }
    }
}

impl fmt::Display for CodecDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => f.write_str("copy"),
            Self::Reencode(codec) => write!(f, "reencode({})", codec),
        }
    }
}

/// Codecs `extension` can store for streams of `kind`, in fallback order.
///
/// `None` when the extension has no table for the kind. Data, image and
/// attachment streams are never transcoded and have no table.
pub fn supported_codecs(kind: StreamKind, extension: &str) -> Option<&'static [&'static str]> {
    match kind {
        StreamKind::Video => video_codecs(extension),
        StreamKind::Audio => audio_codecs(extension),
        StreamKind::Subtitle => subtitle_codecs(extension),
        StreamKind::Data | StreamKind::Image | StreamKind::Attachment => None,
    }
}

/// Whether a stream of `kind` can be written to a file with `extension`.
pub fn is_supported_extension(kind: StreamKind, extension: &str) -> bool {
    match kind {
        StreamKind::Video | StreamKind::Audio | StreamKind::Subtitle => {
            supported_codecs(kind, extension).is_some()
        }
        StreamKind::Data | StreamKind::Image | StreamKind::Attachment => {
            is_container_extension(extension)
        }
    }
}

/// Decides whether `stream` can be copied into a file with `extension`.
///
/// An unmodified codec the target supports is copied. A codec explicitly
/// switched to one the target supports is encoded into that codec. Anything
/// else falls back to the first codec the target lists for the stream kind.
pub fn decide_codec(stream: &Stream, extension: &str) -> Result<CodecDecision, MediaError> {
    let kind = stream.kind();
    let supported = match kind {
        StreamKind::Data | StreamKind::Image | StreamKind::Attachment => {
            return Ok(CodecDecision::Copy)
        }
        StreamKind::Video | StreamKind::Audio | StreamKind::Subtitle => {
            supported_codecs(kind, extension)
                .ok_or_else(|| MediaError::unsupported_extension(normalize(extension), kind))?
        }
    };

    let codec = stream.codec();
    if supported.contains(&codec.name()) {
        if codec == stream.default_codec() {
            Ok(CodecDecision::Copy)
        } else {
            Ok(CodecDecision::Reencode(codec.clone()))
        }
    } else {
        // Tables are never empty.
        let fallback = supported.first().copied().unwrap_or_default();
        Ok(CodecDecision::Reencode(Codec::from_name(fallback)))
    }
}
