//! Codec vocabulary and stream kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    /// Still picture, usually cover art stored as a video stream.
    Image,
    /// Fonts and other files embedded in a container.
    Attachment,
}

impl StreamKind {
    /// Classifies a probed stream by its codec type and attached-picture flag.
    pub fn from_codec_type(codec_type: &str, attached_pic: bool) -> Self {
        match codec_type {
            "video" if attached_pic => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitle" => Self::Subtitle,
            "attachment" => Self::Attachment,
            _ => Self::Data,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::Data => "data",
            Self::Image => "image",
            Self::Attachment => "attachment",
        }
    }

    /// Codec names a stream of this kind may be switched to.
    pub fn allowed_codecs(&self) -> &'static [&'static str] {
        match self {
            Self::Video => VIDEO_CODECS,
            Self::Audio => AUDIO_CODECS,
            Self::Subtitle => SUBTITLE_CODECS,
            Self::Data | Self::Image | Self::Attachment => &[],
        }
    }

    /// Whether streams of this kind are bound to their source container format.
    pub fn is_container_specific(&self) -> bool {
        matches!(self, Self::Attachment | Self::Data)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const VIDEO_CODECS: &[&str] = &["h264", "h265", "vp8", "vp9", "av1", "mpeg4", "mpeg2"];
const AUDIO_CODECS: &[&str] = &[
    "aac", "mp3", "ac3", "eac3", "dts", "truehd", "flac", "alac", "opus", "vorbis", "pcm",
];
const SUBTITLE_CODECS: &[&str] = &["srt", "ass", "webvtt", "mov_text", "pgs", "dvdsub"];

/// A codec, named the way this crate names it rather than the way ffmpeg does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Codec {
    H264,
    H265,
    Vp8,
    Vp9,
    Av1,
    Mpeg4,
    Mpeg2,
    Aac,
    Mp3,
    Ac3,
    Eac3,
    Dts,
    TrueHd,
    Flac,
    Alac,
    Opus,
    Vorbis,
    Pcm,
    Srt,
    Ass,
    WebVtt,
    MovText,
    Pgs,
    DvdSub,
    Mjpeg,
    Png,
    /// Any codec outside the known vocabulary, kept verbatim.
    Other(String),
}

impl Codec {
    /// Resolves a codec from either a crate name or a probe/ffmpeg name.
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "h264" | "avc" => Self::H264,
            "h265" | "hevc" => Self::H265,
            "vp8" => Self::Vp8,
            "vp9" => Self::Vp9,
            "av1" => Self::Av1,
            "mpeg4" => Self::Mpeg4,
            "mpeg2" | "mpeg2video" => Self::Mpeg2,
            "aac" => Self::Aac,
            "mp3" => Self::Mp3,
            "ac3" => Self::Ac3,
            "eac3" => Self::Eac3,
            "dts" | "dca" => Self::Dts,
            "truehd" => Self::TrueHd,
            "flac" => Self::Flac,
            "alac" => Self::Alac,
            "opus" => Self::Opus,
            "vorbis" => Self::Vorbis,
            "pcm" => Self::Pcm,
            pcm if pcm.starts_with("pcm_") => Self::Pcm,
            "srt" | "subrip" => Self::Srt,
            "ass" | "ssa" => Self::Ass,
            "webvtt" | "vtt" => Self::WebVtt,
            "mov_text" => Self::MovText,
            "pgs" | "hdmv_pgs_subtitle" => Self::Pgs,
            "dvdsub" | "dvd_subtitle" => Self::DvdSub,
            "mjpeg" => Self::Mjpeg,
            "png" => Self::Png,
            _ => Self::Other(lower),
        }
    }

    /// The crate-level codec name.
    pub fn name(&self) -> &str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "h265",
            Self::Vp8 => "vp8",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
            Self::Mpeg4 => "mpeg4",
            Self::Mpeg2 => "mpeg2",
            Self::Aac => "aac",
            Self::Mp3 => "mp3",
            Self::Ac3 => "ac3",
            Self::Eac3 => "eac3",
            Self::Dts => "dts",
            Self::TrueHd => "truehd",
            Self::Flac => "flac",
            Self::Alac => "alac",
            Self::Opus => "opus",
            Self::Vorbis => "vorbis",
            Self::Pcm => "pcm",
            Self::Srt => "srt",
            Self::Ass => "ass",
            Self::WebVtt => "webvtt",
            Self::MovText => "mov_text",
            Self::Pgs => "pgs",
            Self::DvdSub => "dvdsub",
            Self::Mjpeg => "mjpeg",
            Self::Png => "png",
            Self::Other(name) => name,
        }
    }

    /// Returns the ffmpeg encoder used when this codec has to be produced.
    pub fn ffmpeg_encoder(&self) -> &str {
        match self {
            Self::H264 => "libx264",
            Self::H265 => "libx265",
            Self::Vp8 => "libvpx",
            Self::Vp9 => "libvpx-vp9",
            Self::Av1 => "libaom-av1",
            Self::Mpeg4 => "mpeg4",
            Self::Mpeg2 => "mpeg2video",
            Self::Aac => "aac",
            Self::Mp3 => "libmp3lame",
            Self::Ac3 => "ac3",
            Self::Eac3 => "eac3",
            Self::Dts => "dca",
            Self::TrueHd => "truehd",
            Self::Flac => "flac",
            Self::Alac => "alac",
            Self::Opus => "libopus",
            Self::Vorbis => "libvorbis",
            Self::Pcm => "pcm_s16le",
            Self::Srt => "srt",
            Self::Ass => "ass",
            Self::WebVtt => "webvtt",
            Self::MovText => "mov_text",
            Self::Pgs => "hdmv_pgs_subtitle",
            Self::DvdSub => "dvdsub",
            Self::Mjpeg => "mjpeg",
            Self::Png => "png",
            Self::Other(name) => name,
        }
    }

    /// Whether a stream of `kind` may be switched to this codec.
    pub fn is_allowed_for(&self, kind: StreamKind) -> bool {
        kind.allowed_codecs().contains(&self.name())
    }
}

impl From<&str> for Codec {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<String> for Codec {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Codec> for String {
    fn from(codec: Codec) -> Self {
        codec.name().to_string()
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
