//! Per-extension codec support tables.
//!
//! Each list is ordered by preference: the first entry is the codec a
//! stream falls back to when its own codec cannot be stored as-is.

/// Extensions that can hold video alongside other streams.
const CONTAINER_EXTENSIONS: &[&str] = &["mkv", "mp4", "m4v", "mov", "webm", "avi", "ts"];

/// Extensions whose HEVC streams need the `hvc1` tag to play back.
const HEVC_TAG_EXTENSIONS: &[&str] = &["mp4", "m4v"];

const MATROSKA_AUDIO: &[&str] = &[
    "aac", "ac3", "eac3", "dts", "truehd", "flac", "mp3", "opus", "vorbis", "alac", "pcm",
];
const MATROSKA_SUBTITLE: &[&str] = &["srt", "ass", "webvtt", "pgs", "dvdsub"];

/// Lowercases an extension and strips a leading dot.
pub(crate) fn normalize(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

pub(crate) fn video_codecs(extension: &str) -> Option<&'static [&'static str]> {
    let codecs: &'static [&'static str] = match normalize(extension).as_str() {
        "mkv" => &["h264", "h265", "vp9", "av1", "vp8", "mpeg4", "mpeg2"],
        "mp4" | "m4v" => &["h264", "h265", "av1", "vp9", "mpeg4", "mpeg2"],
        "mov" => &["h264", "h265", "mpeg4", "mpeg2"],
        "webm" => &["vp9", "vp8", "av1"],
        "avi" => &["mpeg4", "h264", "mpeg2"],
        "ts" => &["h264", "h265", "mpeg2"],
        _ => return None,
    };
    Some(codecs)
}

pub(crate) fn audio_codecs(extension: &str) -> Option<&'static [&'static str]> {
    let codecs: &'static [&'static str] = match normalize(extension).as_str() {
        "mkv" | "mka" => MATROSKA_AUDIO,
        "mp4" | "m4v" => &["aac", "mp3", "ac3", "eac3", "alac", "opus", "flac"],
        "mov" => &["aac", "alac", "mp3", "ac3", "pcm"],
        "webm" => &["opus", "vorbis"],
        "avi" => &["mp3", "ac3", "aac", "pcm"],
        "ts" => &["aac", "mp3", "ac3", "eac3"],
        "m4a" => &["aac", "alac"],
        "mp3" => &["mp3"],
        "aac" => &["aac"],
        "ac3" => &["ac3"],
        "eac3" => &["eac3"],
        "flac" => &["flac"],
        "ogg" => &["vorbis", "opus", "flac"],
        "opus" => &["opus"],
        "wav" => &["pcm"],
        "dts" => &["dts"],
        _ => return None,
    };
    Some(codecs)
}

pub(crate) fn subtitle_codecs(extension: &str) -> Option<&'static [&'static str]> {
    let codecs: &'static [&'static str] = match normalize(extension).as_str() {
        "mkv" | "mka" => MATROSKA_SUBTITLE,
        "mp4" | "m4v" | "mov" => &["mov_text"],
        "webm" => &["webvtt"],
        "srt" => &["srt"],
        "ass" | "ssa" => &["ass"],
        "vtt" => &["webvtt"],
        "sup" => &["pgs"],
        _ => return None,
    };
    Some(codecs)
}

/// Whether the extension names a multi-stream container format.
pub fn is_container_extension(extension: &str) -> bool {
    CONTAINER_EXTENSIONS.contains(&normalize(extension).as_str())
}

/// Whether `encoder` writes HEVC into an extension that needs the `hvc1` tag.
pub fn needs_hevc_tag(encoder: &str, extension: &str) -> bool {
    matches!(encoder, "libx265" | "hevc")
        && HEVC_TAG_EXTENSIONS.contains(&normalize(extension).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(".MKV"), "mkv");
        assert_eq!(normalize("mp4"), "mp4");
    }

    #[test]
    fn test_container_tables_cover_all_kinds() {
        for ext in ["mkv", "mp4", "m4v", "mov", "webm"] {
            assert!(video_codecs(ext).is_some(), "{ext} video");
            assert!(audio_codecs(ext).is_some(), "{ext} audio");
            assert!(subtitle_codecs(ext).is_some(), "{ext} subtitle");
        }
        assert!(subtitle_codecs("avi").is_none());
    }

    #[test]
    fn test_audio_only_extensions_have_no_video() {
        for ext in ["mka", "m4a", "mp3", "flac", "ogg", "wav"] {
            assert!(video_codecs(ext).is_none());
            assert!(audio_codecs(ext).is_some());
        }
    }

    #[test]
    fn test_fallback_order() {
        assert_eq!(video_codecs("webm").unwrap()[0], "vp9");
        assert_eq!(audio_codecs("mp4").unwrap()[0], "aac");
        assert_eq!(subtitle_codecs(".MP4").unwrap()[0], "mov_text");
    }

    #[test]
    fn test_needs_hevc_tag() {
        assert!(needs_hevc_tag("libx265", "mp4"));
        assert!(needs_hevc_tag("hevc", ".M4V"));
        assert!(!needs_hevc_tag("libx265", "mkv"));
        assert!(!needs_hevc_tag("libx264", "mp4"));
        assert!(!needs_hevc_tag("copy", "mp4"));
    }
}
