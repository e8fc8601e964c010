//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external tool traits,
//! allowing save and extract flows to be tested without ffmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use remux_core::testing::{fixtures, MockEncoder, MockProber};
//!
//! let prober = Arc::new(MockProber::new());
//! let encoder = Arc::new(MockEncoder::new());
//! prober.set_report("/movies/movie.mkv", fixtures::movie_report()).await;
//!
//! let remuxer = Remuxer::new(config, prober.clone(), encoder.clone());
//! ```

mod mock_encoder;
mod mock_prober;

pub use mock_encoder::{MockEncoder, RecordedRun};
pub use mock_prober::MockProber;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::probe::{ProbeDisposition, ProbeFormat, ProbeReport, ProbeStream};

    /// Create a probed stream with the given codec and type.
    pub fn probe_stream(index: usize, codec: &str, codec_type: &str) -> ProbeStream {
        ProbeStream {
            index,
            codec_name: Some(codec.to_string()),
            codec_type: Some(codec_type.to_string()),
            ..Default::default()
        }
    }

    /// Create a 1080p H.264 video stream at 24000/1001 fps.
    pub fn video_stream(index: usize) -> ProbeStream {
        ProbeStream {
            avg_frame_rate: Some("24000/1001".to_string()),
            width: Some(1920),
            height: Some(1080),
            disposition: ProbeDisposition {
                default: 1,
                ..Default::default()
            },
            ..probe_stream(index, "h264", "video")
        }
    }

    /// Create a stereo 48 kHz AAC audio stream.
    pub fn audio_stream(index: usize, language: &str) -> ProbeStream {
        let mut tags = BTreeMap::new();
        tags.insert("language".to_string(), language.to_string());
        ProbeStream {
            channels: Some(2),
            sample_rate: Some("48000".to_string()),
            tags,
            ..probe_stream(index, "aac", "audio")
        }
    }

    /// Create a SubRip subtitle stream.
    pub fn subtitle_stream(index: usize, language: &str) -> ProbeStream {
        let mut tags = BTreeMap::new();
        tags.insert("language".to_string(), language.to_string());
        ProbeStream {
            tags,
            ..probe_stream(index, "subrip", "subtitle")
        }
    }

    /// Create a report with the given streams and a matroska format record.
    pub fn report(streams: Vec<ProbeStream>) -> ProbeReport {
        ProbeReport {
            format: ProbeFormat {
                format_name: Some("matroska,webm".to_string()),
                size: Some("734003200".to_string()),
                bit_rate: Some("1000000".to_string()),
                duration: Some("5400.5".to_string()),
                ..Default::default()
            },
            streams,
            chapters: vec![],
        }
    }

    /// A movie with one video, one English audio and one English subtitle stream.
    pub fn movie_report() -> ProbeReport {
        report(vec![
            video_stream(0),
            audio_stream(1, "eng"),
            subtitle_stream(2, "eng"),
        ])
    }

    /// A standalone SubRip file.
    pub fn subtitle_report() -> ProbeReport {
        ProbeReport {
            format: ProbeFormat {
                format_name: Some("srt".to_string()),
                size: Some("2048".to_string()),
                ..Default::default()
            },
            streams: vec![subtitle_stream(0, "eng")],
            chapters: vec![],
        }
    }
}
