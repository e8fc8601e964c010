//! Raw records produced by the probing tool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Everything the prober reports about one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub format: ProbeFormat,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub chapters: Vec<ProbeChapter>,
}

/// File-level format record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl ProbeFormat {
    /// File size in bytes.
    pub fn size_bytes(&self) -> Option<u64> {
        parse_field(self.size.as_deref())
    }

    /// Overall bit rate in bits per second.
    pub fn bit_rate(&self) -> Option<u64> {
        parse_field(self.bit_rate.as_deref())
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> Option<f64> {
        parse_field(self.duration.as_deref())
    }

    /// Primary format name ("matroska,webm" -> "matroska").
    pub fn primary_format_name(&self) -> Option<&str> {
        self.format_name
            .as_deref()
            .and_then(|name| name.split(',').next())
    }
}

/// Per-stream record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeStream {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub disposition: ProbeDisposition,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_frame_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_frame_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,
}

impl ProbeStream {
    /// Sample rate in Hz.
    pub fn sample_rate_hz(&self) -> Option<u32> {
        parse_field(self.sample_rate.as_deref())
    }
}

/// Disposition flags; ffprobe reports them as 0/1 integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDisposition {
    #[serde(default)]
    pub default: u8,
    #[serde(default)]
    pub forced: u8,
    #[serde(default)]
    pub attached_pic: u8,
}

/// Chapter record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeChapter {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl ProbeChapter {
    pub fn start_secs(&self) -> Option<f64> {
        parse_field(self.start_time.as_deref())
    }

    pub fn end_secs(&self) -> Option<f64> {
        parse_field(self.end_time.as_deref())
    }
}

// ffprobe prints numbers as strings and uses "N/A" when unknown.
fn parse_field<T: FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse::<T>().ok())
}
