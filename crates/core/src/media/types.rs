//! Value types shared by containers and streams.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::probe::{ProbeChapter, ProbeFormat};

/// An exact frame rate such as `24000/1001`, kept in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    num: u32,
    den: u32,
}

impl FrameRate {
    /// Creates a frame rate; `None` when either part is zero.
    pub fn new(num: u32, den: u32) -> Option<Self> {
        if num == 0 || den == 0 {
            return None;
        }
        let divisor = gcd(num, den);
        Some(Self {
            num: num / divisor,
            den: den / divisor,
        })
    }

    /// A whole number of frames per second.
    pub fn from_fps(fps: u32) -> Option<Self> {
        Self::new(fps, 1)
    }

    pub fn numerator(&self) -> u32 {
        self.num
    }

    pub fn denominator(&self) -> u32 {
        self.den
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl FromStr for FrameRate {
    type Err = String;

    /// Parses "24000/1001" or "25".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.split_once('/') {
            Some((num, den)) => num
                .trim()
                .parse::<u32>()
                .ok()
                .zip(den.trim().parse::<u32>().ok())
                .and_then(|(n, d)| Self::new(n, d)),
            None => s.parse::<u32>().ok().and_then(Self::from_fps),
        };
        parsed.ok_or_else(|| format!("invalid frame rate '{}'", s))
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// File-level attributes read from the probed format record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Container format (e.g., "matroska", "mov").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_name: Option<String>,
    /// File size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Overall bit rate in bits per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u64>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl FileInfo {
    pub fn from_probe(format: &ProbeFormat) -> Self {
        Self {
            format_name: format.primary_format_name().map(str::to_string),
            size_bytes: format.size_bytes(),
            bit_rate: format.bit_rate(),
            duration_secs: format.duration_secs(),
        }
    }

    /// Size such as "1.50 GB".
    pub fn human_size(&self) -> Option<String> {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
        let size = self.size_bytes?;
        if size == 0 {
            return Some("0 B".to_string());
        }
        let mut value = size as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            Some(format!("{} B", size))
        } else {
            Some(format!("{:.2} {}", value, UNITS[unit]))
        }
    }

    /// Duration as "HH:MM:SS".
    pub fn human_duration(&self) -> Option<String> {
        let total = self.duration_secs?.max(0.0) as u64;
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        Some(format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
    }
}

/// A chapter marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl From<&ProbeChapter> for Chapter {
    fn from(chapter: &ProbeChapter) -> Self {
        Self {
            id: chapter.id,
            start_secs: chapter.start_secs(),
            end_secs: chapter.end_secs(),
            title: chapter.tags.get("title").cloned(),
            tags: chapter.tags.clone(),
        }
    }
}

/// Lowercased extension of a path, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_parse_and_normalize() {
        let rate: FrameRate = "24000/1001".parse().unwrap();
        assert_eq!(rate.numerator(), 24000);
        assert_eq!(rate.to_string(), "24000/1001");

        let rate: FrameRate = "50/2".parse().unwrap();
        assert_eq!(rate, FrameRate::from_fps(25).unwrap());
        assert_eq!(rate.to_string(), "25");

        assert!("0/0".parse::<FrameRate>().is_err());
        assert!("fast".parse::<FrameRate>().is_err());
    }

    #[test]
    fn test_frame_rate_as_f64() {
        let rate = FrameRate::new(30000, 1001).unwrap();
        assert!((rate.as_f64() - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_human_size() {
        let info = FileInfo {
            size_bytes: Some(1536),
            ..Default::default()
        };
        assert_eq!(info.human_size().as_deref(), Some("1.50 KB"));

        let info = FileInfo {
            size_bytes: Some(512),
            ..Default::default()
        };
        assert_eq!(info.human_size().as_deref(), Some("512 B"));

        assert_eq!(FileInfo::default().human_size(), None);
    }

    #[test]
    fn test_human_duration() {
        let info = FileInfo {
            duration_secs: Some(7384.9),
            ..Default::default()
        };
        assert_eq!(info.human_duration().as_deref(), Some("02:03:04"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("/a/Movie.MKV")).as_deref(), Some("mkv"));
        assert_eq!(extension_of(Path::new("/a/noext")), None);
    }
}
