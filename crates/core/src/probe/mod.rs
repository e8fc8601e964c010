//! Probe adapter for reading media file structure.
//!
//! This module provides the `Prober` trait and an ffprobe-backed
//! implementation that turns a file path into structured format, stream and
//! chapter records.
//!
//! # Example
//!
//! ```ignore
//! use remux_core::probe::{FfprobeProber, Prober};
//!
//! let prober = FfprobeProber::with_defaults();
//! prober.validate().await?;
//!
//! let report = prober.probe(Path::new("/path/to/movie.mkv")).await?;
//! println!("{} streams", report.streams.len());
//! ```

mod error;
mod ffprobe;
mod traits;
mod types;

pub use error::ProbeError;
pub use ffprobe::FfprobeProber;
pub use traits::Prober;
pub use types::{ProbeChapter, ProbeDisposition, ProbeFormat, ProbeReport, ProbeStream};
