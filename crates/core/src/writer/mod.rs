//! Atomic writer.
//!
//! Runs planned encoder commands so that an existing file is only replaced
//! once the new one has been written completely.
//!
//! # Features
//!
//! - Direct writes when the target does not exist
//! - Temporary sibling plus atomic rename when it does
//! - Original left untouched on failure, timeout or cancellation
//! - Writes to the same path serialized across the process
//!
//! # Example
//!
//! ```ignore
//! use remux_core::writer::{AtomicWriter, FfmpegEncoder};
//!
//! let writer = AtomicWriter::new(Arc::new(FfmpegEncoder::new(config)));
//! let outcome = writer.write(&plan, Path::new("/movies/movie.mkv"), &CancellationToken::new()).await?;
//! ```

mod atomic;
mod ffmpeg;
mod traits;

pub use atomic::{choose_temp_path, AtomicWriter, WriteOutcome};
pub use ffmpeg::FfmpegEncoder;
pub use traits::Encoder;
