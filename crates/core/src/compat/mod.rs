//! Compatibility resolver.
//!
//! Maps a stream and a target extension to either a verbatim copy or a
//! concrete codec to encode into, using static per-extension support tables.
//!
//! # Example
//!
//! ```ignore
//! use remux_core::compat::{decide_codec, CodecDecision};
//!
//! match decide_codec(&stream, "mp4")? {
//!     CodecDecision::Copy => println!("copied"),
//!     CodecDecision::Reencode(codec) => println!("encoded to {}", codec),
//! }
//! ```

mod resolver;
mod tables;

pub use resolver::{decide_codec, is_supported_extension, supported_codecs, CodecDecision};
pub use tables::{is_container_extension, needs_hevc_tag};
pub(crate) use tables::normalize;
