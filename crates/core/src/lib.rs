pub mod compat;
pub mod config;
pub mod error;
pub mod media;
pub mod planner;
pub mod probe;
pub mod remuxer;
pub mod testing;
pub mod writer;

pub use compat::{decide_codec, CodecDecision};
pub use config::{load_config, load_config_from_str, validate_config, ConfigError, RemuxConfig};
pub use error::MediaError;
pub use media::{Codec, Container, FrameRate, Stream, StreamKind};
pub use planner::{Plan, PlanInput, PlanSettings, Planner};
pub use probe::{FfprobeProber, ProbeError, ProbeReport, Prober};
pub use remuxer::{open, MediaFile, Remuxer};
pub use writer::{AtomicWriter, Encoder, FfmpegEncoder, WriteOutcome};
