//! In-memory model of containers and their streams.
//!
//! Every editable value is held twice: the snapshot read from the probe,
//! which never changes, and the current value that setters modify. The
//! planner diffs the two to decide what has to be re-encoded.
//!
//! # Features
//!
//! - Six stream kinds with kind-specific fields (video geometry, audio layout, forced subtitles)
//! - Inner streams (part of a container) and outer streams (standalone files)
//! - Validated codec, path and extension overrides
//! - Filtered stream views and order-preserving stream removal
//!
//! # Example
//!
//! ```ignore
//! use remux_core::media::{Container, StreamKind};
//!
//! let mut container = Container::from_report(path, &report);
//! container.remove_streams(|s| s.kind() == StreamKind::Subtitle);
//! container.streams_mut()[0].set_codec("h265")?;
//! container.set_extension("mp4")?;
//! ```

mod codec;
mod container;
mod stream;
mod types;

pub use codec::{Codec, StreamKind};
pub use container::{Container, ContainerSnapshot};
pub use stream::{
    AudioDetails, Stream, StreamDetails, StreamOrigin, StreamState, SubtitleDetails, VideoDetails,
};
pub use types::{extension_of, Chapter, FileInfo, FrameRate};
