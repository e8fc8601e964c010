//! Command planner.
//!
//! Turns containers and standalone streams into the argument list of an
//! encoder invocation, deciding per stream whether to copy or re-encode.
//!
//! # Features
//!
//! - One input clause per container or loose stream, in order
//! - Output specifiers kept in lockstep with `-map` directives
//! - Quality factor emitted once per command
//! - `hvc1` tagging for HEVC in MP4-family files
//! - Container-specific streams dropped when the container format changes
//!
//! # Example
//!
//! ```ignore
//! use remux_core::planner::{PlanSettings, Planner};
//!
//! let planner = Planner::new(&config);
//! let plan = planner.plan_container(&container, Path::new("/movies/movie.mp4"), PlanSettings::with_crf(23))?;
//! println!("ffmpeg {}", plan.args.join(" "));
//! ```

mod directive;
mod plan;

pub use directive::{CommandBuilder, Directive, OnceKey};
pub use plan::{Plan, PlanInput, PlanSettings, PlannedStream, Planner};
