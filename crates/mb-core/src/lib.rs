//! mb-core: shared error type, configuration, path confinement and timecodes.
//!
//! This crate is the foundational dependency for the other mb-* crates. It
//! owns the two pieces of logic every request depends on:
//!
//! - [`MediaRoot`] translates client-supplied relative paths into absolute
//!   paths and guarantees nothing resolves outside the served directory.
//! - [`timecode`] parses `HH:MM:SS` timecodes and computes range durations.

pub mod config;
pub mod error;
pub mod paths;
pub mod timecode;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use paths::MediaRoot;
pub use timecode::Timecode;
