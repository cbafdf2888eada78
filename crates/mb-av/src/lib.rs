//! # mb-av
//!
//! External tool plumbing for mediabay.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache the path to
//!   ffmpeg, honouring a configured override.
//! - **Command execution** ([`ToolCommand`]) -- async builder for running an
//!   external process and turning a non-zero exit into an error.
//! - **Transcoding** ([`Transcoder`], [`FfmpegTranscoder`]) -- the two ffmpeg
//!   modes the edit pipeline needs: stream-copy a time range out of a file,
//!   and stream-copy join clips listed in a concat manifest.
//! - **Workspace management** ([`Workspace`]) -- request-scoped temporary
//!   directory that is removed when it goes out of scope.

pub mod command;
pub mod tools;
pub mod transcoder;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use transcoder::{render_concat_manifest, FfmpegTranscoder, Transcoder};
pub use workspace::Workspace;
