//! Unified error type for mediabay.
//!
//! All crates funnel their failures into [`Error`]. API handlers derive the
//! HTTP status from [`Error::http_status`] and the client-facing reason from
//! [`Error::code`] / [`Error::public_message`]; the full `Display` output
//! (which may carry OS errors or tool stderr) is only ever logged.

use std::fmt;
use std::path::{Path, PathBuf};

/// Unified error type covering all failure modes in mediabay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A client path escapes the media root or cannot be normalised.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A timecode is malformed or a range has no positive duration.
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// An external tool failed to launch or exited with a non-zero status.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// A filesystem operation failed.
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// The path the operation was applied to.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "media", "route").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidPath(_) => 400,
            Error::InvalidTimeFormat(_) => 400,
            Error::Validation(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Filesystem { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                404
            }
            Error::Filesystem { .. } => 500,
            Error::Tool { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable reason, safe to hand to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidPath(_) => "invalid_path",
            Error::InvalidTimeFormat(_) => "invalid_time_format",
            Error::Validation(_) => "invalid_payload",
            Error::NotFound { .. } => "not_found",
            Error::Filesystem { .. } => "filesystem_error",
            Error::Tool { .. } => "tool_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Short human-readable message without any server-side detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::InvalidPath(_) => "Invalid path",
            Error::InvalidTimeFormat(_) => "Invalid time format",
            Error::Validation(_) => "Invalid request payload",
            Error::NotFound { .. } => "Not found",
            Error::Filesystem { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                "Not found"
            }
            Error::Filesystem { .. } => "Filesystem operation failed",
            Error::Tool { .. } => "Failed to edit video",
            Error::Internal(_) => "Internal server error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Filesystem`].
    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
