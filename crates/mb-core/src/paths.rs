//! Path confinement for the served media directory.
//!
//! Every filesystem operation reachable from a client (list, delete, stream,
//! edit) goes through [`MediaRoot::resolve`] exactly once before touching the
//! disk. Containment is checked per path component, never by string prefix,
//! so `/www-evil` is not considered to be inside `/www`.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// The absolute directory all client-visible paths are confined to.
///
/// Built once at startup and shared read-only (usually behind an `Arc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRoot {
    root: PathBuf,
}

impl MediaRoot {
    /// Create a media root from an absolute directory path.
    ///
    /// The path is lexically normalised (`.` and `..` collapsed) but not
    /// canonicalised, so it does not need to exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if `root` is not absolute.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(Error::InvalidPath(format!(
                "media root must be an absolute path: {}",
                root.display()
            )));
        }
        Ok(Self {
            root: normalize_absolute(&root),
        })
    }

    /// The absolute root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Whether `absolute` is the root directory itself.
    pub fn is_root(&self, absolute: &Path) -> bool {
        normalize_absolute(absolute) == self.root
    }

    /// Translate a client-supplied relative path into an absolute path under
    /// the root.
    ///
    /// Leading slashes are ignored (`/a/b` and `a/b` name the same entry) and
    /// an empty path names the root. Any `..` that would climb above the root
    /// is rejected instead of being clamped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the path escapes the root or contains
    /// a NUL byte.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        if relative.contains('\0') {
            return Err(Error::InvalidPath("path contains a NUL byte".into()));
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in relative.split(is_separator) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(Error::InvalidPath(format!(
                            "{relative:?} escapes the media root"
                        )));
                    }
                }
                name => segments.push(name),
            }
        }

        let mut resolved = self.root.clone();
        resolved.extend(&segments);

        // A segment can still turn into a prefix or root component on some
        // platforms (e.g. `C:` on Windows); re-check per component.
        match resolved.strip_prefix(&self.root) {
            Ok(rest) if rest.components().all(|c| matches!(c, Component::Normal(_))) => {
                Ok(resolved)
            }
            _ => Err(Error::InvalidPath(format!(
                "{relative:?} resolves outside the media root"
            ))),
        }
    }

    /// Translate an absolute path under the root back into the slash-separated
    /// form clients see. The root itself maps to `"."`.
    ///
    /// Paths outside the root are a programming error; they are logged and
    /// mapped to an empty string rather than leaking the absolute path.
    pub fn to_relative(&self, absolute: &Path) -> String {
        if !absolute.is_absolute() {
            tracing::warn!("Cannot relativise non-absolute path {}", absolute.display());
            return String::new();
        }

        let cleaned = normalize_absolute(absolute);
        match cleaned.strip_prefix(&self.root) {
            Ok(rest) => {
                let parts: Vec<String> = rest
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    ".".to_string()
                } else {
                    parts.join("/")
                }
            }
            Err(_) => {
                tracing::warn!(
                    "Path {} is outside media root {}",
                    absolute.display(),
                    self.root.display()
                );
                String::new()
            }
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || std::path::is_separator(c)
}

/// Lexically collapse `.` and `..` in an absolute path. `..` at the top
/// stays at the top, matching how the OS treats `/..`.
fn normalize_absolute(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let at_top = !out.components().any(|c| matches!(c, Component::Normal(_)));
                if !at_top {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
