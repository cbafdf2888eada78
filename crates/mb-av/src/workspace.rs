//! Request-scoped workspace for intermediate clips.
//!
//! A [`Workspace`] is a uniquely named hidden directory created beside the
//! source file, so clips land on the same filesystem as the final output.
//! The directory and everything in it is removed when the workspace is
//! dropped, whichever way the owning function returns.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Name prefix shared by every workspace directory.
pub const WORKSPACE_PREFIX: &str = ".mediabay-edit-";

/// Temporary working directory owned by a single edit request.
///
/// # Example
///
/// ```no_run
/// use mb_av::Workspace;
///
/// let workspace = Workspace::beside(std::path::Path::new("/www/clip.mp4"), "req-1").unwrap();
/// let clip = workspace.temp_file("segment_0.mp4");
/// // ... write clips ...
/// drop(workspace); // directory removed here
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace in the directory containing `source`.
    ///
    /// The directory name combines [`WORKSPACE_PREFIX`], `label` (typically a
    /// request id) and a random suffix, so concurrent requests against the
    /// same source never share a directory.
    pub fn beside(source: &Path, label: &str) -> mb_core::Result<Self> {
        let parent = source.parent().ok_or_else(|| {
            mb_core::Error::InvalidPath(format!("{} has no parent directory", source.display()))
        })?;

        let prefix = format!("{WORKSPACE_PREFIX}{}-", sanitize_label(label));
        let temp_dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(parent)
            .map_err(|e| mb_core::Error::filesystem(parent, e))?;
        let path = temp_dir.path().to_path_buf();

        tracing::debug!("Created workspace {}", path.display());

        Ok(Self {
            temp_dir: Some(temp_dir),
            path,
        })
    }

    /// Path to the workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a path for a named file inside the workspace.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let Some(temp_dir) = self.temp_dir.take() else {
            return;
        };
        match temp_dir.close() {
            Ok(()) => tracing::info!("Cleaned up workspace {}", self.path.display()),
            Err(e) => tracing::warn!(
                "Failed to clean up workspace {}: {e}",
                self.path.display()
            ),
        }
    }
}

/// Keep only characters that are safe in a file name.
fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect()
}
