//! The transcoding tool as seen by the edit pipeline.
//!
//! The tool is an opaque capability with two modes: cut one time range out of
//! a file, and join already-cut clips listed in a manifest. Both stream-copy;
//! nothing is decoded or re-encoded. [`Transcoder`] is the seam that lets the
//! pipeline run against a fake in tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use mb_core::Timecode;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// One method per tool mode used by the pipeline.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Copy `duration_seconds` of `source`, starting at `start`, into `output`.
    ///
    /// Success is signalled solely by the tool's exit status.
    async fn extract_range(
        &self,
        source: &Path,
        output: &Path,
        start: Timecode,
        duration_seconds: u64,
    ) -> mb_core::Result<()>;

    /// Join the clips listed in `manifest` (see [`render_concat_manifest`])
    /// into `output`, in manifest order.
    async fn concat(&self, manifest: &Path, output: &Path) -> mb_core::Result<()>;
}

/// [`Transcoder`] backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    tools: Arc<ToolRegistry>,
}

impl FfmpegTranscoder {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    fn command(&self) -> mb_core::Result<ToolCommand> {
        let ffmpeg = self.tools.require("ffmpeg")?;
        Ok(ToolCommand::new(ffmpeg.path.clone()))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn extract_range(
        &self,
        source: &Path,
        output: &Path,
        start: Timecode,
        duration_seconds: u64,
    ) -> mb_core::Result<()> {
        let mut cmd = self.command()?;
        cmd.args(extract_args(source, output, start, duration_seconds));
        cmd.execute().await.map_err(|e| {
            with_context(
                e,
                format!("cutting {} from {}", output.display(), source.display()),
            )
        })?;
        Ok(())
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> mb_core::Result<()> {
        let mut cmd = self.command()?;
        cmd.args(concat_args(manifest, output));
        cmd.execute().await.map_err(|e| {
            with_context(
                e,
                format!("joining {} into {}", manifest.display(), output.display()),
            )
        })?;
        Ok(())
    }
}

/// ffmpeg arguments for a stream-copy range cut.
///
/// `-ss` follows `-i` so the seek is applied on the output side, matching
/// how the clips are later concatenated.
pub fn extract_args(
    source: &Path,
    output: &Path,
    start: Timecode,
    duration_seconds: u64,
) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        source.to_string_lossy().into_owned(),
        "-ss".into(),
        start.total_seconds().to_string(),
        "-t".into(),
        duration_seconds.to_string(),
        "-c".into(),
        "copy".into(),
        output.to_string_lossy().into_owned(),
    ]
}

/// ffmpeg arguments for a concat-demuxer join.
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        manifest.to_string_lossy().into_owned(),
        "-c".into(),
        "copy".into(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Render a concat-demuxer manifest: one `file '<path>'` line per clip.
///
/// Single quotes inside a path are closed, escaped and reopened (`'\''`).
pub fn render_concat_manifest(clips: &[PathBuf]) -> String {
    let mut manifest = String::new();
    for clip in clips {
        let path = clip.to_string_lossy().replace('\'', r"'\''");
        manifest.push_str("file '");
        manifest.push_str(&path);
        manifest.push_str("'\n");
    }
    manifest
}

fn with_context(err: mb_core::Error, context: String) -> mb_core::Error {
    match err {
        mb_core::Error::Tool { tool, message } => mb_core::Error::Tool {
            tool,
            message: format!("{context}: {message}"),
        },
        other => other,
    }
}
