//! Segment pipeline executor.
//!
//! One segment is cut into `<stem>_merge.mp4` beside the source. Several
//! segments are cut in list order, listed in a concat manifest and joined
//! into `<stem>_merged.mp4`.
//!
//! Every tool writes into a request-scoped [`Workspace`]. The finished file
//! is renamed onto its final path only after the terminal step succeeds, so
//! a failed request never touches an existing output. The workspace is a
//! drop guard and is removed on every return path once created.
//!
//! The first failure aborts the request; nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mb_av::{render_concat_manifest, Transcoder, Workspace};
use mb_core::{MediaRoot, Timecode};

use crate::request::{EditResult, Segment, VideoEditRequest};

/// Suffix replacing the source extension for single-segment edits.
pub const TRIMMED_SUFFIX: &str = "_merge.mp4";

/// Suffix replacing the source extension for multi-segment edits.
pub const MERGED_SUFFIX: &str = "_merged.mp4";

const MANIFEST_NAME: &str = "concat.txt";

/// Name of the terminal step's output inside the workspace.
const STAGED_OUTPUT: &str = "output.mp4";

/// Drives extraction and concatenation for edit requests.
///
/// Holds no per-request state; clone it freely (it only holds `Arc`s).
#[derive(Clone)]
pub struct SegmentPipeline {
    root: Arc<MediaRoot>,
    transcoder: Arc<dyn Transcoder>,
}

impl SegmentPipeline {
    pub fn new(root: Arc<MediaRoot>, transcoder: Arc<dyn Transcoder>) -> Self {
        Self { root, transcoder }
    }

    /// Run an edit request to completion.
    ///
    /// `edit_id` labels the temporary workspace (usually the request id).
    ///
    /// # Errors
    ///
    /// - [`mb_core::Error::InvalidPath`] if the source escapes the root.
    /// - [`mb_core::Error::Validation`] if there are no segments or the
    ///   source is not a regular file.
    /// - [`mb_core::Error::InvalidTimeFormat`] for a malformed or
    ///   non-positive segment. All segments are checked before any work.
    /// - [`mb_core::Error::Filesystem`] if the source is missing or the
    ///   workspace or manifest cannot be written.
    /// - [`mb_core::Error::Tool`] if an extraction or the concat fails.
    pub async fn run(
        &self,
        request: &VideoEditRequest,
        edit_id: &str,
    ) -> mb_core::Result<EditResult> {
        let source = self.root.resolve(&request.video_path)?;

        if request.segments.is_empty() {
            return Err(mb_core::Error::Validation(
                "at least one segment is required".into(),
            ));
        }

        let metadata = tokio::fs::metadata(&source)
            .await
            .map_err(|e| mb_core::Error::filesystem(&source, e))?;
        if !metadata.is_file() {
            return Err(mb_core::Error::Validation(format!(
                "{} is not a file",
                request.video_path
            )));
        }

        let plan = request
            .segments
            .iter()
            .map(Segment::plan)
            .collect::<mb_core::Result<Vec<_>>>()?;

        tracing::info!(
            "Processing video: {} ({} segment(s))",
            request.video_path,
            plan.len()
        );

        let output = match plan.as_slice() {
            [(start, seconds)] => self.trim(&source, *start, *seconds, edit_id).await?,
            ranges => self.merge(&source, ranges, edit_id).await?,
        };

        Ok(EditResult {
            output: self.root.to_relative(&output),
        })
    }

    async fn trim(
        &self,
        source: &Path,
        start: Timecode,
        seconds: u64,
        edit_id: &str,
    ) -> mb_core::Result<PathBuf> {
        let workspace = Workspace::beside(source, edit_id)?;
        let staged = workspace.temp_file(STAGED_OUTPUT);

        self.transcoder
            .extract_range(source, &staged, start, seconds)
            .await?;

        let output = output_path(source, TRIMMED_SUFFIX);
        publish(&staged, &output).await?;

        tracing::info!("Video edited successfully, output: {}", output.display());
        Ok(output)
    }

    async fn merge(
        &self,
        source: &Path,
        ranges: &[(Timecode, u64)],
        edit_id: &str,
    ) -> mb_core::Result<PathBuf> {
        // Dropped (and deleted) on every return below.
        let workspace = Workspace::beside(source, edit_id)?;

        let mut clips = Vec::with_capacity(ranges.len());
        for (i, (start, seconds)) in ranges.iter().enumerate() {
            let clip = workspace.temp_file(&format!("segment_{i}.mp4"));
            self.transcoder
                .extract_range(source, &clip, *start, *seconds)
                .await?;
            tracing::debug!("Extracted segment {i} to {}", clip.display());
            clips.push(clip);
        }

        let manifest = workspace.temp_file(MANIFEST_NAME);
        tokio::fs::write(&manifest, render_concat_manifest(&clips))
            .await
            .map_err(|e| mb_core::Error::filesystem(&manifest, e))?;

        let staged = workspace.temp_file(STAGED_OUTPUT);
        self.transcoder.concat(&manifest, &staged).await?;

        let output = output_path(source, MERGED_SUFFIX);
        publish(&staged, &output).await?;

        tracing::info!("Video merged successfully, output: {}", output.display());
        Ok(output)
    }
}

/// Sibling of `source` with its extension replaced by `suffix`.
///
/// `videos/clip.mov` + `_merged.mp4` gives `videos/clip_merged.mp4`.
pub fn output_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{suffix}"))
}

/// Move a finished file from the workspace onto its final path, replacing
/// any previous output. The workspace sits beside the source, so both paths
/// are on the same filesystem and the rename is atomic.
async fn publish(staged: &Path, output: &Path) -> mb_core::Result<()> {
    tokio::fs::rename(staged, output)
        .await
        .map_err(|e| mb_core::Error::filesystem(output, e))
}
