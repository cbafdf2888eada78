//! Shared application context.
//!
//! [`AppContext`] is handed to every route handler via Axum state. All of it
//! is immutable after startup, so it is cheap to clone and needs no locking.

use std::sync::Arc;

use mb_av::{FfmpegTranscoder, ToolRegistry, Transcoder};
use mb_core::MediaRoot;
use mb_pipeline::SegmentPipeline;

#[derive(Clone)]
pub struct AppContext {
    /// The directory every client path is confined to.
    pub root: Arc<MediaRoot>,
    pub tools: Arc<ToolRegistry>,
    pub pipeline: SegmentPipeline,
}

impl AppContext {
    /// Context whose edits run through ffmpeg from `tools`.
    pub fn new(root: Arc<MediaRoot>, tools: Arc<ToolRegistry>) -> Self {
        let transcoder = Arc::new(FfmpegTranscoder::new(tools.clone()));
        Self::with_transcoder(root, tools, transcoder)
    }

    /// Context with an explicit [`Transcoder`], e.g. a fake in tests.
    pub fn with_transcoder(
        root: Arc<MediaRoot>,
        tools: Arc<ToolRegistry>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let pipeline = SegmentPipeline::new(root.clone(), transcoder);
        Self {
            root,
            tools,
            pipeline,
        }
    }
}
