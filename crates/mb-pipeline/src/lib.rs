//! mb-pipeline: turn a list of timecode ranges into one output clip.
//!
//! A [`VideoEditRequest`] names a source file under the media root and an
//! ordered list of [`Segment`]s. [`SegmentPipeline`] cuts a single segment
//! into `<stem>_merge.mp4`, or cuts several and joins them into
//! `<stem>_merged.mp4`. All tool output goes to a request-scoped workspace
//! and only a successful result is moved into place.

pub mod executor;
pub mod request;

pub use executor::{output_path, SegmentPipeline, MERGED_SUFFIX, TRIMMED_SUFFIX};
pub use request::{EditResult, Segment, VideoEditRequest};
