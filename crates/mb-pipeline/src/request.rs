//! Edit request and result types.

use mb_core::{timecode, Timecode};
use serde::{Deserialize, Serialize};

/// A `[start, end)` range within a source file, as `HH:MM:SS` timecodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_time: String,
    pub end_time: String,
}

impl Segment {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// Parse the start timecode and compute a strictly positive duration.
    ///
    /// # Errors
    ///
    /// Returns [`mb_core::Error::InvalidTimeFormat`] if either timecode is
    /// malformed or if `end_time` is not after `start_time`.
    pub fn plan(&self) -> mb_core::Result<(Timecode, u64)> {
        let start: Timecode = self.start_time.parse()?;
        let seconds = timecode::duration(&self.start_time, &self.end_time)?;
        if seconds <= 0 {
            return Err(mb_core::Error::InvalidTimeFormat(format!(
                "segment {}-{} has no positive duration ({seconds}s)",
                self.start_time, self.end_time
            )));
        }
        Ok((start, seconds as u64))
    }
}

/// A source file plus the ordered segments to keep from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEditRequest {
    /// Source path relative to the media root.
    pub video_path: String,
    pub segments: Vec<Segment>,
}

/// Where the edited file was written, relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResult {
    pub output: String,
}
