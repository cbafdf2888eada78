//! `HH:MM:SS` timecodes and range durations.
//!
//! Parsing is deliberately permissive about field ranges: `00:75:00` is
//! accepted and simply means 75 minutes. Only the shape is checked: exactly
//! three colon-separated non-negative integers.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A parsed `HH:MM:SS` timecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Timecode {
    /// Total offset in whole seconds.
    pub fn total_seconds(&self) -> i64 {
        let total = self.hours * 3600 + self.minutes * 60 + self.seconds;
        total as i64
    }
}

impl FromStr for Timecode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 3 {
            return Err(Error::InvalidTimeFormat(format!(
                "{s:?}: expected HH:MM:SS, found {} field(s)",
                fields.len()
            )));
        }

        let parse = |field: &str| -> Result<u64> {
            let value: u64 = field.parse().map_err(|e| {
                Error::InvalidTimeFormat(format!("{s:?}: bad field {field:?}: {e}"))
            })?;
            // Keep totals comfortably inside i64.
            if value > u32::MAX as u64 {
                return Err(Error::InvalidTimeFormat(format!(
                    "{s:?}: field {field:?} out of range"
                )));
            }
            Ok(value)
        };

        Ok(Self {
            hours: parse(fields[0])?,
            minutes: parse(fields[1])?,
            seconds: parse(fields[2])?,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Seconds from `start` to `end`.
///
/// The result is signed: an `end` before `start` yields a negative value and
/// it is up to the caller to decide what to do with it.
///
/// # Errors
///
/// Returns [`Error::InvalidTimeFormat`] if either timecode is malformed.
pub fn duration(start: &str, end: &str) -> Result<i64> {
    let start: Timecode = start.parse()?;
    let end: Timecode = end.parse()?;
    Ok(end.total_seconds() - start.total_seconds())
}
