//! Progress entry model - one timestamped percentage report for a task.

use serde::{Deserialize, Serialize};
use crate::Time;

/// Lowest accepted percentage.
pub const MIN_PERCENTAGE: f64 = 0.0;

/// Highest accepted percentage.
pub const MAX_PERCENTAGE: f64 = 100.0;

/// A single progress report.
///
/// Entries are produced by whoever records progress and are treated as
/// immutable by everything downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    /// When the progress was reported
    pub date: Time,

    /// Percentage complete (0-100)
    pub progress_percentage: f64,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// What is in the way
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockers: Option<String>,

    /// What got done since the last report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<String>,
}

/// Reasons an entry is rejected before analysis.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    /// Percentage is NaN or infinite
    #[error("progress percentage is not a finite number")]
    NotFinite,

    /// Percentage is outside 0-100
    #[error("progress percentage {0} is outside 0-100")]
    OutOfRange(f64),
}

impl ProgressEntry {
    /// Create an entry with no annotations.
    pub fn new(date: Time, progress_percentage: f64) -> Self {
        Self {
            date,
            progress_percentage,
            notes: None,
            blockers: None,
            achievements: None,
        }
    }

    /// Attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach blockers.
    pub fn with_blockers(mut self, blockers: impl Into<String>) -> Self {
        self.blockers = Some(blockers.into());
        self
    }

    /// Attach achievements.
    pub fn with_achievements(mut self, achievements: impl Into<String>) -> Self {
        self.achievements = Some(achievements.into());
        self
    }

    /// Check that the entry can be fed to analytics.
    ///
    /// Dates need no check here: `date` is typed, so an unparsable timestamp
    /// already failed during deserialization.
    pub fn validate(&self) -> Result<(), EntryError> {
        let pct = self.progress_percentage;
        if !pct.is_finite() {
            return Err(EntryError::NotFinite);
        }
        if !(MIN_PERCENTAGE..=MAX_PERCENTAGE).contains(&pct) {
            return Err(EntryError::OutOfRange(pct));
        }
        Ok(())
    }
}
