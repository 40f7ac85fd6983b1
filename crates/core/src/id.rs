//! Task identifiers.
//!
//! A task id is a ULID, so ids sort by creation time and carry that time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::Time;

/// Identifier of a task whose progress is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Ulid);

/// A string that is not a task id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task id {input:?}: {reason}")]
pub struct InvalidTaskId {
    /// Rejected input
    pub input: String,
    /// Decoder message
    pub reason: String,
}

impl TaskId {
    /// Allocate an id for a task created now.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// When the id was allocated, from the ULID timestamp.
    pub fn created_at(&self) -> Option<Time> {
        i64::try_from(self.0.timestamp_ms())
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = InvalidTaskId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s.trim()).map(Self).map_err(|e| InvalidTaskId {
            input: s.to_string(),
            reason: e.to_string(),
        })
    }
}
