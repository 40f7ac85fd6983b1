//! Taskdash core data models.
//!
//! This crate defines the progress-history types shared by the store, the
//! analytics deriver and the command-line front end.

#![warn(missing_docs)]

// Core identities
mod id;

// Progress history
mod progress;

// Re-exports
pub use id::*;
pub use progress::{EntryError, ProgressEntry, MAX_PERCENTAGE, MIN_PERCENTAGE};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
