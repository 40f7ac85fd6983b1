//! Storage trait abstraction.

use async_trait::async_trait;
use taskdash_core::{EntryError, ProgressEntry, TaskId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Entry failed validation
    #[error("Invalid entry: {0}")]
    InvalidEntry(#[from] EntryError),

}

/// Source of progress histories.
///
/// This trait allows different backends to feed the analytics.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Validate and append an entry to a task's history.
    async fn append_entry(&mut self, task_id: TaskId, entry: &ProgressEntry) -> Result<()>;

    /// Load a task's history in insertion order.
    ///
    /// A task that has never been recorded has an empty history.
    async fn load_history(&self, task_id: TaskId) -> Result<Vec<ProgressEntry>>;

    /// List every task with a stored history.
    async fn list_tasks(&self) -> Result<Vec<TaskId>>;
}
