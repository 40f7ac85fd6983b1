//! Progress tracking service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskdash_core::{EntryError, ProgressEntry, TaskId, Time};
use taskdash_storage::{ProgressStore, StorageError};
use tracing::{debug, info, warn};

use crate::analytics::{ProgressAnalytics, ScheduleStatus};

/// Errors raised while building a progress report.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A stored entry cannot be analysed
    #[error("Entry {index} of task {task_id} is invalid: {source}")]
    InvalidEntry {
        /// Task the history belongs to
        task_id: TaskId,
        /// Position in the stored history
        index: usize,
        /// Validation failure
        #[source]
        source: EntryError,
    },
}

/// Configuration for the progress tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Log a warning when a report shows a declining trend
    pub warn_on_regression: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            warn_on_regression: true,
        }
    }
}

/// Analytics for one task at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// Task the report covers
    pub task_id: TaskId,

    /// Evaluation time
    pub generated_at: Time,

    /// Due date the report was built against
    pub due_date: Option<Time>,

    /// Derived analytics, `None` when the task has no history
    pub analytics: Option<ProgressAnalytics>,
}

impl ProgressReport {
    /// Whether the task has no recorded progress.
    pub fn is_empty(&self) -> bool {
        self.analytics.is_none()
    }

    /// Projected completion against the report's due date.
    pub fn schedule_status(&self) -> ScheduleStatus {
        self.analytics
            .as_ref()
            .map_or(ScheduleStatus::Unknown, |a| a.schedule_status(self.due_date))
    }
}

/// Progress tracking service.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Load a task's validated history.
    async fn history(&self, task_id: TaskId) -> Result<Vec<ProgressEntry>, TrackerError>;

    /// Build a report evaluated at `now`.
    async fn report_at(
        &self,
        task_id: TaskId,
        due_date: Option<Time>,
        now: Time,
    ) -> Result<ProgressReport, TrackerError>;

    /// Build a report evaluated against the system clock.
    async fn report(
        &self,
        task_id: TaskId,
        due_date: Option<Time>,
    ) -> Result<ProgressReport, TrackerError> {
        self.report_at(task_id, due_date, Utc::now()).await
    }
}

/// Basic progress tracker implementation.
pub struct BasicProgressTracker<S: ProgressStore> {
    storage: Arc<S>,
    config: TrackerConfig,
}

impl<S: ProgressStore> BasicProgressTracker<S> {
    /// Create a new progress tracker.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
            config: TrackerConfig::default(),
        }
    }

    /// Set configuration.
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// Get configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

#[async_trait]
impl<S: ProgressStore + 'static> ProgressTracker for BasicProgressTracker<S> {
    async fn history(&self, task_id: TaskId) -> Result<Vec<ProgressEntry>, TrackerError> {
        let history = self.storage.load_history(task_id).await?;

        for (index, entry) in history.iter().enumerate() {
            if let Err(source) = entry.validate() {
                warn!(%task_id, index, error = %source, "Rejecting progress history");
                return Err(TrackerError::InvalidEntry {
                    task_id,
                    index,
                    source,
                });
            }
        }

        debug!(%task_id, entries = history.len(), "Loaded progress history");
        Ok(history)
    }

    async fn report_at(
        &self,
        task_id: TaskId,
        due_date: Option<Time>,
        now: Time,
    ) -> Result<ProgressReport, TrackerError> {
        let history = self.history(task_id).await?;

        // Nothing to derive from; the caller renders a placeholder.
        if history.is_empty() {
            info!(%task_id, "No progress recorded");
            return Ok(ProgressReport {
                task_id,
                generated_at: now,
                due_date,
                analytics: None,
            });
        }

        let analytics = ProgressAnalytics::derive(&history, due_date, now);

        if self.config.warn_on_regression && analytics.stats.progress_velocity < 0.0 {
            warn!(
                %task_id,
                velocity = analytics.stats.progress_velocity,
                "Progress is declining"
            );
        }

        info!(
            "Report for {}: {} entries, avg {}%, {}%/day",
            task_id,
            analytics.stats.total_entries,
            analytics.stats.average_progress,
            analytics.stats.progress_velocity
        );

        Ok(ProgressReport {
            task_id,
            generated_at: now,
            due_date,
            analytics: Some(analytics),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStore {
        histories: HashMap<TaskId, Vec<ProgressEntry>>,
    }

    #[async_trait]
    impl ProgressStore for MockStore {
        async fn append_entry(&mut self, task_id: TaskId, entry: &ProgressEntry) -> taskdash_storage::Result<()> {
            // no validation, so tests can plant bad entries
            self.histories.entry(task_id).or_default().push(entry.clone());
            Ok(())
        }
        async fn load_history(&self, task_id: TaskId) -> taskdash_storage::Result<Vec<ProgressEntry>> {
            Ok(self.histories.get(&task_id).cloned().unwrap_or_default())
        }
        async fn list_tasks(&self) -> taskdash_storage::Result<Vec<TaskId>> {
            Ok(self.histories.keys().copied().collect())
        }
    }

    fn now() -> Time {
        Utc.with_ymd_and_hms(2024, 9, 2, 10, 0, 0).unwrap()
    }

    async fn store_with(task_id: TaskId, entries: &[(i64, f64)]) -> MockStore {
        let mut store = MockStore::default();
        for (offset, pct) in entries {
            let entry = ProgressEntry::new(now() + Duration::days(*offset), *pct);
            store.append_entry(task_id, &entry).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_report_for_empty_history_short_circuits() {
        let task_id = TaskId::new();
        let tracker = BasicProgressTracker::new(MockStore::default());

        let report = tracker
            .report_at(task_id, Some(now() + Duration::days(3)), now())
            .await
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.task_id, task_id);
        assert_eq!(report.generated_at, now());
        assert_eq!(report.schedule_status(), ScheduleStatus::Unknown);
    }

    #[tokio::test]
    async fn test_report_derives_analytics() {
        let task_id = TaskId::new();
        let store = store_with(task_id, &[(0, 80.0), (-10, 20.0)]).await;
        let tracker = BasicProgressTracker::new(store);
        let due = Some(now() + Duration::days(30));

        let report = tracker.report_at(task_id, due, now()).await.unwrap();
        let analytics = report.analytics.as_ref().unwrap();

        assert_eq!(analytics.stats.progress_velocity, 6.0);
        assert_eq!(analytics.stats.average_progress, 50.0);
        assert_eq!(analytics.series.len(), 3);
        assert!(analytics.series[2].is_target());
        assert_eq!(report.schedule_status(), ScheduleStatus::OnTrack);
    }

    #[tokio::test]
    async fn test_report_rejects_invalid_entry() {
        let task_id = TaskId::new();
        let store = store_with(task_id, &[(-2, 10.0), (-1, 250.0)]).await;
        let tracker = BasicProgressTracker::new(store);

        let err = tracker.report_at(task_id, None, now()).await.unwrap_err();
        match err {
            TrackerError::InvalidEntry { index, source, .. } => {
                assert_eq!(index, 1);
                assert_eq!(source, EntryError::OutOfRange(250.0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_history_keeps_stored_order() {
        let task_id = TaskId::new();
        let store = store_with(task_id, &[(-1, 40.0), (-5, 10.0)]).await;
        let tracker = BasicProgressTracker::new(store);

        let history = tracker.history(task_id).await.unwrap();
        let pcts: Vec<f64> = history.iter().map(|e| e.progress_percentage).collect();
        assert_eq!(pcts, vec![40.0, 10.0]);
    }

    #[tokio::test]
    async fn test_regression_report_still_succeeds() {
        let task_id = TaskId::new();
        let store = store_with(task_id, &[(-10, 80.0), (0, 60.0)]).await;
        let tracker = BasicProgressTracker::new(store).with_config(TrackerConfig {
            warn_on_regression: false,
        });
        assert!(!tracker.config().warn_on_regression);

        let report = tracker.report_at(task_id, None, now()).await.unwrap();
        let stats = &report.analytics.as_ref().unwrap().stats;
        assert_eq!(stats.progress_velocity, -2.0);
        assert_eq!(stats.estimated_completion, None);
    }

    #[tokio::test]
    async fn test_report_uses_system_clock() {
        let task_id = TaskId::new();
        let store = store_with(task_id, &[(-1, 30.0)]).await;
        let tracker = BasicProgressTracker::new(store);

        let before = Utc::now();
        let report = tracker.report(task_id, None).await.unwrap();
        assert!(report.generated_at >= before);
        assert!(!report.is_empty());
    }
}
