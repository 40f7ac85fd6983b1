//! Progress analytics derivation.
//!
//! Given a task's progress history (in any order) and its due date, this
//! module produces:
//! - a date-ordered series of chart points, with a synthetic 100% target
//!   point appended while the due date is still ahead
//! - summary statistics (average, velocity, projected completion)
//!
//! The derivation is pure: the evaluation time is passed in, so the same
//! input always yields the same output.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskdash_core::{ProgressEntry, Time, MAX_PERCENTAGE};
use tracing::debug;

use crate::estimator::CompletionEstimator;

/// A chart point backed by a recorded entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPoint {
    /// Entry date
    pub date: Time,

    /// Percentage complete at that date
    pub progress: f64,

    /// Difference from the previous point (0 for the first)
    pub progress_change: f64,
}

/// The synthetic "100% by the due date" point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPoint {
    /// Due date
    pub date: Time,

    /// Always true; marks the point as synthetic on the wire
    pub is_target: bool,

    /// Target percentage
    pub target: f64,
}

impl TargetPoint {
    /// Target point for a due date.
    pub fn new(date: Time) -> Self {
        Self {
            date,
            is_target: true,
            target: MAX_PERCENTAGE,
        }
    }
}

/// One point of the derived series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DerivedPoint {
    /// Backed by a progress entry
    Recorded(RecordedPoint),
    /// Synthetic due-date target
    Target(TargetPoint),
}

impl DerivedPoint {
    /// Point date.
    pub fn date(&self) -> Time {
        match self {
            DerivedPoint::Recorded(p) => p.date,
            DerivedPoint::Target(p) => p.date,
        }
    }

    /// Recorded progress, `None` for the target point.
    pub fn progress(&self) -> Option<f64> {
        match self {
            DerivedPoint::Recorded(p) => Some(p.progress),
            DerivedPoint::Target(_) => None,
        }
    }

    /// Whether this is the synthetic target point.
    pub fn is_target(&self) -> bool {
        matches!(self, DerivedPoint::Target(_))
    }
}

/// Direction of the progress trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Positive velocity
    Rising,
    /// Zero velocity
    Flat,
    /// Negative velocity
    Declining,
}

impl Trend {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Flat => "flat",
            Trend::Declining => "declining",
        }
    }
}

/// How the projected completion compares to the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    /// Latest entry is already at 100%
    Completed,
    /// Projected to finish by the due date
    OnTrack,
    /// Projected to finish after the due date
    Behind,
    /// No projection or no due date
    Unknown,
}

impl ScheduleStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::OnTrack => "on track",
            ScheduleStatus::Behind => "behind",
            ScheduleStatus::Unknown => "unknown",
        }
    }
}

/// Summary statistics over a history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    /// Mean percentage, rounded to the nearest integer
    pub average_progress: f64,

    /// Percent per day between first and last entry, one decimal place
    pub progress_velocity: f64,

    /// When 100% is reached at the current velocity
    pub estimated_completion: Option<Time>,

    /// Number of recorded entries
    pub total_entries: usize,
}

impl ProgressStats {
    /// Classify the velocity.
    pub fn trend(&self) -> Trend {
        if self.progress_velocity > 0.0 {
            Trend::Rising
        } else if self.progress_velocity < 0.0 {
            Trend::Declining
        } else {
            Trend::Flat
        }
    }
}

/// Chart series plus statistics for one history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressAnalytics {
    /// Date-ordered points, target point last if present
    pub series: Vec<DerivedPoint>,

    /// Summary statistics
    pub stats: ProgressStats,
}

impl ProgressAnalytics {
    /// Derive analytics as of `now`.
    ///
    /// An empty history yields an empty series and zeroed statistics; callers
    /// are expected to show a placeholder instead.
    pub fn derive(history: &[ProgressEntry], due_date: Option<Time>, now: Time) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        // stable: entries sharing a date keep their relative order
        let mut sorted: Vec<&ProgressEntry> = history.iter().collect();
        sorted.sort_by_key(|e| e.date);

        let mut series: Vec<DerivedPoint> = Vec::with_capacity(sorted.len() + 1);
        let mut previous: Option<f64> = None;
        for entry in &sorted {
            let progress = entry.progress_percentage;
            series.push(DerivedPoint::Recorded(RecordedPoint {
                date: entry.date,
                progress,
                progress_change: previous.map_or(0.0, |p| progress - p),
            }));
            previous = Some(progress);
        }

        if let Some(due) = due_date.filter(|due| *due > now) {
            series.push(DerivedPoint::Target(TargetPoint::new(due)));
        }

        let stats = Self::compute_stats(&sorted, now);
        debug!(
            entries = stats.total_entries,
            velocity = stats.progress_velocity,
            points = series.len(),
            "Derived progress analytics"
        );

        Self { series, stats }
    }

    /// Derive analytics against the system clock.
    pub fn derive_now(history: &[ProgressEntry], due_date: Option<Time>) -> Self {
        Self::derive(history, due_date, Utc::now())
    }

    fn compute_stats(sorted: &[&ProgressEntry], now: Time) -> ProgressStats {
        let estimator = CompletionEstimator;

        let total: f64 = sorted.iter().map(|e| e.progress_percentage).sum();
        let average_progress = (total / sorted.len() as f64).round();

        let progress_velocity = estimator.velocity(sorted);

        let estimated_completion = sorted.last().and_then(|last| {
            estimator.estimate_completion(last.progress_percentage, progress_velocity, now)
        });

        ProgressStats {
            average_progress,
            progress_velocity,
            estimated_completion,
            total_entries: sorted.len(),
        }
    }

    /// Progress of the latest recorded point.
    pub fn current_progress(&self) -> Option<f64> {
        self.series.iter().rev().find_map(DerivedPoint::progress)
    }

    /// Recorded points only, in date order.
    pub fn recorded(&self) -> impl Iterator<Item = &RecordedPoint> {
        self.series.iter().filter_map(|p| match p {
            DerivedPoint::Recorded(r) => Some(r),
            DerivedPoint::Target(_) => None,
        })
    }

    /// The synthetic target point, if one was appended.
    pub fn target(&self) -> Option<&TargetPoint> {
        self.series.iter().find_map(|p| match p {
            DerivedPoint::Target(t) => Some(t),
            DerivedPoint::Recorded(_) => None,
        })
    }

    /// Compare the completion estimate with a due date.
    pub fn schedule_status(&self, due_date: Option<Time>) -> ScheduleStatus {
        if self
            .current_progress()
            .is_some_and(|p| p >= MAX_PERCENTAGE)
        {
            return ScheduleStatus::Completed;
        }

        match (self.stats.estimated_completion, due_date) {
            (Some(eta), Some(due)) if eta <= due => ScheduleStatus::OnTrack,
            (Some(_), Some(_)) => ScheduleStatus::Behind,
            _ => ScheduleStatus::Unknown,
        }
    }
}
