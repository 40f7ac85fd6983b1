//! Progress analytics.
//!
//! Turns a task's progress history into a chart-ready series and summary
//! statistics, and wires that derivation to a progress store.

#![warn(missing_docs)]

pub mod analytics;
pub mod estimator;
pub mod tracker;

pub use analytics::{
    DerivedPoint, ProgressAnalytics, ProgressStats, RecordedPoint, ScheduleStatus, TargetPoint,
    Trend,
};
pub use estimator::CompletionEstimator;
pub use tracker::{
    BasicProgressTracker, ProgressReport, ProgressTracker, TrackerConfig, TrackerError,
};
