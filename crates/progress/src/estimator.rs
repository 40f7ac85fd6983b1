//! Velocity and completion time estimation.

use chrono::Duration;
use taskdash_core::{ProgressEntry, Time, MAX_PERCENTAGE};

/// Milliseconds in a day, used for fractional day spans.
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Completion time estimator.
///
/// Velocity is measured between the first and last entries of a sorted
/// history and projected forward only when it is positive.
pub struct CompletionEstimator;

impl CompletionEstimator {
    /// Exact elapsed time from `from` to `to` in fractional days.
    ///
    /// This is timestamp subtraction, not calendar-day counting.
    pub fn days_between(&self, from: Time, to: Time) -> f64 {
        (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
    }

    /// Percent-per-day change across a date-sorted history, rounded to one
    /// decimal place.
    ///
    /// Fewer than two entries, or a zero time span, gives 0.
    pub fn velocity(&self, sorted: &[&ProgressEntry]) -> f64 {
        let [first, .., last] = sorted else {
            return 0.0;
        };

        let days = self.days_between(first.date, last.date);
        if days == 0.0 {
            return 0.0;
        }

        round_to_tenth((last.progress_percentage - first.progress_percentage) / days)
    }

    /// Project when `current` reaches 100% at `velocity` percent per day.
    ///
    /// Zero and negative velocities are never projected, and neither is a
    /// projection that falls outside the representable date range.
    pub fn estimate_completion(&self, current: f64, velocity: f64, now: Time) -> Option<Time> {
        if velocity <= 0.0 || !velocity.is_finite() {
            return None;
        }

        let remaining = MAX_PERCENTAGE - current;
        let millis = (remaining / velocity * MILLIS_PER_DAY).round();
        if !millis.is_finite() {
            return None;
        }

        // `as` saturates; an out-of-range span is then rejected below
        let offset = Duration::try_milliseconds(millis as i64)?;
        now.checked_add_signed(offset)
    }
}

impl Default for CompletionEstimator {
    fn default() -> Self {
        Self
    }
}

/// Round to one decimal place, half away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // normalize -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
