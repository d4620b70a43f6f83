//! Per-character outcomes and the aggregate pass summary.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::character::TrackedCharacter;
use crate::types::{DbId, Timestamp};

/// Why a pass stopped before reaching the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    DeadlineExceeded,
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::DeadlineExceeded => f.write_str("Deadline exceeded"),
            StopReason::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Result for one character in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshOutcome {
    pub id: DbId,
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Not attempted because the pass stopped early.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl RefreshOutcome {
    pub fn succeeded(character: &TrackedCharacter) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            success: true,
            error: None,
            skipped: false,
        }
    }

    pub fn failed(character: &TrackedCharacter, error: impl Into<String>) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            success: false,
            error: Some(error.into()),
            skipped: false,
        }
    }

    pub fn skipped(character: &TrackedCharacter, reason: StopReason) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            success: false,
            error: Some(format!("Skipped: {reason}")),
            skipped: true,
        }
    }
}

/// Aggregate report for one pass.
///
/// `updated + errors + skipped == total` always holds; `skipped` is only
/// non-zero when the pass hit its deadline or was cancelled.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub updated: usize,
    pub errors: usize,
    pub skipped: usize,
    pub success_rate: f64,
    pub elapsed_seconds: f64,
    pub timed_out: bool,
    pub timestamp: Timestamp,
    pub details: Vec<RefreshOutcome>,
}

impl RunSummary {
    /// Summary for a pass with nothing to do.
    pub fn empty() -> Self {
        Self::from_outcomes(Vec::new(), Duration::ZERO, false)
    }

    /// Fold per-character outcomes into a summary.
    pub fn from_outcomes(details: Vec<RefreshOutcome>, elapsed: Duration, timed_out: bool) -> Self {
        let total = details.len();
        let updated = details.iter().filter(|o| o.success).count();
        let skipped = details.iter().filter(|o| o.skipped).count();
        let errors = total - updated - skipped;

        Self {
            total,
            updated,
            errors,
            skipped,
            success_rate: success_rate(updated, total),
            elapsed_seconds: elapsed.as_secs_f64(),
            timed_out,
            timestamp: Utc::now(),
            details,
        }
    }

    /// Elapsed time rounded to whole seconds.
    pub fn execution_time_secs(&self) -> u64 {
        self.elapsed_seconds.round() as u64
    }
}

/// Percentage of successful refreshes, rounded to one decimal place.
///
/// Returns `0.0` for an empty pass.
pub fn success_rate(updated: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (updated as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(id: DbId) -> TrackedCharacter {
        TrackedCharacter {
            id,
            name: format!("char-{id}"),
            url: format!("https://example.test/char/{id}"),
            user_id: 1,
        }
    }

    #[test]
    fn success_rate_is_zero_for_empty_pass() {
        assert_eq!(success_rate(0, 0), 0.0);
    }

    #[test]
    fn success_rate_rounds_to_one_decimal() {
        assert_eq!(success_rate(1, 3), 33.3);
        assert_eq!(success_rate(2, 3), 66.7);
        assert_eq!(success_rate(3, 3), 100.0);
        assert_eq!(success_rate(0, 7), 0.0);
    }

    #[test]
    fn counts_add_up_to_total() {
        let details = vec![
            RefreshOutcome::succeeded(&character(1)),
            RefreshOutcome::failed(&character(2), "boom"),
            RefreshOutcome::skipped(&character(3), StopReason::DeadlineExceeded),
            RefreshOutcome::succeeded(&character(4)),
        ];
        let summary = RunSummary::from_outcomes(details, Duration::from_millis(1500), true);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.updated + summary.errors + summary.skipped, summary.total);
        assert_eq!(summary.success_rate, 50.0);
        assert_eq!(summary.execution_time_secs(), 2);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = RunSummary::empty();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.details.is_empty());
        assert!(!summary.timed_out);
    }

    #[test]
    fn skipped_flag_only_serialized_when_set() {
        let ok = serde_json::to_value(RefreshOutcome::succeeded(&character(1))).unwrap();
        assert!(ok.get("skipped").is_none());
        assert!(ok.get("error").is_none());

        let skipped = serde_json::to_value(RefreshOutcome::skipped(
            &character(2),
            StopReason::Cancelled,
        ))
        .unwrap();
        assert_eq!(skipped["skipped"], true);
        assert_eq!(skipped["success"], false);
        assert_eq!(skipped["error"], "Skipped: Cancelled");
    }
}
