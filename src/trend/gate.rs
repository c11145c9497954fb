//! Quality-gate history.

use serde::{Deserialize, Serialize};

use crate::series::TrendSeries;

/// Pass/fail history of the quality gate over the covered period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateHistory {
    /// Snapshots whose gate passed.
    pub passed: usize,
    /// All snapshots with a gate state.
    pub total: usize,
    /// Share of passing snapshots, in percent.
    pub pass_rate: f64,
    /// State of the current streak: `true` when the most recent snapshots
    /// are passing.
    pub streak_passing: bool,
    /// Length of the unbroken run of that state, counted backward from the
    /// most recent snapshot. Always between 1 and `total`.
    pub streak_length: usize,
}

/// Summarize a gate series (values 1 for passed, 0 for failed).
///
/// Returns `None` for an empty series.
pub fn gate_history(series: &TrendSeries) -> Option<GateHistory> {
    let last = series.last()?;
    let total = series.len();
    let passed = series.points.iter().filter(|p| p.value > 0.5).count();
    let streak_passing = last.value > 0.5;
    let streak_length = series
        .points
        .iter()
        .rev()
        .take_while(|p| (p.value > 0.5) == streak_passing)
        .count();
    Some(GateHistory {
        passed,
        total,
        pass_rate: passed as f64 / total as f64 * 100.0,
        streak_passing,
        streak_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Metric, TrendPoint};
    use chrono::{Duration, TimeZone, Utc};

    fn gate_series(states: &[bool]) -> TrendSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        TrendSeries {
            metric: Metric::QualityGate,
            points: states
                .iter()
                .enumerate()
                .map(|(i, &passed)| TrendPoint {
                    at: start + Duration::days(i as i64),
                    value: if passed { 1.0 } else { 0.0 },
                })
                .collect(),
        }
    }

    #[test]
    fn test_streak_restarts_after_failure() {
        let history = gate_history(&gate_series(&[true, true, false, true])).unwrap();
        assert_eq!(history.pass_rate, 75.0);
        assert_eq!(history.passed, 3);
        assert_eq!(history.total, 4);
        assert!(history.streak_passing);
        assert_eq!(history.streak_length, 1);
    }

    #[test]
    fn test_uniform_history_streaks_full_length() {
        let all_pass = gate_history(&gate_series(&[true, true, true])).unwrap();
        assert_eq!(all_pass.pass_rate, 100.0);
        assert!(all_pass.streak_passing);
        assert_eq!(all_pass.streak_length, 3);

        let all_fail = gate_history(&gate_series(&[false, false])).unwrap();
        assert_eq!(all_fail.pass_rate, 0.0);
        assert!(!all_fail.streak_passing);
        assert_eq!(all_fail.streak_length, 2);
    }

    #[test]
    fn test_failing_streak_counts_failures() {
        let history = gate_history(&gate_series(&[true, false, false])).unwrap();
        assert!(!history.streak_passing);
        assert_eq!(history.streak_length, 2);
        assert_eq!(history.pass_rate, 100.0 / 3.0);
    }

    #[test]
    fn test_streak_length_stays_within_bounds() {
        let patterns: [&[bool]; 5] = [
            &[true],
            &[false, true],
            &[true, false, true, true],
            &[false, false, true, false],
            &[true, true, true, true, true],
        ];
        for states in patterns {
            let history = gate_history(&gate_series(states)).unwrap();
            assert!(history.streak_length >= 1);
            assert!(history.streak_length <= history.total);
        }
    }

    #[test]
    fn test_empty_series_has_no_history() {
        assert!(gate_history(&gate_series(&[])).is_none());
    }
}
