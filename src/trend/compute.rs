//! Per-series trend computation.
//!
//! A trend compares the two endpoints of a series. There is no smoothing
//! and no forecasting: the numbers state what changed between the first and
//! the last snapshot of the covered period.

use serde::{Deserialize, Serialize};

use crate::series::{Metric, Polarity, TrendSeries};

/// Smallest change that counts as movement: one issue, one rating level,
/// one percentage point, one gate state. Anything below is stable.
pub const MIN_MEANINGFUL_CHANGE: f64 = 1.0;

/// Quality direction of a series over the covered period.
///
/// Direction folds in the metric's polarity: a falling issue count and a
/// rising coverage percentage are both `Improving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Improving,
    Declining,
    Stable,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Improving => "improving",
            Direction::Declining => "declining",
            Direction::Stable => "stable",
        }
    }

    /// Capitalized form for headings.
    pub fn title(&self) -> &'static str {
        match self {
            Direction::Improving => "Improving",
            Direction::Declining => "Declining",
            Direction::Stable => "Stable",
        }
    }

    /// Banner symbol used in both report media.
    pub fn emoji(&self) -> &'static str {
        match self {
            Direction::Improving => "📈",
            Direction::Declining => "📉",
            Direction::Stable => "➡️",
        }
    }
}

/// Endpoint-to-endpoint change of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub metric: Metric,
    pub first: f64,
    pub last: f64,
    /// `last - first`, in the metric's own unit.
    pub delta: f64,
    /// Relative change in percent of the starting value. `None` when the
    /// series started at zero; the report prints `N/A` in that case.
    pub percent: Option<f64>,
    pub direction: Direction,
}

/// Compute the trend of one series. Series with fewer than two points have
/// no trend.
pub fn compute(series: &TrendSeries) -> Option<TrendResult> {
    if series.len() < 2 {
        return None;
    }
    let first = series.first()?.value;
    let last = series.last()?.value;
    let delta = last - first;
    let percent = if first == 0.0 {
        None
    } else {
        Some(delta / first.abs() * 100.0)
    };
    Some(TrendResult {
        metric: series.metric,
        first,
        last,
        delta,
        percent,
        direction: direction_of(series.metric, delta),
    })
}

fn direction_of(metric: Metric, delta: f64) -> Direction {
    if delta.abs() < MIN_MEANINGFUL_CHANGE {
        return Direction::Stable;
    }
    match (metric.polarity(), delta > 0.0) {
        (Polarity::LowerIsBetter, true) => Direction::Declining,
        (Polarity::LowerIsBetter, false) => Direction::Improving,
        (Polarity::HigherIsBetter, true) => Direction::Improving,
        (Polarity::HigherIsBetter, false) => Direction::Declining,
    }
}

/// Rate of change of one series between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub total_change: f64,
    pub days_elapsed: i64,
    pub per_day: f64,
    pub per_week: f64,
}

/// Endpoint rate of change. Rates are zero when both endpoints fall on the
/// same day; series with fewer than two points have no velocity.
pub fn velocity(series: &TrendSeries) -> Option<Velocity> {
    if series.len() < 2 {
        return None;
    }
    let first = series.first()?;
    let last = series.last()?;
    let total_change = last.value - first.value;
    let days_elapsed = (last.at - first.at).num_days();
    if days_elapsed == 0 {
        return Some(Velocity {
            total_change,
            days_elapsed: 0,
            per_day: 0.0,
            per_week: 0.0,
        });
    }
    let per_day = total_change / days_elapsed as f64;
    Some(Velocity {
        total_change,
        days_elapsed,
        per_day,
        per_week: per_day * 7.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TrendPoint;
    use chrono::{Duration, TimeZone, Utc};

    fn series(metric: Metric, values: &[f64]) -> TrendSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        TrendSeries {
            metric,
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| TrendPoint {
                    at: start + Duration::days(i as i64 * 7),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_falling_critical_count_improves() {
        let result = compute(&series(Metric::CriticalIssues, &[10.0, 6.0, 2.0])).unwrap();
        assert_eq!(result.first, 10.0);
        assert_eq!(result.last, 2.0);
        assert_eq!(result.delta, -8.0);
        assert_eq!(result.percent, Some(-80.0));
        assert_eq!(result.direction, Direction::Improving);
    }

    #[test]
    fn test_percent_is_omitted_for_zero_start() {
        let result = compute(&series(Metric::Vulnerabilities, &[0.0, 5.0])).unwrap();
        assert_eq!(result.delta, 5.0);
        assert!(result.percent.is_none());
        assert_eq!(result.direction, Direction::Declining);
    }

    #[test]
    fn test_direction_flips_under_reversal() {
        let cases: [(&[f64], Metric); 4] = [
            (&[10.0, 2.0], Metric::CriticalIssues),
            (&[60.0, 82.5], Metric::Coverage),
            (&[2.0, 5.0], Metric::SecurityRating),
            (&[0.0, 1.0], Metric::QualityGate),
        ];
        for (values, metric) in cases {
            let forward = compute(&series(metric, values)).unwrap().direction;
            let reversed: Vec<f64> = values.iter().rev().copied().collect();
            let backward = compute(&series(metric, &reversed)).unwrap().direction;
            match forward {
                Direction::Improving => assert_eq!(backward, Direction::Declining),
                Direction::Declining => assert_eq!(backward, Direction::Improving),
                Direction::Stable => assert_eq!(backward, Direction::Stable),
            }
        }
        // Stable stays stable under reversal.
        let flat = compute(&series(Metric::Bugs, &[4.0, 6.0, 4.0])).unwrap();
        assert_eq!(flat.direction, Direction::Stable);
    }

    #[test]
    fn test_sub_unit_changes_are_stable() {
        let result = compute(&series(Metric::Coverage, &[80.0, 80.4])).unwrap();
        assert_eq!(result.direction, Direction::Stable);

        let result = compute(&series(Metric::Coverage, &[80.0, 81.0])).unwrap();
        assert_eq!(result.direction, Direction::Improving);
    }

    #[test]
    fn test_rising_coverage_improves() {
        let result = compute(&series(Metric::Coverage, &[60.0, 74.5])).unwrap();
        assert_eq!(result.direction, Direction::Improving);
        let percent = result.percent.unwrap();
        assert!((percent - 24.166_666).abs() < 0.001);
    }

    #[test]
    fn test_single_point_has_no_trend() {
        assert!(compute(&series(Metric::Bugs, &[3.0])).is_none());
        assert!(compute(&series(Metric::Bugs, &[])).is_none());
    }

    #[test]
    fn test_velocity_endpoint_rates() {
        let v = velocity(&series(Metric::CriticalIssues, &[10.0, 6.0, 3.0])).unwrap();
        assert_eq!(v.total_change, -7.0);
        assert_eq!(v.days_elapsed, 14);
        assert_eq!(v.per_day, -0.5);
        assert_eq!(v.per_week, -3.5);
    }

    #[test]
    fn test_velocity_same_day_has_zero_rates() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let same_day = TrendSeries {
            metric: Metric::Bugs,
            points: vec![
                TrendPoint {
                    at: start,
                    value: 4.0,
                },
                TrendPoint {
                    at: start + Duration::hours(6),
                    value: 9.0,
                },
            ],
        };
        let v = velocity(&same_day).unwrap();
        assert_eq!(v.total_change, 5.0);
        assert_eq!(v.days_elapsed, 0);
        assert_eq!(v.per_day, 0.0);
        assert_eq!(v.per_week, 0.0);
    }
}
