//! Deterministic recommendations.
//!
//! Recommendations follow mechanically from the per-metric directions and
//! the latest gate state. Same trends in, same list out; there is no
//! heuristic ranking beyond the fixed severity weights.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::series::{Metric, MetricKind};
use crate::snapshot::Rating;
use crate::trend::compute::{Direction, TrendResult};

const GATE_FAILING_TEXT: &str =
    "Quality gate is failing in the latest analysis; resolve the blocking conditions before the next release.";

/// Recommendation priority, derived from the metric's severity weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    fn from_weight(weight: u8) -> Priority {
        match weight {
            0 | 1 => Priority::Low,
            2 | 3 => Priority::Medium,
            _ => Priority::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

/// One actionable item in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub metric: Metric,
    pub text: String,
}

/// Derive recommendations from trend results and the latest gate state.
///
/// Every declining series yields one entry; a failing latest gate yields a
/// high-priority entry regardless of the gate's own trend. Stable and
/// improving series yield none. Entries are ordered by severity weight
/// descending, then metric name ascending.
pub fn recommend(
    results: &BTreeMap<Metric, TrendResult>,
    latest_gate_passed: bool,
) -> Vec<Recommendation> {
    let mut recs: Vec<Recommendation> = results
        .values()
        .filter(|r| r.metric != Metric::QualityGate && r.direction == Direction::Declining)
        .map(|r| Recommendation {
            priority: Priority::from_weight(r.metric.severity_weight()),
            metric: r.metric,
            text: text_for(r),
        })
        .collect();

    // The gate is judged on its latest state, not its trend: a gate that
    // has always been failing is still a finding.
    if !latest_gate_passed {
        recs.push(Recommendation {
            priority: Priority::High,
            metric: Metric::QualityGate,
            text: GATE_FAILING_TEXT.to_string(),
        });
    }

    recs.sort_by(|a, b| {
        b.metric
            .severity_weight()
            .cmp(&a.metric.severity_weight())
            .then_with(|| a.metric.name().cmp(b.metric.name()))
    });
    recs
}

fn text_for(result: &TrendResult) -> String {
    let name = result.metric.display_name();
    match result.metric.kind() {
        MetricKind::Count => format!(
            "{} rose from {:.0} to {:.0}; schedule remediation for the new findings.",
            name, result.first, result.last
        ),
        MetricKind::Percent => format!(
            "{} fell from {:.1}% to {:.1}%; add tests to recover the lost coverage.",
            name, result.first, result.last
        ),
        MetricKind::Rating => format!(
            "{} dropped from {} to {}; review the findings behind the downgrade.",
            name,
            rating_letter(result.first),
            rating_letter(result.last)
        ),
        MetricKind::Gate => GATE_FAILING_TEXT.to_string(),
    }
}

fn rating_letter(value: f64) -> String {
    Rating::from_ordinal(value.round() as u8)
        .map(|r| r.letter().to_string())
        .unwrap_or_else(|| format!("{value:.0}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declining(metric: Metric, first: f64, last: f64) -> (Metric, TrendResult) {
        (
            metric,
            TrendResult {
                metric,
                first,
                last,
                delta: last - first,
                percent: Some((last - first) / first * 100.0),
                direction: Direction::Declining,
            },
        )
    }

    fn steady(metric: Metric) -> (Metric, TrendResult) {
        (
            metric,
            TrendResult {
                metric,
                first: 5.0,
                last: 5.0,
                delta: 0.0,
                percent: Some(0.0),
                direction: Direction::Stable,
            },
        )
    }

    #[test]
    fn test_declining_critical_issues_rank_high() {
        let results = BTreeMap::from([
            declining(Metric::CriticalIssues, 2.0, 10.0),
            steady(Metric::Bugs),
        ]);
        let recs = recommend(&results, true);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].metric, Metric::CriticalIssues);
        assert!(recs[0].text.contains("rose from 2 to 10"));
    }

    #[test]
    fn test_priority_follows_severity_weight() {
        let results = BTreeMap::from([
            declining(Metric::CodeSmells, 20.0, 45.0),
            declining(Metric::Coverage, 80.0, 70.5),
            declining(Metric::MajorIssues, 5.0, 9.0),
        ]);
        let recs = recommend(&results, true);

        let by_metric = |m: Metric| recs.iter().find(|r| r.metric == m).unwrap();
        assert_eq!(by_metric(Metric::CodeSmells).priority, Priority::Low);
        assert_eq!(by_metric(Metric::Coverage).priority, Priority::Medium);
        assert_eq!(by_metric(Metric::MajorIssues).priority, Priority::Medium);
        assert!(by_metric(Metric::Coverage).text.contains("80.0%"));
    }

    #[test]
    fn test_rating_downgrade_names_letters() {
        let results = BTreeMap::from([declining(Metric::SecurityRating, 5.0, 3.0)]);
        let recs = recommend(&results, true);
        assert!(recs[0].text.contains("from A to C"));
    }

    #[test]
    fn test_failing_gate_always_yields_high_entry() {
        // Gate stable (always failing) still produces the entry.
        let recs = recommend(&BTreeMap::from([steady(Metric::QualityGate)]), false);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].metric, Metric::QualityGate);

        // And only one gate entry even when the gate trend is declining.
        let recs = recommend(
            &BTreeMap::from([declining(Metric::QualityGate, 1.0, 0.0)]),
            false,
        );
        assert_eq!(recs.iter().filter(|r| r.metric == Metric::QualityGate).count(), 1);
    }

    #[test]
    fn test_improving_and_stable_series_yield_nothing() {
        let mut results = BTreeMap::from([steady(Metric::Bugs), steady(Metric::Coverage)]);
        let (metric, mut improving) = declining(Metric::CriticalIssues, 10.0, 2.0);
        improving.direction = Direction::Improving;
        results.insert(metric, improving);

        assert!(recommend(&results, true).is_empty());
    }

    #[test]
    fn test_ordering_is_weight_descending_then_name() {
        let results = BTreeMap::from([
            declining(Metric::Vulnerabilities, 1.0, 4.0),
            declining(Metric::CriticalIssues, 2.0, 6.0),
            declining(Metric::SecurityRating, 5.0, 3.0),
            declining(Metric::BlockerIssues, 1.0, 3.0),
            declining(Metric::CodeSmells, 10.0, 30.0),
        ]);
        let recs = recommend(&results, true);
        let order: Vec<Metric> = recs.iter().map(|r| r.metric).collect();
        assert_eq!(
            order,
            vec![
                Metric::BlockerIssues,
                Metric::CriticalIssues,
                Metric::SecurityRating,
                Metric::Vulnerabilities,
                Metric::CodeSmells,
            ]
        );
    }
}
