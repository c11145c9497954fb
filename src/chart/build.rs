//! Fixed chart builders.
//!
//! The kind-to-series mapping is part of the product, not configuration:
//! every run produces the same chart set, minus the coverage chart when no
//! snapshot measured coverage. Point order always equals the series'
//! chronological order; nothing here re-sorts or interpolates.

use crate::chart::spec::{ChartKind, ChartSeries, ChartSpec, ThresholdLine};
use crate::series::{Aggregation, Metric};
use crate::snapshot::SnapshotRecord;

/// Bar color for a failing gate snapshot; passing bars use the gate
/// metric's catalog color.
const GATE_FAIL_COLOR: &str = "#d32f2f";
const THRESHOLD_COLOR: &str = "#9e9e9e";
const RADAR_EARLIEST_COLOR: &str = "#90a4ae";
const RADAR_LATEST_COLOR: &str = "#1e88e5";

/// Assemble the full chart set for one aggregation.
pub fn build_charts(agg: &Aggregation, coverage_target: f64) -> Vec<ChartSpec> {
    [
        severity_chart(agg),
        security_chart(agg),
        gate_chart(agg),
        coverage_chart(agg, coverage_target),
        ratings_chart(agg),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Multi-line chart of blocker, critical and major issue counts.
pub fn severity_chart(agg: &Aggregation) -> Option<ChartSpec> {
    multi_metric_chart(
        agg,
        "issue-severity",
        "Issue Severity Trends",
        "Issues",
        ChartKind::Line,
        &[
            Metric::BlockerIssues,
            Metric::CriticalIssues,
            Metric::MajorIssues,
        ],
    )
}

/// Stacked area chart of the security posture.
pub fn security_chart(agg: &Aggregation) -> Option<ChartSpec> {
    multi_metric_chart(
        agg,
        "security-posture",
        "Security Posture",
        "Findings",
        ChartKind::StackedArea,
        &[
            Metric::Vulnerabilities,
            Metric::SecurityHotspots,
            Metric::SecurityIssues,
        ],
    )
}

/// Categorical bar chart of gate states: uniform bar height, color keyed to
/// the pass state of each snapshot.
pub fn gate_chart(agg: &Aggregation) -> Option<ChartSpec> {
    let series = agg.series(Metric::QualityGate)?;
    let point_colors: Vec<String> = series
        .points
        .iter()
        .map(|p| {
            if p.value > 0.5 {
                Metric::QualityGate.color().to_string()
            } else {
                GATE_FAIL_COLOR.to_string()
            }
        })
        .collect();
    Some(ChartSpec {
        id: "quality-gate".to_string(),
        kind: ChartKind::Bar,
        title: "Quality Gate History".to_string(),
        labels: series.labels(),
        series: vec![ChartSeries {
            name: Metric::QualityGate.display_name().to_string(),
            color: Metric::QualityGate.color().to_string(),
            points: vec![1.0; series.len()],
            point_colors: Some(point_colors),
        }],
        threshold: None,
        y_axis: None,
    })
}

/// Coverage line with the configured target drawn as a threshold.
///
/// `None` when no snapshot measured coverage.
pub fn coverage_chart(agg: &Aggregation, target: f64) -> Option<ChartSpec> {
    let series = agg.series(Metric::Coverage)?;
    Some(ChartSpec {
        id: "coverage".to_string(),
        kind: ChartKind::Line,
        title: "Code Coverage".to_string(),
        labels: series.labels(),
        series: vec![ChartSeries {
            name: Metric::Coverage.display_name().to_string(),
            color: Metric::Coverage.color().to_string(),
            points: series.values(),
            point_colors: None,
        }],
        threshold: Some(ThresholdLine {
            label: format!("Target {target:.0}%"),
            value: target,
            color: THRESHOLD_COLOR.to_string(),
        }),
        y_axis: Some("Coverage (%)".to_string()),
    })
}

/// Radar overlay of the three ratings: earliest snapshot vs latest.
pub fn ratings_chart(agg: &Aggregation) -> Option<ChartSpec> {
    fn ordinals(record: &SnapshotRecord) -> Vec<f64> {
        vec![
            f64::from(record.security_rating.ordinal()),
            f64::from(record.reliability_rating.ordinal()),
            f64::from(record.maintainability_rating.ordinal()),
        ]
    }

    let earliest = agg.earliest();
    let latest = agg.latest();
    Some(ChartSpec {
        id: "ratings".to_string(),
        kind: ChartKind::Radar,
        title: "Quality Ratings".to_string(),
        labels: vec![
            "Security".to_string(),
            "Reliability".to_string(),
            "Maintainability".to_string(),
        ],
        series: vec![
            ChartSeries {
                name: earliest.analysis_date_label(),
                color: RADAR_EARLIEST_COLOR.to_string(),
                points: ordinals(earliest),
                point_colors: None,
            },
            ChartSeries {
                name: latest.analysis_date_label(),
                color: RADAR_LATEST_COLOR.to_string(),
                points: ordinals(latest),
                point_colors: None,
            },
        ],
        threshold: None,
        y_axis: None,
    })
}

fn multi_metric_chart(
    agg: &Aggregation,
    id: &str,
    title: &str,
    y_axis: &str,
    kind: ChartKind,
    metrics: &[Metric],
) -> Option<ChartSpec> {
    let first = metrics.first()?;
    let labels = agg.series(*first)?.labels();
    let series: Vec<ChartSeries> = metrics
        .iter()
        .filter_map(|&metric| {
            let series = agg.series(metric)?;
            Some(ChartSeries {
                name: metric.display_name().to_string(),
                color: metric.color().to_string(),
                points: series.values(),
                point_colors: None,
            })
        })
        .collect();
    if series.len() != metrics.len() {
        return None;
    }
    Some(ChartSpec {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        labels,
        series,
        threshold: None,
        y_axis: Some(y_axis.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::aggregate;
    use crate::snapshot::{IssueCounts, ProjectIdentity, Rating};
    use chrono::{TimeZone, Utc};

    fn record(day: u32, critical: u64, passed: bool, coverage: Option<f64>) -> SnapshotRecord {
        SnapshotRecord {
            source: format!("report-{day}.md"),
            report_version: "1.0".to_string(),
            analysis_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
            generated_at: None,
            project: ProjectIdentity {
                key: "acme_billing-api".to_string(),
                name: "Billing API".to_string(),
                organization: "acme".to_string(),
            },
            quality_gate_status: if passed { "OK" } else { "ERROR" }.to_string(),
            quality_gate_passed: passed,
            counts: IssueCounts {
                blocker: 1,
                critical,
                major: critical * 2,
                vulnerabilities: 3,
                security_hotspots: 5,
                security: 6,
                ..IssueCounts::default()
            },
            coverage_percent: coverage,
            security_rating: Rating::B,
            reliability_rating: Rating::C,
            maintainability_rating: Rating::A,
        }
    }

    fn sample_aggregation(with_coverage: bool) -> Aggregation {
        let coverage = |v: f64| if with_coverage { Some(v) } else { None };
        aggregate(
            vec![
                record(5, 10, true, coverage(62.0)),
                record(12, 6, false, coverage(68.5)),
                record(20, 2, true, coverage(74.0)),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_full_chart_set_in_fixed_order() {
        let charts = build_charts(&sample_aggregation(true), 80.0);
        let ids: Vec<&str> = charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "issue-severity",
                "security-posture",
                "quality-gate",
                "coverage",
                "ratings"
            ]
        );
        for chart in &charts {
            assert!(chart.is_aligned(), "chart {} misaligned", chart.id);
        }
    }

    #[test]
    fn test_coverage_chart_is_omitted_without_coverage_data() {
        let charts = build_charts(&sample_aggregation(false), 80.0);
        assert_eq!(charts.len(), 4);
        assert!(charts.iter().all(|c| c.id != "coverage"));
    }

    #[test]
    fn test_severity_chart_points_follow_chronology() {
        let chart = severity_chart(&sample_aggregation(true)).unwrap();
        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(
            chart.labels,
            vec!["2024-03-05", "2024-03-12", "2024-03-20"]
        );
        let critical = chart
            .series
            .iter()
            .find(|s| s.name == "Critical Issues")
            .unwrap();
        assert_eq!(critical.points, vec![10.0, 6.0, 2.0]);
        assert_eq!(critical.color, Metric::CriticalIssues.color());
    }

    #[test]
    fn test_security_chart_stacks_three_series() {
        let chart = security_chart(&sample_aggregation(true)).unwrap();
        assert_eq!(chart.kind, ChartKind::StackedArea);
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.series[0].name, "Vulnerabilities");
    }

    #[test]
    fn test_gate_chart_uses_uniform_bars_with_state_colors() {
        let chart = gate_chart(&sample_aggregation(true)).unwrap();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.series[0].points, vec![1.0, 1.0, 1.0]);
        let colors = chart.series[0].point_colors.as_ref().unwrap();
        assert_eq!(colors[0], Metric::QualityGate.color());
        assert_eq!(colors[1], GATE_FAIL_COLOR);
        assert_eq!(colors[2], Metric::QualityGate.color());
    }

    #[test]
    fn test_coverage_chart_carries_the_target_threshold() {
        let chart = coverage_chart(&sample_aggregation(true), 80.0).unwrap();
        let threshold = chart.threshold.as_ref().unwrap();
        assert_eq!(threshold.value, 80.0);
        assert_eq!(threshold.label, "Target 80%");
        assert_eq!(chart.series[0].points, vec![62.0, 68.5, 74.0]);
    }

    #[test]
    fn test_ratings_chart_overlays_first_and_latest_ordinals() {
        let chart = ratings_chart(&sample_aggregation(true)).unwrap();
        assert_eq!(chart.kind, ChartKind::Radar);
        assert_eq!(
            chart.labels,
            vec!["Security", "Reliability", "Maintainability"]
        );
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "2024-03-05");
        assert_eq!(chart.series[1].name, "2024-03-20");
        // B, C, A as ordinals.
        assert_eq!(chart.series[1].points, vec![4.0, 3.0, 5.0]);
    }
}
