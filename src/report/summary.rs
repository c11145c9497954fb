//! Shared report content derived once from an aggregation.
//!
//! Both output media print the same numbers. Deriving them here, before
//! any formatting happens, keeps the Markdown and HTML renditions from
//! drifting apart.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::series::{Aggregation, Metric, MetricKind};
use crate::snapshot::{ProjectIdentity, Rating, SnapshotRecord};
use crate::trend::{
    compute, gate_history, overall_verdict, recommend, velocity, Direction, GateHistory,
    Recommendation, TrendResult, Velocity,
};

/// Metrics whose remediation velocity the reports print.
const VELOCITY_METRICS: [Metric; 3] = [
    Metric::TotalIssues,
    Metric::CriticalIssues,
    Metric::Vulnerabilities,
];

/// Metrics shown as executive-summary cards, in display order.
const CARD_METRICS: [Metric; 4] = [
    Metric::BlockerIssues,
    Metric::CriticalIssues,
    Metric::SecurityIssues,
    Metric::Coverage,
];

/// One executive-summary card: a headline value plus its change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: String,
    pub change: String,
    pub direction: Direction,
}

/// One row of the detailed metric table, already formatted per metric kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: Metric,
    pub name: &'static str,
    pub first: String,
    pub last: String,
    pub delta: String,
    pub percent: String,
    pub direction: Direction,
}

/// Everything the report media need, computed from one [`Aggregation`].
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub project: ProjectIdentity,
    pub period_label: String,
    pub report_count: usize,
    pub generated_at: DateTime<Utc>,
    pub verdict: Direction,
    pub results: BTreeMap<Metric, TrendResult>,
    pub gate: GateHistory,
    pub velocities: BTreeMap<Metric, Velocity>,
    pub recommendations: Vec<Recommendation>,
    pub cards: Vec<SummaryCard>,
    pub rows: Vec<MetricRow>,
}

impl ReportSummary {
    /// Derives all report content from an aggregation.
    pub fn derive(agg: &Aggregation, generated_at: DateTime<Utc>) -> ReportSummary {
        let mut results = BTreeMap::new();
        for (metric, series) in &agg.series {
            if let Some(result) = compute(series) {
                results.insert(*metric, result);
            }
        }

        let gate = agg
            .series(Metric::QualityGate)
            .and_then(gate_history)
            .unwrap_or(GateHistory {
                passed: 0,
                total: 0,
                pass_rate: 0.0,
                streak_passing: false,
                streak_length: 0,
            });

        let mut velocities = BTreeMap::new();
        for metric in VELOCITY_METRICS {
            if let Some(v) = agg.series(metric).and_then(velocity) {
                velocities.insert(metric, v);
            }
        }

        let latest = agg.latest();
        let verdict = overall_verdict(&results);
        let recommendations = recommend(&results, latest.quality_gate_passed);
        let cards = build_cards(&results, latest);
        let rows = results.values().map(row_of).collect();

        ReportSummary {
            project: agg.project.clone(),
            period_label: agg.period_label(),
            report_count: agg.report_count(),
            generated_at,
            verdict,
            results,
            gate,
            velocities,
            recommendations,
            cards,
            rows,
        }
    }

    /// One-line gate summary like `75% pass rate (3/4), 1 passing in a row`.
    pub fn gate_line(&self) -> String {
        let streak_word = if self.gate.streak_passing {
            "passing"
        } else {
            "failing"
        };
        format!(
            "{:.0}% pass rate ({}/{}), {} {} in a row",
            self.gate.pass_rate,
            self.gate.passed,
            self.gate.total,
            self.gate.streak_length,
            streak_word,
        )
    }
}

fn build_cards(
    results: &BTreeMap<Metric, TrendResult>,
    latest: &SnapshotRecord,
) -> Vec<SummaryCard> {
    CARD_METRICS
        .into_iter()
        .map(|metric| {
            let result = results.get(&metric);
            let value = match metric.value_of(latest) {
                Some(v) if metric.kind() == MetricKind::Percent => format!("{v:.1}%"),
                Some(v) => format!("{v:.0}"),
                None => "N/A".to_string(),
            };
            let change = result
                .and_then(|r| r.percent)
                .map(|p| format!("{p:+.0}%"))
                .unwrap_or_else(|| "N/A".to_string());
            SummaryCard {
                title: metric.display_name(),
                value,
                change,
                direction: result.map(|r| r.direction).unwrap_or(Direction::Stable),
            }
        })
        .collect()
}

fn row_of(result: &TrendResult) -> MetricRow {
    let metric = result.metric;
    let (first, last) = match metric.kind() {
        MetricKind::Count => (format!("{:.0}", result.first), format!("{:.0}", result.last)),
        MetricKind::Percent => (
            format!("{:.1}%", result.first),
            format!("{:.1}%", result.last),
        ),
        MetricKind::Rating => (rating_cell(result.first), rating_cell(result.last)),
        MetricKind::Gate => (gate_cell(result.first), gate_cell(result.last)),
    };
    let delta = match metric.kind() {
        MetricKind::Percent => format!("{:+.1}", result.delta),
        _ => format!("{:+.0}", result.delta),
    };
    let percent = result
        .percent
        .map(|p| format!("{p:+.1}%"))
        .unwrap_or_else(|| "N/A".to_string());
    MetricRow {
        metric,
        name: metric.display_name(),
        first,
        last,
        delta,
        percent,
        direction: result.direction,
    }
}

fn rating_cell(value: f64) -> String {
    Rating::from_ordinal(value.round() as u8)
        .map(|r| r.letter().to_string())
        .unwrap_or_else(|| format!("{value:.0}"))
}

fn gate_cell(value: f64) -> String {
    if value > 0.5 { "Passed" } else { "Failed" }.to_string()
}
