//! Chronological aggregation of snapshots into trend series.
//!
//! The aggregator consumes the full extraction result set in discovery
//! order, applies the optional project filter, collapses duplicate
//! snapshots, sorts chronologically and materializes one series per catalog
//! metric. Everything downstream (trend math, charts, reports) reads the
//! resulting [`Aggregation`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::series::metric::Metric;
use crate::snapshot::{ProjectIdentity, SnapshotRecord};

/// Trend analysis needs at least this many snapshots.
pub const MIN_SNAPSHOTS: usize = 2;

/// Why aggregation could not produce a usable series set.
#[derive(Error, Debug)]
pub enum AggregateError {
    /// Fewer than [`MIN_SNAPSHOTS`] snapshots survived filtering and
    /// deduplication.
    #[error("insufficient data for trend analysis: need at least {MIN_SNAPSHOTS} snapshots, found {found}")]
    InsufficientData { found: usize },
}

/// Result type for aggregation.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// One (timestamp, value) pair in a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Analysis timestamp of the contributing snapshot.
    pub at: DateTime<Utc>,
    pub value: f64,
}

/// One metric's chronologically ordered points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub metric: Metric,
    /// Ascending by timestamp; ties keep discovery order.
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TrendPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrendPoint> {
        self.points.last()
    }

    /// Date labels for the chart axis, one per point.
    pub fn labels(&self) -> Vec<String> {
        self.points
            .iter()
            .map(|p| p.at.format("%Y-%m-%d").to_string())
            .collect()
    }

    /// Raw values in point order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// The aggregated view of a report archive.
///
/// `records` always holds at least [`MIN_SNAPSHOTS`] entries, sorted
/// ascending by analysis timestamp. Series without a single point (coverage
/// when no snapshot measured it) are not materialized.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Identity taken from the chronologically first snapshot.
    pub project: ProjectIdentity,
    pub records: Vec<SnapshotRecord>,
    pub series: BTreeMap<Metric, TrendSeries>,
    /// Duplicate (timestamp, project key) snapshots that were replaced.
    pub duplicates: usize,
    /// Snapshots dropped by the project filter.
    pub filtered_out: usize,
}

impl Aggregation {
    pub fn earliest(&self) -> &SnapshotRecord {
        &self.records[0]
    }

    pub fn latest(&self) -> &SnapshotRecord {
        &self.records[self.records.len() - 1]
    }

    pub fn report_count(&self) -> usize {
        self.records.len()
    }

    /// Covered period as (first, last) analysis timestamp.
    pub fn period(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.earliest().analysis_at, self.latest().analysis_at)
    }

    /// Display label like `2024-01-05 to 2024-03-01`.
    pub fn period_label(&self) -> String {
        let (start, end) = self.period();
        format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
    }

    pub fn series(&self, metric: Metric) -> Option<&TrendSeries> {
        self.series.get(&metric)
    }
}

/// Aggregate extracted snapshots into per-metric series.
///
/// `project_filter` is a case-insensitive substring matched against the
/// project key and name. Duplicates on (analysis timestamp, project key)
/// keep the later-discovered snapshot. Input order is the discovery order
/// and decides ties between equal timestamps of different projects.
pub fn aggregate(
    records: Vec<SnapshotRecord>,
    project_filter: Option<&str>,
) -> AggregateResult<Aggregation> {
    let before = records.len();
    let filtered: Vec<SnapshotRecord> = match project_filter {
        Some(filter) => records
            .into_iter()
            .filter(|r| r.project.matches(filter))
            .collect(),
        None => records,
    };
    let filtered_out = before - filtered.len();

    let mut kept: Vec<SnapshotRecord> = Vec::with_capacity(filtered.len());
    let mut slots: HashMap<(DateTime<Utc>, String), usize> = HashMap::new();
    let mut duplicates = 0;
    for record in filtered {
        let slot = (record.analysis_at, record.project.key.clone());
        match slots.get(&slot) {
            Some(&i) => {
                duplicates += 1;
                warn!(
                    "duplicate snapshot for {} at {}: {} replaces {}",
                    record.project.key, record.analysis_at, record.source, kept[i].source
                );
                kept[i] = record;
            }
            None => {
                slots.insert(slot, kept.len());
                kept.push(record);
            }
        }
    }

    if kept.len() < MIN_SNAPSHOTS {
        return Err(AggregateError::InsufficientData { found: kept.len() });
    }

    // Stable sort: equal timestamps keep their discovery order.
    kept.sort_by_key(|r| r.analysis_at);

    let project = kept[0].project.clone();
    for record in &kept[1..] {
        if record.project.key != project.key {
            warn!(
                "snapshot {} belongs to a different project ({} vs {})",
                record.source, record.project.key, project.key
            );
        }
    }

    let mut series = BTreeMap::new();
    for metric in Metric::ALL {
        let points: Vec<TrendPoint> = kept
            .iter()
            .filter_map(|r| {
                metric.value_of(r).map(|value| TrendPoint {
                    at: r.analysis_at,
                    value,
                })
            })
            .collect();
        if !points.is_empty() {
            series.insert(metric, TrendSeries { metric, points });
        }
    }

    Ok(Aggregation {
        project,
        records: kept,
        series,
        duplicates,
        filtered_out,
    })
}
