//! Metric catalog and series aggregation.

pub mod aggregate;
pub mod metric;

pub use aggregate::{
    aggregate, AggregateError, AggregateResult, Aggregation, TrendPoint, TrendSeries,
    MIN_SNAPSHOTS,
};
pub use metric::{Metric, MetricKind, Polarity};
