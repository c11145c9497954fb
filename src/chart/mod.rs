//! Chart building and materialization.

pub mod build;
pub mod spec;
pub mod svg;

pub use build::{
    build_charts, coverage_chart, gate_chart, ratings_chart, security_chart, severity_chart,
};
pub use spec::{ChartKind, ChartSeries, ChartSpec, ThresholdLine};
pub use svg::SvgRenderer;
