//! Longitudinal trend analysis for exported SAST reports.
//!
//! Feed it a directory of Markdown analysis reports carrying embedded
//! `# REPORT_METADATA` blocks and it renders a trend report, charts
//! included, as a self-contained HTML page or a Markdown document.
//! [`pipeline::run_trend`] is the entry point.

pub mod chart;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod series;
pub mod snapshot;
pub mod trend;

pub use config::TrendConfig;
pub use pipeline::{run_trend, ReportMedium, RunSummary, TrendError, TrendOptions};
