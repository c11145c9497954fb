//! Report media.
//!
//! [`summary`] derives the shared content once; [`markdown`] and [`html`]
//! only format it, so both media always agree on every number.

pub mod html;
pub mod markdown;
pub mod summary;

pub use html::{extract_island, island_json, DATA_ISLAND_ID};
pub use markdown::{ChartAsset, MarkdownReport};
pub use summary::{MetricRow, ReportSummary, SummaryCard};
