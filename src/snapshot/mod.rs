//! Snapshot records and metadata extraction.

pub mod extract;
pub mod record;

pub use extract::{extract, ExtractError, ExtractResult, METADATA_MARKER};
pub use record::{IssueCounts, ProjectIdentity, Rating, SnapshotRecord};
