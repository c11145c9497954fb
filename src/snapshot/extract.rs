//! Metadata extraction from report documents.
//!
//! Every generated report embeds one machine-readable YAML block inside a
//! YAML code fence, headed by a `# REPORT_METADATA` marker line. The
//! extractor locates the block (strict pattern first, then a lenient
//! fallback for reports with noise between the fence and the marker),
//! parses the YAML and validates it into an immutable [`SnapshotRecord`].
//!
//! Extraction failures are per-document: one malformed report never aborts
//! a run. The caller counts the rejection and moves on.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::snapshot::record::{IssueCounts, ProjectIdentity, Rating, SnapshotRecord};

/// Marker line that heads the embedded metadata block.
pub const METADATA_MARKER: &str = "# REPORT_METADATA";

/// Why a single report document could not be turned into a snapshot.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The document contains no recognizable metadata block.
    #[error("no {METADATA_MARKER} block found")]
    MissingBlock,

    /// The block was located but its YAML does not parse or does not fit
    /// the schema (negative counts land here as type errors).
    #[error("invalid YAML in metadata block: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required field is absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A timestamp field holds a value no supported format can parse.
    #[error("{field} is not a recognized timestamp: {value}")]
    Timestamp { field: &'static str, value: String },

    /// The coverage field holds a non-numeric value.
    #[error("coverage value is not numeric: {value}")]
    Coverage { value: String },

    /// Coverage parsed but falls outside the percentage range.
    #[error("coverage {value} is outside the 0-100 range")]
    CoverageRange { value: f64 },

    /// A rating field holds something other than the letters A through E.
    #[error("{field} is not a rating letter: {value}")]
    Rating { field: &'static str, value: String },
}

/// Result type for metadata extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Wire shape of the embedded block. Unknown fields (including the
/// per-category severity breakdowns) are ignored.
#[derive(Debug, Deserialize)]
struct MetadataBlock {
    report_version: Option<String>,
    generated_date: Option<String>,
    analysis_date: Option<String>,
    project: Option<ProjectBlock>,
    quality_gate: Option<QualityGateBlock>,
    metrics: Option<MetricsBlock>,
}

#[derive(Debug, Deserialize)]
struct ProjectBlock {
    key: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    organization: String,
}

#[derive(Debug, Deserialize)]
struct QualityGateBlock {
    status: Option<String>,
    #[serde(default)]
    passed: bool,
}

#[derive(Debug, Deserialize)]
struct MetricsBlock {
    #[serde(default)]
    total_issues: u64,
    #[serde(default)]
    blocker_issues: u64,
    #[serde(default)]
    critical_issues: u64,
    #[serde(default)]
    major_issues: u64,
    #[serde(default)]
    minor_issues: u64,
    #[serde(default)]
    info_issues: u64,
    #[serde(default)]
    security_issues: u64,
    #[serde(default)]
    reliability_issues: u64,
    #[serde(default)]
    maintainability_issues: u64,
    #[serde(default)]
    vulnerabilities: u64,
    #[serde(default)]
    bugs: u64,
    #[serde(default)]
    code_smells: u64,
    #[serde(default)]
    security_hotspots: u64,
    code_coverage: Option<CoverageValue>,
    security_rating: Option<String>,
    reliability_rating: Option<String>,
    maintainability_rating: Option<String>,
}

/// Coverage appears either as a bare number or as a string like `"87.5%"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoverageValue {
    Number(f64),
    Text(String),
}

fn block_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?s)```yaml\s*\n# REPORT_METADATA\s*\n(.*?)```").expect("valid regex"),
            Regex::new(r"(?s)```yaml.*?# REPORT_METADATA.*?\n(.*?)```").expect("valid regex"),
        ]
    })
}

/// Find the YAML body of the metadata block, if the document carries one.
fn locate_block(text: &str) -> Option<&str> {
    if !text.contains(METADATA_MARKER) {
        return None;
    }
    for pattern in block_patterns() {
        if let Some(body) = pattern.captures(text).and_then(|c| c.get(1)) {
            return Some(body.as_str().trim());
        }
    }
    None
}

/// Extract and validate the metadata block of one report document.
///
/// `source` names the originating file and is carried on the record for
/// diagnostics; it plays no role in parsing.
pub fn extract(report_text: &str, source: &str) -> ExtractResult<SnapshotRecord> {
    let body = locate_block(report_text).ok_or(ExtractError::MissingBlock)?;
    debug!("located metadata block in {} ({} bytes)", source, body.len());

    let block: MetadataBlock = serde_yaml::from_str(body)?;

    let report_version = require_text(block.report_version, "report_version")?;

    let analysis_raw = block
        .analysis_date
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ExtractError::MissingField("analysis_date"))?;
    let analysis_at = parse_timestamp("analysis_date", analysis_raw)?;

    let generated_at = match block.generated_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(parse_timestamp("generated_date", value)?),
    };

    let project = block.project.ok_or(ExtractError::MissingField("project"))?;
    let key = require_text(project.key, "project.key")?;

    let gate = block
        .quality_gate
        .ok_or(ExtractError::MissingField("quality_gate"))?;
    let status = require_text(gate.status, "quality_gate.status")?;

    let metrics = block.metrics.ok_or(ExtractError::MissingField("metrics"))?;
    let coverage_percent = parse_coverage(metrics.code_coverage.as_ref())?;
    let security_rating = parse_rating(metrics.security_rating.as_deref(), "metrics.security_rating")?;
    let reliability_rating =
        parse_rating(metrics.reliability_rating.as_deref(), "metrics.reliability_rating")?;
    let maintainability_rating = parse_rating(
        metrics.maintainability_rating.as_deref(),
        "metrics.maintainability_rating",
    )?;

    Ok(SnapshotRecord {
        source: source.to_string(),
        report_version,
        analysis_at,
        generated_at,
        project: ProjectIdentity {
            key,
            name: project.name.trim().to_string(),
            organization: project.organization.trim().to_string(),
        },
        quality_gate_status: status,
        quality_gate_passed: gate.passed,
        counts: IssueCounts {
            total: metrics.total_issues,
            blocker: metrics.blocker_issues,
            critical: metrics.critical_issues,
            major: metrics.major_issues,
            minor: metrics.minor_issues,
            info: metrics.info_issues,
            security: metrics.security_issues,
            reliability: metrics.reliability_issues,
            maintainability: metrics.maintainability_issues,
            vulnerabilities: metrics.vulnerabilities,
            bugs: metrics.bugs,
            code_smells: metrics.code_smells,
            security_hotspots: metrics.security_hotspots,
        },
        coverage_percent,
        security_rating,
        reliability_rating,
        maintainability_rating,
    })
}

fn require_text(value: Option<String>, field: &'static str) -> ExtractResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ExtractError::MissingField(field))
}

/// Parse an RFC 3339 timestamp, falling back to a naive datetime or a bare
/// date (both assumed UTC), matching what report generators actually emit.
fn parse_timestamp(field: &'static str, value: &str) -> ExtractResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(ExtractError::Timestamp {
        field,
        value: value.to_string(),
    })
}

fn parse_coverage(value: Option<&CoverageValue>) -> ExtractResult<Option<f64>> {
    let percent = match value {
        None => return Ok(None),
        Some(CoverageValue::Number(n)) => *n,
        Some(CoverageValue::Text(text)) => {
            let cleaned = text.trim().trim_end_matches('%').trim();
            if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("n/a") {
                return Ok(None);
            }
            cleaned.parse::<f64>().map_err(|_| ExtractError::Coverage {
                value: text.trim().to_string(),
            })?
        }
    };
    if !(0.0..=100.0).contains(&percent) {
        return Err(ExtractError::CoverageRange { value: percent });
    }
    Ok(Some(percent))
}

fn parse_rating(value: Option<&str>, field: &'static str) -> ExtractResult<Rating> {
    let value = value.map(str::trim).unwrap_or("");
    if value.is_empty() {
        return Err(ExtractError::MissingField(field));
    }
    value.parse().map_err(|_| ExtractError::Rating {
        field,
        value: value.to_string(),
    })
}
