use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Five-level quality rating scale (A best, E worst).
///
/// The letter-to-ordinal mapping lives here and nowhere else so that numeric
/// series and letter display can never diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    E,
    D,
    C,
    B,
    A,
}

impl Rating {
    /// Numeric position used for charting: A=5 down to E=1.
    pub fn ordinal(&self) -> u8 {
        match self {
            Rating::A => 5,
            Rating::B => 4,
            Rating::C => 3,
            Rating::D => 2,
            Rating::E => 1,
        }
    }

    /// The display letter for this rating.
    pub fn letter(&self) -> &'static str {
        match self {
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
            Rating::E => "E",
        }
    }

    /// Reverse lookup from an ordinal value, for labeling charted points.
    pub fn from_ordinal(ordinal: u8) -> Option<Rating> {
        match ordinal {
            5 => Some(Rating::A),
            4 => Some(Rating::B),
            3 => Some(Rating::C),
            2 => Some(Rating::D),
            1 => Some(Rating::E),
            _ => None,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for Rating {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Rating::A),
            "B" | "b" => Ok(Rating::B),
            "C" | "c" => Ok(Rating::C),
            "D" | "d" => Ok(Rating::D),
            "E" | "e" => Ok(Rating::E),
            _ => Err(()),
        }
    }
}

/// Identity of the analyzed project as reported by the upstream generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIdentity {
    /// Opaque project key (e.g. `org_billing-api`).
    pub key: String,
    /// Human-readable project name.
    pub name: String,
    /// Owning organization.
    pub organization: String,
}

impl ProjectIdentity {
    /// Case-insensitive substring match against the key or the name.
    pub fn matches(&self, filter: &str) -> bool {
        let needle = filter.to_lowercase();
        self.key.to_lowercase().contains(&needle) || self.name.to_lowercase().contains(&needle)
    }

    /// Preferred display label: the name when present, the key otherwise.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.key
        } else {
            &self.name
        }
    }
}

/// Issue counts captured by one snapshot, split by severity, category and type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub total: u64,
    pub blocker: u64,
    pub critical: u64,
    pub major: u64,
    pub minor: u64,
    pub info: u64,
    pub security: u64,
    pub reliability: u64,
    pub maintainability: u64,
    pub vulnerabilities: u64,
    pub bugs: u64,
    pub code_smells: u64,
    pub security_hotspots: u64,
}

/// One validated metadata snapshot extracted from a single report document.
///
/// Records are created by the extractor and never mutated afterwards; every
/// downstream stage reads them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Originating file, kept for diagnostics only.
    pub source: String,
    /// Version of the report metadata schema that produced this snapshot.
    pub report_version: String,
    /// When the upstream analysis ran. Required; orders the snapshot on the
    /// time axis.
    pub analysis_at: DateTime<Utc>,
    /// When the report document was generated, if recorded.
    pub generated_at: Option<DateTime<Utc>>,
    /// Project the snapshot belongs to.
    pub project: ProjectIdentity,
    /// Raw quality-gate status string (e.g. `OK`, `ERROR`).
    pub quality_gate_status: String,
    /// Whether the quality gate passed.
    pub quality_gate_passed: bool,
    /// Issue counts by severity, category and type.
    pub counts: IssueCounts,
    /// Code coverage in percent (0-100), absent when the analysis did not
    /// measure coverage.
    pub coverage_percent: Option<f64>,
    pub security_rating: Rating,
    pub reliability_rating: Rating,
    pub maintainability_rating: Rating,
}

impl SnapshotRecord {
    /// Date label used on chart axes and in tables.
    pub fn analysis_date_label(&self) -> String {
        self.analysis_at.format("%Y-%m-%d").to_string()
    }
}
