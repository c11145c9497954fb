//! The metric catalog.
//!
//! Every series the analyzer tracks is a variant of [`Metric`]. The catalog
//! centralizes all per-metric facts (stable identifier, display name, value
//! kind, polarity, chart color, severity weight) so aggregation, trend math
//! and rendering can never disagree about them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::SnapshotRecord;

/// What kind of value a series carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Non-negative issue count.
    Count,
    /// Percentage in 0-100.
    Percent,
    /// Rating ordinal on the 1-5 scale (A=5).
    Rating,
    /// Quality-gate state encoded as 1 (passed) or 0 (failed).
    Gate,
}

/// Whether rising values of a metric make quality better or worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Coverage, ratings, gate state.
    HigherIsBetter,
    /// Issue counts of every flavor.
    LowerIsBetter,
}

/// One tracked metric series.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalIssues,
    BlockerIssues,
    CriticalIssues,
    MajorIssues,
    MinorIssues,
    InfoIssues,
    SecurityIssues,
    ReliabilityIssues,
    MaintainabilityIssues,
    Vulnerabilities,
    Bugs,
    CodeSmells,
    SecurityHotspots,
    Coverage,
    SecurityRating,
    ReliabilityRating,
    MaintainabilityRating,
    QualityGate,
}

impl Metric {
    /// Every metric, in catalog order.
    pub const ALL: [Metric; 18] = [
        Metric::TotalIssues,
        Metric::BlockerIssues,
        Metric::CriticalIssues,
        Metric::MajorIssues,
        Metric::MinorIssues,
        Metric::InfoIssues,
        Metric::SecurityIssues,
        Metric::ReliabilityIssues,
        Metric::MaintainabilityIssues,
        Metric::Vulnerabilities,
        Metric::Bugs,
        Metric::CodeSmells,
        Metric::SecurityHotspots,
        Metric::Coverage,
        Metric::SecurityRating,
        Metric::ReliabilityRating,
        Metric::MaintainabilityRating,
        Metric::QualityGate,
    ];

    /// The metrics that decide the overall verdict: the safety-critical
    /// subset, not the full catalog.
    pub const VERDICT_SET: [Metric; 4] = [
        Metric::CriticalIssues,
        Metric::SecurityRating,
        Metric::Vulnerabilities,
        Metric::QualityGate,
    ];

    /// Stable snake_case identifier. Matches the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::TotalIssues => "total_issues",
            Metric::BlockerIssues => "blocker_issues",
            Metric::CriticalIssues => "critical_issues",
            Metric::MajorIssues => "major_issues",
            Metric::MinorIssues => "minor_issues",
            Metric::InfoIssues => "info_issues",
            Metric::SecurityIssues => "security_issues",
            Metric::ReliabilityIssues => "reliability_issues",
            Metric::MaintainabilityIssues => "maintainability_issues",
            Metric::Vulnerabilities => "vulnerabilities",
            Metric::Bugs => "bugs",
            Metric::CodeSmells => "code_smells",
            Metric::SecurityHotspots => "security_hotspots",
            Metric::Coverage => "coverage",
            Metric::SecurityRating => "security_rating",
            Metric::ReliabilityRating => "reliability_rating",
            Metric::MaintainabilityRating => "maintainability_rating",
            Metric::QualityGate => "quality_gate",
        }
    }

    /// Human-readable name used in tables and chart legends.
    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::TotalIssues => "Total Issues",
            Metric::BlockerIssues => "Blocker Issues",
            Metric::CriticalIssues => "Critical Issues",
            Metric::MajorIssues => "Major Issues",
            Metric::MinorIssues => "Minor Issues",
            Metric::InfoIssues => "Info Issues",
            Metric::SecurityIssues => "Security Issues",
            Metric::ReliabilityIssues => "Reliability Issues",
            Metric::MaintainabilityIssues => "Maintainability Issues",
            Metric::Vulnerabilities => "Vulnerabilities",
            Metric::Bugs => "Bugs",
            Metric::CodeSmells => "Code Smells",
            Metric::SecurityHotspots => "Security Hotspots",
            Metric::Coverage => "Code Coverage",
            Metric::SecurityRating => "Security Rating",
            Metric::ReliabilityRating => "Reliability Rating",
            Metric::MaintainabilityRating => "Maintainability Rating",
            Metric::QualityGate => "Quality Gate",
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Coverage => MetricKind::Percent,
            Metric::SecurityRating | Metric::ReliabilityRating | Metric::MaintainabilityRating => {
                MetricKind::Rating
            }
            Metric::QualityGate => MetricKind::Gate,
            _ => MetricKind::Count,
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self.kind() {
            MetricKind::Count => Polarity::LowerIsBetter,
            MetricKind::Percent | MetricKind::Rating | MetricKind::Gate => Polarity::HigherIsBetter,
        }
    }

    /// Fixed chart color for the series.
    pub fn color(&self) -> &'static str {
        match self {
            Metric::TotalIssues => "#5e35b1",
            Metric::BlockerIssues => "#d32f2f",
            Metric::CriticalIssues => "#f57c00",
            Metric::MajorIssues => "#fbc02d",
            Metric::MinorIssues => "#7cb342",
            Metric::InfoIssues => "#90a4ae",
            Metric::SecurityIssues => "#c62828",
            Metric::ReliabilityIssues => "#e64a19",
            Metric::MaintainabilityIssues => "#6d4c41",
            Metric::Vulnerabilities => "#d32f2f",
            Metric::Bugs => "#ef5350",
            Metric::CodeSmells => "#8d6e63",
            Metric::SecurityHotspots => "#f57c00",
            Metric::Coverage => "#0288d1",
            Metric::SecurityRating => "#c62828",
            Metric::ReliabilityRating => "#e64a19",
            Metric::MaintainabilityRating => "#6d4c41",
            Metric::QualityGate => "#4caf50",
        }
    }

    /// Severity weight: how much this metric matters when weighing the
    /// overall verdict and ordering recommendations. 5 is most severe.
    pub fn severity_weight(&self) -> u8 {
        match self {
            Metric::BlockerIssues => 5,
            Metric::CriticalIssues | Metric::Vulnerabilities | Metric::SecurityRating => 4,
            Metric::MajorIssues
            | Metric::SecurityIssues
            | Metric::SecurityHotspots
            | Metric::Bugs
            | Metric::ReliabilityRating
            | Metric::QualityGate => 3,
            Metric::TotalIssues
            | Metric::ReliabilityIssues
            | Metric::Coverage
            | Metric::MaintainabilityRating => 2,
            Metric::MinorIssues
            | Metric::InfoIssues
            | Metric::MaintainabilityIssues
            | Metric::CodeSmells => 1,
        }
    }

    /// Read this metric's value out of one snapshot.
    ///
    /// Returns `None` only for metrics the record does not define (coverage
    /// on records without coverage data); everything else always has a value.
    pub fn value_of(&self, record: &SnapshotRecord) -> Option<f64> {
        let value = match self {
            Metric::TotalIssues => record.counts.total as f64,
            Metric::BlockerIssues => record.counts.blocker as f64,
            Metric::CriticalIssues => record.counts.critical as f64,
            Metric::MajorIssues => record.counts.major as f64,
            Metric::MinorIssues => record.counts.minor as f64,
            Metric::InfoIssues => record.counts.info as f64,
            Metric::SecurityIssues => record.counts.security as f64,
            Metric::ReliabilityIssues => record.counts.reliability as f64,
            Metric::MaintainabilityIssues => record.counts.maintainability as f64,
            Metric::Vulnerabilities => record.counts.vulnerabilities as f64,
            Metric::Bugs => record.counts.bugs as f64,
            Metric::CodeSmells => record.counts.code_smells as f64,
            Metric::SecurityHotspots => record.counts.security_hotspots as f64,
            Metric::Coverage => return record.coverage_percent,
            Metric::SecurityRating => f64::from(record.security_rating.ordinal()),
            Metric::ReliabilityRating => f64::from(record.reliability_rating.ordinal()),
            Metric::MaintainabilityRating => f64::from(record.maintainability_rating.ordinal()),
            Metric::QualityGate => {
                if record.quality_gate_passed {
                    1.0
                } else {
                    0.0
                }
            }
        };
        Some(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
