//! End-to-end trend pipeline.
//!
//! Discovers exported analysis reports, extracts one snapshot per file,
//! aggregates them into series, and writes the rendered report. Per-file
//! failures are logged and skipped; the run only fails when fewer than
//! two snapshots survive or the output location cannot be written.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chart::{build_charts, SvgRenderer};
use crate::config::TrendConfig;
use crate::report::{html, markdown, ReportSummary};
use crate::series::{aggregate, AggregateError};
use crate::snapshot::{extract, SnapshotRecord};
use crate::trend::Direction;

/// Output medium for the rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMedium {
    /// Single self-contained page with an embedded data island.
    #[default]
    Html,
    /// Markdown document plus a sibling directory of SVG charts.
    Markdown,
}

impl ReportMedium {
    /// File extension for documents in this medium.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportMedium::Html => "html",
            ReportMedium::Markdown => "md",
        }
    }
}

/// Errors that end a pipeline run.
#[derive(Error, Debug)]
pub enum TrendError {
    /// No report file yielded a usable metadata block.
    #[error("no usable reports in {dir} ({matched} matched, {rejected} rejected)")]
    NoReports {
        dir: PathBuf,
        matched: usize,
        rejected: usize,
    },

    /// Fewer than two snapshots survived extraction and filtering.
    #[error(transparent)]
    InsufficientData(#[from] AggregateError),

    /// The requested output location cannot be written.
    #[error("output directory {0} does not exist")]
    OutputPath(PathBuf),

    /// The configured report glob is not a valid pattern.
    #[error("invalid report glob: {0}")]
    Pattern(#[from] glob::PatternError),

    /// IO error during discovery or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error while embedding report data.
    #[error("render error: {0}")]
    Render(#[from] serde_json::Error),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, TrendError>;

/// Inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct TrendOptions {
    /// Directory scanned for exported analysis reports.
    pub reports_dir: PathBuf,
    /// Case-insensitive substring matched against project key or name.
    pub project_filter: Option<String>,
    /// Explicit output path; defaults to `trend-report-<date>.<ext>`
    /// inside the reports directory.
    pub output: Option<PathBuf>,
    /// Output medium.
    pub medium: ReportMedium,
}

impl TrendOptions {
    /// Create options for the given reports directory with defaults.
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            project_filter: None,
            output: None,
            medium: ReportMedium::default(),
        }
    }

    /// Set the project filter.
    pub fn with_project_filter(mut self, filter: impl Into<String>) -> Self {
        self.project_filter = Some(filter.into());
        self
    }

    /// Set an explicit output path.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Set the output medium.
    pub fn with_medium(mut self, medium: ReportMedium) -> Self {
        self.medium = medium;
        self
    }
}

/// What a successful run produced, for the caller's banner.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: PathBuf,
    /// Chart directory, present for the Markdown medium only.
    pub chart_dir: Option<PathBuf>,
    pub project_name: String,
    pub period_label: String,
    /// Snapshots that made it into the analysis.
    pub report_count: usize,
    /// Matched files rejected during extraction.
    pub rejected: usize,
    /// Records dropped as duplicate (timestamp, project) pairs.
    pub duplicates: usize,
    pub verdict: Direction,
    pub gate_pass_rate: f64,
}

/// Runs the whole pipeline: discover, extract, aggregate, render, write.
pub fn run_trend(options: &TrendOptions, config: &TrendConfig) -> PipelineResult<RunSummary> {
    let generated_at = Utc::now();
    let output_path = resolve_output_path(options, generated_at)?;

    let (records, matched, rejected) = collect_records(&options.reports_dir, &config.report_glob)?;
    if records.is_empty() {
        return Err(TrendError::NoReports {
            dir: options.reports_dir.clone(),
            matched,
            rejected,
        });
    }

    let agg = aggregate(records, options.project_filter.as_deref())?;
    info!(
        "aggregated {} snapshots for {} over {}",
        agg.report_count(),
        agg.project.display_name(),
        agg.period_label()
    );

    let summary = ReportSummary::derive(&agg, generated_at);
    let charts = build_charts(&agg, config.coverage_target);

    let chart_dir = match options.medium {
        ReportMedium::Html => {
            let page = html::render(&summary, &charts, config.chart_width, config.chart_height)?;
            write_atomic(&output_path, page.as_bytes())?;
            None
        }
        ReportMedium::Markdown => {
            let renderer = SvgRenderer::new(config.chart_width, config.chart_height);
            let dir_name = chart_dir_name(&output_path);
            let report = markdown::render(&summary, &charts, &renderer, &dir_name);

            let dir = parent_dir(&output_path).join(&dir_name);
            fs::create_dir_all(&dir)?;
            for asset in &report.charts {
                write_atomic(&dir.join(&asset.file_name), asset.svg.as_bytes())?;
            }
            write_atomic(&output_path, report.document.as_bytes())?;
            Some(dir)
        }
    };

    info!("trend report written to {}", output_path.display());

    Ok(RunSummary {
        output_path,
        chart_dir,
        project_name: summary.project.display_name().to_string(),
        period_label: summary.period_label.clone(),
        report_count: summary.report_count,
        rejected,
        duplicates: agg.duplicates,
        verdict: summary.verdict,
        gate_pass_rate: summary.gate.pass_rate,
    })
}

/// Resolve the output path, validating an explicit parent before any
/// extraction or rendering work happens.
fn resolve_output_path(
    options: &TrendOptions,
    generated_at: chrono::DateTime<Utc>,
) -> PipelineResult<PathBuf> {
    match &options.output {
        Some(path) => {
            let parent = parent_dir(path);
            if !parent.is_dir() {
                return Err(TrendError::OutputPath(parent));
            }
            Ok(path.clone())
        }
        None => Ok(options.reports_dir.join(format!(
            "trend-report-{}.{}",
            generated_at.format("%Y-%m-%d"),
            options.medium.extension()
        ))),
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Directory name the Markdown medium stores charts under, derived from
/// the document file stem.
fn chart_dir_name(output_path: &Path) -> String {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trend-report".to_string());
    format!("{stem}_charts")
}

/// Scan the reports directory and extract one snapshot per readable file.
///
/// Returns the surviving records plus (matched, rejected) counts. Files
/// that fail to read or carry no usable metadata block are logged and
/// counted, never fatal here.
fn collect_records(
    dir: &Path,
    pattern: &str,
) -> PipelineResult<(Vec<SnapshotRecord>, usize, usize)> {
    let full_pattern = dir.join(pattern);
    let mut paths: Vec<PathBuf> = glob::glob(&full_pattern.to_string_lossy())?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("skipping unreadable path: {err}");
                None
            }
        })
        .collect();
    // Sorted discovery order is what duplicate resolution ties break on.
    paths.sort();

    let matched = paths.len();
    let mut records = Vec::new();
    let mut rejected = 0usize;

    for path in &paths {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                rejected += 1;
                continue;
            }
        };
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match extract(&text, &source) {
            Ok(record) => {
                debug!("extracted snapshot from {}", path.display());
                records.push(record);
            }
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                rejected += 1;
            }
        }
    }

    Ok((records, matched, rejected))
}

/// Write through a temp file in the same directory, then rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let temp_path = path.with_file_name(format!("{file_name}.tmp"));

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_report(date: &str, key: &str, name: &str, critical: u64, passed: bool) -> String {
        format!(
            r#"# Analysis Report

```yaml
# REPORT_METADATA
report_version: "1.0"
analysis_date: "{date}"
project:
  key: "{key}"
  name: "{name}"
  organization: "acme"
quality_gate:
  status: "{status}"
  passed: {passed}
metrics:
  total_issues: {total}
  blocker_issues: 1
  critical_issues: {critical}
  major_issues: 4
  minor_issues: 2
  info_issues: 0
  security_issues: 3
  reliability_issues: 2
  maintainability_issues: 5
  vulnerabilities: {critical}
  bugs: 2
  code_smells: 5
  security_hotspots: 1
  code_coverage: "78.5%"
  security_rating: "C"
  reliability_rating: "B"
  maintainability_rating: "A"
```

Full findings below.
"#,
            status = if passed { "OK" } else { "ERROR" },
            total = critical * 3,
        )
    }

    fn write_reports(dir: &Path) {
        let reports = [
            ("scan-01.md", "2025-03-01T10:00:00Z", 10, false),
            ("scan-02.md", "2025-03-08T10:00:00Z", 6, true),
            ("scan-03.md", "2025-03-15T10:00:00Z", 2, true),
        ];
        for (file, date, critical, passed) in reports {
            fs::write(
                dir.join(file),
                sample_report(date, "acme:api", "Acme API", critical, passed),
            )
            .unwrap();
        }
    }

    #[test]
    fn html_run_writes_single_document() {
        let dir = TempDir::new().unwrap();
        write_reports(dir.path());
        let options = TrendOptions::new(dir.path());
        let config = TrendConfig::default();

        let run = run_trend(&options, &config).unwrap();

        assert!(run.output_path.exists());
        assert!(run.chart_dir.is_none());
        assert_eq!(run.report_count, 3);
        assert_eq!(run.rejected, 0);
        assert_eq!(run.verdict, Direction::Improving);
        assert_eq!(run.project_name, "Acme API");

        let page = fs::read_to_string(&run.output_path).unwrap();
        assert!(page.contains("id=\"trend-data\""));
        assert!(!dir.path().join(format!(
            "{}.tmp",
            run.output_path.file_name().unwrap().to_string_lossy()
        ))
        .exists());
    }

    #[test]
    fn markdown_run_writes_document_and_chart_directory() {
        let dir = TempDir::new().unwrap();
        write_reports(dir.path());
        let output = dir.path().join("trend.md");
        let options = TrendOptions::new(dir.path())
            .with_output(&output)
            .with_medium(ReportMedium::Markdown);

        let run = run_trend(&options, &TrendConfig::default()).unwrap();

        assert_eq!(run.output_path, output);
        let chart_dir = run.chart_dir.unwrap();
        assert_eq!(chart_dir, dir.path().join("trend_charts"));
        let svgs = fs::read_dir(&chart_dir).unwrap().count();
        assert_eq!(svgs, 5);

        let document = fs::read_to_string(&output).unwrap();
        assert!(document.contains("](trend_charts/issue-severity.svg)"));
    }

    #[test]
    fn default_output_lands_in_reports_dir() {
        let dir = TempDir::new().unwrap();
        write_reports(dir.path());
        let run = run_trend(&TrendOptions::new(dir.path()), &TrendConfig::default()).unwrap();

        assert_eq!(run.output_path.parent().unwrap(), dir.path());
        let name = run.output_path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("trend-report-"));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn unreadable_reports_are_counted_not_fatal() {
        let dir = TempDir::new().unwrap();
        write_reports(dir.path());
        fs::write(dir.path().join("scan-00.md"), "# no metadata here\n").unwrap();

        let run = run_trend(&TrendOptions::new(dir.path()), &TrendConfig::default()).unwrap();
        assert_eq!(run.report_count, 3);
        assert_eq!(run.rejected, 1);
    }

    #[test]
    fn empty_directory_is_no_reports() {
        let dir = TempDir::new().unwrap();
        let err = run_trend(&TrendOptions::new(dir.path()), &TrendConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TrendError::NoReports {
                matched: 0,
                rejected: 0,
                ..
            }
        ));
    }

    #[test]
    fn all_rejected_is_no_reports_with_counts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "nothing\n").unwrap();
        fs::write(dir.path().join("b.md"), "still nothing\n").unwrap();

        let err = run_trend(&TrendOptions::new(dir.path()), &TrendConfig::default()).unwrap_err();
        match err {
            TrendError::NoReports {
                matched, rejected, ..
            } => {
                assert_eq!(matched, 2);
                assert_eq!(rejected, 2);
            }
            other => panic!("expected NoReports, got {other:?}"),
        }
    }

    #[test]
    fn single_snapshot_is_insufficient() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("only.md"),
            sample_report("2025-03-01T10:00:00Z", "acme:api", "Acme API", 5, true),
        )
        .unwrap();

        let err = run_trend(&TrendOptions::new(dir.path()), &TrendConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TrendError::InsufficientData(AggregateError::InsufficientData { found: 1 })
        ));
    }

    #[test]
    fn missing_output_parent_fails_before_extraction() {
        let dir = TempDir::new().unwrap();
        // No reports written: the output check must fire first.
        let options = TrendOptions::new(dir.path())
            .with_output(dir.path().join("missing").join("report.html"));

        let err = run_trend(&options, &TrendConfig::default()).unwrap_err();
        assert!(matches!(err, TrendError::OutputPath(_)));
    }

    #[test]
    fn project_filter_selects_matching_records() {
        let dir = TempDir::new().unwrap();
        write_reports(dir.path());
        for (file, date) in [
            ("billing-01.md", "2025-03-02T10:00:00Z"),
            ("billing-02.md", "2025-03-09T10:00:00Z"),
        ] {
            fs::write(
                dir.path().join(file),
                sample_report(date, "acme:billing-api", "Billing API", 3, true),
            )
            .unwrap();
        }

        let options = TrendOptions::new(dir.path()).with_project_filter("billing");
        let run = run_trend(&options, &TrendConfig::default()).unwrap();
        assert_eq!(run.report_count, 2);
        assert_eq!(run.project_name, "Billing API");
    }

    #[test]
    fn custom_glob_narrows_discovery() {
        let dir = TempDir::new().unwrap();
        write_reports(dir.path());
        fs::write(
            dir.path().join("notes.txt"),
            sample_report("2025-03-20T10:00:00Z", "acme:api", "Acme API", 1, true),
        )
        .unwrap();

        let config = TrendConfig::default().with_report_glob("scan-*.md");
        let run = run_trend(&TrendOptions::new(dir.path()), &config).unwrap();
        assert_eq!(run.report_count, 3);
    }
}
