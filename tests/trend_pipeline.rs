//! End-to-end pipeline tests over real report files.
//!
//! These tests drive the public API the way the CLI does: a directory of
//! Markdown reports in, a rendered trend report out.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use sastrend::chart::build_charts;
use sastrend::report::{extract_island, html, island_json, ReportSummary};
use sastrend::series::aggregate;
use sastrend::snapshot::extract;
use sastrend::{run_trend, ReportMedium, TrendConfig, TrendOptions};
use tempfile::TempDir;

fn sample_report(date: &str, critical: u64, passed: bool) -> String {
    format!(
        r#"# Analysis Report

```yaml
# REPORT_METADATA
report_version: "1.0"
analysis_date: "{date}"
project:
  key: "acme:api"
  name: "Acme API"
  organization: "acme"
quality_gate:
  status: "{status}"
  passed: {passed}
metrics:
  total_issues: {total}
  blocker_issues: 2
  critical_issues: {critical}
  major_issues: 6
  minor_issues: 3
  info_issues: 1
  security_issues: 4
  reliability_issues: 3
  maintainability_issues: 7
  vulnerabilities: {critical}
  bugs: 3
  code_smells: 7
  security_hotspots: 2
  code_coverage: "74.0%"
  security_rating: "B"
  reliability_rating: "B"
  maintainability_rating: "A"
```

Findings follow.
"#,
        status = if passed { "OK" } else { "ERROR" },
        total = critical * 3,
    )
}

fn write_standard_reports(dir: &Path) {
    let reports = [
        ("scan-01.md", "2025-04-01T09:00:00Z", 10, false),
        ("scan-02.md", "2025-04-08T09:00:00Z", 6, true),
        ("scan-03.md", "2025-04-15T09:00:00Z", 2, true),
    ];
    for (file, date, critical, passed) in reports {
        fs::write(dir.join(file), sample_report(date, critical, passed)).unwrap();
    }
}

#[test]
fn html_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_standard_reports(dir.path());

    let run = run_trend(&TrendOptions::new(dir.path()), &TrendConfig::default()).unwrap();
    assert_eq!(run.report_count, 3);
    assert_eq!(run.rejected, 0);
    assert!((run.gate_pass_rate - 66.666).abs() < 0.01);

    let page = fs::read_to_string(&run.output_path).unwrap();
    let island = extract_island(&page).unwrap();
    let data: serde_json::Value = serde_json::from_str(island).unwrap();

    assert_eq!(data["project"]["key"], "acme:api");
    assert_eq!(data["report_count"], 3);
    assert_eq!(data["verdict"], "improving");
    assert_eq!(data["results"]["critical_issues"]["delta"], -8.0);
    assert_eq!(data["results"]["critical_issues"]["percent"], -80.0);
    assert_eq!(data["charts"].as_array().unwrap().len(), 5);
    assert_eq!(data["gate"]["passed"], 2);
    assert_eq!(data["gate"]["total"], 3);
}

#[test]
fn markdown_end_to_end_links_resolve() {
    let dir = TempDir::new().unwrap();
    write_standard_reports(dir.path());
    let output = dir.path().join("trend-report.md");
    let options = TrendOptions::new(dir.path())
        .with_output(&output)
        .with_medium(ReportMedium::Markdown);

    let run = run_trend(&options, &TrendConfig::default()).unwrap();
    assert_eq!(run.chart_dir, Some(dir.path().join("trend-report_charts")));

    let document = fs::read_to_string(&output).unwrap();
    let base = output.parent().unwrap();
    let mut linked = 0;
    for line in document.lines() {
        let Some(start) = line.find("](") else {
            continue;
        };
        let Some(end) = line[start + 2..].find(')') else {
            continue;
        };
        let target = &line[start + 2..start + 2 + end];
        assert!(base.join(target).is_file(), "missing chart file {target}");
        linked += 1;
    }
    assert_eq!(linked, 5);
}

#[test]
fn island_round_trip_is_bit_for_bit() {
    let dir = TempDir::new().unwrap();
    write_standard_reports(dir.path());

    let mut records = Vec::new();
    for entry in fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let text = fs::read_to_string(&path).unwrap();
        let source = path.file_name().unwrap().to_string_lossy().into_owned();
        records.push(extract(&text, &source).unwrap());
    }

    let agg = aggregate(records, None).unwrap();
    let generated_at = Utc.with_ymd_and_hms(2025, 4, 16, 12, 0, 0).unwrap();
    let summary = ReportSummary::derive(&agg, generated_at);
    let charts = build_charts(&agg, 80.0);

    let page = html::render(&summary, &charts, 860, 420).unwrap();
    let embedded = extract_island(&page).unwrap();
    assert_eq!(embedded, island_json(&summary, &charts).unwrap());

    // Same inputs, same page.
    let again = html::render(&summary, &charts, 860, 420).unwrap();
    assert_eq!(page, again);
}

#[test]
fn duplicate_timestamps_keep_later_discovered_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("a.md"),
        sample_report("2025-04-01T09:00:00Z", 10, false),
    )
    .unwrap();
    fs::write(
        dir.path().join("b.md"),
        sample_report("2025-04-01T09:00:00Z", 4, false),
    )
    .unwrap();
    fs::write(
        dir.path().join("c.md"),
        sample_report("2025-04-08T09:00:00Z", 2, true),
    )
    .unwrap();

    let run = run_trend(&TrendOptions::new(dir.path()), &TrendConfig::default()).unwrap();
    assert_eq!(run.report_count, 2);
    assert_eq!(run.duplicates, 1);

    let page = fs::read_to_string(&run.output_path).unwrap();
    let data: serde_json::Value =
        serde_json::from_str(extract_island(&page).unwrap()).unwrap();
    // b.md was discovered after a.md, so its values win the shared slot.
    assert_eq!(data["results"]["critical_issues"]["first"], 4.0);
    assert_eq!(data["results"]["critical_issues"]["last"], 2.0);
}
