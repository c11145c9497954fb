//! Markdown report medium.
//!
//! The document links charts as SVG files in a sibling directory, so a
//! rendered report is a Markdown file plus one `.svg` per chart. Content
//! comes entirely from a [`ReportSummary`]; nothing is recomputed here.

use std::fmt::Write as _;

use crate::chart::{ChartSpec, SvgRenderer};
use crate::report::summary::ReportSummary;

/// One chart artifact written next to the Markdown document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartAsset {
    /// File name inside the chart directory, like `issue-severity.svg`.
    pub file_name: String,
    pub svg: String,
}

/// A rendered Markdown report plus its chart files.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownReport {
    pub document: String,
    pub charts: Vec<ChartAsset>,
}

/// Renders the Markdown document and its chart assets.
///
/// `chart_dir` is the directory name the document links charts under,
/// relative to wherever the document itself is written.
pub fn render(
    summary: &ReportSummary,
    charts: &[ChartSpec],
    renderer: &SvgRenderer,
    chart_dir: &str,
) -> MarkdownReport {
    let mut md = String::new();

    let _ = writeln!(
        md,
        "# SAST Trend Report: {}\n",
        summary.project.display_name()
    );
    let _ = writeln!(
        md,
        "{} **Overall Trend: {}**\n",
        summary.verdict.emoji(),
        summary.verdict.title()
    );
    let _ = writeln!(
        md,
        "- **Project**: {} (`{}`)",
        summary.project.name, summary.project.key
    );
    let _ = writeln!(md, "- **Organization**: {}", summary.project.organization);
    let _ = writeln!(md, "- **Analysis Period**: {}", summary.period_label);
    let _ = writeln!(md, "- **Reports Analyzed**: {}", summary.report_count);
    let _ = writeln!(
        md,
        "- **Generated**: {}\n",
        summary.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    md.push_str("## Executive Summary\n\n");
    md.push_str("| Metric | Current | Change | Trend |\n");
    md.push_str("|--------|---------|--------|-------|\n");
    for card in &summary.cards {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            card.title,
            card.value,
            card.change,
            card.direction.emoji()
        );
    }
    md.push('\n');

    md.push_str("## Charts\n\n");
    for chart in charts {
        let _ = writeln!(md, "### {}\n", chart.title);
        let _ = writeln!(md, "![{}]({}/{}.svg)\n", chart.title, chart_dir, chart.id);
    }

    md.push_str("## Metric Details\n\n");
    md.push_str("| Metric | First | Latest | Delta | Change | Trend |\n");
    md.push_str("|--------|-------|--------|-------|--------|-------|\n");
    for row in &summary.rows {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} |",
            row.name,
            row.first,
            row.last,
            row.delta,
            row.percent,
            row.direction.title()
        );
    }
    md.push('\n');

    md.push_str("## Quality Gate\n\n");
    let _ = writeln!(md, "{}.\n", summary.gate_line());

    if !summary.velocities.is_empty() {
        md.push_str("## Remediation Velocity\n\n");
        for (metric, v) in &summary.velocities {
            let _ = writeln!(
                md,
                "- **{}**: {:+.2}/day ({:+.2}/week) over {} {}",
                metric.display_name(),
                v.per_day,
                v.per_week,
                v.days_elapsed,
                if v.days_elapsed == 1 { "day" } else { "days" }
            );
        }
        md.push('\n');
    }

    md.push_str("## Recommendations\n\n");
    if summary.recommendations.is_empty() {
        md.push_str("No declining metrics; keep the current review cadence.\n");
    } else {
        for (idx, rec) in summary.recommendations.iter().enumerate() {
            let _ = writeln!(md, "{}. **{}**: {}", idx + 1, rec.priority.label(), rec.text);
        }
    }

    let chart_files = charts
        .iter()
        .map(|chart| ChartAsset {
            file_name: format!("{}.svg", chart.id),
            svg: renderer.render(chart),
        })
        .collect();

    MarkdownReport {
        document: md,
        charts: chart_files,
    }
}
