//! HTML report medium.
//!
//! Produces a single self-contained document: inline CSS, a JSON data
//! island carrying every derived number, and a small script that renders
//! the charts from the island via Chart.js loaded from a CDN. Downstream
//! tooling can re-extract the island instead of scraping the markup; the
//! embedded text is byte-identical to [`island_json`] output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::chart::ChartSpec;
use crate::report::summary::ReportSummary;
use crate::series::Metric;
use crate::snapshot::ProjectIdentity;
use crate::trend::{Direction, GateHistory, Recommendation, TrendResult, Velocity};

/// `id` attribute of the embedded JSON island.
pub const DATA_ISLAND_ID: &str = "trend-data";

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js";

/// Everything the island carries, borrowed from the derived summary.
#[derive(Serialize)]
struct TrendIsland<'a> {
    project: &'a ProjectIdentity,
    period: &'a str,
    report_count: usize,
    generated_at: &'a DateTime<Utc>,
    verdict: Direction,
    results: &'a BTreeMap<Metric, TrendResult>,
    gate: &'a GateHistory,
    velocities: &'a BTreeMap<Metric, Velocity>,
    recommendations: &'a [Recommendation],
    charts: &'a [ChartSpec],
}

/// Serializes the data island.
///
/// Every `<` is emitted as the `<` escape so the payload can never
/// close the surrounding `<script>` element, whatever ends up in project
/// names.
pub fn island_json(
    summary: &ReportSummary,
    charts: &[ChartSpec],
) -> Result<String, serde_json::Error> {
    let island = TrendIsland {
        project: &summary.project,
        period: &summary.period_label,
        report_count: summary.report_count,
        generated_at: &summary.generated_at,
        verdict: summary.verdict,
        results: &summary.results,
        gate: &summary.gate,
        velocities: &summary.velocities,
        recommendations: &summary.recommendations,
        charts,
    };
    Ok(serde_json::to_string(&island)?.replace('<', "\\u003c"))
}

/// Returns the raw island text embedded in a rendered page.
pub fn extract_island(html: &str) -> Option<&str> {
    let open = format!(r#"<script type="application/json" id="{DATA_ISLAND_ID}">"#);
    let start = html.find(&open)? + open.len();
    let end = html[start..].find("</script>")? + start;
    Some(&html[start..end])
}

/// Renders the complete HTML document.
pub fn render(
    summary: &ReportSummary,
    charts: &[ChartSpec],
    chart_width: u32,
    chart_height: u32,
) -> Result<String, serde_json::Error> {
    let island = island_json(summary, charts)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SAST Trend Report - {title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {cards}
        {charts}
        {table}
        {gate}
        {velocity}
        {recommendations}
        {footer}
    </div>
    <script type="application/json" id="{island_id}">{island}</script>
    <script src="{cdn}"></script>
    <script>{js}</script>
</body>
</html>"#,
        title = html_escape(summary.project.display_name()),
        css = inline_css(),
        header = render_header(summary),
        cards = render_summary_cards(summary),
        charts = render_chart_panels(charts, chart_width, chart_height),
        table = render_metrics_table(summary),
        gate = render_gate_section(summary),
        velocity = render_velocity_section(summary),
        recommendations = render_recommendations(summary),
        footer = render_footer(summary),
        island_id = DATA_ISLAND_ID,
        island = island,
        cdn = CHART_JS_CDN,
        js = inline_javascript(),
    ))
}

fn render_header(summary: &ReportSummary) -> String {
    format!(
        r#"<header>
    <h1>SAST Trend Report: {name}</h1>
    <div class="meta">
        <span>Project: <code class="monospace">{key}</code></span> |
        <span>Organization: <strong>{org}</strong></span> |
        <span>Period: {period}</span> |
        <span>Reports: {count}</span>
    </div>
    <div class="verdict verdict-{class}">{emoji} Overall Trend: {verdict}</div>
</header>"#,
        name = html_escape(&summary.project.name),
        key = html_escape(&summary.project.key),
        org = html_escape(&summary.project.organization),
        period = summary.period_label,
        count = summary.report_count,
        class = summary.verdict.label(),
        emoji = summary.verdict.emoji(),
        verdict = summary.verdict.title(),
    )
}

fn render_summary_cards(summary: &ReportSummary) -> String {
    let cards: String = summary
        .cards
        .iter()
        .map(|card| {
            format!(
                r#"    <div class="summary-card">
        <h3>{title}</h3>
        <div class="value">{value}</div>
        <div class="change change-{class}">{change}</div>
    </div>
"#,
                title = card.title,
                value = card.value,
                change = card.change,
                class = card.direction.label(),
            )
        })
        .collect();

    format!("<div class=\"summary\">\n{cards}</div>")
}

fn render_chart_panels(charts: &[ChartSpec], width: u32, height: u32) -> String {
    let panels: String = charts
        .iter()
        .map(|chart| {
            format!(
                r#"    <div class="chart-panel" style="max-width:{width}px">
        <h3>{title}</h3>
        <div class="chart-canvas" style="height:{height}px"><canvas id="chart-{id}"></canvas></div>
    </div>
"#,
                title = chart.title,
                id = chart.id,
            )
        })
        .collect();

    format!(
        r#"<section class="section">
    <h2>Charts</h2>
{panels}</section>"#
    )
}

fn render_metrics_table(summary: &ReportSummary) -> String {
    let rows: String = summary
        .rows
        .iter()
        .map(|row| {
            format!(
                r#"<tr>
    <td>{name}</td>
    <td>{first}</td>
    <td>{last}</td>
    <td>{delta}</td>
    <td>{percent}</td>
    <td><span class="trend-{class}">{trend}</span></td>
</tr>"#,
                name = row.name,
                first = row.first,
                last = row.last,
                delta = row.delta,
                percent = row.percent,
                class = row.direction.label(),
                trend = row.direction.title(),
            )
        })
        .collect();

    format!(
        r#"<section class="section">
    <h2>Metric Details</h2>
    <table id="metrics-table">
        <thead>
            <tr>
                <th>Metric</th>
                <th>First</th>
                <th>Latest</th>
                <th>Delta</th>
                <th>Change</th>
                <th>Trend</th>
            </tr>
        </thead>
        <tbody>
            {rows}
        </tbody>
    </table>
</section>"#,
    )
}

fn render_gate_section(summary: &ReportSummary) -> String {
    format!(
        r#"<section class="section">
    <h2>Quality Gate</h2>
    <p>{line}.</p>
</section>"#,
        line = summary.gate_line(),
    )
}

fn render_velocity_section(summary: &ReportSummary) -> String {
    if summary.velocities.is_empty() {
        return String::new();
    }

    let items: String = summary
        .velocities
        .iter()
        .map(|(metric, v)| {
            format!(
                "        <li><strong>{}</strong>: {:+.2}/day ({:+.2}/week) over {} {}</li>\n",
                metric.display_name(),
                v.per_day,
                v.per_week,
                v.days_elapsed,
                if v.days_elapsed == 1 { "day" } else { "days" },
            )
        })
        .collect();

    format!(
        r#"<section class="section">
    <h2>Remediation Velocity</h2>
    <ul>
{items}    </ul>
</section>"#
    )
}

fn render_recommendations(summary: &ReportSummary) -> String {
    let body = if summary.recommendations.is_empty() {
        "    <p>No declining metrics; keep the current review cadence.</p>".to_string()
    } else {
        let items: String = summary
            .recommendations
            .iter()
            .map(|rec| {
                format!(
                    r#"        <li><span class="priority priority-{class}">{label}</span> {text}</li>
"#,
                    class = rec.priority.label().to_lowercase(),
                    label = rec.priority.label(),
                    text = html_escape(&rec.text),
                )
            })
            .collect();
        format!("    <ol class=\"recommendations\">\n{items}    </ol>")
    };

    format!(
        r#"<section class="section">
    <h2>Recommendations</h2>
{body}
</section>"#
    )
}

fn render_footer(summary: &ReportSummary) -> String {
    format!(
        r#"<footer>
    <p>Generated by sastrend on {}</p>
</footer>"#,
        summary.generated_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    line-height: 1.6;
    color: #111827;
    background: #ffffff;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 2rem;
}

header {
    margin-bottom: 2rem;
    padding-bottom: 1rem;
    border-bottom: 2px solid #e5e7eb;
}

header h1 {
    font-size: 1.75rem;
    margin-bottom: 0.5rem;
}

.meta {
    color: #6b7280;
    font-size: 0.9rem;
}

.monospace {
    font-family: ui-monospace, 'SF Mono', Menlo, monospace;
    font-size: 0.85em;
    background: #f3f4f6;
    padding: 0.1rem 0.3rem;
    border-radius: 3px;
}

.verdict {
    margin-top: 1rem;
    padding: 0.6rem 1rem;
    border-radius: 6px;
    font-weight: 600;
}

.verdict-improving { background: #e8f5e9; color: #2e7d32; }
.verdict-declining { background: #ffebee; color: #c62828; }
.verdict-stable { background: #eceff1; color: #455a64; }

.summary {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
    gap: 1rem;
    margin-bottom: 2rem;
}

.summary-card {
    border: 1px solid #e5e7eb;
    border-radius: 8px;
    padding: 1rem;
}

.summary-card h3 {
    font-size: 0.8rem;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: #6b7280;
}

.summary-card .value {
    font-size: 1.8rem;
    font-weight: 700;
}

.change { font-size: 0.9rem; font-weight: 600; }
.change-improving { color: #2e7d32; }
.change-declining { color: #c62828; }
.change-stable { color: #6b7280; }

.section {
    margin-bottom: 2.5rem;
}

.section h2 {
    font-size: 1.25rem;
    margin-bottom: 1rem;
    padding-bottom: 0.4rem;
    border-bottom: 1px solid #e5e7eb;
}

.chart-panel {
    margin: 0 auto 2rem auto;
}

.chart-panel h3 {
    font-size: 1rem;
    margin-bottom: 0.5rem;
}

.chart-canvas {
    position: relative;
}

table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.9rem;
}

th, td {
    text-align: left;
    padding: 0.5rem 0.75rem;
    border-bottom: 1px solid #e5e7eb;
}

th {
    background: #f9fafb;
    font-weight: 600;
}

.trend-improving { color: #2e7d32; font-weight: 600; }
.trend-declining { color: #c62828; font-weight: 600; }
.trend-stable { color: #6b7280; }

.recommendations li {
    margin: 0 0 0.5rem 1.25rem;
}

.priority {
    display: inline-block;
    min-width: 4.5em;
    text-align: center;
    padding: 0.1rem 0.5rem;
    border-radius: 4px;
    font-size: 0.8rem;
    font-weight: 600;
}

.priority-high { background: #ffebee; color: #c62828; }
.priority-medium { background: #fff3e0; color: #e65100; }
.priority-low { background: #eceff1; color: #455a64; }

footer {
    margin-top: 3rem;
    padding-top: 1rem;
    border-top: 1px solid #e5e7eb;
    color: #9ca3af;
    font-size: 0.85rem;
}
"#
}

/// Inline chart bootstrap: reads the island and feeds Chart.js.
fn inline_javascript() -> &'static str {
    r#"
(function () {
    'use strict';

    const island = document.getElementById('trend-data');
    if (!island || typeof Chart === 'undefined') return;
    const data = JSON.parse(island.textContent);

    data.charts.forEach(function (spec) {
        const canvas = document.getElementById('chart-' + spec.id);
        if (canvas) new Chart(canvas, chartConfig(spec));
    });

    function chartConfig(spec) {
        if (spec.kind === 'radar') {
            return {
                type: 'radar',
                data: {
                    labels: spec.labels,
                    datasets: spec.series.map(function (s) {
                        return {
                            label: s.name,
                            data: s.points,
                            borderColor: s.color,
                            backgroundColor: s.color + '40'
                        };
                    })
                },
                options: {
                    responsive: true,
                    maintainAspectRatio: false,
                    scales: { r: { min: 0, max: 5, ticks: { stepSize: 1 } } }
                }
            };
        }

        const stacked = spec.kind === 'stacked_area';
        const datasets = spec.series.map(function (s) {
            const dataset = {
                label: s.name,
                data: s.points,
                borderColor: s.color,
                backgroundColor: stacked ? s.color + 'b3' : s.color,
                tension: 0.3
            };
            if (stacked) dataset.fill = true;
            if (spec.kind === 'bar' && s.point_colors) dataset.backgroundColor = s.point_colors;
            return dataset;
        });
        if (spec.threshold) {
            datasets.push({
                label: spec.threshold.label,
                data: spec.labels.map(function () { return spec.threshold.value; }),
                borderColor: spec.threshold.color,
                borderDash: [6, 4],
                pointRadius: 0,
                fill: false
            });
        }

        const options = { responsive: true, maintainAspectRatio: false, scales: {} };
        if (stacked) options.scales = { x: { stacked: true }, y: { stacked: true } };
        if (spec.kind === 'bar') options.scales = { y: { min: 0, max: 1, ticks: { display: false } } };
        if (spec.y_axis) {
            options.scales.y = options.scales.y || {};
            options.scales.y.title = { display: true, text: spec.y_axis };
        }

        return {
            type: spec.kind === 'bar' ? 'bar' : 'line',
            data: { labels: spec.labels, datasets: datasets },
            options: options
        };
    }
})();
"#
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
