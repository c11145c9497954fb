//! Medium-agnostic chart descriptions.
//!
//! A [`ChartSpec`] says *what* to draw, never *how*: the static SVG
//! renderer and the embedded-page renderer both consume the same spec, so
//! the two media can never show different data.

use serde::{Deserialize, Serialize};

/// Shape a chart renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    StackedArea,
    Bar,
    Radar,
}

/// One named data series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub color: String,
    /// One value per label, in label order.
    pub points: Vec<f64>,
    /// Per-point colors for categorical bars. `None` means the series color
    /// applies throughout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_colors: Option<Vec<String>>,
}

/// A horizontal reference line drawn across the plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdLine {
    pub label: String,
    pub value: f64,
    pub color: String,
}

/// Complete, renderer-independent description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Stable identifier, used for SVG file names and canvas element ids.
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    /// Axis labels: dates for time charts, category names for the radar.
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<ThresholdLine>,
    /// Vertical axis caption, when the kind has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,
}

impl ChartSpec {
    /// Whether every series carries exactly one point per label.
    pub fn is_aligned(&self) -> bool {
        self.series.iter().all(|s| {
            s.points.len() == self.labels.len()
                && s.point_colors
                    .as_ref()
                    .map_or(true, |colors| colors.len() == self.labels.len())
        })
    }

    /// Largest value across all series, including stacking when the kind
    /// stacks. Used by the static renderer to scale the vertical axis.
    pub fn max_value(&self) -> f64 {
        match self.kind {
            ChartKind::StackedArea => (0..self.labels.len())
                .map(|i| self.series.iter().map(|s| s.points[i]).sum::<f64>())
                .fold(0.0, f64::max),
            _ => self
                .series
                .iter()
                .flat_map(|s| s.points.iter().copied())
                .fold(0.0, f64::max),
        }
    }
}
