//! Static SVG materialization of chart specs.
//!
//! The markdown medium cannot run a charting library, so charts become
//! standalone SVG documents assembled as text. The renderer draws what the
//! spec says and nothing else; identical specs produce byte-identical SVG.

use std::f64::consts::PI;

use crate::chart::spec::{ChartKind, ChartSpec};

const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 46.0;
const MAX_X_LABELS: usize = 8;

const BACKGROUND: &str = "#ffffff";
const GRID_COLOR: &str = "#eceff1";
const AXIS_COLOR: &str = "#b0bec5";
const TEXT_COLOR: &str = "#263238";
const MUTED_COLOR: &str = "#607d8b";

/// Renders [`ChartSpec`]s into standalone SVG documents of a fixed canvas
/// size.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    width: u32,
    height: u32,
}

struct Frame {
    x0: f64,
    y0: f64,
    w: f64,
    h: f64,
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Render one chart to SVG text.
    pub fn render(&self, spec: &ChartSpec) -> String {
        let mut svg = String::with_capacity(4096);
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let frame = Frame {
            x0: MARGIN_LEFT,
            y0: MARGIN_TOP,
            w: w - MARGIN_LEFT - MARGIN_RIGHT,
            h: h - MARGIN_TOP - MARGIN_BOTTOM,
        };

        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" role=\"img\">\n",
            self.width, self.height, self.width, self.height
        ));
        svg.push_str(&format!("<title>{}</title>\n", xml_escape(&spec.title)));
        svg.push_str(&format!(
            "<style>text {{ font-family: ui-sans-serif, system-ui, sans-serif; fill: {TEXT_COLOR}; }} .title {{ font-size: 15px; font-weight: 600; }} .tick {{ font-size: 11px; fill: {MUTED_COLOR}; }} .legend {{ font-size: 12px; }}</style>\n"
        ));
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND}\"/>\n"
        ));
        svg.push_str(&format!(
            "<text class=\"title\" x=\"{}\" y=\"21\">{}</text>\n",
            coord(MARGIN_LEFT),
            xml_escape(&spec.title)
        ));
        self.legend(&mut svg, spec, &frame);

        match spec.kind {
            ChartKind::Line => self.render_line(&mut svg, spec, &frame),
            ChartKind::StackedArea => self.render_stacked_area(&mut svg, spec, &frame),
            ChartKind::Bar => self.render_bar(&mut svg, spec, &frame),
            ChartKind::Radar => self.render_radar(&mut svg, spec, &frame),
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn legend(&self, svg: &mut String, spec: &ChartSpec, frame: &Frame) {
        let mut x = frame.x0;
        let y = 36.0;
        for series in &spec.series {
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"10\" height=\"10\" rx=\"2\" fill=\"{}\"/>\n",
                coord(x),
                coord(y - 9.0),
                series.color
            ));
            svg.push_str(&format!(
                "<text class=\"legend\" x=\"{}\" y=\"{}\">{}</text>\n",
                coord(x + 14.0),
                coord(y),
                xml_escape(&series.name)
            ));
            x += 14.0 + 7.0 * series.name.len() as f64 + 16.0;
        }
    }

    fn axes(&self, svg: &mut String, spec: &ChartSpec, frame: &Frame, y_max: f64) {
        for step in 0..=4 {
            let value = y_max * f64::from(step) / 4.0;
            let y = y_of(frame, value, y_max);
            svg.push_str(&format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\"/>\n",
                coord(frame.x0),
                coord(y),
                coord(frame.x0 + frame.w),
                coord(y),
                if step == 0 { AXIS_COLOR } else { GRID_COLOR }
            ));
            svg.push_str(&format!(
                "<text class=\"tick\" x=\"{}\" y=\"{}\" text-anchor=\"end\">{}</text>\n",
                coord(frame.x0 - 8.0),
                coord(y + 4.0),
                fmt_tick(value, y_max)
            ));
        }

        let n = spec.labels.len();
        let xs = x_positions(frame, n);
        let step = n.div_ceil(MAX_X_LABELS).max(1);
        for (i, label) in spec.labels.iter().enumerate() {
            if i % step != 0 && i != n - 1 {
                continue;
            }
            svg.push_str(&format!(
                "<text class=\"tick\" x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>\n",
                coord(xs[i]),
                coord(frame.y0 + frame.h + 18.0),
                xml_escape(label)
            ));
        }

        if let Some(caption) = &spec.y_axis {
            svg.push_str(&format!(
                "<text class=\"tick\" x=\"{}\" y=\"14\" text-anchor=\"middle\" transform=\"rotate(-90)\">{}</text>\n",
                coord(-(frame.y0 + frame.h / 2.0)),
                xml_escape(caption)
            ));
        }
    }

    fn threshold(&self, svg: &mut String, spec: &ChartSpec, frame: &Frame, y_max: f64) {
        if let Some(line) = &spec.threshold {
            let y = y_of(frame, line.value, y_max);
            svg.push_str(&format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"1.5\" stroke-dasharray=\"6 4\"/>\n",
                coord(frame.x0),
                coord(y),
                coord(frame.x0 + frame.w),
                coord(y),
                line.color
            ));
            svg.push_str(&format!(
                "<text class=\"tick\" x=\"{}\" y=\"{}\" text-anchor=\"end\" fill=\"{}\">{}</text>\n",
                coord(frame.x0 + frame.w),
                coord(y - 5.0),
                line.color,
                xml_escape(&line.label)
            ));
        }
    }

    fn render_line(&self, svg: &mut String, spec: &ChartSpec, frame: &Frame) {
        let y_max = scale_max(spec);
        self.axes(svg, spec, frame, y_max);
        self.threshold(svg, spec, frame, y_max);

        let xs = x_positions(frame, spec.labels.len());
        for series in &spec.series {
            let points: Vec<String> = series
                .points
                .iter()
                .zip(&xs)
                .map(|(&v, &x)| format!("{},{}", coord(x), coord(y_of(frame, v, y_max))))
                .collect();
            svg.push_str(&format!(
                "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-linejoin=\"round\"/>\n",
                points.join(" "),
                series.color
            ));
            for (&v, &x) in series.points.iter().zip(&xs) {
                svg.push_str(&format!(
                    "<circle cx=\"{}\" cy=\"{}\" r=\"3\" fill=\"{}\"/>\n",
                    coord(x),
                    coord(y_of(frame, v, y_max)),
                    series.color
                ));
            }
        }
    }

    fn render_stacked_area(&self, svg: &mut String, spec: &ChartSpec, frame: &Frame) {
        let y_max = scale_max(spec);
        self.axes(svg, spec, frame, y_max);

        let n = spec.labels.len();
        let xs = x_positions(frame, n);
        let mut lower = vec![0.0f64; n];
        for series in &spec.series {
            let upper: Vec<f64> = lower
                .iter()
                .zip(&series.points)
                .map(|(&l, &p)| l + p)
                .collect();
            let mut points: Vec<String> = Vec::with_capacity(2 * n);
            for i in 0..n {
                points.push(format!(
                    "{},{}",
                    coord(xs[i]),
                    coord(y_of(frame, upper[i], y_max))
                ));
            }
            for i in (0..n).rev() {
                points.push(format!(
                    "{},{}",
                    coord(xs[i]),
                    coord(y_of(frame, lower[i], y_max))
                ));
            }
            svg.push_str(&format!(
                "<polygon points=\"{}\" fill=\"{}\" fill-opacity=\"0.7\" stroke=\"{}\" stroke-width=\"1\"/>\n",
                points.join(" "),
                series.color,
                series.color
            ));
            lower = upper;
        }
        self.threshold(svg, spec, frame, y_max);
    }

    fn render_bar(&self, svg: &mut String, spec: &ChartSpec, frame: &Frame) {
        let y_max = scale_max(spec);
        self.axes(svg, spec, frame, y_max);
        self.threshold(svg, spec, frame, y_max);

        let n = spec.labels.len();
        if n == 0 {
            return;
        }
        let slot = frame.w / n as f64;
        let bar_w = slot * 0.6;
        for series in &spec.series {
            for (i, &value) in series.points.iter().enumerate() {
                let x = frame.x0 + slot * i as f64 + (slot - bar_w) / 2.0;
                let y = y_of(frame, value, y_max);
                let color = series
                    .point_colors
                    .as_ref()
                    .and_then(|colors| colors.get(i).map(String::as_str))
                    .unwrap_or(series.color.as_str());
                svg.push_str(&format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"2\" fill=\"{}\"/>\n",
                    coord(x),
                    coord(y),
                    coord(bar_w),
                    coord(frame.y0 + frame.h - y),
                    color
                ));
            }
        }
    }

    fn render_radar(&self, svg: &mut String, spec: &ChartSpec, frame: &Frame) {
        let n = spec.labels.len();
        if n < 3 {
            return;
        }
        let y_max = scale_max(spec);
        let cx = frame.x0 + frame.w / 2.0;
        let cy = frame.y0 + frame.h / 2.0;
        let radius = (frame.w.min(frame.h) / 2.0) - 18.0;
        let angle_of = |i: usize| -PI / 2.0 + 2.0 * PI * i as f64 / n as f64;

        let rings = if y_max <= 6.0 {
            (y_max.round() as usize).max(1)
        } else {
            4
        };
        for ring in 1..=rings {
            let r = radius * ring as f64 / rings as f64;
            svg.push_str(&format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" stroke=\"{GRID_COLOR}\"/>\n",
                coord(cx),
                coord(cy),
                coord(r)
            ));
        }
        for (i, label) in spec.labels.iter().enumerate() {
            let angle = angle_of(i);
            let (sin, cos) = angle.sin_cos();
            svg.push_str(&format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{AXIS_COLOR}\"/>\n",
                coord(cx),
                coord(cy),
                coord(cx + radius * cos),
                coord(cy + radius * sin)
            ));
            svg.push_str(&format!(
                "<text class=\"tick\" x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>\n",
                coord(cx + (radius + 16.0) * cos),
                coord(cy + (radius + 16.0) * sin + 4.0),
                xml_escape(label)
            ));
        }
        for series in &spec.series {
            let points: Vec<String> = series
                .points
                .iter()
                .enumerate()
                .map(|(i, &value)| {
                    let angle = angle_of(i);
                    let (sin, cos) = angle.sin_cos();
                    let r = radius * (value / y_max).clamp(0.0, 1.0);
                    format!("{},{}", coord(cx + r * cos), coord(cy + r * sin))
                })
                .collect();
            svg.push_str(&format!(
                "<polygon points=\"{}\" fill=\"{}\" fill-opacity=\"0.25\" stroke=\"{}\" stroke-width=\"2\"/>\n",
                points.join(" "),
                series.color,
                series.color
            ));
        }
    }
}

fn x_positions(frame: &Frame, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![frame.x0 + frame.w / 2.0],
        _ => (0..n)
            .map(|i| frame.x0 + frame.w * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

fn y_of(frame: &Frame, value: f64, y_max: f64) -> f64 {
    frame.y0 + frame.h - (value / y_max).clamp(0.0, 1.0) * frame.h
}

/// Vertical scale: the larger of the data and the threshold, rounded up to
/// a round number (1-2-5 progression).
fn scale_max(spec: &ChartSpec) -> f64 {
    let data_max = spec.max_value();
    let with_threshold = spec
        .threshold
        .as_ref()
        .map_or(data_max, |t| data_max.max(t.value));
    nice_ceiling(with_threshold)
}

fn nice_ceiling(max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    let power = 10f64.powf(max.log10().floor());
    for multiple in [1.0, 2.0, 5.0, 10.0] {
        let candidate = multiple * power;
        if candidate >= max {
            return candidate;
        }
    }
    10.0 * power
}

fn coord(value: f64) -> String {
    format!("{value:.1}")
}

fn fmt_tick(value: f64, y_max: f64) -> String {
    if y_max >= 10.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
