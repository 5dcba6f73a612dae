//! Minimal SVG rendering for phase-space scatter panels and envelope charts.

use std::fmt::Write;

/// Scatter plots are thinned to at most this many points per panel.
pub const MAX_SCATTER_POINTS: usize = 2000;

const PANEL_W: f64 = 360.0;
const PANEL_H: f64 = 300.0;
const MARGIN: f64 = 48.0;
const CHART_W: f64 = 720.0;
const CHART_H: f64 = 360.0;

/// One scatter panel: paired samples plus axis labels.
#[derive(Debug, Clone)]
pub struct ScatterPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
}

/// One polyline series of an envelope chart.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub points: Vec<(f64, f64)>,
}

/// Shaded longitudinal band, e.g. a magnet between two s positions.
#[derive(Debug, Clone)]
pub struct Band {
    pub label: String,
    pub start: f64,
    pub end: f64,
    pub color: &'static str,
}

/// Every `stride`-th element so that at most `max_points` remain.
pub fn subsample<T: Copy>(values: &[T], max_points: usize) -> Vec<T> {
    if values.len() <= max_points || max_points == 0 {
        return values.to_vec();
    }
    let stride = values.len().div_ceil(max_points);
    values.iter().step_by(stride).copied().collect()
}

#[derive(Debug, Clone, Copy)]
struct Range {
    lo: f64,
    hi: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let (lo, hi) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() || !hi.is_finite() {
            return Range { lo: -1.0, hi: 1.0 };
        }
        if hi == lo || hi - lo <= 1e-12 * hi.abs().max(lo.abs()) {
            let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
            return Range {
                lo: lo - pad,
                hi: hi + pad,
            };
        }
        let pad = 0.05 * (hi - lo);
        Range {
            lo: lo - pad,
            hi: hi + pad,
        }
    }

    fn include_zero(self) -> Self {
        Range {
            lo: self.lo.min(0.0),
            hi: self.hi.max(0.0),
        }
    }

    fn map(&self, v: f64, out_lo: f64, out_hi: f64) -> f64 {
        out_lo + (v - self.lo) / (self.hi - self.lo) * (out_hi - out_lo)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[allow(clippy::too_many_arguments)]
fn axes(
    svg: &mut String,
    ox: f64,
    oy: f64,
    w: f64,
    h: f64,
    xr: &Range,
    yr: &Range,
    x_label: &str,
    y_label: &str,
) -> std::fmt::Result {
    writeln!(
        svg,
        r##"<rect x="{ox:.1}" y="{oy:.1}" width="{w:.1}" height="{h:.1}" fill="none" stroke="#333"/>"##
    )?;
    writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"#,
        ox + w / 2.0,
        oy + h + 30.0,
        escape(x_label)
    )?;
    writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="middle" transform="rotate(-90 {:.1} {:.1})">{}</text>"#,
        ox - 34.0,
        oy + h / 2.0,
        ox - 34.0,
        oy + h / 2.0,
        escape(y_label)
    )?;
    for (value, anchor_x, anchor_y, align) in [
        (xr.lo, ox, oy + h + 14.0, "start"),
        (xr.hi, ox + w, oy + h + 14.0, "end"),
    ] {
        writeln!(
            svg,
            r#"<text x="{anchor_x:.1}" y="{anchor_y:.1}" font-size="9" text-anchor="{align}">{value:.3}</text>"#
        )?;
    }
    for (value, anchor_y) in [(yr.lo, oy + h), (yr.hi, oy + 9.0)] {
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{anchor_y:.1}" font-size="9" text-anchor="end">{value:.3}</text>"#,
            ox - 4.0
        )?;
    }
    Ok(())
}

/// Side-by-side scatter panels in one SVG document.
pub fn render_scatter_panels(title: &str, panels: &[ScatterPanel]) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = write_scatter_panels(&mut svg, title, panels);
    svg
}

fn write_scatter_panels(
    svg: &mut String,
    title: &str,
    panels: &[ScatterPanel],
) -> std::fmt::Result {
    let cell_w = PANEL_W + 2.0 * MARGIN;
    let cell_h = PANEL_H + 2.0 * MARGIN;
    let width = cell_w * panels.len().max(1) as f64;
    let height = cell_h + 24.0;
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}">"#
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{:.1}" y="18" font-size="14" text-anchor="middle">{}</text>"#,
        width / 2.0,
        escape(title)
    )?;

    for (i, panel) in panels.iter().enumerate() {
        let ox = i as f64 * cell_w + MARGIN;
        let oy = 24.0 + MARGIN;
        let xr = Range::of(panel.points.iter().map(|p| p.0));
        let yr = Range::of(panel.points.iter().map(|p| p.1));
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"#,
            ox + PANEL_W / 2.0,
            oy - 8.0,
            escape(&panel.title)
        )?;
        axes(
            svg,
            ox,
            oy,
            PANEL_W,
            PANEL_H,
            &xr,
            &yr,
            &panel.x_label,
            &panel.y_label,
        )?;
        writeln!(svg, r##"<g fill="#1f77b4" fill-opacity="0.35">"##)?;
        for &(x, y) in subsample(&panel.points, MAX_SCATTER_POINTS).iter() {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            let px = xr.map(x, ox, ox + PANEL_W);
            let py = yr.map(y, oy + PANEL_H, oy);
            writeln!(svg, r#"<circle cx="{px:.2}" cy="{py:.2}" r="1"/>"#)?;
        }
        writeln!(svg, "</g>")?;
    }
    writeln!(svg, "</svg>")
}

/// Line chart of `series` along s with shaded element `bands`.
pub fn render_line_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[Series],
    bands: &[Band],
) -> String {
    let mut svg = String::new();
    let _ = write_line_chart(&mut svg, title, x_label, y_label, series, bands);
    svg
}

fn write_line_chart(
    svg: &mut String,
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[Series],
    bands: &[Band],
) -> std::fmt::Result {
    let width = CHART_W + 2.0 * MARGIN + 120.0;
    let height = CHART_H + 2.0 * MARGIN + 24.0;
    let ox = MARGIN;
    let oy = 24.0 + MARGIN;

    let xs = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .chain(bands.iter().flat_map(|b| [b.start, b.end]));
    let xr = Range::of(xs);
    let yr = Range::of(series.iter().flat_map(|s| s.points.iter().map(|p| p.1))).include_zero();

    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}">"#
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{:.1}" y="18" font-size="14" text-anchor="middle">{}</text>"#,
        ox + CHART_W / 2.0,
        escape(title)
    )?;

    for band in bands {
        let x0 = xr.map(band.start, ox, ox + CHART_W);
        let x1 = xr.map(band.end, ox, ox + CHART_W);
        writeln!(
            svg,
            r#"<rect x="{x0:.2}" y="{oy:.1}" width="{:.2}" height="{CHART_H:.1}" fill="{}" fill-opacity="0.15"/>"#,
            (x1 - x0).max(0.0),
            band.color
        )?;
        writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.1}" font-size="9" text-anchor="middle">{}</text>"#,
            (x0 + x1) / 2.0,
            oy + 12.0,
            escape(&band.label)
        )?;
    }

    axes(svg, ox, oy, CHART_W, CHART_H, &xr, &yr, x_label, y_label)?;

    for (i, s) in series.iter().enumerate() {
        let mut path = String::new();
        for &(x, y) in &s.points {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            let px = xr.map(x, ox, ox + CHART_W);
            let py = yr.map(y, oy + CHART_H, oy);
            write!(path, "{px:.2},{py:.2} ")?;
        }
        writeln!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
            path.trim_end(),
            s.color
        )?;
        let ly = oy + 16.0 * (i as f64 + 1.0);
        writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{ly:.1}" x2="{:.1}" y2="{ly:.1}" stroke="{}" stroke-width="2"/>"#,
            ox + CHART_W + 12.0,
            ox + CHART_W + 32.0,
            s.color
        )?;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="11">{}</text>"#,
            ox + CHART_W + 36.0,
            ly + 4.0,
            escape(&s.label)
        )?;
    }
    writeln!(svg, "</svg>")
}
