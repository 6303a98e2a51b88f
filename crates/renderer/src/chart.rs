//! Cumulative-return line chart, rendered directly as SVG.
//!
//! The styling mirrors the published page: dark background, accent line
//! with a translucent fill under the curve, faint horizontal gridlines.

use analytics::CumulativePoint;
use std::fmt::Write;

const BACKGROUND: &str = "#05060a";
const ACCENT: &str = "#ff6f3c";
const GRID: &str = "#9fb6ca";
const TITLE_COLOR: &str = "#f7f8fa";
const AXIS_COLOR: &str = "#ccd7e2";
const TICK_COLOR: &str = "#e6edf5";

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 18.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 46.0;
const GRID_LINES: usize = 5;

/// Renders the cumulative percent series as a standalone SVG document of
/// the given pixel dimensions. The x axis is the observation index and the
/// y axis is cumulative return in percent.
pub fn cumulative_chart(series: &[CumulativePoint], width: u32, height: u32) -> String {
    let w = width as f64;
    let h = height as f64;
    let plot_w = w - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = h - MARGIN_TOP - MARGIN_BOTTOM;

    // Y range padded by 5%, widened when the curve is flat so the line does
    // not sit on the plot border.
    let mut y_min = series
        .iter()
        .map(|p| p.cumulative_pct)
        .fold(f64::INFINITY, f64::min)
        .min(0.0);
    let mut y_max = series
        .iter()
        .map(|p| p.cumulative_pct)
        .fold(f64::NEG_INFINITY, f64::max)
        .max(0.0);
    let spread = y_max - y_min;
    if spread > 0.0 {
        y_min -= spread * 0.05;
        y_max += spread * 0.05;
    } else {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let x_of = |i: usize| -> f64 {
        if series.len() < 2 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + plot_w * i as f64 / (series.len() - 1) as f64
        }
    };
    let y_of = |v: f64| -> f64 { MARGIN_TOP + plot_h * (y_max - v) / (y_max - y_min) };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{BACKGROUND}"/>"#
    );
    let _ = write!(
        svg,
        r#"<text x="{x}" y="26" fill="{TITLE_COLOR}" font-family="sans-serif" font-size="16" text-anchor="middle">Cumulative Return</text>"#,
        x = w / 2.0
    );

    // Horizontal gridlines with percent labels.
    for i in 0..=GRID_LINES {
        let value = y_max - (y_max - y_min) * i as f64 / GRID_LINES as f64;
        let y = y_of(value);
        let _ = write!(
            svg,
            r#"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="{GRID}" stroke-opacity="0.15"/>"#,
            x1 = MARGIN_LEFT,
            x2 = w - MARGIN_RIGHT,
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{ty:.1}" fill="{TICK_COLOR}" font-family="sans-serif" font-size="11" text-anchor="end">{value:.1}</text>"#,
            x = MARGIN_LEFT - 8.0,
            ty = y + 4.0,
        );
    }

    // Filled area under the curve, closed along the bottom of the plot.
    let mut area = String::new();
    for (i, p) in series.iter().enumerate() {
        let _ = write!(area, "{:.1},{:.1} ", x_of(i), y_of(p.cumulative_pct));
    }
    let baseline = MARGIN_TOP + plot_h;
    let _ = write!(
        svg,
        r#"<polygon points="{area}{x_last:.1},{baseline:.1} {x_first:.1},{baseline:.1}" fill="{ACCENT}" fill-opacity="0.18"/>"#,
        x_last = x_of(series.len().saturating_sub(1)),
        x_first = x_of(0),
    );

    let line = area.trim_end();
    let _ = write!(
        svg,
        r#"<polyline points="{line}" fill="none" stroke="{ACCENT}" stroke-width="2.5"/>"#
    );

    // Axis labels.
    let _ = write!(
        svg,
        r#"<text x="{x}" y="{y:.1}" fill="{AXIS_COLOR}" font-family="sans-serif" font-size="12" text-anchor="middle">Observation #</text>"#,
        x = MARGIN_LEFT + plot_w / 2.0,
        y = h - 12.0,
    );
    let _ = write!(
        svg,
        r#"<text x="16" y="{y:.1}" fill="{AXIS_COLOR}" font-family="sans-serif" font-size="12" text-anchor="middle" transform="rotate(-90 16 {y:.1})">Cumulative (%)</text>"#,
        y = MARGIN_TOP + plot_h / 2.0,
    );

    svg.push_str("</svg>");
    svg
}
