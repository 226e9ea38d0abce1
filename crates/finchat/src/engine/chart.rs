//! SVG line chart of a close series

use crate::api::PriceSeries;
use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 70.0;
const GRID_LINES: usize = 6;

/// A chart written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub path: PathBuf,
}

/// Chart title for a ticker
pub fn chart_title(ticker: &str) -> String {
    format!("{ticker} Stock Price Over the Last Year")
}

/// Render `series` and write it to `path`, replacing any previous chart
pub fn render_price_chart(series: &PriceSeries, path: &Path) -> Result<ChartArtifact> {
    let svg = price_chart_svg(series).map_err(|e| ChatError::Chart(e.to_string()))?;
    std::fs::write(path, svg)?;

    debug!(ticker = series.ticker(), path = %path.display(), points = series.len(), "Chart written");
    Ok(ChartArtifact {
        path: path.to_path_buf(),
    })
}

/// Build the SVG document for `series`
pub fn price_chart_svg(series: &PriceSeries) -> std::result::Result<String, std::fmt::Error> {
    let points = series.points();
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let (mut lo, mut hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.close), hi.max(p.close))
        });
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }

    let last_index = (points.len() - 1).max(1) as f64;
    let x_at = |i: usize| MARGIN_LEFT + plot_w * (i as f64 / last_index);
    let y_at = |v: f64| MARGIN_TOP + plot_h * (1.0 - (v - lo) / (hi - lo));

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{}" y="30" font-size="18" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        escape(&chart_title(series.ticker()))
    )?;

    // Grid and axis ticks
    writeln!(svg, r##"<g stroke="#dddddd" stroke-width="1">"##)?;
    for k in 0..=GRID_LINES {
        let frac = k as f64 / GRID_LINES as f64;
        let y = MARGIN_TOP + plot_h * frac;
        let x = MARGIN_LEFT + plot_w * frac;
        writeln!(
            svg,
            r#"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}"/>"#,
            MARGIN_LEFT + plot_w
        )?;
        writeln!(
            svg,
            r#"<line x1="{x:.1}" y1="{MARGIN_TOP}" x2="{x:.1}" y2="{:.1}"/>"#,
            MARGIN_TOP + plot_h
        )?;
    }
    writeln!(svg, "</g>")?;

    writeln!(svg, r##"<g font-size="11" fill="#333333">"##)?;
    for k in 0..=GRID_LINES {
        let frac = k as f64 / GRID_LINES as f64;
        let value = hi - (hi - lo) * frac;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{value:.2}</text>"#,
            MARGIN_LEFT - 8.0,
            MARGIN_TOP + plot_h * frac + 4.0
        )?;

        let index = ((points.len() - 1) as f64 * frac).round() as usize;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            x_at(index),
            MARGIN_TOP + plot_h + 18.0,
            points[index].date.format("%Y-%m-%d")
        )?;
    }
    writeln!(svg, "</g>")?;

    // Axes
    writeln!(
        svg,
        r#"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w}" height="{plot_h}" fill="none" stroke="black"/>"#
    )?;
    writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle">Date</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        HEIGHT - 20.0
    )?;
    writeln!(
        svg,
        r#"<text x="20" y="{y:.1}" font-size="14" text-anchor="middle" transform="rotate(-90 20 {y:.1})">Stock Price ($)</text>"#,
        y = MARGIN_TOP + plot_h / 2.0
    )?;

    // Series
    svg.push_str(r##"<polyline fill="none" stroke="#1f77b4" stroke-width="1.5" points=""##);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            svg.push(' ');
        }
        write!(svg, "{:.1},{:.1}", x_at(i), y_at(p.close))?;
    }
    writeln!(svg, r#""/>"#)?;
    writeln!(svg, "</svg>")?;

    Ok(svg)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let last = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        PriceSeries::from_closes("AAPL", last, closes).unwrap()
    }

    #[test]
    fn test_svg_has_title_and_axes() {
        let svg = price_chart_svg(&series(&[190.0, 192.5, 189.0, 195.25])).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("AAPL Stock Price Over the Last Year"));
        assert!(svg.contains(">Date</text>"));
        assert!(svg.contains(">Stock Price ($)</text>"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("2024-06-28"));
    }

    #[test]
    fn test_single_point_and_flat_series() {
        assert!(price_chart_svg(&series(&[42.0])).is_ok());
        let svg = price_chart_svg(&series(&[10.0; 5])).unwrap();
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_render_overwrites_previous_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.svg");
        std::fs::write(&path, "stale").unwrap();

        let artifact = render_price_chart(&series(&[1.0, 2.0, 3.0]), &path).unwrap();

        assert_eq!(artifact.path, path);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
    }

    #[test]
    fn test_title_is_escaped() {
        assert_eq!(escape("A&B <x>"), "A&amp;B &lt;x&gt;");
    }
}
