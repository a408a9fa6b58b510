//! Plotters rendering of bucketed revenue to PNG.
//!
//! All charts share an index-based x (or y, for horizontal bars) axis: bucket
//! `i` sits at coordinate `i`, and tick labels are mapped back to bucket
//! labels by the label formatter.
//!
//! Text (caption, axis descriptions, tick labels) is rasterized with a font
//! bundled into the binary, so rendering does not depend on system fonts.

use std::error::Error;
use std::path::Path;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::register_font;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::Bucket;
use crate::report::{ChartKind, ChartSpec};

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

const CAPTION_SIZE: u32 = 28;
const DESC_SIZE: u32 = 18;
const LABEL_SIZE: u32 = 14;

const BACKGROUND: RGBColor = WHITE;
const GRID: RGBColor = RGBColor(220, 220, 220);
const AXIS: RGBColor = RGBColor(60, 60, 60);

type DrawResult = Result<(), Box<dyn Error>>;

/// Draw `buckets` as described by `spec` into the PNG at `path`.
///
/// Returns a plain message on failure so the caller can wrap it with the chart
/// name (plotters' error types are not `Send`).
pub fn draw_chart(spec: &ChartSpec, buckets: &[Bucket], path: &Path, size: (u32, u32)) -> Result<(), String> {
    ensure_font()?;

    let values: Vec<f64> = buckets
        .iter()
        .map(|b| b.revenue.to_f64().unwrap_or(0.0))
        .collect();
    let labels: Vec<String> = buckets.iter().map(|b| b.label.clone()).collect();

    let result = match spec.kind {
        ChartKind::Line => draw_line(spec, &labels, &values, path, size),
        ChartKind::Bar => draw_bars(spec, &labels, &values, path, size),
        ChartKind::HorizontalBar => draw_horizontal_bars(spec, &labels, &values, path, size),
    };
    result.map_err(|e| e.to_string())
}

/// Register the bundled font under the family name used by every chart.
fn ensure_font() -> Result<(), String> {
    let registered =
        *FONT_REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    if registered {
        Ok(())
    } else {
        Err("bundled chart font could not be loaded".to_string())
    }
}

/// Value axis range, always including zero, padded by 10% at the far end.
fn value_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(0.0_f64, f64::min);
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return (min, min + 1.0);
    }
    let pad = (max - min) * 0.1;
    let lo = if min < 0.0 { min - pad } else { 0.0 };
    (lo, max + pad)
}

/// Index axis range: one unit per bucket, half a unit of margin either side.
fn index_range(n: usize) -> (f64, f64) {
    (-0.5, n.max(1) as f64 - 0.5)
}

fn label_at(labels: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn fmt_amount(v: f64) -> String {
    let whole = v.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if whole < 0 {
        format!("-{out}")
    } else {
        out
    }
}

fn rgb(spec: &ChartSpec) -> RGBColor {
    let (r, g, b) = spec.color;
    RGBColor(r, g, b)
}

fn draw_line(spec: &ChartSpec, labels: &[String], values: &[f64], path: &Path, size: (u32, u32)) -> DrawResult {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let (x0, x1) = index_range(values.len());
    let (y0, y1) = value_range(values);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20).x_label_area_size(60).y_label_area_size(80);
    builder.caption(spec.title, (FONT_FAMILY, CAPTION_SIZE));
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    let x_fmt = |x: &f64| label_at(labels, *x);
    let y_fmt = |y: &f64| fmt_amount(*y);
    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(ShapeStyle::from(&GRID))
        .bold_line_style(ShapeStyle::from(&GRID))
        .axis_style(ShapeStyle::from(&AXIS));
    mesh.x_desc(spec.x_desc)
        .y_desc(spec.y_desc)
        .axis_desc_style((FONT_FAMILY, DESC_SIZE))
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .x_labels(labels.len().min(12))
        .y_labels(8)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt);
    mesh.draw()?;

    let color = rgb(spec);
    chart.draw_series(LineSeries::new(
        values.iter().enumerate().map(|(i, &v)| (i as f64, v)),
        color.stroke_width(3),
    ))?;
    chart.draw_series(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Circle::new((i as f64, v), 4, color.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn draw_bars(spec: &ChartSpec, labels: &[String], values: &[f64], path: &Path, size: (u32, u32)) -> DrawResult {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let (x0, x1) = index_range(values.len());
    let (y0, y1) = value_range(values);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20).x_label_area_size(60).y_label_area_size(80);
    builder.caption(spec.title, (FONT_FAMILY, CAPTION_SIZE));
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    let x_fmt = |x: &f64| label_at(labels, *x);
    let y_fmt = |y: &f64| fmt_amount(*y);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .light_line_style(ShapeStyle::from(&GRID))
        .bold_line_style(ShapeStyle::from(&GRID))
        .axis_style(ShapeStyle::from(&AXIS));
    mesh.x_desc(spec.x_desc)
        .y_desc(spec.y_desc)
        .axis_desc_style((FONT_FAMILY, DESC_SIZE))
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .x_labels(labels.len().min(24))
        .y_labels(8)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt);
    mesh.draw()?;

    let color = rgb(spec);
    chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
        let x = i as f64;
        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, v)], color.filled())
    }))?;
    chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
        let x = i as f64;
        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, v)], AXIS.stroke_width(1))
    }))?;

    root.present()?;
    Ok(())
}

fn draw_horizontal_bars(
    spec: &ChartSpec,
    labels: &[String],
    values: &[f64],
    path: &Path,
    size: (u32, u32),
) -> DrawResult {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let (y0, y1) = index_range(values.len());
    let (x0, x1) = value_range(values);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20).x_label_area_size(60).y_label_area_size(160);
    builder.caption(spec.title, (FONT_FAMILY, CAPTION_SIZE));
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    let x_fmt = |x: &f64| fmt_amount(*x);
    let y_fmt = |y: &f64| label_at(labels, *y);
    let mut mesh = chart.configure_mesh();
    mesh.disable_y_mesh()
        .light_line_style(ShapeStyle::from(&GRID))
        .bold_line_style(ShapeStyle::from(&GRID))
        .axis_style(ShapeStyle::from(&AXIS));
    mesh.x_desc(spec.x_desc)
        .y_desc(spec.y_desc)
        .axis_desc_style((FONT_FAMILY, DESC_SIZE))
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .x_labels(8)
        .y_labels(labels.len().min(40))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt);
    mesh.draw()?;

    let color = rgb(spec);
    chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
        let y = i as f64;
        Rectangle::new([(0.0, y - 0.35), (v, y + 0.35)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}
