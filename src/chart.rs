use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::config::ChartConfig;
use crate::error::RenderError;
use crate::model::aggregate::MonthlyAggregate;
use crate::model::period::Period;

const SERIES_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const POINT_RADIUS: u32 = 4;
const LINE_WIDTH: u32 = 2;
const Y_TICKS: usize = 6;
const X_LABEL_STEP_MONTHS: usize = 3;
const MAX_X_LABELS: usize = 16;
const FONT: &str = "sans-serif";

/// Draw the series and commit it to `cfg.output_path`.
pub fn render_chart(series: &[MonthlyAggregate], cfg: &ChartConfig) -> Result<PathBuf, RenderError> {
    let svg = render_svg(series, cfg)?;
    write_atomically(&cfg.output_path, &svg)?;
    tracing::info!(
        path = %cfg.output_path.display(),
        bytes = svg.len(),
        months = series.len(),
        "Wrote chart"
    );
    Ok(cfg.output_path.clone())
}

/// Render the monthly series to an SVG document. Pure: same input, same bytes.
pub fn render_svg(series: &[MonthlyAggregate], cfg: &ChartConfig) -> Result<String, RenderError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first.period, last.period),
        _ => return Err(RenderError::EmptySeries),
    };
    let points = plot_points(series)?;
    let (y_min, y_max) = y_bounds(&points);
    let x_range = (first.month_index() - 1)..(last.month_index() + 1);
    let x_labels = x_label_points(first, last);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (cfg.width, cfg.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(cfg.title.as_str(), (FONT, 20))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range.with_key_points(x_labels), y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .label_style((FONT, 14))
            .x_label_formatter(&|idx| Period::from_month_index(*idx).to_string())
            .y_labels(Y_TICKS)
            .y_label_formatter(&|v| format!("{:.2}", v))
            .x_desc(cfg.x_label.as_str())
            .y_desc(cfg.y_label.as_str())
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                SERIES_COLOR.stroke_width(LINE_WIDTH),
            ))
            .map_err(draw_err)?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), POINT_RADIUS, SERIES_COLOR.filled())),
            )
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }
    Ok(svg)
}

/// Replace `path` with `contents` without ever exposing a partial file.
///
/// Parent directories are created. Data goes to a hidden temp file next to
/// the target and is renamed into place; the temp file is removed on failure.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|source| RenderError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart.svg".to_string());
    let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let result = write_and_sync(&tmp_path, contents).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(source) = result {
        if let Err(e) = fs::remove_file(&tmp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %tmp_path.display(), error = %e, "Failed to remove temp chart file");
            }
        }
        return Err(RenderError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn write_and_sync(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn plot_points(series: &[MonthlyAggregate]) -> Result<Vec<(i32, f64)>, RenderError> {
    series
        .iter()
        .map(|agg| {
            agg.mean_diff
                .to_f64()
                .filter(|v| v.is_finite())
                .map(|v| (agg.period.month_index(), v))
                .ok_or(RenderError::Unplottable(agg.period))
        })
        .collect()
}

/// Value range padded by 5%; a flat series gets +/-1.
fn y_bounds(points: &[(i32, f64)]) -> (f64, f64) {
    let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = span * 0.05;
    (min - pad, max + pad)
}

/// Month indices that get an x-axis label: quarterly from the first period,
/// widened so no more than `MAX_X_LABELS` are drawn.
pub fn x_label_points(first: Period, last: Period) -> Vec<i32> {
    let start = first.month_index();
    let end = last.month_index().max(start);
    let span = (end - start) as usize;
    let mut step = X_LABEL_STEP_MONTHS;
    while span / step + 1 > MAX_X_LABELS {
        step *= 2;
    }
    (start..=end).step_by(step).collect()
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}
