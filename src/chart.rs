use std::path::Path;

use anyhow::{anyhow, bail, Context};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::models::BurndownSeries;

/// Display parameters for one burndown chart.
#[derive(Debug, Clone)]
pub struct ChartOptions<'a> {
    pub title: &'a str,
    pub y_label: &'a str,
    pub output_path: &'a Path,
    pub color: RGBColor,
}

const IDEAL_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Accepts a handful of color names or a `#rrggbb` hex string.
pub fn parse_color(value: &str) -> anyhow::Result<RGBColor> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            bail!("expected a color in the form #rrggbb, got '{value}'");
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| anyhow!("invalid hex color '{value}'"))
        };
        return Ok(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?));
    }

    let color = match value.to_ascii_lowercase().as_str() {
        "blue" => RGBColor(0, 0, 255),
        "green" => RGBColor(0, 128, 0),
        "red" => RGBColor(255, 0, 0),
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "black" => RGBColor(0, 0, 0),
        "gray" | "grey" => IDEAL_COLOR,
        "cyan" => RGBColor(0, 191, 255),
        "magenta" => RGBColor(255, 0, 255),
        other => bail!("unknown color '{other}'"),
    };
    Ok(color)
}

/// Y-axis bounds covering both trajectories. The floor stays at zero unless
/// the actual line went negative.
fn calculate_y_range(series: &BurndownSeries) -> (f64, f64) {
    let values = series.ideal.iter().chain(series.actual.iter()).copied();
    let (min_val, max_val) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let padding = ((max_val - min_val) * 0.1).max(1.0);
    let y_min = if min_val < 0.0 { min_val - padding } else { 0.0 };
    (y_min, max_val + padding)
}

/// Draws the ideal and actual trajectories, shades the gap between them and
/// writes the PNG to `options.output_path`.
pub fn render_burndown_chart(series: &BurndownSeries, options: &ChartOptions<'_>) -> anyhow::Result<()> {
    if series.is_empty() {
        bail!("[render_burndown_chart] cannot render a chart over an empty date range");
    }

    if let Some(parent) = options.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let labels: Vec<String> = series.dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    let (y_min, y_max) = calculate_y_range(series);
    let x_max = (series.len() - 1).max(1);
    let color = options.color;

    let root = BitMapBackend::new(options.output_path, (1500, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(options.title, ("sans-serif", 40))
        .margin(30)
        .x_label_area_size(90)
        .y_label_area_size(90)
        .build_cartesian_2d(0..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(options.y_label)
        .x_labels(series.len().min(15))
        .y_labels(10)
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 20))
        .x_label_formatter(&|x| labels.get(*x).cloned().unwrap_or_default())
        .y_label_formatter(&|y| format!("{y:.1}"))
        .draw()?;

    let mut outline: Vec<(usize, f64)> = series.ideal.iter().copied().enumerate().collect();
    outline.extend(series.actual.iter().copied().enumerate().rev());
    chart.draw_series(std::iter::once(Polygon::new(outline, color.mix(0.1).filled())))?;

    chart
        .draw_series(DashedLineSeries::new(
            series.ideal.iter().copied().enumerate(),
            10,
            6,
            IDEAL_COLOR.stroke_width(2),
        ))?
        .label("Ideal Burndown")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], IDEAL_COLOR.stroke_width(2)));

    chart
        .draw_series(
            LineSeries::new(series.actual.iter().copied().enumerate(), color.stroke_width(3))
                .point_size(4),
        )?
        .label("Actual Burndown")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write {}", options.output_path.display()))?;

    log::info!("chart saved as {}", options.output_path.display());
    Ok(())
}

/// Opens a rendered chart with the platform's default image viewer.
pub fn present(path: &Path) -> anyhow::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    let status = std::process::Command::new(opener)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch {opener} for {}", path.display()))?;

    if !status.success() {
        log::warn!("{} exited with {} while opening {}", opener, status, path.display());
    }
    Ok(())
}
