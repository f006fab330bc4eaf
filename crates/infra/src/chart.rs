//! Variance bar chart (one bar per report row).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};

use cyclecount_inventory::VarianceReport;

use crate::error::{InfraError, InfraResult};

/// File name of the chart written next to the final report.
pub const DEFAULT_CHART_FILE: &str = "inventory_report.png";

/// Pixel height of every chart.
pub const CHART_HEIGHT: u32 = 480;

const FONT_FAMILY: &str = "sans-serif";
static FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Pixel width of a chart with `bars` bars.
pub fn chart_width(bars: usize) -> u32 {
    let bars = u32::try_from(bars).unwrap_or(u32::MAX);
    bars.saturating_mul(36).saturating_add(120).clamp(640, 4096)
}

/// Render `report` as a PNG bar chart at `path`.
///
/// Rows that were not counted are drawn at zero. Shortages are red, overages blue.
pub fn render_variance_chart(report: &VarianceReport, path: &Path) -> InfraResult<PathBuf> {
    let bars: Vec<(String, i64)> = report
        .rows()
        .iter()
        .map(|r| (r.sku().to_string(), r.variance.unwrap_or(0)))
        .collect();

    // The bitmap backend picks the encoder from the extension, so keep `.png` last.
    let tmp = path.with_file_name(format!(
        ".{}.partial.png",
        path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default()
    ));

    let drawn = register_bundled_font()
        .and_then(|()| draw(&bars, &tmp))
        .and_then(|()| {
            std::fs::rename(&tmp, path).map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        });
    if let Err(e) = drawn {
        let _ = std::fs::remove_file(&tmp);
        return Err(InfraError::Chart {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }

    tracing::info!(path = %path.display(), bars = bars.len(), "rendered variance chart");
    Ok(path.to_path_buf())
}

/// Text is drawn with a font shipped in the crate, so rendering never depends
/// on what the host has installed.
fn register_bundled_font() -> Result<(), Box<dyn std::error::Error>> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT)
                .map_err(|_| "bundled chart font could not be parsed".to_string())
        })
        .clone()
        .map_err(Into::into)
}

/// Y-axis bounds with one unit of headroom, always including zero.
fn variance_bounds(bars: &[(String, i64)]) -> (i64, i64) {
    let low = bars.iter().map(|(_, v)| *v).min().unwrap_or(0).min(0);
    let high = bars.iter().map(|(_, v)| *v).max().unwrap_or(0).max(0);
    (low.saturating_sub(1), high.saturating_add(1))
}

fn draw(bars: &[(String, i64)], path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (chart_width(bars.len()), CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    // Plotted as f64: plotters' integer tick search overflows on ranges near i64 limits.
    let (low, high) = variance_bounds(bars);
    let slots = bars.len().max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Cycle count variance by SKU", (FONT_FAMILY, 24))
        .margin(16)
        .x_label_area_size(56)
        .y_label_area_size(72)
        .build_cartesian_2d((0..slots).into_segmented(), low as f64..high as f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .label_style((FONT_FAMILY, 14))
        .axis_desc_style((FONT_FAMILY, 16))
        .x_desc("SKU")
        .y_desc("Variance (units)")
        .x_labels(slots)
        .x_label_formatter(&|slot| match slot {
            SegmentValue::CenterOf(i) => bars.get(*i).map(|(sku, _)| sku.clone()).unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, variance))| {
        let color = if *variance < 0 { RED } else { BLUE };
        let (bottom, top) = if *variance < 0 { (*variance, 0) } else { (0, *variance) };
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), bottom as f64),
                (SegmentValue::Exact(i + 1), top as f64),
            ],
            color.filled(),
        );
        bar.set_margin(0, 0, 4, 4);
        bar
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(values: &[i64]) -> Vec<(String, i64)> {
        values.iter().map(|v| (format!("S{v}"), *v)).collect()
    }

    #[test]
    fn bounds_include_zero_with_headroom() {
        assert_eq!(variance_bounds(&[]), (-1, 1));
        assert_eq!(variance_bounds(&bars(&[3, 7])), (-1, 8));
        assert_eq!(variance_bounds(&bars(&[-4, 2])), (-5, 3));
    }

    #[test]
    fn bounds_saturate_at_integer_limits() {
        assert_eq!(variance_bounds(&bars(&[i64::MAX])), (-1, i64::MAX));
        assert_eq!(variance_bounds(&bars(&[i64::MIN, i64::MAX])), (i64::MIN, i64::MAX));
    }

    #[test]
    fn width_grows_with_bars_within_limits() {
        assert_eq!(chart_width(0), 640);
        assert_eq!(chart_width(30), 1200);
        assert_eq!(chart_width(10_000), 4096);
        assert_eq!(chart_width(usize::MAX), 4096);
    }

    #[test]
    fn bundled_font_registers() {
        register_bundled_font().unwrap();
        register_bundled_font().unwrap();
    }
}
