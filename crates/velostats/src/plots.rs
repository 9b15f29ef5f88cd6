// =============================================================================
// Diagnostic Plots
// =============================================================================
//
// PNG rendering of the three diagnostic views the analysis produces:
//
//   - boxplots of the outcome per factor level
//   - residuals against fitted values (dashed zero line)
//   - normal Q-Q plot of the residuals (dashed 45-degree line)
//
// All charts render at 900x675 through the plotters bitmap backend.
//
// =============================================================================

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

const PLOT_SIZE: (u32, u32) = (900, 675);
const CAPTION_FONT: (&str, u32) = ("sans-serif", 26);
const LABEL_FONT: (&str, u32) = ("sans-serif", 18);

/// Vertical boxplots of `groups` (one per entry of `levels`).
pub fn boxplot_by_factor(
    path: &Path,
    caption: &str,
    x_label: &str,
    y_label: &str,
    levels: &[String],
    groups: &[Vec<f64>],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let cats: Vec<&str> = levels.iter().map(String::as_str).collect();
    let quartiles: Vec<Quartiles> = groups.iter().map(|g| Quartiles::new(g)).collect();

    // The y range has to cover the whisker fences, not just the data
    let mut y_lo = f32::INFINITY;
    let mut y_hi = f32::NEG_INFINITY;
    for q in &quartiles {
        for v in q.values() {
            y_lo = y_lo.min(v);
            y_hi = y_hi.max(v);
        }
    }
    let pad = (y_hi - y_lo).max(1.0) * 0.08;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, CAPTION_FONT)
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(60)
        .build_cartesian_2d(cats[..].into_segmented(), (y_lo - pad)..(y_hi + pad))?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .axis_desc_style(LABEL_FONT)
        .disable_x_mesh()
        .draw()?;

    chart.draw_series(cats.iter().zip(&quartiles).map(|(cat, q)| {
        Boxplot::new_vertical(SegmentValue::CenterOf(cat), q)
            .width(28)
            .whisker_width(0.5)
            .style(BLUE)
    }))?;

    root.present()?;
    Ok(())
}

/// Scatter of residuals against fitted values with a dashed zero line.
pub fn residuals_vs_fitted(
    path: &Path,
    fitted: &[f64],
    residuals: &[f64],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = padded_range(fitted);
    let (y_lo, y_hi) = padded_range(residuals);
    // Keep the zero line inside the frame even for one-sided residuals
    let y_lo = y_lo.min(-0.05 * (y_hi - y_lo));
    let y_hi = y_hi.max(0.05 * (y_hi - y_lo));

    let mut chart = ChartBuilder::on(&root)
        .caption("Residuals vs fitted", CAPTION_FONT)
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Fitted values")
        .y_desc("Residuals")
        .axis_desc_style(LABEL_FONT)
        .draw()?;

    chart.draw_series(
        fitted
            .iter()
            .zip(residuals)
            .map(|(&x, &y)| Circle::new((x, y), 4, BLUE.mix(0.5).filled())),
    )?;

    chart.draw_series(DashedLineSeries::new(
        [(x_lo, 0.0), (x_hi, 0.0)],
        8,
        6,
        BLACK.into(),
    ))?;

    root.present()?;
    Ok(())
}

/// Normal Q-Q plot: (theoretical, sample) quantile pairs with the dashed
/// 45-degree reference line.
pub fn qq_plot(path: &Path, points: &[(f64, f64)]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let all: Vec<f64> = points.iter().flat_map(|&(t, s)| [t, s]).collect();
    let (lo, hi) = padded_range(&all);

    let mut chart = ChartBuilder::on(&root)
        .caption("Normal Q-Q plot of residuals", CAPTION_FONT)
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Theoretical quantiles")
        .y_desc("Sample quantiles")
        .axis_desc_style(LABEL_FONT)
        .draw()?;

    chart.draw_series(DashedLineSeries::new([(lo, lo), (hi, hi)], 8, 6, BLACK.into()))?;

    chart.draw_series(
        points
            .iter()
            .map(|&(t, s)| Circle::new((t, s), 4, BLUE.mix(0.7).filled())),
    )?;

    root.present()?;
    Ok(())
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = (hi - lo).max(1e-9) * 0.08;
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_boxplot_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("box.png");
        boxplot_by_factor(
            &path,
            "Distribution of points by rider class",
            "Rider class",
            "Points",
            &["climber".to_string(), "sprinter".to_string()],
            &[vec![10.0, 12.0, 30.0, 34.0], vec![40.0, 44.0, 8.0, 6.0]],
        )
        .unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_residual_plot_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resid.png");
        residuals_vs_fitted(
            &path,
            &[11.0, 11.0, 32.0, 32.0, 42.0, 42.0],
            &[-1.0, 1.0, -2.0, 2.0, -2.0, 2.0],
        )
        .unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_qq_plot_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("qq.png");
        qq_plot(&path, &[(-1.0, -1.1), (0.0, 0.05), (1.0, 0.9)]).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
