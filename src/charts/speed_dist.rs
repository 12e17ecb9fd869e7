//! Wind-speed distribution panels: modeled vs. back-calculated density
//! polygons per year.

use std::path::Path;

use plotters::prelude::*;

use super::{BLANKET_BLUE, SMART_ORANGE, chart_error, padded_max};
use crate::analysis::metrics::density_histogram;
use crate::error::Result;

/// Speeds covered by the distribution chart (m/s).
const SPEED_MIN: f64 = 4.0;
const SPEED_MAX: f64 = 12.0;

/// 1 m/s bins give the polygon enough resolution to show the mode shift.
fn chart_edges() -> Vec<f64> {
    (0..=((SPEED_MAX - SPEED_MIN) as usize))
        .map(|i| SPEED_MIN + i as f64)
        .collect()
}

/// Per-year speed samples for one turbine: modeled and back-calculated.
#[derive(Debug, Clone)]
pub struct SpeedDistYear {
    pub year: i32,
    pub modeled: Vec<f64>,
    pub backcast: Vec<f64>,
}

/// Renders one panel per year with two density polygons: back-calculated
/// (blue) and modeled (orange).
pub fn render_speed_distributions(
    asset: &str,
    years: &[SpeedDistYear],
    path: &Path,
) -> Result<()> {
    if years.is_empty() {
        return Ok(());
    }

    let edges = chart_edges();
    let centers: Vec<f64> = edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();

    let densities: Vec<(i32, Vec<f64>, Vec<f64>)> = years
        .iter()
        .map(|y| {
            (
                y.year,
                density_histogram(&y.backcast, &edges),
                density_histogram(&y.modeled, &edges),
            )
        })
        .collect();
    let y_max = densities
        .iter()
        .flat_map(|(_, b, m)| b.iter().chain(m.iter()).copied())
        .fold(0.0, f64::max);

    let cols = years.len().min(2).max(1);
    let rows = years.len().div_ceil(cols);
    let root = BitMapBackend::new(path, (560 * cols as u32, 400 * rows as u32)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(path, e))?;
    let panels = root.split_evenly((rows, cols));

    for (panel, (year, backcast, modeled)) in panels.iter().zip(densities.iter()) {
        let mut chart = ChartBuilder::on(panel)
            .caption(format!("{asset} – {year}"), ("sans-serif", 18))
            .margin(10)
            .x_label_area_size(36)
            .y_label_area_size(48)
            .build_cartesian_2d(SPEED_MIN..SPEED_MAX, 0.0..padded_max(y_max))
            .map_err(|e| chart_error(path, e))?;

        chart
            .configure_mesh()
            .x_desc("Wind speed (m/s)")
            .y_desc("Rel. freq.")
            .draw()
            .map_err(|e| chart_error(path, e))?;

        chart
            .draw_series(LineSeries::new(
                centers.iter().copied().zip(backcast.iter().copied()),
                BLANKET_BLUE.stroke_width(2),
            ))
            .map_err(|e| chart_error(path, e))?
            .label("Back-calc")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLANKET_BLUE));

        chart
            .draw_series(LineSeries::new(
                centers.iter().copied().zip(modeled.iter().copied()),
                SMART_ORANGE.stroke_width(2),
            ))
            .map_err(|e| chart_error(path, e))?
            .label("Modeled")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], SMART_ORANGE));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| chart_error(path, e))?;
    }

    root.present().map_err(|e| chart_error(path, e))?;
    Ok(())
}
