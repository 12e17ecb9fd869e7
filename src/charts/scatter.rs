//! Scatter of wind-speed distribution similarity against station distance.

use std::path::Path;

use plotters::prelude::*;

use super::{BLANKET_BLUE, chart_error, padded_max};
use crate::error::Result;

/// Renders RMSE (distribution similarity) against the distance between
/// each farm and its weather station. One point per turbine.
pub fn render_distance_rmse(rows: &[(String, f64, f64)], path: &Path) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let x_max = rows.iter().map(|r| r.1).fold(0.0, f64::max);
    let y_max = rows.iter().map(|r| r.2).fold(0.0, f64::max);

    let root = BitMapBackend::new(path, (680, 460)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .build_cartesian_2d(0.0..padded_max(x_max), 0.0..padded_max(y_max))
        .map_err(|e| chart_error(path, e))?;

    chart
        .configure_mesh()
        .x_desc("Distance between weather station and wind farm (km)")
        .y_desc("RMSE (distribution similarity)")
        .draw()
        .map_err(|e| chart_error(path, e))?;

    chart
        .draw_series(
            rows.iter()
                .map(|(_, distance, rmse)| Circle::new((*distance, *rmse), 5, BLANKET_BLUE.filled())),
        )
        .map_err(|e| chart_error(path, e))?;

    root.present().map_err(|e| chart_error(path, e))?;
    Ok(())
}
