//! Grouped-bar panels of monthly modeled vs. actual energy.

use std::path::Path;

use plotters::prelude::*;

use super::{ACTUAL_NAVY, MODELED_GREEN, chart_error, padded_max};
use crate::analysis::monthly::{MONTH_LABELS, MONTHS, MonthlyTotals};
use crate::error::Result;

/// Renders one panel per year, each with paired bars (actual, modeled)
/// for July–September. Energy is shown in GWh.
pub fn render_monthly_bars(totals: &[MonthlyTotals], path: &Path) -> Result<()> {
    if totals.is_empty() {
        return Ok(());
    }

    let to_gwh = 1.0 / 1000.0;
    let y_max = totals
        .iter()
        .flat_map(|t| {
            MONTHS
                .iter()
                .map(move |&m| t.modeled(m).max(t.actual(m)) * to_gwh)
        })
        .fold(0.0, f64::max);

    let cols = totals.len().min(2).max(1);
    let rows = totals.len().div_ceil(cols);
    let root = BitMapBackend::new(path, (620 * cols as u32, 420 * rows as u32)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(path, e))?;
    let panels = root.split_evenly((rows, cols));

    for (panel, t) in panels.iter().zip(totals.iter()) {
        let mut chart = ChartBuilder::on(panel)
            .caption(t.year.to_string(), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(32)
            .y_label_area_size(52)
            .build_cartesian_2d(0.0..MONTHS.len() as f64, 0.0..padded_max(y_max))
            .map_err(|e| chart_error(path, e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(2 * MONTHS.len() + 1)
            .x_label_formatter(&|x| {
                let idx = x.floor() as usize;
                // Grid positions land on bar-group centers
                if (x - (idx as f64 + 0.5)).abs() < 0.26 {
                    MONTH_LABELS.get(idx).copied().unwrap_or("").to_string()
                } else {
                    String::new()
                }
            })
            .y_desc("Energy (GWh)")
            .draw()
            .map_err(|e| chart_error(path, e))?;

        let actual_bars = MONTHS.iter().enumerate().map(|(i, &m)| {
            let x = i as f64;
            Rectangle::new(
                [(x + 0.12, 0.0), (x + 0.48, t.actual(m) * to_gwh)],
                ACTUAL_NAVY.filled(),
            )
        });
        chart
            .draw_series(actual_bars)
            .map_err(|e| chart_error(path, e))?
            .label("Actual (AESO)")
            .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], ACTUAL_NAVY.filled()));

        let modeled_bars = MONTHS.iter().enumerate().map(|(i, &m)| {
            let x = i as f64;
            Rectangle::new(
                [(x + 0.52, 0.0), (x + 0.88, t.modeled(m) * to_gwh)],
                MODELED_GREEN.filled(),
            )
        });
        chart
            .draw_series(modeled_bars)
            .map_err(|e| chart_error(path, e))?
            .label("Modeled")
            .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], MODELED_GREEN.filled()));

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
