//! Loss charts: the dual-axis losses-vs-hours figure per farm-year and
//! the scenario comparison lines.

use std::path::Path;

use plotters::prelude::*;

use super::{BLANKET_BLUE, SMART_ORANGE, chart_error, padded_max};
use crate::analysis::losses::SummaryTable;
use crate::error::Result;

/// Renders the dual-axis figure: production losses (%) on the left axis,
/// curtailed hours on the right, both against cut-in speed.
pub fn render_losses_vs_hours(table: &SummaryTable, path: &Path) -> Result<()> {
    let cut_ins: Vec<f64> = table.rows.iter().map(|r| r.cut_in_ms).collect();
    let (Some(&x_min), Some(&x_max)) = (cut_ins.first(), cut_ins.last()) else {
        return Ok(());
    };

    let loss_max = table
        .rows
        .iter()
        .map(|r| r.loss_blanket_pct.max(r.loss_smart_pct))
        .fold(0.0, f64::max);
    let hours_max = table
        .rows
        .iter()
        .map(|r| r.curtailed_blanket_hours.max(r.curtailed_smart_hours) as f64)
        .fold(0.0, f64::max);

    let root = BitMapBackend::new(path, (900, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&table.label, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .right_y_label_area_size(56)
        .build_cartesian_2d(x_min - 0.2..x_max + 0.2, 0.0..padded_max(loss_max))
        .map_err(|e| chart_error(path, e))?
        .set_secondary_coord(x_min - 0.2..x_max + 0.2, 0.0..padded_max(hours_max));

    chart
        .configure_mesh()
        .x_desc("Regulated cut-in speed (m/s)")
        .y_desc("Production losses (%)")
        .draw()
        .map_err(|e| chart_error(path, e))?;
    chart
        .configure_secondary_axes()
        .y_desc("Hours curtailed (hr/yr)")
        .draw()
        .map_err(|e| chart_error(path, e))?;

    let loss_points = |pick: fn(&crate::analysis::losses::CutInSummary) -> f64| {
        table
            .rows
            .iter()
            .map(move |r| (r.cut_in_ms, pick(r)))
            .collect::<Vec<_>>()
    };

    chart
        .draw_series(LineSeries::new(loss_points(|r| r.loss_blanket_pct), &BLANKET_BLUE))
        .map_err(|e| chart_error(path, e))?
        .label("Production Blanket (%)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLANKET_BLUE));
    chart
        .draw_series(
            table
                .rows
                .iter()
                .map(|r| Circle::new((r.cut_in_ms, r.loss_blanket_pct), 3, BLANKET_BLUE.filled())),
        )
        .map_err(|e| chart_error(path, e))?;

    chart
        .draw_series(LineSeries::new(loss_points(|r| r.loss_smart_pct), &SMART_ORANGE))
        .map_err(|e| chart_error(path, e))?
        .label("Production Smart (%)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], SMART_ORANGE));
    chart
        .draw_series(
            table
                .rows
                .iter()
                .map(|r| Circle::new((r.cut_in_ms, r.loss_smart_pct), 3, SMART_ORANGE.filled())),
        )
        .map_err(|e| chart_error(path, e))?;

    chart
        .draw_secondary_series(LineSeries::new(
            table
                .rows
                .iter()
                .map(|r| (r.cut_in_ms, r.curtailed_blanket_hours as f64)),
            &BLACK,
        ))
        .map_err(|e| chart_error(path, e))?
        .label("Hours Curtailed Blanket")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLACK));

    chart
        .draw_secondary_series(LineSeries::new(
            table
                .rows
                .iter()
                .map(|r| (r.cut_in_ms, r.curtailed_smart_hours as f64)),
            &GREEN,
        ))
        .map_err(|e| chart_error(path, e))?
        .label("Hours Curtailed Smart")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], GREEN));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| chart_error(path, e))?;

    root.present().map_err(|e| chart_error(path, e))?;
    Ok(())
}

/// Renders the scenario comparison: one metric against cut-in speed, one
/// line per scenario × strategy. `pick` selects the (blanket, smart)
/// values from each summary row.
pub fn render_scenario_comparison(
    tables: &[(String, SummaryTable)],
    y_desc: &str,
    pick: fn(&crate::analysis::losses::CutInSummary) -> (f64, f64),
    path: &Path,
) -> Result<()> {
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_max = 0.0f64;
    for (_, table) in tables {
        for r in &table.rows {
            x_min = x_min.min(r.cut_in_ms);
            x_max = x_max.max(r.cut_in_ms);
            let (b, s) = pick(r);
            y_max = y_max.max(b).max(s);
        }
    }
    if x_min > x_max {
        return Ok(());
    }

    let root = BitMapBackend::new(path, (900, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(64)
        .build_cartesian_2d(x_min - 0.2..x_max + 0.2, 0.0..padded_max(y_max))
        .map_err(|e| chart_error(path, e))?;

    chart
        .configure_mesh()
        .x_desc("Cut-in speed (m/s)")
        .y_desc(y_desc)
        .draw()
        .map_err(|e| chart_error(path, e))?;

    let palette = [BLANKET_BLUE, SMART_ORANGE, GREEN, BLACK];
    for (i, (label, table)) in tables.iter().enumerate() {
        let color = palette[i % palette.len()];

        chart
            .draw_series(LineSeries::new(
                table.rows.iter().map(|r| (r.cut_in_ms, pick(r).0)),
                &color,
            ))
            .map_err(|e| chart_error(path, e))?
            .label(format!("{label} – Blanket"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
        chart
            .draw_series(
                table
                    .rows
                    .iter()
                    .map(|r| TriangleMarker::new((r.cut_in_ms, pick(r).0), 5, color.filled())),
            )
            .map_err(|e| chart_error(path, e))?;

        chart
            .draw_series(LineSeries::new(
                table.rows.iter().map(|r| (r.cut_in_ms, pick(r).1)),
                &color,
            ))
            .map_err(|e| chart_error(path, e))?
            .label(format!("{label} – Smart"))
            .legend(move |(x, y)| Circle::new((x + 9, y), 4, color.filled()));
        chart
            .draw_series(
                table
                    .rows
                    .iter()
                    .map(|r| Circle::new((r.cut_in_ms, pick(r).1), 4, color.filled())),
            )
            .map_err(|e| chart_error(path, e))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| chart_error(path, e))?;

    root.present().map_err(|e| chart_error(path, e))?;
    Ok(())
}
