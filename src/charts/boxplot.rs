//! Box-plot panels for the seasonal loss study: scenarios × years, four
//! boxes per panel (focus cut-ins × strategies).

use std::path::Path;

use plotters::prelude::*;

use super::{BLANKET_BLUE, SMART_ORANGE, chart_error};
use crate::analysis::losses::Strategy;
use crate::analysis::stats::{FOCUS_CUT_INS, LossSample};
use crate::error::Result;

/// Box categories in panel order: cut-in major, strategy minor.
const CATEGORIES: [(f64, Strategy); 4] = [
    (FOCUS_CUT_INS[0], Strategy::Blanket),
    (FOCUS_CUT_INS[0], Strategy::Smart),
    (FOCUS_CUT_INS[1], Strategy::Blanket),
    (FOCUS_CUT_INS[1], Strategy::Smart),
];

fn category_label(index: usize) -> String {
    let (cut, strategy) = CATEGORIES[index];
    format!("{cut:.1} {}", strategy.label())
}

fn segment_label(value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) if *i < CATEGORIES.len() => {
            category_label(*i)
        }
        _ => String::new(),
    }
}

/// Renders the panel figure: one row per scenario, one column per year.
///
/// The y-range is shared within a scenario row (loss magnitudes differ
/// between the full and peak seasons, so sharing across rows would
/// flatten the peak-season boxes).
pub fn render_loss_boxplots(samples: &[LossSample], y_desc: &str, path: &Path) -> Result<()> {
    let mut scenarios: Vec<String> = samples.iter().map(|s| s.scenario.clone()).collect();
    scenarios.sort();
    scenarios.dedup();
    let mut years: Vec<i32> = samples.iter().map(|s| s.year).collect();
    years.sort_unstable();
    years.dedup();
    if scenarios.is_empty() || years.is_empty() {
        return Ok(());
    }

    let root = BitMapBackend::new(path, (460 * years.len() as u32, 420 * scenarios.len() as u32))
        .into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(path, e))?;
    let panels = root.split_evenly((scenarios.len(), years.len()));

    for (row, scenario) in scenarios.iter().enumerate() {
        let row_max = samples
            .iter()
            .filter(|s| &s.scenario == scenario)
            .map(|s| s.value)
            .fold(0.0, f64::max);
        let y_max = if row_max <= 0.0 { 1.0f32 } else { (row_max * 1.15) as f32 };

        for (col, &year) in years.iter().enumerate() {
            let area = &panels[row * years.len() + col];
            let mut chart = ChartBuilder::on(area)
                .caption(format!("{scenario} – {year}"), ("sans-serif", 18))
                .margin(10)
                .x_label_area_size(32)
                .y_label_area_size(48)
                .build_cartesian_2d((0..CATEGORIES.len()).into_segmented(), 0f32..y_max)
                .map_err(|e| chart_error(path, e))?;

            chart
                .configure_mesh()
                .x_label_formatter(&segment_label)
                .y_desc(if col == 0 { y_desc } else { "" })
                .draw()
                .map_err(|e| chart_error(path, e))?;

            for (i, &(cut_in, strategy)) in CATEGORIES.iter().enumerate() {
                let values: Vec<f64> = samples
                    .iter()
                    .filter(|s| {
                        &s.scenario == scenario
                            && s.year == year
                            && s.strategy == strategy
                            && (s.cut_in_ms - cut_in).abs() < 1e-9
                    })
                    .map(|s| s.value)
                    .collect();
                if values.is_empty() {
                    continue;
                }

                let color = match strategy {
                    Strategy::Blanket => BLANKET_BLUE,
                    Strategy::Smart => SMART_ORANGE,
                };
                chart
                    .draw_series([Boxplot::new_vertical(
                        SegmentValue::CenterOf(i),
                        &Quartiles::new(&values),
                    )
                    .width(26)
                    .style(color.filled())])
                    .map_err(|e| chart_error(path, e))?;
            }
        }
    }

    root.present().map_err(|e| chart_error(path, e))?;
    Ok(())
}
