//! CSV export for model rows, back-cast rows, and study tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::analysis::losses::SummaryTable;
use crate::analysis::metrics::ErrorMetrics;
use crate::analysis::stats::{GroupedStats, WideProductionRow};
use crate::backcast::BackcastRow;
use crate::blanket::CurtailedRow;
use crate::error::{Result, StudyError};
use crate::tables::model::cut_in_label;

/// Output file name for a modeled farm-year.
pub fn model_file_name(asset: &str, year: i32) -> String {
    format!("{asset}_{year}_power_output.csv")
}

/// Output file name for a back-cast farm-year.
pub fn backcast_file_name(asset: &str, year: i32) -> String {
    format!("{asset}_{year}_power_backcalc.csv")
}

/// Output file name for a farm-year loss summary.
pub fn summary_file_name(asset: &str, year: i32) -> String {
    format!("summary_{asset}_{year}.csv")
}

/// Writes model rows as CSV to any writer.
///
/// The header is `time,temp_c,precip_mm,wind_ms,w_hub,power_kw` followed
/// by one `blanket_<v>` and one `smart_<v>` column per cut-in. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_model_csv(
    rows: &[CurtailedRow],
    cut_ins: &[f64],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header: Vec<String> = ["time", "temp_c", "precip_mm", "wind_ms", "w_hub", "power_kw"]
        .iter()
        .map(ToString::to_string)
        .collect();
    for &v in cut_ins {
        header.push(format!("blanket_{}", cut_in_label(v)));
    }
    for &v in cut_ins {
        header.push(format!("smart_{}", cut_in_label(v)));
    }
    wtr.write_record(&header)?;

    for r in rows {
        let mut record: Vec<String> = vec![
            r.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            optional_cell(r.temp_c),
            optional_cell(r.precip_mm),
            format!("{:.4}", r.wind_ms),
            format!("{:.4}", r.w_hub),
            format!("{:.4}", r.power_kw),
        ];
        for v in &r.blanket_kw {
            record.push(format!("{v:.4}"));
        }
        for v in &r.smart_kw {
            record.push(format!("{v:.4}"));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes model rows to a file path.
///
/// # Errors
///
/// Returns `Io` if file creation or writing fails.
pub fn export_model_csv(rows: &[CurtailedRow], cut_ins: &[f64], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| StudyError::io(path, e))?;
    write_model_csv(rows, cut_ins, io::BufWriter::new(file)).map_err(|e| StudyError::io(path, e))
}

/// Writes back-cast rows as CSV to any writer.
///
/// Unresolved wind speeds (power outside the curve) leave the `w_hub`
/// cell empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_backcast_csv(rows: &[BackcastRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["time", "power_kw", "w_hub"])?;
    for r in rows {
        wtr.write_record(&[
            r.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.4}", r.power_kw),
            optional_cell(r.w_hub),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes back-cast rows to a file path.
///
/// # Errors
///
/// Returns `Io` if file creation or writing fails.
pub fn export_backcast_csv(rows: &[BackcastRow], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| StudyError::io(path, e))?;
    write_backcast_csv(rows, io::BufWriter::new(file)).map_err(|e| StudyError::io(path, e))
}

/// Summary-table column header, shared with the read-back path.
const SUMMARY_HEADER: [&str; 11] = [
    "Cut-in (m/s)",
    "Production blanket %",
    "Production smart %",
    "Annual Losses blanket (MWh)",
    "Annual Losses smart (MWh)",
    "CAD/yr blanket",
    "CAD/yr smart",
    "Time Curtailed blanket %",
    "Time Curtailed smart %",
    "Time Curtailed blanket hr",
    "Time Curtailed smart hr",
];

/// Writes a loss summary as CSV. Percentages and MWh round to two
/// decimals, revenue to whole dollars.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summary_csv(table: &SummaryTable, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SUMMARY_HEADER)?;
    for r in &table.rows {
        wtr.write_record(&[
            format!("{:.1}", r.cut_in_ms),
            format!("{:.2}", r.loss_blanket_pct),
            format!("{:.2}", r.loss_smart_pct),
            format!("{:.2}", r.losses_blanket_mwh),
            format!("{:.2}", r.losses_smart_mwh),
            format!("{:.0}", r.revenue_blanket_cad),
            format!("{:.0}", r.revenue_smart_cad),
            format!("{:.2}", r.curtailed_blanket_pct),
            format!("{:.2}", r.curtailed_smart_pct),
            r.curtailed_blanket_hours.to_string(),
            r.curtailed_smart_hours.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a loss summary to a file path.
///
/// # Errors
///
/// Returns `Io` if file creation or writing fails.
pub fn export_summary_csv(table: &SummaryTable, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| StudyError::io(path, e))?;
    write_summary_csv(table, io::BufWriter::new(file)).map_err(|e| StudyError::io(path, e))
}

/// Writes per-year error metrics as CSV.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_metrics_csv(
    rows: &[(i32, ErrorMetrics)],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["Year", "MAPE %", "RMSE (MWh)", "Turbines"])?;
    for (year, m) in rows {
        wtr.write_record(&[
            year.to_string(),
            format!("{:.2}", m.mape_pct),
            format!("{:.2}", m.rmse),
            m.samples.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes grouped box statistics as CSV.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_stats_csv(groups: &[GroupedStats], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "Season",
        "Year",
        "Cut",
        "Type",
        "Min",
        "Q1",
        "Mean",
        "Median",
        "Q3",
        "Max",
        "IQR",
        "LB (1.5×IQR)",
        "UB (1.5×IQR)",
        "N",
    ])?;
    for g in groups {
        let s = &g.stats;
        wtr.write_record(&[
            g.scenario.clone(),
            g.year.to_string(),
            format!("{:.1}", g.cut_in_ms),
            g.strategy.label().to_string(),
            format!("{:.4}", s.min),
            format!("{:.4}", s.q1),
            format!("{:.4}", s.mean),
            format!("{:.4}", s.median),
            format!("{:.4}", s.q3),
            format!("{:.4}", s.max),
            format!("{:.4}", s.iqr),
            format!("{:.4}", s.lower_bound),
            format!("{:.4}", s.upper_bound),
            s.n.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the wide-format production-loss table as CSV.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_wide_production_csv(
    rows: &[WideProductionRow],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "Year",
        "Turbine",
        "Blanket_5.5",
        "Blanket_8",
        "Smart_5.5",
        "Smart_8",
    ])?;
    for r in rows {
        let mut record = vec![r.year.to_string(), r.turbine.clone()];
        for v in r.values {
            record.push(optional_cell(v));
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a scatter table of distribution RMSE against station distance.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_distance_rmse_csv(
    rows: &[(String, f64, f64)],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["Turbine", "Distance_km", "RMSE"])?;
    for (turbine, distance, rmse) in rows {
        wtr.write_record(&[
            turbine.clone(),
            format!("{distance:.2}"),
            format!("{rmse:.6}"),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn optional_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_row(hour: u32) -> CurtailedRow {
        CurtailedRow {
            time: NaiveDate::from_ymd_opt(2020, 8, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            temp_c: Some(14.5),
            precip_mm: None,
            wind_ms: 4.2,
            w_hub: 5.3,
            power_kw: 120.0,
            blanket_kw: vec![0.0, 120.0],
            smart_kw: vec![120.0, 120.0],
        }
    }

    #[test]
    fn model_header_carries_the_ladder() {
        let mut buf = Vec::new();
        write_model_csv(&[make_row(0)], &[5.0, 6.0], &mut buf).expect("write should succeed");
        let output = String::from_utf8(buf).expect("valid UTF-8");
        let first_line = output.lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "time,temp_c,precip_mm,wind_ms,w_hub,power_kw,blanket_5.0,blanket_6.0,smart_5.0,smart_6.0"
        );
    }

    #[test]
    fn model_row_count_matches() {
        let rows: Vec<CurtailedRow> = (0..24).map(make_row).collect();
        let mut buf = Vec::new();
        write_model_csv(&rows, &[5.0, 6.0], &mut buf).expect("write should succeed");
        let output = String::from_utf8(buf).expect("valid UTF-8");
        assert_eq!(output.lines().count(), 25);
    }

    #[test]
    fn model_output_is_deterministic() {
        let rows: Vec<CurtailedRow> = (0..5).map(make_row).collect();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_model_csv(&rows, &[5.0, 6.0], &mut buf1).expect("first write");
        write_model_csv(&rows, &[5.0, 6.0], &mut buf2).expect("second write");
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn model_round_trips_through_the_reader() {
        let rows: Vec<CurtailedRow> = (0..3).map(make_row).collect();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write_model_csv(&rows, &[5.0, 6.0], &mut file).expect("write should succeed");

        let series =
            crate::tables::model::read_model_csv(file.path()).expect("read should succeed");
        assert_eq!(series.cut_ins, vec![5.0, 6.0]);
        assert_eq!(series.rows.len(), 3);
        assert_eq!(series.rows[0].blanket_kw, vec![0.0, 120.0]);
        assert_eq!(series.rows[0].precip_mm, None);
    }

    #[test]
    fn backcast_leaves_unresolved_cells_empty() {
        let rows = vec![
            BackcastRow {
                time: NaiveDate::from_ymd_opt(2020, 8, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                power_kw: 2000.0,
                w_hub: None,
            },
        ];
        let mut buf = Vec::new();
        write_backcast_csv(&rows, &mut buf).expect("write should succeed");
        let output = String::from_utf8(buf).expect("valid UTF-8");
        assert!(output.lines().nth(1).unwrap_or("").ends_with(','));
    }

    #[test]
    fn summary_round_trips_through_the_reader() {
        use crate::analysis::losses::CutInSummary;

        let table = SummaryTable {
            label: "Test Farm".to_string(),
            rows: vec![CutInSummary {
                cut_in_ms: 5.5,
                loss_blanket_pct: 1.23,
                loss_smart_pct: 0.45,
                losses_blanket_mwh: 321.5,
                losses_smart_mwh: 120.25,
                revenue_blanket_cad: 15000.0,
                revenue_smart_cad: 6000.0,
                curtailed_blanket_pct: 4.5,
                curtailed_smart_pct: 1.5,
                curtailed_blanket_hours: 394,
                curtailed_smart_hours: 131,
            }],
        };
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write_summary_csv(&table, &mut file).expect("write should succeed");

        let read = SummaryTable::from_csv_file(file.path(), "Test Farm")
            .expect("read should succeed");
        assert_eq!(read.rows.len(), 1);
        assert_eq!(read.rows[0].cut_in_ms, 5.5);
        assert_eq!(read.rows[0].curtailed_blanket_hours, 394);
        assert!((read.rows[0].losses_blanket_mwh - 321.5).abs() < 1e-9);
    }
}
