//! Model-output files read back for aggregation.
//!
//! The curtailment columns depend on the configured cut-in ladder, so the
//! reader is header-driven: it discovers the `blanket_<v>`/`smart_<v>`
//! pairs instead of assuming a fixed schema.

use std::path::Path;

use tracing::{info, warn};

use crate::blanket::CurtailedRow;
use crate::error::{Result, StudyError};

/// A model-output series with its cut-in ladder recovered from the header.
#[derive(Debug, Clone)]
pub struct ModelSeries {
    /// Cut-in speeds, ascending, as found in the column names.
    pub cut_ins: Vec<f64>,
    /// Rows in file order.
    pub rows: Vec<CurtailedRow>,
}

/// Formats a cut-in speed the way column names carry it.
pub fn cut_in_label(speed: f64) -> String {
    format!("{speed:.1}")
}

/// Reads a model-output CSV produced by the modeling toolkit.
///
/// Rows with an unusable timestamp or a malformed number are logged and
/// skipped.
///
/// # Errors
///
/// Returns `Csv` on unreadable input, `MissingColumn` if a base column or
/// a smart column matching a blanket column is absent, or `EmptyInput` if
/// no curtailment columns are present.
pub fn read_model_csv(path: &Path) -> Result<ModelSeries> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| StudyError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| StudyError::csv(path, e))?
        .clone();

    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| StudyError::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            })
    };

    let time_col = col("time")?;
    let temp_col = col("temp_c")?;
    let precip_col = col("precip_mm")?;
    let wind_col = col("wind_ms")?;
    let w_hub_col = col("w_hub")?;
    let power_col = col("power_kw")?;

    // Recover the cut-in ladder from the blanket columns.
    let mut ladder: Vec<(f64, usize, usize)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(label) = header.strip_prefix("blanket_") {
            let Ok(speed) = label.parse::<f64>() else {
                warn!(column = header, "ignoring curtailment column with unparseable speed");
                continue;
            };
            let smart_idx = col(&format!("smart_{label}"))?;
            ladder.push((speed, idx, smart_idx));
        }
    }
    ladder.sort_by(|a, b| a.0.total_cmp(&b.0));
    if ladder.is_empty() {
        return Err(StudyError::EmptyInput(format!(
            "no curtailment columns in `{}`",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| StudyError::csv(path, e))?;
        match parse_row(&record, time_col, temp_col, precip_col, wind_col, w_hub_col, power_col, &ladder)
        {
            Some(row) => rows.push(row),
            None => {
                skipped += 1;
                warn!(line = rows.len() + skipped + 1, "skipping malformed model row");
            }
        }
    }

    info!(
        rows = rows.len(),
        skipped,
        cut_ins = ladder.len(),
        path = %path.display(),
        "read model output"
    );
    Ok(ModelSeries {
        cut_ins: ladder.iter().map(|&(v, _, _)| v).collect(),
        rows,
    })
}

#[expect(clippy::too_many_arguments)]
fn parse_row(
    record: &csv::StringRecord,
    time_col: usize,
    temp_col: usize,
    precip_col: usize,
    wind_col: usize,
    w_hub_col: usize,
    power_col: usize,
    ladder: &[(f64, usize, usize)],
) -> Option<CurtailedRow> {
    let time = super::parse_lst(record.get(time_col)?)?;
    let temp_c = optional_f64(record.get(temp_col)?);
    let precip_mm = optional_f64(record.get(precip_col)?);
    let wind_ms = record.get(wind_col)?.parse().ok()?;
    let w_hub = record.get(w_hub_col)?.parse().ok()?;
    let power_kw = record.get(power_col)?.parse().ok()?;

    let mut blanket_kw = Vec::with_capacity(ladder.len());
    let mut smart_kw = Vec::with_capacity(ladder.len());
    for &(_, b_idx, s_idx) in ladder {
        blanket_kw.push(record.get(b_idx)?.parse().ok()?);
        smart_kw.push(record.get(s_idx)?.parse().ok()?);
    }

    Some(CurtailedRow {
        time,
        temp_c,
        precip_mm,
        wind_ms,
        w_hub,
        power_kw,
        blanket_kw,
        smart_kw,
    })
}

fn optional_f64(field: &str) -> Option<f64> {
    if field.is_empty() {
        None
    } else {
        field.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_back_ladder_and_rows() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(
            b"time,temp_c,precip_mm,wind_ms,w_hub,power_kw,blanket_5.0,blanket_6.0,smart_5.0,smart_6.0\n\
              2020-08-01 23:00,15.0,0.0,4.2,5.3,120.0,0.0,0.0,120.0,0.0\n\
              2020-08-01 12:00,,0.0,8.0,9.8,900.0,900.0,900.0,900.0,900.0\n",
        )
        .expect("write fixture");

        let series = read_model_csv(f.path()).expect("should read");
        assert_eq!(series.cut_ins, vec![5.0, 6.0]);
        assert_eq!(series.rows.len(), 2);
        assert_eq!(series.rows[0].blanket_kw, vec![0.0, 0.0]);
        assert_eq!(series.rows[0].smart_kw, vec![120.0, 0.0]);
        assert_eq!(series.rows[1].temp_c, None);
    }

    #[test]
    fn missing_smart_twin_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(
            b"time,temp_c,precip_mm,wind_ms,w_hub,power_kw,blanket_5.0\n\
              2020-08-01 23:00,15.0,0.0,4.2,5.3,120.0,0.0\n",
        )
        .expect("write fixture");
        assert!(matches!(
            read_model_csv(f.path()),
            Err(StudyError::MissingColumn { .. })
        ));
    }

    #[test]
    fn no_curtailment_columns_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(
            b"time,temp_c,precip_mm,wind_ms,w_hub,power_kw\n\
              2020-08-01 23:00,15.0,0.0,4.2,5.3,120.0\n",
        )
        .expect("write fixture");
        assert!(matches!(
            read_model_csv(f.path()),
            Err(StudyError::EmptyInput(_))
        ));
    }
}
