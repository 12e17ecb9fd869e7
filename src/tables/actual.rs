//! Actual (AESO) generation files (`real/<year>_<Asset>.csv`).

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, StudyError};

#[derive(Debug, Deserialize)]
struct RawActualRow {
    #[serde(rename = "Date (MST)")]
    time: String,
    #[serde(rename = "Volume")]
    volume_mw: Option<f64>,
}

/// One settlement hour of farm-level actual generation.
#[derive(Debug, Clone)]
pub struct ActualReading {
    /// Hour start (Mountain Standard Time).
    pub time: NaiveDateTime,
    /// Farm output for the hour (MW).
    pub volume_mw: f64,
}

/// Loads an actual-generation file. Rows with an unusable timestamp or a
/// blank volume are logged and skipped.
///
/// # Errors
///
/// Returns `Csv` on unreadable input or `EmptyInput` if no row survives.
pub fn load_actual_file(path: &Path) -> Result<Vec<ActualReading>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| StudyError::csv(path, e))?;
    let mut readings = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize() {
        let raw: RawActualRow = row.map_err(|e| StudyError::csv(path, e))?;
        let time = super::parse_lst(&raw.time)
            .or_else(|| NaiveDateTime::parse_from_str(raw.time.trim(), "%m/%d/%Y %H:%M").ok());
        match (time, raw.volume_mw) {
            (Some(time), Some(volume_mw)) => readings.push(ActualReading { time, volume_mw }),
            _ => {
                skipped += 1;
                warn!(stamp = %raw.time, "skipping actual-generation row");
            }
        }
    }

    if readings.is_empty() {
        return Err(StudyError::EmptyInput(format!(
            "no usable rows in `{}`",
            path.display()
        )));
    }
    info!(
        rows = readings.len(),
        skipped,
        path = %path.display(),
        "loaded actual generation"
    );
    Ok(readings)
}

/// Total energy over the readings (MWh, hourly settlement).
pub fn total_volume_mwh(readings: &[ActualReading]) -> f64 {
    readings.iter().map(|r| r.volume_mw).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_and_totals() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(
            b"Date (MST),Volume\n\
              2020-07-15 00:00,55.2\n\
              2020-07-15 01:00,60.8\n\
              2020-07-15 02:00,\n",
        )
        .expect("write fixture");
        let readings = load_actual_file(f.path()).expect("should load");
        assert_eq!(readings.len(), 2);
        assert!((total_volume_mwh(&readings) - 116.0).abs() < 1e-9);
    }

    #[test]
    fn slash_dates_parse() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(b"Date (MST),Volume\n07/15/2020 00:00,55.2\n")
            .expect("write fixture");
        let readings = load_actual_file(f.path()).expect("should load");
        assert_eq!(readings.len(), 1);
    }
}
