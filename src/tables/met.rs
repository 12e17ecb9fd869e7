//! Meteorological readings (Environment Canada hourly files).

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, StudyError};

/// Raw CSV row; timestamps arrive as strings and measurements may be blank.
#[derive(Debug, Deserialize)]
struct RawMetRow {
    #[serde(rename = "Date/Time (LST)")]
    time: String,
    #[serde(rename = "Temp (°C)")]
    temp_c: Option<f64>,
    #[serde(rename = "Wind Spd (km/h)")]
    wind_kmh: Option<f64>,
    #[serde(rename = "Precip. Amount (mm)")]
    precip_mm: Option<f64>,
}

/// One hourly reading from a weather station.
#[derive(Debug, Clone)]
pub struct MetReading {
    /// Reading timestamp (local standard time).
    pub time: NaiveDateTime,
    /// Air temperature (°C), if reported.
    pub temp_c: Option<f64>,
    /// Wind speed at the station anemometer (km/h), if reported.
    pub wind_kmh: Option<f64>,
    /// Precipitation amount (mm), if reported.
    pub precip_mm: Option<f64>,
}

/// Loads a station-year file. Rows with an unparseable timestamp are
/// logged and skipped; rows with missing measurements are kept (the model
/// degrades them per-field).
///
/// # Errors
///
/// Returns `Csv` if the file cannot be opened or a row fails to
/// deserialize (e.g., a required column is missing), or `EmptyInput` if no
/// row survives.
pub fn load_met_file(path: &Path) -> Result<Vec<MetReading>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| StudyError::csv(path, e))?;
    let mut readings = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize() {
        let raw: RawMetRow = row.map_err(|e| StudyError::csv(path, e))?;
        match super::parse_lst(&raw.time) {
            Some(time) => readings.push(MetReading {
                time,
                temp_c: raw.temp_c,
                wind_kmh: raw.wind_kmh,
                precip_mm: raw.precip_mm,
            }),
            None => {
                skipped += 1;
                warn!(stamp = %raw.time, "skipping reading with unparseable timestamp");
            }
        }
    }

    if readings.is_empty() {
        return Err(StudyError::EmptyInput(format!(
            "no usable readings in `{}`",
            path.display()
        )));
    }
    info!(
        rows = readings.len(),
        skipped,
        path = %path.display(),
        "loaded meteorological data"
    );
    Ok(readings)
}
