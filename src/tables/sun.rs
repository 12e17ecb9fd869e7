//! Sunrise/sunset reference table (`Sun.csv`).
//!
//! The table carries one row per turbine per calendar day with rise and
//! set times. Dates are published for a reference year; the loader
//! re-anchors them to the study year.

use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, StudyError};

#[derive(Debug, Deserialize)]
struct RawSunRow {
    turbine_name: String,
    date: String,
    rise: String,
    set: String,
}

/// Sunrise and sunset for one turbine on one day.
#[derive(Debug, Clone)]
pub struct SunDay {
    /// Calendar date, re-anchored to the study year.
    pub date: NaiveDate,
    /// Sunrise (local standard time).
    pub rise: NaiveTime,
    /// Sunset (local standard time).
    pub set: NaiveTime,
}

/// Loads the sun table filtered to one turbine, with dates re-anchored to
/// `year`. Rows that fail to parse are logged and skipped; Feb 29 rows are
/// dropped when `year` is not a leap year.
///
/// # Errors
///
/// Returns `Csv` on unreadable input or `MissingSunData` if no row matches
/// the turbine.
pub fn load_sun_days(path: &Path, asset_name: &str, year: i32) -> Result<Vec<SunDay>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| StudyError::csv(path, e))?;
    let mut days = Vec::new();
    let mut matched = false;

    for row in reader.deserialize() {
        let raw: RawSunRow = row.map_err(|e| StudyError::csv(path, e))?;
        if raw.turbine_name != asset_name {
            continue;
        }
        matched = true;

        let Some(date) = parse_anchored_date(&raw.date, year) else {
            warn!(date = %raw.date, %year, "skipping sun row with unusable date");
            continue;
        };
        let (Some(rise), Some(set)) = (parse_time(&raw.rise), parse_time(&raw.set)) else {
            warn!(%date, rise = %raw.rise, set = %raw.set, "skipping sun row with unusable times");
            continue;
        };
        days.push(SunDay { date, rise, set });
    }

    if !matched {
        return Err(StudyError::MissingSunData(asset_name.to_string()));
    }
    days.sort_by_key(|d| d.date);
    info!(days = days.len(), asset = asset_name, year, "loaded sun times");
    Ok(days)
}

/// Parses `%b %d %Y` (e.g. `Jul 15 2019`) and substitutes the study year.
fn parse_anchored_date(s: &str, year: i32) -> Option<NaiveDate> {
    let published = NaiveDate::parse_from_str(s.trim(), "%b %d %Y").ok()?;
    NaiveDate::from_ymd_opt(year, published.month(), published.day())
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(
            b"turbine_name,date,rise,set\n\
              Castle River 1,Jul 15 2019,05:42,21:31\n\
              Castle River 1,Jul 16 2019,05:43,21:30\n\
              Summerview,Jul 15 2019,05:40,21:33\n",
        )
        .expect("write fixture");
        f
    }

    #[test]
    fn filters_by_turbine_and_anchors_year() {
        let f = fixture();
        let days = load_sun_days(f.path(), "Castle River 1", 2021).expect("should load");
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2021, 7, 15).unwrap());
        assert_eq!(days[0].rise, NaiveTime::from_hms_opt(5, 42, 0).unwrap());
        assert_eq!(days[1].set, NaiveTime::from_hms_opt(21, 30, 0).unwrap());
    }

    #[test]
    fn unknown_turbine_is_an_error() {
        let f = fixture();
        let err = load_sun_days(f.path(), "Halkirk", 2021);
        assert!(matches!(err, Err(StudyError::MissingSunData(_))));
    }
}
