//! Pool-price series (`pool_price_<year>.csv`).
//!
//! AESO publishes hour-ending stamps where midnight is written as hour 24
//! of the previous day. The loader translates those, collapses duplicated
//! hours by mean, and pads the series to the full calendar year with zero
//! prices so every model hour finds a join partner.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, StudyError};

#[derive(Debug, Deserialize)]
struct RawPriceRow {
    #[serde(rename = "Date (HE)")]
    time: String,
    #[serde(rename = "Price ($)")]
    price: Option<f64>,
}

/// One hour of the padded price series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Hour start (local standard time).
    pub time: NaiveDateTime,
    /// Pool price (CAD/MWh); padded gaps carry 0.
    pub price: f64,
}

/// Translates an `… 24` hour-ending stamp to `00` of the next day.
fn fix_hour_24(stamp: &str) -> Option<NaiveDateTime> {
    let trimmed = stamp.trim();
    if let Some(date_part) = trimmed.strip_suffix(" 24") {
        let date = NaiveDate::parse_from_str(date_part, "%m/%d/%Y").ok()?;
        let next = date.checked_add_days(Days::new(1))?;
        return next.and_hms_opt(0, 0, 0);
    }
    NaiveDateTime::parse_from_str(trimmed, "%m/%d/%Y %H")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%m/%d/%Y %H:%M"))
        .ok()
}

/// Loads and pads the price series for one calendar year.
///
/// Hours with no published price (or prices lost to malformed rows) are
/// filled with 0 CAD/MWh and counted in a warning.
///
/// # Errors
///
/// Returns `Csv` on unreadable input.
pub fn load_pool_prices(path: &Path, year: i32) -> Result<Vec<PricePoint>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| StudyError::csv(path, e))?;

    // Collapse duplicated hour-ending rows by mean, skipping blank prices.
    let mut sums: HashMap<NaiveDateTime, (f64, usize)> = HashMap::new();
    let mut skipped = 0usize;
    for row in reader.deserialize() {
        let raw: RawPriceRow = row.map_err(|e| StudyError::csv(path, e))?;
        let Some(time) = fix_hour_24(&raw.time) else {
            skipped += 1;
            warn!(stamp = %raw.time, "skipping price row with unparseable stamp");
            continue;
        };
        if let Some(price) = raw.price {
            let entry = sums.entry(time).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
        }
    }

    // Pad to the full calendar year at hourly resolution.
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("Jan 1 is always valid");
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("Jan 1 is always valid");

    let mut series = Vec::new();
    let mut gaps = 0usize;
    let mut t = start;
    while t < end {
        let price = match sums.get(&t) {
            Some((sum, n)) => sum / *n as f64,
            None => {
                gaps += 1;
                0.0
            }
        };
        series.push(PricePoint { time: t, price });
        t += TimeDelta::hours(1);
    }

    if gaps > 0 {
        warn!(gaps, year, path = %path.display(), "price hours missing, padded with 0 CAD/MWh");
    }
    info!(
        hours = series.len(),
        skipped,
        year,
        path = %path.display(),
        "loaded pool prices"
    );
    Ok(series)
}

/// Index of a price series for timestamp joins.
pub fn price_index(series: &[PricePoint]) -> HashMap<NaiveDateTime, f64> {
    series.iter().map(|p| (p.time, p.price)).collect()
}
