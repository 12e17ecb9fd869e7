//! Monthly modeled-vs-actual comparison over the curtailment months.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;

use crate::blanket::CurtailedRow;
use crate::tables::actual::ActualReading;

/// Months under comparison: July, August, September.
pub const MONTHS: [u32; 3] = [7, 8, 9];

/// Display names for [`MONTHS`].
pub const MONTH_LABELS: [&str; 3] = ["July", "August", "September"];

/// Accumulated monthly energy totals for one year, across all turbines.
#[derive(Debug, Clone)]
pub struct MonthlyTotals {
    /// Study year.
    pub year: i32,
    /// Modeled energy per month (MWh).
    modeled_mwh: BTreeMap<u32, f64>,
    /// Actual energy per month (MWh).
    actual_mwh: BTreeMap<u32, f64>,
}

impl MonthlyTotals {
    /// Empty accumulator with all comparison months present.
    pub fn new(year: i32) -> Self {
        let zeroed: BTreeMap<u32, f64> = MONTHS.iter().map(|&m| (m, 0.0)).collect();
        Self {
            year,
            modeled_mwh: zeroed.clone(),
            actual_mwh: zeroed,
        }
    }

    /// Adds one farm's modeled series, scaled to farm level.
    ///
    /// Hourly per-turbine kW readings integrate to kWh, so the farm energy
    /// is `Σ power_kw × n / 1000` MWh per month.
    pub fn add_modeled(&mut self, rows: &[CurtailedRow], turbine_count: u32) {
        for row in rows {
            if let Some(total) = self.modeled_mwh.get_mut(&row.time.month()) {
                *total += row.power_kw * turbine_count as f64 / 1000.0;
            }
        }
    }

    /// Adds one farm's actual generation (hourly MW settles to MWh).
    pub fn add_actual(&mut self, readings: &[ActualReading]) {
        for r in readings {
            if let Some(total) = self.actual_mwh.get_mut(&r.time.month()) {
                *total += r.volume_mw;
            }
        }
    }

    /// Modeled energy for a month (MWh).
    pub fn modeled(&self, month: u32) -> f64 {
        self.modeled_mwh.get(&month).copied().unwrap_or(0.0)
    }

    /// Actual energy for a month (MWh).
    pub fn actual(&self, month: u32) -> f64 {
        self.actual_mwh.get(&month).copied().unwrap_or(0.0)
    }

    /// Totals over all comparison months: (modeled, actual) MWh.
    pub fn period_totals(&self) -> (f64, f64) {
        (
            self.modeled_mwh.values().sum(),
            self.actual_mwh.values().sum(),
        )
    }

    /// Percentage difference of modeled vs. actual for a month, if the
    /// actual total is nonzero.
    pub fn pct_diff(&self, month: u32) -> Option<f64> {
        let actual = self.actual(month);
        if actual == 0.0 {
            return None;
        }
        Some((self.modeled(month) - actual) / actual * 100.0)
    }

    /// Percentage difference over the whole period.
    pub fn period_pct_diff(&self) -> Option<f64> {
        let (modeled, actual) = self.period_totals();
        if actual == 0.0 {
            return None;
        }
        Some((modeled - actual) / actual * 100.0)
    }
}

impl fmt::Display for MonthlyTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diff_cell = |diff: Option<f64>| match diff {
            Some(d) => format!("{d:>8.2}"),
            None => format!("{:>8}", "n/a"),
        };

        writeln!(f, "--- {} July–September totals (MWh) ---", self.year)?;
        writeln!(
            f,
            "{:>10} | {:>14} {:>14} | {:>8}",
            "month", "modeled", "actual", "diff %"
        )?;
        for (&month, label) in MONTHS.iter().zip(MONTH_LABELS.iter()) {
            writeln!(
                f,
                "{:>10} | {:>14.1} {:>14.1} | {}",
                label,
                self.modeled(month),
                self.actual(month),
                diff_cell(self.pct_diff(month))
            )?;
        }
        let (modeled, actual) = self.period_totals();
        write!(
            f,
            "{:>10} | {:>14.1} {:>14.1} | {}",
            "Total",
            modeled,
            actual,
            diff_cell(self.period_pct_diff())
        )
    }
}
