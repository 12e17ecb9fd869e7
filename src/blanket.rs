//! Blanket and smart curtailment rules.
//!
//! During the blanket season, turbines are curfewed around dusk and dawn:
//! from one hour before sunset to one hour after sunrise. Within the
//! curfew, the *blanket* strategy cuts output whenever the hub-height wind
//! speed is at or below the regulated cut-in; the *smart* strategy
//! additionally requires the warm, dry conditions under which bats
//! actually fly.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::warn;

use crate::power::PowerRow;
use crate::tables::sun::SunDay;

/// Smart curtailment only fires above this temperature (°C).
pub const SMART_MIN_TEMP_C: f64 = 9.5;

/// Smart curtailment only fires below this precipitation amount (mm).
pub const SMART_MAX_PRECIP_MM: f64 = 1.0;

/// Work-time boundaries for one curfewed day.
#[derive(Debug, Clone, Copy)]
pub struct CurfewDay {
    /// One hour after sunrise: curtailment applies at or before this time.
    pub work_start: NaiveDateTime,
    /// One hour before sunset: curtailment applies at or from this time.
    pub work_end: NaiveDateTime,
}

/// Per-day curfew boundaries across the blanket season of one year.
#[derive(Debug, Clone)]
pub struct BlanketCalendar {
    days: BTreeMap<NaiveDate, CurfewDay>,
}

impl BlanketCalendar {
    /// Builds the calendar from sun times, keeping only days inside the
    /// season window `(start_month_day, end_month_day)` of `year`, both
    /// bounds inclusive.
    pub fn build(
        sun_days: &[SunDay],
        window: ((u32, u32), (u32, u32)),
        year: i32,
    ) -> Self {
        let ((sm, sd), (em, ed)) = window;
        let start = NaiveDate::from_ymd_opt(year, sm, sd);
        let end = NaiveDate::from_ymd_opt(year, em, ed);
        let (Some(start), Some(end)) = (start, end) else {
            warn!(year, "season window does not exist in this year, calendar is empty");
            return Self {
                days: BTreeMap::new(),
            };
        };

        let mut days = BTreeMap::new();
        for day in sun_days {
            if day.date < start || day.date > end {
                continue;
            }
            let rise = day.date.and_time(day.rise);
            let set = day.date.and_time(day.set);
            days.insert(
                day.date,
                CurfewDay {
                    work_start: rise + TimeDelta::hours(1),
                    work_end: set - TimeDelta::hours(1),
                },
            );
        }
        if days.is_empty() {
            warn!(
                year,
                "no sun data inside the season window, nothing will be curtailed"
            );
        }
        Self { days }
    }

    /// Number of curfewed days.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the calendar holds no days.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Curfew boundaries for a date, if it is in season.
    pub fn curfew(&self, date: NaiveDate) -> Option<CurfewDay> {
        self.days.get(&date).copied()
    }

    /// Whether a timestamp falls inside the dusk-to-dawn curfew.
    pub fn in_curfew(&self, time: NaiveDateTime) -> bool {
        match self.days.get(&time.date()) {
            Some(day) => time <= day.work_start || time >= day.work_end,
            None => false,
        }
    }
}

/// One modeled timestamp with per-cut-in curtailed outputs.
///
/// `blanket_kw[i]` and `smart_kw[i]` correspond to the i-th configured
/// cut-in speed and start equal to `power_kw`.
#[derive(Debug, Clone)]
pub struct CurtailedRow {
    /// Reading timestamp (local standard time).
    pub time: NaiveDateTime,
    /// Air temperature (°C), if reported.
    pub temp_c: Option<f64>,
    /// Precipitation amount (mm), if reported.
    pub precip_mm: Option<f64>,
    /// Measured wind speed at reference height (m/s).
    pub wind_ms: f64,
    /// Wind speed at hub height (m/s).
    pub w_hub: f64,
    /// Uncurtailed per-turbine output (kW).
    pub power_kw: f64,
    /// Output under blanket curtailment, one value per cut-in (kW).
    pub blanket_kw: Vec<f64>,
    /// Output under smart curtailment, one value per cut-in (kW).
    pub smart_kw: Vec<f64>,
}

/// Applies the curtailment rules to a modeled series.
pub fn apply_curtailment(
    rows: &[PowerRow],
    calendar: &BlanketCalendar,
    cut_ins: &[f64],
) -> Vec<CurtailedRow> {
    rows.iter()
        .map(|row| {
            let mut out = CurtailedRow {
                time: row.time,
                temp_c: row.temp_c,
                precip_mm: row.precip_mm,
                wind_ms: row.wind_ms,
                w_hub: row.w_hub,
                power_kw: row.power_kw,
                blanket_kw: vec![row.power_kw; cut_ins.len()],
                smart_kw: vec![row.power_kw; cut_ins.len()],
            };
            if calendar.in_curfew(row.time) {
                curtail_row(&mut out, cut_ins);
            }
            out
        })
        .collect()
}

/// Applies the wind-speed rules to a row already known to be in curfew.
fn curtail_row(row: &mut CurtailedRow, cut_ins: &[f64]) {
    // Bats fly when it is warm and dry; missing measurements fail the gate.
    let bats_active = row.temp_c.is_some_and(|t| t > SMART_MIN_TEMP_C)
        && row.precip_mm.is_some_and(|p| p < SMART_MAX_PRECIP_MM);

    for (i, &cut_in) in cut_ins.iter().enumerate() {
        if row.w_hub <= cut_in {
            row.blanket_kw[i] = 0.0;
            if bats_active {
                row.smart_kw[i] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const WINDOW: ((u32, u32), (u32, u32)) = ((7, 15), (9, 30));

    fn sun_day(year: i32, month: u32, day: u32) -> SunDay {
        SunDay {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            rise: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            set: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        }
    }

    fn stamp(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn power_row(time: NaiveDateTime, w_hub: f64, temp_c: f64, precip_mm: f64) -> PowerRow {
        PowerRow {
            time,
            temp_c: Some(temp_c),
            precip_mm: Some(precip_mm),
            wind_ms: w_hub,
            w_hub,
            power_kw: 500.0,
        }
    }

    fn season_calendar(year: i32) -> BlanketCalendar {
        let days: Vec<SunDay> = (15..=31)
            .map(|d| sun_day(year, 7, d))
            .chain((1..=31).map(|d| sun_day(year, 8, d)))
            .chain((1..=30).map(|d| sun_day(year, 9, d)))
            .collect();
        BlanketCalendar::build(&days, WINDOW, year)
    }

    #[test]
    fn calendar_keeps_only_days_in_window() {
        let days = vec![
            sun_day(2020, 7, 14),
            sun_day(2020, 7, 15),
            sun_day(2020, 9, 30),
            sun_day(2020, 10, 1),
        ];
        let cal = BlanketCalendar::build(&days, WINDOW, 2020);
        assert_eq!(cal.len(), 2);
        assert!(cal.curfew(NaiveDate::from_ymd_opt(2020, 7, 15).unwrap()).is_some());
        assert!(cal.curfew(NaiveDate::from_ymd_opt(2020, 10, 1).unwrap()).is_none());
    }

    #[test]
    fn curfew_boundaries_are_inclusive() {
        let cal = season_calendar(2020);
        // rise 06:00 → work_start 07:00; set 21:00 → work_end 20:00
        assert!(cal.in_curfew(stamp(2020, 8, 1, 7)));
        assert!(!cal.in_curfew(stamp(2020, 8, 1, 8)));
        assert!(!cal.in_curfew(stamp(2020, 8, 1, 19)));
        assert!(cal.in_curfew(stamp(2020, 8, 1, 20)));
        assert!(cal.in_curfew(stamp(2020, 8, 1, 23)));
        assert!(cal.in_curfew(stamp(2020, 8, 1, 0)));
    }

    #[test]
    fn out_of_season_is_never_curfewed() {
        let cal = season_calendar(2020);
        assert!(!cal.in_curfew(stamp(2020, 6, 1, 23)));
        assert!(!cal.in_curfew(stamp(2020, 10, 15, 23)));
    }

    #[test]
    fn blanket_cuts_at_or_below_cut_in() {
        let cal = season_calendar(2020);
        let cut_ins = [5.0, 6.0];
        // 23:00 is in curfew; w_hub exactly at the lower threshold
        let rows = vec![power_row(stamp(2020, 8, 1, 23), 5.0, 15.0, 0.0)];
        let out = apply_curtailment(&rows, &cal, &cut_ins);
        assert_eq!(out[0].blanket_kw, vec![0.0, 0.0]);

        // Just above the lower threshold: only the 6.0 ladder rung cuts
        let rows = vec![power_row(stamp(2020, 8, 1, 23), 5.1, 15.0, 0.0)];
        let out = apply_curtailment(&rows, &cal, &cut_ins);
        assert_eq!(out[0].blanket_kw, vec![500.0, 0.0]);
    }

    #[test]
    fn smart_requires_warm_and_dry() {
        let cal = season_calendar(2020);
        let cut_ins = [6.0];

        // Warm and dry: bats active, smart curtails
        let out = apply_curtailment(
            &[power_row(stamp(2020, 8, 1, 23), 4.0, 15.0, 0.0)],
            &cal,
            &cut_ins,
        );
        assert_eq!(out[0].smart_kw, vec![0.0]);

        // Too cold: smart keeps producing while blanket cuts
        let out = apply_curtailment(
            &[power_row(stamp(2020, 8, 1, 23), 4.0, 5.0, 0.0)],
            &cal,
            &cut_ins,
        );
        assert_eq!(out[0].blanket_kw, vec![0.0]);
        assert_eq!(out[0].smart_kw, vec![500.0]);

        // Raining: smart keeps producing
        let out = apply_curtailment(
            &[power_row(stamp(2020, 8, 1, 23), 4.0, 15.0, 2.0)],
            &cal,
            &cut_ins,
        );
        assert_eq!(out[0].smart_kw, vec![500.0]);
    }

    #[test]
    fn smart_boundary_temperature_does_not_fire() {
        let cal = season_calendar(2020);
        // exactly 9.5 °C is not "warm"
        let out = apply_curtailment(
            &[power_row(stamp(2020, 8, 1, 23), 4.0, SMART_MIN_TEMP_C, 0.0)],
            &cal,
            &[6.0],
        );
        assert_eq!(out[0].smart_kw, vec![500.0]);
    }

    #[test]
    fn missing_weather_fails_the_smart_gate() {
        let cal = season_calendar(2020);
        let mut row = power_row(stamp(2020, 8, 1, 23), 4.0, 15.0, 0.0);
        row.temp_c = None;
        let out = apply_curtailment(&[row], &cal, &[6.0]);
        assert_eq!(out[0].blanket_kw, vec![0.0]);
        assert_eq!(out[0].smart_kw, vec![500.0]);
    }

    #[test]
    fn daytime_in_season_keeps_output() {
        let cal = season_calendar(2020);
        let out = apply_curtailment(
            &[power_row(stamp(2020, 8, 1, 12), 4.0, 15.0, 0.0)],
            &cal,
            &[6.0],
        );
        assert_eq!(out[0].blanket_kw, vec![500.0]);
        assert_eq!(out[0].smart_kw, vec![500.0]);
    }
}
