//! Inverse power-curve reconstruction of hub-height wind speed from
//! actual per-turbine output.

use chrono::NaiveDateTime;
use tracing::info;

use crate::power::{self, PowerCurve};
use crate::tables::actual::ActualReading;

/// One settlement hour with the reconstructed wind speed.
#[derive(Debug, Clone)]
pub struct BackcastRow {
    /// Hour start (Mountain Standard Time).
    pub time: NaiveDateTime,
    /// Per-turbine output derived from the farm volume (kW).
    pub power_kw: f64,
    /// Reconstructed hub-height wind speed (m/s); `None` when the power
    /// lies outside the curve range.
    pub w_hub: Option<f64>,
}

/// Reconstructs hub-height wind speeds from farm-level actual generation.
///
/// The farm volume (MW) is split evenly across the farm's turbines and
/// corrected for losses and the density term `(ρ_std/ρ)^(1/3)` before the
/// inverse lookup. The back-cast runs at standard density, mirroring the
/// forward model.
pub fn backcast_series(
    readings: &[ActualReading],
    turbine_count: u32,
    curve: &PowerCurve,
    losses: f64,
) -> Vec<BackcastRow> {
    let count = turbine_count.max(1) as f64;
    // Standard density, mirroring the forward model: the correction term
    // (ρ_std/ρ)^(1/3) is the reciprocal of the forward adjustment.
    let density_corr = power::density_adjustment(power::RHO_STD).recip();

    let rows: Vec<BackcastRow> = readings
        .iter()
        .map(|r| {
            let power_kw = r.volume_mw * 1000.0 / count;
            let corrected = power_kw / (1.0 - losses) * density_corr;
            BackcastRow {
                time: r.time,
                power_kw,
                w_hub: curve.speed_at_power(corrected),
            }
        })
        .collect();

    let resolved = rows.iter().filter(|r| r.w_hub.is_some()).count();
    info!(
        rows = rows.len(),
        resolved,
        "back-calculated wind speeds from actual generation"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(hour: u32, volume_mw: f64) -> ActualReading {
        ActualReading {
            time: NaiveDate::from_ymd_opt(2020, 8, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            volume_mw,
        }
    }

    fn curve() -> PowerCurve {
        PowerCurve::new(vec![
            (3.0, 0.0),
            (6.0, 300.0),
            (9.0, 900.0),
            (12.0, 1500.0),
        ])
        .expect("fixture curve is valid")
    }

    #[test]
    fn splits_farm_volume_across_turbines() {
        // 10 turbines at 300 kW each = 3 MW farm output → 6 m/s
        let rows = backcast_series(&[reading(0, 3.0)], 10, &curve(), 0.0);
        assert!((rows[0].power_kw - 300.0).abs() < 1e-9);
        assert!((rows[0].w_hub.unwrap() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn losses_inflate_the_curve_input() {
        // With 10% losses the curve must have produced power/0.9
        let rows = backcast_series(&[reading(0, 2.7)], 10, &curve(), 0.1);
        assert!((rows[0].w_hub.unwrap() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_power_is_unresolved() {
        // 20 MW over 10 turbines = 2000 kW per turbine, beyond the curve
        let rows = backcast_series(&[reading(0, 20.0)], 10, &curve(), 0.0);
        assert!(rows[0].w_hub.is_none());
    }

    #[test]
    fn round_trips_through_the_forward_model() {
        let curve = curve();
        for &speed in &[4.0, 5.5, 7.0, 10.5] {
            let power_kw = curve.power_at(speed);
            let farm_mw = power_kw * 10.0 / 1000.0;
            let rows = backcast_series(&[reading(0, farm_mw)], 10, &curve, 0.0);
            assert!(
                (rows[0].w_hub.unwrap() - speed).abs() < 1e-9,
                "speed {speed} should round-trip"
            );
        }
    }
}
