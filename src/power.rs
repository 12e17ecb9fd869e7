//! Physical power model: wind shear, air density, and power-curve lookup.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::error::{Result, StudyError};

/// Standard air density (kg/m³).
pub const RHO_STD: f64 = 1.225;

/// Specific gas constant for dry air (J/(kg·K)).
pub const GAS_CONSTANT: f64 = 287.05;

/// Fallback roughness length when the metadata value is unusable (m).
const DEFAULT_ROUGHNESS_M: f64 = 0.1;

/// Extrapolates a measured wind speed to hub height with the logarithmic
/// wind profile.
///
/// Degrades rather than fails: a non-positive roughness falls back to
/// 0.1 m, and a hub height at or below the roughness length returns the
/// measured speed unchanged. Both cases log a warning.
pub fn wind_speed_at_hub(
    wind_speed: f64,
    hub_height: f64,
    surface_roughness: f64,
    ref_height: f64,
) -> f64 {
    let roughness = if surface_roughness <= 0.0 {
        warn!(
            surface_roughness,
            "invalid surface roughness, using default {DEFAULT_ROUGHNESS_M} m"
        );
        DEFAULT_ROUGHNESS_M
    } else {
        surface_roughness
    };

    if hub_height <= roughness {
        warn!(
            hub_height,
            roughness, "hub height must exceed surface roughness, keeping measured speed"
        );
        return wind_speed;
    }

    wind_speed * ((hub_height / roughness).ln() / (ref_height / roughness).ln())
}

/// Air density from the ideal gas law.
///
/// Temperatures at or below absolute zero clamp to −273.15 °C with a warning.
pub fn air_density(surface_pressure_pa: f64, temperature_c: f64) -> f64 {
    let temp_c = if temperature_c <= -273.15 {
        warn!(
            temperature_c,
            "temperature below absolute zero, clamping to -273.15 °C"
        );
        -273.15
    } else {
        temperature_c
    };
    surface_pressure_pa / (GAS_CONSTANT * (temp_c + 273.15))
}

/// Density adjustment factor applied to the hub-height wind speed before
/// the curve lookup: `(ρ / ρ_std)^(1/3)`.
pub fn density_adjustment(air_density: f64) -> f64 {
    (air_density / RHO_STD).cbrt()
}

/// A turbine power curve: wind speed (m/s) → per-turbine power (kW).
#[derive(Debug, Clone)]
pub struct PowerCurve {
    /// (speed, power) knots in file order.
    points: Vec<(f64, f64)>,
}

impl PowerCurve {
    /// Builds a curve from (speed, power) knots.
    ///
    /// # Errors
    ///
    /// Returns `BadPowerCurve` if fewer than two knots are given. Negative
    /// powers and non-monotone speeds are tolerated with a warning, matching
    /// the permissive handling of vendor curve files.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self> {
        Self::validate(&points, Path::new("<inline>"))?;
        Ok(Self { points })
    }

    /// Loads a curve from a whitespace-separated two-column table with a
    /// header row, the layout vendor datasheets are shipped in.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, or `BadPowerCurve` if a data
    /// row does not hold two numbers or fewer than two knots remain.
    pub fn from_table_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StudyError::io(path, e))?;

        let mut points = Vec::new();
        for (lineno, line) in content.lines().enumerate().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut cols = line.split_whitespace();
            let speed = cols.next().and_then(|v| v.parse::<f64>().ok());
            let power = cols.next().and_then(|v| v.parse::<f64>().ok());
            match (speed, power) {
                (Some(s), Some(p)) => points.push((s, p)),
                _ => {
                    return Err(StudyError::BadPowerCurve {
                        path: path.to_path_buf(),
                        reason: format!("line {} is not a speed/power pair", lineno + 1),
                    });
                }
            }
        }

        Self::validate(&points, path)?;
        Ok(Self { points })
    }

    fn validate(points: &[(f64, f64)], path: &Path) -> Result<()> {
        if points.len() < 2 {
            return Err(StudyError::BadPowerCurve {
                path: path.to_path_buf(),
                reason: format!("need at least 2 knots, got {}", points.len()),
            });
        }
        if points.iter().any(|&(s, p)| s < 0.0 || p < 0.0) {
            warn!(path = %path.display(), "power curve contains negative values");
        }
        if points.windows(2).any(|w| w[0].0 > w[1].0) {
            warn!(
                path = %path.display(),
                "power curve wind speeds are not monotonically increasing"
            );
        }
        Ok(())
    }

    /// Number of knots.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the curve holds no knots (never true for a constructed curve).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Highest power value on the curve (kW).
    pub fn max_power_kw(&self) -> f64 {
        self.points.iter().map(|&(_, p)| p).fold(0.0, f64::max)
    }

    /// Per-turbine power at a wind speed, by linear interpolation.
    ///
    /// Speeds outside the tabulated range yield 0 kW: below the first knot
    /// the turbine has not cut in, above the last it has cut out.
    pub fn power_at(&self, wind_speed: f64) -> f64 {
        interpolate(self.points.iter().map(|&(s, p)| (s, p)), wind_speed).unwrap_or(0.0)
    }

    /// Inverse lookup: wind speed that produces a given per-turbine power.
    ///
    /// Repeated power values (the flat rated-power plateau) are collapsed to
    /// their first occurrence so the power axis is strictly usable as an
    /// interpolation key. Powers outside the curve range yield `None`.
    pub fn speed_at_power(&self, power_kw: f64) -> Option<f64> {
        let mut by_power: Vec<(f64, f64)> = Vec::with_capacity(self.points.len());
        for &(speed, power) in &self.points {
            if !by_power.iter().any(|&(p, _)| p == power) {
                by_power.push((power, speed));
            }
        }
        by_power.sort_by(|a, b| a.0.total_cmp(&b.0));
        interpolate(by_power.iter().copied(), power_kw)
    }
}

/// Piecewise-linear interpolation over ascending (x, y) pairs.
///
/// Returns `None` when `x` lies outside the tabulated range.
fn interpolate(pairs: impl Iterator<Item = (f64, f64)>, x: f64) -> Option<f64> {
    let mut prev: Option<(f64, f64)> = None;
    for (xi, yi) in pairs {
        if x == xi {
            return Some(yi);
        }
        if let Some((x0, y0)) = prev {
            if x > x0 && x < xi {
                let t = (x - x0) / (xi - x0);
                return Some(y0 + t * (yi - y0));
            }
        }
        prev = Some((xi, yi));
    }
    None
}

/// One modeled timestamp: met inputs plus derived power.
#[derive(Debug, Clone)]
pub struct PowerRow {
    /// Reading timestamp (local standard time).
    pub time: NaiveDateTime,
    /// Air temperature (°C), if reported.
    pub temp_c: Option<f64>,
    /// Precipitation amount (mm), if reported.
    pub precip_mm: Option<f64>,
    /// Measured wind speed at reference height (m/s).
    pub wind_ms: f64,
    /// Wind speed extrapolated to hub height (m/s).
    pub w_hub: f64,
    /// Modeled per-turbine output (kW).
    pub power_kw: f64,
}

/// Computes the modeled output for one timestamp.
///
/// The forward model runs at standard density (station pressure is not
/// plumbed in), so the density adjustment is currently the identity; the
/// term stays in the formula so a pressure feed can activate it.
#[expect(clippy::too_many_arguments)]
pub fn model_row(
    time: NaiveDateTime,
    temp_c: Option<f64>,
    precip_mm: Option<f64>,
    wind_ms: f64,
    hub_height: f64,
    surface_roughness: f64,
    ref_height: f64,
    curve: &PowerCurve,
    losses: f64,
) -> PowerRow {
    let w_hub = wind_speed_at_hub(wind_ms, hub_height, surface_roughness, ref_height);
    let adjusted = w_hub * density_adjustment(RHO_STD);
    let power_kw = curve.power_at(adjusted) * (1.0 - losses);
    PowerRow {
        time,
        temp_c,
        precip_mm,
        wind_ms,
        w_hub,
        power_kw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_curve() -> PowerCurve {
        // cut-in 3 m/s, rated 1500 kW from 12 m/s, cut-out past 25 m/s
        PowerCurve::new(vec![
            (3.0, 0.0),
            (6.0, 300.0),
            (9.0, 900.0),
            (12.0, 1500.0),
            (25.0, 1500.0),
        ])
        .expect("fixture curve is valid")
    }

    #[test]
    fn shear_identity_at_reference_height() {
        let v = wind_speed_at_hub(8.0, 10.0, 0.05, 10.0);
        assert!((v - 8.0).abs() < 1e-12);
    }

    #[test]
    fn shear_grows_with_hub_height() {
        let v80 = wind_speed_at_hub(8.0, 80.0, 0.05, 10.0);
        let v100 = wind_speed_at_hub(8.0, 100.0, 0.05, 10.0);
        assert!(v80 > 8.0);
        assert!(v100 > v80);
    }

    #[test]
    fn shear_bad_roughness_falls_back() {
        let with_default = wind_speed_at_hub(8.0, 80.0, 0.1, 10.0);
        let with_zero = wind_speed_at_hub(8.0, 80.0, 0.0, 10.0);
        assert!((with_default - with_zero).abs() < 1e-12);
    }

    #[test]
    fn shear_hub_below_roughness_keeps_measured_speed() {
        assert_eq!(wind_speed_at_hub(8.0, 0.05, 0.1, 10.0), 8.0);
    }

    #[test]
    fn density_at_standard_conditions() {
        // 101325 Pa at 15 °C is the ISO standard atmosphere
        let rho = air_density(101_325.0, 15.0);
        assert!((rho - RHO_STD).abs() < 0.005);
    }

    #[test]
    fn density_clamps_below_absolute_zero() {
        let rho = air_density(101_325.0, -300.0);
        assert!(rho.is_finite());
        assert!(rho > 0.0);
    }

    #[test]
    fn density_adjustment_is_identity_at_standard() {
        assert!((density_adjustment(RHO_STD) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn curve_exact_at_knots() {
        let curve = ramp_curve();
        assert_eq!(curve.power_at(6.0), 300.0);
        assert_eq!(curve.power_at(12.0), 1500.0);
    }

    #[test]
    fn curve_linear_between_knots() {
        let curve = ramp_curve();
        assert!((curve.power_at(7.5) - 600.0).abs() < 1e-9);
    }

    #[test]
    fn curve_zero_outside_range() {
        let curve = ramp_curve();
        assert_eq!(curve.power_at(1.0), 0.0);
        assert_eq!(curve.power_at(30.0), 0.0);
    }

    #[test]
    fn curve_monotone_on_ramp() {
        let curve = ramp_curve();
        let mut last = -1.0;
        for i in 0..=90 {
            let v = 3.0 + i as f64 * 0.1;
            let p = curve.power_at(v);
            assert!(p >= last, "power should not decrease on the ramp at {v}");
            last = p;
        }
    }

    #[test]
    fn curve_rejects_single_knot() {
        assert!(PowerCurve::new(vec![(3.0, 0.0)]).is_err());
    }

    #[test]
    fn inverse_round_trips_on_ramp() {
        let curve = ramp_curve();
        for &p in &[150.0, 300.0, 600.0, 1200.0] {
            let speed = curve.speed_at_power(p).expect("power is on the ramp");
            assert!((curve.power_at(speed) - p).abs() < 1e-9);
        }
    }

    #[test]
    fn inverse_handles_rated_plateau() {
        let curve = ramp_curve();
        // 1500 kW appears twice; dedup keeps the first knot (12 m/s)
        assert_eq!(curve.speed_at_power(1500.0), Some(12.0));
    }

    #[test]
    fn inverse_none_outside_range() {
        let curve = ramp_curve();
        assert_eq!(curve.speed_at_power(2000.0), None);
        assert_eq!(curve.speed_at_power(-5.0), None);
    }

    #[test]
    fn model_row_applies_losses() {
        let curve = ramp_curve();
        let time = chrono::NaiveDate::from_ymd_opt(2020, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let lossless = model_row(time, Some(15.0), Some(0.0), 6.0, 10.0, 0.05, 10.0, &curve, 0.0);
        let lossy = model_row(time, Some(15.0), Some(0.0), 6.0, 10.0, 0.05, 10.0, &curve, 0.1);
        assert!((lossy.power_kw - lossless.power_kw * 0.9).abs() < 1e-9);
    }

    #[test]
    fn model_row_hub_equals_ref_height_uses_measured_speed() {
        let curve = ramp_curve();
        let time = chrono::NaiveDate::from_ymd_opt(2020, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let row = model_row(time, None, None, 9.0, 10.0, 0.05, 10.0, &curve, 0.0);
        assert!((row.w_hub - 9.0).abs() < 1e-12);
        assert!((row.power_kw - 900.0).abs() < 1e-9);
    }
}
