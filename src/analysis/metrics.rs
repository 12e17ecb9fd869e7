//! Error metrics comparing modeled against actual production, and
//! wind-speed distribution similarity.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::warn;

/// Histogram bin edges for the wind-speed distribution study (m/s).
pub const SPEED_BIN_EDGES: [f64; 5] = [4.0, 6.0, 8.0, 10.0, 12.0];

/// Mid-summer analysis period bounds (month, day): Jul 15 – Sep 30.
pub const MIDSUMMER_START: (u32, u32) = (7, 15);
/// See [`MIDSUMMER_START`].
pub const MIDSUMMER_END: (u32, u32) = (9, 30);

/// Inclusive datetime bounds of the mid-summer period for a year.
pub fn midsummer_bounds(year: i32) -> (NaiveDateTime, NaiveDateTime) {
    let start = NaiveDate::from_ymd_opt(year, MIDSUMMER_START.0, MIDSUMMER_START.1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("Jul 15 is always valid");
    let end = NaiveDate::from_ymd_opt(year, MIDSUMMER_END.0, MIDSUMMER_END.1)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .expect("Sep 30 is always valid");
    (start, end)
}

/// Metric calculation failures.
#[derive(Debug, Clone, Error)]
pub enum MetricsError {
    #[error("dimension mismatch: actual={actual}, predicted={predicted}")]
    DimensionMismatch { actual: usize, predicted: usize },

    #[error("empty data provided")]
    EmptyData,
}

/// RMSE and MAPE over paired actual/predicted samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMetrics {
    /// Root-mean-square error, in the sample unit.
    pub rmse: f64,
    /// Mean absolute percentage error (%).
    pub mape_pct: f64,
    /// Number of samples evaluated.
    pub samples: usize,
}

impl ErrorMetrics {
    /// Calculates metrics from paired samples.
    ///
    /// Samples with a near-zero actual are excluded from MAPE (division by
    /// zero) but still count toward RMSE.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` or `EmptyData`.
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> Result<Self, MetricsError> {
        if actual.len() != predicted.len() {
            return Err(MetricsError::DimensionMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(MetricsError::EmptyData);
        }

        let n = actual.len() as f64;
        let mut sq_sum = 0.0;
        let mut pct_sum = 0.0;
        let mut pct_n = 0usize;

        for (a, p) in actual.iter().zip(predicted.iter()) {
            let err = p - a;
            sq_sum += err * err;
            if a.abs() > 1e-6 {
                pct_sum += (err / a).abs() * 100.0;
                pct_n += 1;
            }
        }
        if pct_n < actual.len() {
            warn!(
                excluded = actual.len() - pct_n,
                "samples with zero actual excluded from MAPE"
            );
        }

        Ok(Self {
            rmse: (sq_sum / n).sqrt(),
            mape_pct: if pct_n > 0 { pct_sum / pct_n as f64 } else { 0.0 },
            samples: actual.len(),
        })
    }
}

impl fmt::Display for ErrorMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAPE: {:.2}%  RMSE: {:.2}  (n={})",
            self.mape_pct, self.rmse, self.samples
        )
    }
}

/// Annual modeled-vs-actual totals for the turbines of one year.
#[derive(Debug, Clone)]
pub struct AnnualComparison {
    /// Study year.
    pub year: i32,
    /// (turbine, modeled MWh, actual MWh) triples; both sides present.
    pub entries: Vec<(String, f64, f64)>,
}

impl AnnualComparison {
    /// Error metrics of modeled vs. actual annual energy.
    ///
    /// # Errors
    ///
    /// Returns `EmptyData` when no turbine has both sides.
    pub fn metrics(&self) -> Result<ErrorMetrics, MetricsError> {
        let actual: Vec<f64> = self.entries.iter().map(|e| e.2).collect();
        let modeled: Vec<f64> = self.entries.iter().map(|e| e.1).collect();
        ErrorMetrics::calculate(&actual, &modeled)
    }
}

/// Normalized histogram over the given bin edges.
///
/// Returns one density value per bin; densities integrate to 1 over the
/// covered range. Values outside the edges are ignored.
pub fn density_histogram(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; bins];
    let mut total = 0usize;

    for &v in values {
        for i in 0..bins {
            let last = i == bins - 1;
            let in_bin = v >= edges[i] && (v < edges[i + 1] || (last && v == edges[i + 1]));
            if in_bin {
                counts[i] += 1;
                total += 1;
                break;
            }
        }
    }

    if total == 0 {
        return vec![0.0; bins];
    }
    counts
        .iter()
        .enumerate()
        .map(|(i, &c)| c as f64 / (total as f64 * (edges[i + 1] - edges[i])))
        .collect()
}

/// RMSE between two density histograms (distribution similarity).
///
/// # Errors
///
/// Returns `DimensionMismatch` or `EmptyData` from the underlying metric.
pub fn histogram_rmse(a: &[f64], b: &[f64]) -> Result<f64, MetricsError> {
    ErrorMetrics::calculate(a, b).map(|m| m.rmse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_has_zero_error() {
        let vals = [100.0, 200.0, 300.0];
        let m = ErrorMetrics::calculate(&vals, &vals).expect("should calculate");
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mape_pct, 0.0);
        assert_eq!(m.samples, 3);
    }

    #[test]
    fn hand_computed_metrics() {
        let actual = [100.0, 200.0];
        let predicted = [110.0, 180.0];
        let m = ErrorMetrics::calculate(&actual, &predicted).expect("should calculate");
        // errors 10, -20 → rmse = sqrt((100+400)/2)
        assert!((m.rmse - (250.0_f64).sqrt()).abs() < 1e-9);
        // |10/100| + |20/200| over 2 → 10%
        assert!((m.mape_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_actuals_are_excluded_from_mape() {
        let actual = [0.0, 100.0];
        let predicted = [50.0, 110.0];
        let m = ErrorMetrics::calculate(&actual, &predicted).expect("should calculate");
        assert!((m.mape_pct - 10.0).abs() < 1e-9);
        // but the zero-actual error still feeds RMSE
        assert!(m.rmse > 10.0);
    }

    #[test]
    fn mismatched_lengths_error() {
        assert!(ErrorMetrics::calculate(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn empty_input_errors() {
        assert!(matches!(
            ErrorMetrics::calculate(&[], &[]),
            Err(MetricsError::EmptyData)
        ));
    }

    #[test]
    fn density_histogram_integrates_to_one() {
        let values = [4.5, 5.0, 6.5, 7.0, 9.0, 11.5];
        let dens = density_histogram(&values, &SPEED_BIN_EDGES);
        assert_eq!(dens.len(), 4);
        let integral: f64 = dens
            .iter()
            .enumerate()
            .map(|(i, d)| d * (SPEED_BIN_EDGES[i + 1] - SPEED_BIN_EDGES[i]))
            .sum();
        assert!((integral - 1.0).abs() < 1e-9);
    }

    #[test]
    fn density_histogram_ignores_out_of_range() {
        let dens = density_histogram(&[1.0, 20.0], &SPEED_BIN_EDGES);
        assert!(dens.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn last_edge_is_inclusive() {
        let dens = density_histogram(&[12.0], &SPEED_BIN_EDGES);
        assert!(dens[3] > 0.0);
    }

    #[test]
    fn identical_distributions_have_zero_rmse() {
        let a = density_histogram(&[4.5, 6.5, 8.5], &SPEED_BIN_EDGES);
        let rmse = histogram_rmse(&a, &a).expect("should calculate");
        assert_eq!(rmse, 0.0);
    }

    #[test]
    fn midsummer_bounds_cover_the_period() {
        let (start, end) = midsummer_bounds(2021);
        assert_eq!(start.date(), NaiveDate::from_ymd_opt(2021, 7, 15).unwrap());
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2021, 9, 30).unwrap());
        assert!(start < end);
    }
}
