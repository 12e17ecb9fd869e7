//! Box-plot statistics for the seasonal loss study.
//!
//! Loss samples are grouped by scenario × year × cut-in × strategy and
//! described by Tukey five-number summaries with 1.5×IQR whisker bounds.

use std::collections::BTreeMap;

use super::losses::Strategy;

/// Cut-in speeds the box-plot study focuses on (m/s).
pub const FOCUS_CUT_INS: [f64; 2] = [5.5, 8.0];

/// Linear-interpolation quantile (the convention spreadsheet tools and
/// the summary tables downstream expect). `values` must be sorted.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let t = pos - lo as f64;
    sorted[lo] + t * (sorted[hi] - sorted[lo])
}

/// Tukey five-number summary with whisker bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub mean: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    /// Lower whisker bound, `q1 − 1.5·IQR`.
    pub lower_bound: f64,
    /// Upper whisker bound, `q3 + 1.5·IQR`.
    pub upper_bound: f64,
    pub n: usize,
}

impl BoxStats {
    /// Describes a sample; `None` when it is empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.50);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        Some(Self {
            min: sorted[0],
            q1,
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            iqr,
            lower_bound: q1 - 1.5 * iqr,
            upper_bound: q3 + 1.5 * iqr,
            n: sorted.len(),
        })
    }

    /// Tukey outlier test against the whisker bounds.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_bound || value > self.upper_bound
    }
}

/// One observation of a loss metric for the box-plot study.
#[derive(Debug, Clone)]
pub struct LossSample {
    /// Scenario label (e.g. "Full Season").
    pub scenario: String,
    /// Study year.
    pub year: i32,
    /// Asset name.
    pub turbine: String,
    /// Regulated cut-in speed (m/s).
    pub cut_in_ms: f64,
    /// Curtailment strategy.
    pub strategy: Strategy,
    /// Metric value (production %, MWh/MW, or CAD/MW).
    pub value: f64,
}

/// Grouping key and statistics for one box.
#[derive(Debug, Clone)]
pub struct GroupedStats {
    pub scenario: String,
    pub year: i32,
    pub cut_in_ms: f64,
    pub strategy: Strategy,
    pub stats: BoxStats,
}

/// Groups samples by scenario × year × cut-in × strategy and describes
/// each group. Output is sorted by the group key.
pub fn grouped_stats(samples: &[LossSample]) -> Vec<GroupedStats> {
    // Cut-in speeds are one-decimal ladder values; keying on tenths keeps
    // the map ordering total without comparing floats.
    let mut groups: BTreeMap<(String, i32, i64, &'static str), Vec<f64>> = BTreeMap::new();
    for s in samples {
        let key = (
            s.scenario.clone(),
            s.year,
            (s.cut_in_ms * 10.0).round() as i64,
            s.strategy.label(),
        );
        groups.entry(key).or_default().push(s.value);
    }

    groups
        .into_iter()
        .filter_map(|((scenario, year, cut_tenths, strategy), values)| {
            BoxStats::from_values(&values).map(|stats| GroupedStats {
                scenario,
                year,
                cut_in_ms: cut_tenths as f64 / 10.0,
                strategy: if strategy == "Blanket" {
                    Strategy::Blanket
                } else {
                    Strategy::Smart
                },
                stats,
            })
        })
        .collect()
}

/// One row of the wide-format production-loss table:
/// year × turbine with one column per strategy × focus cut-in.
#[derive(Debug, Clone)]
pub struct WideProductionRow {
    pub year: i32,
    pub turbine: String,
    /// Values in `(Blanket, 5.5), (Blanket, 8.0), (Smart, 5.5), (Smart, 8.0)` order.
    pub values: [Option<f64>; 4],
}

/// Pivots production-loss samples into the wide per-station table.
pub fn production_wide_table(samples: &[LossSample]) -> Vec<WideProductionRow> {
    let mut rows: BTreeMap<(i32, String), [Option<f64>; 4]> = BTreeMap::new();
    for s in samples {
        let col = match (s.strategy, (s.cut_in_ms * 10.0).round() as i64) {
            (Strategy::Blanket, 55) => 0,
            (Strategy::Blanket, 80) => 1,
            (Strategy::Smart, 55) => 2,
            (Strategy::Smart, 80) => 3,
            _ => continue,
        };
        let entry = rows.entry((s.year, s.turbine.clone())).or_default();
        // First observation wins, matching the source tables' aggfunc
        if entry[col].is_none() {
            entry[col] = Some(s.value);
        }
    }

    rows.into_iter()
        .map(|((year, turbine), values)| WideProductionRow {
            year,
            turbine,
            values,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn box_stats_on_known_sample() {
        let stats = BoxStats::from_values(&[2.0, 4.0, 4.0, 5.0, 7.0, 9.0]).expect("non-empty");
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.n, 6);
        assert!((stats.mean - 31.0 / 6.0).abs() < 1e-12);
        assert!((stats.median - 4.5).abs() < 1e-12);
        assert!((stats.q1 - 4.0).abs() < 1e-12);
        assert!((stats.q3 - 6.5).abs() < 1e-12);
        assert!((stats.iqr - 2.5).abs() < 1e-12);
        assert!((stats.lower_bound - 0.25).abs() < 1e-12);
        assert!((stats.upper_bound - 10.25).abs() < 1e-12);
    }

    #[test]
    fn outlier_detection_uses_whisker_bounds() {
        let stats = BoxStats::from_values(&[2.0, 4.0, 4.0, 5.0, 7.0, 9.0]).expect("non-empty");
        assert!(stats.is_outlier(0.0));
        assert!(stats.is_outlier(11.0));
        assert!(!stats.is_outlier(9.0));
    }

    #[test]
    fn empty_sample_has_no_stats() {
        assert!(BoxStats::from_values(&[]).is_none());
    }

    fn sample(year: i32, turbine: &str, cut: f64, strategy: Strategy, value: f64) -> LossSample {
        LossSample {
            scenario: "Full Season".to_string(),
            year,
            turbine: turbine.to_string(),
            cut_in_ms: cut,
            strategy,
            value,
        }
    }

    #[test]
    fn grouping_splits_by_strategy_and_cut_in() {
        let samples = vec![
            sample(2020, "A", 5.5, Strategy::Blanket, 1.0),
            sample(2020, "B", 5.5, Strategy::Blanket, 3.0),
            sample(2020, "A", 5.5, Strategy::Smart, 0.5),
            sample(2020, "A", 8.0, Strategy::Blanket, 4.0),
        ];
        let groups = grouped_stats(&samples);
        assert_eq!(groups.len(), 3);
        let blanket_55 = groups
            .iter()
            .find(|g| g.cut_in_ms == 5.5 && g.strategy == Strategy::Blanket)
            .expect("group exists");
        assert_eq!(blanket_55.stats.n, 2);
        assert!((blanket_55.stats.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn wide_table_pivots_focus_cut_ins() {
        let samples = vec![
            sample(2020, "A", 5.5, Strategy::Blanket, 1.0),
            sample(2020, "A", 8.0, Strategy::Blanket, 2.0),
            sample(2020, "A", 5.5, Strategy::Smart, 0.5),
            sample(2020, "A", 8.0, Strategy::Smart, 1.5),
            sample(2020, "A", 6.0, Strategy::Smart, 9.9), // not a focus cut-in
        ];
        let rows = production_wide_table(&samples);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].values,
            [Some(1.0), Some(2.0), Some(0.5), Some(1.5)]
        );
    }
}
