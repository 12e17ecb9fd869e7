//! Curtailment-loss summaries: production, energy, revenue, and hours
//! curtailed per cut-in speed, for one farm-year or a whole fleet.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, StudyError};
use crate::tables::model::ModelSeries;

/// Curtailment strategy under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Uniform cap: wind speed alone decides.
    Blanket,
    /// Weather-aware: wind speed plus bat-activity conditions.
    Smart,
}

impl Strategy {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Blanket => "Blanket",
            Self::Smart => "Smart",
        }
    }

    /// Both strategies, blanket first.
    pub const ALL: [Strategy; 2] = [Strategy::Blanket, Strategy::Smart];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One joined hour at farm scale.
#[derive(Debug, Clone)]
pub struct FarmHour {
    /// Hour start.
    pub time: NaiveDateTime,
    /// Uncurtailed farm output (MW).
    pub power_mw: f64,
    /// Farm output under blanket curtailment, per cut-in (MW).
    pub blanket_mw: Vec<f64>,
    /// Farm output under smart curtailment, per cut-in (MW).
    pub smart_mw: Vec<f64>,
    /// Pool price for the hour (CAD/MWh); 0 when unpublished.
    pub price: f64,
}

/// A farm-scale (or fleet-scale) hourly series joined to prices.
#[derive(Debug, Clone)]
pub struct FarmSeries {
    /// Asset name, or a fleet label for merged series.
    pub label: String,
    /// Cut-in ladder shared by all hours.
    pub cut_ins: Vec<f64>,
    /// Joined hours.
    pub hours: Vec<FarmHour>,
}

impl FarmSeries {
    /// Scales a per-turbine model series to farm MW and joins pool prices.
    ///
    /// Hours with no price entry join at 0 CAD/MWh; their count is logged
    /// because they understate foregone revenue.
    pub fn from_model(
        label: &str,
        series: &ModelSeries,
        turbine_count: u32,
        prices: &HashMap<NaiveDateTime, f64>,
    ) -> Self {
        let scale = turbine_count as f64 / 1000.0;
        let mut unpriced = 0usize;

        let hours = series
            .rows
            .iter()
            .map(|row| {
                let price = match prices.get(&row.time) {
                    Some(p) => *p,
                    None => {
                        unpriced += 1;
                        0.0
                    }
                };
                FarmHour {
                    time: row.time,
                    power_mw: row.power_kw * scale,
                    blanket_mw: row.blanket_kw.iter().map(|kw| kw * scale).collect(),
                    smart_mw: row.smart_kw.iter().map(|kw| kw * scale).collect(),
                    price,
                }
            })
            .collect();

        if unpriced > 0 {
            warn!(label, unpriced, "hours joined without a pool price");
        }
        Self {
            label: label.to_string(),
            cut_ins: series.cut_ins.clone(),
            hours,
        }
    }

    /// Concatenates farm-year series into one fleet series.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` if no parts are given or the parts disagree on
    /// the cut-in ladder.
    pub fn merge(label: &str, parts: Vec<FarmSeries>) -> Result<Self> {
        let Some(first) = parts.first() else {
            return Err(StudyError::EmptyInput(
                "no farm series to merge".to_string(),
            ));
        };
        let cut_ins = first.cut_ins.clone();
        if parts.iter().any(|p| p.cut_ins != cut_ins) {
            return Err(StudyError::EmptyInput(
                "farm series disagree on the cut-in ladder".to_string(),
            ));
        }
        let hours = parts.into_iter().flat_map(|p| p.hours).collect();
        Ok(Self {
            label: label.to_string(),
            cut_ins,
            hours,
        })
    }
}

/// Loss figures for one cut-in speed, both strategies side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct CutInSummary {
    /// Regulated cut-in speed (m/s).
    pub cut_in_ms: f64,
    /// Production loss under blanket curtailment (% of uncurtailed).
    pub loss_blanket_pct: f64,
    /// Production loss under smart curtailment (% of uncurtailed).
    pub loss_smart_pct: f64,
    /// Annual energy losses, blanket (MWh).
    pub losses_blanket_mwh: f64,
    /// Annual energy losses, smart (MWh).
    pub losses_smart_mwh: f64,
    /// Foregone pool revenue, blanket (CAD/yr).
    pub revenue_blanket_cad: f64,
    /// Foregone pool revenue, smart (CAD/yr).
    pub revenue_smart_cad: f64,
    /// Share of hours spent curtailed, blanket (%).
    pub curtailed_blanket_pct: f64,
    /// Share of hours spent curtailed, smart (%).
    pub curtailed_smart_pct: f64,
    /// Hours spent curtailed, blanket.
    pub curtailed_blanket_hours: usize,
    /// Hours spent curtailed, smart.
    pub curtailed_smart_hours: usize,
}

impl CutInSummary {
    /// Field accessors keyed by strategy, for the box-plot study.
    pub fn loss_pct(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Blanket => self.loss_blanket_pct,
            Strategy::Smart => self.loss_smart_pct,
        }
    }

    /// Annual energy losses for a strategy (MWh).
    pub fn losses_mwh(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Blanket => self.losses_blanket_mwh,
            Strategy::Smart => self.losses_smart_mwh,
        }
    }

    /// Foregone revenue for a strategy (CAD/yr).
    pub fn revenue_cad(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Blanket => self.revenue_blanket_cad,
            Strategy::Smart => self.revenue_smart_cad,
        }
    }
}

/// The per-cut-in loss table for one series.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    /// Asset or fleet label.
    pub label: String,
    /// One row per cut-in, ascending.
    pub rows: Vec<CutInSummary>,
}

impl SummaryTable {
    /// Computes the table from a joined series.
    pub fn from_series(series: &FarmSeries) -> Self {
        let total_mwh: f64 = series.hours.iter().map(|h| h.power_mw).sum();
        let total_hours = series.hours.len();

        let rows = series
            .cut_ins
            .iter()
            .enumerate()
            .map(|(i, &cut_in_ms)| {
                let mut sum_blanket = 0.0;
                let mut sum_smart = 0.0;
                let mut hours_blanket = 0usize;
                let mut hours_smart = 0usize;
                let mut revenue_blanket = 0.0;
                let mut revenue_smart = 0.0;

                for h in &series.hours {
                    sum_blanket += h.blanket_mw[i];
                    sum_smart += h.smart_mw[i];
                    if h.blanket_mw[i] == 0.0 && h.power_mw != 0.0 {
                        hours_blanket += 1;
                        revenue_blanket += h.price * h.power_mw;
                    }
                    if h.smart_mw[i] == 0.0 && h.power_mw != 0.0 {
                        hours_smart += 1;
                        revenue_smart += h.price * h.power_mw;
                    }
                }

                let losses_blanket = total_mwh - sum_blanket;
                let losses_smart = total_mwh - sum_smart;
                let pct = |losses: f64| {
                    if total_mwh > 0.0 {
                        losses / total_mwh * 100.0
                    } else {
                        0.0
                    }
                };
                let hours_pct = |hours: usize| {
                    if total_hours > 0 {
                        hours as f64 / total_hours as f64 * 100.0
                    } else {
                        0.0
                    }
                };

                CutInSummary {
                    cut_in_ms,
                    loss_blanket_pct: pct(losses_blanket),
                    loss_smart_pct: pct(losses_smart),
                    losses_blanket_mwh: losses_blanket,
                    losses_smart_mwh: losses_smart,
                    revenue_blanket_cad: revenue_blanket,
                    revenue_smart_cad: revenue_smart,
                    curtailed_blanket_pct: hours_pct(hours_blanket),
                    curtailed_smart_pct: hours_pct(hours_smart),
                    curtailed_blanket_hours: hours_blanket,
                    curtailed_smart_hours: hours_smart,
                }
            })
            .collect();

        info!(label = %series.label, hours = total_hours, "summarized curtailment losses");
        Self {
            label: series.label.clone(),
            rows,
        }
    }

    /// Reads a summary table back from CSV (the layout written by
    /// [`crate::io::export::write_summary_csv`]).
    ///
    /// # Errors
    ///
    /// Returns `Csv` on unreadable input or a row that fails to
    /// deserialize.
    pub fn from_csv_file(path: &Path, label: &str) -> Result<Self> {
        #[derive(Debug, Deserialize)]
        struct RawSummaryRow {
            #[serde(rename = "Cut-in (m/s)")]
            cut_in_ms: f64,
            #[serde(rename = "Production blanket %")]
            loss_blanket_pct: f64,
            #[serde(rename = "Production smart %")]
            loss_smart_pct: f64,
            #[serde(rename = "Annual Losses blanket (MWh)")]
            losses_blanket_mwh: f64,
            #[serde(rename = "Annual Losses smart (MWh)")]
            losses_smart_mwh: f64,
            #[serde(rename = "CAD/yr blanket")]
            revenue_blanket_cad: f64,
            #[serde(rename = "CAD/yr smart")]
            revenue_smart_cad: f64,
            #[serde(rename = "Time Curtailed blanket %")]
            curtailed_blanket_pct: f64,
            #[serde(rename = "Time Curtailed smart %")]
            curtailed_smart_pct: f64,
            #[serde(rename = "Time Curtailed blanket hr")]
            curtailed_blanket_hours: usize,
            #[serde(rename = "Time Curtailed smart hr")]
            curtailed_smart_hours: usize,
        }

        let mut reader = csv::Reader::from_path(path).map_err(|e| StudyError::csv(path, e))?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            let raw: RawSummaryRow = row.map_err(|e| StudyError::csv(path, e))?;
            rows.push(CutInSummary {
                cut_in_ms: raw.cut_in_ms,
                loss_blanket_pct: raw.loss_blanket_pct,
                loss_smart_pct: raw.loss_smart_pct,
                losses_blanket_mwh: raw.losses_blanket_mwh,
                losses_smart_mwh: raw.losses_smart_mwh,
                revenue_blanket_cad: raw.revenue_blanket_cad,
                revenue_smart_cad: raw.revenue_smart_cad,
                curtailed_blanket_pct: raw.curtailed_blanket_pct,
                curtailed_smart_pct: raw.curtailed_smart_pct,
                curtailed_blanket_hours: raw.curtailed_blanket_hours,
                curtailed_smart_hours: raw.curtailed_smart_hours,
            });
        }
        Ok(Self {
            label: label.to_string(),
            rows,
        })
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Curtailment losses: {} ---", self.label)?;
        writeln!(
            f,
            "{:>8} | {:>10} {:>10} | {:>12} {:>12} | {:>12} {:>12} | {:>8} {:>8}",
            "cut-in",
            "blanket %",
            "smart %",
            "blanket MWh",
            "smart MWh",
            "blanket CAD",
            "smart CAD",
            "blk hr",
            "smt hr"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:>8.1} | {:>10.2} {:>10.2} | {:>12.2} {:>12.2} | {:>12.0} {:>12.0} | {:>8} {:>8}",
                r.cut_in_ms,
                r.loss_blanket_pct,
                r.loss_smart_pct,
                r.losses_blanket_mwh,
                r.losses_smart_mwh,
                r.revenue_blanket_cad,
                r.revenue_smart_cad,
                r.curtailed_blanket_hours,
                r.curtailed_smart_hours,
            )?;
        }
        Ok(())
    }
}
