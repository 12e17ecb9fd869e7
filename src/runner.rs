//! Study orchestration: wires the tables, the power model, and the
//! aggregation passes into the per-command operations the CLI exposes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use tracing::{error, info, warn};

use crate::analysis::losses::{FarmSeries, Strategy, SummaryTable};
use crate::analysis::metrics::{
    AnnualComparison, ErrorMetrics, SPEED_BIN_EDGES, density_histogram, histogram_rmse,
    midsummer_bounds,
};
use crate::analysis::monthly::MonthlyTotals;
use crate::analysis::stats::{FOCUS_CUT_INS, LossSample, grouped_stats, production_wide_table};
use crate::backcast;
use crate::blanket::{BlanketCalendar, apply_curtailment};
use crate::charts;
use crate::charts::speed_dist::SpeedDistYear;
use crate::config::StudyConfig;
use crate::error::{Result, StudyError};
use crate::io::discover;
use crate::io::export;
use crate::power::{self, PowerCurve, PowerRow};
use crate::tables::{actual, met, model, price, sun, turbine::TurbineRecord, turbine::TurbineTable};

/// Sweep bookkeeping: how many farm-years ran and how many were skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

/// The study driver. Holds the configuration and the turbine metadata;
/// everything else is loaded per operation.
pub struct StudyRunner {
    config: StudyConfig,
    turbines: TurbineTable,
}

impl StudyRunner {
    /// Loads the turbine metadata and builds the runner.
    ///
    /// # Errors
    ///
    /// Returns table-loading errors for an unreadable or empty metadata
    /// file.
    pub fn new(config: StudyConfig) -> Result<Self> {
        let turbines = TurbineTable::from_csv_file(&config.directories.turbine_table())?;
        Ok(Self { config, turbines })
    }

    /// Builds a runner from an already-loaded table (fixtures and tests).
    pub fn with_table(config: StudyConfig, turbines: TurbineTable) -> Self {
        Self { config, turbines }
    }

    /// The active configuration.
    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// The turbine metadata.
    pub fn turbines(&self) -> &TurbineTable {
        &self.turbines
    }

    /// Resolves a `--turbine` selector: a positional index into the
    /// metadata table, or a (case-insensitive, substring) asset name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTurbine` when nothing matches.
    pub fn resolve_turbine(&self, selector: &str) -> Result<&TurbineRecord> {
        if let Ok(index) = selector.parse::<usize>() {
            return self
                .turbines
                .get(index)
                .ok_or_else(|| StudyError::UnknownTurbine(selector.to_string()));
        }
        self.turbines
            .find(selector)
            .ok_or_else(|| StudyError::UnknownTurbine(selector.to_string()))
    }

    fn power_curve_for(&self, turbine: &TurbineRecord) -> Result<PowerCurve> {
        let path = self
            .config
            .directories
            .curve_dir()
            .join(format!("{}.txt", turbine.model));
        PowerCurve::from_table_file(&path)
    }

    fn ensure_result_dir(&self) -> Result<PathBuf> {
        let dir = self.config.scenario_result_dir();
        fs::create_dir_all(&dir).map_err(|e| StudyError::io(&dir, e))?;
        Ok(dir)
    }

    // ---- modeling toolkit ------------------------------------------------

    /// Runs the forward model for one farm-year and writes the output CSV.
    ///
    /// # Errors
    ///
    /// Returns discovery, loading, or export errors; row-level problems
    /// degrade to zero-power rows instead.
    pub fn model_turbine_year(&self, turbine: &TurbineRecord, year: i32) -> Result<PathBuf> {
        let dirs = &self.config.directories;
        let physics = &self.config.physics;

        let met_path = discover::find_met_file(&dirs.data, &turbine.station, year)?;
        let readings = met::load_met_file(&met_path)?;
        let sun_days = sun::load_sun_days(&dirs.sun_table(), &turbine.asset_name, year)?;
        let curve = self.power_curve_for(turbine)?;
        let window = self.config.curtailment.season_window()?;

        let mut rows: Vec<PowerRow> = Vec::with_capacity(readings.len());
        let mut degraded = 0usize;
        for r in &readings {
            match r.wind_kmh {
                Some(kmh) => {
                    let roughness = turbine
                        .roughness_for_month(r.time.month())
                        .unwrap_or(0.0);
                    rows.push(power::model_row(
                        r.time,
                        r.temp_c,
                        r.precip_mm,
                        kmh * physics.kmh_to_ms,
                        turbine.hub_height_m,
                        roughness,
                        physics.ref_height_m,
                        &curve,
                        physics.losses,
                    ));
                }
                None => {
                    degraded += 1;
                    rows.push(PowerRow {
                        time: r.time,
                        temp_c: r.temp_c,
                        precip_mm: r.precip_mm,
                        wind_ms: 0.0,
                        w_hub: 0.0,
                        power_kw: 0.0,
                    });
                }
            }
        }
        if degraded > 0 {
            warn!(
                asset = %turbine.asset_name,
                year,
                degraded,
                "readings without wind speed modeled as zero output"
            );
        }

        let calendar = BlanketCalendar::build(&sun_days, window, year);
        let curtailed = apply_curtailment(&rows, &calendar, &self.config.curtailment.cut_in_speeds);

        let out_dir = self.ensure_result_dir()?;
        let out_path = out_dir.join(export::model_file_name(&turbine.asset_name, year));
        export::export_model_csv(&curtailed, &self.config.curtailment.cut_in_speeds, &out_path)?;
        info!(
            asset = %turbine.asset_name,
            year,
            rows = curtailed.len(),
            curfew_days = calendar.len(),
            path = %out_path.display(),
            "model run complete"
        );
        Ok(out_path)
    }

    /// Back-calculates wind speeds from actual generation for one
    /// farm-year and writes the output CSV.
    ///
    /// # Errors
    ///
    /// Returns discovery, loading, or export errors.
    pub fn backcast_turbine_year(&self, turbine: &TurbineRecord, year: i32) -> Result<PathBuf> {
        let dirs = &self.config.directories;
        let actual_path = discover::find_actual_file(&dirs.real, &turbine.asset_name, year)?;
        let readings = actual::load_actual_file(&actual_path)?;
        let curve = self.power_curve_for(turbine)?;

        let rows = backcast::backcast_series(
            &readings,
            turbine.turbine_count,
            &curve,
            self.config.physics.losses,
        );

        let out_dir = self.ensure_result_dir()?;
        let out_path = out_dir.join(export::backcast_file_name(&turbine.asset_name, year));
        export::export_backcast_csv(&rows, &out_path)?;
        info!(
            asset = %turbine.asset_name,
            year,
            rows = rows.len(),
            path = %out_path.display(),
            "back-cast complete"
        );
        Ok(out_path)
    }

    /// Runs the forward model for every farm × study year, skipping
    /// failures.
    pub fn model_all(&self) -> RunOutcome {
        self.sweep(|runner, turbine, year| runner.model_turbine_year(turbine, year))
    }

    /// Runs the back-cast for every farm × study year, skipping failures.
    pub fn backcast_all(&self) -> RunOutcome {
        self.sweep(|runner, turbine, year| runner.backcast_turbine_year(turbine, year))
    }

    fn sweep(
        &self,
        op: impl Fn(&Self, &TurbineRecord, i32) -> Result<PathBuf>,
    ) -> RunOutcome {
        let mut outcome = RunOutcome::default();
        for turbine in self.turbines.unique() {
            for &year in &self.config.study.years {
                match op(self, turbine, year) {
                    Ok(_) => outcome.succeeded += 1,
                    Err(e) => {
                        outcome.failed += 1;
                        error!(
                            asset = %turbine.asset_name,
                            year,
                            "skipping farm-year: {e}"
                        );
                    }
                }
            }
        }
        outcome
    }

    // ---- aggregation toolkit ---------------------------------------------

    fn prices_for_year(
        &self,
        year: i32,
        cache: &mut HashMap<i32, HashMap<NaiveDateTime, f64>>,
    ) -> Option<HashMap<NaiveDateTime, f64>> {
        if let Some(index) = cache.get(&year) {
            return Some(index.clone());
        }
        let path = self.config.directories.pool_price_file(year);
        match price::load_pool_prices(&path, year) {
            Ok(series) => {
                let index = price::price_index(&series);
                cache.insert(year, index.clone());
                Some(index)
            }
            Err(e) => {
                warn!(year, "no pool prices: {e}");
                None
            }
        }
    }

    /// Builds per-farm-year loss summaries (CSV + losses-vs-hours chart)
    /// and, when `fleet` is set, a fleet-wide summary across all farms
    /// and years (`summary_fleet.csv`).
    ///
    /// Returns the tables in generation order, the fleet table last.
    ///
    /// # Errors
    ///
    /// Returns an error only when nothing could be summarized; individual
    /// farm-years are skipped with a log line.
    pub fn summarize_losses(&self, fleet: bool) -> Result<Vec<SummaryTable>> {
        let result_dir = self.ensure_result_dir()?;
        let mut price_cache = HashMap::new();
        let mut tables = Vec::new();
        let mut fleet_parts: Vec<FarmSeries> = Vec::new();

        for turbine in self.turbines.unique() {
            for &year in &self.config.study.years {
                let model_path =
                    result_dir.join(export::model_file_name(&turbine.asset_name, year));
                if !model_path.is_file() {
                    warn!(asset = %turbine.asset_name, year, "no model output, skipping");
                    continue;
                }
                let Some(prices) = self.prices_for_year(year, &mut price_cache) else {
                    continue;
                };
                let series = match model::read_model_csv(&model_path) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(asset = %turbine.asset_name, year, "unreadable model output: {e}");
                        continue;
                    }
                };

                let farm = FarmSeries::from_model(
                    &turbine.asset_name,
                    &series,
                    turbine.turbine_count,
                    &prices,
                );
                let table = SummaryTable::from_series(&farm);

                let csv_path =
                    result_dir.join(export::summary_file_name(&turbine.asset_name, year));
                export::export_summary_csv(&table, &csv_path)?;
                if self.config.study.save_plots {
                    let png_path = result_dir.join(format!(
                        "losses_vs_hours_{}_{year}.png",
                        turbine.asset_name
                    ));
                    charts::losses::render_losses_vs_hours(&table, &png_path)?;
                }

                if fleet {
                    fleet_parts.push(farm);
                }
                tables.push(table);
            }
        }

        if tables.is_empty() {
            return Err(StudyError::EmptyInput(
                "no farm-year could be summarized".to_string(),
            ));
        }

        if fleet {
            let merged = FarmSeries::merge("Alberta fleet", fleet_parts)?;
            let table = SummaryTable::from_series(&merged);
            export::export_summary_csv(&table, &result_dir.join("summary_fleet.csv"))?;
            tables.push(table);
        }
        Ok(tables)
    }

    /// Compares annual modeled energy against actual generation per year
    /// and writes `metrics_rmse_mape.csv` next to the model outputs.
    ///
    /// # Errors
    ///
    /// Returns an error when no year has enough data.
    pub fn annual_metrics(&self) -> Result<Vec<(i32, ErrorMetrics)>> {
        let result_dir = self.ensure_result_dir()?;
        let mut per_year = Vec::new();

        for &year in &self.config.study.years {
            let mut entries = Vec::new();
            for turbine in self.turbines.unique() {
                let model_path =
                    result_dir.join(export::model_file_name(&turbine.asset_name, year));
                let modeled_mwh = match model::read_model_csv(&model_path) {
                    Ok(series) => {
                        series.rows.iter().map(|r| r.power_kw).sum::<f64>() / 1000.0
                            * turbine.turbine_count as f64
                    }
                    Err(_) => {
                        warn!(asset = %turbine.asset_name, year, "no modeled energy, skipping");
                        continue;
                    }
                };

                let actual_mwh = match discover::find_actual_file(
                    &self.config.directories.real,
                    &turbine.asset_name,
                    year,
                )
                .and_then(|p| actual::load_actual_file(&p))
                {
                    Ok(readings) => actual::total_volume_mwh(&readings),
                    Err(e) => {
                        warn!(asset = %turbine.asset_name, year, "no actual energy: {e}");
                        continue;
                    }
                };

                entries.push((turbine.asset_name.clone(), modeled_mwh, actual_mwh));
            }

            let comparison = AnnualComparison { year, entries };
            match comparison.metrics() {
                Ok(metrics) => per_year.push((year, metrics)),
                Err(e) => warn!(year, "no metrics: {e}"),
            }
        }

        if per_year.is_empty() {
            return Err(StudyError::EmptyInput(
                "no year had both modeled and actual energy".to_string(),
            ));
        }

        let path = result_dir.join("metrics_rmse_mape.csv");
        let file = fs::File::create(&path).map_err(|e| StudyError::io(&path, e))?;
        export::write_metrics_csv(&per_year, std::io::BufWriter::new(file))
            .map_err(|e| StudyError::io(&path, e))?;
        info!(path = %path.display(), years = per_year.len(), "wrote error metrics");
        Ok(per_year)
    }

    /// Mid-summer wind-speed distribution study: per-turbine panel charts
    /// of modeled vs. back-cast speeds, plus the distribution-similarity
    /// scatter against station distance (PNG + CSV).
    ///
    /// Returns the scatter rows `(asset, distance km, RMSE)`.
    ///
    /// # Errors
    ///
    /// Returns an error when no turbine has usable data.
    pub fn speed_distribution_study(&self) -> Result<Vec<(String, f64, f64)>> {
        let result_dir = self.ensure_result_dir()?;
        let plot_dir = result_dir.join("freq_plots");
        fs::create_dir_all(&plot_dir).map_err(|e| StudyError::io(&plot_dir, e))?;

        let mut scatter_rows = Vec::new();

        for turbine in self.turbines.unique() {
            let mut yearly = Vec::new();
            let mut modeled_densities = Vec::new();
            let mut backcast_densities = Vec::new();

            for &year in &self.config.study.years {
                let modeled = self.midsummer_speeds(
                    &result_dir.join(export::model_file_name(&turbine.asset_name, year)),
                    year,
                    SpeedSource::Model,
                );
                let backcast = self.midsummer_speeds(
                    &result_dir.join(export::backcast_file_name(&turbine.asset_name, year)),
                    year,
                    SpeedSource::Backcast,
                );
                let (Some(modeled), Some(backcast)) = (modeled, backcast) else {
                    continue;
                };
                if modeled.is_empty() || backcast.is_empty() {
                    continue;
                }

                modeled_densities.extend(density_histogram(&modeled, &SPEED_BIN_EDGES));
                backcast_densities.extend(density_histogram(&backcast, &SPEED_BIN_EDGES));
                yearly.push(SpeedDistYear {
                    year,
                    modeled,
                    backcast,
                });
            }

            if yearly.is_empty() {
                warn!(asset = %turbine.asset_name, "no mid-summer speed data, skipping");
                continue;
            }

            if self.config.study.save_plots {
                let png_path = plot_dir.join(format!("{}_speed_dist.png", turbine.asset_name));
                charts::speed_dist::render_speed_distributions(
                    &turbine.asset_name,
                    &yearly,
                    &png_path,
                )?;
            }

            match (turbine.station_distance_km, histogram_rmse(&backcast_densities, &modeled_densities)) {
                (Some(distance), Ok(rmse)) => {
                    scatter_rows.push((turbine.asset_name.clone(), distance, rmse));
                }
                (None, _) => {
                    warn!(asset = %turbine.asset_name, "no station distance, left off the scatter");
                }
                (_, Err(e)) => warn!(asset = %turbine.asset_name, "no distribution RMSE: {e}"),
            }
        }

        if scatter_rows.is_empty() {
            return Err(StudyError::EmptyInput(
                "no turbine produced a speed distribution".to_string(),
            ));
        }

        if self.config.study.save_plots {
            charts::scatter::render_distance_rmse(
                &scatter_rows,
                &plot_dir.join("rmse_distance.png"),
            )?;
        }
        let csv_path = plot_dir.join("rmse_distance.csv");
        let file = fs::File::create(&csv_path).map_err(|e| StudyError::io(&csv_path, e))?;
        export::write_distance_rmse_csv(&scatter_rows, std::io::BufWriter::new(file))
            .map_err(|e| StudyError::io(&csv_path, e))?;
        info!(turbines = scatter_rows.len(), "speed distribution study complete");
        Ok(scatter_rows)
    }

    fn midsummer_speeds(
        &self,
        path: &Path,
        year: i32,
        source: SpeedSource,
    ) -> Option<Vec<f64>> {
        let (start, end) = midsummer_bounds(year);
        let in_range = |t: NaiveDateTime, w: f64| {
            t >= start && t <= end && (4.0..12.0).contains(&w)
        };

        match source {
            SpeedSource::Model => model::read_model_csv(path).ok().map(|series| {
                series
                    .rows
                    .iter()
                    .filter(|r| in_range(r.time, r.w_hub))
                    .map(|r| r.w_hub)
                    .collect()
            }),
            SpeedSource::Backcast => read_backcast_speeds(path).map(|rows| {
                rows.into_iter()
                    .filter(|&(t, w)| in_range(t, w))
                    .map(|(_, w)| w)
                    .collect()
            }),
        }
    }

    /// Seasonal box-plot study over the summaries of two scenario result
    /// directories. Writes three stats CSVs, three panel PNGs, and the
    /// wide production-loss tables into the result root.
    ///
    /// # Errors
    ///
    /// Returns an error when no summary file could be read.
    pub fn boxplot_study(&self, full_dir: &Path, peak_dir: &Path) -> Result<()> {
        let scenarios = [("Full Season", full_dir), ("Peak Season", peak_dir)];

        let mut production = Vec::new();
        let mut energy = Vec::new();
        let mut cost = Vec::new();

        for (label, dir) in scenarios {
            if !dir.is_dir() {
                warn!(scenario = label, dir = %dir.display(), "missing scenario directory");
                continue;
            }
            for turbine in self.turbines.unique() {
                if turbine.capacity_mw <= 0.0 {
                    warn!(asset = %turbine.asset_name, "no capacity, skipping normalization");
                    continue;
                }
                for &year in &self.config.study.years {
                    let path = dir.join(export::summary_file_name(&turbine.asset_name, year));
                    if !path.is_file() {
                        continue;
                    }
                    let table = match SummaryTable::from_csv_file(&path, &turbine.asset_name) {
                        Ok(t) => t,
                        Err(e) => {
                            warn!(path = %path.display(), "unreadable summary: {e}");
                            continue;
                        }
                    };

                    for row in &table.rows {
                        if !FOCUS_CUT_INS
                            .iter()
                            .any(|&c| (row.cut_in_ms - c).abs() < 1e-9)
                        {
                            continue;
                        }
                        for strategy in Strategy::ALL {
                            let sample = |value: f64| LossSample {
                                scenario: label.to_string(),
                                year,
                                turbine: turbine.asset_name.clone(),
                                cut_in_ms: row.cut_in_ms,
                                strategy,
                                value,
                            };
                            production.push(sample(row.loss_pct(strategy)));
                            energy.push(sample(row.losses_mwh(strategy) / turbine.capacity_mw));
                            cost.push(sample(row.revenue_cad(strategy) / turbine.capacity_mw));
                        }
                    }
                }
            }
        }

        if production.is_empty() {
            return Err(StudyError::EmptyInput(
                "no summaries found for the box-plot study".to_string(),
            ));
        }

        let out_dir = &self.config.directories.result;
        fs::create_dir_all(out_dir).map_err(|e| StudyError::io(out_dir, e))?;

        let studies = [
            (&production, "production_losses", "Production losses (%)"),
            (&energy, "energy_losses", "Annual losses (MWh / installed MW)"),
            (&cost, "financial_losses", "Annual cost (CAD / installed MW)"),
        ];
        for (samples, stem, y_desc) in studies {
            if self.config.study.save_plots {
                charts::boxplot::render_loss_boxplots(
                    samples,
                    y_desc,
                    &out_dir.join(format!("{stem}_boxplots.png")),
                )?;
            }

            let csv_path = out_dir.join(format!("{stem}_stats.csv"));
            let file = fs::File::create(&csv_path).map_err(|e| StudyError::io(&csv_path, e))?;
            export::write_stats_csv(&grouped_stats(samples), std::io::BufWriter::new(file))
                .map_err(|e| StudyError::io(&csv_path, e))?;
        }

        for (label, _) in scenarios {
            let scenario_samples: Vec<LossSample> = production
                .iter()
                .filter(|s| s.scenario == label)
                .cloned()
                .collect();
            if scenario_samples.is_empty() {
                continue;
            }
            let wide = production_wide_table(&scenario_samples);
            let csv_path = out_dir.join(format!(
                "production_losses_wide_{}.csv",
                label.replace(' ', "_")
            ));
            let file = fs::File::create(&csv_path).map_err(|e| StudyError::io(&csv_path, e))?;
            export::write_wide_production_csv(&wide, std::io::BufWriter::new(file))
                .map_err(|e| StudyError::io(&csv_path, e))?;
        }

        info!(
            samples = production.len(),
            out_dir = %out_dir.display(),
            "box-plot study complete"
        );
        Ok(())
    }

    /// Monthly (Jul–Sep) modeled-vs-actual comparison across all farms,
    /// with a grouped-bar panel chart.
    ///
    /// # Errors
    ///
    /// Returns an error when no year accumulated any energy.
    pub fn monthly_comparison(&self) -> Result<Vec<MonthlyTotals>> {
        let result_dir = self.ensure_result_dir()?;
        let mut all_totals = Vec::new();

        for &year in &self.config.study.years {
            let mut totals = MonthlyTotals::new(year);
            for turbine in self.turbines.unique() {
                let model_path =
                    result_dir.join(export::model_file_name(&turbine.asset_name, year));
                match model::read_model_csv(&model_path) {
                    Ok(series) => totals.add_modeled(&series.rows, turbine.turbine_count),
                    Err(_) => {
                        warn!(asset = %turbine.asset_name, year, "no model output for monthly totals");
                    }
                }

                match discover::find_actual_file(
                    &self.config.directories.real,
                    &turbine.asset_name,
                    year,
                )
                .and_then(|p| actual::load_actual_file(&p))
                {
                    Ok(readings) => totals.add_actual(&readings),
                    Err(e) => {
                        warn!(asset = %turbine.asset_name, year, "no actual data for monthly totals: {e}");
                    }
                }
            }

            let (modeled, actual_total) = totals.period_totals();
            if modeled > 0.0 || actual_total > 0.0 {
                all_totals.push(totals);
            } else {
                warn!(year, "no energy accumulated, year left off the chart");
            }
        }

        if all_totals.is_empty() {
            return Err(StudyError::EmptyInput(
                "no monthly totals could be accumulated".to_string(),
            ));
        }

        if self.config.study.save_plots {
            charts::monthly::render_monthly_bars(
                &all_totals,
                &result_dir.join("monthly_power_output.png"),
            )?;
        }
        Ok(all_totals)
    }

    /// Scenario comparison over two fleet summaries: production losses
    /// and capacity-normalized foregone revenue against cut-in speed.
    ///
    /// # Errors
    ///
    /// Returns an error if either summary cannot be read.
    pub fn scenario_comparison(
        &self,
        full_summary: &Path,
        peak_summary: &Path,
    ) -> Result<()> {
        let tables = vec![
            (
                "Full Season".to_string(),
                SummaryTable::from_csv_file(full_summary, "Full Season")?,
            ),
            (
                "Peak Season".to_string(),
                SummaryTable::from_csv_file(peak_summary, "Peak Season")?,
            ),
        ];

        let out_dir = &self.config.directories.result;
        fs::create_dir_all(out_dir).map_err(|e| StudyError::io(out_dir, e))?;
        if !self.config.study.save_plots {
            warn!("save_plots is off; scenario comparison produces only charts");
            return Ok(());
        }

        charts::losses::render_scenario_comparison(
            &tables,
            "Production losses (%)",
            |r| (r.loss_blanket_pct, r.loss_smart_pct),
            &out_dir.join("scenario_losses.png"),
        )?;

        // Normalize revenue by fleet capacity so the scenarios compare
        // per installed MW.
        let fleet_capacity: f64 = self
            .turbines
            .unique()
            .iter()
            .map(|t| t.capacity_mw)
            .sum();
        let normalized: Vec<(String, SummaryTable)> = tables
            .into_iter()
            .map(|(label, mut table)| {
                if fleet_capacity > 0.0 {
                    for row in &mut table.rows {
                        row.revenue_blanket_cad /= fleet_capacity;
                        row.revenue_smart_cad /= fleet_capacity;
                    }
                }
                (label, table)
            })
            .collect();
        charts::losses::render_scenario_comparison(
            &normalized,
            "Annual cost (CAD / installed MW)",
            |r| (r.revenue_blanket_cad, r.revenue_smart_cad),
            &out_dir.join("scenario_costs.png"),
        )?;

        info!(out_dir = %out_dir.display(), "scenario comparison complete");
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum SpeedSource {
    Model,
    Backcast,
}

/// Reads `(time, w_hub)` pairs from a back-cast CSV, dropping unresolved
/// rows. Returns `None` when the file is missing or unreadable.
fn read_backcast_speeds(path: &Path) -> Option<Vec<(NaiveDateTime, f64)>> {
    let mut reader = csv::Reader::from_path(path).ok()?;
    let headers = reader.headers().ok()?.clone();
    let time_col = headers.iter().position(|h| h == "time")?;
    let w_hub_col = headers.iter().position(|h| h == "w_hub")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        let Some(time) = record.get(time_col).and_then(crate::tables::parse_lst) else {
            continue;
        };
        let Some(w_hub) = record.get(w_hub_col).and_then(|v| v.parse::<f64>().ok()) else {
            continue;
        };
        rows.push((time, w_hub));
    }
    Some(rows)
}
