//! Turbine metadata table (`Nearby_base.csv`).

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, StudyError};
use crate::roughness::Season;

/// One wind farm: identity, nearest weather station, physical parameters,
/// and seasonal surface-roughness lengths.
#[derive(Debug, Clone, Deserialize)]
pub struct TurbineRecord {
    /// AESO asset name, the join key across all tables.
    #[serde(rename = "Asset Name")]
    pub asset_name: String,
    /// Turbine model, names the power-curve file.
    #[serde(rename = "Model")]
    pub model: String,
    /// Nearest weather station, names the meteorological files.
    #[serde(rename = "Nearby_Station")]
    pub station: String,
    /// Hub height (m).
    #[serde(rename = "hub_height")]
    pub hub_height_m: f64,
    /// Number of turbines on the farm.
    #[serde(rename = "number_of_turbines")]
    pub turbine_count: u32,
    /// Installed capacity of the farm (MW).
    #[serde(rename = "total_capacity_MW")]
    pub capacity_mw: f64,
    /// Distance between the farm and its weather station (km).
    #[serde(rename = "Distance", default)]
    pub station_distance_km: Option<f64>,
    #[serde(rename = "Summer Jun-Jul", default)]
    roughness_summer: Option<f64>,
    #[serde(rename = "Pre-harvest Aug", default)]
    roughness_pre_harvest: Option<f64>,
    #[serde(rename = "Post-harvest/pre-snow Sep-Nov", default)]
    roughness_post_harvest: Option<f64>,
    #[serde(rename = "Snow covered Dec-Feb", default)]
    roughness_snow: Option<f64>,
    #[serde(rename = "Spring Mar-May", default)]
    roughness_spring: Option<f64>,
}

impl TurbineRecord {
    /// Roughness length for a season, if the metadata row carries a usable
    /// (positive) value.
    pub fn roughness(&self, season: Season) -> Option<f64> {
        let value = match season {
            Season::SummerJunJul => self.roughness_summer,
            Season::PreHarvestAug => self.roughness_pre_harvest,
            Season::PostHarvestSepNov => self.roughness_post_harvest,
            Season::SnowCoveredDecFeb => self.roughness_snow,
            Season::SpringMarMay => self.roughness_spring,
        };
        value.filter(|v| *v > 0.0)
    }

    /// Roughness length for a calendar month (1–12).
    pub fn roughness_for_month(&self, month: u32) -> Option<f64> {
        Season::from_month(month).and_then(|s| self.roughness(s))
    }

    /// Whether every season carries a usable roughness value.
    pub fn has_complete_roughness(&self) -> bool {
        Season::ALL.iter().all(|s| self.roughness(*s).is_some())
    }
}

/// The full metadata table, in file order (one row per farm; duplicated
/// asset rows are tolerated and collapse to the first occurrence).
#[derive(Debug, Clone)]
pub struct TurbineTable {
    records: Vec<TurbineRecord>,
}

impl TurbineTable {
    /// Loads the table from CSV.
    ///
    /// # Errors
    ///
    /// Returns `Io`/`Csv` on unreadable or malformed input, or `EmptyInput`
    /// if no rows survive.
    pub fn from_csv_file(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| StudyError::csv(path, e))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: TurbineRecord = row.map_err(|e| StudyError::csv(path, e))?;
            if !record.has_complete_roughness() {
                warn!(
                    asset = %record.asset_name,
                    "metadata row has missing or non-positive roughness values"
                );
            }
            records.push(record);
        }
        if records.is_empty() {
            return Err(StudyError::EmptyInput(format!(
                "no turbine rows in `{}`",
                path.display()
            )));
        }
        info!(count = records.len(), path = %path.display(), "loaded turbine metadata");
        Ok(Self { records })
    }

    /// Builds a table from in-memory records (fixtures and tests).
    pub fn from_records(records: Vec<TurbineRecord>) -> Self {
        Self { records }
    }

    /// Row by positional index, in file order.
    pub fn get(&self, index: usize) -> Option<&TurbineRecord> {
        self.records.get(index)
    }

    /// First row whose asset name contains `name`, case-insensitively.
    ///
    /// Matches the loose lookup the source data demands: asset names in the
    /// generation files carry suffixes the metadata omits.
    pub fn find(&self, name: &str) -> Option<&TurbineRecord> {
        let needle = name.to_lowercase();
        self.records
            .iter()
            .find(|r| r.asset_name.to_lowercase().contains(&needle))
    }

    /// Unique farms, first occurrence wins.
    pub fn unique(&self) -> Vec<&TurbineRecord> {
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for r in &self.records {
            if !seen.contains(&r.asset_name.as_str()) {
                seen.push(r.asset_name.as_str());
                out.push(r);
            }
        }
        out
    }

    /// Number of rows, duplicates included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
