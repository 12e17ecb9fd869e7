//! TOML-based study configuration and scenario presets.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level study configuration parsed from TOML.
///
/// All fields have defaults matching the full-season scenario. Load from
/// TOML with [`StudyConfig::from_toml_file`] or use
/// [`StudyConfig::full_season`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Directory layout for inputs and outputs.
    #[serde(default)]
    pub directories: DirectoriesConfig,
    /// Physical constants used by the power model.
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Curtailment rules: cut-in ladder and blanket season window.
    #[serde(default)]
    pub curtailment: CurtailmentConfig,
    /// Study scope: years under analysis.
    #[serde(default)]
    pub study: StudyScopeConfig,
}

/// Directory layout for inputs and outputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoriesConfig {
    /// Meteorological input files (`<Station>_<year>_filled.csv`).
    pub data: PathBuf,
    /// Model and summary outputs.
    pub result: PathBuf,
    /// Actual (AESO) generation files.
    pub real: PathBuf,
    /// Reference tables: turbine metadata, sun times, pool prices, power curves.
    pub supply: PathBuf,
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("./data"),
            result: PathBuf::from("./result"),
            real: PathBuf::from("./real"),
            supply: PathBuf::from("./supply"),
        }
    }
}

impl DirectoriesConfig {
    /// Directory holding per-model power-curve tables.
    pub fn curve_dir(&self) -> PathBuf {
        self.supply.join("curve")
    }

    /// Path to the turbine metadata table.
    pub fn turbine_table(&self) -> PathBuf {
        self.supply.join("Nearby_base.csv")
    }

    /// Path to the sunrise/sunset table.
    pub fn sun_table(&self) -> PathBuf {
        self.supply.join("Sun.csv")
    }

    /// Path to the pool-price file for a year.
    pub fn pool_price_file(&self, year: i32) -> PathBuf {
        self.supply.join(format!("pool_price_{year}.csv"))
    }
}

/// Physical constants used by the power model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Standard air density (kg/m³).
    pub rho_std: f64,
    /// Specific gas constant for dry air (J/(kg·K)).
    pub gas_constant: f64,
    /// Height of the wind-speed measurement (m).
    pub ref_height_m: f64,
    /// Aggregate loss fraction applied to curve output (0.0–1.0).
    pub losses: f64,
    /// Conversion factor from km/h to m/s.
    pub kmh_to_ms: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            rho_std: 1.225,
            gas_constant: 287.05,
            ref_height_m: 10.0,
            losses: 0.0,
            kmh_to_ms: 0.27778,
        }
    }
}

/// Curtailment rules: cut-in ladder and blanket season window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurtailmentConfig {
    /// Regulated cut-in speeds under study (m/s, ascending).
    pub cut_in_speeds: Vec<f64>,
    /// First day of the blanket season, `MM-DD`.
    pub season_start: String,
    /// Last day of the blanket season, `MM-DD`.
    pub season_end: String,
}

impl Default for CurtailmentConfig {
    fn default() -> Self {
        Self {
            cut_in_speeds: vec![5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0],
            season_start: "07-15".to_string(),
            season_end: "09-30".to_string(),
        }
    }
}

impl CurtailmentConfig {
    /// Parses the season bounds into `(month, day)` pairs.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the offending field if either bound
    /// is not a valid `MM-DD` date.
    pub fn season_window(&self) -> Result<((u32, u32), (u32, u32)), ConfigError> {
        let start = parse_month_day(&self.season_start).ok_or_else(|| ConfigError {
            field: "curtailment.season_start".into(),
            message: format!("`{}` is not a valid MM-DD date", self.season_start),
        })?;
        let end = parse_month_day(&self.season_end).ok_or_else(|| ConfigError {
            field: "curtailment.season_end".into(),
            message: format!("`{}` is not a valid MM-DD date", self.season_end),
        })?;
        Ok((start, end))
    }
}

/// Study scope: years under analysis and the scenario label.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyScopeConfig {
    /// Calendar years covered by the study.
    pub years: Vec<i32>,
    /// Scenario label; model outputs land in `<result>/<scenario>/`.
    pub scenario: String,
    /// Whether chart PNGs are rendered alongside the tables.
    pub save_plots: bool,
}

impl Default for StudyScopeConfig {
    fn default() -> Self {
        Self {
            years: vec![2020, 2021, 2022, 2023],
            scenario: "full_season".to_string(),
            save_plots: true,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"curtailment.cut_in_speeds"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn parse_month_day(s: &str) -> Option<(u32, u32)> {
    let (m, d) = s.split_once('-')?;
    let month: u32 = m.parse().ok()?;
    let day: u32 = d.parse().ok()?;
    // Validate against a leap year so Feb 29 stays admissible.
    chrono::NaiveDate::from_ymd_opt(2020, month, day)?;
    Some((month, day))
}

impl StudyConfig {
    /// Returns the full-season scenario: blanket window Jul 15 – Sep 30.
    pub fn full_season() -> Self {
        Self {
            directories: DirectoriesConfig::default(),
            physics: PhysicsConfig::default(),
            curtailment: CurtailmentConfig::default(),
            study: StudyScopeConfig::default(),
        }
    }

    /// Returns the peak-season scenario: blanket window Aug 1 – Sep 10,
    /// when bat activity is highest.
    pub fn peak_season() -> Self {
        Self {
            curtailment: CurtailmentConfig {
                season_start: "08-01".to_string(),
                season_end: "09-10".to_string(),
                ..CurtailmentConfig::default()
            },
            study: StudyScopeConfig {
                scenario: "peak_season".to_string(),
                ..StudyScopeConfig::default()
            },
            ..Self::full_season()
        }
    }

    /// Directory for this scenario's model outputs and summaries.
    pub fn scenario_result_dir(&self) -> PathBuf {
        self.directories.result.join(&self.study.scenario)
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["full_season", "peak_season"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "full_season" => Ok(Self::full_season()),
            "peak_season" => Ok(Self::peak_season()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let p = &self.physics;
        if p.rho_std <= 0.0 {
            errors.push(ConfigError {
                field: "physics.rho_std".into(),
                message: "must be > 0".into(),
            });
        }
        if p.ref_height_m <= 0.0 {
            errors.push(ConfigError {
                field: "physics.ref_height_m".into(),
                message: "must be > 0".into(),
            });
        }
        if !(0.0..1.0).contains(&p.losses) {
            errors.push(ConfigError {
                field: "physics.losses".into(),
                message: "must be in [0.0, 1.0)".into(),
            });
        }
        if p.kmh_to_ms <= 0.0 {
            errors.push(ConfigError {
                field: "physics.kmh_to_ms".into(),
                message: "must be > 0".into(),
            });
        }

        let c = &self.curtailment;
        if c.cut_in_speeds.is_empty() {
            errors.push(ConfigError {
                field: "curtailment.cut_in_speeds".into(),
                message: "must name at least one cut-in speed".into(),
            });
        }
        if c.cut_in_speeds.windows(2).any(|w| w[0] >= w[1]) {
            errors.push(ConfigError {
                field: "curtailment.cut_in_speeds".into(),
                message: "must be strictly ascending".into(),
            });
        }
        if c.cut_in_speeds.iter().any(|&v| v <= 0.0) {
            errors.push(ConfigError {
                field: "curtailment.cut_in_speeds".into(),
                message: "speeds must be > 0".into(),
            });
        }
        match c.season_window() {
            Err(e) => errors.push(e),
            Ok((start, end)) => {
                if start > end {
                    errors.push(ConfigError {
                        field: "curtailment.season_start".into(),
                        message: "must not be after curtailment.season_end".into(),
                    });
                }
            }
        }

        if self.study.years.is_empty() {
            errors.push(ConfigError {
                field: "study.years".into(),
                message: "must name at least one year".into(),
            });
        }
        if self.study.scenario.trim().is_empty() {
            errors.push(ConfigError {
                field: "study.scenario".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}
