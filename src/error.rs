//! Toolkit-wide error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by table loading, the model pipeline, and chart rendering.
///
/// Row-level problems (a malformed reading, an out-of-range physics input)
/// are *not* errors: they are logged and the row is skipped or degraded, per
/// the toolkit's skip-and-continue policy. This type covers failures that
/// abort an operation outright.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("cannot access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in `{path}`: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("missing column `{column}` in `{path}`")]
    MissingColumn { column: String, path: PathBuf },

    #[error("turbine `{0}` not found in the metadata table")]
    UnknownTurbine(String),

    #[error("no sunrise/sunset data for turbine `{0}`")]
    MissingSunData(String),

    #[error("no meteorological file for station `{station}` and year {year} under `{dir}`")]
    MetFileNotFound {
        station: String,
        year: i32,
        dir: PathBuf,
    },

    #[error("no actual-generation file for `{asset}` and year {year} under `{dir}`")]
    ActualFileNotFound {
        asset: String,
        year: i32,
        dir: PathBuf,
    },

    #[error("power curve `{path}` is unusable: {reason}")]
    BadPowerCurve { path: PathBuf, reason: String },

    #[error("no data after filtering: {0}")]
    EmptyInput(String),

    #[error("chart rendering failed for `{path}`: {reason}")]
    Chart { path: PathBuf, reason: String },

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl StudyError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a CSV error with the file it occurred in.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, StudyError>;
