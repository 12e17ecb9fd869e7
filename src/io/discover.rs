//! Input-file discovery with fallback scanning.
//!
//! Station files follow the `<Station>_<year>_filled.csv` convention but
//! historical deliveries deviate, so a miss falls back to scanning the
//! directory for a name containing both the station and the year. Actual
//! generation files have no firm convention at all and are always found
//! by scan.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, StudyError};

/// Locates the meteorological file for a station-year.
///
/// # Errors
///
/// Returns `MetFileNotFound` when neither the conventional name nor a
/// scan match exists, or `Io` if the directory cannot be read.
pub fn find_met_file(dir: &Path, station: &str, year: i32) -> Result<PathBuf> {
    let expected = dir.join(format!("{station}_{year}_filled.csv"));
    if expected.is_file() {
        debug!(path = %expected.display(), "met file found by convention");
        return Ok(expected);
    }

    if let Some(found) = scan_for(dir, &[station, &year.to_string()])? {
        info!(
            station,
            year,
            path = %found.display(),
            "met file found by directory scan"
        );
        return Ok(found);
    }

    Err(StudyError::MetFileNotFound {
        station: station.to_string(),
        year,
        dir: dir.to_path_buf(),
    })
}

/// Locates the actual-generation file for an asset-year.
///
/// # Errors
///
/// Returns `ActualFileNotFound` when no file name contains both the year
/// and the asset name, or `Io` if the directory cannot be read.
pub fn find_actual_file(dir: &Path, asset: &str, year: i32) -> Result<PathBuf> {
    if let Some(found) = scan_for(dir, &[asset, &year.to_string()])? {
        debug!(asset, year, path = %found.display(), "actual file found");
        return Ok(found);
    }
    Err(StudyError::ActualFileNotFound {
        asset: asset.to_string(),
        year,
        dir: dir.to_path_buf(),
    })
}

/// First regular file in `dir` whose name contains every needle.
/// Entries are visited in name order so repeated runs resolve the same
/// file.
fn scan_for(dir: &Path, needles: &[&str]) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| StudyError::io(dir, e))?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| needles.iter().all(|needle| name.contains(needle)))
        })
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}
