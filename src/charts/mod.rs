//! PNG chart rendering for the study outputs.

pub mod boxplot;
pub mod losses;
pub mod monthly;
pub mod scatter;
pub mod speed_dist;

use std::fmt::Display;
use std::path::Path;

use plotters::style::RGBColor;

use crate::error::StudyError;

/// Blanket-strategy series color (colorblind-safe blue).
pub const BLANKET_BLUE: RGBColor = RGBColor(0x01, 0x73, 0xB2);

/// Smart-strategy series color (colorblind-safe orange).
pub const SMART_ORANGE: RGBColor = RGBColor(0xDE, 0x8F, 0x05);

/// Actual-generation series color.
pub const ACTUAL_NAVY: RGBColor = RGBColor(0x00, 0x00, 0x80);

/// Modeled-generation series color.
pub const MODELED_GREEN: RGBColor = RGBColor(0x00, 0x64, 0x00);

/// Wraps a plotters error with the target path.
pub(crate) fn chart_error(path: &Path, err: impl Display) -> StudyError {
    StudyError::Chart {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Axis padding: extends a data maximum so series do not touch the frame.
pub(crate) fn padded_max(max: f64) -> f64 {
    if max <= 0.0 { 1.0 } else { max * 1.1 }
}
