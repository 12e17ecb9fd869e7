//! Input-table loaders: turbine metadata, meteorological readings,
//! sunrise/sunset times, pool prices, actual generation, and model
//! outputs read back for aggregation.

pub mod actual;
pub mod met;
pub mod model;
pub mod price;
pub mod sun;
pub mod turbine;

use chrono::NaiveDateTime;

/// Parses a local-standard-time stamp in either of the layouts the input
/// files carry (`2020-07-15 06:00` with or without seconds).
pub(crate) fn parse_lst(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .ok()
}
