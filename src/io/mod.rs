//! File discovery and CSV export.

pub mod discover;
pub mod export;
