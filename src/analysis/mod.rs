//! Aggregation toolkit: loss summaries, error metrics, box-plot
//! statistics, and monthly comparisons over the model outputs.

pub mod losses;
pub mod metrics;
pub mod monthly;
pub mod stats;
