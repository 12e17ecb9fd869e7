//! Seasonal surface-roughness classification.
//!
//! Terrain around the Alberta wind farms changes through the agricultural
//! year (crops, harvest stubble, snow cover), so each turbine carries one
//! roughness length per season rather than a single value.

use std::fmt;

/// Agricultural season governing the surface-roughness length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    /// June–July: crops standing.
    SummerJunJul,
    /// August: pre-harvest.
    PreHarvestAug,
    /// September–November: post-harvest stubble, before snow.
    PostHarvestSepNov,
    /// December–February: snow covered.
    SnowCoveredDecFeb,
    /// March–May: spring regrowth.
    SpringMarMay,
}

impl Season {
    /// Classifies a calendar month (1–12).
    ///
    /// Returns `None` for an out-of-range month.
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            6 | 7 => Some(Self::SummerJunJul),
            8 => Some(Self::PreHarvestAug),
            9..=11 => Some(Self::PostHarvestSepNov),
            12 | 1 | 2 => Some(Self::SnowCoveredDecFeb),
            3..=5 => Some(Self::SpringMarMay),
            _ => None,
        }
    }

    /// Column label used in the turbine metadata table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SummerJunJul => "Summer Jun-Jul",
            Self::PreHarvestAug => "Pre-harvest Aug",
            Self::PostHarvestSepNov => "Post-harvest/pre-snow Sep-Nov",
            Self::SnowCoveredDecFeb => "Snow covered Dec-Feb",
            Self::SpringMarMay => "Spring Mar-May",
        }
    }

    /// All seasons in metadata-column order.
    pub const ALL: [Season; 5] = [
        Season::SummerJunJul,
        Season::PreHarvestAug,
        Season::PostHarvestSepNov,
        Season::SnowCoveredDecFeb,
        Season::SpringMarMay,
    ];
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_month_maps_to_a_season() {
        for month in 1..=12 {
            assert!(Season::from_month(month).is_some(), "month {month}");
        }
    }

    #[test]
    fn month_zero_and_thirteen_are_rejected() {
        assert!(Season::from_month(0).is_none());
        assert!(Season::from_month(13).is_none());
    }

    #[test]
    fn winter_wraps_the_year_boundary() {
        assert_eq!(Season::from_month(12), Some(Season::SnowCoveredDecFeb));
        assert_eq!(Season::from_month(1), Some(Season::SnowCoveredDecFeb));
        assert_eq!(Season::from_month(2), Some(Season::SnowCoveredDecFeb));
    }

    #[test]
    fn harvest_transition_months() {
        assert_eq!(Season::from_month(7), Some(Season::SummerJunJul));
        assert_eq!(Season::from_month(8), Some(Season::PreHarvestAug));
        assert_eq!(Season::from_month(9), Some(Season::PostHarvestSepNov));
    }
}
