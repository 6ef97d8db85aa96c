//! Calendar seasons derived from latitude and month.
//!
//! A fixed three-month bucket calendar: in the northern hemisphere
//! March–May is spring, June–August summer, September–November autumn
//! and the rest winter. The southern hemisphere uses the same buckets
//! with every season swapped for its opposite.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    Northern,
    Southern,
}

impl Hemisphere {
    /// The equator counts as northern.
    #[must_use]
    pub fn from_latitude(latitude: f64) -> Self {
        if latitude < 0.0 {
            Self::Southern
        } else {
            Self::Northern
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season at `latitude` during `month` (1 = January).
    #[must_use]
    pub fn at(latitude: f64, month: u32) -> Self {
        let northern = match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        };
        match Hemisphere::from_latitude(latitude) {
            Hemisphere::Northern => northern,
            Hemisphere::Southern => northern.opposite(),
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Spring => Self::Autumn,
            Self::Summer => Self::Winter,
            Self::Autumn => Self::Spring,
            Self::Winter => Self::Summer,
        }
    }

    /// Degrees added to the sun elevation threshold in this season.
    #[must_use]
    pub fn elevation_adjustment(self) -> f64 {
        match self {
            Self::Summer => 0.0,
            Self::Spring | Self::Autumn => 1.0,
            Self::Winter => 2.0,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERLIN: f64 = 52.5;
    const SYDNEY: f64 = -33.9;

    #[test]
    fn should_map_northern_months_to_buckets() {
        assert_eq!(Season::at(BERLIN, 1), Season::Winter);
        assert_eq!(Season::at(BERLIN, 3), Season::Spring);
        assert_eq!(Season::at(BERLIN, 5), Season::Spring);
        assert_eq!(Season::at(BERLIN, 6), Season::Summer);
        assert_eq!(Season::at(BERLIN, 9), Season::Autumn);
        assert_eq!(Season::at(BERLIN, 11), Season::Autumn);
        assert_eq!(Season::at(BERLIN, 12), Season::Winter);
    }

    #[test]
    fn should_swap_seasons_in_southern_hemisphere() {
        assert_eq!(Season::at(SYDNEY, 1), Season::Summer);
        assert_eq!(Season::at(SYDNEY, 4), Season::Autumn);
        assert_eq!(Season::at(SYDNEY, 7), Season::Winter);
        assert_eq!(Season::at(SYDNEY, 10), Season::Spring);
    }

    #[test]
    fn should_treat_equator_as_northern() {
        assert_eq!(Hemisphere::from_latitude(0.0), Hemisphere::Northern);
        assert_eq!(Season::at(0.0, 7), Season::Summer);
    }

    #[test]
    fn should_adjust_threshold_per_season() {
        assert!((Season::Summer.elevation_adjustment() - 0.0).abs() < f64::EPSILON);
        assert!((Season::Spring.elevation_adjustment() - 1.0).abs() < f64::EPSILON);
        assert!((Season::Autumn.elevation_adjustment() - 1.0).abs() < f64::EPSILON);
        assert!((Season::Winter.elevation_adjustment() - 2.0).abs() < f64::EPSILON);
    }
}
