//! Weather classification for the adverse-weather lighting exception.

use crate::entity::EntityState;

/// Condition reported by the weather entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherCondition {
    Rain,
    HeavyRain,
    Fog,
    /// Any other condition (`sunny`, `cloudy`, `unavailable`, …).
    Other(String),
}

impl WeatherCondition {
    /// Parse a host weather state. Both short names (`rain`, `heavy-rain`)
    /// and the common host vocabulary (`rainy`, `pouring`) are accepted.
    #[must_use]
    pub fn from_entity_state(state: &EntityState) -> Self {
        match state.as_str().trim().to_ascii_lowercase().as_str() {
            "rain" | "rainy" => Self::Rain,
            "heavy-rain" | "heavy_rain" | "pouring" => Self::HeavyRain,
            "fog" | "foggy" => Self::Fog,
            other => Self::Other(other.to_string()),
        }
    }

    /// Dark enough outside to light the room regardless of the time of day.
    #[must_use]
    pub fn is_adverse(&self) -> bool {
        matches!(self, Self::Rain | Self::HeavyRain | Self::Fog)
    }
}
