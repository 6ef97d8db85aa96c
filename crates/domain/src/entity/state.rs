//! Entity state: the raw value a host reports for an entity.

use serde::{Deserialize, Serialize};

/// Current state of an entity.
///
/// Binary entities report `on`/`off`; everything else (timer `idle`,
/// weather `rainy`, power `153.2`, …) is kept verbatim in [`Other`](Self::Other).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
    Other(String),
}

impl EntityState {
    /// The raw string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
            Self::Other(raw) => raw,
        }
    }

    /// Interpret the state as a number (power readings, lux, …).
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Other(raw) => raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

impl From<&str> for EntityState {
    fn from(raw: &str) -> Self {
        match raw {
            "on" => Self::On,
            "off" => Self::Off,
            "unknown" => Self::Unknown,
            "unavailable" => Self::Unavailable,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for EntityState {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<EntityState> for String {
    fn from(state: EntityState) -> Self {
        match state {
            EntityState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
