//! Sensor sources that feed occupancy inference.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::{EntitySnapshot, EntityState};
use crate::id::EntityId;
use crate::time::Timestamp;

/// Minimum continuous "on" duration before a level-held motion sensor
/// counts as a fresh occupancy signal during a sweep.
pub const DWELL_THRESHOLD: Duration = Duration::from_secs(60);

/// Interval between two reconciliation sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Category of an occupancy sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Motion,
    Door,
    Light,
    Vibration,
    Power,
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Motion => "motion",
            Self::Door => "door",
            Self::Light => "light",
            Self::Vibration => "vibration",
            Self::Power => "power",
        })
    }
}

/// Read-only view of a host sensor, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSource {
    pub id: EntityId,
    pub kind: SensorKind,
    pub last_known_value: EntityState,
    pub last_change: Timestamp,
}

impl SensorSource {
    #[must_use]
    pub fn from_snapshot(kind: SensorKind, snapshot: EntitySnapshot) -> Self {
        Self {
            id: snapshot.entity_id,
            kind,
            last_known_value: snapshot.state,
            last_change: snapshot.last_changed,
        }
    }

    /// Whether the sensor currently reports `on` (motion seen, door open, …).
    #[must_use]
    pub fn is_asserted(&self) -> bool {
        self.last_known_value == EntityState::On
    }

    /// How long the sensor has held its current value at `now`.
    ///
    /// Returns zero when `last_change` lies in the future (clock skew).
    #[must_use]
    pub fn held_for(&self, now: Timestamp) -> Duration {
        (now - self.last_change).to_std().unwrap_or(Duration::ZERO)
    }

    /// Asserted for at least [`DWELL_THRESHOLD`].
    #[must_use]
    pub fn has_dwelled(&self, now: Timestamp) -> bool {
        self.is_asserted() && self.held_for(now) >= DWELL_THRESHOLD
    }
}
