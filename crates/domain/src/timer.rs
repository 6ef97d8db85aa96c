//! Occupancy timer: the host-owned countdown that represents "room occupied".
//!
//! The core never sets the timer's state. It only asks the host to start
//! (or restart) it and reacts to the transitions the host reports.

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;

/// Observable state of the occupancy timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Active,
}

impl TimerState {
    /// Interpret a host entity state. Anything besides `idle`/`active`
    /// (`paused`, `unavailable`, …) yields `None`.
    #[must_use]
    pub fn from_entity_state(state: &EntityState) -> Option<Self> {
        match state.as_str() {
            "idle" => Some(Self::Idle),
            "active" => Some(Self::Active),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity_state(self) -> EntityState {
        EntityState::Other(self.to_string())
    }
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Active => "active",
        })
    }
}

/// Edge of the timer the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTransition {
    /// Entered `active` from any other value.
    Activated,
    /// Entered `idle` from any other value.
    Deactivated,
}

impl TimerTransition {
    /// Classify a reported change. Repeated values are not transitions.
    #[must_use]
    pub fn between(old: Option<&EntityState>, new: &EntityState) -> Option<Self> {
        let old = old.and_then(TimerState::from_entity_state);
        let new = TimerState::from_entity_state(new)?;
        if old == Some(new) {
            return None;
        }
        Some(match new {
            TimerState::Active => Self::Activated,
            TimerState::Idle => Self::Deactivated,
        })
    }
}
