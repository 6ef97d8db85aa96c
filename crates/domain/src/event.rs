//! State-change notifications delivered by the host.

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;
use crate::id::EntityId;
use crate::time::Timestamp;

/// An entity moved from `old` to `new`.
///
/// `old` is `None` when the host had no previous value (entity just appeared).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub entity_id: EntityId,
    pub old: Option<EntityState>,
    pub new: EntityState,
    pub at: Timestamp,
}

impl StateChange {
    #[must_use]
    pub fn new(
        entity_id: EntityId,
        old: Option<EntityState>,
        new: EntityState,
        at: Timestamp,
    ) -> Self {
        Self {
            entity_id,
            old,
            new,
            at,
        }
    }

    /// Whether the value actually changed.
    #[must_use]
    pub fn is_transition(&self) -> bool {
        self.old.as_ref() != Some(&self.new)
    }
}

impl std::fmt::Display for StateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.old {
            Some(old) => write!(f, "{}: {old} -> {}", self.entity_id, self.new),
            None => write!(f, "{}: -> {}", self.entity_id, self.new),
        }
    }
}
