//! Entity: a snapshot of one host-owned state holder.
//!
//! Sensors, lights, the override switch, the weather provider and the
//! occupancy timer are all entities on the host. The core never caches
//! them: every decision reads a fresh [`EntitySnapshot`].

mod attribute_value;
mod state;

use std::collections::HashMap;

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;
use crate::time::Timestamp;

/// Point-in-time view of an entity as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub entity_id: EntityId,
    pub state: EntityState,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
}

impl EntitySnapshot {
    /// Snapshot with no attributes.
    #[must_use]
    pub fn new(entity_id: EntityId, state: EntityState, last_changed: Timestamp) -> Self {
        Self {
            entity_id,
            state,
            attributes: HashMap::new(),
            last_changed,
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Look up a single attribute by name.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Replace the state, bumping `last_changed` only when the value differs.
    pub fn update_state(&mut self, state: EntityState, at: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn snapshot() -> EntitySnapshot {
        EntitySnapshot::new(
            EntityId::new("light.desk"),
            EntityState::Off,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn should_bump_last_changed_when_state_differs() {
        let mut entity = snapshot();
        let later = entity.last_changed + Duration::minutes(5);
        entity.update_state(EntityState::On, later);
        assert_eq!(entity.state, EntityState::On);
        assert_eq!(entity.last_changed, later);
    }

    #[test]
    fn should_keep_last_changed_when_state_is_unchanged() {
        let mut entity = snapshot();
        let original = entity.last_changed;
        entity.update_state(EntityState::Off, original + Duration::minutes(5));
        assert_eq!(entity.last_changed, original);
    }

    #[test]
    fn should_return_attribute_when_present() {
        let entity = snapshot().with_attribute("brightness", AttributeValue::Int(200));
        assert_eq!(
            entity.get_attribute("brightness"),
            Some(&AttributeValue::Int(200))
        );
        assert_eq!(entity.get_attribute("color"), None);
    }
}
