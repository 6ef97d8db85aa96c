//! Host entity identifiers (`light.kitchen`, `binary_sensor.hall_motion`, …).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of an entity owned by the host, in `domain.object_id` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a raw identifier without validation.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Access the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id has a non-empty domain and object id.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self.0.split_once('.') {
            Some((domain, object_id)) => {
                !domain.is_empty() && !object_id.is_empty() && !self.0.contains(char::is_whitespace)
            }
            None => false,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::new(s);
        if id.is_well_formed() {
            Ok(id)
        } else {
            Err(ValidationError::MalformedEntityId(s.to_string()))
        }
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
