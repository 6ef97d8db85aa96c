//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts via `#[from]`.

use crate::id::EntityId;

/// Root error type for roomwatch.
#[derive(Debug, thiserror::Error)]
pub enum RoomWatchError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("host error")]
    Host(#[from] HostError),

    #[error("invalid sensor reading")]
    Reading(#[from] ReadingError),
}

/// Invariant violations detected while building a [`RoomConfig`](crate::room::RoomConfig).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("occupancy timer id must not be empty")]
    MissingTimer,

    #[error("at least one light must be configured")]
    NoLights,

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("sun elevation threshold {0} is outside [-90, 90]")]
    ElevationOutOfRange(f64),

    #[error("sun offset of {0} minutes is outside [-1440, 1440]")]
    OffsetOutOfRange(i64),

    #[error("power threshold {0} must be a non-negative number")]
    InvalidPowerThreshold(f64),

    #[error("entity id {0:?} is not of the form `domain.object_id`")]
    MalformedEntityId(String),
}

/// Failures reported by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("entity {0} is unavailable")]
    Unavailable(EntityId),

    #[error("host rejected {command} for {entity_id}")]
    CommandRejected {
        entity_id: EntityId,
        command: &'static str,
    },
}

/// A sensor reported a value that cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadingError {
    #[error("{entity_id} reported non-numeric value {value:?}")]
    NotNumeric { entity_id: EntityId, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_root_error() {
        let err: RoomWatchError = ValidationError::NoLights.into();
        assert!(matches!(err, RoomWatchError::Validation(ValidationError::NoLights)));
    }

    #[test]
    fn should_convert_reading_error_into_root_error() {
        let err: RoomWatchError = ReadingError::NotNumeric {
            entity_id: EntityId::new("sensor.desk_power"),
            value: "abc".to_string(),
        }
        .into();
        assert!(matches!(err, RoomWatchError::Reading(_)));
    }

    #[test]
    fn should_render_host_error_with_entity_id() {
        let err = HostError::CommandRejected {
            entity_id: EntityId::new("light.ceiling"),
            command: "turn_on",
        };
        assert_eq!(err.to_string(), "host rejected turn_on for light.ceiling");
    }
}
