//! Host port: reading live entity state and issuing commands.
//!
//! The host (Home Assistant, a simulator, a test double, …) owns every
//! entity. The engine reads fresh state on every decision and never caches it.

use std::future::Future;
use std::sync::Arc;

use roomwatch_domain::entity::{AttributeValue, EntitySnapshot};
use roomwatch_domain::error::RoomWatchError;
use roomwatch_domain::id::EntityId;
use roomwatch_domain::time::Timestamp;

/// Desired on/off state for an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuation {
    On,
    Off,
}

impl Actuation {
    /// Host service name for this command.
    #[must_use]
    pub fn service(self) -> &'static str {
        match self {
            Self::On => "turn_on",
            Self::Off => "turn_off",
        }
    }
}

impl std::fmt::Display for Actuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.service())
    }
}

/// Read access to the host's entity registry.
pub trait EntityStates {
    /// Current snapshot of `entity_id`, or `None` if the host has no value.
    fn get_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<EntitySnapshot>, RoomWatchError>> + Send;

    /// Convenience: a single attribute of `entity_id`.
    fn get_attribute(
        &self,
        entity_id: &EntityId,
        name: &str,
    ) -> impl Future<Output = Result<Option<AttributeValue>, RoomWatchError>> + Send
    where
        Self: Sync,
    {
        async move {
            Ok(self
                .get_state(entity_id)
                .await?
                .and_then(|snapshot| snapshot.get_attribute(name).cloned()))
        }
    }
}

/// Switch lights (or any on/off actuator) on the host.
pub trait LightActuator {
    fn set_actuator(
        &self,
        entity_id: &EntityId,
        actuation: Actuation,
    ) -> impl Future<Output = Result<(), RoomWatchError>> + Send;
}

/// Start the host-owned occupancy timer.
///
/// Starting an active timer restarts its countdown; the host moves it back
/// to idle on its own once the countdown runs out.
pub trait OccupancyTimer {
    fn start_timer(
        &self,
        timer_id: &EntityId,
    ) -> impl Future<Output = Result<(), RoomWatchError>> + Send;
}

/// Clock and astronomical facts for the home location.
pub trait SunClock {
    fn now(&self) -> Timestamp;

    /// Today's sunrise, if the host can compute one (not in polar day/night).
    fn sunrise(&self) -> Option<Timestamp>;

    /// Today's sunset, if the host can compute one.
    fn sunset(&self) -> Option<Timestamp>;

    /// Current sun elevation in degrees above the horizon.
    fn sun_elevation(&self) -> Option<f64>;

    /// Whether the host itself considers the sun below the horizon.
    fn is_sun_down(&self) -> Option<bool>;
}

/// Everything the engine needs from a host in one bound.
pub trait HostPlatform:
    EntityStates + LightActuator + OccupancyTimer + SunClock + Send + Sync
{
}

impl<T> HostPlatform for T where
    T: EntityStates + LightActuator + OccupancyTimer + SunClock + Send + Sync
{
}

impl<T: EntityStates + Send + Sync> EntityStates for Arc<T> {
    fn get_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<EntitySnapshot>, RoomWatchError>> + Send {
        (**self).get_state(entity_id)
    }
}

impl<T: LightActuator + Send + Sync> LightActuator for Arc<T> {
    fn set_actuator(
        &self,
        entity_id: &EntityId,
        actuation: Actuation,
    ) -> impl Future<Output = Result<(), RoomWatchError>> + Send {
        (**self).set_actuator(entity_id, actuation)
    }
}

impl<T: OccupancyTimer + Send + Sync> OccupancyTimer for Arc<T> {
    fn start_timer(
        &self,
        timer_id: &EntityId,
    ) -> impl Future<Output = Result<(), RoomWatchError>> + Send {
        (**self).start_timer(timer_id)
    }
}

impl<T: SunClock> SunClock for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn sunrise(&self) -> Option<Timestamp> {
        (**self).sunrise()
    }

    fn sunset(&self) -> Option<Timestamp> {
        (**self).sunset()
    }

    fn sun_elevation(&self) -> Option<f64> {
        (**self).sun_elevation()
    }

    fn is_sun_down(&self) -> Option<bool> {
        (**self).is_sun_down()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHost, june};
    use roomwatch_domain::entity::EntityState;

    #[tokio::test]
    async fn should_read_single_attribute_through_port() {
        let host = FakeHost::default();
        host.insert_snapshot(
            EntitySnapshot::new(EntityId::new("weather.home"), EntityState::from("rainy"), june(9, 0))
                .with_attribute("temperature", AttributeValue::Float(11.5)),
        );
        let id = EntityId::new("weather.home");

        let temperature = host.get_attribute(&id, "temperature").await.unwrap();
        let missing = host.get_attribute(&id, "humidity").await.unwrap();

        assert_eq!(temperature, Some(AttributeValue::Float(11.5)));
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn should_forward_through_arc() {
        let host = Arc::new(FakeHost::default().with_state("light.desk", "off"));

        host.set_actuator(&EntityId::new("light.desk"), Actuation::On)
            .await
            .unwrap();

        assert_eq!(host.state_of("light.desk"), Some(EntityState::On));
        assert_eq!(host.now(), june(12, 0));
    }

    #[test]
    fn should_name_host_services() {
        assert_eq!(Actuation::On.service(), "turn_on");
        assert_eq!(Actuation::Off.to_string(), "turn_off");
    }
}
