//! In-memory host double shared by the engine's unit tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use chrono::TimeZone;
use roomwatch_domain::entity::{EntitySnapshot, EntityState};
use roomwatch_domain::error::{HostError, RoomWatchError};
use roomwatch_domain::id::EntityId;
use roomwatch_domain::time::Timestamp;

use crate::ports::{Actuation, EntityStates, LightActuator, OccupancyTimer, SunClock};

pub struct FakeHost {
    states: Mutex<HashMap<EntityId, EntitySnapshot>>,
    commands: Mutex<Vec<(EntityId, Actuation)>>,
    timer_starts: Mutex<Vec<EntityId>>,
    broken_lights: Mutex<HashSet<EntityId>>,
    unreadable: Mutex<HashSet<EntityId>>,
    now: Mutex<Timestamp>,
    sunrise: Option<Timestamp>,
    sunset: Option<Timestamp>,
    elevation: Mutex<Option<f64>>,
    sun_down: Mutex<Option<bool>>,
}

/// 2024-06-15, sunrise 06:00 and sunset 20:00 UTC.
pub fn june(hour: u32, min: u32) -> Timestamp {
    chrono::Utc
        .with_ymd_and_hms(2024, 6, 15, hour, min, 0)
        .unwrap()
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            commands: Mutex::new(Vec::new()),
            timer_starts: Mutex::new(Vec::new()),
            broken_lights: Mutex::new(HashSet::new()),
            unreadable: Mutex::new(HashSet::new()),
            now: Mutex::new(june(12, 0)),
            sunrise: Some(june(6, 0)),
            sunset: Some(june(20, 0)),
            elevation: Mutex::new(None),
            sun_down: Mutex::new(None),
        }
    }
}

impl FakeHost {
    pub fn with_state(self, entity: &str, state: &str) -> Self {
        self.set_state(entity, state);
        self
    }

    pub fn set_state(&self, entity: &str, state: &str) {
        let now = *self.now.lock().unwrap();
        self.set_state_since(entity, state, now);
    }

    pub fn set_state_since(&self, entity: &str, state: &str, since: Timestamp) {
        let id = EntityId::new(entity);
        self.states.lock().unwrap().insert(
            id.clone(),
            EntitySnapshot::new(id, EntityState::from(state), since),
        );
    }

    pub fn insert_snapshot(&self, snapshot: EntitySnapshot) {
        self.states
            .lock()
            .unwrap()
            .insert(snapshot.entity_id.clone(), snapshot);
    }

    pub fn state_of(&self, entity: &str) -> Option<EntityState> {
        self.states
            .lock()
            .unwrap()
            .get(&EntityId::new(entity))
            .map(|s| s.state.clone())
    }

    pub fn set_now(&self, now: Timestamp) {
        *self.now.lock().unwrap() = now;
    }

    pub fn set_elevation(&self, degrees: f64) {
        *self.elevation.lock().unwrap() = Some(degrees);
    }

    pub fn set_sun_down(&self, down: bool) {
        *self.sun_down.lock().unwrap() = Some(down);
    }

    pub fn break_light(&self, entity: &str) {
        self.broken_lights
            .lock()
            .unwrap()
            .insert(EntityId::new(entity));
    }

    pub fn make_unreadable(&self, entity: &str) {
        self.unreadable.lock().unwrap().insert(EntityId::new(entity));
    }

    pub fn commands(&self) -> Vec<(String, Actuation)> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|(id, a)| (id.to_string(), *a))
            .collect()
    }

    pub fn timer_starts(&self) -> usize {
        self.timer_starts.lock().unwrap().len()
    }
}

impl EntityStates for FakeHost {
    fn get_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<EntitySnapshot>, RoomWatchError>> + Send {
        let result = if self.unreadable.lock().unwrap().contains(entity_id) {
            Err(HostError::Unavailable(entity_id.clone()).into())
        } else {
            Ok(self.states.lock().unwrap().get(entity_id).cloned())
        };
        async { result }
    }
}

impl LightActuator for FakeHost {
    fn set_actuator(
        &self,
        entity_id: &EntityId,
        actuation: Actuation,
    ) -> impl Future<Output = Result<(), RoomWatchError>> + Send {
        let result = if self.broken_lights.lock().unwrap().contains(entity_id) {
            Err(HostError::CommandRejected {
                entity_id: entity_id.clone(),
                command: actuation.service(),
            }
            .into())
        } else {
            self.commands
                .lock()
                .unwrap()
                .push((entity_id.clone(), actuation));
            let state = match actuation {
                Actuation::On => "on",
                Actuation::Off => "off",
            };
            self.set_state(entity_id.as_str(), state);
            Ok(())
        };
        async { result }
    }
}

impl OccupancyTimer for FakeHost {
    fn start_timer(
        &self,
        timer_id: &EntityId,
    ) -> impl Future<Output = Result<(), RoomWatchError>> + Send {
        self.timer_starts.lock().unwrap().push(timer_id.clone());
        async { Ok(()) }
    }
}

impl SunClock for FakeHost {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }

    fn sunrise(&self) -> Option<Timestamp> {
        self.sunrise
    }

    fn sunset(&self) -> Option<Timestamp> {
        self.sunset
    }

    fn sun_elevation(&self) -> Option<f64> {
        *self.elevation.lock().unwrap()
    }

    fn is_sun_down(&self) -> Option<bool> {
        *self.sun_down.lock().unwrap()
    }
}
