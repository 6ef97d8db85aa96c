//! Typed subscription table and job schedule for one room.
//!
//! Built once from a [`RoomConfig`] when the controller is created. Each
//! entry maps an entity id plus a state filter to the handler that should
//! see matching changes.

use std::time::Duration;

use roomwatch_domain::daylight::DaylightStrategy;
use roomwatch_domain::entity::EntityState;
use roomwatch_domain::event::StateChange;
use roomwatch_domain::id::EntityId;
use roomwatch_domain::room::RoomConfig;
use roomwatch_domain::sensor::{SWEEP_INTERVAL, SensorKind};

/// What should process a matching state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// An occupancy sensor of the given kind.
    Sensor(SensorKind),
    /// The weather entity.
    Weather,
    /// The occupancy timer.
    Timer,
}

/// One row of the subscription table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub entity_id: EntityId,
    /// Only deliver changes *to* this value; `None` delivers every change.
    pub to: Option<EntityState>,
    pub handler: Handler,
}

impl Subscription {
    /// Whether `change` should be routed to this subscription's handler.
    ///
    /// Repeated values are never delivered.
    #[must_use]
    pub fn matches(&self, change: &StateChange) -> bool {
        if change.entity_id != self.entity_id || !change.is_transition() {
            return false;
        }
        self.to.as_ref().is_none_or(|expected| *expected == change.new)
    }
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.to {
            Some(to) => write!(f, "{:?}({} -> {to})", self.handler, self.entity_id),
            None => write!(f, "{:?}({})", self.handler, self.entity_id),
        }
    }
}

/// Every subscription for one room, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionTable {
    entries: Vec<Subscription>,
}

impl SubscriptionTable {
    /// Build the table for `config`.
    #[must_use]
    pub fn from_config(config: &RoomConfig) -> Self {
        let mut table = Self::default();

        for kind in [
            SensorKind::Motion,
            SensorKind::Door,
            SensorKind::Light,
            SensorKind::Vibration,
        ] {
            for id in config.sensors(kind) {
                table.push(id, Some(EntityState::On), Handler::Sensor(kind));
            }
        }
        for id in config.sensors(SensorKind::Power) {
            table.push(id, None, Handler::Sensor(SensorKind::Power));
        }
        if let Some(weather) = &config.weather_entity_id {
            table.push(weather, None, Handler::Weather);
        }
        table.push(&config.timer_id, None, Handler::Timer);

        table
    }

    fn push(&mut self, entity_id: &EntityId, to: Option<EntityState>, handler: Handler) {
        self.entries.push(Subscription {
            entity_id: entity_id.clone(),
            to,
            handler,
        });
    }

    /// Subscriptions whose filter accepts `change`.
    pub fn matching<'a>(
        &'a self,
        change: &'a StateChange,
    ) -> impl Iterator<Item = &'a Subscription> + 'a {
        self.entries.iter().filter(move |s| s.matches(change))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scheduled work the host runs through the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    /// Level-triggered reconciliation of motion and door sensors.
    Sweep,
    /// Offset sunrise reached (window strategy).
    Sunrise,
    /// Offset sunset reached (window strategy).
    Sunset,
    /// Periodic sun elevation re-check (elevation strategy).
    DaylightRecheck,
}

/// When a [`Job`] should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSchedule {
    Every(Duration),
    AtSunrise(chrono::Duration),
    AtSunset(chrono::Duration),
}

/// The jobs a room needs, derived from its daylight strategy.
///
/// A sun job whose offset does not fit a [`chrono::Duration`] is left out.
#[must_use]
pub fn job_plan(config: &RoomConfig) -> Vec<(JobSchedule, Job)> {
    let mut plan = vec![(JobSchedule::Every(SWEEP_INTERVAL), Job::Sweep)];
    match config.daylight {
        DaylightStrategy::Window {
            sunrise_offset_minutes,
            sunset_offset_minutes,
        } => {
            if let Some(offset) = chrono::Duration::try_minutes(sunrise_offset_minutes) {
                plan.push((JobSchedule::AtSunrise(offset), Job::Sunrise));
            }
            if let Some(offset) = chrono::Duration::try_minutes(sunset_offset_minutes) {
                plan.push((JobSchedule::AtSunset(offset), Job::Sunset));
            }
        }
        DaylightStrategy::Elevation { .. } => {
            plan.push((JobSchedule::Every(SWEEP_INTERVAL), Job::DaylightRecheck));
        }
    }
    plan
}
