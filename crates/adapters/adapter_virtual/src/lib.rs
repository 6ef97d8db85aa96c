//! # roomwatch-adapter-virtual
//!
//! Simulated host for running and testing the room controller without a
//! real home automation platform.
//!
//! ## What it provides
//!
//! | Port | Behaviour |
//! |------|-----------|
//! | `EntityStates` | In-memory entity table seeded at build time |
//! | `LightActuator` | `turn_on` / `turn_off` flip the light's state |
//! | `OccupancyTimer` | `idle` → `active`, back to `idle` after the configured duration |
//! | `SunClock` | NOAA sunrise/sunset/elevation for the home location |
//! | `Subscriber` | State changes of subscribed entities go out on a broadcast bus |
//! | `Scheduler` | Jobs are recorded and handed out by [`VirtualHost::due_jobs`] |
//!
//! ## Dependency rule
//!
//! Depends on `roomwatch-app` (port traits) and `roomwatch-domain` only.

mod clock;
mod schedule;
mod solar;
mod timer;

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use roomwatch_app::event_bus::InProcessEventBus;
use roomwatch_app::ports::{
    Actuation, EntityStates, LightActuator, OccupancyTimer, Scheduler, Subscriber, SunClock,
};
use roomwatch_app::subscription::{Job, JobSchedule, Subscription};
use roomwatch_domain::entity::{EntitySnapshot, EntityState};
use roomwatch_domain::error::{HostError, RoomWatchError};
use roomwatch_domain::event::StateChange;
use roomwatch_domain::id::EntityId;
use roomwatch_domain::time::Timestamp;
use roomwatch_domain::timer::TimerState;
use tokio::sync::broadcast;

pub use clock::SimClock;
pub use schedule::ScheduledJob;
pub use solar::{HomeLocation, SunTimes};

use schedule::JobBook;
use timer::TimerBank;

/// Default occupancy timer countdown.
pub const DEFAULT_TIMER_DURATION: Duration = Duration::from_secs(300);

const BUS_CAPACITY: usize = 256;

/// In-memory host. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct VirtualHost {
    inner: Arc<Inner>,
}

struct Inner {
    home: HomeLocation,
    clock: SimClock,
    entities: Mutex<HashMap<EntityId, EntitySnapshot>>,
    unreachable: Mutex<HashSet<EntityId>>,
    subscriptions: Mutex<Vec<Subscription>>,
    jobs: Mutex<JobBook>,
    timers: TimerBank,
    bus: InProcessEventBus,
}

impl VirtualHost {
    #[must_use]
    pub fn builder(home: HomeLocation) -> VirtualHostBuilder {
        VirtualHostBuilder {
            home,
            clock: SimClock::System,
            timer_duration: DEFAULT_TIMER_DURATION,
            entities: Vec::new(),
        }
    }

    #[must_use]
    pub fn home(&self) -> HomeLocation {
        self.inner.home
    }

    pub fn clock(&self) -> &SimClock {
        &self.inner.clock
    }

    /// Receive every change of a subscribed entity.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<StateChange> {
        self.inner.bus.subscribe()
    }

    /// Simulate the outside world changing an entity.
    pub fn set_state(&self, id: &EntityId, state: impl Into<EntityState>) -> StateChange {
        self.inner.write_state(id, state.into())
    }

    #[must_use]
    pub fn state_of(&self, id: &EntityId) -> Option<EntityState> {
        lock(&self.inner.entities)
            .get(id)
            .map(|snapshot| snapshot.state.clone())
    }

    /// Make reads and commands for `id` fail until cleared.
    pub fn set_unreachable(&self, id: &EntityId, unreachable: bool) {
        let mut set = lock(&self.inner.unreachable);
        if unreachable {
            set.insert(id.clone());
        } else {
            set.remove(id);
        }
    }

    /// Run the timer's countdown out now.
    pub fn expire_timer(&self, id: &EntityId) -> bool {
        if !self.inner.timers.cancel(id) {
            return false;
        }
        tracing::debug!(timer = %id, "occupancy timer expired early");
        self.inner.write_state(id, TimerState::Idle.as_entity_state());
        true
    }

    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription> {
        lock(&self.inner.subscriptions).clone()
    }

    #[must_use]
    pub fn scheduled(&self) -> Vec<ScheduledJob> {
        lock(&self.inner.jobs).entries().to_vec()
    }

    /// Jobs due at the current clock time, each rescheduled.
    #[must_use]
    pub fn due_jobs(&self) -> Vec<Job> {
        let now = self.inner.clock.now();
        lock(&self.inner.jobs).take_due(now, &self.inner.home)
    }
}

impl Inner {
    fn is_unreachable(&self, id: &EntityId) -> bool {
        lock(&self.unreachable).contains(id)
    }

    fn is_subscribed(&self, id: &EntityId) -> bool {
        lock(&self.subscriptions)
            .iter()
            .any(|subscription| subscription.entity_id == *id)
    }

    fn write_state(&self, id: &EntityId, state: EntityState) -> StateChange {
        let at = self.clock.now();
        let change = {
            let mut entities = lock(&self.entities);
            let old = entities.get(id).map(|snapshot| snapshot.state.clone());
            entities
                .entry(id.clone())
                .and_modify(|snapshot| snapshot.update_state(state.clone(), at))
                .or_insert_with(|| EntitySnapshot::new(id.clone(), state.clone(), at));
            StateChange::new(id.clone(), old, state, at)
        };
        if self.is_subscribed(id) {
            self.bus.emit(change.clone());
        }
        change
    }
}

impl EntityStates for VirtualHost {
    fn get_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<EntitySnapshot>, RoomWatchError>> + Send {
        let result = if self.inner.is_unreachable(entity_id) {
            Err(HostError::Unavailable(entity_id.clone()).into())
        } else {
            Ok(lock(&self.inner.entities).get(entity_id).cloned())
        };
        async { result }
    }
}

impl LightActuator for VirtualHost {
    fn set_actuator(
        &self,
        entity_id: &EntityId,
        actuation: Actuation,
    ) -> impl Future<Output = Result<(), RoomWatchError>> + Send {
        let known = lock(&self.inner.entities).contains_key(entity_id);
        let result = if self.inner.is_unreachable(entity_id) {
            Err(HostError::CommandRejected {
                entity_id: entity_id.clone(),
                command: actuation.service(),
            }
            .into())
        } else if known {
            let state = match actuation {
                Actuation::On => EntityState::On,
                Actuation::Off => EntityState::Off,
            };
            self.inner.write_state(entity_id, state);
            Ok(())
        } else {
            Err(HostError::Unavailable(entity_id.clone()).into())
        };
        async { result }
    }
}

impl OccupancyTimer for VirtualHost {
    fn start_timer(
        &self,
        timer_id: &EntityId,
    ) -> impl Future<Output = Result<(), RoomWatchError>> + Send {
        let inner = Arc::clone(&self.inner);
        let timer_id = timer_id.clone();
        async move {
            if inner.is_unreachable(&timer_id) || !lock(&inner.entities).contains_key(&timer_id) {
                return Err(HostError::Unavailable(timer_id).into());
            }
            let generation = inner.timers.arm(&timer_id);
            inner.write_state(&timer_id, TimerState::Active.as_entity_state());

            let countdown = inner.timers.duration();
            tokio::spawn(async move {
                tokio::time::sleep(countdown).await;
                if inner.timers.expire(&timer_id, generation) {
                    tracing::debug!(timer = %timer_id, "occupancy timer ran out");
                    inner.write_state(&timer_id, TimerState::Idle.as_entity_state());
                }
            });
            Ok(())
        }
    }
}

impl SunClock for VirtualHost {
    fn now(&self) -> Timestamp {
        self.inner.clock.now()
    }

    fn sunrise(&self) -> Option<Timestamp> {
        let today = self.now().date_naive();
        self.inner.home.sun_times(today).map(|times| times.sunrise)
    }

    fn sunset(&self) -> Option<Timestamp> {
        let today = self.now().date_naive();
        self.inner.home.sun_times(today).map(|times| times.sunset)
    }

    fn sun_elevation(&self) -> Option<f64> {
        Some(self.inner.home.elevation(self.now()))
    }

    fn is_sun_down(&self) -> Option<bool> {
        Some(self.inner.home.is_sun_down(self.now()))
    }
}

impl Subscriber for VirtualHost {
    fn subscribe(&self, subscription: &Subscription) -> Result<(), RoomWatchError> {
        if !subscription.entity_id.is_well_formed() {
            return Err(HostError::Unavailable(subscription.entity_id.clone()).into());
        }
        tracing::debug!(%subscription, "subscription registered");
        lock(&self.inner.subscriptions).push(subscription.clone());
        Ok(())
    }
}

impl Scheduler for VirtualHost {
    fn schedule_every(&self, interval: Duration, job: Job) -> Result<(), RoomWatchError> {
        self.add_job(JobSchedule::Every(interval), job);
        Ok(())
    }

    fn schedule_at_sunrise(&self, offset: chrono::Duration, job: Job) -> Result<(), RoomWatchError> {
        self.add_job(JobSchedule::AtSunrise(offset), job);
        Ok(())
    }

    fn schedule_at_sunset(&self, offset: chrono::Duration, job: Job) -> Result<(), RoomWatchError> {
        self.add_job(JobSchedule::AtSunset(offset), job);
        Ok(())
    }
}

impl VirtualHost {
    fn add_job(&self, schedule: JobSchedule, job: Job) {
        tracing::debug!(?schedule, ?job, "job scheduled");
        let now = self.inner.clock.now();
        lock(&self.inner.jobs).add(schedule, job, now, &self.inner.home);
    }
}

/// Builder for [`VirtualHost`].
pub struct VirtualHostBuilder {
    home: HomeLocation,
    clock: SimClock,
    timer_duration: Duration,
    entities: Vec<(EntityId, EntityState)>,
}

impl VirtualHostBuilder {
    #[must_use]
    pub fn clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn timer_duration(mut self, duration: Duration) -> Self {
        self.timer_duration = duration;
        self
    }

    /// Seed an entity with an initial state.
    #[must_use]
    pub fn entity(mut self, id: impl Into<EntityId>, state: impl Into<EntityState>) -> Self {
        self.entities.push((id.into(), state.into()));
        self
    }

    #[must_use]
    pub fn build(self) -> VirtualHost {
        let at = self.clock.now();
        let entities = self
            .entities
            .into_iter()
            .map(|(id, state)| (id.clone(), EntitySnapshot::new(id, state, at)))
            .collect();

        VirtualHost {
            inner: Arc::new(Inner {
                home: self.home,
                clock: self.clock,
                entities: Mutex::new(entities),
                unreachable: Mutex::new(HashSet::new()),
                subscriptions: Mutex::new(Vec::new()),
                jobs: Mutex::new(JobBook::default()),
                timers: TimerBank::new(self.timer_duration),
                bus: InProcessEventBus::new(BUS_CAPACITY),
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
