//! Room controller: the driving port the host calls into.
//!
//! Owns the host handle, the validated room configuration and the typed
//! subscription table. [`RoomController::dispatch`] routes one state change
//! to the matching decision components and [`RoomController::run_job`] runs
//! one scheduled job. Neither propagates errors: a failing handler is
//! logged and the next event is processed normally.

use roomwatch_domain::error::RoomWatchError;
use roomwatch_domain::event::StateChange;
use roomwatch_domain::room::RoomConfig;
use roomwatch_domain::timer::TimerState;

use crate::ports::{HostPlatform, Scheduler, Subscriber};
use crate::services::light_policy::{ActuationReport, DaylightMode, LightActuationPolicy};
use crate::services::occupancy_aggregator::OccupancySignalAggregator;
use crate::services::sweep_reconciler::SweepReconciler;
use crate::services::timer_controller::OccupancyTimerController;
use crate::services::weather_override::WeatherOverride;
use crate::subscription::{Handler, Job, JobSchedule, SubscriptionTable, job_plan};

pub struct RoomController<H> {
    host: H,
    config: RoomConfig,
    subscriptions: SubscriptionTable,
}

impl<H: HostPlatform> RoomController<H> {
    /// Validate `config` and build the subscription table.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configuration is unusable.
    pub fn new(host: H, config: RoomConfig) -> Result<Self, RoomWatchError> {
        config.validate()?;
        let subscriptions = SubscriptionTable::from_config(&config);
        Ok(Self {
            host,
            config,
            subscriptions,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn subscriptions(&self) -> &SubscriptionTable {
        &self.subscriptions
    }

    /// Register every subscription and scheduled job with the host.
    ///
    /// # Errors
    ///
    /// Returns the first registration the host refuses.
    #[tracing::instrument(skip_all, fields(room = %self.config.name))]
    pub fn initialize<R>(&self, registrar: &R) -> Result<(), RoomWatchError>
    where
        R: Subscriber + Scheduler,
    {
        for subscription in self.subscriptions.iter() {
            registrar.subscribe(subscription)?;
        }
        for (schedule, job) in job_plan(&self.config) {
            match schedule {
                JobSchedule::Every(interval) => registrar.schedule_every(interval, job)?,
                JobSchedule::AtSunrise(offset) => registrar.schedule_at_sunrise(offset, job)?,
                JobSchedule::AtSunset(offset) => registrar.schedule_at_sunset(offset, job)?,
            }
        }
        tracing::info!(
            subscriptions = self.subscriptions.len(),
            "room controller initialized"
        );
        Ok(())
    }

    /// Route `change` to every matching handler. Returns how many ran.
    #[tracing::instrument(skip_all, fields(room = %self.config.name, %change))]
    pub async fn dispatch(&self, change: &StateChange) -> usize {
        let mut handled = 0;
        for subscription in self.subscriptions.matching(change) {
            handled += 1;
            match subscription.handler {
                Handler::Sensor(kind) => {
                    if let Err(err) = OccupancySignalAggregator::new(&self.host, &self.config)
                        .on_sensor_event(kind, change)
                        .await
                    {
                        tracing::warn!(%err, %kind, "sensor handler failed");
                    }
                }
                Handler::Weather => {
                    if let Err(err) = WeatherOverride::new(&self.host, &self.config)
                        .on_weather_change(change)
                        .await
                    {
                        tracing::warn!(%err, "weather handler failed");
                    }
                }
                Handler::Timer => {
                    OccupancyTimerController::new(&self.host, &self.config)
                        .on_timer_change(change)
                        .await;
                }
            }
        }
        handled
    }

    /// Run one scheduled job.
    #[tracing::instrument(skip(self), fields(room = %self.config.name))]
    pub async fn run_job(&self, job: Job) {
        match job {
            Job::Sweep => {
                SweepReconciler::new(&self.host, &self.config).sweep().await;
            }
            Job::Sunrise => {
                self.turn_off_unless_always_on().await;
            }
            Job::Sunset | Job::DaylightRecheck => {
                self.turn_on_if_occupied().await;
            }
        }
    }

    /// Lights out at sunrise, unless the room keeps them on.
    async fn turn_off_unless_always_on(&self) -> Option<ActuationReport> {
        if self.config.always_on {
            return None;
        }
        Some(self.lights().turn_off().await)
    }

    /// Daylight-gated turn-on, only while the occupancy timer is active.
    async fn turn_on_if_occupied(&self) -> Option<ActuationReport> {
        if self.config.always_on {
            return None;
        }
        match OccupancyTimerController::new(&self.host, &self.config)
            .current_state()
            .await
        {
            Ok(Some(TimerState::Active)) => {
                Some(self.lights().turn_on(DaylightMode::Respect).await)
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(%err, "occupancy timer unreadable, skipping turn-on");
                None
            }
        }
    }

    fn lights(&self) -> LightActuationPolicy<'_, H> {
        LightActuationPolicy::new(&self.host, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Actuation;
    use crate::subscription::Subscription;
    use crate::testing::{FakeHost, june};
    use roomwatch_domain::daylight::DaylightStrategy;
    use roomwatch_domain::entity::EntityState;
    use roomwatch_domain::error::{HostError, ValidationError};
    use roomwatch_domain::id::EntityId;
    use roomwatch_domain::sensor::SWEEP_INTERVAL;
    use std::sync::Mutex;
    use std::time::Duration;

    // ── Recording registrar ──────────────────────────────────────

    #[derive(Default)]
    struct RecordingRegistrar {
        subscriptions: Mutex<Vec<Subscription>>,
        schedules: Mutex<Vec<(JobSchedule, Job)>>,
        refuse: bool,
    }

    impl Subscriber for RecordingRegistrar {
        fn subscribe(&self, subscription: &Subscription) -> Result<(), RoomWatchError> {
            if self.refuse {
                return Err(HostError::Unavailable(subscription.entity_id.clone()).into());
            }
            self.subscriptions.lock().unwrap().push(subscription.clone());
            Ok(())
        }
    }

    impl Scheduler for RecordingRegistrar {
        fn schedule_every(&self, interval: Duration, job: Job) -> Result<(), RoomWatchError> {
            self.schedules
                .lock()
                .unwrap()
                .push((JobSchedule::Every(interval), job));
            Ok(())
        }

        fn schedule_at_sunrise(
            &self,
            offset: chrono::Duration,
            job: Job,
        ) -> Result<(), RoomWatchError> {
            self.schedules
                .lock()
                .unwrap()
                .push((JobSchedule::AtSunrise(offset), job));
            Ok(())
        }

        fn schedule_at_sunset(
            &self,
            offset: chrono::Duration,
            job: Job,
        ) -> Result<(), RoomWatchError> {
            self.schedules
                .lock()
                .unwrap()
                .push((JobSchedule::AtSunset(offset), job));
            Ok(())
        }
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn config() -> RoomConfig {
        RoomConfig::builder()
            .name("office")
            .timer("timer.office")
            .light("light.ceiling")
            .light("light.desk")
            .motion_sensor("binary_sensor.office_motion")
            .power_sensor("sensor.desk_power")
            .power_threshold(100.0)
            .override_switch("input_boolean.office_override")
            .weather_entity("weather.home")
            .build()
            .unwrap()
    }

    fn host() -> FakeHost {
        FakeHost::default()
            .with_state("light.ceiling", "off")
            .with_state("light.desk", "off")
            .with_state("input_boolean.office_override", "off")
            .with_state("timer.office", "idle")
            .with_state("weather.home", "sunny")
    }

    fn change(entity: &str, old: &str, new: &str) -> StateChange {
        StateChange::new(
            EntityId::new(entity),
            Some(EntityState::from(old)),
            EntityState::from(new),
            june(12, 0),
        )
    }

    // ── Tests ────────────────────────────────────────────────────

    #[test]
    fn should_reject_invalid_config() {
        let config = RoomConfig {
            lights: Vec::new(),
            ..config()
        };
        assert!(RoomController::new(host(), config).is_err());
    }

    #[test]
    fn should_reject_sun_offset_beyond_one_day() {
        let config = RoomConfig {
            daylight: DaylightStrategy::Window {
                sunrise_offset_minutes: 30,
                sunset_offset_minutes: 9_000_000_000_000,
            },
            ..config()
        };
        assert!(matches!(
            RoomController::new(host(), config),
            Err(RoomWatchError::Validation(ValidationError::OffsetOutOfRange(_)))
        ));
    }

    #[test]
    fn should_register_subscriptions_and_jobs() {
        let controller = RoomController::new(host(), config()).unwrap();
        let registrar = RecordingRegistrar::default();

        controller.initialize(&registrar).unwrap();

        assert_eq!(
            registrar.subscriptions.lock().unwrap().len(),
            controller.subscriptions().len()
        );
        let jobs: Vec<Job> = registrar
            .schedules
            .lock()
            .unwrap()
            .iter()
            .map(|(_, job)| *job)
            .collect();
        assert_eq!(jobs, vec![Job::Sweep, Job::Sunrise, Job::Sunset]);
        assert_eq!(
            registrar.schedules.lock().unwrap()[0].0,
            JobSchedule::Every(SWEEP_INTERVAL)
        );
    }

    #[test]
    fn should_fail_initialize_when_host_refuses() {
        let controller = RoomController::new(host(), config()).unwrap();
        let registrar = RecordingRegistrar {
            refuse: true,
            ..RecordingRegistrar::default()
        };

        assert!(controller.initialize(&registrar).is_err());
    }

    #[tokio::test]
    async fn should_start_timer_then_light_room_after_sunset() {
        let host = host();
        host.set_now(june(19, 31));
        let controller = RoomController::new(host, config()).unwrap();

        let handled = controller
            .dispatch(&change("binary_sensor.office_motion", "off", "on"))
            .await;
        assert_eq!(handled, 1);
        assert_eq!(controller.host().timer_starts(), 1);

        controller
            .dispatch(&change("timer.office", "idle", "active"))
            .await;
        assert_eq!(
            controller.host().commands(),
            vec![
                ("light.ceiling".to_string(), Actuation::On),
                ("light.desk".to_string(), Actuation::On),
            ]
        );
    }

    #[tokio::test]
    async fn should_keep_processing_after_bad_power_reading() {
        let controller = RoomController::new(host(), config()).unwrap();

        controller
            .dispatch(&change("sensor.desk_power", "20", "abc"))
            .await;
        assert_eq!(controller.host().timer_starts(), 0);

        controller
            .dispatch(&change("sensor.desk_power", "abc", "150"))
            .await;
        assert_eq!(controller.host().timer_starts(), 1);
    }

    #[tokio::test]
    async fn should_ignore_unsubscribed_entity() {
        let controller = RoomController::new(host(), config()).unwrap();

        let handled = controller
            .dispatch(&change("binary_sensor.kitchen_motion", "off", "on"))
            .await;

        assert_eq!(handled, 0);
        assert_eq!(controller.host().timer_starts(), 0);
    }

    #[tokio::test]
    async fn should_light_room_on_fog_while_occupied() {
        let host = host().with_state("timer.office", "active");
        let controller = RoomController::new(host, config()).unwrap();

        controller
            .dispatch(&change("weather.home", "sunny", "fog"))
            .await;

        assert_eq!(controller.host().commands().len(), 2);
    }

    #[tokio::test]
    async fn should_turn_lights_off_at_sunrise() {
        let host = host()
            .with_state("light.ceiling", "on")
            .with_state("light.desk", "on");
        let controller = RoomController::new(host, config()).unwrap();

        controller.run_job(Job::Sunrise).await;

        assert_eq!(controller.host().state_of("light.ceiling"), Some(EntityState::Off));
        assert_eq!(controller.host().state_of("light.desk"), Some(EntityState::Off));
    }

    #[tokio::test]
    async fn should_leave_lights_at_sunrise_when_always_on() {
        let host = host().with_state("light.ceiling", "on");
        let config = RoomConfig {
            always_on: true,
            ..config()
        };
        let controller = RoomController::new(host, config).unwrap();

        controller.run_job(Job::Sunrise).await;

        assert!(controller.host().commands().is_empty());
    }

    #[tokio::test]
    async fn should_turn_lights_on_at_sunset_only_while_occupied() {
        let host = host();
        host.set_now(june(19, 31));
        let controller = RoomController::new(host, config()).unwrap();

        controller.run_job(Job::Sunset).await;
        assert!(controller.host().commands().is_empty());

        controller.host().set_state("timer.office", "active");
        controller.run_job(Job::Sunset).await;
        assert_eq!(controller.host().commands().len(), 2);
    }

    #[tokio::test]
    async fn should_recheck_elevation_while_occupied() {
        let host = host().with_state("timer.office", "active");
        host.set_elevation(10.0);
        let config = RoomConfig {
            daylight: DaylightStrategy::Elevation {
                threshold_degrees: 2.0,
                home_latitude: 52.5,
                home_longitude: 13.4,
            },
            ..config()
        };
        let controller = RoomController::new(host, config).unwrap();

        controller.run_job(Job::DaylightRecheck).await;
        assert!(controller.host().commands().is_empty());

        controller.host().set_elevation(1.0);
        controller.run_job(Job::DaylightRecheck).await;
        assert_eq!(controller.host().commands().len(), 2);
    }

    #[tokio::test]
    async fn should_start_timer_from_sweep_job() {
        let host = host();
        host.set_state_since("binary_sensor.office_motion", "on", june(11, 0));
        let controller = RoomController::new(host, config()).unwrap();

        controller.run_job(Job::Sweep).await;

        assert_eq!(controller.host().timer_starts(), 1);
    }
}
