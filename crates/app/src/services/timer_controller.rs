//! Occupancy timer controller: the only component that starts the timer,
//! and the one that reacts when the host reports it changing state.
//!
//! | Transition      | Reaction                                              |
//! |-----------------|-------------------------------------------------------|
//! | idle → active   | turn lights on (daylight ignored in adverse weather)  |
//! | active → idle   | turn lights off                                       |
//! | x → x           | nothing                                               |

use roomwatch_domain::error::RoomWatchError;
use roomwatch_domain::event::StateChange;
use roomwatch_domain::room::RoomConfig;
use roomwatch_domain::timer::{TimerState, TimerTransition};
use roomwatch_domain::weather::WeatherCondition;

use crate::ports::HostPlatform;
use crate::services::light_policy::{ActuationReport, DaylightMode, LightActuationPolicy};

pub struct OccupancyTimerController<'a, H> {
    host: &'a H,
    config: &'a RoomConfig,
}

impl<'a, H: HostPlatform> OccupancyTimerController<'a, H> {
    pub fn new(host: &'a H, config: &'a RoomConfig) -> Self {
        Self { host, config }
    }

    /// Ask the host to start (or restart) the occupancy timer.
    ///
    /// # Errors
    ///
    /// Returns the host error if the start request is rejected.
    pub async fn request_start(&self) -> Result<(), RoomWatchError> {
        self.host.start_timer(&self.config.timer_id).await?;
        tracing::info!(timer = %self.config.timer_id, room = %self.config.name, "occupancy timer started");
        Ok(())
    }

    /// Live state of the timer; `None` if the host has no recognisable value.
    ///
    /// # Errors
    ///
    /// Returns the host error if the timer cannot be read.
    pub async fn current_state(&self) -> Result<Option<TimerState>, RoomWatchError> {
        Ok(self
            .host
            .get_state(&self.config.timer_id)
            .await?
            .and_then(|snapshot| TimerState::from_entity_state(&snapshot.state)))
    }

    /// React to a reported change of the timer entity.
    ///
    /// Returns `None` when the change is not an idle/active transition.
    pub async fn on_timer_change(
        &self,
        change: &StateChange,
    ) -> Option<(TimerTransition, ActuationReport)> {
        let transition = TimerTransition::between(change.old.as_ref(), &change.new)?;
        tracing::debug!(%change, ?transition, "occupancy timer transition");

        let policy = LightActuationPolicy::new(self.host, self.config);
        let report = match transition {
            TimerTransition::Activated => {
                let mode = if self.weather_is_adverse().await {
                    DaylightMode::Ignore
                } else {
                    DaylightMode::Respect
                };
                policy.turn_on(mode).await
            }
            TimerTransition::Deactivated => policy.turn_off().await,
        };
        Some((transition, report))
    }

    /// Missing or unreadable weather counts as benign.
    async fn weather_is_adverse(&self) -> bool {
        let Some(weather) = &self.config.weather_entity_id else {
            return false;
        };
        match self.host.get_state(weather).await {
            Ok(Some(snapshot)) => WeatherCondition::from_entity_state(&snapshot.state).is_adverse(),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(%err, %weather, "weather unreadable, assuming benign");
                false
            }
        }
    }
}
