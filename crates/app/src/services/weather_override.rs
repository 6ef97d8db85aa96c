//! Weather override: light an occupied room when the weather turns dark.

use roomwatch_domain::error::RoomWatchError;
use roomwatch_domain::event::StateChange;
use roomwatch_domain::room::RoomConfig;
use roomwatch_domain::timer::TimerState;
use roomwatch_domain::weather::WeatherCondition;

use crate::ports::HostPlatform;
use crate::services::light_policy::{ActuationReport, DaylightMode, LightActuationPolicy};
use crate::services::timer_controller::OccupancyTimerController;

pub struct WeatherOverride<'a, H> {
    host: &'a H,
    config: &'a RoomConfig,
}

impl<'a, H: HostPlatform> WeatherOverride<'a, H> {
    pub fn new(host: &'a H, config: &'a RoomConfig) -> Self {
        Self { host, config }
    }

    /// Turn lights on, ignoring daylight, if the room is occupied and the
    /// new weather is adverse. Returns `None` when nothing was attempted.
    ///
    /// # Errors
    ///
    /// Returns the host error if the occupancy timer cannot be read.
    pub async fn on_weather_change(
        &self,
        change: &StateChange,
    ) -> Result<Option<ActuationReport>, RoomWatchError> {
        let condition = WeatherCondition::from_entity_state(&change.new);
        if !condition.is_adverse() {
            return Ok(None);
        }
        let timer = OccupancyTimerController::new(self.host, self.config);
        if timer.current_state().await? != Some(TimerState::Active) {
            tracing::debug!(?condition, "adverse weather but room not occupied");
            return Ok(None);
        }
        tracing::info!(?condition, room = %self.config.name, "adverse weather, forcing lights on");
        let report = LightActuationPolicy::new(self.host, self.config)
            .turn_on(DaylightMode::Ignore)
            .await;
        Ok(Some(report))
    }
}
