//! Occupancy signal aggregator: classifies single sensor events.
//!
//! Stateless: each event is judged on its own plus live host state, and a
//! positive verdict issues exactly one timer start request.

use roomwatch_domain::entity::EntityState;
use roomwatch_domain::error::{ReadingError, RoomWatchError};
use roomwatch_domain::event::StateChange;
use roomwatch_domain::room::RoomConfig;
use roomwatch_domain::sensor::SensorKind;
use roomwatch_domain::timer::TimerState;

use crate::ports::HostPlatform;
use crate::services::timer_controller::OccupancyTimerController;

/// Verdict for one sensor event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Occupancy signalled, a timer start was requested.
    Occupied,
    /// Not an occupancy signal.
    Ignored,
    /// Reading could not be interpreted and was dropped.
    Dropped,
}

pub struct OccupancySignalAggregator<'a, H> {
    host: &'a H,
    config: &'a RoomConfig,
}

impl<'a, H: HostPlatform> OccupancySignalAggregator<'a, H> {
    pub fn new(host: &'a H, config: &'a RoomConfig) -> Self {
        Self { host, config }
    }

    /// Classify `change` from a sensor of `kind` and request a timer start
    /// when it signals occupancy.
    ///
    /// # Errors
    ///
    /// Returns a host error if the timer state cannot be read (light
    /// events) or the start request is rejected.
    pub async fn on_sensor_event(
        &self,
        kind: SensorKind,
        change: &StateChange,
    ) -> Result<Verdict, RoomWatchError> {
        let asserted = change.new == EntityState::On;
        let occupied = match kind {
            SensorKind::Motion | SensorKind::Vibration => asserted,
            SensorKind::Door => asserted && self.config.occupied_on_door_open,
            // While active, lights switching on are most likely our own doing.
            SensorKind::Light => {
                asserted && self.timer().current_state().await? == Some(TimerState::Idle)
            }
            SensorKind::Power => match power_reading(change) {
                Ok(watts) => watts > self.config.power_threshold,
                Err(err) => {
                    tracing::warn!(%err, "power reading dropped");
                    return Ok(Verdict::Dropped);
                }
            },
        };

        tracing::debug!(%kind, %change, occupied, "sensor event classified");
        if !occupied {
            return Ok(Verdict::Ignored);
        }
        self.timer().request_start().await?;
        Ok(Verdict::Occupied)
    }

    fn timer(&self) -> OccupancyTimerController<'a, H> {
        OccupancyTimerController::new(self.host, self.config)
    }
}

/// Parse the numeric value of a power sensor change.
///
/// # Errors
///
/// Returns [`ReadingError::NotNumeric`] for any non-numeric state.
pub fn power_reading(change: &StateChange) -> Result<f64, ReadingError> {
    change
        .new
        .as_number()
        .ok_or_else(|| ReadingError::NotNumeric {
            entity_id: change.entity_id.clone(),
            value: change.new.to_string(),
        })
}
