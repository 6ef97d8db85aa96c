//! Sweep reconciler: periodic level-triggered occupancy checks.
//!
//! Edge-triggered subscriptions miss sensors that went `on` before the
//! controller attached, and cannot express "door closed means someone is
//! inside". Every sweep therefore re-reads live state:
//!
//! 1. the first motion sensor asserted for at least the dwell threshold
//!    triggers one start request;
//! 2. with `occupied_on_door_closed`, the first closed door triggers one
//!    start request.
//!
//! A sensor that cannot be read is skipped without aborting the sweep.

use roomwatch_domain::entity::EntityState;
use roomwatch_domain::id::EntityId;
use roomwatch_domain::room::RoomConfig;
use roomwatch_domain::sensor::{SensorKind, SensorSource};

use crate::ports::HostPlatform;
use crate::services::timer_controller::OccupancyTimerController;

/// Which checks of one sweep requested a timer start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub dwelling_motion: Option<EntityId>,
    pub closed_door: Option<EntityId>,
}

pub struct SweepReconciler<'a, H> {
    host: &'a H,
    config: &'a RoomConfig,
}

impl<'a, H: HostPlatform> SweepReconciler<'a, H> {
    pub fn new(host: &'a H, config: &'a RoomConfig) -> Self {
        Self { host, config }
    }

    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        if let Some(sensor) = self.first_dwelling_motion().await
            && self.start(&sensor).await
        {
            report.dwelling_motion = Some(sensor);
        }

        if self.config.occupied_on_door_closed
            && let Some(door) = self.first_closed_door().await
            && self.start(&door).await
        {
            report.closed_door = Some(door);
        }

        report
    }

    async fn first_dwelling_motion(&self) -> Option<EntityId> {
        let now = self.host.now();
        for id in &self.config.motion_sensors {
            match self.host.get_state(id).await {
                Ok(Some(snapshot)) => {
                    let sensor = SensorSource::from_snapshot(SensorKind::Motion, snapshot);
                    if sensor.has_dwelled(now) {
                        tracing::debug!(sensor = %id, held = ?sensor.held_for(now), "motion still asserted");
                        return Some(sensor.id);
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(%err, sensor = %id, "sweep could not read motion sensor"),
            }
        }
        None
    }

    async fn first_closed_door(&self) -> Option<EntityId> {
        for id in &self.config.door_sensors {
            match self.host.get_state(id).await {
                Ok(Some(snapshot)) if snapshot.state == EntityState::Off => {
                    tracing::debug!(door = %id, "door closed");
                    return Some(snapshot.entity_id);
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(%err, door = %id, "sweep could not read door"),
            }
        }
        None
    }

    async fn start(&self, cause: &EntityId) -> bool {
        match OccupancyTimerController::new(self.host, self.config)
            .request_start()
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, %cause, "sweep failed to start occupancy timer");
                false
            }
        }
    }
}
