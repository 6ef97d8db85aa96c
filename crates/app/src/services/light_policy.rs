//! Light actuation policy: decides whether the room's lights should
//! change and switches each light individually.
//!
//! Both directions are suppressed while the override switch is engaged.
//! Every light's live state is re-read before acting, so a light already in
//! the target state is never commanded again, and a failing light never
//! blocks the rest of the list.

use roomwatch_domain::entity::EntityState;
use roomwatch_domain::id::EntityId;
use roomwatch_domain::room::RoomConfig;

use crate::ports::{Actuation, HostPlatform};
use crate::services::daylight_policy::DaylightPolicy;

/// Whether turning lights on should consult the daylight policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaylightMode {
    /// Only turn on when `always_on` is set or it is dark.
    Respect,
    /// Turn on regardless of daylight (adverse weather, explicit force).
    Ignore,
}

/// Why a whole turn-on/turn-off request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppressed {
    OverrideEngaged,
    NotDark,
}

/// Outcome of one policy invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActuationReport {
    pub actuated: Vec<EntityId>,
    pub failed: Vec<EntityId>,
    pub suppressed: Option<Suppressed>,
}

impl ActuationReport {
    fn suppressed(reason: Suppressed) -> Self {
        Self {
            suppressed: Some(reason),
            ..Self::default()
        }
    }
}

pub struct LightActuationPolicy<'a, H> {
    host: &'a H,
    config: &'a RoomConfig,
}

impl<'a, H: HostPlatform> LightActuationPolicy<'a, H> {
    pub fn new(host: &'a H, config: &'a RoomConfig) -> Self {
        Self { host, config }
    }

    /// Turn on every light that is currently off, subject to the override
    /// switch and (in [`DaylightMode::Respect`]) the daylight policy.
    pub async fn turn_on(&self, mode: DaylightMode) -> ActuationReport {
        if self.override_engaged().await {
            tracing::debug!(room = %self.config.name, "override engaged, not turning lights on");
            return ActuationReport::suppressed(Suppressed::OverrideEngaged);
        }
        if mode == DaylightMode::Respect && !self.config.always_on && !self.daylight().is_dark() {
            tracing::debug!(room = %self.config.name, "not dark, not turning lights on");
            return ActuationReport::suppressed(Suppressed::NotDark);
        }
        self.apply(Actuation::On).await
    }

    /// Turn off every light that is currently on, unless the override is engaged.
    pub async fn turn_off(&self) -> ActuationReport {
        if self.override_engaged().await {
            tracing::debug!(room = %self.config.name, "override engaged, not turning lights off");
            return ActuationReport::suppressed(Suppressed::OverrideEngaged);
        }
        self.apply(Actuation::Off).await
    }

    /// The override counts as engaged unless the switch positively reads `off`.
    ///
    /// No configured switch means no override.
    pub async fn override_engaged(&self) -> bool {
        let Some(switch) = &self.config.override_switch_id else {
            return false;
        };
        match self.host.get_state(switch).await {
            Ok(Some(snapshot)) => snapshot.state != EntityState::Off,
            Ok(None) => {
                tracing::warn!(%switch, "override switch has no state, treating as engaged");
                true
            }
            Err(err) => {
                tracing::warn!(%err, %switch, "override switch unreadable, treating as engaged");
                true
            }
        }
    }

    fn daylight(&self) -> DaylightPolicy<'a, H> {
        DaylightPolicy::new(self.host, self.config.daylight)
    }

    async fn apply(&self, target: Actuation) -> ActuationReport {
        let mut report = ActuationReport::default();
        let from = match target {
            Actuation::On => EntityState::Off,
            Actuation::Off => EntityState::On,
        };

        for light in &self.config.lights {
            match self.host.get_state(light).await {
                Ok(Some(snapshot)) if snapshot.state == from => {}
                Ok(Some(snapshot)) => {
                    tracing::debug!(%light, state = %snapshot.state, "light skipped");
                    continue;
                }
                Ok(None) => {
                    tracing::debug!(%light, "light has no state, skipped");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(%err, %light, "failed to read light state");
                    report.failed.push(light.clone());
                    continue;
                }
            }

            match self.host.set_actuator(light, target).await {
                Ok(()) => {
                    tracing::info!(%light, command = %target, "light actuated");
                    report.actuated.push(light.clone());
                }
                Err(err) => {
                    tracing::warn!(%err, %light, command = %target, "failed to actuate light");
                    report.failed.push(light.clone());
                }
            }
        }
        report
    }
}
