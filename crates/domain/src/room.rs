//! Room configuration: the immutable description of one controlled room.
//!
//! Built once at startup (from a config file or the [`RoomConfigBuilder`])
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::daylight::DaylightStrategy;
use crate::error::{RoomWatchError, ValidationError};
use crate::id::EntityId;
use crate::sensor::SensorKind;

/// Everything the controller needs to know about one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub motion_sensors: Vec<EntityId>,
    #[serde(default)]
    pub door_sensors: Vec<EntityId>,
    #[serde(default)]
    pub light_sensors: Vec<EntityId>,
    #[serde(default)]
    pub vibration_sensors: Vec<EntityId>,
    #[serde(default)]
    pub power_sensors: Vec<EntityId>,
    pub timer_id: EntityId,
    pub lights: Vec<EntityId>,
    /// An opening door means someone entered.
    #[serde(default)]
    pub occupied_on_door_open: bool,
    /// A closed door means someone is inside.
    #[serde(default)]
    pub occupied_on_door_closed: bool,
    /// Skip the daylight check when occupancy turns lights on.
    #[serde(default)]
    pub always_on: bool,
    #[serde(default)]
    pub override_switch_id: Option<EntityId>,
    #[serde(default)]
    pub power_threshold: f64,
    #[serde(default)]
    pub weather_entity_id: Option<EntityId>,
    #[serde(default)]
    pub daylight: DaylightStrategy,
}

fn default_name() -> String {
    "room".to_string()
}

impl RoomConfig {
    /// Create a builder for constructing a [`RoomConfig`].
    #[must_use]
    pub fn builder() -> RoomConfigBuilder {
        RoomConfigBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RoomWatchError::Validation`] when:
    /// - `timer_id` is empty ([`ValidationError::MissingTimer`])
    /// - `lights` is empty ([`ValidationError::NoLights`])
    /// - any entity id is malformed ([`ValidationError::MalformedEntityId`])
    /// - `power_threshold` is negative or not finite
    /// - the daylight strategy parameters are out of range
    pub fn validate(&self) -> Result<(), RoomWatchError> {
        if self.timer_id.as_str().is_empty() {
            return Err(ValidationError::MissingTimer.into());
        }
        if self.lights.is_empty() {
            return Err(ValidationError::NoLights.into());
        }
        if let Some(bad) = self.all_entity_ids().find(|id| !id.is_well_formed()) {
            return Err(ValidationError::MalformedEntityId(bad.to_string()).into());
        }
        if !self.power_threshold.is_finite() || self.power_threshold < 0.0 {
            return Err(ValidationError::InvalidPowerThreshold(self.power_threshold).into());
        }
        self.daylight.validate()?;
        Ok(())
    }

    /// Sensors configured for a given kind.
    ///
    /// Light-kind sources include both the controlled lights and any extra
    /// `light_sensors`, since a light switched on by hand signals presence.
    #[must_use]
    pub fn sensors(&self, kind: SensorKind) -> Vec<&EntityId> {
        match kind {
            SensorKind::Motion => self.motion_sensors.iter().collect(),
            SensorKind::Door => self.door_sensors.iter().collect(),
            SensorKind::Vibration => self.vibration_sensors.iter().collect(),
            SensorKind::Power => self.power_sensors.iter().collect(),
            SensorKind::Light => {
                let mut ids: Vec<&EntityId> = self.lights.iter().collect();
                for id in &self.light_sensors {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                ids
            }
        }
    }

    fn all_entity_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.motion_sensors
            .iter()
            .chain(&self.door_sensors)
            .chain(&self.light_sensors)
            .chain(&self.vibration_sensors)
            .chain(&self.power_sensors)
            .chain(&self.lights)
            .chain(std::iter::once(&self.timer_id))
            .chain(&self.override_switch_id)
            .chain(&self.weather_entity_id)
    }
}

/// Step-by-step builder for [`RoomConfig`].
#[derive(Debug, Default)]
pub struct RoomConfigBuilder {
    name: Option<String>,
    motion_sensors: Vec<EntityId>,
    door_sensors: Vec<EntityId>,
    light_sensors: Vec<EntityId>,
    vibration_sensors: Vec<EntityId>,
    power_sensors: Vec<EntityId>,
    timer_id: Option<EntityId>,
    lights: Vec<EntityId>,
    occupied_on_door_open: bool,
    occupied_on_door_closed: bool,
    always_on: bool,
    override_switch_id: Option<EntityId>,
    power_threshold: f64,
    weather_entity_id: Option<EntityId>,
    daylight: Option<DaylightStrategy>,
}

impl RoomConfigBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn motion_sensor(mut self, id: impl Into<EntityId>) -> Self {
        self.motion_sensors.push(id.into());
        self
    }

    #[must_use]
    pub fn door_sensor(mut self, id: impl Into<EntityId>) -> Self {
        self.door_sensors.push(id.into());
        self
    }

    #[must_use]
    pub fn light_sensor(mut self, id: impl Into<EntityId>) -> Self {
        self.light_sensors.push(id.into());
        self
    }

    #[must_use]
    pub fn vibration_sensor(mut self, id: impl Into<EntityId>) -> Self {
        self.vibration_sensors.push(id.into());
        self
    }

    #[must_use]
    pub fn power_sensor(mut self, id: impl Into<EntityId>) -> Self {
        self.power_sensors.push(id.into());
        self
    }

    #[must_use]
    pub fn timer(mut self, id: impl Into<EntityId>) -> Self {
        self.timer_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn light(mut self, id: impl Into<EntityId>) -> Self {
        self.lights.push(id.into());
        self
    }

    #[must_use]
    pub fn occupied_on_door_open(mut self, enabled: bool) -> Self {
        self.occupied_on_door_open = enabled;
        self
    }

    #[must_use]
    pub fn occupied_on_door_closed(mut self, enabled: bool) -> Self {
        self.occupied_on_door_closed = enabled;
        self
    }

    #[must_use]
    pub fn always_on(mut self, enabled: bool) -> Self {
        self.always_on = enabled;
        self
    }

    #[must_use]
    pub fn override_switch(mut self, id: impl Into<EntityId>) -> Self {
        self.override_switch_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn power_threshold(mut self, watts: f64) -> Self {
        self.power_threshold = watts;
        self
    }

    #[must_use]
    pub fn weather_entity(mut self, id: impl Into<EntityId>) -> Self {
        self.weather_entity_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn daylight(mut self, strategy: DaylightStrategy) -> Self {
        self.daylight = Some(strategy);
        self
    }

    /// Consume the builder, validate, and return a [`RoomConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RoomWatchError::Validation`] if required fields are missing or invalid.
    pub fn build(self) -> Result<RoomConfig, RoomWatchError> {
        let config = RoomConfig {
            name: self.name.unwrap_or_else(default_name),
            motion_sensors: self.motion_sensors,
            door_sensors: self.door_sensors,
            light_sensors: self.light_sensors,
            vibration_sensors: self.vibration_sensors,
            power_sensors: self.power_sensors,
            timer_id: self.timer_id.unwrap_or_else(|| EntityId::new("")),
            lights: self.lights,
            occupied_on_door_open: self.occupied_on_door_open,
            occupied_on_door_closed: self.occupied_on_door_closed,
            always_on: self.always_on,
            override_switch_id: self.override_switch_id,
            power_threshold: self.power_threshold,
            weather_entity_id: self.weather_entity_id,
            daylight: self.daylight.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> RoomConfigBuilder {
        RoomConfig::builder()
            .timer("timer.office")
            .light("light.office_ceiling")
    }

    #[test]
    fn should_build_when_timer_and_light_present() {
        let config = minimal().build().unwrap();
        assert_eq!(config.name, "room");
        assert_eq!(config.daylight, DaylightStrategy::default());
        assert!(!config.always_on);
    }

    #[test]
    fn should_reject_missing_timer() {
        let result = RoomConfig::builder().light("light.a").build();
        assert!(matches!(
            result,
            Err(RoomWatchError::Validation(ValidationError::MissingTimer))
        ));
    }

    #[test]
    fn should_reject_empty_light_list() {
        let result = RoomConfig::builder().timer("timer.office").build();
        assert!(matches!(
            result,
            Err(RoomWatchError::Validation(ValidationError::NoLights))
        ));
    }

    #[test]
    fn should_reject_malformed_sensor_id() {
        let result = minimal().motion_sensor("motion").build();
        assert!(matches!(
            result,
            Err(RoomWatchError::Validation(ValidationError::MalformedEntityId(ref id))) if id == "motion"
        ));
    }

    #[test]
    fn should_reject_negative_power_threshold() {
        let result = minimal().power_threshold(-1.0).build();
        assert!(matches!(
            result,
            Err(RoomWatchError::Validation(ValidationError::InvalidPowerThreshold(_)))
        ));
    }

    #[test]
    fn should_allow_both_door_flags_together() {
        let config = minimal()
            .door_sensor("binary_sensor.office_door")
            .occupied_on_door_open(true)
            .occupied_on_door_closed(true)
            .build()
            .unwrap();
        assert!(config.occupied_on_door_open);
        assert!(config.occupied_on_door_closed);
    }

    #[test]
    fn should_merge_lights_and_light_sensors_without_duplicates() {
        let config = minimal()
            .light("light.desk")
            .light_sensor("light.desk")
            .light_sensor("light.floor_lamp")
            .build()
            .unwrap();
        let ids: Vec<&str> = config
            .sensors(SensorKind::Light)
            .into_iter()
            .map(EntityId::as_str)
            .collect();
        assert_eq!(
            ids,
            vec!["light.office_ceiling", "light.desk", "light.floor_lamp"]
        );
    }

    #[test]
    fn should_deserialize_from_toml_with_defaults() {
        let config: RoomConfig = toml::from_str(
            "
            timer_id = 'timer.office'
            lights = ['light.office_ceiling']
            motion_sensors = ['binary_sensor.office_motion']
            ",
        )
        .unwrap();
        assert_eq!(config.motion_sensors.len(), 1);
        assert_eq!(config.daylight, DaylightStrategy::default());
        assert!(config.override_switch_id.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_deserialize_elevation_daylight_table() {
        let config: RoomConfig = toml::from_str(
            "
            timer_id = 'timer.office'
            lights = ['light.office_ceiling']

            [daylight]
            strategy = 'elevation'
            sun_elevation_threshold = 2.0
            home_latitude = 52.5
            home_longitude = 13.4
            ",
        )
        .unwrap();
        assert!(matches!(config.daylight, DaylightStrategy::Elevation { .. }));
    }
}
