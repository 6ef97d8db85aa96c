//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `roomwatch.toml` in the working directory, or the path in
//! `ROOMWATCH_CONFIG`. Every section has a default so the file is optional;
//! without a `[room]` table a small demo room is controlled.

use std::collections::BTreeMap;
use std::time::Duration;

use roomwatch_adapter_virtual::HomeLocation;
use roomwatch_domain::entity::EntityState;
use roomwatch_domain::error::RoomWatchError;
use roomwatch_domain::id::EntityId;
use roomwatch_domain::room::RoomConfig;
use serde::Deserialize;

const DEFAULT_PATH: &str = "roomwatch.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    /// The controlled room. Falls back to [`demo_room`] when absent.
    pub room: Option<RoomConfig>,
    pub simulation: SimulationConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Settings of the simulated host.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Occupancy timer countdown.
    pub timer_duration_secs: u64,
    /// How often due jobs are checked.
    pub tick_secs: u64,
    /// Initial entity states, applied over the room's defaults.
    pub entities: BTreeMap<EntityId, String>,
    /// Scripted state changes replayed after startup.
    pub script: Vec<ScriptStep>,
}

/// One scripted state change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptStep {
    /// Seconds after startup.
    pub after_secs: u64,
    pub entity_id: EntityId,
    pub state: String,
}

impl Config {
    /// Load configuration from `ROOMWATCH_CONFIG` or `roomwatch.toml`
    /// (if present), apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ROOMWATCH_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ROOMWATCH_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.room().validate()?;
        self.simulation.home()?;
        if self.simulation.timer_duration_secs == 0 {
            return Err(ConfigError::Validation(
                "timer_duration_secs must be non-zero".to_string(),
            ));
        }
        if self.simulation.tick_secs == 0 {
            return Err(ConfigError::Validation(
                "tick_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured room, or the demo room.
    #[must_use]
    pub fn room(&self) -> RoomConfig {
        self.room.clone().unwrap_or_else(demo_room)
    }
}

impl SimulationConfig {
    /// # Errors
    ///
    /// Returns a validation error when the coordinates are out of range.
    pub fn home(&self) -> Result<HomeLocation, RoomWatchError> {
        Ok(HomeLocation::new(self.latitude, self.longitude)?)
    }

    #[must_use]
    pub fn timer_duration(&self) -> Duration {
        Duration::from_secs(self.timer_duration_secs)
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    /// Starting state of every entity the room references, with explicit
    /// `entities` entries taking precedence.
    #[must_use]
    pub fn initial_states(&self, room: &RoomConfig) -> BTreeMap<EntityId, EntityState> {
        let mut states = BTreeMap::new();
        let binary = room
            .motion_sensors
            .iter()
            .chain(&room.door_sensors)
            .chain(&room.light_sensors)
            .chain(&room.vibration_sensors)
            .chain(&room.lights)
            .chain(&room.override_switch_id);
        for id in binary {
            states.insert(id.clone(), EntityState::Off);
        }
        for id in &room.power_sensors {
            states.insert(id.clone(), EntityState::from("0"));
        }
        if let Some(weather) = &room.weather_entity_id {
            states.insert(weather.clone(), EntityState::from("sunny"));
        }
        states.insert(room.timer_id.clone(), EntityState::from("idle"));

        for (id, state) in &self.entities {
            states.insert(id.clone(), EntityState::from(state.as_str()));
        }
        states
    }
}

/// One light, one motion sensor, one timer.
#[must_use]
pub fn demo_room() -> RoomConfig {
    RoomConfig {
        name: "demo".to_string(),
        motion_sensors: vec![EntityId::new("binary_sensor.demo_motion")],
        door_sensors: Vec::new(),
        light_sensors: Vec::new(),
        vibration_sensors: Vec::new(),
        power_sensors: Vec::new(),
        timer_id: EntityId::new("timer.demo_occupancy"),
        lights: vec![EntityId::new("light.demo_ceiling")],
        occupied_on_door_open: false,
        occupied_on_door_closed: false,
        always_on: false,
        override_switch_id: None,
        power_threshold: 0.0,
        weather_entity_id: None,
        daylight: roomwatch_domain::daylight::DaylightStrategy::default(),
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "roomwatchd=info,roomwatch_app=info,roomwatch_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latitude: 52.52,
            longitude: 13.405,
            timer_duration_secs: 300,
            tick_secs: 1,
            entities: BTreeMap::new(),
            script: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Room or location rejected by the domain rules.
    #[error("invalid room configuration: {0}")]
    Room(#[from] RoomWatchError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
