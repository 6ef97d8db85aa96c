//! Daylight rules: "is it dark enough to want the lights on?".
//!
//! Two strategies are available and one is fixed per room at startup:
//!
//! - [`DaylightStrategy::Window`]: dark between today's sunset and
//!   sunrise, each shifted by its own offset. The window is tested on a
//!   24-hour circle so it wraps across midnight.
//! - [`DaylightStrategy::Elevation`]: dark while the sun is below a
//!   threshold angle, raised in spring, autumn and winter (see
//!   [`Season::elevation_adjustment`]).
//!
//! Both read a [`SunSnapshot`] taken from the host and have no side effects.

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::season::Season;
use crate::time::{Timestamp, in_daily_window, seconds_of_day};

pub const DEFAULT_SUNRISE_OFFSET_MINUTES: i64 = 30;
pub const DEFAULT_SUNSET_OFFSET_MINUTES: i64 = -30;
/// Sunrise and sunset offsets may shift the event by at most one day.
pub const MAX_OFFSET_MINUTES: i64 = 24 * 60;

/// Astronomical facts read from the host at decision time.
///
/// Any field may be missing when the host cannot provide it; a missing
/// input makes the room count as "not dark", except that the window
/// strategy still honours `sun_down` when there are no sun times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunSnapshot {
    pub now: Timestamp,
    pub sunrise: Option<Timestamp>,
    pub sunset: Option<Timestamp>,
    pub sun_down: Option<bool>,
    pub elevation: Option<f64>,
}

/// How darkness is decided for a room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DaylightStrategy {
    Window {
        #[serde(default = "default_sunrise_offset")]
        sunrise_offset_minutes: i64,
        #[serde(default = "default_sunset_offset")]
        sunset_offset_minutes: i64,
    },
    Elevation {
        #[serde(rename = "sun_elevation_threshold")]
        threshold_degrees: f64,
        home_latitude: f64,
        home_longitude: f64,
    },
}

fn default_sunrise_offset() -> i64 {
    DEFAULT_SUNRISE_OFFSET_MINUTES
}

fn default_sunset_offset() -> i64 {
    DEFAULT_SUNSET_OFFSET_MINUTES
}

impl Default for DaylightStrategy {
    fn default() -> Self {
        Self::Window {
            sunrise_offset_minutes: DEFAULT_SUNRISE_OFFSET_MINUTES,
            sunset_offset_minutes: DEFAULT_SUNSET_OFFSET_MINUTES,
        }
    }
}

impl DaylightStrategy {
    /// Check the numeric ranges of the strategy parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a sun offset exceeds one day, or
    /// the elevation threshold, latitude or longitude is out of range or not
    /// a number.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::Window {
                sunrise_offset_minutes,
                sunset_offset_minutes,
            } => {
                for offset in [sunrise_offset_minutes, sunset_offset_minutes] {
                    if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&offset) {
                        return Err(ValidationError::OffsetOutOfRange(offset));
                    }
                }
                Ok(())
            }
            Self::Elevation {
                threshold_degrees,
                home_latitude,
                home_longitude,
            } => {
                if !(-90.0..=90.0).contains(&threshold_degrees) {
                    return Err(ValidationError::ElevationOutOfRange(threshold_degrees));
                }
                if !(-90.0..=90.0).contains(&home_latitude) {
                    return Err(ValidationError::LatitudeOutOfRange(home_latitude));
                }
                if !(-180.0..=180.0).contains(&home_longitude) {
                    return Err(ValidationError::LongitudeOutOfRange(home_longitude));
                }
                Ok(())
            }
        }
    }

    /// Whether it is dark enough for automatic lighting.
    #[must_use]
    pub fn is_dark(&self, sun: &SunSnapshot) -> bool {
        match *self {
            Self::Window {
                sunrise_offset_minutes,
                sunset_offset_minutes,
            } => window_is_dark(sun, sunrise_offset_minutes, sunset_offset_minutes),
            Self::Elevation { .. } => match (sun.elevation, self.effective_threshold(sun.now)) {
                (Some(elevation), Some(threshold)) => elevation < threshold,
                _ => false,
            },
        }
    }

    /// Threshold after seasonal adjustment; `None` for the window strategy.
    #[must_use]
    pub fn effective_threshold(&self, now: Timestamp) -> Option<f64> {
        match *self {
            Self::Window { .. } => None,
            Self::Elevation {
                threshold_degrees,
                home_latitude,
                ..
            } => {
                let season = Season::at(home_latitude, now.month());
                Some(threshold_degrees + season.elevation_adjustment())
            }
        }
    }
}

/// `at` shifted by `minutes`, or `None` when either overflows.
#[must_use]
pub fn offset_by_minutes(at: Timestamp, minutes: i64) -> Option<Timestamp> {
    at.checked_add_signed(Duration::try_minutes(minutes)?)
}

fn window_is_dark(sun: &SunSnapshot, sunrise_offset: i64, sunset_offset: i64) -> bool {
    let (Some(sunrise), Some(sunset)) = (sun.sunrise, sun.sunset) else {
        // Polar night: no sun times, but the host may still report the sun down.
        return sun.sun_down == Some(true) && sunset_offset <= 0;
    };
    let (Some(offset_sunset), Some(offset_sunrise)) = (
        offset_by_minutes(sunset, sunset_offset),
        offset_by_minutes(sunrise, sunrise_offset),
    ) else {
        return false;
    };
    let now = seconds_of_day(sun.now);
    let start = seconds_of_day(offset_sunset);
    let end = seconds_of_day(offset_sunrise);

    if in_daily_window(now, start, end) {
        return true;
    }

    // A host reporting the sun as down already places us past any
    // sunset offset <= 0; trust it over the clock right at the boundary.
    if sun.sun_down == Some(true) && sunset_offset <= 0 {
        let before_sunrise_but_past_offset =
            sunrise_offset < 0 && in_daily_window(now, end, seconds_of_day(sunrise));
        return !before_sunrise_but_past_offset;
    }
    false
}
