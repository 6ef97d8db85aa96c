//! NOAA sun position and sunrise/sunset for a fixed home location.
//!
//! Julian day, then Julian century, then geometric mean longitude and
//! anomaly, equation of center, apparent longitude, declination and hour
//! angle. Everything is computed in UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use roomwatch_domain::error::ValidationError;
use roomwatch_domain::time::{Timestamp, seconds_of_day};

/// Zenith of the sun's upper limb at rise/set, including refraction.
const HORIZON_ZENITH: f64 = 90.833;

/// Unix epoch as a Julian day.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// J2000.0 as a Julian day.
const J2000_JD: f64 = 2_451_545.0;

/// Where the simulated home is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeLocation {
    latitude: f64,
    longitude: f64,
}

/// Sunrise and sunset on one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: Timestamp,
    pub sunset: Timestamp,
}

impl HomeLocation {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a coordinate is out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Sun elevation in degrees above the horizon at `at`.
    #[must_use]
    pub fn elevation(&self, at: Timestamp) -> f64 {
        let params = SolarParams::at(julian_day(at));
        let minutes = f64::from(seconds_of_day(at)) / 60.0;

        let true_solar_time = minutes + params.eq_time + 4.0 * self.longitude;
        let mut hour_angle = true_solar_time / 4.0 - 180.0;
        if hour_angle < -180.0 {
            hour_angle += 360.0;
        }

        let lat = self.latitude.to_radians();
        let declination = params.declination.to_radians();
        let cos_zenith = (lat.sin() * declination.sin()
            + lat.cos() * declination.cos() * hour_angle.to_radians().cos())
        .clamp(-1.0, 1.0);

        90.0 - cos_zenith.acos().to_degrees()
    }

    /// Whether the sun's upper limb is below the horizon at `at`.
    #[must_use]
    pub fn is_sun_down(&self, at: Timestamp) -> bool {
        self.elevation(at) < 90.0 - HORIZON_ZENITH
    }

    /// Sunrise and sunset of `date`, or `None` during polar day or night.
    ///
    /// Far from the prime meridian either time may fall on the previous or
    /// next UTC day.
    #[must_use]
    pub fn sun_times(&self, date: NaiveDate) -> Option<SunTimes> {
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        let params = SolarParams::at(julian_day(midnight + Duration::hours(12)));

        let lat = self.latitude.to_radians();
        let declination = params.declination.to_radians();
        let cos_hour_angle = HORIZON_ZENITH.to_radians().cos() / (lat.cos() * declination.cos())
            - lat.tan() * declination.tan();
        if !(-1.0..=1.0).contains(&cos_hour_angle) {
            return None;
        }

        let hour_angle = cos_hour_angle.acos().to_degrees();
        let sunrise_min = 720.0 - 4.0 * (self.longitude + hour_angle) - params.eq_time;
        let sunset_min = 720.0 - 4.0 * (self.longitude - hour_angle) - params.eq_time;

        Some(SunTimes {
            sunrise: midnight + minutes(sunrise_min),
            sunset: midnight + minutes(sunset_min),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn minutes(value: f64) -> Duration {
    Duration::seconds((value * 60.0).round() as i64)
}

#[allow(clippy::cast_precision_loss)]
fn julian_day(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 / f64::from(roomwatch_domain::time::SECONDS_PER_DAY) + UNIX_EPOCH_JD
}

/// The parts of the NOAA model both calculations need.
struct SolarParams {
    /// Solar declination, degrees.
    declination: f64,
    /// Equation of time, minutes.
    eq_time: f64,
}

impl SolarParams {
    #[allow(clippy::unreadable_literal)]
    fn at(julian_day: f64) -> Self {
        let jc = (julian_day - J2000_JD) / 36525.0;

        let l0 = (280.46646 + jc * (36000.76983 + 0.0003032 * jc)) % 360.0;
        let m = (357.52911 + jc * (35999.05029 - 0.0001537 * jc)).to_radians();
        let e = 0.016708634 - jc * (0.000042037 + 0.0000001267 * jc);

        let center = m.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
            + (2.0 * m).sin() * (0.019993 - 0.000101 * jc)
            + (3.0 * m).sin() * 0.000289;

        let omega = (125.04 - 1934.136 * jc).to_radians();
        let apparent_lon = (l0 + center - 0.00569 - 0.00478 * omega.sin()).to_radians();

        let obliq_mean =
            23.0 + (26.0 + (21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813))) / 60.0) / 60.0;
        let obliq = (obliq_mean + 0.00256 * omega.cos()).to_radians();

        let declination = (obliq.sin() * apparent_lon.sin()).asin().to_degrees();

        let l0 = l0.to_radians();
        let y = (obliq / 2.0).tan().powi(2);
        let eq_time = 4.0
            * (y * (2.0 * l0).sin() - 2.0 * e * m.sin()
                + 4.0 * e * y * m.sin() * (2.0 * l0).cos()
                - 0.5 * y * y * (4.0 * l0).sin()
                - 1.25 * e * e * (2.0 * m).sin())
            .to_degrees();

        Self {
            declination,
            eq_time,
        }
    }
}
