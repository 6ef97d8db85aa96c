//! Daylight policy: evaluates the room's daylight strategy against live sun data.

use roomwatch_domain::daylight::{DaylightStrategy, SunSnapshot};

use crate::ports::SunClock;

/// Answers "is it dark enough for automatic lighting right now?".
pub struct DaylightPolicy<'a, C> {
    clock: &'a C,
    strategy: DaylightStrategy,
}

impl<'a, C: SunClock> DaylightPolicy<'a, C> {
    pub fn new(clock: &'a C, strategy: DaylightStrategy) -> Self {
        Self { clock, strategy }
    }

    /// Read the host's current astronomical data.
    pub fn snapshot(&self) -> SunSnapshot {
        SunSnapshot {
            now: self.clock.now(),
            sunrise: self.clock.sunrise(),
            sunset: self.clock.sunset(),
            sun_down: self.clock.is_sun_down(),
            elevation: self.clock.sun_elevation(),
        }
    }

    pub fn is_dark(&self) -> bool {
        let sun = self.snapshot();
        let dark = self.strategy.is_dark(&sun);
        tracing::debug!(
            dark,
            now = %sun.now,
            elevation = ?sun.elevation,
            threshold = ?self.strategy.effective_threshold(sun.now),
            "daylight evaluated"
        );
        dark
    }
}
