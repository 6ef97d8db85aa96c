//! Time and timestamp helpers.

use chrono::{DateTime, Timelike, Utc};

/// UTC timestamp used for `last_changed`, sunrise/sunset, the current time, etc.
pub type Timestamp = DateTime<Utc>;

/// Seconds in a civil day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Seconds elapsed since UTC midnight for `ts`.
#[must_use]
pub fn seconds_of_day(ts: Timestamp) -> u32 {
    ts.num_seconds_from_midnight()
}

/// Whether `t` lies in the circular window `[start, end)` on a 24h clock.
///
/// A window whose start is later than its end wraps across midnight.
/// An empty window (`start == end`) contains nothing.
#[must_use]
pub fn in_daily_window(t: u32, start: u32, end: u32) -> bool {
    if start <= end {
        start <= t && t < end
    } else {
        t >= start || t < end
    }
}
