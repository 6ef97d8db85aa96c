//! Wall clock for the simulated host, either real or manually driven.

use std::sync::Mutex;

use chrono::Duration;
use roomwatch_domain::time::{Timestamp, now};

pub enum SimClock {
    System,
    Manual(Mutex<Timestamp>),
}

impl SimClock {
    #[must_use]
    pub fn manual(start: Timestamp) -> Self {
        Self::Manual(Mutex::new(start))
    }

    pub fn now(&self) -> Timestamp {
        match self {
            Self::System => now(),
            Self::Manual(at) => *lock(at),
        }
    }

    /// Jump a manual clock to `to`. The system clock ignores this.
    pub fn set(&self, to: Timestamp) {
        if let Self::Manual(at) = self {
            *lock(at) = to;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Self::Manual(at) = self {
            let mut at = lock(at);
            *at += by;
        }
    }
}

fn lock(at: &Mutex<Timestamp>) -> std::sync::MutexGuard<'_, Timestamp> {
    at.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
