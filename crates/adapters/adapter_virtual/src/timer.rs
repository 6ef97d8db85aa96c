//! Host-owned occupancy timers.
//!
//! Every start bumps the timer's generation. A pending expiry only fires
//! if its generation is still the latest one, so restarting an active
//! timer pushes its deadline out instead of stacking expiries.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use roomwatch_domain::id::EntityId;

pub struct TimerBank {
    duration: Duration,
    armed: Mutex<HashMap<EntityId, u64>>,
    next_generation: Mutex<u64>,
}

impl TimerBank {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            armed: Mutex::new(HashMap::new()),
            next_generation: Mutex::new(0),
        }
    }

    /// Countdown length applied on every start.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Arm or re-arm `id`. Returns the generation its expiry must present.
    pub fn arm(&self, id: &EntityId) -> u64 {
        let generation = {
            let mut next = lock(&self.next_generation);
            *next += 1;
            *next
        };
        lock(&self.armed).insert(id.clone(), generation);
        generation
    }

    /// Disarm `id` if `generation` is still current.
    pub fn expire(&self, id: &EntityId, generation: u64) -> bool {
        let mut armed = lock(&self.armed);
        if armed.get(id) == Some(&generation) {
            armed.remove(id);
            true
        } else {
            false
        }
    }

    /// Disarm `id` regardless of generation.
    pub fn cancel(&self, id: &EntityId) -> bool {
        lock(&self.armed).remove(id).is_some()
    }

    #[must_use]
    pub fn is_armed(&self, id: &EntityId) -> bool {
        lock(&self.armed).contains_key(id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> TimerBank {
        TimerBank::new(Duration::from_secs(300))
    }

    #[test]
    fn should_expire_when_generation_is_current() {
        let bank = bank();
        let id = EntityId::new("timer.office");
        let generation = bank.arm(&id);
        assert!(bank.expire(&id, generation));
        assert!(!bank.is_armed(&id));
    }

    #[test]
    fn should_ignore_stale_expiry_after_restart() {
        let bank = bank();
        let id = EntityId::new("timer.office");
        let first = bank.arm(&id);
        let second = bank.arm(&id);

        assert!(!bank.expire(&id, first));
        assert!(bank.is_armed(&id));
        assert!(bank.expire(&id, second));
    }

    #[test]
    fn should_cancel_only_armed_timer() {
        let bank = bank();
        let id = EntityId::new("timer.office");
        assert!(!bank.cancel(&id));
        bank.arm(&id);
        assert!(bank.cancel(&id));
    }
}
