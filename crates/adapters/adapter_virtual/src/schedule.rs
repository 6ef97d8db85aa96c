//! Registered jobs and when each one is next due.

use chrono::Duration;
use roomwatch_app::subscription::{Job, JobSchedule};
use roomwatch_domain::time::Timestamp;

use crate::solar::HomeLocation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub schedule: JobSchedule,
    pub job: Job,
    /// `None` while no sunrise/sunset exists (polar day or night).
    pub next_run: Option<Timestamp>,
}

#[derive(Debug, Default)]
pub struct JobBook {
    entries: Vec<ScheduledJob>,
}

impl JobBook {
    /// Interval jobs run immediately; sun jobs at the next offset event.
    pub fn add(&mut self, schedule: JobSchedule, job: Job, now: Timestamp, home: &HomeLocation) {
        let next_run = match schedule {
            JobSchedule::Every(_) => Some(now),
            JobSchedule::AtSunrise(_) | JobSchedule::AtSunset(_) => {
                next_sun_event(schedule, now, home)
            }
        };
        self.entries.push(ScheduledJob {
            schedule,
            job,
            next_run,
        });
    }

    /// Jobs due at `now`, each at most once, rescheduled past `now`.
    pub fn take_due(&mut self, now: Timestamp, home: &HomeLocation) -> Vec<Job> {
        let mut due = Vec::new();
        for entry in &mut self.entries {
            let Some(next_run) = entry.next_run else {
                entry.next_run = next_sun_event(entry.schedule, now, home);
                continue;
            };
            if next_run > now {
                continue;
            }
            due.push(entry.job);
            entry.next_run = match entry.schedule {
                JobSchedule::Every(interval) => {
                    let step = Duration::from_std(interval).unwrap_or(Duration::MAX);
                    let mut next = next_run.checked_add_signed(step);
                    // Catch up once after a long pause instead of replaying.
                    if next.is_some_and(|n| n <= now) {
                        next = now.checked_add_signed(step);
                    }
                    next
                }
                JobSchedule::AtSunrise(_) | JobSchedule::AtSunset(_) => {
                    next_sun_event(entry.schedule, now, home)
                }
            };
        }
        due
    }

    pub fn entries(&self) -> &[ScheduledJob] {
        &self.entries
    }
}

/// First offset sunrise/sunset strictly after `after`.
fn next_sun_event(schedule: JobSchedule, after: Timestamp, home: &HomeLocation) -> Option<Timestamp> {
    let today = after.date_naive();
    (-1..=2)
        .filter_map(|days| today.checked_add_signed(Duration::days(days)))
        .filter_map(|date| home.sun_times(date))
        .filter_map(|times| match schedule {
            JobSchedule::AtSunrise(offset) => times.sunrise.checked_add_signed(offset),
            JobSchedule::AtSunset(offset) => times.sunset.checked_add_signed(offset),
            JobSchedule::Every(_) => None,
        })
        .filter(|at| *at > after)
        .min()
}
