//! Registry port: how the engine tells the host what to deliver.
//!
//! The engine never hands closures to the host. It registers typed
//! [`Subscription`]s and [`Job`]s once at startup; the host then feeds
//! matching state changes to [`RoomController::dispatch`] and runs due
//! jobs through [`RoomController::run_job`].
//!
//! [`RoomController::dispatch`]: crate::room_controller::RoomController::dispatch
//! [`RoomController::run_job`]: crate::room_controller::RoomController::run_job

use std::time::Duration;

use roomwatch_domain::error::RoomWatchError;

use crate::subscription::{Job, Subscription};

/// Ask the host to forward state changes of an entity.
pub trait Subscriber {
    /// # Errors
    ///
    /// Returns an error if the host cannot watch the entity.
    fn subscribe(&self, subscription: &Subscription) -> Result<(), RoomWatchError>;
}

/// Ask the host to run jobs on a clock or astronomical schedule.
pub trait Scheduler {
    /// Run `job` now and then every `interval`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the schedule.
    fn schedule_every(&self, interval: Duration, job: Job) -> Result<(), RoomWatchError>;

    /// Run `job` daily at sunrise shifted by `offset` (may be negative).
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the schedule.
    fn schedule_at_sunrise(&self, offset: chrono::Duration, job: Job)
    -> Result<(), RoomWatchError>;

    /// Run `job` daily at sunset shifted by `offset` (may be negative).
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the schedule.
    fn schedule_at_sunset(&self, offset: chrono::Duration, job: Job) -> Result<(), RoomWatchError>;
}
