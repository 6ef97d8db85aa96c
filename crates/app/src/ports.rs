//! Port definitions: traits that host adapters implement.
//!
//! Ports are the boundaries between the decision engine and the host
//! platform. They are defined here (in `app`) so that both the engine and
//! the adapters can depend on them without creating circular dependencies.

pub mod host;
pub mod registry;

pub use host::{Actuation, EntityStates, HostPlatform, LightActuator, OccupancyTimer, SunClock};
pub use registry::{Scheduler, Subscriber};
