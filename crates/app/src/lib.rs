//! # roomwatch-app
//!
//! Application layer: the occupancy and lighting decision engine and its
//! **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** the host must implement (driven/outbound ports):
//!   - `EntityStates`: read live entity state
//!   - `LightActuator`: switch lights on/off
//!   - `OccupancyTimer`: (re)start the host-owned occupancy timer
//!   - `SunClock`: current time, sunrise/sunset, sun elevation
//!   - `Subscriber` / `Scheduler`: register state subscriptions and jobs
//! - Provide the **decision components** (signal aggregation, sweep,
//!   timer reactions, light actuation, daylight, weather)
//! - Provide the **`RoomController`** driving port the host calls into
//! - Provide **in-process infrastructure** (state-change bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `roomwatch-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod room_controller;
pub mod services;
pub mod subscription;

#[cfg(test)]
mod testing;
