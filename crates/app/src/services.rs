//! Decision components: one per concern of the room engine.
//!
//! Every component borrows the host and the room configuration for the
//! duration of a single decision and keeps no state between calls.

pub mod daylight_policy;
pub mod light_policy;
pub mod occupancy_aggregator;
pub mod sweep_reconciler;
pub mod timer_controller;
pub mod weather_override;
