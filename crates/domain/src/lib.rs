//! # roomwatch-domain
//!
//! Pure domain model for the roomwatch occupancy and lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: entity identifiers, error conventions, timestamps
//! - Define **entity states** as the host reports them (`on`, `off`, `idle`, `rainy`, …)
//! - Define **state changes** delivered by the host
//! - Define **sensors** (motion, door, light, vibration, power) and the occupancy **timer**
//! - Define the **daylight** and **season** rules used to gate automatic lighting
//! - Define **weather** classification and the immutable **room configuration**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod daylight;
pub mod entity;
pub mod event;
pub mod room;
pub mod season;
pub mod sensor;
pub mod timer;
pub mod weather;
