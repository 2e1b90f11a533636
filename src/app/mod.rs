//! Application core: pure domain logic, zero I/O.
//!
//! This module holds the business rules of the controller: automatic
//! brightness with per-channel manual override, climate polling, mains
//! supervision and telemetry.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod mains;
pub mod ports;
pub mod service;
