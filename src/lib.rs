//! Phasedim firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod dimmer;
pub mod error;
pub mod events;
pub mod modbus;
pub mod pins;

// Hardware-facing modules; the ESP-IDF implementations are cfg-guarded
// inside, host builds get simulation stubs.
pub mod adapters;
pub mod drivers;
pub mod sensors;
