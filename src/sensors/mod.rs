//! Sensor drivers feeding the application task.
//!
//! - [`light`]: ambient light → automatic brightness (ADC, moving average)
//! - [`climate`]: temperature / humidity over the Modbus master

pub mod climate;
pub mod light;
