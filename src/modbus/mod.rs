//! Modbus-RTU master read path for a single fixed slave on RS-485.
//!
//! Three layers, each replaceable on its own:
//!
//! | Layer       | Module        | Job                                           |
//! |-------------|---------------|-----------------------------------------------|
//! | codec       | [`crc`], [`frame`] | build request, checksum, validate + decode |
//! | transport   | [`transport`] | direction switching, bounded receive window   |
//! | client      | [`client`]    | one attempt, one decode, typed error          |
//!
//! There is no retry here: a caller that wants backoff wraps the client.

pub mod client;
pub mod crc;
pub mod frame;
pub mod transport;

pub use crate::error::ModbusError;
pub use client::{LEGACY_FAILURE, ModbusMaster};
pub use frame::{ChecksumPolicy, ReadRequest};
pub use transport::{HalfDuplex, MonotonicClock, Rs485Transport, SerialPort, TurnaroundTiming};
