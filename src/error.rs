//! Unified error types for the Phasedim firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! application task's error handling uniform.  All variants are `Copy` so
//! they can be stored in telemetry snapshots and passed around without
//! allocation.
//!
//! The dimmer subsystem has no error channel: out-of-range brightness is
//! clamped and a missing zero-cross signal simply stops conduction.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A Modbus exchange with the climate sensor failed.
    Modbus(ModbusError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modbus(e) => write!(f, "modbus: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Modbus errors
// ---------------------------------------------------------------------------

/// Why a single register read did not produce a value.
///
/// Legacy callers that only understand the `-1` sentinel can collapse every
/// variant with [`ModbusMaster::read_register_legacy`](crate::modbus::client::ModbusMaster::read_register_legacy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModbusError {
    /// No byte arrived within the receive window.
    Timeout,
    /// Some bytes arrived, but not enough to decode (or to checksum) a frame.
    IncompleteResponse { received: usize },
    /// The function-code byte did not echo the request (exception or garbage).
    UnexpectedFunctionCode { expected: u8, found: u8 },
    /// The byte-count field does not describe one register.
    UnexpectedByteCount { expected: u8, found: u8 },
    /// The response CRC did not match its payload.
    ChecksumInvalid { expected: u16, found: u16 },
    /// The serial port or the direction-control pin reported an error.
    Transport,
}

impl fmt::Display for ModbusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "response timeout"),
            Self::IncompleteResponse { received } => {
                write!(f, "incomplete response ({received} bytes)")
            }
            Self::UnexpectedFunctionCode { expected, found } => write!(
                f,
                "unexpected function code 0x{found:02X} (expected 0x{expected:02X})"
            ),
            Self::UnexpectedByteCount { expected, found } => {
                write!(f, "unexpected byte count {found} (expected {expected})")
            }
            Self::ChecksumInvalid { expected, found } => write!(
                f,
                "CRC mismatch (computed 0x{expected:04X}, received 0x{found:04X})"
            ),
            Self::Transport => write!(f, "serial transport failure"),
        }
    }
}

impl From<ModbusError> for Error {
    fn from(e: ModbusError) -> Self {
        Self::Modbus(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
