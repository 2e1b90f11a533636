//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use heapless::Vec;
use serde::Serialize;

use crate::error::ModbusError;
use crate::modbus::LEGACY_FAILURE;
use crate::sensors::climate::ClimateQuantity;

/// Upper bound on dimmer channels the application layer tracks.
pub const MAX_CHANNELS: usize = 4;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started.
    Started { channels: usize },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// A channel's applied brightness changed.
    BrightnessChanged { channel: usize, percent: u8 },

    /// One climate register could not be read.
    SensorReadFailed {
        quantity: ClimateQuantity,
        error: ModbusError,
    },

    /// Zero-cross edges stopped arriving.
    MainsLost,

    /// Zero-cross edges are back after a loss.
    MainsRestored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelTelemetry {
    /// Brightness last applied to the dimmer.
    pub percent: u8,
    /// `false` while a manual override is in force.
    pub auto: bool,
}

/// A point-in-time telemetry snapshot suitable for logging or upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    /// `None` until a read succeeds, and after a failed one.
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    /// Smoothed light sensor level (0–4095), `None` before the first sample.
    pub light_level: Option<u16>,
    pub channels: Vec<ChannelTelemetry, MAX_CHANNELS>,
    pub mains_present: bool,
    /// Accepted zero-cross edges since boot.
    pub zero_cross_edges: u32,
    /// Brightness ticks since start.
    pub tick_count: u64,
}

impl TelemetryData {
    /// Temperature with failures collapsed to `-1.0`, as the upload path expects.
    pub fn temperature_or_sentinel(&self) -> f32 {
        self.temperature_c.unwrap_or(LEGACY_FAILURE)
    }

    pub fn humidity_or_sentinel(&self) -> f32 {
        self.humidity_pct.unwrap_or(LEGACY_FAILURE)
    }
}
