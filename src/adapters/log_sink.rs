//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! An upload adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={:.1}\u{00b0}C | RH={:.1}% | light={} | dim={:?} | mains={} | zc={} | tick={}",
                    t.temperature_or_sentinel(),
                    t.humidity_or_sentinel(),
                    t.light_level.unwrap_or(0),
                    t.channels.as_slice(),
                    if t.mains_present { "OK" } else { "LOST" },
                    t.zero_cross_edges,
                    t.tick_count,
                );
            }
            AppEvent::BrightnessChanged { channel, percent } => {
                info!("DIM   | ch{} -> {}%", channel, percent);
            }
            AppEvent::SensorReadFailed { quantity, error } => {
                warn!("MODBUS| {}: {}", quantity, error);
            }
            AppEvent::MainsLost => {
                warn!("MAINS | zero-cross lost");
            }
            AppEvent::MainsRestored => {
                info!("MAINS | zero-cross restored");
            }
            AppEvent::Started { channels } => {
                info!("START | channels={}", channels);
            }
        }
    }
}
