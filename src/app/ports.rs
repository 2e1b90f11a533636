//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (light sensor, dimmer bank, Modbus climate sensor, event
//! sinks) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::dimmer::DimmerBank;
use crate::sensors::climate::ClimateReading;
use crate::sensors::light::LightReading;

// ───────────────────────────────────────────────────────────────
// Brightness source (driven adapter: ambient light → domain)
// ───────────────────────────────────────────────────────────────

/// Supplies the automatic brightness target.
pub trait BrightnessSource {
    /// Take one sample and return the smoothed level with its brightness.
    fn sample_light(&mut self) -> LightReading;
}

// ───────────────────────────────────────────────────────────────
// Dimmer port (driven adapter: domain → phase-cut outputs)
// ───────────────────────────────────────────────────────────────

/// Write side of the dimmer.  Methods take `&self`: the bank is shared
/// with interrupt handlers and mutated through atomics.
pub trait DimmerPort {
    fn channel_count(&self) -> usize;

    /// Clamp and apply; `None` if the channel does not exist.
    fn set_brightness(&self, channel: usize, percent: i32) -> Option<u8>;

    fn brightness(&self, channel: usize) -> Option<u8>;

    /// Zero-cross edges accepted since boot (wraps).
    fn zero_cross_count(&self) -> u32;
}

impl<const N: usize> DimmerPort for DimmerBank<N> {
    fn channel_count(&self) -> usize {
        N
    }

    fn set_brightness(&self, channel: usize, percent: i32) -> Option<u8> {
        DimmerBank::set_brightness(self, channel, percent)
    }

    fn brightness(&self, channel: usize) -> Option<u8> {
        DimmerBank::brightness(self, channel)
    }

    fn zero_cross_count(&self) -> u32 {
        self.zero_cross_accepted()
    }
}

// ───────────────────────────────────────────────────────────────
// Climate port (driven adapter: Modbus sensor → domain)
// ───────────────────────────────────────────────────────────────

/// Blocking read of the RS-485 climate sensor.
pub trait ClimatePort {
    fn read_climate(&mut self) -> ClimateReading;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
