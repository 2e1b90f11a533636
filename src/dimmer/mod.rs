//! Zero-cross synchronised phase-cut dimmer.
//!
//! ```text
//!  app task ──set_brightness──▶ ┌─────────────┐
//!                               │ DimmerBank  │ (atomics, single writer per field)
//!  zero-cross ISR ──────────────│  Channel[N] │◀──── timer-expiry ISR (per channel)
//!   ZeroCrossScheduler          └─────────────┘       TriacPulseEmitter
//!   (debounce, re-arm timers)                         (10 µs gate pulse)
//! ```
//!
//! The bank lives in a `static` on target so interrupt handlers can reach
//! it; the scheduler and the emitters borrow it instead of touching any
//! free-standing globals.  Nothing here allocates, blocks, or logs.

pub mod channel;
pub mod pulse;
pub mod zero_cross;

use core::convert::Infallible;
use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use serde::{Deserialize, Serialize};

pub use channel::{Channel, clamp_percent, firing_delay_for};
pub use pulse::TriacPulseEmitter;
pub use zero_cross::{OneShotTimer, ZeroCrossScheduler};

/// Timing envelope for one mains half-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimmerTiming {
    /// Minimum gap between two accepted zero-cross edges.
    pub debounce_us: u32,
    /// Firing delay at 100 % (largest conduction angle).
    pub min_firing_delay_us: u32,
    /// Firing delay at 1 % (smallest conduction angle).
    pub max_firing_delay_us: u32,
    /// Triac gate pulse width.
    pub gate_pulse_us: u32,
    /// Nominal half-cycle period. Not measured at runtime.
    pub half_cycle_us: u32,
}

impl DimmerTiming {
    /// 50 Hz mains: 10 ms half-cycle.
    pub const NOMINAL_50HZ: Self = Self {
        debounce_us: 8500,
        min_firing_delay_us: 500,
        max_firing_delay_us: 8600,
        gate_pulse_us: 10,
        half_cycle_us: 10_000,
    };
}

impl Default for DimmerTiming {
    fn default() -> Self {
        Self::NOMINAL_50HZ
    }
}

/// Owned collection of dimmer channels, indexed by channel id (0-based).
pub struct DimmerBank<const N: usize> {
    channels: [Channel; N],
    timing: DimmerTiming,
    /// Written only by the zero-cross handler.
    edges_accepted: AtomicU32,
    /// Written only by the zero-cross handler.
    edges_rejected: AtomicU32,
}

impl<const N: usize> DimmerBank<N> {
    /// All channels start inactive (gate never asserted).
    pub const fn new(timing: DimmerTiming) -> Self {
        Self {
            channels: [const { Channel::new() }; N],
            timing,
            edges_accepted: AtomicU32::new(0),
            edges_rejected: AtomicU32::new(0),
        }
    }

    /// Set a channel's brightness in percent.
    ///
    /// `percent` is clamped to `0..=100`; `0` turns the channel off as of the
    /// next half-cycle.  Returns the value actually applied, or `None` if
    /// `channel` does not exist (the call is then ignored).
    pub fn set_brightness(&self, channel: usize, percent: i32) -> Option<u8> {
        let ch = self.channels.get(channel)?;
        let percent = clamp_percent(percent);
        ch.apply(percent, &self.timing);
        Some(percent)
    }

    /// Last commanded brightness of `channel`.
    pub fn brightness(&self, channel: usize) -> Option<u8> {
        self.channels.get(channel).map(Channel::desired_percent)
    }

    pub fn firing_delay_us(&self, channel: usize) -> Option<u32> {
        self.channels.get(channel).map(Channel::firing_delay_us)
    }

    pub fn is_active(&self, channel: usize) -> bool {
        self.channels.get(channel).is_some_and(Channel::is_active)
    }

    /// Gate pulses emitted on `channel` since boot.
    pub fn pulses_fired(&self, channel: usize) -> Option<u32> {
        self.channels.get(channel).map(Channel::pulses_fired)
    }

    pub fn channel(&self, channel: usize) -> Option<&Channel> {
        self.channels.get(channel)
    }

    pub fn channels(&self) -> &[Channel; N] {
        &self.channels
    }

    pub const fn channel_count(&self) -> usize {
        N
    }

    pub fn timing(&self) -> &DimmerTiming {
        &self.timing
    }

    /// Zero-cross edges that passed the debounce filter.
    pub fn zero_cross_accepted(&self) -> u32 {
        self.edges_accepted.load(Ordering::Relaxed)
    }

    /// Zero-cross edges dropped as ringing.
    pub fn zero_cross_rejected(&self) -> u32 {
        self.edges_rejected.load(Ordering::Relaxed)
    }

    /// Build the zero-cross scheduler for this bank, one timer per channel.
    pub fn scheduler<T: OneShotTimer>(&self, timers: [T; N]) -> ZeroCrossScheduler<'_, T, N> {
        ZeroCrossScheduler::new(self, timers)
    }

    /// Build the timer-expiry handler for one channel.
    pub fn emitter<P: OutputPin<Error = Infallible>, D: DelayNs>(
        &self,
        channel: usize,
        gate: P,
        delay: D,
    ) -> Option<TriacPulseEmitter<'_, P, D>> {
        let ch = self.channels.get(channel)?;
        Some(TriacPulseEmitter::new(ch, gate, delay, self.timing.gate_pulse_us))
    }

    pub(crate) fn note_edge(&self, accepted: bool) {
        let counter = if accepted {
            &self.edges_accepted
        } else {
            &self.edges_rejected
        };
        counter.store(counter.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
    }
}
