//! Zero-cross interrupt handler: debounce, then re-arm every active channel.
//!
//! Runs in interrupt context on target.  The platform glue reads the
//! microsecond clock and calls [`ZeroCrossScheduler::on_zero_cross`]; the
//! scheduler itself is clock-agnostic so it can be driven by a software
//! clock in tests.
//!
//! If mains disappears no edge arrives, no timer is re-armed and every lamp
//! goes dark after its last fired half-cycle.  Edges resuming restores
//! normal operation without any reset call.

use super::DimmerBank;

/// "Fire once after N microseconds" capability, one instance per channel.
///
/// Production: a 1 MHz hardware timer with auto-reload disabled.
/// Tests: a software timer driven by a deterministic clock.
pub trait OneShotTimer {
    /// Reset the counter to zero and fire exactly once after `delay_us`.
    /// Re-arming before expiry replaces the pending deadline.
    fn arm_one_shot(&mut self, delay_us: u32);
}

pub struct ZeroCrossScheduler<'a, T, const N: usize> {
    bank: &'a DimmerBank<N>,
    timers: [T; N],
    last_accepted_us: Option<u64>,
}

impl<'a, T: OneShotTimer, const N: usize> ZeroCrossScheduler<'a, T, N> {
    pub fn new(bank: &'a DimmerBank<N>, timers: [T; N]) -> Self {
        Self {
            bank,
            timers,
            last_accepted_us: None,
        }
    }

    /// Handle one rising edge seen at `now_us` (monotonic microseconds).
    ///
    /// The first edge is always accepted; afterwards an edge is accepted only
    /// when more than `debounce_us` has elapsed since the last accepted one.
    /// Rejected edges arm nothing.  Returns whether the edge was accepted.
    pub fn on_zero_cross(&mut self, now_us: u64) -> bool {
        let debounce = u64::from(self.bank.timing().debounce_us);
        let bounced = self
            .last_accepted_us
            .is_some_and(|last| now_us.wrapping_sub(last) <= debounce);
        if bounced {
            self.bank.note_edge(false);
            return false;
        }

        self.last_accepted_us = Some(now_us);
        self.bank.note_edge(true);

        for (channel, timer) in self.bank.channels().iter().zip(self.timers.iter_mut()) {
            if channel.is_active() {
                timer.arm_one_shot(channel.firing_delay_us());
            }
        }
        true
    }

    /// Timestamp of the last accepted edge.
    pub fn last_accepted_us(&self) -> Option<u64> {
        self.last_accepted_us
    }

    pub fn timers(&self) -> &[T; N] {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut [T; N] {
        &mut self.timers
    }
}
