//! Per-output channel state shared between the application task and ISRs.
//!
//! ## Single-writer discipline
//!
//! | Field             | Writer                | Readers              |
//! |-------------------|-----------------------|----------------------|
//! | `desired_percent` | application task      | task (telemetry)     |
//! | `firing_delay_us` | application task      | zero-cross ISR       |
//! | `active`          | application task      | zero-cross ISR, timer ISR |
//! | `pulses_fired`    | this channel's timer ISR | task (telemetry)  |
//!
//! Every field is a word-sized atomic, so no read ever tears and no lock is
//! taken in interrupt context.  The delay is published before `active`
//! (release/acquire), so an ISR that sees the channel active also sees a
//! delay at least as new as the one that activated it.  A change landing
//! mid-cycle takes effect on the next half-cycle at the latest.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use super::DimmerTiming;

/// Brightness range accepted from callers after clamping.
pub const MAX_PERCENT: u8 = 100;

pub struct Channel {
    desired_percent: AtomicU8,
    firing_delay_us: AtomicU32,
    active: AtomicBool,
    pulses_fired: AtomicU32,
}

impl Channel {
    pub const fn new() -> Self {
        Self {
            desired_percent: AtomicU8::new(0),
            firing_delay_us: AtomicU32::new(0),
            active: AtomicBool::new(false),
            pulses_fired: AtomicU32::new(0),
        }
    }

    /// Store an already-clamped brightness and its derived firing delay.
    pub(crate) fn apply(&self, percent: u8, timing: &DimmerTiming) {
        self.desired_percent.store(percent, Ordering::Relaxed);
        match firing_delay_for(percent, timing) {
            Some(delay) => {
                self.firing_delay_us.store(delay, Ordering::Relaxed);
                self.active.store(true, Ordering::Release);
            }
            None => {
                self.active.store(false, Ordering::Release);
                self.firing_delay_us
                    .store(timing.max_firing_delay_us, Ordering::Relaxed);
            }
        }
    }

    pub fn desired_percent(&self) -> u8 {
        self.desired_percent.load(Ordering::Relaxed)
    }

    pub fn firing_delay_us(&self) -> u32 {
        self.firing_delay_us.load(Ordering::Relaxed)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn pulses_fired(&self) -> u32 {
        self.pulses_fired.load(Ordering::Relaxed)
    }

    pub(crate) fn record_pulse(&self) {
        let n = self.pulses_fired.load(Ordering::Relaxed);
        self.pulses_fired.store(n.wrapping_add(1), Ordering::Relaxed);
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp an external brightness request to `0..=100`.
pub fn clamp_percent(percent: i32) -> u8 {
    percent.clamp(0, MAX_PERCENT as i32) as u8
}

/// Firing delay for a brightness, or `None` when the channel must stay dark.
///
/// Linear and inverted: 1 % → `max_firing_delay_us`, 100 % → `min_firing_delay_us`,
/// integer arithmetic truncating toward zero.  Inputs above 100 are treated
/// as 100.
pub fn firing_delay_for(percent: u8, timing: &DimmerTiming) -> Option<u32> {
    if percent == 0 {
        return None;
    }
    let percent = percent.min(MAX_PERCENT);
    let delay = map_range(
        i64::from(percent),
        (1, i64::from(MAX_PERCENT)),
        (
            i64::from(timing.max_firing_delay_us),
            i64::from(timing.min_firing_delay_us),
        ),
    );
    Some(delay as u32)
}

fn map_range(x: i64, (in_lo, in_hi): (i64, i64), (out_lo, out_hi): (i64, i64)) -> i64 {
    (x - in_lo) * (out_hi - out_lo) / (in_hi - in_lo) + out_lo
}
