//! Timer-expiry handler: one fixed-width triac gate pulse.
//!
//! A triac latches once triggered and conducts until the next zero crossing,
//! so a short pulse is enough.  The timer is one-shot; only the next accepted
//! zero-cross edge schedules the next pulse.
//!
//! The gate must be an infallible output: a write that could fail would
//! leave the handler choosing between a stuck gate and spinning in the ISR.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::Channel;

pub struct TriacPulseEmitter<'a, P, D> {
    channel: &'a Channel,
    gate: P,
    delay: D,
    pulse_us: u32,
}

impl<'a, P: OutputPin<Error = Infallible>, D: DelayNs> TriacPulseEmitter<'a, P, D> {
    pub fn new(channel: &'a Channel, gate: P, delay: D, pulse_us: u32) -> Self {
        Self {
            channel,
            gate,
            delay,
            pulse_us,
        }
    }

    /// Call when this channel's one-shot timer expires.
    ///
    /// Re-checks `active` so a channel switched off after arming stays dark.
    /// Returns whether a pulse was emitted.
    pub fn on_timer_expired(&mut self) -> bool {
        if !self.channel.is_active() {
            return false;
        }
        let Ok(()) = self.gate.set_high();
        self.delay.delay_us(self.pulse_us);
        let Ok(()) = self.gate.set_low();
        self.channel.record_pulse();
        true
    }

    pub fn channel(&self) -> &Channel {
        self.channel
    }
}
