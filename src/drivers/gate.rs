//! Triac gate output.
//!
//! A thin `embedded-hal` [`OutputPin`] over a raw GPIO number so the pulse
//! emitter can drive the gate from interrupt context without owning an
//! esp-idf-hal `PinDriver`.  The pin must already be configured as an
//! output by [`hw_init::init_dimmer`](super::hw_init::init_dimmer).

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use super::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePin {
    gpio: i32,
}

impl GatePin {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

impl ErrorType for GatePin {
    type Error = Infallible;
}

impl OutputPin for GatePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true);
        Ok(())
    }
}
