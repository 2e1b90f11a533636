//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Borrows the shared [`DimmerBank`] and owns the light and climate
//! sensors, exposing them through [`BrightnessSource`], [`DimmerPort`] and
//! [`ClimatePort`].  On non-espidf targets, the light sensor reads its
//! simulation atomic and the climate sensor runs over whatever transport
//! it was built with.

use crate::app::ports::{BrightnessSource, ClimatePort, DimmerPort};
use crate::dimmer::DimmerBank;
use crate::modbus::HalfDuplex;
use crate::sensors::climate::{ClimateReading, ClimateSensor};
use crate::sensors::light::{LightReading, LightSensor};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<'a, T, const N: usize> {
    dimmers: &'a DimmerBank<N>,
    light: LightSensor,
    climate: ClimateSensor<T>,
}

impl<'a, T: HalfDuplex, const N: usize> HardwareAdapter<'a, T, N> {
    pub fn new(dimmers: &'a DimmerBank<N>, light: LightSensor, climate: ClimateSensor<T>) -> Self {
        Self {
            dimmers,
            light,
            climate,
        }
    }

    pub fn dimmers(&self) -> &DimmerBank<N> {
        self.dimmers
    }

    pub fn climate_mut(&mut self) -> &mut ClimateSensor<T> {
        &mut self.climate
    }
}

// ── BrightnessSource implementation ───────────────────────────

impl<T: HalfDuplex, const N: usize> BrightnessSource for HardwareAdapter<'_, T, N> {
    fn sample_light(&mut self) -> LightReading {
        self.light.read()
    }
}

// ── DimmerPort implementation ─────────────────────────────────

impl<T: HalfDuplex, const N: usize> DimmerPort for HardwareAdapter<'_, T, N> {
    fn channel_count(&self) -> usize {
        N
    }

    fn set_brightness(&self, channel: usize, percent: i32) -> Option<u8> {
        self.dimmers.set_brightness(channel, percent)
    }

    fn brightness(&self, channel: usize) -> Option<u8> {
        self.dimmers.brightness(channel)
    }

    fn zero_cross_count(&self) -> u32 {
        self.dimmers.zero_cross_accepted()
    }
}

// ── ClimatePort implementation ────────────────────────────────

impl<T: HalfDuplex, const N: usize> ClimatePort for HardwareAdapter<'_, T, N> {
    fn read_climate(&mut self) -> ClimateReading {
        self.climate.read()
    }
}
