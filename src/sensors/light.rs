//! MDL-07 ambient light sensor → automatic lamp brightness.
//!
//! Reads the analog output through an ESP32-S3 ADC channel, keeps a
//! 10-sample moving average to stop the lamps flickering, and maps the
//! smoothed level inversely onto 0–100 %: a dark room gets full brightness,
//! a bright room turns the lamps off.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH4 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_LIGHT_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light_adc(raw: u16) {
    SIM_LIGHT_ADC.store(raw, Ordering::Relaxed);
}

const RING_BUF_CAP: usize = 10;
/// Full scale of the 12-bit ADC.
pub const ADC_MAX: u16 = 4095;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightReading {
    pub raw: u16,
    /// Moving average over the last 10 samples (fewer right after boot).
    pub level: u16,
    /// Brightness the lamps should run at for this ambient level.
    pub brightness: u8,
}

pub struct LightSensor {
    ring: [u16; RING_BUF_CAP],
    head: usize,
    count: usize,
    last_level: u16,
}

impl LightSensor {
    /// Reads ADC1 channel [`ADC1_CH_LIGHT`](crate::drivers::hw_init::ADC1_CH_LIGHT),
    /// configured by `hw_init::init_peripherals`.
    pub fn new() -> Self {
        Self {
            ring: [0; RING_BUF_CAP],
            head: 0,
            count: 0,
            last_level: 0,
        }
    }

    /// Sample the ADC once and return the smoothed reading.
    pub fn read(&mut self) -> LightReading {
        let raw = self.read_adc();
        self.push_sample(raw)
    }

    /// Feed one raw sample into the moving average.
    pub fn push_sample(&mut self, raw: u16) -> LightReading {
        let raw = raw.min(ADC_MAX);
        self.ring[self.head] = raw;
        self.head = (self.head + 1) % RING_BUF_CAP;
        if self.count < RING_BUF_CAP {
            self.count += 1;
        }

        let level = self.running_average();
        self.last_level = level;
        LightReading {
            raw,
            level,
            brightness: level_to_brightness(level),
        }
    }

    /// Smoothed level from the most recent read (0 before the first one).
    pub fn last_level(&self) -> u16 {
        self.last_level
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_LIGHT)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_LIGHT_ADC.load(Ordering::Relaxed)
    }

    fn running_average(&self) -> u16 {
        if self.count == 0 {
            return 0;
        }
        let sum: u32 = self.ring[..self.count].iter().map(|&s| u32::from(s)).sum();
        (sum / self.count as u32) as u16
    }
}

impl Default for LightSensor {
    fn default() -> Self {
        Self::new()
    }
}

/// Dark (0) → 100 %, saturated (4095) → 0 %, linear in between.
pub fn level_to_brightness(level: u16) -> u8 {
    let level = i32::from(level.min(ADC_MAX));
    let pct = 100 - level * 100 / i32::from(ADC_MAX);
    pct.clamp(0, 100) as u8
}
