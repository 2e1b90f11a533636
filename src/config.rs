//! System configuration parameters
//!
//! All tunable parameters for the Phasedim controller.  Values are
//! compiled-in defaults; [`SystemConfig::validate`] guards any override.

use serde::{Deserialize, Serialize};

use crate::dimmer::DimmerTiming;
use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Dimmer ---
    /// Zero-cross debounce, firing-delay bounds and gate pulse width.
    pub dimmer: DimmerTiming,

    // --- Modbus climate sensor ---
    /// Fixed slave address of the sensor on the RS-485 bus.
    pub modbus_slave_id: u8,
    /// UART baud rate (8N1).
    pub modbus_baud: u32,
    /// Direction-line settle time before transmitting (milliseconds).
    pub modbus_settle_ms: u32,
    /// Device processing time after the request, before listening (milliseconds).
    pub modbus_post_tx_wait_ms: u32,
    /// Receive window for the response (milliseconds).
    pub modbus_response_timeout_ms: u32,
    /// Check the response CRC before decoding.
    pub modbus_verify_crc: bool,
    /// Input register holding temperature (signed, 0.1 °C).
    pub temperature_register: u16,
    /// Input register holding relative humidity (0.1 %RH).
    pub humidity_register: u16,

    // --- Timing ---
    /// Brightness recompute interval (milliseconds)
    pub brightness_interval_ms: u32,
    /// Climate sensor poll interval (milliseconds)
    pub sensor_poll_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
    /// Brightness ticks without an accepted zero-cross before mains is reported lost
    pub mains_loss_ticks: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            dimmer: DimmerTiming::NOMINAL_50HZ,

            // Modbus
            modbus_slave_id: 0x01,
            modbus_baud: 9600,
            modbus_settle_ms: 10,
            modbus_post_tx_wait_ms: 200,
            modbus_response_timeout_ms: 500,
            modbus_verify_crc: true,
            temperature_register: 0x0001,
            humidity_register: 0x0002,

            // Timing
            brightness_interval_ms: 200,   // 5 Hz
            sensor_poll_interval_ms: 2000, // 0.5 Hz
            telemetry_interval_secs: 5,
            mains_loss_ticks: 5, // 1 s of silence at 5 Hz
        }
    }
}

impl SystemConfig {
    /// Reject parameter combinations the dimmer or the Modbus link cannot honour.
    pub fn validate(&self) -> Result<()> {
        let t = &self.dimmer;
        if t.min_firing_delay_us >= t.max_firing_delay_us {
            return Err(Error::Config("min firing delay must be below max firing delay"));
        }
        let pulse_end = t.max_firing_delay_us.checked_add(t.gate_pulse_us);
        if pulse_end.is_none_or(|end| end >= t.half_cycle_us) {
            return Err(Error::Config("firing delay + gate pulse must fit inside one half-cycle"));
        }
        if t.debounce_us >= t.half_cycle_us {
            return Err(Error::Config("zero-cross debounce must be shorter than a half-cycle"));
        }
        if t.gate_pulse_us == 0 {
            return Err(Error::Config("gate pulse width must be non-zero"));
        }
        if !(1..=247).contains(&self.modbus_slave_id) {
            return Err(Error::Config("modbus slave id must be in 1..=247"));
        }
        if self.modbus_baud == 0 || self.modbus_response_timeout_ms == 0 {
            return Err(Error::Config("modbus baud rate and timeout must be non-zero"));
        }
        if self.brightness_interval_ms == 0
            || self.sensor_poll_interval_ms == 0
            || self.telemetry_interval_secs == 0
        {
            return Err(Error::Config("tick intervals must be non-zero"));
        }
        Ok(())
    }
}
