//! RS-485 temperature / humidity transmitter (SHT20-class, Modbus RTU).
//!
//! Two input registers, each one decimal digit fixed-point.  Temperature is
//! two's complement so sub-zero readings come out negative; humidity is
//! unsigned.

use crate::error::ModbusError;
use crate::modbus::client::{LEGACY_FAILURE, ModbusMaster, VALUE_SCALE};
use crate::modbus::transport::HalfDuplex;

/// Which of the two registers a reading or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimateQuantity {
    Temperature,
    Humidity,
}

impl core::fmt::Display for ClimateQuantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
        })
    }
}

/// Result of one poll; each register succeeds or fails on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: Result<f32, ModbusError>,
    pub humidity_pct: Result<f32, ModbusError>,
}

impl ClimateReading {
    /// Temperature, or `-1.0` for the upload path that only knows the sentinel.
    pub fn temperature_or_sentinel(&self) -> f32 {
        self.temperature_c.unwrap_or(LEGACY_FAILURE)
    }

    /// Humidity, or `-1.0`.
    pub fn humidity_or_sentinel(&self) -> f32 {
        self.humidity_pct.unwrap_or(LEGACY_FAILURE)
    }

    /// Every register that failed, temperature first.
    pub fn failures(&self) -> impl Iterator<Item = (ClimateQuantity, ModbusError)> {
        [
            (ClimateQuantity::Temperature, self.temperature_c.err()),
            (ClimateQuantity::Humidity, self.humidity_pct.err()),
        ]
        .into_iter()
        .filter_map(|(quantity, err)| err.map(|e| (quantity, e)))
    }
}

pub struct ClimateSensor<T> {
    master: ModbusMaster<T>,
    temperature_register: u16,
    humidity_register: u16,
}

impl<T: HalfDuplex> ClimateSensor<T> {
    pub fn new(master: ModbusMaster<T>, temperature_register: u16, humidity_register: u16) -> Self {
        Self {
            master,
            temperature_register,
            humidity_register,
        }
    }

    /// Two sequential register reads; blocks for up to two receive windows.
    pub fn read(&mut self) -> ClimateReading {
        let temperature_c = self
            .master
            .read_raw(self.temperature_register)
            .map(|raw| f32::from(raw as i16) / VALUE_SCALE);
        let humidity_pct = self.master.read_register(self.humidity_register);
        ClimateReading {
            temperature_c,
            humidity_pct,
        }
    }

    pub fn master_mut(&mut self) -> &mut ModbusMaster<T> {
        &mut self.master
    }
}
