//! UART adapter for the RS-485 transport.
//!
//! Wraps an esp-idf-hal [`UartDriver`] behind [`SerialPort`]: writes go to
//! the driver's TX ring buffer, `flush` waits for the hardware FIFO to
//! drain, and reads never block.

use esp_idf_hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::modbus::SerialPort;

pub struct UartSerial<'d> {
    driver: UartDriver<'d>,
}

impl<'d> UartSerial<'d> {
    pub fn new(driver: UartDriver<'d>) -> Self {
        Self { driver }
    }
}

impl SerialPort for UartSerial<'_> {
    type Error = EspError;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.driver.write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.driver.wait_tx_done(BLOCK)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut byte = [0u8; 1];
        match self.driver.read(&mut byte, NON_BLOCK)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}
