//! Half-duplex RS-485 byte exchange.
//!
//! One transaction:
//!
//! ```text
//!  DE ─┐ high ┌──────── write + drain ────────┐ low
//!      └──────┤ settle │                      ├─── post-tx wait ─── poll ≤ window ──▶
//! ```
//!
//! The transport never interprets bytes; it returns whatever arrived inside
//! the window (possibly nothing) and leaves classification to the client.
//! Blocking for up to settle + post-tx wait + window: call it from the
//! application task only, never from an interrupt handler.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::debug;

use super::frame::ResponseBuf;
use crate::config::SystemConfig;
use crate::error::ModbusError;

/// Upper bound on stale bytes discarded before a request.
const MAX_STALE_BYTES: usize = 64;

/// Byte-oriented serial port (UART) used by the RS-485 transport.
pub trait SerialPort {
    /// Error type for this port.
    type Error: core::fmt::Debug;

    /// Queue `data` for transmission.  Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Block until every queued byte has physically left the transmitter.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Take one received byte if available.  Never blocks.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Monotonic microsecond clock.
pub trait MonotonicClock {
    fn now_us(&self) -> u64;
}

/// One request out, whatever response bytes arrive in the window back.
pub trait HalfDuplex {
    fn transact(&mut self, request: &[u8], response: &mut ResponseBuf) -> Result<(), ModbusError>;
}

/// Fixed delays of one half-duplex turnaround.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnaroundTiming {
    /// Direction line settle time before the first byte.
    pub settle_ms: u32,
    /// Slave processing time after the last byte, before listening.
    pub post_tx_wait_ms: u32,
    /// Receive window.
    pub response_timeout_ms: u32,
    /// Back-off between empty polls of the receive FIFO.
    pub poll_interval_us: u32,
}

impl TurnaroundTiming {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            settle_ms: config.modbus_settle_ms,
            post_tx_wait_ms: config.modbus_post_tx_wait_ms,
            response_timeout_ms: config.modbus_response_timeout_ms,
            poll_interval_us: 1_000,
        }
    }
}

impl Default for TurnaroundTiming {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

/// RS-485 transceiver: UART plus a DE/RE direction output.
pub struct Rs485Transport<S, P, D, C> {
    serial: S,
    direction: P,
    delay: D,
    clock: C,
    timing: TurnaroundTiming,
}

impl<S, P, D, C> Rs485Transport<S, P, D, C>
where
    S: SerialPort,
    P: OutputPin,
    D: DelayNs,
    C: MonotonicClock,
{
    /// Takes ownership of the direction pin and drives it to receive.
    ///
    /// A pin that refuses is only logged here; the next transaction drives
    /// it again and reports `Transport` if it still fails.
    pub fn new(serial: S, mut direction: P, delay: D, clock: C, timing: TurnaroundTiming) -> Self {
        if let Err(e) = direction.set_low() {
            debug!("rs485: cannot park transceiver in receive mode: {:?}", e);
        }
        Self {
            serial,
            direction,
            delay,
            clock,
            timing,
        }
    }

    pub fn timing(&self) -> &TurnaroundTiming {
        &self.timing
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    fn discard_stale(&mut self) {
        let mut dropped = 0usize;
        while dropped < MAX_STALE_BYTES {
            match self.serial.read_byte() {
                Ok(Some(_)) => dropped += 1,
                Ok(None) | Err(_) => break,
            }
        }
        if dropped > 0 {
            debug!("rs485: discarded {} stale bytes", dropped);
        }
    }

    fn send(&mut self, request: &[u8]) -> Result<(), ModbusError> {
        let mut offset = 0;
        while offset < request.len() {
            match self.serial.write(&request[offset..]) {
                Ok(0) => return Err(ModbusError::Transport),
                Ok(n) => offset += n,
                Err(e) => {
                    debug!("rs485: write failed: {:?}", e);
                    return Err(ModbusError::Transport);
                }
            }
        }
        self.serial.flush().map_err(|e| {
            debug!("rs485: flush failed: {:?}", e);
            ModbusError::Transport
        })
    }

    fn collect(&mut self, response: &mut ResponseBuf) {
        let window_us = u64::from(self.timing.response_timeout_ms) * 1_000;
        let start = self.clock.now_us();

        while self.clock.now_us().wrapping_sub(start) < window_us {
            match self.serial.read_byte() {
                Ok(Some(byte)) => {
                    if response.push(byte).is_err() || response.is_full() {
                        break;
                    }
                }
                Ok(None) => self.delay.delay_us(self.timing.poll_interval_us),
                Err(e) => {
                    // Framing/parity noise: drop the byte, keep listening.
                    debug!("rs485: rx error {:?}", e);
                    self.delay.delay_us(self.timing.poll_interval_us);
                }
            }
        }
    }
}

impl<S, P, D, C> HalfDuplex for Rs485Transport<S, P, D, C>
where
    S: SerialPort,
    P: OutputPin,
    D: DelayNs,
    C: MonotonicClock,
{
    fn transact(&mut self, request: &[u8], response: &mut ResponseBuf) -> Result<(), ModbusError> {
        response.clear();
        self.discard_stale();

        self.direction.set_high().map_err(|_| ModbusError::Transport)?;
        self.delay.delay_ms(self.timing.settle_ms);

        let sent = self.send(request);
        // Release the bus even when the write failed.
        let released = self.direction.set_low();
        sent?;
        released.map_err(|_| ModbusError::Transport)?;

        self.delay.delay_ms(self.timing.post_tx_wait_ms);
        self.collect(response);
        Ok(())
    }
}
