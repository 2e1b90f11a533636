//! Modbus master: one request, one decode, no retry.

use super::frame::{ChecksumPolicy, ReadRequest, ResponseBuf, decode_register};
use super::transport::HalfDuplex;
use crate::error::ModbusError;

/// Value returned by [`ModbusMaster::read_register_legacy`] on any failure.
pub const LEGACY_FAILURE: f32 = -1.0;

/// Registers carry one implied decimal digit.
pub const VALUE_SCALE: f32 = 10.0;

pub struct ModbusMaster<T> {
    transport: T,
    slave_id: u8,
    policy: ChecksumPolicy,
}

impl<T: HalfDuplex> ModbusMaster<T> {
    pub fn new(transport: T, slave_id: u8, policy: ChecksumPolicy) -> Self {
        Self {
            transport,
            slave_id,
            policy,
        }
    }

    /// Read one input register and return the raw 16-bit word.
    pub fn read_raw(&mut self, register: u16) -> Result<u16, ModbusError> {
        let request = ReadRequest::new(self.slave_id, register).encode();
        let mut response = ResponseBuf::new();
        self.transport.transact(&request, &mut response)?;
        decode_register(&response, self.policy)
    }

    /// Read one input register as an unsigned fixed-point value (raw / 10).
    pub fn read_register(&mut self, register: u16) -> Result<f32, ModbusError> {
        self.read_raw(register).map(|raw| f32::from(raw) / VALUE_SCALE)
    }

    /// [`read_register`](Self::read_register) with every failure collapsed to `-1.0`.
    pub fn read_register_legacy(&mut self, register: u16) -> f32 {
        self.read_register(register).unwrap_or(LEGACY_FAILURE)
    }

    pub fn slave_id(&self) -> u8 {
        self.slave_id
    }

    pub fn checksum_policy(&self) -> ChecksumPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
