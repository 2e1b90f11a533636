//! Request framing and response validation for "read input registers".
//!
//! Wire format:
//! ```text
//! request   [slave][0x04][regHi][regLo][0x00][0x01][crcLo][crcHi]   8 bytes
//! response  [slave][0x04][0x02][dataHi][dataLo][crcLo][crcHi]        7 bytes
//! ```
//! Only the first five response bytes are needed to decode a value; the CRC
//! is checked when [`ChecksumPolicy::Verify`] is selected.

use heapless::Vec;

use super::crc::{crc_bytes, crc_from_wire, crc16};
use crate::error::ModbusError;

/// Function code 0x04, "read input registers".
pub const FN_READ_INPUT_REGISTERS: u8 = 0x04;
/// Request size on the wire, CRC included.
pub const REQUEST_LEN: usize = 8;
/// Receive buffer capacity; collection stops once it is full.
pub const RESPONSE_CAPACITY: usize = 8;
/// Bytes needed to decode a register value (address, function, count, data).
pub const MIN_RESPONSE_LEN: usize = 5;
/// Header bytes before the data: address, function code, byte count.
const HEADER_LEN: usize = 3;
/// Data bytes in a one-register reply.
pub const REGISTER_BYTES: u8 = 2;

/// Raw bytes collected from the wire for one response.
pub type ResponseBuf = Vec<u8, RESPONSE_CAPACITY>;

/// Whether the response CRC is checked before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Reject frames whose CRC does not match.
    Verify,
    /// Decode without looking at the CRC (legacy behaviour).
    Ignore,
}

/// One-register read request for a fixed slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub slave_id: u8,
    pub register: u16,
}

impl ReadRequest {
    pub fn new(slave_id: u8, register: u16) -> Self {
        Self { slave_id, register }
    }

    /// Serialise with big-endian address, count = 1, CRC low byte first.
    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        let [reg_hi, reg_lo] = self.register.to_be_bytes();
        let mut frame = [
            self.slave_id,
            FN_READ_INPUT_REGISTERS,
            reg_hi,
            reg_lo,
            0x00,
            0x01,
            0x00,
            0x00,
        ];
        let [crc_lo, crc_hi] = crc_bytes(crc16(&frame[..6]));
        frame[6] = crc_lo;
        frame[7] = crc_hi;
        frame
    }
}

/// Validate a collected response and extract the big-endian data word.
///
/// Checks run in this order: anything at all arrived, enough for a value,
/// function code echoes the request, then (if verifying) the byte count,
/// the full frame and its CRC.
pub fn decode_register(resp: &[u8], policy: ChecksumPolicy) -> Result<u16, ModbusError> {
    if resp.is_empty() {
        return Err(ModbusError::Timeout);
    }
    if resp.len() < MIN_RESPONSE_LEN {
        return Err(ModbusError::IncompleteResponse {
            received: resp.len(),
        });
    }
    if resp[1] != FN_READ_INPUT_REGISTERS {
        return Err(ModbusError::UnexpectedFunctionCode {
            expected: FN_READ_INPUT_REGISTERS,
            found: resp[1],
        });
    }

    if policy == ChecksumPolicy::Verify {
        // The data word is always read from bytes 3..5, so only a two-byte
        // payload puts the CRC where it is checked.
        if resp[2] != REGISTER_BYTES {
            return Err(ModbusError::UnexpectedByteCount {
                expected: REGISTER_BYTES,
                found: resp[2],
            });
        }
        let payload_len = HEADER_LEN + usize::from(REGISTER_BYTES);
        if resp.len() < payload_len + 2 {
            return Err(ModbusError::IncompleteResponse {
                received: resp.len(),
            });
        }
        let expected = crc16(&resp[..payload_len]);
        let found = crc_from_wire(resp[payload_len], resp[payload_len + 1]);
        if expected != found {
            return Err(ModbusError::ChecksumInvalid { expected, found });
        }
    }

    Ok(u16::from_be_bytes([resp[3], resp[4]]))
}
