//! Modbus CRC-16 (reflected polynomial 0xA001, init 0xFFFF).
//!
//! Bitwise rather than table-driven: requests are 6 bytes, and the table
//! would cost 512 bytes of flash.

const POLY: u16 = 0xA001;
const INIT: u16 = 0xFFFF;

/// CRC over `buf`, LSB-first, 8 reduction steps per byte.
///
/// Transmitted low byte first; see [`crc_bytes`].
pub fn crc16(buf: &[u8]) -> u16 {
    let mut crc = INIT;
    for &byte in buf {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Wire order of a CRC: `[low, high]`.
pub fn crc_bytes(crc: u16) -> [u8; 2] {
    crc.to_le_bytes()
}

/// Read a CRC stored in wire order at `bytes[0..2]`.
pub fn crc_from_wire(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}
