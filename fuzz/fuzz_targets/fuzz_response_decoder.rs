//! Fuzz target: `decode_register`
//!
//! Drives arbitrary bytes (as if collected from a noisy RS-485 line) into
//! the response decoder under both checksum policies.  It must never panic,
//! and a verified frame must also decode when the checksum is ignored.
//!
//! cargo fuzz run fuzz_response_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use phasedim::modbus::frame::{ChecksumPolicy, RESPONSE_CAPACITY, decode_register};

fuzz_target!(|data: &[u8]| {
    // The transport never collects more than the receive buffer holds.
    let data = &data[..data.len().min(RESPONSE_CAPACITY)];

    let verified = decode_register(data, ChecksumPolicy::Verify);
    let ignored = decode_register(data, ChecksumPolicy::Ignore);

    if let Ok(word) = verified {
        assert_eq!(ignored, Ok(word), "CRC check must only ever reject");
    }
});
