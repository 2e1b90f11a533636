//! Modbus master over the RS-485 transport against a scripted slave.
//!
//! Timing: settle 10 ms, post-transmit wait 200 ms, receive window 500 ms.
//! With the request issued at t=0 the window runs from 210 ms to 710 ms.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use phasedim::error::ModbusError;
use phasedim::modbus::{ChecksumPolicy, LEGACY_FAILURE, ModbusMaster, Rs485Transport, TurnaroundTiming};

use crate::mock_hw::{
    ClockDelay, ScriptedSerial, SimTransport, SoftClock, Trace, TraceLog, sim_master, trace_log,
};

/// 0x00C8 = 200 → 20.0
const GOOD: [u8; 7] = [0x01, 0x04, 0x02, 0x00, 0xC8, 0xB8, 0xA6];

const WINDOW_OPENS_US: u64 = 210_000;
const WINDOW_CLOSES_US: u64 = 710_000;

struct Rig {
    clock: SoftClock,
    log: TraceLog,
}

impl Rig {
    fn new() -> Self {
        Self {
            clock: SoftClock::default(),
            log: trace_log(),
        }
    }

    fn serial(&self) -> ScriptedSerial {
        ScriptedSerial::new(self.clock.clone(), self.log.clone())
    }

    fn master(&self, serial: ScriptedSerial, policy: ChecksumPolicy) -> ModbusMaster<SimTransport> {
        sim_master(&self.clock, &self.log, serial, policy)
    }
}

#[test]
fn decodes_value_from_slave_reply() {
    let rig = Rig::new();
    let mut m = rig.master(rig.serial().reply_at(50_000, &GOOD), ChecksumPolicy::Verify);

    assert_eq!(m.read_register(0x0001), Ok(20.0));

    let written: Vec<Vec<u8>> = rig
        .log
        .borrow()
        .iter()
        .filter_map(|t| match t {
            Trace::Write { bytes, .. } => Some(bytes.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(written, vec![vec![0x01, 0x04, 0x00, 0x01, 0x00, 0x01, 0x60, 0x0A]]);
}

#[test]
fn half_duplex_turnaround_order_and_timing() {
    let rig = Rig::new();
    let mut m = rig.master(rig.serial().reply_at(50_000, &GOOD), ChecksumPolicy::Verify);
    // Construction parks the transceiver in receive mode.
    assert_eq!(*rig.log.borrow(), vec![Trace::Pin { at: 0, high: false }]);
    rig.log.borrow_mut().clear();

    m.read_register(1).unwrap();

    let log = rig.log.borrow();
    assert_eq!(log[0], Trace::Pin { at: 0, high: true });
    assert!(matches!(log[1], Trace::Write { at: 10_000, .. }));
    assert_eq!(log[2], Trace::Flush { at: 10_000 });
    assert_eq!(log[3], Trace::Pin { at: 10_000, high: false });
    assert_eq!(log.len(), 4);
    // Seven bytes never fill the eight-byte buffer: the whole window is used.
    assert_eq!(rig.clock.now(), WINDOW_CLOSES_US);
}

#[test]
fn silent_slave_times_out_to_sentinel() {
    let rig = Rig::new();
    let mut m = rig.master(rig.serial(), ChecksumPolicy::Verify);

    assert_eq!(m.read_register(1), Err(ModbusError::Timeout));
    assert_eq!(rig.clock.now(), WINDOW_CLOSES_US, "bounded by delays + 500 ms window");
    assert_eq!(m.read_register_legacy(1), LEGACY_FAILURE);
}

#[test]
fn fewer_than_five_bytes_is_sentinel() {
    let rig = Rig::new();
    let mut m = rig.master(rig.serial().reply_at(20_000, &GOOD[..4]), ChecksumPolicy::Verify);

    assert_eq!(
        m.read_register(1),
        Err(ModbusError::IncompleteResponse { received: 4 })
    );
    assert_eq!(m.read_register_legacy(1), -1.0);
}

#[test]
fn reply_after_the_window_is_ignored() {
    let rig = Rig::new();
    // Arrives at 760 ms, 50 ms after the window closed.
    let mut m = rig.master(rig.serial().reply_at(750_000, &GOOD), ChecksumPolicy::Verify);
    assert_eq!(m.read_register(1), Err(ModbusError::Timeout));
}

#[test]
fn late_reply_inside_the_window_is_collected() {
    let rig = Rig::new();
    let mut m = rig.master(rig.serial().reply_at(600_000, &GOOD), ChecksumPolicy::Verify);
    assert_eq!(m.read_register(1), Ok(20.0));
}

#[test]
fn full_buffer_ends_the_window_early() {
    let rig = Rig::new();
    let mut reply = GOOD.to_vec();
    reply.push(0x00);
    let mut m = rig.master(rig.serial().reply_at(5_000, &reply), ChecksumPolicy::Verify);

    assert_eq!(m.read_register(1), Ok(20.0));
    assert_eq!(rig.clock.now(), WINDOW_OPENS_US);
}

#[test]
fn stale_bytes_are_flushed_before_the_request() {
    let rig = Rig::new();
    let serial = rig.serial().stale(&[0xAA, 0xBB, 0xCC]).reply_at(50_000, &GOOD);
    let mut m = rig.master(serial, ChecksumPolicy::Verify);

    assert_eq!(m.read_register(1), Ok(20.0));
    assert_eq!(m.transport().serial().stale_remaining(), 0);
}

#[test]
fn line_noise_does_not_abort_the_read() {
    let rig = Rig::new();
    let serial = rig.serial().fault_at(100_000).reply_at(300_000, &GOOD);
    let mut m = rig.master(serial, ChecksumPolicy::Verify);
    assert_eq!(m.read_register(1), Ok(20.0));
}

#[test]
fn exception_reply_is_unexpected_function_code() {
    let rig = Rig::new();
    let serial = rig.serial().reply_at(10_000, &[0x01, 0x84, 0x02, 0x00, 0x00]);
    let mut m = rig.master(serial, ChecksumPolicy::Verify);
    assert_eq!(
        m.read_register(1),
        Err(ModbusError::UnexpectedFunctionCode {
            expected: 0x04,
            found: 0x84
        })
    );
}

#[test]
fn corrupted_crc_is_rejected_unless_ignored() {
    let mut corrupted = GOOD;
    corrupted[6] ^= 0xFF;

    let rig = Rig::new();
    let mut strict = rig.master(rig.serial().reply_at(10_000, &corrupted), ChecksumPolicy::Verify);
    assert!(matches!(
        strict.read_register(1),
        Err(ModbusError::ChecksumInvalid { .. })
    ));

    let rig = Rig::new();
    let mut legacy = rig.master(rig.serial().reply_at(10_000, &corrupted), ChecksumPolicy::Ignore);
    assert_eq!(legacy.read_register(1), Ok(20.0));
}

#[test]
fn every_call_sends_a_fresh_request() {
    let rig = Rig::new();
    let mut m = rig.master(rig.serial().reply_at(10_000, &GOOD), ChecksumPolicy::Verify);
    m.read_register(1).unwrap();
    m.read_register(2).unwrap();

    let requests: Vec<u8> = rig
        .log
        .borrow()
        .iter()
        .filter_map(|t| match t {
            Trace::Write { bytes, .. } => Some(bytes[3]),
            _ => None,
        })
        .collect();
    assert_eq!(requests, vec![0x01, 0x02]);
}

/// Direction line whose driver rejects every write.
struct StuckPin;

impl ErrorType for StuckPin {
    type Error = ErrorKind;
}

impl OutputPin for StuckPin {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }
}

#[test]
fn dead_direction_pin_is_a_transport_error_not_a_panic() {
    let rig = Rig::new();
    let transport = Rs485Transport::new(
        rig.serial().reply_at(10_000, &GOOD),
        StuckPin,
        ClockDelay(rig.clock.clone()),
        rig.clock.clone(),
        TurnaroundTiming::default(),
    );
    let mut m = ModbusMaster::new(transport, 0x01, ChecksumPolicy::Verify);

    assert_eq!(m.read_register(1), Err(ModbusError::Transport));
    assert_eq!(m.read_register_legacy(1), LEGACY_FAILURE);
    assert!(rig.log.borrow().is_empty(), "nothing may be sent without the bus");
}
