//! Mock hardware for integration tests.
//!
//! Everything shares one deterministic [`SoftClock`]; delays advance it
//! instead of sleeping, and every pin / serial action is recorded with its
//! timestamp in a shared [`TraceLog`] so tests can assert on ordering and
//! timing without touching real GPIO or UART registers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use phasedim::app::events::AppEvent;
use phasedim::app::ports::EventSink;
use phasedim::dimmer::OneShotTimer;
use phasedim::modbus::{
    ChecksumPolicy, ModbusMaster, MonotonicClock, Rs485Transport, SerialPort, TurnaroundTiming,
};

// ── Clock ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SoftClock(Rc<Cell<u64>>);

#[allow(dead_code)]
impl SoftClock {
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }

    /// Move forward to `us`; never moves backwards.
    pub fn advance_to(&self, us: u64) {
        if us > self.0.get() {
            self.0.set(us);
        }
    }
}

impl MonotonicClock for SoftClock {
    fn now_us(&self) -> u64 {
        self.now()
    }
}

/// Delay that advances the soft clock by the requested time.
pub struct ClockDelay(pub SoftClock);

impl DelayNs for ClockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.advance(u64::from(ns.div_ceil(1_000)));
    }
}

// ── Trace ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    Pin { at: u64, high: bool },
    Write { at: u64, bytes: Vec<u8> },
    Flush { at: u64 },
}

pub type TraceLog = Rc<RefCell<Vec<Trace>>>;

pub fn trace_log() -> TraceLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Output pin that logs every level change with the current time.
pub struct RecordingPin {
    pub clock: SoftClock,
    pub log: TraceLog,
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push(Trace::Pin {
            at: self.clock.now(),
            high: false,
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push(Trace::Pin {
            at: self.clock.now(),
            high: true,
        });
        Ok(())
    }
}

/// `(high_at, low_at)` pairs from a pin trace.
pub fn pulses(log: &TraceLog) -> Vec<(u64, u64)> {
    let mut out = Vec::new();
    let mut rising = None;
    for t in log.borrow().iter() {
        match *t {
            Trace::Pin { at, high: true } => rising = Some(at),
            Trace::Pin { at, high: false } => {
                if let Some(start) = rising.take() {
                    out.push((start, at));
                }
            }
            _ => {}
        }
    }
    out
}

// ── One-shot timer ────────────────────────────────────────────

/// Software one-shot timer: arming stores an absolute deadline the test
/// loop polls through the shared cell.
pub struct SoftTimer {
    clock: SoftClock,
    deadline: Rc<Cell<Option<u64>>>,
}

impl SoftTimer {
    pub fn new(clock: SoftClock) -> (Self, Rc<Cell<Option<u64>>>) {
        let deadline = Rc::new(Cell::new(None));
        (
            Self {
                clock,
                deadline: deadline.clone(),
            },
            deadline,
        )
    }
}

impl OneShotTimer for SoftTimer {
    fn arm_one_shot(&mut self, delay_us: u32) {
        self.deadline.set(Some(self.clock.now() + u64::from(delay_us)));
    }
}

// ── Serial port ───────────────────────────────────────────────

#[derive(Debug)]
pub struct LineFault;

/// UART whose receive side replays a script relative to the last flush.
pub struct ScriptedSerial {
    clock: SoftClock,
    log: TraceLog,
    /// Bytes sitting in the RX FIFO before the request.
    stale: VecDeque<u8>,
    /// `(offset after flush, byte)` the slave sends back.
    reply: Vec<(u64, u8)>,
    /// Offsets after flush at which one read reports a framing error.
    faults: Vec<u64>,
    pending: VecDeque<(u64, u8)>,
    pending_faults: VecDeque<u64>,
}

#[allow(dead_code)]
impl ScriptedSerial {
    pub fn new(clock: SoftClock, log: TraceLog) -> Self {
        Self {
            clock,
            log,
            stale: VecDeque::new(),
            reply: Vec::new(),
            faults: Vec::new(),
            pending: VecDeque::new(),
            pending_faults: VecDeque::new(),
        }
    }

    /// Reply with `bytes`, all arriving `offset_us` after the request drains.
    pub fn reply_at(mut self, offset_us: u64, bytes: &[u8]) -> Self {
        self.reply = bytes.iter().map(|&b| (offset_us, b)).collect();
        self
    }

    pub fn stale(mut self, bytes: &[u8]) -> Self {
        self.stale = bytes.iter().copied().collect();
        self
    }

    pub fn fault_at(mut self, offset_us: u64) -> Self {
        self.faults.push(offset_us);
        self
    }

    pub fn stale_remaining(&self) -> usize {
        self.stale.len()
    }

    /// Stop answering from the next request on.
    pub fn go_silent(&mut self) {
        self.reply.clear();
    }
}

impl SerialPort for ScriptedSerial {
    type Error = LineFault;

    fn write(&mut self, data: &[u8]) -> Result<usize, LineFault> {
        self.log.borrow_mut().push(Trace::Write {
            at: self.clock.now(),
            bytes: data.to_vec(),
        });
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), LineFault> {
        let now = self.clock.now();
        self.log.borrow_mut().push(Trace::Flush { at: now });
        self.pending = self.reply.iter().map(|&(off, b)| (now + off, b)).collect();
        self.pending_faults = self.faults.iter().map(|&off| now + off).collect();
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, LineFault> {
        if let Some(b) = self.stale.pop_front() {
            return Ok(Some(b));
        }
        let now = self.clock.now();
        if self.pending_faults.front().is_some_and(|&at| at <= now) {
            self.pending_faults.pop_front();
            return Err(LineFault);
        }
        match self.pending.front() {
            Some(&(at, b)) if at <= now => {
                self.pending.pop_front();
                Ok(Some(b))
            }
            _ => Ok(None),
        }
    }
}

// ── Modbus master ─────────────────────────────────────────────

pub type SimTransport = Rs485Transport<ScriptedSerial, RecordingPin, ClockDelay, SoftClock>;

/// Master for slave 0x01 over a scripted line with the default timing.
pub fn sim_master(
    clock: &SoftClock,
    log: &TraceLog,
    serial: ScriptedSerial,
    policy: ChecksumPolicy,
) -> ModbusMaster<SimTransport> {
    let direction = RecordingPin {
        clock: clock.clone(),
        log: log.clone(),
    };
    let transport = Rs485Transport::new(
        serial,
        direction,
        ClockDelay(clock.clone()),
        clock.clone(),
        TurnaroundTiming::default(),
    );
    ModbusMaster::new(transport, 0x01, policy)
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
