//! Zero-cross dimmer driven by a simulated 50 Hz mains signal.
//!
//! The rig wires a real `DimmerBank` to software one-shot timers and
//! recording gate pins, then replays zero-cross edges (with ringing) and
//! timer expiries in time order.

use std::cell::Cell;
use std::rc::Rc;

use phasedim::dimmer::{DimmerBank, DimmerTiming, TriacPulseEmitter, ZeroCrossScheduler};

use crate::mock_hw::{ClockDelay, RecordingPin, SoftClock, SoftTimer, TraceLog, pulses, trace_log};

pub(crate) const HALF_CYCLE_US: u64 = 10_000;
const GATE_PULSE_US: u64 = 10;

pub(crate) struct Rig<'a> {
    clock: SoftClock,
    scheduler: ZeroCrossScheduler<'a, SoftTimer, 2>,
    emitters: Vec<TriacPulseEmitter<'a, RecordingPin, ClockDelay>>,
    deadlines: [Rc<Cell<Option<u64>>>; 2],
    pub(crate) gates: [TraceLog; 2],
}

impl<'a> Rig<'a> {
    pub(crate) fn new(bank: &'a DimmerBank<2>) -> Self {
        let clock = SoftClock::default();
        let (t0, d0) = SoftTimer::new(clock.clone());
        let (t1, d1) = SoftTimer::new(clock.clone());
        let gates = [trace_log(), trace_log()];
        let emitters = (0..2)
            .map(|ch| {
                let gate = RecordingPin {
                    clock: clock.clone(),
                    log: gates[ch].clone(),
                };
                bank.emitter(ch, gate, ClockDelay(clock.clone())).unwrap()
            })
            .collect();
        Self {
            scheduler: bank.scheduler([t0, t1]),
            clock,
            emitters,
            deadlines: [d0, d1],
            gates,
        }
    }

    /// Fire every timer that expires before `until`, earliest first.
    pub(crate) fn run_timers_until(&mut self, until: u64) {
        loop {
            let next = self
                .deadlines
                .iter()
                .enumerate()
                .filter_map(|(ch, d)| d.get().map(|at| (at, ch)))
                .filter(|&(at, _)| at < until)
                .min();
            let Some((at, ch)) = next else { break };
            self.deadlines[ch].set(None);
            self.clock.advance_to(at);
            self.emitters[ch].on_timer_expired();
        }
    }

    pub(crate) fn edge(&mut self, at: u64) -> bool {
        self.run_timers_until(at);
        self.clock.advance_to(at);
        self.scheduler.on_zero_cross(at)
    }

    /// Clean crossings plus ringing at +40, +300 and +8400 µs.
    pub(crate) fn noisy_cycles(&mut self, first_zc: u64, count: u64) -> Vec<u64> {
        let mut accepted = Vec::new();
        for k in 0..count {
            let zc = first_zc + k * HALF_CYCLE_US;
            for at in [zc, zc + 40, zc + 300, zc + 8_400] {
                if self.edge(at) {
                    accepted.push(at);
                }
            }
        }
        accepted
    }

    pub(crate) fn finish(&mut self) {
        self.run_timers_until(u64::MAX);
    }
}

pub(crate) fn bank() -> DimmerBank<2> {
    DimmerBank::new(DimmerTiming::NOMINAL_50HZ)
}

#[test]
fn one_ten_microsecond_pulse_per_half_cycle() {
    let bank = bank();
    bank.set_brightness(0, 50);
    bank.set_brightness(1, 0);
    let mut rig = Rig::new(&bank);

    let accepted = rig.noisy_cycles(1_000, 50);
    rig.finish();

    assert_eq!(accepted.len(), 50, "ringing must not be accepted");
    assert_eq!(bank.zero_cross_accepted(), 50);
    assert_eq!(bank.zero_cross_rejected(), 150);

    let fired = pulses(&rig.gates[0]);
    assert_eq!(fired.len(), 50);
    for (&(high, low), &zc) in fired.iter().zip(&accepted) {
        assert_eq!(high - zc, 4_591, "50 % fires 4591 µs after the crossing");
        assert_eq!(low - high, GATE_PULSE_US);
    }
    assert_eq!(bank.pulses_fired(0), Some(50));
}

#[test]
fn zero_percent_channel_never_asserts_gate() {
    let bank = bank();
    bank.set_brightness(0, 100);
    bank.set_brightness(1, 0);
    let mut rig = Rig::new(&bank);

    rig.noisy_cycles(0, 30);
    rig.finish();

    assert!(rig.gates[1].borrow().is_empty());
    assert_eq!(bank.pulses_fired(1), Some(0));
    assert_eq!(pulses(&rig.gates[0]).len(), 30);
}

#[test]
fn every_pulse_lands_inside_its_half_cycle() {
    let bank = bank();
    bank.set_brightness(0, 1);
    bank.set_brightness(1, 100);
    let mut rig = Rig::new(&bank);

    let accepted = rig.noisy_cycles(500, 20);
    rig.finish();

    for (ch, delay) in [(0, 8_600), (1, 500)] {
        let fired = pulses(&rig.gates[ch]);
        assert_eq!(fired.len(), 20);
        for (&(high, low), &zc) in fired.iter().zip(&accepted) {
            assert_eq!(high - zc, delay);
            assert!(low < zc + HALF_CYCLE_US, "gate must release before the next crossing");
        }
    }
}

#[test]
fn brightness_change_applies_from_next_half_cycle() {
    let bank = bank();
    bank.set_brightness(0, 25);
    let mut rig = Rig::new(&bank);
    let slow = bank.firing_delay_us(0).unwrap();

    rig.edge(0);
    // Change lands mid-cycle, after the timer was armed.
    rig.run_timers_until(1_000);
    bank.set_brightness(0, 75);
    let fast = bank.firing_delay_us(0).unwrap();
    rig.edge(HALF_CYCLE_US);
    rig.finish();

    assert!(fast < slow);
    let fired = pulses(&rig.gates[0]);
    assert_eq!(fired.len(), 2);
    assert_eq!(fired[0].0, u64::from(slow));
    assert_eq!(fired[1].0, HALF_CYCLE_US + u64::from(fast));
}

#[test]
fn switching_off_after_arming_suppresses_the_pending_pulse() {
    let bank = bank();
    bank.set_brightness(0, 50);
    let mut rig = Rig::new(&bank);

    rig.edge(0);
    bank.set_brightness(0, 0);
    rig.finish();
    rig.noisy_cycles(HALF_CYCLE_US, 5);
    rig.finish();

    assert!(pulses(&rig.gates[0]).is_empty());
    assert_eq!(bank.pulses_fired(0), Some(0));
}

#[test]
fn lost_mains_goes_dark_and_recovers_without_reset() {
    let bank = bank();
    bank.set_brightness(0, 80);
    let mut rig = Rig::new(&bank);

    rig.noisy_cycles(0, 10);
    rig.finish();
    let before = pulses(&rig.gates[0]).len();

    // 200 ms without a single edge: nothing re-arms.
    let resume_at = 10 * HALF_CYCLE_US + 200_000;
    rig.run_timers_until(resume_at);
    assert_eq!(pulses(&rig.gates[0]).len(), before);

    rig.noisy_cycles(resume_at, 10);
    rig.finish();

    assert_eq!(before, 10);
    assert_eq!(pulses(&rig.gates[0]).len(), 20);
    assert_eq!(bank.zero_cross_accepted(), 20);
}
