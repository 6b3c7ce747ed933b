//! Simulated hardware for host tests.
//!
//! [`Bench`] plays back a scripted sensor waveform against a simulated 16-bit
//! capture counter. Time only moves when the code under test polls the sensor,
//! and never jumps over an edge or a counter overflow, so captures are exact.

use crate::capture::{CaptureCounter, EdgeLatch, PulseCapture, StoppedCounter};
use crate::config;
use crate::display::{LogScreen, Row, Screen};
use crate::emulator::{ReloadRegister, ReloadValue};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use embedded_hal::serial;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

const PERIOD: u64 = config::capture::COUNTER_TICKS as u64;

/// Largest time step taken while nothing happens.
const STEP: u64 = 8192;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

struct State {
    now: u64,
    /// (time, level from then on), sorted by time
    edges: Vec<(u64, Level)>,
    /// Counter start and next overflow, while running.
    counting: Option<(u64, u64)>,
    latched: bool,
}

impl State {
    fn level_at(&self, t: u64) -> Level {
        self.edges
            .iter()
            .take_while(|&&(at, _)| at <= t)
            .last()
            .map_or(Level::Low, |&(_, level)| level)
    }

    fn next_edge(&self) -> Option<u64> {
        self.edges
            .iter()
            .map(|&(at, _)| at)
            .find(|&at| at > self.now)
    }
}

#[derive(Clone)]
pub struct Bench<'a> {
    state: Rc<RefCell<State>>,
    capture: &'a PulseCapture,
}

impl<'a> Bench<'a> {
    pub fn new(capture: &'a PulseCapture) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                now: 0,
                edges: Vec::new(),
                counting: None,
                latched: false,
            })),
            capture,
        }
    }

    pub fn capture(&self) -> &'a PulseCapture {
        self.capture
    }

    pub fn parts(&self) -> (SimSensor<'a>, SimCounter<'a>) {
        (SimSensor(self.clone()), SimCounter(self.clone()))
    }

    /// Replace the waveform. Times are relative to now.
    pub fn set_edges(&self, edges: &[(u64, Level)]) {
        let mut state = self.state.borrow_mut();
        let now = state.now;
        state.edges = edges.iter().map(|&(at, level)| (now + at, level)).collect();
    }

    /// Schedule a single high pulse of `width` ticks, starting `delay` ticks from now.
    pub fn pulse_after(&self, delay: u64, width: u64) {
        self.set_edges(&[(delay, Level::High), (delay + width, Level::Low)]);
    }

    fn level(&self) -> Level {
        let state = self.state.borrow();
        state.level_at(state.now)
    }

    /// Move to the next point of interest, running the overflow interrupt
    /// and latching falling edges on the way.
    fn advance(&self) {
        let mut state = self.state.borrow_mut();
        let before = state.level_at(state.now);

        let mut target = state.now + STEP;
        if let Some(edge) = state.next_edge() {
            // stop just short of an edge first, so a poll loop sees both sides
            target = target.min(if edge - 1 > state.now { edge - 1 } else { edge });
        }
        if let Some((_, overflow)) = state.counting {
            target = target.min(overflow);
        }
        state.now = target;

        if before == Level::High && state.level_at(target) == Level::Low {
            state.latched = true;
        }
        if let Some((start, overflow)) = state.counting {
            if target == overflow {
                state.counting = Some((start, overflow + PERIOD));
                if self.capture.on_overflow().is_expired() {
                    state.latched = true;
                }
            }
        }
    }
}

pub struct SimSensor<'a>(Bench<'a>);

impl InputPin for SimSensor<'_> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        self.0.advance();
        Ok(self.0.level() == Level::High)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.0.advance();
        Ok(self.0.level() == Level::Low)
    }
}

impl EdgeLatch for SimSensor<'_> {
    fn clear_edge(&mut self) {
        self.0.state.borrow_mut().latched = false;
    }

    fn edge_latched(&mut self) -> bool {
        if !self.0.state.borrow().latched {
            self.0.advance();
        }
        self.0.state.borrow().latched
    }
}

pub struct SimCounter<'a>(Bench<'a>);

impl CaptureCounter for SimCounter<'_> {
    fn restart(&mut self) {
        let mut state = self.0.state.borrow_mut();
        let now = state.now;
        state.counting = Some((now, now + PERIOD));
    }

    fn stop(&mut self) -> StoppedCounter {
        let mut state = self.0.state.borrow_mut();
        let now = state.now;
        let remainder = match state.counting.take() {
            // overflows are serviced as soon as they happen, so none is pending
            Some((_, next_overflow)) => PERIOD - (next_overflow - now),
            None => 0,
        };
        StoppedCounter {
            remainder: u16::try_from(remainder).unwrap(),
            overflow_pending: false,
        }
    }
}

/// A command port fed from a script.
#[derive(Default)]
pub struct ScriptedPort {
    input: VecDeque<u8>,
    fail_when_empty: bool,
}

impl ScriptedPort {
    /// A port that blocks once `input` runs out.
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            fail_when_empty: false,
        }
    }

    /// A port that fails once `input` runs out.
    pub fn failing_after(input: &[u8]) -> Self {
        Self {
            fail_when_empty: true,
            ..Self::new(input)
        }
    }

    pub fn push(&mut self, input: &[u8]) {
        self.input.extend(input);
    }

    pub fn remaining(&self) -> usize {
        self.input.len()
    }
}

impl serial::Read<u8> for ScriptedPort {
    type Error = ();

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        match self.input.pop_front() {
            Some(byte) => Ok(byte),
            None if self.fail_when_empty => Err(nb::Error::Other(())),
            None => Err(nb::Error::WouldBlock),
        }
    }
}

/// A [`LogScreen`] that also counts how often it was cleared.
#[derive(Default)]
pub struct CountingScreen {
    screen: LogScreen,
    pub clears: usize,
}

impl CountingScreen {
    pub fn row(&self, row: Row) -> &str {
        self.screen.row(row)
    }
}

impl Screen for CountingScreen {
    fn clear(&mut self) {
        self.clears += 1;
        self.screen.clear();
    }

    fn print_line(&mut self, row: Row, text: &str) {
        self.screen.print_line(row, text);
    }
}

#[derive(Default)]
pub struct RecordingEmulator {
    pub reloads: Vec<ReloadValue>,
}

impl ReloadRegister for RecordingEmulator {
    fn set_reload(&mut self, reload: ReloadValue) {
        self.reloads.push(reload);
    }
}

#[derive(Default)]
pub struct RecordingDelay {
    pub total_ms: u32,
}

impl DelayMs<u32> for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
    }
}
