//! Pulse capture.
//!
//! A pulse is timed from its rising edge to its falling edge with a 16-bit counter.
//! Longer pulses are handled by counting counter overflows in an interrupt handler
//! ([`PulseCapture::on_overflow`]), and a watchdog bounds how long a capture may block.

use crate::config;
use crate::time::{self, Ticks};
use core::sync::atomic::{AtomicU32, Ordering};
use embedded_hal::digital::v2::InputPin;

/// The free-running counter used to time a pulse.
pub trait CaptureCounter {
    /// Zero the counter, drop any unserviced overflow, and start counting.
    fn restart(&mut self);

    /// Stop counting and clear the overflow flag.
    fn stop(&mut self) -> StoppedCounter;
}

/// Counter state at the moment it was stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StoppedCounter {
    /// Ticks since the last overflow.
    pub remainder: u16,
    /// An overflow happened but the interrupt handler had not run yet.
    pub overflow_pending: bool,
}

/// Falling-edge flag of the sensor line.
///
/// The flag is set by hardware on a falling edge, or by the overflow handler
/// when the watchdog expires.
pub trait EdgeLatch {
    fn clear_edge(&mut self);
    fn edge_latched(&mut self) -> bool;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Watchdog {
    Running,
    Expired,
}

impl Watchdog {
    pub fn is_expired(self) -> bool {
        self == Watchdog::Expired
    }
}

/// Duration of one captured pulse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PulseSample {
    ticks: u64,
}

impl PulseSample {
    /// The placeholder before anything has been measured.
    pub const NONE: Self = Self { ticks: 0 };

    pub fn from_ticks(ticks: Ticks) -> Self {
        Self {
            ticks: ticks.ticks(),
        }
    }

    fn from_counter(overflows: u32, remainder: u16) -> Self {
        Self {
            ticks: u64::from(overflows) * u64::from(config::capture::COUNTER_TICKS)
                + u64::from(remainder),
        }
    }

    pub fn ticks(self) -> Ticks {
        Ticks::from_ticks(self.ticks)
    }

    pub fn as_secs(self) -> f32 {
        #[allow(clippy::cast_possible_truncation)]
        let secs = time::to_secs(self.ticks()) as f32;
        secs
    }

    pub fn is_measured(self) -> bool {
        self.ticks > 0
    }

    /// The capture was ended by the watchdog, so this is not a real measurement.
    pub fn is_stalled(self) -> bool {
        self.ticks > u64::from(config::capture::WATCHDOG_CEILING_TICKS)
    }
}

impl Default for PulseSample {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PulseSample {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=u64} ticks ({=f32} s)", self.ticks, self.as_secs())
    }
}

/// Capture state shared with the counter's overflow interrupt.
pub struct PulseCapture {
    overflows: AtomicU32,
}

impl PulseCapture {
    pub const fn new() -> Self {
        Self {
            overflows: AtomicU32::new(0),
        }
    }

    /// Account for one counter overflow. Call from the overflow interrupt.
    ///
    /// When this returns [`Watchdog::Expired`], the caller must latch the
    /// falling-edge flag so that a waiting capture returns.
    pub fn on_overflow(&self) -> Watchdog {
        let overflows = self.overflows.fetch_add(1, Ordering::Relaxed) + 1;
        Self::watchdog_for(overflows)
    }

    fn watchdog(&self) -> Watchdog {
        Self::watchdog_for(self.overflows.load(Ordering::Relaxed))
    }

    fn watchdog_for(overflows: u32) -> Watchdog {
        if overflows >= config::capture::WATCHDOG_OVERFLOWS {
            Watchdog::Expired
        } else {
            Watchdog::Running
        }
    }

    fn restart<C: CaptureCounter>(&self, counter: &mut C) {
        // restart first: an overflow from the previous run that is still in flight
        // finds its flag cleared and is not counted
        counter.restart();
        self.overflows.store(0, Ordering::Relaxed);
    }

    /// Time one full pulse on the sensor line.
    ///
    /// Blocks until a rising edge followed by a falling edge has been seen,
    /// or until the watchdog expires, in which case the returned sample
    /// [`is_stalled`](PulseSample::is_stalled).
    pub fn capture_one_pulse<S, C>(
        &self,
        sensor: &mut S,
        counter: &mut C,
    ) -> Result<PulseSample, S::Error>
    where
        S: InputPin + EdgeLatch,
        C: CaptureCounter,
    {
        // Phase 1: align to a rising edge
        //
        // The counter already runs here, so a line stuck in either state
        // trips the watchdog instead of blocking forever. Each wait gets
        // its own ceiling.
        self.restart(counter);

        // skip a pulse that is already in progress
        while sensor.is_high()? {
            if self.watchdog().is_expired() {
                return Ok(self.finish(counter));
            }
        }
        self.restart(counter);
        while sensor.is_low()? {
            if self.watchdog().is_expired() {
                return Ok(self.finish(counter));
            }
        }

        // Phase 2: time the pulse

        sensor.clear_edge();
        self.restart(counter);

        // the overflow handler latches the edge once the watchdog expires
        while !sensor.edge_latched() {
            continue;
        }

        Ok(self.finish(counter))
    }

    fn finish<C: CaptureCounter>(&self, counter: &mut C) -> PulseSample {
        let stopped = counter.stop();
        let mut overflows = self.overflows.load(Ordering::Relaxed);
        if stopped.overflow_pending {
            overflows += 1;
        }
        PulseSample::from_counter(overflows, stopped.remainder)
    }
}
