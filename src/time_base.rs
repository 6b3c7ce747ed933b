//! Periodic time base that paces sampling.
//!
//! The tick interrupt accumulates elapsed seconds while measuring. The control
//! loop takes a sample once the accumulated time passes the cadence window.

use crate::config;
use crate::control::OperatingMode;
use crate::shared::SecondsCell;

pub struct TimeBase {
    elapsed: SecondsCell,
}

impl TimeBase {
    pub const fn new() -> Self {
        Self {
            elapsed: SecondsCell::new(),
        }
    }

    /// Account for one time base period. Call from the tick interrupt.
    pub fn on_tick(&self, mode: OperatingMode) {
        if mode == OperatingMode::Measuring {
            self.elapsed.add(config::time_base::TICK_SECS);
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed.get()
    }

    /// Returns true, and starts a new window, if the current window has elapsed.
    pub fn take_window(&self) -> bool {
        self.elapsed
            .take_if_above(config::time_base::CADENCE_WINDOW_SECS)
            .is_some()
    }

    pub fn restart(&self) {
        self.elapsed.reset();
    }
}
