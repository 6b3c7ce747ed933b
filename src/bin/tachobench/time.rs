use crate::app::monotonics;
use embedded_hal::blocking::delay::DelayMs;

/// Blocking delay on the monotonic timer.
///
/// Interrupt handlers keep running while this spins.
pub struct MonoDelay;

impl DelayMs<u32> for MonoDelay {
    fn delay_ms(&mut self, ms: u32) {
        let start = monotonics::now();
        while (monotonics::now() - start).to_millis() < u64::from(ms) {
            continue;
        }
    }
}
