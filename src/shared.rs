//! Single-word cells for state shared between interrupt handlers and the control loop.
//!
//! Each cell has exactly one writing context. Values wider than a byte are
//! encoded into one `AtomicU32`, so a reader can never see half of an update.

use crate::control::OperatingMode;
use core::convert::Infallible;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use embedded_hal::serial;

/// Holds the most recently received byte until it is taken.
pub struct ByteCell(AtomicU8);

impl ByteCell {
    const EMPTY: u8 = 0;

    pub const fn new() -> Self {
        Self(AtomicU8::new(Self::EMPTY))
    }

    /// Overwrite the pending byte. NUL is indistinguishable from "empty" and is dropped.
    pub fn post(&self, byte: u8) {
        if byte != Self::EMPTY {
            self.0.store(byte, Ordering::Relaxed);
        }
    }

    /// Take the pending byte, leaving the cell empty.
    pub fn take(&self) -> Option<u8> {
        match self.0.swap(Self::EMPTY, Ordering::Relaxed) {
            Self::EMPTY => None,
            byte => Some(byte),
        }
    }
}

/// Lets the control loop read posted bytes like a serial port.
impl serial::Read<u8> for &ByteCell {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.take().ok_or(nb::Error::WouldBlock)
    }
}

/// An `f32` number of seconds, stored as its bit pattern.
pub struct SecondsCell(AtomicU32);

impl SecondsCell {
    pub const fn new() -> Self {
        // 0.0_f32 is all zero bits
        Self(AtomicU32::new(0))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn add(&self, secs: f32) {
        // the closure always returns `Some`, so this cannot fail
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f32::from_bits(bits) + secs).to_bits())
            });
    }

    /// If the value exceeds `threshold`, reset it to zero and return what it was.
    pub fn take_if_above(&self, threshold: f32) -> Option<f32> {
        self.0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                (f32::from_bits(bits) > threshold).then_some(0)
            })
            .ok()
            .map(f32::from_bits)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// The operating mode, as seen by interrupt handlers.
pub struct ModeCell(AtomicU8);

impl ModeCell {
    pub const fn new() -> Self {
        Self(AtomicU8::new(OperatingMode::Idle as u8))
    }

    pub fn load(&self) -> OperatingMode {
        match self.0.load(Ordering::Relaxed) {
            x if x == OperatingMode::Measuring as u8 => OperatingMode::Measuring,
            x if x == OperatingMode::Configuring as u8 => OperatingMode::Configuring,
            _ => OperatingMode::Idle,
        }
    }

    pub fn store(&self, mode: OperatingMode) {
        self.0.store(mode as u8, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::serial::Read;

    #[test]
    fn byte_cell_keeps_latest_until_taken() {
        let cell = ByteCell::new();
        assert_eq!(cell.take(), None);

        cell.post(b'i');
        cell.post(b'p');
        assert_eq!(cell.take(), Some(b'p'));
        assert_eq!(cell.take(), None);

        cell.post(0);
        assert_eq!(cell.take(), None);
    }

    #[test]
    fn byte_cell_reads_as_serial_port() {
        let cell = ByteCell::new();
        let mut port = &cell;
        assert_eq!(port.read(), Err(nb::Error::WouldBlock));

        cell.post(b'r');
        assert_eq!(port.read(), Ok(b'r'));
        assert_eq!(port.read(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn seconds_cell_takes_only_above_threshold() {
        let cell = SecondsCell::new();
        cell.add(0.5);
        assert_eq!(cell.take_if_above(1.0), None);
        assert_eq!(cell.get(), 0.5);

        cell.add(0.75);
        assert_eq!(cell.take_if_above(1.0), Some(1.25));
        assert_eq!(cell.get(), 0.0);
    }

    #[test]
    fn mode_cell_round_trips_every_mode() {
        let cell = ModeCell::new();
        assert_eq!(cell.load(), OperatingMode::Idle);
        for mode in [
            OperatingMode::Measuring,
            OperatingMode::Configuring,
            OperatingMode::Idle,
        ] {
            cell.store(mode);
            assert_eq!(cell.load(), mode);
        }
    }
}
