//! Reference signal emulation.
//!
//! A second 16-bit timer counts up from a reload value and toggles the reference
//! output every time it overflows, so each half period of the output lasts
//! `65536 - reload` ticks. The reload is chosen so that a half period is as long
//! as the pulse a sensor would see at the configured speed.

use crate::config;
use crate::math::{DivRound, Truncate};
use crate::speed::SpeedSetting;

/// Reload value of the emulation timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReloadValue(u16);

impl ReloadValue {
    pub fn for_speed(speed: SpeedSetting) -> Self {
        let counts = config::speed::CALIBRATION_TICKS.div_round(u32::from(speed.get()));
        // counts <= CALIBRATION_TICKS / MIN < 2^16, see config
        Self((config::capture::COUNTER_TICKS - counts).truncate())
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Ticks between two toggles of the output.
    pub fn ticks_per_toggle(self) -> u32 {
        config::capture::COUNTER_TICKS - u32::from(self.0)
    }

    /// High and low byte, as written to a split reload register.
    pub fn halves(self) -> (u8, u8) {
        ((self.0 >> 8).truncate(), (self.0 & 0xff).truncate())
    }
}

/// The timer driving the reference output.
pub trait ReloadRegister {
    fn set_reload(&mut self, reload: ReloadValue);
}

/// Program the emulation timer for `speed`.
pub fn configure_emulation<R: ReloadRegister>(register: &mut R, speed: SpeedSetting) -> ReloadValue {
    let reload = ReloadValue::for_speed(speed);
    let (high, low) = reload.halves();
    debug!(
        "emulating {} rpm: reload {} ({=u8:#x} {=u8:#x}), {} ticks per toggle",
        speed.get(),
        reload.get(),
        high,
        low,
        reload.ticks_per_toggle()
    );
    register.set_reload(reload);
    reload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_period_matches_calibration_for_every_setting() {
        for s in config::speed::MIN..=config::speed::MAX {
            let reload = ReloadValue::for_speed(SpeedSetting::clamped(i32::from(s)));
            let expected = (0.03 * 25_000_000.0 / f64::from(s)).round();
            assert_eq!(f64::from(reload.ticks_per_toggle()), expected, "speed {s}");
        }
    }

    #[test]
    fn known_reloads() {
        // 0.3 ms half period
        // 65536 - 7500, 65536 - 41667, 65536 - 831
        assert_eq!(ReloadValue::for_speed(SpeedSetting::DEFAULT).get(), 58_036);
        assert_eq!(ReloadValue::for_speed(SpeedSetting::MIN).get(), 23_869);
        assert_eq!(ReloadValue::for_speed(SpeedSetting::MAX).get(), 64_705);
    }

    #[test]
    fn halves_split_high_and_low_byte() {
        let reload = ReloadValue::for_speed(SpeedSetting::DEFAULT);
        assert_eq!(reload.get(), 0xe2b4);
        assert_eq!(reload.halves(), (0xe2, 0xb4));
    }

    #[test]
    fn configure_writes_register() {
        struct Register(Option<ReloadValue>);

        impl ReloadRegister for Register {
            fn set_reload(&mut self, reload: ReloadValue) {
                self.0 = Some(reload);
            }
        }

        let mut register = Register(None);
        let reload = configure_emulation(&mut register, SpeedSetting::clamped(250));
        assert_eq!(register.0, Some(reload));
        assert_eq!(reload.ticks_per_toggle(), 3_000);
    }
}
