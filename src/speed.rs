//! Speed settings and measured speed readings.

use crate::capture::PulseSample;
use crate::config;

/// A committed speed setting, always within `MIN..=MAX`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedSetting(u16);

impl SpeedSetting {
    pub const MIN: Self = Self(config::speed::MIN);
    pub const MAX: Self = Self(config::speed::MAX);
    pub const DEFAULT: Self = Self(config::speed::DEFAULT);

    /// Clamp an entered value into the valid range.
    pub fn clamped(value: i32) -> Self {
        let clamped = value.clamp(i32::from(config::speed::MIN), i32::from(config::speed::MAX));
        // in range after the clamp above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let clamped = clamped as u16;
        Self(clamped)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for SpeedSetting {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What the home screen shows for the latest measurement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Reading {
    NotMeasured,
    /// Below the display range, including a capture that hit the watchdog.
    AtOrBelow,
    AtOrAbove,
    Speed(f32),
}

impl Reading {
    pub fn from_sample(sample: PulseSample) -> Self {
        if !sample.is_measured() {
            return Reading::NotMeasured;
        }
        Self::from_speed(speed_of(sample))
    }

    pub fn from_speed(speed: f32) -> Self {
        if speed < config::speed::DISPLAY_MIN {
            Reading::AtOrBelow
        } else if speed > config::speed::DISPLAY_MAX {
            Reading::AtOrAbove
        } else {
            Reading::Speed(speed)
        }
    }
}

/// Speed corresponding to a measured pulse.
pub fn speed_of(sample: PulseSample) -> f32 {
    config::speed::CALIBRATION / sample.as_secs()
}
