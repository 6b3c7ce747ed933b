//! Speed setting entry.
//!
//! A new setting is typed as three characters on the command port and committed
//! with a confirmation character. Anything else shows an error screen for a few
//! seconds and leaves the current setting in place.

use crate::config;
use crate::display::{self, Screen};
use crate::speed::SpeedSetting;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::serial;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The entry was followed by this byte instead of the confirmation character.
    Unconfirmed(u8),
    /// The command port failed while reading.
    Port(E),
}

/// Parse the leading decimal number of `digits`.
///
/// Leading spaces and one sign are accepted, parsing stops at the first
/// non-digit, and no digits at all yields 0.
pub fn parse_decimal(digits: &[u8]) -> i32 {
    let mut rest = digits;
    while let [b' ' | b'\t', tail @ ..] = rest {
        rest = tail;
    }
    let negative = match rest {
        [b'-', tail @ ..] => {
            rest = tail;
            true
        }
        [b'+', tail @ ..] => {
            rest = tail;
            false
        }
        _ => false,
    };
    let magnitude = rest
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .fold(0i32, |acc, c| {
            acc.saturating_mul(10).saturating_add(i32::from(c - b'0'))
        });
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Run one entry on `port`, drawing on `screen`.
///
/// Blocks until all characters have been received.
pub fn run<P, S, D>(
    port: &mut P,
    screen: &mut S,
    delay: &mut D,
) -> Result<SpeedSetting, Error<P::Error>>
where
    P: serial::Read<u8>,
    S: Screen,
    D: DelayMs<u32>,
{
    let mut entry = [0u8; config::wizard::ENTRY_LEN];

    screen.clear();
    display::configure(screen, 0);
    for i in 0..entry.len() {
        entry[i] = nb::block!(port.read()).map_err(Error::Port)?;
        display::configure(screen, parse_decimal(&entry[..=i]));
    }

    display::confirm_prompt(screen);
    let confirm = nb::block!(port.read()).map_err(Error::Port)?;
    if confirm != config::wizard::CONFIRM {
        screen.clear();
        display::entry_error(screen);
        delay.delay_ms(config::wizard::ERROR_HOLD_MS);
        return Err(Error::Unconfirmed(confirm));
    }

    Ok(SpeedSetting::clamped(parse_decimal(&entry)))
}
