//! Screen contents.
//!
//! The display is a text grid of 8 rows by 16 columns. Drawing goes through the
//! [`Screen`] trait; the firmware uses [`LogScreen`], which mirrors the grid and
//! logs every row that changes.

use crate::config;
use crate::speed::Reading;
use core::fmt::{self, Write};

/// One row of text, as it appears on the display.
pub type Line = heapless::String<{ config::display::COLUMNS }>;

/// A display row, numbered from 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Row(u8);

impl Row {
    pub const fn new(row: u8) -> Option<Self> {
        if row >= 1 && row <= config::display::ROWS {
            Some(Self(row))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

const TITLE: Row = Row(1);
const ROW_3: Row = Row(3);
const ROW_4: Row = Row(4);
const ROW_5: Row = Row(5);
const ROW_7: Row = Row(7);

pub trait Screen {
    fn clear(&mut self);

    /// Replace the contents of `row`. Text past the last column is dropped.
    fn print_line(&mut self, row: Row, text: &str);
}

/// Builds a [`Line`], dropping whatever does not fit.
struct LineWriter(Line);

impl Write for LineWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Format a row, truncated to the display width.
pub fn line(args: fmt::Arguments<'_>) -> Line {
    let mut writer = LineWriter(Line::new());
    // LineWriter never fails
    let _ = writer.write_fmt(args);
    writer.0
}

/// The home screen. The speed is only shown while measuring.
pub fn home<S: Screen>(screen: &mut S, measuring: bool, reading: Reading) {
    screen.print_line(TITLE, " = RPM BENCH =");
    screen.print_line(ROW_3, " > i: start");
    screen.print_line(ROW_4, " > p: stop");
    screen.print_line(ROW_5, " > r: set RPM");
    if measuring {
        let speed = match reading {
            Reading::NotMeasured => line(format_args!(" RPM = --")),
            Reading::AtOrBelow => line(format_args!(" RPM = <=20.0")),
            Reading::AtOrAbove => line(format_args!(" RPM = >=900.0")),
            Reading::Speed(speed) => line(format_args!(" RPM = {:.2}", speed)),
        };
        screen.print_line(ROW_7, &speed);
    }
}

/// The configuration screen, showing the value entered so far.
pub fn configure<S: Screen>(screen: &mut S, value: i32) {
    screen.print_line(TITLE, " === CONFIG ===");
    screen.print_line(ROW_3, " Enter new RPM");
    screen.print_line(ROW_5, &line(format_args!(" > RPM: {}", value)));
}

pub fn confirm_prompt<S: Screen>(screen: &mut S) {
    screen.print_line(ROW_7, " Confirm with E");
}

pub fn entry_error<S: Screen>(screen: &mut S) {
    screen.print_line(TITLE, " > ERROR !");
    screen.print_line(ROW_3, " > Press E to");
    screen.print_line(ROW_4, " > confirm");
}

/// A screen that only exists in the log.
///
/// Rows are logged when their contents change, so redrawing the same screen
/// every iteration stays quiet.
pub struct LogScreen {
    rows: [Line; config::display::ROWS as usize],
}

impl LogScreen {
    pub fn new() -> Self {
        Self {
            rows: Default::default(),
        }
    }

    pub fn row(&self, row: Row) -> &str {
        &self.rows[row.index()]
    }
}

impl Default for LogScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for LogScreen {
    fn clear(&mut self) {
        self.rows.iter_mut().for_each(Line::clear);
        debug!("screen cleared");
    }

    fn print_line(&mut self, row: Row, text: &str) {
        let text = line(format_args!("{}", text));
        let slot = &mut self.rows[row.index()];
        if *slot != text {
            info!("screen {=u8}: {=str}", row.get(), text.as_str());
            *slot = text;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: u8) -> Row {
        Row::new(n).unwrap()
    }

    #[test]
    fn rows_are_one_based() {
        assert_eq!(Row::new(0), None);
        assert_eq!(Row::new(1).map(Row::get), Some(1));
        assert_eq!(Row::new(8).map(Row::get), Some(8));
        assert_eq!(Row::new(9), None);
    }

    #[test]
    fn lines_are_truncated_to_display_width() {
        let long = line(format_args!(" RPM = {:.2}", 123_456.0_f32));
        assert_eq!(long.as_str(), " RPM = 123456.00");
        let longer = line(format_args!("{}", "0123456789abcdefXYZ"));
        assert_eq!(longer.as_str(), "0123456789abcdef");
    }

    #[test]
    fn home_screen_shows_speed_only_while_measuring() {
        let mut screen = LogScreen::new();
        home(&mut screen, false, Reading::Speed(100.0));
        assert_eq!(screen.row(row(1)), " = RPM BENCH =");
        assert_eq!(screen.row(row(5)), " > r: set RPM");
        assert_eq!(screen.row(row(7)), "");

        home(&mut screen, true, Reading::Speed(100.0));
        assert_eq!(screen.row(row(7)), " RPM = 100.00");
    }

    #[test]
    fn out_of_range_readings() {
        let mut screen = LogScreen::new();
        for (reading, text) in [
            (Reading::NotMeasured, " RPM = --"),
            (Reading::from_speed(19.9), " RPM = <=20.0"),
            (Reading::from_speed(20.0), " RPM = 20.00"),
            (Reading::from_speed(900.0), " RPM = 900.00"),
            (Reading::from_speed(900.1), " RPM = >=900.0"),
        ] {
            home(&mut screen, true, reading);
            assert_eq!(screen.row(row(7)), text);
        }
    }

    #[test]
    fn config_and_error_screens() {
        let mut screen = LogScreen::new();
        configure(&mut screen, 42);
        confirm_prompt(&mut screen);
        assert_eq!(screen.row(row(1)), " === CONFIG ===");
        assert_eq!(screen.row(row(5)), " > RPM: 42");
        assert_eq!(screen.row(row(7)), " Confirm with E");

        screen.clear();
        entry_error(&mut screen);
        assert_eq!(screen.row(row(1)), " > ERROR !");
        assert_eq!(screen.row(row(4)), " > confirm");
        assert_eq!(screen.row(row(7)), "");
    }
}
