use heapless::String;
use ufmt::uwrite;

use crate::clock::ClockState;
use crate::error::{Error, Result};
use crate::sensors::TemperatureUnit;

/// HD44780 code for the degree glyph
pub const DEGREE: u8 = 0xDF;

pub const COLS: u8 = 16;
pub const ROWS: u8 = 2;

/// Cursor position of the time (HH:MM:SS)
pub const TIME_POS: (u8, u8) = (0, 0);
/// Cursor position of the temperature readout
pub const TEMP_POS: (u8, u8) = (9, 0);
/// Cursor position of the date (DD/MM/YYYY)
pub const DATE_POS: (u8, u8) = (0, 1);
/// Cursor position of the weekday abbreviation
pub const WEEKDAY_POS: (u8, u8) = (12, 1);

/// Width reserved for the temperature readout, e.g. `T:45°C`
const TEMP_WIDTH: usize = 7;
/// Width reserved for the date, `DD/MM/YYYY`
const DATE_WIDTH: usize = 10;

/// Character display, 16x2 HD44780 class.
pub trait CharDisplay {
    fn clear(&mut self) -> Result<()>;

    /// Moves the cursor; `col` 0–15, `row` 0–1
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<()>;

    /// Writes one raw character code at the cursor and advances it
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Moves the cursor one cell to the left
    fn cursor_left(&mut self) -> Result<()>;

    fn write_str(&mut self, s: &str) -> Result<()> {
        for byte in s.bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

/// Keeps a cursor position on the 16x2 screen
pub fn clamp_cursor(col: u8, row: u8) -> (u8, u8) {
    (col.min(COLS - 1), row.min(ROWS - 1))
}

/// Basic function for rendering text onto the LCD
/// It only clears the screen when the top line is written to
/// param line: text to render
/// param top_line: if the top line is to be written to
pub fn render_screen<D: CharDisplay>(display: &mut D, line: &str, top_line: bool) -> Result<()> {
    if top_line {
        display.clear()?;
        display.set_cursor(0, 0)?;
    } else {
        display.set_cursor(0, 1)?;
    }
    display.write_str(line)
}

/// Clears the screen and draws a two line menu
pub fn render_menu<D: CharDisplay>(display: &mut D, top: &str, bottom: &str) -> Result<()> {
    render_screen(display, top, true)?;
    render_screen(display, bottom, false)
}

/// Renders time, date and weekday at their fixed positions
pub fn render_clock<D: CharDisplay>(display: &mut D, clock: &ClockState) -> Result<()> {
    display.set_cursor(TIME_POS.0, TIME_POS.1)?;
    display.write_str(&clock.time_formatted())?;

    let date = clock.date_formatted();
    display.set_cursor(DATE_POS.0, DATE_POS.1)?;
    display.write_str(&date)?;
    write_blanks(display, date.len(), DATE_WIDTH)?;

    display.set_cursor(WEEKDAY_POS.0, WEEKDAY_POS.1)?;
    display.write_str(clock.weekday_name())
}

/// Renders the whole-degree temperature with degree glyph and unit letter,
/// blank-padded so a shorter value clears the previous one
pub fn render_temperature<D: CharDisplay>(
    display: &mut D,
    temperature: f32,
    unit: TemperatureUnit,
) -> Result<()> {
    let mut digits: String<8> = String::new();
    uwrite!(&mut digits, "T:{}", temperature as i32).map_err(|_| Error::Format)?;

    display.set_cursor(TEMP_POS.0, TEMP_POS.1)?;
    display.write_str(&digits)?;
    display.write_byte(DEGREE)?;
    display.write_byte(unit.symbol() as u8)?;

    let room = (COLS - TEMP_POS.0) as usize;
    write_blanks(display, digits.len() + 2, TEMP_WIDTH.min(room))
}

/// Blanks the rest of a fixed-width field so a shorter value leaves no
/// stale characters behind
fn write_blanks<D: CharDisplay>(display: &mut D, used: usize, width: usize) -> Result<()> {
    for _ in used..width {
        display.write_byte(b' ')?;
    }
    Ok(())
}

/// Echoes one entered digit at the cursor
pub fn render_digit<D: CharDisplay>(display: &mut D, digit: u8) -> Result<()> {
    display.write_byte(b'0' + digit)
}

/// Erases the character left of the cursor and leaves the cursor there
pub fn erase_last<D: CharDisplay>(display: &mut D) -> Result<()> {
    display.cursor_left()?;
    display.write_byte(b' ')?;
    display.cursor_left()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::vec::Vec;

    /// In-memory 16x2 screen
    pub struct FakeLcd {
        pub cells: [[u8; COLS as usize]; ROWS as usize],
        pub cursor: (u8, u8),
        pub clears: usize,
        /// Every string that was on the top row when the screen was cleared
        pub history: Vec<std::string::String>,
    }

    impl FakeLcd {
        pub fn new() -> Self {
            Self {
                cells: [[b' '; COLS as usize]; ROWS as usize],
                cursor: (0, 0),
                clears: 0,
                history: Vec::new(),
            }
        }

        pub fn row(&self, row: usize) -> std::string::String {
            self.cells[row]
                .iter()
                .map(|&b| if b == DEGREE { '°' } else { b as char })
                .collect::<std::string::String>()
                .trim_end()
                .into()
        }

        /// Top rows seen so far, including the current one
        pub fn screens(&self) -> Vec<std::string::String> {
            let mut seen = self.history.clone();
            seen.push(self.row(0));
            seen
        }
    }

    impl CharDisplay for FakeLcd {
        fn clear(&mut self) -> Result<()> {
            let top = self.row(0);
            if !top.is_empty() {
                self.history.push(top);
            }
            self.cells = [[b' '; COLS as usize]; ROWS as usize];
            self.cursor = (0, 0);
            self.clears += 1;
            Ok(())
        }

        fn set_cursor(&mut self, col: u8, row: u8) -> Result<()> {
            self.cursor = (col, row);
            Ok(())
        }

        fn write_byte(&mut self, byte: u8) -> Result<()> {
            let (col, row) = self.cursor;
            if col < COLS && row < ROWS {
                self.cells[row as usize][col as usize] = byte;
            }
            self.cursor.0 = col.saturating_add(1);
            Ok(())
        }

        fn cursor_left(&mut self) -> Result<()> {
            self.cursor.0 = self.cursor.0.saturating_sub(1);
            Ok(())
        }
    }

    #[test]
    fn clock_layout() {
        let mut lcd = FakeLcd::new();
        render_clock(&mut lcd, &ClockState::default()).unwrap();
        assert_eq!(lcd.row(0), "23:00:00");
        assert_eq!(lcd.row(1), "02/01/2026  FRI");
    }

    #[test]
    fn shorter_year_clears_old_digits() {
        let mut lcd = FakeLcd::new();
        let mut clock = ClockState::default();
        render_clock(&mut lcd, &clock).unwrap();
        clock.year = 987;
        render_clock(&mut lcd, &clock).unwrap();
        assert_eq!(lcd.row(1), "02/01/987   FRI");
    }

    #[test]
    fn temperature_layout() {
        let mut lcd = FakeLcd::new();
        render_clock(&mut lcd, &ClockState::default()).unwrap();
        render_temperature(&mut lcd, 45.9, TemperatureUnit::Celsius).unwrap();
        assert_eq!(lcd.row(0), "23:00:00 T:45°C");

        render_temperature(&mut lcd, 7.2, TemperatureUnit::Fahrenheit).unwrap();
        assert_eq!(lcd.row(0), "23:00:00 T:7°F");
    }

    #[test]
    fn cursor_stays_on_screen() {
        assert_eq!(clamp_cursor(9, 0), TEMP_POS);
        assert_eq!(clamp_cursor(12, 1), WEEKDAY_POS);
        assert_eq!(clamp_cursor(20, 3), (15, 1));
    }

    #[test]
    fn negative_temperature() {
        let mut lcd = FakeLcd::new();
        render_temperature(&mut lcd, -3.7, TemperatureUnit::Celsius).unwrap();
        assert_eq!(lcd.row(0), "         T:-3°C");
    }

    #[test]
    fn menu_and_erase() {
        let mut lcd = FakeLcd::new();
        render_menu(&mut lcd, "1)EDIT RTC INFO", "2)E.SET 3)EXIT").unwrap();
        assert_eq!(lcd.row(0), "1)EDIT RTC INFO");
        assert_eq!(lcd.row(1), "2)E.SET 3)EXIT");

        render_screen(&mut lcd, "SET HOUR:", true).unwrap();
        render_digit(&mut lcd, 1).unwrap();
        render_digit(&mut lcd, 2).unwrap();
        erase_last(&mut lcd).unwrap();
        assert_eq!(lcd.row(0), "SET HOUR:1");
        assert_eq!(lcd.cursor, (10, 0));
    }
}
