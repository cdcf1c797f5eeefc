//! 16x2 HD44780 on a 4-bit bus, driven through `hd44780-driver`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use hd44780_driver::bus::FourBitBus;
use hd44780_driver::charset::{CharsetUniversal, EmptyFallback};
use hd44780_driver::memory_map::StandardMemoryMap;
use hd44780_driver::{Direction, HD44780};

use crate::error::{Error, Result};
use crate::rendering::{clamp_cursor, CharDisplay};

/// Driver type for a 16x2 module wired RS, EN, D4..D7 to pins of type `P`
pub type Driver<P> =
    HD44780<FourBitBus<P, P, P, P, P, P>, StandardMemoryMap<16, 2>, EmptyFallback<CharsetUniversal>>;

/// Pairs the driver with the delay every bus transfer needs
pub struct Lcd<P: OutputPin, Dl> {
    driver: Driver<P>,
    delay: Dl,
}

impl<P: OutputPin, Dl> Lcd<P, Dl> {
    /// `driver` must already be initialised
    pub fn new(driver: Driver<P>, delay: Dl) -> Self {
        Self { driver, delay }
    }
}

impl<P, Dl> CharDisplay for Lcd<P, Dl>
where
    P: OutputPin,
    Dl: DelayNs,
{
    fn clear(&mut self) -> Result<()> {
        self.driver.clear(&mut self.delay).map_err(|_| Error::Display)
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<()> {
        self.driver
            .set_cursor_xy(clamp_cursor(col, row), &mut self.delay)
            .map_err(|_| Error::Display)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.driver
            .write_byte(byte, &mut self.delay)
            .map_err(|_| Error::Display)
    }

    fn cursor_left(&mut self) -> Result<()> {
        self.driver
            .shift_cursor(Direction::Left, &mut self.delay)
            .map_err(|_| Error::Display)
    }
}
