//! Front panel: keypad in, LCD out, and the waits between them.

use embedded_hal::delay::DelayNs;

use crate::config::Timing;
use crate::error::Result;
use crate::keypad::{wait_until, EntryStep, Key, KeyScanner, NumberEntry};
use crate::rendering::{self, CharDisplay};

pub struct FrontPanel<K, D, Dl> {
    pub keypad: K,
    pub display: D,
    pub delay: Dl,
    pub timing: Timing,
}

impl<K, D, Dl> FrontPanel<K, D, Dl>
where
    K: KeyScanner,
    D: CharDisplay,
    Dl: DelayNs,
{
    pub fn new(keypad: K, display: D, delay: Dl, timing: Timing) -> Self {
        Self {
            keypad,
            display,
            delay,
            timing,
        }
    }

    /// Blocks until one key has been pressed and released.
    ///
    /// The value is sampled a debounce interval after the press is seen and
    /// the release is awaited before returning, so a held or bouncing key
    /// yields one event. A press that vanishes before the sample is skipped.
    pub fn read_key(&mut self) -> Result<Key> {
        loop {
            let keypad = &mut self.keypad;
            wait_until(|| keypad.is_pressed())?;
            self.delay.delay_ms(self.timing.key_debounce_ms);
            let key = self.keypad.scan()?;
            let keypad = &mut self.keypad;
            wait_until(|| keypad.is_pressed().map(|pressed| !pressed))?;

            if let Some(key) = key {
                trace!("key {=u8}", key.code());
                return Ok(key);
            }
        }
    }

    /// Reads a number of at most `max_digits` digits, finished by enter.
    ///
    /// Accepted digits are echoed at the cursor and backspace erases them.
    /// `max_value` is only the nominal bound of the field being edited; it
    /// is not enforced here, the caller validates the result.
    pub fn read_number(&mut self, max_digits: u8, max_value: u32) -> Result<u32> {
        debug!("number entry: {=u8} digits, nominal max {=u32}", max_digits, max_value);
        let mut entry = NumberEntry::new(max_digits);
        loop {
            let key = self.read_key()?;
            match entry.push(key) {
                EntryStep::Echo(digit) => rendering::render_digit(&mut self.display, digit)?,
                EntryStep::Erase => rendering::erase_last(&mut self.display)?,
                EntryStep::Done(value) => return Ok(value),
                EntryStep::Ignored => {}
            }
        }
    }

    /// Clears the screen and shows a prompt on the top line
    pub fn prompt(&mut self, text: &str) -> Result<()> {
        rendering::render_screen(&mut self.display, text, true)
    }

    pub fn menu(&mut self, top: &str, bottom: &str) -> Result<()> {
        rendering::render_menu(&mut self.display, top, bottom)
    }

    /// Shows `text` alone for the message pause
    pub fn flash(&mut self, text: &str) -> Result<()> {
        rendering::render_screen(&mut self.display, text, true)?;
        self.delay.delay_ms(self.timing.message_pause_ms);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.display.clear()
    }
}
