//! 4x4 matrix keypad decoding and numeric entry.

use embedded_hal::digital::{Error as _, InputPin, OutputPin};

use crate::error::{Error, Result};

/// Row-major key codes of the 4x4 matrix
pub const KEYMAP: [[u8; 4]; 4] = [[0, 1, 2, 3], [4, 5, 6, 7], [8, 9, 10, 11], [12, 13, 14, 15]];

pub const BACKSPACE: u8 = 14;
pub const ENTER: u8 = 15;

/// A decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    Digit(u8),
    Backspace,
    Enter,
    /// Codes 10–13, which have no function
    Other(u8),
}

impl Key {
    pub fn from_code(code: u8) -> Self {
        match code {
            0..=9 => Key::Digit(code),
            BACKSPACE => Key::Backspace,
            ENTER => Key::Enter,
            other => Key::Other(other),
        }
    }

    pub fn code(&self) -> u8 {
        match *self {
            Key::Digit(d) => d,
            Key::Backspace => BACKSPACE,
            Key::Enter => ENTER,
            Key::Other(code) => code,
        }
    }
}

/// Decodes one row-scan snapshot.
///
/// `row` is the row currently driven low, `columns` the four column levels
/// (bit n = column n, 1 = high). Columns are active low; the lowest pulled
/// column wins. Returns `None` when no column is low or the row is outside
/// the matrix.
pub fn key_from_snapshot(row: usize, columns: u8) -> Option<Key> {
    let keys = KEYMAP.get(row)?;
    (0..4)
        .find(|col| columns & (1 << col) == 0)
        .map(|col| Key::from_code(keys[col]))
}

/// Narrow capability over the keypad hardware.
pub trait KeyScanner {
    /// True while any key is held down
    fn is_pressed(&mut self) -> Result<bool>;

    /// Identifies the key held down, if any
    fn scan(&mut self) -> Result<Option<Key>>;
}

/// Keypad wired as four row outputs and four pulled-up column inputs.
pub struct KeypadMatrix<R, C> {
    rows: [R; 4],
    cols: [C; 4],
}

impl<R, C> KeypadMatrix<R, C>
where
    R: OutputPin,
    C: InputPin,
{
    /// Takes the pins and drives every row low so a press shows on a column
    pub fn new(rows: [R; 4], cols: [C; 4]) -> Result<Self> {
        let mut keypad = Self { rows, cols };
        keypad.drive_all_low()?;
        Ok(keypad)
    }

    fn drive_all_low(&mut self) -> Result<()> {
        for row in self.rows.iter_mut() {
            row.set_low().map_err(|e| Error::Keypad(e.kind()))?;
        }
        Ok(())
    }

    /// Column levels packed as bits, 1 = high
    fn column_levels(&mut self) -> Result<u8> {
        let mut levels = 0;
        for (i, col) in self.cols.iter_mut().enumerate() {
            if col.is_high().map_err(|e| Error::Keypad(e.kind()))? {
                levels |= 1 << i;
            }
        }
        Ok(levels)
    }
}

impl<R, C> KeyScanner for KeypadMatrix<R, C>
where
    R: OutputPin,
    C: InputPin,
{
    fn is_pressed(&mut self) -> Result<bool> {
        Ok(self.column_levels()? != 0x0F)
    }

    fn scan(&mut self) -> Result<Option<Key>> {
        let mut found = None;
        for active in 0..4 {
            for (i, row) in self.rows.iter_mut().enumerate() {
                let res = if i == active { row.set_low() } else { row.set_high() };
                res.map_err(|e| Error::Keypad(e.kind()))?;
            }
            let levels = self.column_levels()?;
            if let Some(key) = key_from_snapshot(active, levels) {
                found = Some(key);
                break;
            }
        }
        self.drive_all_low()?;
        Ok(found)
    }
}

/// Spins until `done` reports true. There is no timeout: a stuck line
/// hangs the caller.
pub fn wait_until<F>(mut done: F) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    while !done()? {}
    Ok(())
}

/// What a key did to a [`NumberEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryStep {
    /// Digit accepted, echo it
    Echo(u8),
    /// Last digit removed, erase it from the screen
    Erase,
    /// Entry finished with the given value
    Done(u32),
    Ignored,
}

/// Pending numeric-entry buffer.
///
/// Bounded by digit count only; range checks are the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberEntry {
    value: u32,
    count: u8,
    max_digits: u8,
}

impl NumberEntry {
    pub fn new(max_digits: u8) -> Self {
        Self {
            value: 0,
            count: 0,
            max_digits,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn digits(&self) -> u8 {
        self.count
    }

    pub fn push(&mut self, key: Key) -> EntryStep {
        match key {
            Key::Digit(d) if self.count < self.max_digits => {
                self.value = self.value * 10 + u32::from(d);
                self.count += 1;
                EntryStep::Echo(d)
            }
            Key::Backspace if self.count > 0 => {
                self.value /= 10;
                self.count -= 1;
                EntryStep::Erase
            }
            Key::Enter => EntryStep::Done(self.value),
            _ => EntryStep::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::cell::Cell;
    use std::rc::Rc;

    fn feed(max_digits: u8, keys: &[u8]) -> Option<u32> {
        let mut entry = NumberEntry::new(max_digits);
        keys.iter().find_map(|&k| match entry.push(Key::from_code(k)) {
            EntryStep::Done(v) => Some(v),
            _ => None,
        })
    }

    #[test]
    fn digits_then_enter() {
        // The nominal bound is never applied here
        assert_eq!(feed(2, &[2, 3, ENTER]), Some(23));
    }

    #[test]
    fn backspace_removes_last_digit() {
        assert_eq!(feed(2, &[1, 2, BACKSPACE, ENTER]), Some(1));
    }

    #[test]
    fn backspace_on_empty_entry_is_ignored() {
        let mut entry = NumberEntry::new(2);
        assert_eq!(entry.push(Key::Backspace), EntryStep::Ignored);
        assert_eq!(entry.digits(), 0);
        assert_eq!(feed(2, &[BACKSPACE, 7, ENTER]), Some(7));
    }

    #[test]
    fn digits_past_budget_are_dropped() {
        let mut entry = NumberEntry::new(2);
        entry.push(Key::Digit(9));
        entry.push(Key::Digit(8));
        assert_eq!(entry.push(Key::Digit(7)), EntryStep::Ignored);
        assert_eq!(entry.value(), 98);
        assert_eq!(feed(4, &[2, 0, 2, 4, 5, ENTER]), Some(2024));
    }

    #[test]
    fn enter_without_digits_yields_zero() {
        assert_eq!(feed(2, &[ENTER]), Some(0));
    }

    #[test]
    fn function_keys_are_ignored() {
        assert_eq!(feed(2, &[10, 4, 11, 12, 13, ENTER]), Some(4));
    }

    #[test]
    fn snapshot_decodes_every_key() {
        for row in 0..4 {
            for col in 0..4 {
                let columns = 0x0F & !(1 << col);
                let key = key_from_snapshot(row, columns).unwrap();
                assert_eq!(key.code(), KEYMAP[row][col]);
            }
        }
    }

    #[test]
    fn snapshot_without_low_column_is_none() {
        assert_eq!(key_from_snapshot(0, 0x0F), None);
        assert_eq!(key_from_snapshot(4, 0x00), None);
    }

    #[test]
    fn key_codes() {
        assert_eq!(Key::from_code(14), Key::Backspace);
        assert_eq!(Key::from_code(15), Key::Enter);
        assert_eq!(Key::from_code(5), Key::Digit(5));
        assert_eq!(Key::from_code(12), Key::Other(12));
    }

    /// Row pin that publishes its level into a shared bitmask
    struct Row {
        index: usize,
        driven_low: Rc<Cell<u8>>,
    }

    impl ErrorType for Row {
        type Error = Infallible;
    }

    impl OutputPin for Row {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            self.driven_low.set(self.driven_low.get() | 1 << self.index);
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            self.driven_low.set(self.driven_low.get() & !(1 << self.index));
            Ok(())
        }
    }

    /// Column pin that reads low when the held key's row is driven low
    struct Col {
        index: usize,
        driven_low: Rc<Cell<u8>>,
        held: Rc<Cell<Option<(usize, usize)>>>,
    }

    impl ErrorType for Col {
        type Error = Infallible;
    }

    impl InputPin for Col {
        fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(match self.held.get() {
                Some((row, col)) => col == self.index && self.driven_low.get() & (1 << row) != 0,
                None => false,
            })
        }
    }

    fn matrix() -> (KeypadMatrix<Row, Col>, Rc<Cell<Option<(usize, usize)>>>, Rc<Cell<u8>>) {
        let driven_low = Rc::new(Cell::new(0));
        let held = Rc::new(Cell::new(None));
        let rows = [0, 1, 2, 3].map(|index| Row {
            index,
            driven_low: driven_low.clone(),
        });
        let cols = [0, 1, 2, 3].map(|index| Col {
            index,
            driven_low: driven_low.clone(),
            held: held.clone(),
        });
        (KeypadMatrix::new(rows, cols).unwrap(), held, driven_low)
    }

    #[test]
    fn matrix_scans_held_key() {
        let (mut keypad, held, driven_low) = matrix();
        assert!(!keypad.is_pressed().unwrap());

        held.set(Some((3, 2)));
        assert!(keypad.is_pressed().unwrap());
        assert_eq!(keypad.scan().unwrap(), Some(Key::Backspace));
        // rows are parked low again for the next press
        assert_eq!(driven_low.get(), 0x0F);

        held.set(Some((2, 1)));
        assert_eq!(keypad.scan().unwrap(), Some(Key::Digit(9)));

        held.set(None);
        assert_eq!(keypad.scan().unwrap(), None);
    }

    #[test]
    fn wait_until_spins_until_ready() {
        let mut polls = 0;
        wait_until(|| {
            polls += 1;
            Ok(polls == 5)
        })
        .unwrap();
        assert_eq!(polls, 5);
    }

    #[test]
    fn wait_until_propagates_faults() {
        let res = wait_until(|| Err(Error::Sensor));
        assert_eq!(res, Err(Error::Sensor));
    }
}
