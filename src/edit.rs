//! Keypad-driven editor for the clock and the temperature set-point.
//!
//! ```text
//! Root ──1──► Rtc ──8──► Root
//!      ──2──► SetPoint ─► Root
//!      ──3──► Exit
//! ```
//!
//! The only way out is the exit key of the root menu.

use embedded_hal::delay::DelayNs;
use ufmt::uWrite;

use crate::app_state::AppState;
use crate::calendar::Rejection;
use crate::clock::{ClockField, RtcClock};
use crate::error::{Error, Result};
use crate::keypad::{Key, KeyScanner};
use crate::panel::FrontPanel;
use crate::rendering::CharDisplay;
use crate::telemetry::{self, EDIT_MODE_BANNER, EXIT_BANNER, RTC_EDIT_BANNER, SET_POINT_BANNER};

pub const ROOT_MENU: (&str, &str) = ("1)EDIT RTC INFO", "2)E.SET 3)EXIT");
pub const RTC_MENU: (&str, &str) = ("1.H 2.M 3.S 4.D", "5.M 6.Y 7.DAY 8.E");

const RTC_EXIT_KEY: u8 = 8;
const SET_POINT_DIGITS: u8 = 2;
const SET_POINT_BOUND: u32 = 99;

/// Menu level of an edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Menu {
    Root,
    Rtc,
    SetPoint,
    Exit,
}

/// Result of one field edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Updated,
    Rejected(Rejection),
    /// The key did not name a field
    NoField,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Updated => "UPDATED",
            _ => "reject change",
        }
    }
}

/// One pass through the editor, created when the mode switch fires and
/// dropped when the user exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSession {
    menu: Menu,
    last_outcome: Option<Outcome>,
    edits: u16,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            menu: Menu::Root,
            last_outcome: None,
            edits: 0,
        }
    }

    pub fn menu(&self) -> Menu {
        self.menu
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Field edits attempted so far, accepted or not
    pub fn edits(&self) -> u16 {
        self.edits
    }

    /// Runs the editor until the exit key, then clears the interactive flag
    pub fn run<K, D, Dl, S, R>(
        &mut self,
        panel: &mut FrontPanel<K, D, Dl>,
        serial: &mut S,
        rtc: &mut R,
        state: &mut AppState,
    ) -> Result<()>
    where
        K: KeyScanner,
        D: CharDisplay,
        Dl: DelayNs,
        S: uWrite,
        R: RtcClock,
    {
        info!("edit mode entered");
        telemetry::send(serial, EDIT_MODE_BANNER)?;
        panel.menu(ROOT_MENU.0, ROOT_MENU.1)?;

        loop {
            let current = self.menu;
            self.menu = match current {
                Menu::Root => self.root(panel, serial)?,
                Menu::Rtc => {
                    let next = self.rtc_menu(panel, rtc, state)?;
                    panel.menu(ROOT_MENU.0, ROOT_MENU.1)?;
                    next
                }
                Menu::SetPoint => {
                    let next = self.set_point(panel, state)?;
                    panel.menu(ROOT_MENU.0, ROOT_MENU.1)?;
                    next
                }
                Menu::Exit => break,
            };
        }

        state.interactive = false;
        panel.clear()?;
        info!("edit mode left after {=u16} edits", self.edits);
        Ok(())
    }

    fn root<K, D, Dl, S>(&mut self, panel: &mut FrontPanel<K, D, Dl>, serial: &mut S) -> Result<Menu>
    where
        K: KeyScanner,
        D: CharDisplay,
        Dl: DelayNs,
        S: uWrite,
    {
        loop {
            match panel.read_key()? {
                Key::Digit(1) => {
                    telemetry::send(serial, RTC_EDIT_BANNER)?;
                    return Ok(Menu::Rtc);
                }
                Key::Digit(2) => {
                    telemetry::send(serial, SET_POINT_BANNER)?;
                    return Ok(Menu::SetPoint);
                }
                Key::Digit(3) => {
                    telemetry::send(serial, EXIT_BANNER)?;
                    return Ok(Menu::Exit);
                }
                _ => {}
            }
        }
    }

    fn rtc_menu<K, D, Dl, R>(
        &mut self,
        panel: &mut FrontPanel<K, D, Dl>,
        rtc: &mut R,
        state: &mut AppState,
    ) -> Result<Menu>
    where
        K: KeyScanner,
        D: CharDisplay,
        Dl: DelayNs,
        R: RtcClock,
    {
        panel.menu(RTC_MENU.0, RTC_MENU.1)?;
        loop {
            let key = panel.read_key()?;
            if key == Key::Digit(RTC_EXIT_KEY) {
                return Ok(Menu::Root);
            }

            panel.clear()?;
            let outcome = match ClockField::from_menu_key(key.code()) {
                Some(field) => self.edit_field(panel, rtc, state, field)?,
                None => Outcome::NoField,
            };
            self.last_outcome = Some(outcome);

            panel.flash(outcome.message())?;
            panel.menu(RTC_MENU.0, RTC_MENU.1)?;
        }
    }

    fn edit_field<K, D, Dl, R>(
        &mut self,
        panel: &mut FrontPanel<K, D, Dl>,
        rtc: &mut R,
        state: &mut AppState,
        field: ClockField,
    ) -> Result<Outcome>
    where
        K: KeyScanner,
        D: CharDisplay,
        Dl: DelayNs,
        R: RtcClock,
    {
        panel.prompt(field.prompt())?;
        let value = panel.read_number(field.digits(), field.entry_bound())?;
        self.edits = self.edits.saturating_add(1);

        // validate against what the clock holds right now
        let mut clock = rtc.read()?;
        if let Err(rejection) = clock.apply(field, value) {
            debug!("{} = {=u32} rejected: {}", field, value, rejection);
            return Ok(Outcome::Rejected(rejection));
        }
        match rtc.write(&clock) {
            Ok(()) => {
                state.clock = clock;
                Ok(Outcome::Updated)
            }
            Err(Error::Clock) => {
                warn!("clock refused {} = {=u32}", field, value);
                Ok(Outcome::Rejected(Rejection::Refused))
            }
            Err(e) => Err(e),
        }
    }

    fn set_point<K, D, Dl>(&mut self, panel: &mut FrontPanel<K, D, Dl>, state: &mut AppState) -> Result<Menu>
    where
        K: KeyScanner,
        D: CharDisplay,
        Dl: DelayNs,
    {
        panel.prompt("SET TEMP LIM:")?;
        let limit = panel.read_number(SET_POINT_DIGITS, SET_POINT_BOUND)?;
        self.edits = self.edits.saturating_add(1);

        // any two-digit value is taken as is
        state.temperature_limit = limit;
        self.last_outcome = Some(Outcome::Updated);
        info!("temperature limit set to {=u32}", limit);

        panel.flash("LIMIT UPDATED")?;
        Ok(Menu::Root)
    }
}
