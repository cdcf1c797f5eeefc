use heapless::String;
use ufmt::uwrite;

use crate::calendar::{self, Rejection};
use crate::error::{Error, Result};

/// Abbreviated weekday names, indexed by `ClockState::weekday`
pub const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// ClockState is a snapshot of the real-time clock.
/// hour: 0–23
/// minute, second: 0–59
/// day: 1–31, bounded by `calendar::max_days(month, year)`
/// month: 1–12
/// weekday: 0–6, Sunday first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
    pub weekday: u8,
}

impl Default for ClockState {
    fn default() -> Self {
        // 23:00:00 Fri 02/01/2026
        ClockState {
            hour: 23,
            minute: 0,
            second: 0,
            day: 2,
            month: 1,
            year: 2026,
            weekday: 5,
        }
    }
}

/// Clock fields that can be edited from the keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockField {
    Hour,
    Minute,
    Second,
    Day,
    Month,
    Year,
    Weekday,
}

impl ClockField {
    /// Maps an RTC submenu key (1–7) to its field
    pub fn from_menu_key(key: u8) -> Option<Self> {
        match key {
            1 => Some(ClockField::Hour),
            2 => Some(ClockField::Minute),
            3 => Some(ClockField::Second),
            4 => Some(ClockField::Day),
            5 => Some(ClockField::Month),
            6 => Some(ClockField::Year),
            7 => Some(ClockField::Weekday),
            _ => None,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            ClockField::Hour => "SET HOUR:",
            ClockField::Minute => "SET MIN:",
            ClockField::Second => "SET SEC:",
            ClockField::Day => "SET DATE:",
            ClockField::Month => "SET MONTH:",
            ClockField::Year => "SET YEAR:",
            ClockField::Weekday => "SET DAY(1-7):",
        }
    }

    /// Keypad digit budget for the field
    pub fn digits(&self) -> u8 {
        match self {
            ClockField::Year => 4,
            ClockField::Weekday => 1,
            _ => 2,
        }
    }

    /// Nominal upper bound handed to the number entry. Not enforced there.
    pub fn entry_bound(&self) -> u32 {
        match self {
            ClockField::Hour => 23,
            ClockField::Minute | ClockField::Second => 59,
            ClockField::Day => 31,
            ClockField::Month => 12,
            ClockField::Year => 2099,
            ClockField::Weekday => 7,
        }
    }
}

impl ClockState {
    /// Commits `value` to `field` if the calendar rules allow it.
    ///
    /// Hour, minute and second are stored as entered, even past 23/59.
    /// Date fields follow the ordering contract in [`crate::calendar`].
    /// On rejection the state is left untouched.
    pub fn apply(&mut self, field: ClockField, value: u32) -> core::result::Result<(), Rejection> {
        match field {
            ClockField::Hour => self.hour = value as u8,
            ClockField::Minute => self.minute = value as u8,
            ClockField::Second => self.second = value as u8,
            ClockField::Day => self.day = calendar::check_day(value, self.month, self.year)?,
            ClockField::Month => self.month = calendar::check_month(value, self.day, self.year)?,
            ClockField::Year => self.year = calendar::check_year(value, self.day, self.month)?,
            ClockField::Weekday => self.weekday = calendar::check_weekday(value)?,
        }
        if matches!(field, ClockField::Hour | ClockField::Minute | ClockField::Second)
            && (self.hour > 23 || self.minute > 59 || self.second > 59)
        {
            warn!(
                "time field committed out of range: {=u8}:{=u8}:{=u8}",
                self.hour, self.minute, self.second
            );
        }
        Ok(())
    }

    /// Increments by 1 second, rolling over minutes, hours, days, months and years
    pub fn tick(&mut self) {
        self.second += 1;
        if self.second < 60 {
            return;
        }
        self.second = 0;

        self.minute += 1;
        if self.minute < 60 {
            return;
        }
        self.minute = 0;

        self.hour += 1;
        if self.hour < 24 {
            return;
        }
        self.hour = 0;

        self.weekday = (self.weekday + 1) % 7;
        self.day += 1;
        if self.day <= calendar::max_days(self.month, self.year) {
            return;
        }
        self.day = 1;

        self.month += 1;
        if self.month <= 12 {
            return;
        }
        self.month = 1;
        self.year = self.year.wrapping_add(1);
    }

    /// Weekday abbreviation, `"???"` when the weekday is out of range
    pub fn weekday_name(&self) -> &'static str {
        WEEKDAYS.get(self.weekday as usize).copied().unwrap_or("???")
    }

    /// Gets the time in the HH:MM:SS format
    pub fn time_formatted(&self) -> String<8> {
        let mut time: String<8> = String::new();
        let written = uwrite!(
            &mut time,
            "{}:{}:{}",
            pad_number(self.hour).as_str(),
            pad_number(self.minute).as_str(),
            pad_number(self.second).as_str()
        );
        // three padded pairs plus separators fill the buffer exactly
        debug_assert!(written.is_ok());
        time
    }

    /// Gets the date in the DD/MM/YYYY format; the year is printed unpadded
    pub fn date_formatted(&self) -> String<11> {
        let mut date: String<11> = String::new();
        let written = uwrite!(
            &mut date,
            "{}/{}/{}",
            pad_number(self.day).as_str(),
            pad_number(self.month).as_str(),
            self.year
        );
        // a u16 year is at most five digits
        debug_assert!(written.is_ok());
        date
    }
}

/// Pads a number with a zero before it if < 10
/// Values of 100 and above keep only their last two digits, which is what a
/// two-character field can show
pub fn pad_number(num: u8) -> String<2> {
    let num = num % 100;
    let mut padded = String::new();
    let pushed = padded
        .push((b'0' + num / 10) as char)
        .and_then(|()| padded.push((b'0' + num % 10) as char));
    debug_assert!(pushed.is_ok());
    padded
}

/// Access to the real-time clock registers.
pub trait RtcClock {
    fn read(&mut self) -> Result<ClockState>;
    fn write(&mut self, clock: &ClockState) -> Result<()>;
}

/// Clock kept in RAM, for boards without an RTC and for host runs.
///
/// The owner calls [`SoftRtc::tick`] once per elapsed second.
pub struct SoftRtc {
    clock: ClockState,
}

impl SoftRtc {
    pub fn new(seed: ClockState) -> Self {
        Self { clock: seed }
    }

    pub fn tick(&mut self) {
        self.clock.tick();
    }
}

impl RtcClock for SoftRtc {
    fn read(&mut self) -> Result<ClockState> {
        Ok(self.clock)
    }

    fn write(&mut self, clock: &ClockState) -> Result<()> {
        if clock.month == 0 || clock.month > 12 {
            return Err(Error::Clock);
        }
        self.clock = *clock;
        Ok(())
    }
}
