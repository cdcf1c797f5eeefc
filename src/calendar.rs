//! Calendar rules used to gate every date-affecting edit.
//!
//! # Ordering contract
//!
//! Each proposed value is checked against the fields *currently stored* in
//! the clock, never against other pending edits:
//!
//! - a day must fit `max_days(current month, current year)`
//! - a month must keep `current day <= max_days(new month, current year)`
//! - a year must keep `current day <= max_days(current month, new year)`
//!
//! A stored date is therefore always valid, but the order in which fields
//! are edited matters. Moving from 31/03 to 30/04 only works day first
//! (31 → 30, then 03 → 04); editing the month first is rejected because
//! April has no 31st. The menu relies on this and shows a rejection instead
//! of storing a transient date such as 30/02.

/// Why a proposed field value was not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// Day is zero or past the end of the stored month
    DayOutOfRange,
    /// Month outside 1–12
    MonthOutOfRange,
    /// The stored day does not exist in the proposed month or year
    DayOverflow,
    /// Weekday outside 1–7
    WeekdayOutOfRange,
    /// The clock hardware refused the value
    Refused,
}

/// Gregorian leap year rule. Year 0 is not special-cased.
pub fn is_leap_year(year: u16) -> bool {
    if year % 400 == 0 {
        return true;
    }
    if year % 100 == 0 {
        return false;
    }
    year % 4 == 0
}

/// Days in `month` of `year`.
///
/// Months outside 1–12 yield 31 rather than an error.
pub fn max_days(month: u8, year: u16) -> u8 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Validates a day-of-month against the stored month and year.
pub fn check_day(day: u32, month: u8, year: u16) -> Result<u8, Rejection> {
    if day >= 1 && day <= u32::from(max_days(month, year)) {
        Ok(day as u8)
    } else {
        Err(Rejection::DayOutOfRange)
    }
}

/// Validates a month against the stored day and year.
pub fn check_month(month: u32, day: u8, year: u16) -> Result<u8, Rejection> {
    if !(1..=12).contains(&month) {
        return Err(Rejection::MonthOutOfRange);
    }
    let month = month as u8;
    if day > max_days(month, year) {
        return Err(Rejection::DayOverflow);
    }
    Ok(month)
}

/// Validates a year against the stored day and month.
///
/// The keypad limits years to four digits, so the value always fits.
pub fn check_year(year: u32, day: u8, month: u8) -> Result<u16, Rejection> {
    let year = u16::try_from(year).map_err(|_| Rejection::DayOverflow)?;
    if day > max_days(month, year) {
        return Err(Rejection::DayOverflow);
    }
    Ok(year)
}

/// Validates a weekday entered as 1–7 and maps it to 0–6.
pub fn check_weekday(weekday: u32) -> Result<u8, Rejection> {
    if (1..=7).contains(&weekday) {
        Ok(weekday as u8 - 1)
    } else {
        Err(Rejection::WeekdayOutOfRange)
    }
}
