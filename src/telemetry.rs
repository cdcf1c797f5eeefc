//! Serial status lines and the policy deciding when to send them.
//!
//! A line goes out when the minute differs from the last reported one
//! (heartbeat), and on *every* cycle while the temperature is over the
//! limit. A sustained over-limit condition therefore floods the link at the
//! cycle rate until the temperature drops.

use ufmt::{uWrite, uwrite};

use crate::clock::{pad_number, ClockState};
use crate::error::{Error, Result};
use crate::sensors::TemperatureUnit;

pub const EDIT_MODE_BANNER: &str = "\r\n*** Time Editing Mode Activated ***\r\n";
pub const RTC_EDIT_BANNER: &str = "*** RTC EDIT MODE ***\r\n";
pub const SET_POINT_BANNER: &str = "*** SET POINT EDIT MODE ***\r\n";
pub const EXIT_BANNER: &str = "*** EXIT EDIT MODE ***\r\n";

/// Why a status line was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Emit {
    /// First report of a new minute
    Heartbeat,
    /// Temperature over the limit on this cycle
    OverLimit,
}

/// Tracks the last minute a status line was sent for
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryPolicy {
    last_minute: Option<u8>,
}

impl TelemetryPolicy {
    pub fn new() -> Self {
        Self { last_minute: None }
    }

    pub fn last_minute(&self) -> Option<u8> {
        self.last_minute
    }

    /// Decides whether this cycle emits, recording the minute on heartbeat
    pub fn evaluate(&mut self, minute: u8, over_limit: bool) -> Option<Emit> {
        if self.last_minute != Some(minute) {
            self.last_minute = Some(minute);
            Some(Emit::Heartbeat)
        } else if over_limit {
            Some(Emit::OverLimit)
        } else {
            None
        }
    }
}

/// True when `temperature` is strictly above `limit`
pub fn is_over_limit(temperature: f32, limit: u32) -> bool {
    temperature > limit as f32
}

/// Writes `value` with two decimals, truncated rather than rounded
fn write_hundredths<W: uWrite>(w: &mut W, value: f32) -> core::result::Result<(), W::Error> {
    let mut value = value;
    if value < 0. {
        w.write_char('-')?;
        value = -value;
    }
    let whole = value as u32;
    uwrite!(w, "{}.", whole)?;
    let mut frac = value - whole as f32;
    for _ in 0..2 {
        frac *= 10.;
        let digit = (frac as u8).min(9);
        w.write_char((b'0' + digit) as char)?;
        frac -= digit as f32;
    }
    Ok(())
}

/// Writes one status line, `\r\n` included, straight to `w`; nothing is
/// buffered, so the line length is not bounded here
pub fn write_status_line<W: uWrite>(
    w: &mut W,
    temperature: f32,
    limit: u32,
    unit: TemperatureUnit,
    clock: &ClockState,
) -> core::result::Result<(), W::Error> {
    let over = is_over_limit(temperature, limit);
    w.write_str(if over { "[ALERT] " } else { "[INFO] " })?;
    w.write_str("Temp: ")?;
    write_hundredths(w, temperature)?;
    uwrite!(
        w,
        " {} | {}:{}:{} {}/{}/{}",
        unit.symbol(),
        pad_number(clock.hour).as_str(),
        pad_number(clock.minute).as_str(),
        pad_number(clock.second).as_str(),
        pad_number(clock.day).as_str(),
        pad_number(clock.month).as_str(),
        clock.year
    )?;
    if over {
        w.write_str(" **OVER TEMP**")?;
    }
    w.write_str("\r\n")
}

/// Sends `text` over the serial link
pub fn send<S: uWrite>(serial: &mut S, text: &str) -> Result<()> {
    serial.write_str(text).map_err(|_| Error::Serial)
}
