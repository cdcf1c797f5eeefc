//! Start-up parameters.

use crate::clock::ClockState;
use crate::sensors::TemperatureUnit;

pub const DEFAULT_TEMP_LIMIT: u32 = 45;

pub const CYCLE_DELAY_MS: u32 = 200; // one display/control/telemetry cycle
pub const MODE_SWITCH_DEBOUNCE_MS: u32 = 50;
pub const KEY_DEBOUNCE_MS: u32 = 10;
pub const MESSAGE_PAUSE_MS: u32 = 500; // confirmation messages stay this long

/// Fixed waits of the polling design
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pub cycle_delay_ms: u32,
    pub mode_switch_debounce_ms: u32,
    pub key_debounce_ms: u32,
    pub message_pause_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            cycle_delay_ms: CYCLE_DELAY_MS,
            mode_switch_debounce_ms: MODE_SWITCH_DEBOUNCE_MS,
            key_debounce_ms: KEY_DEBOUNCE_MS,
            message_pause_ms: MESSAGE_PAUSE_MS,
        }
    }
}

/// BootConfig holds everything the firmware is seeded with at power-up.
/// seed: time and date written to the clock before the first cycle
/// temperature_limit: threshold above which the actuator is released
/// unit: unit used for display, threshold and telemetry
/// seed_clock: whether to overwrite the clock with `seed`; boards with a
/// battery-backed RTC may keep their time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootConfig {
    pub seed: ClockState,
    pub seed_clock: bool,
    pub temperature_limit: u32,
    pub unit: TemperatureUnit,
    pub timing: Timing,
}

impl Default for BootConfig {
    fn default() -> Self {
        BootConfig {
            seed: ClockState::default(), // 23:00:00 Fri 02/01/2026
            seed_clock: true,
            temperature_limit: DEFAULT_TEMP_LIMIT,
            unit: TemperatureUnit::Celsius,
            timing: Timing::default(),
        }
    }
}
