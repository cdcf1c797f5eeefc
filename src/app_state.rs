//! Mutable state shared between the supervisory loop and the editor

use crate::clock::ClockState;
use crate::config::BootConfig;
use crate::sensors::TemperatureUnit;

/// Everything the control loop and the editor read and write.
///
/// Owned by the supervisor and lent to the editor while it runs, so there is
/// exactly one writer at a time. Anything made interrupt-driven later has to
/// move its field behind a critical section.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppState {
    /// Last clock snapshot read from the RTC
    pub clock: ClockState,
    /// Last temperature reading, in `unit`
    pub temperature: f32,
    /// Threshold, in `unit`; written only by the set-point editor
    pub temperature_limit: u32,
    pub unit: TemperatureUnit,
    /// Set by the mode switch, cleared when the editor exits
    pub interactive: bool,
}

impl AppState {
    pub fn new(config: &BootConfig) -> Self {
        Self {
            clock: config.seed,
            temperature: 0.,
            temperature_limit: config.temperature_limit,
            unit: config.unit,
            interactive: false,
        }
    }

    /// Threshold policy: the actuator stays on up to and including the limit
    pub fn actuator_on(&self) -> bool {
        !crate::telemetry::is_over_limit(self.temperature, self.temperature_limit)
    }
}
