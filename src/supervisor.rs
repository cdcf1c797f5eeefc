//! Supervisory control loop.
//!
//! One [`Supervisor::step`] is one display/control/telemetry cycle:
//!
//! 1. poll the edit switch (active low) and latch interactive mode
//! 2. normal mode: read clock and temperature, refresh the LCD, drive the
//!    actuator, maybe send a status line
//! 3. interactive mode: hand the whole cycle to the editor until it exits
//! 4. wait the cycle delay
//!
//! Every wait is a blocking spin or a fixed delay; nothing preempts a cycle.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, InputPin, OutputPin};
use ufmt::uWrite;

use crate::app_state::AppState;
use crate::clock::RtcClock;
use crate::config::BootConfig;
use crate::edit::EditSession;
use crate::error::{Error, Result};
use crate::keypad::KeyScanner;
use crate::panel::FrontPanel;
use crate::rendering::{self, CharDisplay};
use crate::sensors::TemperatureSensor;
use crate::telemetry::{self, Emit, TelemetryPolicy};

/// What a cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cycle {
    /// Normal mode, with the status line sent this cycle if any
    Monitored(Option<Emit>),
    /// The editor ran and has exited
    Edited,
}

pub struct Supervisor<K, D, Dl, S, R, T, M, A> {
    pub panel: FrontPanel<K, D, Dl>,
    pub serial: S,
    pub rtc: R,
    pub sensor: T,
    pub mode_switch: M,
    pub actuator: A,
    state: AppState,
    telemetry: TelemetryPolicy,
}

impl<K, D, Dl, S, R, T, M, A> Supervisor<K, D, Dl, S, R, T, M, A>
where
    K: KeyScanner,
    D: CharDisplay,
    Dl: DelayNs,
    S: uWrite,
    R: RtcClock,
    T: TemperatureSensor,
    M: InputPin,
    A: OutputPin,
{
    /// Seeds the clock (if configured), clears the LCD and sets the actuator
    /// for the initial state
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        panel: FrontPanel<K, D, Dl>,
        serial: S,
        rtc: R,
        sensor: T,
        mode_switch: M,
        actuator: A,
        config: &BootConfig,
    ) -> Result<Self> {
        let mut supervisor = Self {
            panel,
            serial,
            rtc,
            sensor,
            mode_switch,
            actuator,
            state: AppState::new(config),
            telemetry: TelemetryPolicy::new(),
        };

        if config.seed_clock {
            supervisor.rtc.write(&config.seed)?;
        }
        supervisor.state.clock = supervisor.rtc.read()?;
        supervisor.panel.clear()?;
        supervisor.drive_actuator()?;

        info!(
            "supervisor ready, limit {=u32}, cycle {=u32}ms",
            config.temperature_limit, config.timing.cycle_delay_ms
        );
        Ok(supervisor)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn telemetry(&self) -> &TelemetryPolicy {
        &self.telemetry
    }

    /// Runs one cycle, cycle delay included
    pub fn step(&mut self) -> Result<Cycle> {
        let cycle = self.cycle()?;
        self.panel.delay.delay_ms(self.panel.timing.cycle_delay_ms);
        Ok(cycle)
    }

    /// Runs forever. A faulted cycle is logged and the loop carries on.
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.step() {
                error!("cycle failed: {}", e);
                self.panel.delay.delay_ms(self.panel.timing.cycle_delay_ms);
            }
        }
    }

    fn cycle(&mut self) -> Result<Cycle> {
        if self.mode_switch.is_low().map_err(|e| Error::ModeSwitch(e.kind()))? {
            self.panel.delay.delay_ms(self.panel.timing.mode_switch_debounce_ms);
            self.state.interactive = true;
        }

        if self.state.interactive {
            let mut session = EditSession::new();
            session.run(&mut self.panel, &mut self.serial, &mut self.rtc, &mut self.state)?;
            return Ok(Cycle::Edited);
        }

        self.monitor().map(Cycle::Monitored)
    }

    fn monitor(&mut self) -> Result<Option<Emit>> {
        self.state.clock = self.rtc.read()?;
        rendering::render_clock(&mut self.panel.display, &self.state.clock)?;

        self.state.temperature = self.sensor.read(self.state.unit)?;
        rendering::render_temperature(&mut self.panel.display, self.state.temperature, self.state.unit)?;

        self.drive_actuator()?;

        let over = telemetry::is_over_limit(self.state.temperature, self.state.temperature_limit);
        let emit = self.telemetry.evaluate(self.state.clock.minute, over);
        if let Some(reason) = emit {
            telemetry::write_status_line(
                &mut self.serial,
                self.state.temperature,
                self.state.temperature_limit,
                self.state.unit,
                &self.state.clock,
            )
            .map_err(|_| Error::Serial)?;
            if reason == Emit::OverLimit {
                warn!("over limit, reporting every cycle");
            }
        }
        Ok(emit)
    }

    /// Asserts the actuator while the temperature is at or below the limit
    fn drive_actuator(&mut self) -> Result<()> {
        let res = if self.state.actuator_on() {
            self.actuator.set_high()
        } else {
            self.actuator.set_low()
        };
        res.map_err(|e| Error::Actuator(e.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockState, SoftRtc};
    use crate::keypad::ENTER;
    use crate::panel::tests::{panel, CountingDelay, ScriptedKeypad};
    use crate::rendering::tests::FakeLcd;
    use crate::sensors::TemperatureUnit;
    use crate::telemetry::tests::RecordingSerial;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::vec::Vec;

    /// Push button to ground; reads low while pressed
    struct Switch(Rc<Cell<bool>>);

    impl ErrorType for Switch {
        type Error = Infallible;
    }

    impl InputPin for Switch {
        fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(!self.0.get())
        }

        fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(self.0.get())
        }
    }

    /// Output line that remembers its level
    struct Line(Rc<Cell<Option<bool>>>);

    impl ErrorType for Line {
        type Error = Infallible;
    }

    impl OutputPin for Line {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            self.0.set(Some(false));
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            self.0.set(Some(true));
            Ok(())
        }
    }

    /// Sensor replaying readings, repeating the last one
    struct Readings(Vec<f32>);

    impl TemperatureSensor for Readings {
        fn read(&mut self, _unit: TemperatureUnit) -> Result<f32> {
            if self.0.len() > 1 {
                Ok(self.0.remove(0))
            } else {
                self.0.first().copied().ok_or(Error::Sensor)
            }
        }
    }

    type TestSupervisor =
        Supervisor<ScriptedKeypad, FakeLcd, CountingDelay, RecordingSerial, SoftRtc, Readings, Switch, Line>;

    struct Rig {
        sup: TestSupervisor,
        switch: Rc<Cell<bool>>,
        led: Rc<Cell<Option<bool>>>,
    }

    fn rig(keys: &[u8], readings: &[f32], seed: ClockState) -> Rig {
        let switch = Rc::new(Cell::new(false));
        let led = Rc::new(Cell::new(None));
        let config = BootConfig {
            seed,
            ..BootConfig::default()
        };
        let sup = Supervisor::new(
            panel(keys),
            RecordingSerial::default(),
            SoftRtc::new(ClockState::default()),
            Readings(readings.to_vec()),
            Switch(switch.clone()),
            Line(led.clone()),
            &config,
        )
        .unwrap();
        Rig { sup, switch, led }
    }

    fn at_minute(minute: u8) -> ClockState {
        ClockState {
            hour: 10,
            minute,
            second: 0,
            ..ClockState::default()
        }
    }

    #[test]
    fn boot_seeds_clock_and_asserts_actuator() {
        let r = rig(&[], &[20.], at_minute(10));
        assert_eq!(r.sup.state().clock, at_minute(10));
        assert_eq!(r.led.get(), Some(true));
        assert_eq!(r.sup.telemetry().last_minute(), None);
    }

    #[test]
    fn heartbeat_once_per_minute() {
        let mut r = rig(&[], &[40.], at_minute(10));
        assert_eq!(r.sup.step().unwrap(), Cycle::Monitored(Some(Emit::Heartbeat)));
        assert_eq!(r.sup.step().unwrap(), Cycle::Monitored(None));

        r.sup.rtc.write(&at_minute(11)).unwrap();
        assert_eq!(r.sup.step().unwrap(), Cycle::Monitored(Some(Emit::Heartbeat)));
        assert_eq!(
            r.sup.serial.lines(),
            [
                "[INFO] Temp: 40.00 C | 10:10:00 02/01/2026",
                "[INFO] Temp: 40.00 C | 10:11:00 02/01/2026",
            ]
        );
        assert_eq!(r.led.get(), Some(true));
    }

    #[test]
    fn over_limit_floods_and_releases_actuator() {
        let mut r = rig(&[], &[40., 50.], at_minute(10));
        r.sup.step().unwrap();
        assert_eq!(r.led.get(), Some(true));

        for _ in 0..3 {
            assert_eq!(r.sup.step().unwrap(), Cycle::Monitored(Some(Emit::OverLimit)));
            assert_eq!(r.led.get(), Some(false));
        }
        let lines = r.sup.serial.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "[ALERT] Temp: 50.00 C | 10:10:00 02/01/2026 **OVER TEMP**");
    }

    #[test]
    fn at_limit_is_not_over() {
        let mut r = rig(&[], &[45.], at_minute(10));
        r.sup.step().unwrap();
        assert_eq!(r.sup.step().unwrap(), Cycle::Monitored(None));
        assert_eq!(r.led.get(), Some(true));
    }

    #[test]
    fn display_shows_clock_and_temperature() {
        let mut r = rig(&[], &[23.6], at_minute(10));
        r.sup.step().unwrap();
        assert_eq!(r.sup.panel.display.row(0), "10:10:00 T:23°C");
        assert_eq!(r.sup.panel.display.row(1), "02/01/2026  FRI");
    }

    #[test]
    fn mode_switch_hands_cycle_to_editor() {
        let mut r = rig(&[2, 5, 0, ENTER, 3], &[48.], at_minute(10));
        r.switch.set(true);
        assert_eq!(r.sup.step().unwrap(), Cycle::Edited);
        assert!(!r.sup.state().interactive);
        assert_eq!(r.sup.state().temperature_limit, 50);
        // no status line while editing
        assert!(!r.sup.serial.text.contains("Temp:"));

        r.switch.set(false);
        assert_eq!(r.sup.step().unwrap(), Cycle::Monitored(Some(Emit::Heartbeat)));
        assert_eq!(r.led.get(), Some(true));
        assert!(r.sup.serial.text.ends_with("[INFO] Temp: 48.00 C | 10:10:00 02/01/2026\r\n"));
    }

    #[test]
    fn switch_is_debounced_before_editing() {
        let mut r = rig(&[3], &[20.], at_minute(10));
        r.switch.set(true);
        r.sup.step().unwrap();
        // switch debounce, one key debounce, cycle delay
        assert_eq!(r.sup.panel.delay.total_ns, (50 + 10 + 200) * 1_000_000);
    }

    #[test]
    fn sensor_fault_surfaces_from_step() {
        let mut r = rig(&[], &[], at_minute(10));
        assert_eq!(r.sup.step(), Err(Error::Sensor));
    }
}
