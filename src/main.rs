#![no_std]
#![no_main]

use bsp::entry;
use core::convert::Infallible;
use defmt::*;
use defmt_rtt as _;
use embedded_hal_0_2::adc::OneShot;
use hd44780_driver::bus::FourBitBusPins;
use hd44780_driver::memory_map::MemoryMap1602;
use hd44780_driver::setup::DisplayOptions4Bit;
use hd44780_driver::HD44780;
use panic_probe as _;

// Provide an alias for our BSP so we can switch targets quickly.
// Uncomment the BSP you included in Cargo.toml, the rest of the code does not need to change.
use rp_pico as bsp;

use bsp::hal::{
    adc::{Adc, AdcPin},
    clocks::{init_clocks_and_plls, Clock},
    fugit::RateExtU32,
    gpio::{bank0::Gpio26, FunctionSioInput, FunctionUart, Pin, PullNone},
    pac,
    rtc::{DateTime, DayOfWeek, RealTimeClock},
    uart::{DataBits, Enabled, StopBits, UartConfig, UartDevice, UartPeripheral, ValidUartPinout},
    watchdog::Watchdog,
    Sio, Timer,
};
use templogger::clock::{ClockState, RtcClock};
use templogger::config::BootConfig;
use templogger::keypad::KeypadMatrix;
use templogger::lcd::Lcd;
use templogger::panel::FrontPanel;
use templogger::sensors::{AnalogInput, Lm35};
use templogger::supervisor::Supervisor;
use templogger::{Error, Result};

const BAUD_RATE: u32 = 9600;
const ADC_VREF_MV: u32 = 3300;
const ADC_FULL_SCALE: u32 = 4095;

type Lm35Pin = Pin<Gpio26, FunctionSioInput, PullNone>;

/// LM35 output on ADC0
struct AdcChannel {
    adc: Adc,
    pin: AdcPin<Lm35Pin>,
}

impl AnalogInput for AdcChannel {
    fn read_raw(&mut self) -> Result<u16> {
        nb::block!(self.adc.read(&mut self.pin)).map_err(|_| Error::Sensor)
    }
}

/// The RP2040's own calendar RTC
struct PicoRtc(RealTimeClock);

fn datetime(clock: &ClockState) -> Result<DateTime> {
    let day_of_week = match clock.weekday {
        0 => DayOfWeek::Sunday,
        1 => DayOfWeek::Monday,
        2 => DayOfWeek::Tuesday,
        3 => DayOfWeek::Wednesday,
        4 => DayOfWeek::Thursday,
        5 => DayOfWeek::Friday,
        6 => DayOfWeek::Saturday,
        _ => return Err(Error::Clock),
    };
    Ok(DateTime {
        year: clock.year,
        month: clock.month,
        day: clock.day,
        day_of_week,
        hour: clock.hour,
        minute: clock.minute,
        second: clock.second,
    })
}

impl RtcClock for PicoRtc {
    fn read(&mut self) -> Result<ClockState> {
        let now = self.0.now().map_err(|_| Error::Clock)?;
        Ok(ClockState {
            hour: now.hour,
            minute: now.minute,
            second: now.second,
            day: now.day,
            month: now.month,
            year: now.year,
            weekday: now.day_of_week as u8,
        })
    }

    /// The hardware refuses out-of-range fields. Hour, minute and second are
    /// stored unchecked by the editor, so on this board an hour of 24 or more
    /// (or a minute/second of 60 or more) shows as "reject change" instead.
    fn write(&mut self, clock: &ClockState) -> Result<()> {
        self.0.set_datetime(datetime(clock)?).map_err(|_| Error::Clock)
    }
}

/// Blocking UART writer for the telemetry lines
struct Serial<D: UartDevice, P: ValidUartPinout<D>>(UartPeripheral<Enabled, D, P>);

impl<D: UartDevice, P: ValidUartPinout<D>> ufmt::uWrite for Serial<D, P> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> core::result::Result<(), Infallible> {
        self.0.write_full_blocking(s.as_bytes());
        Ok(())
    }
}

#[entry]
fn main() -> ! {
    info!("TempLogger starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let config = BootConfig::default();

    // Set up UART0, 9600 8N1
    let uart_pins = (
        pins.gpio0.into_function::<FunctionUart>(),
        pins.gpio1.into_function::<FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(BAUD_RATE.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .ok()
        .unwrap();

    // Set up the RTC
    let rtc = RealTimeClock::new(
        pac.RTC,
        clocks.rtc_clock,
        &mut pac.RESETS,
        datetime(&config.seed).unwrap(),
    )
    .ok()
    .unwrap();

    // Set up LM35 on ADC0
    let adc = Adc::new(pac.ADC, &mut pac.RESETS);
    let lm35_pin = AdcPin::new(pins.gpio26.into_floating_input()).ok().unwrap();
    let sensor = Lm35::new(AdcChannel { adc, pin: lm35_pin }, ADC_VREF_MV, ADC_FULL_SCALE);

    // Set up LCD1602 (RS, EN, D4..D7)
    let mut lcd_delay = timer;
    let options = DisplayOptions4Bit::new(MemoryMap1602::new()).with_pins(FourBitBusPins {
        rs: pins.gpio2.into_push_pull_output().into_dyn_pin(),
        en: pins.gpio3.into_push_pull_output().into_dyn_pin(),
        d4: pins.gpio4.into_push_pull_output().into_dyn_pin(),
        d5: pins.gpio5.into_push_pull_output().into_dyn_pin(),
        d6: pins.gpio6.into_push_pull_output().into_dyn_pin(),
        d7: pins.gpio7.into_push_pull_output().into_dyn_pin(),
    });
    let driver = HD44780::new(options, &mut lcd_delay).unwrap_or_else(|_| panic!("LCD init failed"));
    let lcd = Lcd::new(driver, lcd_delay);

    // Set up keypad: rows driven, columns pulled up
    let keypad = KeypadMatrix::new(
        [
            pins.gpio8.into_push_pull_output().into_dyn_pin(),
            pins.gpio9.into_push_pull_output().into_dyn_pin(),
            pins.gpio10.into_push_pull_output().into_dyn_pin(),
            pins.gpio11.into_push_pull_output().into_dyn_pin(),
        ],
        [
            pins.gpio12.into_pull_up_input().into_dyn_pin(),
            pins.gpio13.into_pull_up_input().into_dyn_pin(),
            pins.gpio14.into_pull_up_input().into_dyn_pin(),
            pins.gpio15.into_pull_up_input().into_dyn_pin(),
        ],
    )
    .unwrap();

    // Set up edit-mode switch, to ground
    let mode_switch = pins.gpio16.into_pull_up_input();

    // The on-board LED stands in for the heater relay
    let actuator = pins.led.into_push_pull_output();

    let panel = FrontPanel::new(keypad, lcd, timer, config.timing);
    let mut supervisor = Supervisor::new(
        panel,
        Serial(uart),
        PicoRtc(rtc),
        sensor,
        mode_switch,
        actuator,
        &config,
    )
    .unwrap();

    info!("TempLogger ready: {}", config);
    supervisor.run()
}
