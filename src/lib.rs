#![cfg_attr(not(test), no_std)]

//! # TempLogger-rs
//! ## A temperature data logger in Rust
//!
//! Features:
//! - LM35 temperature readout on a 16x2 HD44780 character LCD
//! - Real-time clock with time, date and weekday display
//! - Keypad editor for the clock and the temperature limit
//! - Threshold actuator, on at or below the limit
//! - Serial status lines: once a minute, every cycle while over the limit

// must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod app_state;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod edit;
pub mod error;
pub mod keypad;
#[cfg(feature = "hd44780")]
pub mod lcd;
pub mod panel;
pub mod rendering;
pub mod sensors;
pub mod supervisor;
pub mod telemetry;

pub use error::{Error, Result};
