use embedded_hal::digital::ErrorKind;
use thiserror_no_std::Error;

/// Peripheral faults surfaced by the capability traits.
///
/// Calendar and set-point rejections are not errors; they are reported
/// through [`crate::calendar::Rejection`] and never leave the editor.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A keypad row or column line could not be driven or read
    #[error("keypad line fault: {0:?}")]
    Keypad(ErrorKind),

    /// The edit-mode switch could not be read
    #[error("mode switch fault: {0:?}")]
    ModeSwitch(ErrorKind),

    /// The actuator output could not be driven
    #[error("actuator fault: {0:?}")]
    Actuator(ErrorKind),

    #[error("display write failed")]
    Display,

    #[error("serial write failed")]
    Serial,

    /// The clock refused a read or write, e.g. a field outside what the
    /// hardware can store
    #[error("clock access refused")]
    Clock,

    #[error("temperature sample failed")]
    Sensor,

    /// A formatted line did not fit its buffer
    #[error("line buffer overflow")]
    Format,
}

pub type Result<T> = core::result::Result<T, Error>;
