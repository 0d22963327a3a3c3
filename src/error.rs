//! Error types for the driver
//!
//! Each layer has its own error enum:
//!
//! - [`GpioError`] - pin configuration and register-mapping failures
//! - [`BuilderError`] - configuration construction failures
//! - [`LinkError`](crate::link::LinkError) - serial transport failures
//!
//! Display operations are generic over the interface and return the
//! interface's error type directly.
//!
//! Resource-acquisition failures (mapping the register page, opening the SPI
//! device) and transfer-length mismatches are fatal for the session: they
//! indicate a permission or hardware fault that retrying cannot change.
//! Out-of-range pins and unsupported capabilities are recoverable results
//! with no partial effect.

use std::io;

/// Errors from GPIO pin operations and register-block acquisition
#[derive(Debug)]
pub enum GpioError {
    /// Pin number outside the SoC's supported range
    InvalidPin {
        /// The offending pin number
        pin: u8,
        /// Highest valid pin number on this SoC
        max: u8,
    },
    /// Drive strength level outside 0..=7
    InvalidDriveLevel {
        /// The offending level
        level: u8,
    },
    /// The operation is not available in this session
    ///
    /// Drive-strength access needs the pads page, which `/dev/gpiomem` does
    /// not expose; pull-state read-back only exists on SoCs with the direct
    /// pull protocol.
    Unsupported {
        /// Short description of the missing capability
        what: &'static str,
    },
    /// The register device could not be opened or mapped
    ///
    /// Fatal for every subsequent pin operation.
    Io(io::Error),
}

impl core::fmt::Display for GpioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPin { pin, max } => {
                write!(f, "invalid GPIO pin {pin} (supported range 0..={max})")
            }
            Self::InvalidDriveLevel { level } => {
                write!(f, "invalid drive strength level {level} (supported range 0..=7)")
            }
            Self::Unsupported { what } => write!(f, "unsupported on this session: {what}"),
            Self::Io(e) => write!(f, "GPIO register access: {e}"),
        }
    }
}

impl std::error::Error for GpioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for GpioError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Errors that can occur when building configuration
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// A pin assignment is outside the SoC's supported range
    PinOutOfRange {
        /// Role of the pin in the wiring (e.g. `"chip_select"`)
        role: &'static str,
        /// The offending pin number
        pin: u8,
    },
    /// The same pin was assigned to two roles
    DuplicatePin {
        /// The pin assigned twice
        pin: u8,
    },
    /// SPI clock speed of zero
    InvalidSpeed,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PinOutOfRange { role, pin } => {
                write!(f, "pin {pin} for {role} is out of range")
            }
            Self::DuplicatePin { pin } => {
                write!(f, "pin {pin} is assigned to more than one line")
            }
            Self::InvalidSpeed => write!(f, "SPI clock speed must be non-zero"),
        }
    }
}

impl std::error::Error for BuilderError {}
