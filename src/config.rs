//! Display session configuration types and builder

use std::path::PathBuf;

pub use crate::error::BuilderError;
use crate::gpio::Soc;

/// Default SPI device node
pub const DEFAULT_SPI_DEVICE: &str = "/dev/spidev0.1";
/// Default SPI clock speed in Hz
pub const DEFAULT_SPI_SPEED_HZ: u32 = 200_000;

/// GPIO pin assignment for the display's control lines
///
/// The defaults match the reference wiring: MOSI and SCK on the hardware
/// SPI0 pins, chip select, command/data and reset on plain outputs, and the
/// display's frame pulse output (FRP) on an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pins {
    /// Serial data out (hardware MOSI)
    pub data_out: u8,
    /// Serial clock (hardware SCK)
    pub clock: u8,
    /// Chip select, active low (software driven)
    pub chip_select: u8,
    /// Command/data mode select (high = command)
    pub cmd_data: u8,
    /// Device reset, active low
    pub reset: u8,
    /// Frame pulse sense input (FRP)
    pub frame_pulse: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            data_out: 10,
            clock: 11,
            chip_select: 20,
            cmd_data: 5,
            reset: 16,
            frame_pulse: 6,
        }
    }
}

impl Pins {
    fn roles(&self) -> [(&'static str, u8); 6] {
        [
            ("data_out", self.data_out),
            ("clock", self.clock),
            ("chip_select", self.chip_select),
            ("cmd_data", self.cmd_data),
            ("reset", self.reset),
            ("frame_pulse", self.frame_pulse),
        ]
    }
}

/// SPI clock polarity/phase mode
///
/// The GP9002 clocks data on the rising edge with an idle-high clock, which
/// is mode 2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    #[default]
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

/// Display session configuration
///
/// Use [`Builder`] to create a `Config`.
#[derive(Clone, Debug)]
pub struct Config {
    /// SPI device node path
    pub spi_device: PathBuf,
    /// SPI clock polarity/phase
    pub spi_mode: SpiMode,
    /// SPI clock speed in Hz
    pub spi_speed_hz: u32,
    /// Control line assignment
    pub pins: Pins,
    /// Host SoC revision
    pub soc: Soc,
}

/// Builder for constructing a display session configuration
///
/// # Example
///
/// ```
/// use gp9002::{Builder, Soc};
///
/// let config = Builder::new()
///     .soc(Soc::Bcm2837)
///     .spi_speed_hz(200_000)
///     .build();
/// assert!(config.is_ok());
/// ```
#[must_use]
pub struct Builder {
    spi_device: PathBuf,
    spi_mode: SpiMode,
    spi_speed_hz: u32,
    pins: Pins,
    soc: Soc,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            spi_device: PathBuf::from(DEFAULT_SPI_DEVICE),
            spi_mode: SpiMode::default(),
            spi_speed_hz: DEFAULT_SPI_SPEED_HZ,
            pins: Pins::default(),
            soc: Soc::Bcm2837,
        }
    }
}

impl Builder {
    /// Create a new Builder with the reference wiring defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SPI device node path
    pub fn spi_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.spi_device = path.into();
        self
    }

    /// Set the SPI clock polarity/phase mode
    pub fn spi_mode(mut self, mode: SpiMode) -> Self {
        self.spi_mode = mode;
        self
    }

    /// Set the SPI clock speed in Hz
    pub fn spi_speed_hz(mut self, speed: u32) -> Self {
        self.spi_speed_hz = speed;
        self
    }

    /// Set the control line assignment
    pub fn pins(mut self, pins: Pins) -> Self {
        self.pins = pins;
        self
    }

    /// Set the host SoC revision
    pub fn soc(mut self, soc: Soc) -> Self {
        self.soc = soc;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError`] if the SPI speed is zero, a pin is outside
    /// the SoC's range, or two roles share one pin.
    pub fn build(self) -> Result<Config, BuilderError> {
        if self.spi_speed_hz == 0 {
            return Err(BuilderError::InvalidSpeed);
        }

        let roles = self.pins.roles();
        for (role, pin) in roles {
            if pin > self.soc.max_pin() {
                return Err(BuilderError::PinOutOfRange { role, pin });
            }
        }
        for (i, (_, pin)) in roles.iter().enumerate() {
            if roles[i + 1..].iter().any(|(_, other)| other == pin) {
                return Err(BuilderError::DuplicatePin { pin: *pin });
            }
        }

        Ok(Config {
            spi_device: self.spi_device,
            spi_mode: self.spi_mode,
            spi_speed_hz: self.spi_speed_hz,
            pins: self.pins,
            soc: self.soc,
        })
    }
}
