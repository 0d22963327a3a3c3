//! Serial transport to the display
//!
//! [`SerialLink`] drives the GP9002's wire protocol: a hardware-clocked SPI
//! byte stream plus a software chip-select line and a command/data mode line,
//! both toggled through the GPIO controller.
//!
//! Framing rules (device datasheet):
//!
//! - chip select is active low and frames exactly one byte transfer,
//! - the command/data line is set *before* chip select is asserted,
//! - a transfer that moves fewer bytes than requested is a hardware or
//!   driver malfunction, reported as [`LinkError::TransferLength`] and never
//!   retried.

use std::io;

use embedded_hal::delay::DelayNs;
use log::{debug, info};
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};

use crate::config::{Config, SpiMode};
use crate::error::GpioError;
use crate::gpio::{Function, Gpio, Pull};
use crate::interface::DisplayInterface;
use crate::registers::{MappedRegisters, RegisterWindow};

/// Width of the reset pulse, in microseconds
pub const RESET_PULSE_US: u32 = 20;
/// Settle time after releasing reset before the first command, in microseconds
pub const RESET_SETTLE_US: u32 = 1100;
/// SPI word size in bits (fixed by the device protocol)
pub const SPI_WORD_BITS: u8 = 8;

/// Level of the command/data mode line for the next byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmdData {
    /// Data byte (mode line low)
    Data,
    /// Command byte (mode line high)
    Command,
}

/// Errors that can occur on the serial transport
#[derive(Debug)]
pub enum LinkError {
    /// GPIO line could not be driven
    Gpio(GpioError),
    /// SPI device open, configuration, or transfer failure
    Io(io::Error),
    /// The bus reported a different byte count than requested
    ///
    /// Fatal for the session; retrying a deterministic local transfer cannot
    /// help.
    TransferLength {
        /// Bytes requested
        expected: usize,
        /// Bytes the bus reported
        actual: usize,
    },
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "GPIO error: {e}"),
            Self::Io(e) => write!(f, "SPI device error: {e}"),
            Self::TransferLength { expected, actual } => {
                write!(f, "transferred {actual} of {expected} bytes")
            }
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpio(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::TransferLength { .. } => None,
        }
    }
}

impl From<GpioError> for LinkError {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

/// A clocked byte bus
///
/// Abstracts the SPI device so tests can substitute recording or faulty
/// buses. `transfer` returns the number of bytes actually moved; the caller
/// checks it against the request.
pub trait SerialBus {
    /// Transfer `tx` out on the bus, returning the byte count moved
    fn transfer(&mut self, tx: &[u8]) -> io::Result<usize>;
}

impl SerialBus for Spidev {
    fn transfer(&mut self, tx: &[u8]) -> io::Result<usize> {
        let mut transfer = SpidevTransfer::write(tx);
        Spidev::transfer(self, &mut transfer)?;
        // The spidev ioctl moves the whole message or fails.
        Ok(tx.len())
    }
}

impl SpiMode {
    fn flags(self) -> SpiModeFlags {
        match self {
            Self::Mode0 => SpiModeFlags::SPI_MODE_0,
            Self::Mode1 => SpiModeFlags::SPI_MODE_1,
            Self::Mode2 => SpiModeFlags::SPI_MODE_2,
            Self::Mode3 => SpiModeFlags::SPI_MODE_3,
        }
    }
}

/// Serial transport: SPI bus plus chip-select and command/data GPIO lines
///
/// Owns the GPIO controller and the SPI device handle exclusively for the
/// session; the SPI handle is released on drop.
pub struct SerialLink<B = Spidev, R = MappedRegisters> {
    bus: B,
    gpio: Gpio<R>,
    pins: crate::config::Pins,
}

impl SerialLink<Spidev, MappedRegisters> {
    /// Open the SPI device and wire up the control lines
    ///
    /// Drives all control lines to their idle level, configures the MOSI and
    /// SCK pins for the hardware SPI alternate function, chip select, mode
    /// and reset as plain outputs, and the frame-pulse sense line as an input
    /// with pull-up. Then opens the SPI device with the configured mode,
    /// speed, and 8-bit words.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Io`] when the SPI device cannot be opened or
    /// configured — fatal for the session.
    pub fn open<D: DelayNs>(
        gpio: Gpio<MappedRegisters>,
        config: &Config,
        delay: &mut D,
    ) -> Result<Self, LinkError> {
        let mut spi = Spidev::open(&config.spi_device).map_err(LinkError::Io)?;
        let options = SpidevOptions::new()
            .bits_per_word(SPI_WORD_BITS)
            .max_speed_hz(config.spi_speed_hz)
            .mode(config.spi_mode.flags())
            .build();
        spi.configure(&options).map_err(LinkError::Io)?;
        info!(
            "SPI open on {} ({:?}, {} Hz)",
            config.spi_device.display(),
            config.spi_mode,
            config.spi_speed_hz
        );
        Self::with_bus(spi, gpio, config, delay)
    }
}

impl<B: SerialBus, R: RegisterWindow> SerialLink<B, R> {
    /// Build a link over a caller-provided bus and GPIO controller
    ///
    /// Performs the same control-line setup as [`open`](SerialLink::open);
    /// used by tests to substitute fakes for both the bus and the register
    /// block.
    pub fn with_bus<D: DelayNs>(
        bus: B,
        mut gpio: Gpio<R>,
        config: &Config,
        delay: &mut D,
    ) -> Result<Self, LinkError> {
        let pins = config.pins;
        let outputs = [
            pins.data_out,
            pins.cmd_data,
            pins.chip_select,
            pins.clock,
            pins.reset,
        ];

        // Idle levels before switching directions, so nothing glitches low.
        for pin in outputs {
            gpio.write(pin, true)?;
        }
        for pin in outputs {
            gpio.configure_io(pin, Function::Output)?;
        }
        gpio.configure_io(pins.data_out, Function::Alt0)?;
        gpio.configure_io(pins.clock, Function::Alt0)?;

        gpio.configure_io(pins.frame_pulse, Function::Input)?;
        gpio.configure_pullup(pins.frame_pulse, Pull::Up, delay)?;

        debug!("control lines configured: {pins:?}");
        Ok(Self { bus, gpio, pins })
    }

    fn chip_select(&mut self, selected: bool) -> Result<(), LinkError> {
        // Active low.
        self.gpio.write(self.pins.chip_select, !selected)?;
        Ok(())
    }

    /// Drive the command/data mode line for the next transfer
    pub fn set_mode(&mut self, mode: CmdData) -> Result<(), LinkError> {
        self.gpio.write(self.pins.cmd_data, mode == CmdData::Command)?;
        Ok(())
    }

    /// Transfer a byte sequence inside one chip-select frame
    ///
    /// # Errors
    ///
    /// [`LinkError::TransferLength`] when the bus moves a different number of
    /// bytes than requested.
    pub fn transfer(&mut self, tx: &[u8]) -> Result<usize, LinkError> {
        self.chip_select(true)?;
        let result = self.bus.transfer(tx);
        self.chip_select(false)?;

        let actual = result.map_err(LinkError::Io)?;
        if actual != tx.len() {
            return Err(LinkError::TransferLength {
                expected: tx.len(),
                actual,
            });
        }
        Ok(actual)
    }

    /// Sample the display's frame pulse output
    pub fn frame_pulse(&self) -> Result<bool, LinkError> {
        Ok(self.gpio.read(self.pins.frame_pulse)?)
    }

    /// Access the GPIO controller
    pub fn gpio(&self) -> &Gpio<R> {
        &self.gpio
    }

    /// Access the GPIO controller mutably
    pub fn gpio_mut(&mut self) -> &mut Gpio<R> {
        &mut self.gpio
    }
}

impl<B: SerialBus, R: RegisterWindow> DisplayInterface for SerialLink<B, R> {
    type Error = LinkError;

    fn write_command(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.set_mode(CmdData::Command)?;
        self.transfer(&[byte])?;
        Ok(())
    }

    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.set_mode(CmdData::Data)?;
        self.transfer(&[byte])?;
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        debug!("reset pulse");
        self.gpio.write(self.pins.reset, true)?;
        self.gpio.write(self.pins.reset, false)?;
        delay.delay_us(RESET_PULSE_US);
        self.gpio.write(self.pins.reset, true)?;
        delay.delay_us(RESET_SETTLE_US);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::gpio::Soc;
    use crate::registers::fake::FakeRegisters;

    struct NoDelay;
    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Bus that records every transferred chunk
    #[derive(Default)]
    struct RecordingBus {
        chunks: Vec<Vec<u8>>,
    }

    impl SerialBus for RecordingBus {
        fn transfer(&mut self, tx: &[u8]) -> io::Result<usize> {
            self.chunks.push(tx.to_vec());
            Ok(tx.len())
        }
    }

    /// Bus that claims to have moved fewer bytes than requested
    struct ShortBus;

    impl SerialBus for ShortBus {
        fn transfer(&mut self, tx: &[u8]) -> io::Result<usize> {
            Ok(tx.len().saturating_sub(1))
        }
    }

    fn link<B: SerialBus>(bus: B) -> SerialLink<B, FakeRegisters> {
        let gpio = Gpio::with_registers(FakeRegisters::new(), None, Soc::Bcm2837);
        let config = Builder::new().build().unwrap();
        SerialLink::with_bus(bus, gpio, &config, &mut NoDelay).unwrap()
    }

    #[test]
    fn test_setup_configures_lines() {
        let l = link(RecordingBus::default());
        let pins = l.pins;
        // MOSI and SCK end up on the SPI alternate function.
        assert_eq!(l.gpio.alt_function(pins.data_out).unwrap(), Function::Alt0);
        assert_eq!(l.gpio.alt_function(pins.clock).unwrap(), Function::Alt0);
        assert_eq!(
            l.gpio.alt_function(pins.chip_select).unwrap(),
            Function::Output
        );
        assert_eq!(l.gpio.alt_function(pins.cmd_data).unwrap(), Function::Output);
        assert_eq!(l.gpio.alt_function(pins.reset).unwrap(), Function::Output);
        assert_eq!(
            l.gpio.alt_function(pins.frame_pulse).unwrap(),
            Function::Input
        );
        // Chip select idles deasserted (high).
        assert!(l.gpio.read(pins.chip_select).unwrap());
    }

    #[test]
    fn test_write_command_sets_mode_high() {
        let mut l = link(RecordingBus::default());
        l.write_command(0x5F).unwrap();
        assert!(l.gpio.read(l.pins.cmd_data).unwrap());
        assert_eq!(l.bus.chunks, vec![vec![0x5F]]);
        // Chip select released after the byte.
        assert!(l.gpio.read(l.pins.chip_select).unwrap());
    }

    #[test]
    fn test_write_data_sets_mode_low() {
        let mut l = link(RecordingBus::default());
        l.write_data(0xFF).unwrap();
        assert!(!l.gpio.read(l.pins.cmd_data).unwrap());
        assert_eq!(l.bus.chunks, vec![vec![0xFF]]);
    }

    #[test]
    fn test_transfer_reports_byte_count() {
        let mut l = link(RecordingBus::default());
        assert_eq!(l.transfer(&[1, 2, 3]).unwrap(), 3);
    }

    #[test]
    fn test_short_transfer_is_fatal() {
        let mut l = link(ShortBus);
        let result = l.transfer(&[0xAA]);
        assert!(matches!(
            result,
            Err(LinkError::TransferLength {
                expected: 1,
                actual: 0
            })
        ));
        // Chip select was still released.
        assert!(l.gpio.read(l.pins.chip_select).unwrap());
    }

    #[test]
    fn test_short_transfer_fails_write_command() {
        let mut l = link(ShortBus);
        assert!(matches!(
            l.write_command(0x5F),
            Err(LinkError::TransferLength { .. })
        ));
    }

    #[test]
    fn test_reset_leaves_line_high() {
        let mut l = link(RecordingBus::default());
        l.reset(&mut NoDelay).unwrap();
        assert!(l.gpio.read(l.pins.reset).unwrap());
    }

    #[test]
    fn test_frame_pulse_reads_input() {
        let mut l = link(RecordingBus::default());
        assert!(!l.frame_pulse().unwrap());
        let pin = l.pins.frame_pulse;
        // Simulate the display driving FRP high. The fake register block
        // reflects set/clear writes in its level word.
        l.gpio_mut().write(pin, true).unwrap();
        assert!(l.frame_pulse().unwrap());
    }
}
