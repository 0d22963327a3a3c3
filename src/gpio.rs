//! GPIO pin configuration and level access
//!
//! This module provides the [`Gpio`] controller over a mapped BCM283x GPIO
//! register page: per-pin function select, pull resistor configuration, pads
//! drive strength, and single-bit reads and writes.
//!
//! Every mutation of a shared configuration register goes through
//! [`Field`](crate::registers::Field), because up to 10 pins share one 32-bit
//! register — a naive write would reconfigure all of them at once.
//!
//! ## Pull protocols
//!
//! The BCM2835 family configures pull resistors through a clocked sequence
//! (GPPUD + GPPUDCLK with mandatory settle delays); the BCM2711 has a direct
//! 2-bit field per pin. The protocol is fixed by the [`Soc`] revision passed
//! to [`Gpio::open`] and never mixed within a session. Skipping the settle
//! delay in the clocked protocol corrupts the pull state of neighbouring pins,
//! so the delay is a correctness requirement.
//!
//! There is no cached pin state: every read queries hardware.

use std::path::Path;

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::error::GpioError;
use crate::registers::{
    Field, GPCLR0, GPCLR1, GPIO_PUP_PDN_CNTRL0, GPLEV0, GPLEV1, GPPUD, GPPUDCLK0, GPPUDCLK1,
    GPSET0, GPSET1, MappedRegisters, PADS_GROUP0, PADS_PASSWORD, REGISTER_PAGE_LEN,
    RegisterWindow,
};

/// Settle delay for the clocked pull protocol, in microseconds
///
/// The BCM2835 manual requires holding GPPUD and GPPUDCLK for at least 150
/// cycles each; skipping the wait corrupts adjacent pins' pull state.
pub const PULL_SETTLE_US: u32 = 150;

const GPIOMEM: &str = "/dev/gpiomem";
const DEVMEM: &str = "/dev/mem";
const GPIO_PAGE_OFFSET: u64 = 0x0020_0000;
const PADS_PAGE_OFFSET: u64 = 0x0010_0000;

/// Function routed onto a GPIO pin
///
/// Besides plain input and output, each pin can carry one of six alternate
/// hardware functions (SPI, UART, clocks, ...). The register codes are not in
/// enum order — Alt0 is `0b100` — so the mapping is explicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    /// Plain input
    Input,
    /// Plain output
    Output,
    /// Alternate function 0 (e.g. SPI0 on pins 9-11)
    Alt0,
    /// Alternate function 1
    Alt1,
    /// Alternate function 2
    Alt2,
    /// Alternate function 3
    Alt3,
    /// Alternate function 4
    Alt4,
    /// Alternate function 5
    Alt5,
}

impl Function {
    fn code(self) -> u32 {
        match self {
            Self::Input => 0b000,
            Self::Output => 0b001,
            Self::Alt0 => 0b100,
            Self::Alt1 => 0b101,
            Self::Alt2 => 0b110,
            Self::Alt3 => 0b111,
            Self::Alt4 => 0b011,
            Self::Alt5 => 0b010,
        }
    }

    fn from_code(code: u32) -> Self {
        match code & 0b111 {
            0b000 => Self::Input,
            0b001 => Self::Output,
            0b100 => Self::Alt0,
            0b101 => Self::Alt1,
            0b110 => Self::Alt2,
            0b111 => Self::Alt3,
            0b011 => Self::Alt4,
            _ => Self::Alt5,
        }
    }
}

/// Pull resistor configuration for an input pin
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pull {
    /// No pull resistor
    None,
    /// Pull up towards the supply rail
    Up,
    /// Pull down towards ground
    Down,
}

/// Host SoC revision
///
/// Selects the peripheral base address, the number of GPIO lines, and the
/// pull-configuration protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Soc {
    /// BCM2835 (Pi 1, Zero)
    Bcm2835,
    /// BCM2836 (Pi 2)
    Bcm2836,
    /// BCM2837 (Pi 3, Zero 2)
    Bcm2837,
    /// BCM2711 (Pi 4)
    Bcm2711,
}

impl Soc {
    /// Physical address of the peripheral block
    pub fn peripheral_base(self) -> u64 {
        match self {
            Self::Bcm2835 => 0x2000_0000,
            Self::Bcm2836 | Self::Bcm2837 => 0x3F00_0000,
            Self::Bcm2711 => 0xFE00_0000,
        }
    }

    /// Highest valid GPIO pin number
    pub fn max_pin(self) -> u8 {
        match self {
            Self::Bcm2711 => 57,
            _ => 53,
        }
    }

    /// Whether pulls are set through the direct per-pin 2-bit field
    fn direct_pull(self) -> bool {
        matches!(self, Self::Bcm2711)
    }
}

/// Drive strength settings for a pads group
///
/// Pins share pads control in groups (0-27, 28-45, 46-53); writing one pin's
/// drive strength reconfigures its whole group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriveStrength {
    /// Whether the output slew rate is limited
    pub slew_limited: bool,
    /// Whether input hysteresis is enabled
    pub hysteresis: bool,
    /// Drive level 0..=7 (2 mA to 16 mA in 2 mA steps)
    pub level: u8,
}

/// GPIO controller over a mapped register page
///
/// `R` is the register-window implementation; production code uses
/// [`MappedRegisters`] via [`open`](Self::open), unit tests inject fakes via
/// [`with_registers`](Self::with_registers).
///
/// The controller owns the mapping exclusively for the process lifetime; the
/// mapping is released when the controller is dropped.
pub struct Gpio<R = MappedRegisters> {
    gpio: R,
    pads: Option<R>,
    soc: Soc,
}

impl Gpio<MappedRegisters> {
    /// Acquire the GPIO register block
    ///
    /// Prefers `/dev/gpiomem`, which exposes the GPIO page without root but
    /// not the pads page (drive-strength operations then return
    /// [`GpioError::Unsupported`]). Falls back to `/dev/mem` at the SoC's
    /// physical peripheral base, which also maps the pads page.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::Io`] when neither device can be opened and
    /// mapped. Callers must treat this as fatal for all pin operations.
    pub fn open(soc: Soc) -> Result<Self, GpioError> {
        let gpiomem = Path::new(GPIOMEM);
        if gpiomem.exists() {
            let gpio = MappedRegisters::map(gpiomem, 0, REGISTER_PAGE_LEN)?;
            info!("GPIO open via {GPIOMEM} ({soc:?}, no pads access)");
            return Ok(Self {
                gpio,
                pads: None,
                soc,
            });
        }

        let base = soc.peripheral_base();
        let devmem = Path::new(DEVMEM);
        let gpio = MappedRegisters::map(devmem, base + GPIO_PAGE_OFFSET, REGISTER_PAGE_LEN)?;
        let pads = MappedRegisters::map(devmem, base + PADS_PAGE_OFFSET, REGISTER_PAGE_LEN)?;
        info!("GPIO open via {DEVMEM} at {:#x} ({soc:?})", base + GPIO_PAGE_OFFSET);
        Ok(Self {
            gpio,
            pads: Some(pads),
            soc,
        })
    }
}

impl<R: RegisterWindow> Gpio<R> {
    /// Build a controller over caller-provided register windows
    ///
    /// Intended for tests and simulation: any [`RegisterWindow`] stands in
    /// for the hardware page. Pass `None` for `pads` to model a session
    /// without drive-strength access.
    pub fn with_registers(gpio: R, pads: Option<R>, soc: Soc) -> Self {
        Self { gpio, pads, soc }
    }

    /// The SoC revision this controller was opened for
    pub fn soc(&self) -> Soc {
        self.soc
    }

    fn check_pin(&self, pin: u8) -> Result<(), GpioError> {
        if pin > self.soc.max_pin() {
            return Err(GpioError::InvalidPin {
                pin,
                max: self.soc.max_pin(),
            });
        }
        Ok(())
    }

    /// Function-select field for a pin: 10 pins per register, 3 bits each
    fn fsel_field(pin: u8) -> Field {
        Field {
            reg: usize::from(pin / 10) * 4,
            shift: u32::from(pin % 10) * 3,
            width: 3,
        }
    }

    /// Route a function onto a pin
    ///
    /// Read-modify-write on the pin's 3-bit function-select field; the other
    /// nine pins in the register are untouched.
    pub fn configure_io(&mut self, pin: u8, function: Function) -> Result<(), GpioError> {
        self.check_pin(pin)?;
        Self::fsel_field(pin).set(&mut self.gpio, function.code());
        debug!("gpio{pin} -> {function:?}");
        Ok(())
    }

    /// Read back the function currently routed onto a pin
    pub fn alt_function(&self, pin: u8) -> Result<Function, GpioError> {
        self.check_pin(pin)?;
        Ok(Function::from_code(Self::fsel_field(pin).get(&self.gpio)))
    }

    /// Configure the pull resistor of a pin
    ///
    /// Uses the protocol fixed by the SoC revision at open: the clocked
    /// GPPUD/GPPUDCLK sequence on the BCM2835 family (with the mandatory
    /// [`PULL_SETTLE_US`] waits), or the direct 2-bit field on the BCM2711.
    pub fn configure_pullup<D: DelayNs>(
        &mut self,
        pin: u8,
        pull: Pull,
        delay: &mut D,
    ) -> Result<(), GpioError> {
        self.check_pin(pin)?;
        if self.soc.direct_pull() {
            self.set_pull_direct(pin, pull);
        } else {
            self.set_pull_clocked(pin, pull, delay);
        }
        debug!("gpio{pin} pull {pull:?}");
        Ok(())
    }

    /// Read back the pull state of a pin
    ///
    /// Only the BCM2711's direct pull field is readable; the clocked protocol
    /// is write-only in hardware, so this returns
    /// [`GpioError::Unsupported`] on earlier SoCs.
    pub fn pull(&self, pin: u8) -> Result<Pull, GpioError> {
        self.check_pin(pin)?;
        if !self.soc.direct_pull() {
            return Err(GpioError::Unsupported {
                what: "pull state read-back (clocked pull protocol)",
            });
        }
        Ok(match Self::pull_field(pin).get(&self.gpio) {
            0b01 => Pull::Up,
            0b10 => Pull::Down,
            _ => Pull::None,
        })
    }

    /// BCM2711 pull field: 16 pins per register, 2 bits each
    fn pull_field(pin: u8) -> Field {
        Field {
            reg: GPIO_PUP_PDN_CNTRL0 + usize::from(pin / 16) * 4,
            shift: u32::from(pin % 16) * 2,
            width: 2,
        }
    }

    fn set_pull_direct(&mut self, pin: u8, pull: Pull) {
        // BCM2711 encoding: 00 none, 01 up, 10 down.
        let code = match pull {
            Pull::None => 0b00,
            Pull::Up => 0b01,
            Pull::Down => 0b10,
        };
        Self::pull_field(pin).set(&mut self.gpio, code);
    }

    fn set_pull_clocked<D: DelayNs>(&mut self, pin: u8, pull: Pull, delay: &mut D) {
        // BCM2835 encoding: 00 none, 01 down, 10 up.
        let code = match pull {
            Pull::None => 0b00,
            Pull::Down => 0b01,
            Pull::Up => 0b10,
        };
        let (clk, bit) = if pin < 32 {
            (GPPUDCLK0, u32::from(pin))
        } else {
            (GPPUDCLK1, u32::from(pin - 32))
        };

        self.gpio.write(GPPUD, code);
        delay.delay_us(PULL_SETTLE_US);
        self.gpio.write(clk, 1 << bit);
        delay.delay_us(PULL_SETTLE_US);
        self.gpio.write(GPPUD, 0);
        self.gpio.write(clk, 0);
    }

    fn pads_group(pin: u8) -> usize {
        match pin {
            0..=27 => 0,
            28..=45 => 1,
            _ => 2,
        }
    }

    fn pads_window(&self) -> Result<&R, GpioError> {
        if self.soc.direct_pull() {
            // BCM2711 pads control is not publicly documented.
            return Err(GpioError::Unsupported {
                what: "drive strength on this SoC",
            });
        }
        self.pads.as_ref().ok_or(GpioError::Unsupported {
            what: "drive strength without /dev/mem pads mapping",
        })
    }

    /// Read the drive strength settings of the pin's pads group
    pub fn drive_strength(&self, pin: u8) -> Result<DriveStrength, GpioError> {
        self.check_pin(pin)?;
        let pads = self.pads_window()?;
        let value = pads.read(PADS_GROUP0 + Self::pads_group(pin) * 4);
        Ok(DriveStrength {
            // SLEW bit set means "not limited".
            slew_limited: value & (1 << 4) == 0,
            hysteresis: value & (1 << 3) != 0,
            level: (value & 0b111) as u8,
        })
    }

    /// Set the drive strength of the pin's pads group
    ///
    /// Affects every pin in the group. `level` must be 0..=7.
    pub fn set_drive_strength(
        &mut self,
        pin: u8,
        strength: DriveStrength,
    ) -> Result<(), GpioError> {
        self.check_pin(pin)?;
        self.pads_window()?;
        if strength.level > 7 {
            return Err(GpioError::InvalidDriveLevel {
                level: strength.level,
            });
        }

        let mut value = PADS_PASSWORD | u32::from(strength.level);
        if strength.hysteresis {
            value |= 1 << 3;
        }
        if !strength.slew_limited {
            value |= 1 << 4;
        }
        let reg = PADS_GROUP0 + Self::pads_group(pin) * 4;
        if let Some(pads) = self.pads.as_mut() {
            pads.write(reg, value);
        }
        debug!("gpio{pin} pads group {} -> {strength:?}", Self::pads_group(pin));
        Ok(())
    }

    /// Read the level of a pin
    pub fn read(&self, pin: u8) -> Result<bool, GpioError> {
        self.check_pin(pin)?;
        let (lev, bit) = if pin < 32 {
            (GPLEV0, u32::from(pin))
        } else {
            (GPLEV1, u32::from(pin - 32))
        };
        Ok(self.gpio.read(lev) & (1 << bit) != 0)
    }

    /// Drive an output pin high or low
    ///
    /// Writes the pin's bit into the dedicated set or clear register. Both
    /// have write-1-to-act semantics; a 0 bit is a no-op, so a single write
    /// never disturbs other pins.
    pub fn write(&mut self, pin: u8, level: bool) -> Result<(), GpioError> {
        self.check_pin(pin)?;
        let (reg, bit) = match (level, pin < 32) {
            (true, true) => (GPSET0, u32::from(pin)),
            (true, false) => (GPSET1, u32::from(pin - 32)),
            (false, true) => (GPCLR0, u32::from(pin)),
            (false, false) => (GPCLR1, u32::from(pin - 32)),
        };
        self.gpio.write(reg, 1 << bit);
        Ok(())
    }

    /// Sample the first input-level bank register (pins 0-31) in one read
    pub fn read32(&self) -> u32 {
        self.gpio.read(GPLEV0)
    }
}
