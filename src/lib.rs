//! GP9002 VFD Driver
//!
//! A driver for Noritake GP9002A-class 128×64 vacuum fluorescent display
//! modules wired to a Raspberry Pi, built on a memory-mapped view of the
//! BCM283x GPIO register block and the kernel's spidev interface.
//!
//! ## Features
//!
//! - Typed, bounds-checked access to the SoC's GPIO registers (function
//!   select, pull resistors, pads drive strength, bit set/clear/level)
//! - Per-byte chip-select framing with a command/data mode line, as the
//!   GP9002 wire protocol requires
//! - 1-bit page/column framebuffer with set/clear/toggle pens
//! - Incremental GRAM flushing (only changed columns are addressed)
//! - `embedded-graphics` integration (with `graphics` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gp9002::{Builder, Delay, Display, Gpio, Pen, SerialLink, Soc};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut delay = Delay;
//! let config = Builder::new().soc(Soc::Bcm2837).build()?;
//!
//! let gpio = Gpio::open(config.soc)?;
//! let link = SerialLink::open(gpio, &config, &mut delay)?;
//!
//! let mut display = Display::new(link);
//! display.init(&mut delay)?;
//!
//! display.draw_point(64, 16, Pen::On);
//! display.update()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Preconditions
//!
//! The register mapping and the SPI device handle are each owned by exactly
//! one value for the process lifetime. No other process or thread may touch
//! the same register page or device node; the read-modify-write sequences on
//! shared configuration registers are not atomic and nothing here locks.

/// GP9002 command definitions
pub mod command;
/// Display session configuration types and builder
pub mod config;
/// Blocking delay for hosted Linux
pub mod delay;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// In-memory pixel plane
pub mod framebuffer;
/// GPIO pin configuration and level access
pub mod gpio;
/// Hardware interface abstraction
pub mod interface;
/// Serial transport to the display
pub mod link;
/// Pen type for drawing
pub mod pen;
/// Memory-mapped GPIO register access
pub mod registers;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use config::{Builder, Config, Pins, SpiMode};
pub use delay::Delay;
pub use display::{CLEAR_SETTLE_US, Display};
pub use error::{BuilderError, GpioError};
pub use framebuffer::Framebuffer;
pub use gpio::{DriveStrength, Function, Gpio, PULL_SETTLE_US, Pull, Soc};
pub use interface::DisplayInterface;
pub use link::{CmdData, LinkError, RESET_PULSE_US, RESET_SETTLE_US, SerialBus, SerialLink};
pub use pen::Pen;
pub use registers::{MappedRegisters, RegisterWindow};
