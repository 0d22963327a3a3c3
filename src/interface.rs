//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait, the seam between the
//! [`Display`](crate::display::Display) driver and the physical transport.
//! Production code uses [`SerialLink`](crate::link::SerialLink); unit tests
//! substitute mocks that capture the emitted command/data byte stream.
//!
//! The GP9002 frames every byte individually: chip select is asserted for
//! exactly one byte and released again, and the command/data line must be at
//! its final level before chip select is asserted. Implementations own that
//! framing; callers only distinguish command bytes from data bytes.

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;

/// Trait for the byte transport to the GP9002 controller
pub trait DisplayInterface {
    /// Error type for interface operations
    type Error: Debug;

    /// Send one command byte
    ///
    /// The implementation must drive the command/data line to its command
    /// level before framing the byte with chip select.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte cannot be transferred completely; the
    /// caller treats this as fatal for the session.
    fn write_command(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Send one data byte
    ///
    /// Same framing as [`write_command`](Self::write_command) with the
    /// command/data line at its data level.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte cannot be transferred completely.
    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Pulse the reset line and wait out the post-reset settle time
    ///
    /// After this returns the device is ready to accept its first command.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset line cannot be driven.
    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error>;
}
