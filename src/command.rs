//! GP9002 command definitions
//!
//! Command bytes for the GP9002 VFD controller. Commands are sent with the
//! command/data line high, data bytes with it low; every byte is framed by
//! its own chip-select pulse (see [`crate::link`]).
//!
//! The initialization sequence is: [`DISPLAY_CLEAR`], a settle wait, eight
//! [`DISPLAY_AREA`] selections each marked fully active, then
//! [`LAYER0_ON`], [`MODE_NORMAL`], [`ADDRESS_FIXED`], and finally
//! [`GRAM_POSITION`] with X and Y data bytes of zero.

/// Clear the display GRAM (0x5F)
///
/// The device needs at least 1 ms before it accepts the next command.
pub const DISPLAY_CLEAR: u8 = 0x5F;

/// Select a display area (0x62)
///
/// Followed by the area index (0..=7) as a command byte and one data byte of
/// area flags.
pub const DISPLAY_AREA: u8 = 0x62;

/// Area flag byte marking an area fully active
pub const AREA_ACTIVE: u8 = 0xFF;

/// Number of display areas the controller exposes
pub const DISPLAY_AREA_COUNT: u8 = 8;

/// Turn display layer 0 on (0x24)
pub const LAYER0_ON: u8 = 0x24;

/// Normal display mode (0x40): grayscale on, reverse video off
pub const MODE_NORMAL: u8 = 0x40;

/// Fixed X/Y addressing (0x80)
///
/// The GRAM address counter holds its position instead of auto-incrementing;
/// every data byte is written to the last address set.
pub const ADDRESS_FIXED: u8 = 0x80;

/// Set the GRAM write position (0x70)
///
/// Followed by the X and Y start coordinates as data bytes.
pub const GRAM_POSITION: u8 = 0x70;

/// Set the GRAM Y address (0x60)
///
/// Followed by the page index (0..=3, 8 pixel rows per page) as a command
/// byte.
pub const SET_Y_ADDRESS: u8 = 0x60;

/// Set the GRAM X address (0x64)
///
/// Followed by the column index (0..=127) as a command byte.
pub const SET_X_ADDRESS: u8 = 0x64;
