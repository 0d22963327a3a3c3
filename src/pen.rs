//! Pen type for drawing on the 1-bit framebuffer
//!
//! The display plane is monochrome, so a "color" is really a bit operation:
//! clear, set, or toggle. The toggle pen is how the original two-color effect
//! is produced — drawing the same shape twice with [`Pen::Toggle`] restores
//! the pixels underneath.

/// Drawing pen mapped to a bit operation on the framebuffer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pen {
    /// Clear the pixel
    Off,
    /// Set the pixel
    #[default]
    On,
    /// Invert the pixel
    Toggle,
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Pen {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU8;
}

impl Pen {
    /// Map a numeric pen index to a pen
    ///
    /// 0 clears, 1 sets, and any other value toggles. This is the pen
    /// convention of the original device protocol, preserved exactly.
    ///
    /// ## Example
    ///
    /// ```
    /// use gp9002::Pen;
    ///
    /// assert_eq!(Pen::from_index(0), Pen::Off);
    /// assert_eq!(Pen::from_index(1), Pen::On);
    /// assert_eq!(Pen::from_index(2), Pen::Toggle);
    /// assert_eq!(Pen::from_index(7), Pen::Toggle);
    /// ```
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => Self::Off,
            1 => Self::On,
            _ => Self::Toggle,
        }
    }

    /// Apply the pen to a byte under a bit mask
    pub(crate) fn apply(self, byte: u8, mask: u8) -> u8 {
        match self {
            Self::Off => byte & !mask,
            Self::On => byte | mask,
            Self::Toggle => byte ^ mask,
        }
    }
}
