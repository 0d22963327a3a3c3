//! Graphics support via embedded-graphics
//!
//! [`Display`] implements
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget), so lines,
//! frames, rounded frames and text come from the `embedded-graphics`
//! primitives rather than from the driver. The driver's whole contract with
//! the drawing library is a pixel sink with bounds checking and pen
//! interpretation, plus the declared canvas size.
//!
//! The declared canvas is the device's addressable 128×32 region. The
//! framebuffer accepts 64 rows; drawing into the lower half is clipped at
//! flush time, not here.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{Line, PrimitiveStyle};
//! use gp9002::{Display, DisplayInterface, Pen};
//! # struct MockInterface;
//! # impl DisplayInterface for MockInterface {
//! #     type Error = core::convert::Infallible;
//! #     fn write_command(&mut self, _byte: u8) -> Result<(), Self::Error> { Ok(()) }
//! #     fn write_data(&mut self, _byte: u8) -> Result<(), Self::Error> { Ok(()) }
//! #     fn reset<D: embedded_hal::delay::DelayNs>(
//! #         &mut self,
//! #         _delay: &mut D,
//! #     ) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # let mut display = Display::new(MockInterface);
//! let _ = Line::new(Point::new(0, 0), Point::new(127, 31))
//!     .into_styled(PrimitiveStyle::with_stroke(Pen::On, 1))
//!     .draw(&mut display);
//! ```

use core::convert::Infallible;

use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{OriginDimensions, Point, Size};
use embedded_graphics_core::prelude::Pixel;

use crate::display::Display;
use crate::framebuffer::{ADDRESSABLE_HEIGHT, WIDTH};
use crate::interface::DisplayInterface;
use crate::pen::Pen;

impl<I> DrawTarget for Display<I>
where
    I: DisplayInterface,
{
    type Color = Pen;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, pen) in pixels {
            self.draw_point(x, y, pen);
        }
        Ok(())
    }
}

impl<I> OriginDimensions for Display<I>
where
    I: DisplayInterface,
{
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, ADDRESSABLE_HEIGHT as u32)
    }
}
