//! Demo program for the GP9002 VFD driver
//!
//! Opens the GPIO register block and the SPI device, initializes the display,
//! and renders a fixed test scene: a character ramp, a rounded frame, border
//! lines, and two crossing diagonals in the toggle pen.
//!
//! Exit codes: 1 when the GPIO register block cannot be opened, 2 when the
//! serial device cannot be opened or the session fails, 0 otherwise.

use std::process::ExitCode;

use embedded_graphics::Drawable;
use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::mono_font::ascii::FONT_8X13;
use embedded_graphics::primitives::{
    Line, Primitive, PrimitiveStyle, Rectangle, RoundedRectangle,
};
use embedded_graphics::text::{Baseline, Text};
use gp9002::{Builder, Delay, Display, Gpio, LinkError, Pen, SerialLink, Soc};
use log::error;

fn main() -> ExitCode {
    env_logger::init();
    let mut delay = Delay;

    let config = match Builder::new().soc(Soc::Bcm2837).build() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let gpio = match Gpio::open(config.soc) {
        Ok(gpio) => gpio,
        Err(e) => {
            error!("unable to open gpio: {e}");
            return ExitCode::from(1);
        }
    };

    let link = match SerialLink::open(gpio, &config, &mut delay) {
        Ok(link) => link,
        Err(e) => {
            error!("unable to open {}: {e}", config.spi_device.display());
            return ExitCode::from(2);
        }
    };

    let mut display = Display::new(link);
    if let Err(e) = run(&mut display, &mut delay) {
        error!("display session: {e}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}

fn run(display: &mut Display<SerialLink>, delay: &mut Delay) -> Result<(), LinkError> {
    display.init(delay)?;

    let text = MonoTextStyleBuilder::new()
        .font(&FONT_8X13)
        .text_color(Pen::On)
        .background_color(Pen::Off)
        .build();
    let solid = PrimitiveStyle::with_stroke(Pen::On, 1);
    let toggle = PrimitiveStyle::with_stroke(Pen::Toggle, 1);

    let _ = Text::with_baseline("-0123456789E+00", Point::new(3, 10), text, Baseline::Top)
        .draw(display);

    let _ = RoundedRectangle::with_equal_corners(
        Rectangle::with_corners(Point::new(0, 6), Point::new(126, 25)),
        Size::new(5, 5),
    )
    .into_styled(solid)
    .draw(display);

    let _ = Line::new(Point::new(0, 0), Point::new(127, 0))
        .into_styled(solid)
        .draw(display);
    let _ = Line::new(Point::new(0, 31), Point::new(127, 31))
        .into_styled(solid)
        .draw(display);

    // The toggle pen inverts whatever it crosses, the original two-color
    // trick on a 1-bit plane.
    let _ = Line::new(Point::new(0, 0), Point::new(127, 31))
        .into_styled(toggle)
        .draw(display);
    let _ = Line::new(Point::new(0, 31), Point::new(127, 0))
        .into_styled(toggle)
        .draw(display);

    display.update()
}
