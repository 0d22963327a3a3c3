//! Core display operations
//!
//! [`Display`] orchestrates the serial interface and the framebuffer: it runs
//! the device initialization sequence, tracks what the device's GRAM
//! currently holds, and flushes framebuffer changes through the page/column
//! addressing protocol.
//!
//! The GP9002 has no burst write in the addressing mode used here — every
//! GRAM byte costs four command bytes of addressing. `update` therefore
//! keeps a shadow of the last bytes written and only emits columns that
//! changed; [`redraw`](Display::redraw) forces the full walk.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::command::{
    ADDRESS_FIXED, AREA_ACTIVE, DISPLAY_AREA, DISPLAY_AREA_COUNT, DISPLAY_CLEAR, GRAM_POSITION,
    LAYER0_ON, MODE_NORMAL, SET_X_ADDRESS, SET_Y_ADDRESS,
};
use crate::framebuffer::{ADDRESSABLE_PAGES, Framebuffer, WIDTH};
use crate::interface::DisplayInterface;
use crate::pen::Pen;

/// Settle time after the display-clear command, in microseconds
///
/// The device needs at least 1 ms to finish clearing GRAM before it accepts
/// the next command.
pub const CLEAR_SETTLE_US: u32 = 1100;

type DisplayResult<I> = core::result::Result<(), <I as DisplayInterface>::Error>;

/// GP9002 display driver
///
/// Generic over the [`DisplayInterface`] so tests can capture the emitted
/// byte stream. Drawing mutates only the in-memory framebuffer; nothing
/// touches the wire until [`update`](Self::update) or
/// [`redraw`](Self::redraw).
///
/// Call [`init`](Self::init) once before drawing or updating. Dropping the
/// display releases the interface and its device handles.
pub struct Display<I>
where
    I: DisplayInterface,
{
    interface: I,
    framebuffer: Framebuffer,
    /// Last byte written to each addressable GRAM cell
    shadow: [u8; WIDTH * ADDRESSABLE_PAGES],
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display over an interface
    pub fn new(interface: I) -> Self {
        Self {
            interface,
            framebuffer: Framebuffer::new(),
            shadow: [0; WIDTH * ADDRESSABLE_PAGES],
        }
    }

    /// Reset the device and run the initialization sequence
    ///
    /// Pulses the reset line, waits out the post-reset settle time, then
    /// runs the device-clear sequence ([`clear`](Self::clear)). Any byte that
    /// fails to transfer aborts initialization.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        info!("display init");
        self.interface.reset(delay)?;
        self.clear(delay)
    }

    /// Clear the device and re-arm the display
    ///
    /// Issues the display-clear command, waits [`CLEAR_SETTLE_US`], marks all
    /// eight display areas active, enables layer 0 in normal mode with fixed
    /// addressing, and homes the GRAM write position. The framebuffer and
    /// the GRAM shadow are zeroed to match the cleared device.
    pub fn clear<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.write_command(DISPLAY_CLEAR)?;
        delay.delay_us(CLEAR_SETTLE_US);

        for area in 0..DISPLAY_AREA_COUNT {
            self.interface.write_command(DISPLAY_AREA)?;
            self.interface.write_command(area)?;
            self.interface.write_data(AREA_ACTIVE)?;
        }

        self.interface.write_command(LAYER0_ON)?;
        self.interface.write_command(MODE_NORMAL)?;
        self.interface.write_command(ADDRESS_FIXED)?;

        self.interface.write_command(GRAM_POSITION)?;
        self.interface.write_data(0x00)?;
        self.interface.write_data(0x00)?;

        self.framebuffer.clear();
        self.shadow = [0; WIDTH * ADDRESSABLE_PAGES];
        debug!("display cleared");
        Ok(())
    }

    /// Apply a pen to one pixel of the framebuffer
    ///
    /// Never touches the wire; out-of-range coordinates are ignored.
    pub fn draw_point(&mut self, x: i32, y: i32, pen: Pen) {
        self.framebuffer.draw_point(x, y, pen);
    }

    /// Flush framebuffer changes to the device
    ///
    /// Walks the 4 addressable pages column by column and emits an
    /// addressing sequence plus one data byte for every cell whose value
    /// differs from what the device holds. Cells that did not change emit
    /// nothing. Rows 32..63 of the framebuffer are outside the device's
    /// address space and are never flushed.
    pub fn update(&mut self) -> DisplayResult<I> {
        let mut flushed = 0usize;
        for page in 0..ADDRESSABLE_PAGES {
            for col in 0..WIDTH {
                let byte = self.framebuffer.byte(page, col);
                if byte != self.shadow[page * WIDTH + col] {
                    self.write_cell(page, col, byte)?;
                    flushed += 1;
                }
            }
        }
        debug!("update flushed {flushed} cells");
        Ok(())
    }

    /// Rewrite the entire addressable region unconditionally
    pub fn redraw(&mut self) -> DisplayResult<I> {
        for page in 0..ADDRESSABLE_PAGES {
            for col in 0..WIDTH {
                let byte = self.framebuffer.byte(page, col);
                self.write_cell(page, col, byte)?;
            }
        }
        debug!("redraw complete");
        Ok(())
    }

    /// Address one GRAM cell and write its byte
    fn write_cell(&mut self, page: usize, col: usize, byte: u8) -> DisplayResult<I> {
        self.interface.write_command(SET_Y_ADDRESS)?;
        self.interface.write_command(page as u8)?;
        self.interface.write_command(SET_X_ADDRESS)?;
        self.interface.write_command(col as u8)?;
        self.interface.write_data(byte)?;
        self.shadow[page * WIDTH + col] = byte;
        Ok(())
    }

    /// Access the framebuffer
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Access the framebuffer mutably
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// Access the underlying interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Access the underlying interface mutably
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One captured wire byte, tagged by the mode line
    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Wire {
        Cmd(u8),
        Data(u8),
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct MockFault;

    #[derive(Debug, Default)]
    struct MockInterface {
        stream: Vec<Wire>,
        resets: usize,
        /// Fail the transfer after this many bytes (length-mismatch stand-in)
        fail_after: Option<usize>,
    }

    impl MockInterface {
        fn check(&mut self) -> Result<(), MockFault> {
            match self.fail_after {
                Some(n) if self.stream.len() >= n => Err(MockFault),
                _ => Ok(()),
            }
        }
    }

    impl DisplayInterface for MockInterface {
        type Error = MockFault;

        fn write_command(&mut self, byte: u8) -> Result<(), Self::Error> {
            self.check()?;
            self.stream.push(Wire::Cmd(byte));
            Ok(())
        }

        fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
            self.check()?;
            self.stream.push(Wire::Data(byte));
            Ok(())
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            self.resets += 1;
            Ok(())
        }
    }

    struct MockDelay;
    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// DelayNs recording each wait in microseconds
    struct RecordingDelay {
        waits_us: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waits_us.push(ns / 1000);
        }
    }

    fn init_sequence() -> Vec<Wire> {
        let mut expected = vec![Wire::Cmd(DISPLAY_CLEAR)];
        for area in 0..8 {
            expected.push(Wire::Cmd(DISPLAY_AREA));
            expected.push(Wire::Cmd(area));
            expected.push(Wire::Data(0xFF));
        }
        expected.extend([
            Wire::Cmd(LAYER0_ON),
            Wire::Cmd(MODE_NORMAL),
            Wire::Cmd(ADDRESS_FIXED),
            Wire::Cmd(GRAM_POSITION),
            Wire::Data(0x00),
            Wire::Data(0x00),
        ]);
        expected
    }

    fn ready_display() -> Display<MockInterface> {
        let mut display = Display::new(MockInterface::default());
        display.init(&mut MockDelay).unwrap();
        display.interface_mut().stream.clear();
        display
    }

    #[test]
    fn test_init_emits_canonical_sequence() {
        let mut display = Display::new(MockInterface::default());
        display.init(&mut MockDelay).unwrap();

        assert_eq!(display.interface().resets, 1);
        assert_eq!(display.interface().stream, init_sequence());
    }

    #[test]
    fn test_init_waits_clear_settle() {
        let mut display = Display::new(MockInterface::default());
        let mut delay = RecordingDelay { waits_us: vec![] };
        display.init(&mut delay).unwrap();
        assert!(delay.waits_us.contains(&CLEAR_SETTLE_US));
    }

    #[test]
    fn test_init_failure_aborts() {
        // Fail on the very first command byte.
        let interface = MockInterface {
            fail_after: Some(0),
            ..MockInterface::default()
        };
        let mut display = Display::new(interface);
        assert_eq!(display.init(&mut MockDelay), Err(MockFault));
    }

    #[test]
    fn test_init_failure_mid_sequence_aborts() {
        let interface = MockInterface {
            fail_after: Some(5),
            ..MockInterface::default()
        };
        let mut display = Display::new(interface);
        assert_eq!(display.init(&mut MockDelay), Err(MockFault));
        assert_eq!(display.interface().stream.len(), 5);
    }

    #[test]
    fn test_update_emits_single_dirty_cell() {
        let mut display = ready_display();
        display.draw_point(5, 0, Pen::On);
        display.update().unwrap();

        assert_eq!(
            display.interface().stream,
            vec![
                Wire::Cmd(SET_Y_ADDRESS),
                Wire::Cmd(0),
                Wire::Cmd(SET_X_ADDRESS),
                Wire::Cmd(5),
                Wire::Data(0x80),
            ]
        );
    }

    #[test]
    fn test_update_clean_framebuffer_emits_nothing() {
        let mut display = ready_display();
        display.update().unwrap();
        assert!(display.interface().stream.is_empty());
    }

    #[test]
    fn test_update_is_incremental() {
        let mut display = ready_display();
        display.draw_point(5, 0, Pen::On);
        display.update().unwrap();
        display.interface_mut().stream.clear();

        // Nothing changed since the last flush.
        display.update().unwrap();
        assert!(display.interface().stream.is_empty());

        // Clearing the pixel is a change and must be flushed.
        display.draw_point(5, 0, Pen::Off);
        display.update().unwrap();
        assert_eq!(
            display.interface().stream,
            vec![
                Wire::Cmd(SET_Y_ADDRESS),
                Wire::Cmd(0),
                Wire::Cmd(SET_X_ADDRESS),
                Wire::Cmd(5),
                Wire::Data(0x00),
            ]
        );
    }

    #[test]
    fn test_update_addresses_correct_page() {
        let mut display = ready_display();
        // Row 17 is page 2, bit 6.
        display.draw_point(100, 17, Pen::On);
        display.update().unwrap();
        assert_eq!(
            display.interface().stream,
            vec![
                Wire::Cmd(SET_Y_ADDRESS),
                Wire::Cmd(2),
                Wire::Cmd(SET_X_ADDRESS),
                Wire::Cmd(100),
                Wire::Data(0x40),
            ]
        );
    }

    #[test]
    fn test_update_skips_rows_outside_address_space() {
        let mut display = ready_display();
        display.draw_point(0, 40, Pen::On);
        display.update().unwrap();
        assert!(display.interface().stream.is_empty());
    }

    #[test]
    fn test_redraw_walks_whole_addressable_region() {
        let mut display = ready_display();
        display.redraw().unwrap();
        // 4 pages x 128 columns, 5 bytes per cell.
        assert_eq!(display.interface().stream.len(), 4 * 128 * 5);
        assert_eq!(
            &display.interface().stream[..5],
            &[
                Wire::Cmd(SET_Y_ADDRESS),
                Wire::Cmd(0),
                Wire::Cmd(SET_X_ADDRESS),
                Wire::Cmd(0),
                Wire::Data(0x00),
            ]
        );
    }

    #[test]
    fn test_redraw_syncs_shadow() {
        let mut display = ready_display();
        display.draw_point(5, 0, Pen::On);
        display.redraw().unwrap();
        display.interface_mut().stream.clear();
        // Already on the device; nothing left to flush.
        display.update().unwrap();
        assert!(display.interface().stream.is_empty());
    }

    #[test]
    fn test_clear_resets_shadow_and_framebuffer() {
        let mut display = ready_display();
        display.draw_point(5, 0, Pen::On);
        display.update().unwrap();
        display.clear(&mut MockDelay).unwrap();
        display.interface_mut().stream.clear();

        // Device GRAM is zero again; a set pixel must be re-emitted.
        display.draw_point(5, 0, Pen::On);
        display.update().unwrap();
        assert_eq!(display.interface().stream.len(), 5);
        assert_eq!(display.framebuffer().pixel(5, 0), Some(true));
    }

    #[test]
    fn test_update_failure_propagates() {
        let mut display = ready_display();
        display.draw_point(5, 0, Pen::On);
        display.interface_mut().fail_after = Some(2);
        assert_eq!(display.update(), Err(MockFault));
    }

    #[test]
    fn test_draw_point_never_touches_the_wire() {
        let mut display = ready_display();
        for x in 0..128 {
            display.draw_point(x, 3, Pen::Toggle);
        }
        assert!(display.interface().stream.is_empty());
    }
}
