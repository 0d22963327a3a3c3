//! Blocking delay for hosted Linux
//!
//! All protocol settle times in this crate are driven through
//! [`DelayNs`], so tests can substitute recording or no-op clocks.
//! [`Delay`] is the production implementation over [`std::thread::sleep`],
//! which guarantees at-least semantics — exactly what the device timing
//! requirements ask for.

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] implementation backed by [`std::thread::sleep`]
#[derive(Clone, Copy, Debug, Default)]
pub struct Delay;

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}
