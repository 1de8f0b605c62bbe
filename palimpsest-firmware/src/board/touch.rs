//! FT6x36 capacitive touch readout
//!
//! Minimal register-level polling: one burst read yields the contact
//! count and up to two positions. The controller is polled, not
//! interrupt-driven; the sampling task sets the cadence.

use embassy_rp::i2c::{Async, Error, I2c};
use embedded_hal_async::i2c::I2c as _;

use palimpsest_core::geom::Point;
use palimpsest_core::sampler::ContactFrame;

/// 7-bit bus address
const FT6X36_ADDR: u8 = 0x38;

/// First register of the status block
const REG_DEV_MODE: u8 = 0x00;

/// Device mode through the P2 coordinate registers
const STATUS_LEN: usize = 13;

/// Offset of the contact count register in the block
const TD_STATUS: usize = 2;
/// Offset of the first contact's coordinate registers; contacts are
/// spaced six registers apart
const P1_BASE: usize = 3;
const CONTACT_STRIDE: usize = 6;

/// The touch controller on the I2C bus
pub struct TouchPanel<'d> {
    bus: I2c<'d, Async>,
}

impl<'d> TouchPanel<'d> {
    pub fn new(bus: I2c<'d, Async>) -> Self {
        Self { bus }
    }

    /// Poll the controller once
    ///
    /// An empty frame means no finger is down.
    pub async fn poll(&mut self) -> Result<ContactFrame, Error> {
        let mut regs = [0u8; STATUS_LEN];
        self.bus
            .write_read(FT6X36_ADDR, &[REG_DEV_MODE], &mut regs)
            .await?;

        let mut frame = ContactFrame::new();
        let count = (regs[TD_STATUS] & 0x0F).min(2) as usize;
        for slot in 0..count {
            let base = P1_BASE + slot * CONTACT_STRIDE;
            // Coordinates are 12 bits split across high/low registers
            let x = ((regs[base] as i32 & 0x0F) << 8) | regs[base + 1] as i32;
            let y = ((regs[base + 2] as i32 & 0x0F) << 8) | regs[base + 3] as i32;
            let _ = frame.push(Point::new(x, y));
        }
        Ok(frame)
    }
}
