//! E-paper panel and frame buffer
//!
//! A 2-bpp grayscale frame buffer in RAM, flushed over SPI to a
//! UC8176-class 400x300 panel. Strokes and the gauge draw through the
//! core `Canvas` trait; the diagnostic text goes through
//! embedded-graphics.
//!
//! The flush is blocking. That stalls this core for the duration of the
//! e-paper refresh, which is why touch sampling runs on the other core.

use embassy_rp::gpio::{Input, Output};
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{block_for, Duration, Instant};
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Gray2, GrayColor};
use embedded_graphics::text::Text;
use embedded_graphics::{Drawable, Pixel};

use palimpsest_core::canvas::{Canvas, PanelError, Shade};

use crate::config::{PANEL_HEIGHT, PANEL_WIDTH};

/// UC8176 command set (the subset used here)
mod cmd {
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_ON: u8 = 0x04;
    pub const BOOSTER_SOFT_START: u8 = 0x06;
    pub const DATA_START_OLD: u8 = 0x10;
    pub const DISPLAY_REFRESH: u8 = 0x12;
    pub const DATA_START_NEW: u8 = 0x13;
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    pub const RESOLUTION: u8 = 0x61;
}

/// 2-bpp pixel levels, 0 = black .. 3 = white
const LEVEL_BLACK: u8 = 0b00;
const LEVEL_DARK: u8 = 0b01;
const LEVEL_WHITE: u8 = 0b11;

/// How long to wait on the busy line before declaring the panel dead
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Baseline offset for the 6x10 diagnostic font
const TEXT_BASELINE: i32 = 8;

const BUF_BYTES: usize = PANEL_WIDTH * PANEL_HEIGHT / 4;
const ROW_PLANE_BYTES: usize = PANEL_WIDTH / 8;

/// RAM copy of the panel contents, four pixels per byte
pub struct FrameBuffer {
    pixels: [u8; BUF_BYTES],
}

impl FrameBuffer {
    pub const fn new() -> Self {
        // All white
        Self {
            pixels: [0xFF; BUF_BYTES],
        }
    }

    fn set(&mut self, x: i32, y: i32, level: u8) {
        if x < 0 || y < 0 || x >= PANEL_WIDTH as i32 || y >= PANEL_HEIGHT as i32 {
            return;
        }
        let index = y as usize * PANEL_WIDTH + x as usize;
        let shift = (3 - (index % 4)) * 2;
        let byte = &mut self.pixels[index / 4];
        *byte = (*byte & !(0b11 << shift)) | (level << shift);
    }

    fn get(&self, x: usize, y: usize) -> u8 {
        let index = y * PANEL_WIDTH + x;
        let shift = (3 - (index % 4)) * 2;
        (self.pixels[index / 4] >> shift) & 0b11
    }

    fn fill(&mut self, level: u8) {
        let packed = level | level << 2 | level << 4 | level << 6;
        self.pixels.fill(packed);
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(PANEL_WIDTH as u32, PANEL_HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Gray2;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(position, color) in pixels {
            self.set(position.x, position.y, color.luma());
        }
        Ok(())
    }
}

/// A UC8176-class panel with its frame buffer
pub struct EpdPanel<'d> {
    spi: Spi<'d, Blocking>,
    cs: Output<'d>,
    dc: Output<'d>,
    rst: Output<'d>,
    busy: Input<'d>,
    frame: &'static mut FrameBuffer,
}

impl<'d> EpdPanel<'d> {
    pub fn new(
        spi: Spi<'d, Blocking>,
        cs: Output<'d>,
        dc: Output<'d>,
        rst: Output<'d>,
        busy: Input<'d>,
        frame: &'static mut FrameBuffer,
    ) -> Self {
        Self {
            spi,
            cs,
            dc,
            rst,
            busy,
            frame,
        }
    }

    /// Reset and power up the controller
    ///
    /// Uses the controller's OTP waveform tables, so no LUT upload is
    /// needed for the 4-gray mode.
    pub fn init(&mut self) -> Result<(), PanelError> {
        self.rst.set_low();
        block_for(Duration::from_millis(10));
        self.rst.set_high();
        block_for(Duration::from_millis(10));

        self.command(cmd::BOOSTER_SOFT_START)?;
        self.data(&[0x17, 0x17, 0x17])?;
        self.command(cmd::POWER_ON)?;
        self.busy_wait()?;
        self.command(cmd::PANEL_SETTING)?;
        self.data(&[0x3F])?;
        self.command(cmd::RESOLUTION)?;
        self.data(&[0x01, 0x90, 0x01, 0x2C])?;
        self.command(cmd::VCOM_DATA_INTERVAL)?;
        self.data(&[0x97])?;
        Ok(())
    }

    fn command(&mut self, op: u8) -> Result<(), PanelError> {
        self.dc.set_low();
        self.cs.set_low();
        let result = self.spi.blocking_write(&[op]);
        self.cs.set_high();
        result.map_err(|_| PanelError::Bus)
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), PanelError> {
        self.dc.set_high();
        self.cs.set_low();
        let result = self.spi.blocking_write(bytes);
        self.cs.set_high();
        result.map_err(|_| PanelError::Bus)
    }

    /// Busy line is low while the controller works
    fn busy_wait(&mut self) -> Result<(), PanelError> {
        let deadline = Instant::now() + BUSY_TIMEOUT;
        while self.busy.is_low() {
            if Instant::now() > deadline {
                return Err(PanelError::Timeout);
            }
            block_for(Duration::from_millis(1));
        }
        Ok(())
    }

    /// Send one bit plane of the frame, row by row
    ///
    /// The controller derives the four gray levels from the old-data and
    /// new-data RAM planes; bit 1 of each pixel level feeds the old
    /// plane, bit 0 the new one.
    fn write_plane(&mut self, register: u8, bit: u8) -> Result<(), PanelError> {
        self.command(register)?;
        let mut row = [0u8; ROW_PLANE_BYTES];
        for y in 0..PANEL_HEIGHT {
            for (i, byte) in row.iter_mut().enumerate() {
                let mut packed = 0u8;
                for b in 0..8 {
                    let level = self.frame.get(i * 8 + b, y);
                    packed = (packed << 1) | ((level >> bit) & 1);
                }
                *byte = packed;
            }
            self.data(&row)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PanelError> {
        self.write_plane(cmd::DATA_START_OLD, 1)?;
        self.write_plane(cmd::DATA_START_NEW, 0)?;
        self.command(cmd::DISPLAY_REFRESH)?;
        self.busy_wait()
    }
}

impl Canvas for EpdPanel<'_> {
    fn width(&self) -> i32 {
        PANEL_WIDTH as i32
    }

    fn height(&self) -> i32 {
        PANEL_HEIGHT as i32
    }

    fn begin_frame(&mut self) -> Result<(), PanelError> {
        // Drawing is RAM-side; the panel only sees the flush.
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), PanelError> {
        self.flush()
    }

    fn clear_frame(&mut self) {
        self.frame.fill(LEVEL_WHITE);
    }

    fn set_pixel(&mut self, x: i32, y: i32, shade: Shade) {
        let level = match shade {
            Shade::Ink => LEVEL_BLACK,
            Shade::Halo => LEVEL_DARK,
        };
        self.frame.set(x, y, level);
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, shade: Shade) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.fill_rect(x, y, w, 1, shade);
        self.fill_rect(x, y + h - 1, w, 1, shade);
        self.fill_rect(x, y, 1, h, shade);
        self.fill_rect(x + w - 1, y, 1, h, shade);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, shade: Shade) {
        let level = match shade {
            Shade::Ink => LEVEL_BLACK,
            Shade::Halo => LEVEL_DARK,
        };
        for yy in y..y + h {
            for xx in x..x + w {
                self.frame.set(xx, yy, level);
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        let style = MonoTextStyle::new(&FONT_6X10, Gray2::BLACK);
        let origin = embedded_graphics::geometry::Point::new(x, y + TEXT_BASELINE);
        let _ = Text::new(text, origin, style).draw(self.frame);
    }
}
