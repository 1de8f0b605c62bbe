//! Palimpsest - e-paper sketchpad firmware
//!
//! Firmware binary for RP2040-driven e-ink drawing tablets. A touch
//! sampling task on core 1 feeds stroke segments through a lock-free
//! ring to the render task on core 0, which paces the slow e-paper
//! refreshes and draws the battery gauge.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Executor;
use embassy_rp::adc::{Adc, Channel as AdcChannel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, InterruptHandler as I2cInterruptHandler};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::I2C1;
use embassy_rp::spi::{self, Spi};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use palimpsest_core::ring::StrokeRing;

use crate::board::panel::{EpdPanel, FrameBuffer};
use crate::board::touch::TouchPanel;
use crate::config::TOUCH_STACK_BYTES;

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C1_IRQ => I2cInterruptHandler<I2C1>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Frame buffer must live forever; the panel holds a reference to it
static FRAME: StaticCell<FrameBuffer> = StaticCell::new();

// One executor per core; touch sampling gets core 1 to itself
static mut CORE1_STACK: Stack<TOUCH_STACK_BYTES> = Stack::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

/// Main entry point
#[cortex_m_rt::entry]
fn main() -> ! {
    info!("Palimpsest firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Stroke ring: writer half to the touch task, reader half to render
    let ring = channels::STROKE_RING.init(StrokeRing::new());
    let (writer, reader) = ring.split();

    // E-paper panel on SPI0
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 4_000_000;
    let epd_spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_20, Level::Low);
    let rst = Output::new(p.PIN_21, Level::High);
    let busy = Input::new(p.PIN_22, Pull::None);

    let frame = FRAME.init(FrameBuffer::new());
    let mut panel = EpdPanel::new(epd_spi, cs, dc, rst, busy, frame);
    match panel.init() {
        Ok(()) => info!("Panel initialized"),
        Err(e) => {
            error!("Panel init failed: {}", e);
            core::panic!("panel fault");
        }
    }

    // Battery sense on VSYS/3 (ADC3)
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let vsys = AdcChannel::new_pin(p.PIN_29, Pull::None);

    // Touch controller on I2C1, clear button on a side GPIO
    let touch_i2c = i2c::I2c::new_async(p.I2C1, p.PIN_15, p.PIN_14, Irqs, i2c::Config::default());
    let touch = TouchPanel::new(touch_i2c);
    let clear_button = Input::new(p.PIN_12, Pull::Up);

    info!("Board peripherals initialized");

    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| {
                spawner
                    .spawn(tasks::touch_task(touch, clear_button, writer))
                    .unwrap();
            })
        },
    );

    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        spawner.spawn(tasks::render_task(panel, adc, vsys, reader)).unwrap();
    })
}
