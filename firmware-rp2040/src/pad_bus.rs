//! PSX controller bus wiring on SPI0.

use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{PIN_16, PIN_17, PIN_18, PIN_19, PIN_20, SPI0};
use embassy_rp::spi::{self, Spi};
use embassy_rp::Peri;
use embassy_time::Delay;
use psx_proto::PsxBus;

use crate::config::PAD_SPI_FREQUENCY;
use crate::{PadSpi, Rp2040PadBus};

/// SPI mode 3 at the pad clock rate.
#[must_use]
pub fn pad_spi_config() -> spi::Config {
    let mut config = spi::Config::default();
    config.frequency = PAD_SPI_FREQUENCY;
    config.polarity = spi::Polarity::IdleHigh;
    config.phase = spi::Phase::CaptureOnSecondTransition;
    config
}

/// Build the controller bus from its pins.
///
/// SELECT starts deasserted (high) and ACK is pulled up so an empty port
/// reads as "no acknowledge".
pub fn new_pad_bus(
    spi0: Peri<'static, SPI0>,
    miso: Peri<'static, PIN_16>,
    select: Peri<'static, PIN_17>,
    sck: Peri<'static, PIN_18>,
    mosi: Peri<'static, PIN_19>,
    ack: Peri<'static, PIN_20>,
) -> Rp2040PadBus {
    let spi: PadSpi = Spi::new_blocking(spi0, sck, mosi, miso, pad_spi_config());
    let select = Output::new(select, Level::High);
    let ack = Input::new(ack, Pull::Up);

    PsxBus::new(spi, select, ack, Delay)
}
