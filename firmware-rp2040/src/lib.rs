//! PSX controller to USB HID gamepad bridge for RP2040.
//!
//! This crate provides the embedded implementation of a bridge that polls
//! a PlayStation controller over its serial bus and presents it to the host
//! as a USB HID gamepad.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Polls the pad every millisecond over SPI0 (250 kHz, mode 3, LSB first)
//! 2. Decodes the reply and translates it into a 7-byte HID report
//! 3. Hands the report to the USB HID input endpoint
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | SPI0 RX  | 16   | DATA from the pad |
//! | SELECT   | 17   | ATT, active low |
//! | SPI0 SCK | 18   | CLOCK |
//! | SPI0 TX  | 19   | COMMAND to the pad |
//! | ACK      | 20   | Acknowledge, pulled up |
//! | MODE     | 21   | Button layout switch, pulled up |
//! | LED      | 25   | On-board LED (pad reported) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with four concurrent tasks:
//!
//! - **USB Task**: Manages the USB device stack
//! - **Poll Task**: Ticks the [`PollScheduler`] every poll interval
//! - **HID In Task**: Writes reports and host echoes to the input endpoint
//! - **HID Out Task**: Receives host output reports for echo
//!
//! Reports cross from the poll task to the HID writer through Embassy's
//! [`Signal`](embassy_sync::signal::Signal), so only the latest report is
//! ever pending.
//!
//! # Modules
//!
//! - [`config`]: Pin map, timings and USB identity
//! - [`pad_bus`]: SPI0 wiring of the controller bus ([`new_pad_bus`])
//! - [`usb_output`]: USB HID output ([`UsbHidOutput`], [`UsbHidWriter`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//!
//! # Re-exports
//!
//! This crate re-exports the main items from [`psx_proto`] and
//! [`psx_hid_core`] for convenience, so consumers only need to depend on
//! this crate.

#![no_std]

use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};

// Re-export core types for convenience
pub use psx_hid_core::{
    translate, ButtonLayout, CycleError, CycleOutcome, HidReport, HostEcho, OutputError,
    PollScheduler, ReportSink,
};
pub use psx_proto::{decode, BusError, ControllerType, DecodeError, PadBus, PsxBus};

pub mod config;
pub mod pad_bus;
pub mod usb_output;

pub use pad_bus::{new_pad_bus, pad_spi_config};
pub use usb_output::{
    configure_usb_hid, EchoRequestHandler, PadHid, UsbDriver, UsbHidOutput, UsbHidWriter,
    UsbStateHandler, REPORT_DESCRIPTOR,
};

/// Blocking SPI0 used for the controller bus.
pub type PadSpi = Spi<'static, SPI0, Blocking>;

/// Controller bus as wired on the Pico.
pub type Rp2040PadBus = PsxBus<PadSpi, Output<'static>, Input<'static>, embassy_time::Delay>;

/// Scheduler with the board's bus, USB sink, mode switch and status LED.
pub type PadScheduler = PollScheduler<Rp2040PadBus, UsbHidOutput, Input<'static>, Output<'static>>;
