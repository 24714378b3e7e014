//! Board configuration constants.
//!
//! Pin assignments and timings for a Raspberry Pi Pico wired to a PSX
//! controller port.

use psx_hid_core::DEFAULT_POLL_INTERVAL_MS;

// Controller bus
/// PSX controller SPI frequency in Hz
pub const PAD_SPI_FREQUENCY: u32 = 250_000;

/// Minimum time between two poll cycles in milliseconds
pub const POLL_INTERVAL_MS: u64 = DEFAULT_POLL_INTERVAL_MS;

// USB
/// pid.codes test VID/PID
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;

pub const USB_MANUFACTURER: &str = "Rust Gamepad";
pub const USB_PRODUCT: &str = "PSX-to-HID Bridge";
pub const USB_SERIAL: &str = "001";

/// Bus power draw reported to the host, in mA
pub const USB_MAX_POWER_MA: u16 = 100;

/// HID interrupt endpoint polling interval
pub const HID_POLL_MS: u8 = 1;

/// HID endpoint packet size
pub const HID_PACKET_SIZE: usize = 8;

// Pin Mapping Documentation
// Pin assignments for the RP2040
//
// PSX Controller (SPI0):
// - PIN_16: MISO / DATA (from controller, needs pull-up on the pad side)
// - PIN_17: SELECT / ATT (active low)
// - PIN_18: SCK / CLOCK
// - PIN_19: MOSI / COMMAND
// - PIN_20: ACK (pull-up)
//
// Mode switch:
// - PIN_21: layout select (pull-up, low = Mega Drive Mini, high = six-button)
//
// Status:
// - PIN_25: on-board LED (lit while a pad is being reported)
