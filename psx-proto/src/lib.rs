//! PSX controller wire protocol.
//!
//! This crate talks to a PlayStation-family controller over a clocked
//! serial bus and decodes what it sends back. It has no chip-specific
//! dependencies: the bus is built from `embedded-hal` 1.0 traits.
//!
//! - [`types`]: Identification codes, button bitfield, frames and payloads
//! - [`command`]: The poll command sequence
//! - [`transport`]: Bus transport ([`PsxBus`], [`PadBus`])
//! - [`decoder`]: Frame decoding ([`decode`])
//!
//! # Wire protocol
//!
//! ```text
//! host:  01  42  00  00  00 [00 00 00 00]
//! pad:   FF  ID  5A  B1  B2 [RX RY LX LY]
//! ```
//!
//! Bytes are shifted LSB first with the clock idling high. The controller
//! pulses its acknowledge line low after every byte except the last. The
//! low nibble of `ID` is the number of 16-bit payload words.
//!
//! # Example
//!
//! ```
//! use psx_proto::{decode, ControllerType};
//!
//! let frame = [0xFF, 0x73, 0x5A, 0xFF, 0xFF, 0x80, 0x80, 0x00, 0xFF];
//! let reading = decode(&frame).unwrap();
//! assert_eq!(reading.kind, ControllerType::DualAnalog);
//! assert_eq!(reading.payload.sticks().unwrap().left_y, 0xFF);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod command;
pub mod decoder;
pub mod transport;
pub mod types;

pub use command::{poll_command_byte, CMD_IDLE, CMD_POLL, CMD_START, POLL_HEADER};
pub use decoder::{decode, DecodeError, PadReading};
pub use transport::{BusConfig, BusError, PadBus, PsxBus};
pub use types::{
    payload_len_for_id, AnalogSticks, ControllerType, Direction, PadButtons, RawFrame,
    RawPayload, FRAME_MARKER, HEADER_LEN, MAX_FRAME_LEN, MAX_PAYLOAD_LEN,
};
