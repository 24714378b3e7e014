//! Platform-agnostic PSX-to-HID translation and polling.
//!
//! This crate turns decoded PSX controller readings into USB HID gamepad
//! reports and drives the poll cycle, without any platform-specific
//! dependencies. It can be used both in embedded `no_std` environments and
//! on host for testing.
//!
//! # Overview
//!
//! - [`report`]: The 7-byte HID report ([`HidReport`]) and host echo buffer
//! - [`layout`]: Button layouts selected by the mode switch ([`ButtonLayout`])
//! - [`translate`](mod@translate): Reading-to-report translation ([`translate()`])
//! - [`output`]: Report sink trait ([`ReportSink`])
//! - [`scheduler`]: Orchestrates poll, decode, translate, submit ([`PollScheduler`])
//!
//! # Example
//!
//! ```rust
//! use psx_hid_core::{translate, ButtonLayout};
//! use psx_proto::decode;
//!
//! // Digital pad, Square held, d-pad up
//! let reading = decode(&[0xFF, 0x41, 0x5A, 0xEF, 0x7F]).unwrap();
//! let report = translate(reading.kind, &reading.payload, ButtonLayout::MegaDriveMini).unwrap();
//! assert_eq!(report.as_bytes(), [0x01, 0, 0, 0x80, 0x00, 0x80, 0x80]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod layout;
pub mod output;
pub mod report;
pub mod scheduler;
pub mod translate;

// Re-export main types at crate root
pub use layout::{map_buttons, ButtonLayout, ButtonRoute};
pub use output::{OutputError, ReportSink};
pub use report::{HidReport, HostEcho, ECHO_CAPACITY};
pub use scheduler::{
    CycleError, CycleOutcome, PollContext, PollScheduler, DEFAULT_POLL_INTERVAL_MS,
};
pub use translate::{dpad_to_axes, translate};
