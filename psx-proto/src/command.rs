//! Command bytes for the poll exchange.
//!
//! Every exchange starts with the same three-byte header. The controller
//! answers the first byte with filler, the second with its identification
//! byte and the third with [`FRAME_MARKER`](crate::FRAME_MARKER). After the
//! header the host clocks one idle byte per payload byte announced by the ID.

/// Addresses the controller (as opposed to a memory card, 0x81).
pub const CMD_START: u8 = 0x01;

/// Read buttons and axes.
pub const CMD_POLL: u8 = 0x42;

/// Sent while the controller shifts payload bytes out.
pub const CMD_IDLE: u8 = 0x00;

/// Header clocked at the start of every poll exchange.
pub const POLL_HEADER: [u8; 3] = [CMD_START, CMD_POLL, CMD_IDLE];

/// Command byte to send at `index` of a poll exchange.
///
/// Payload positions carry the motor bytes on a DualShock; they are always
/// idle here.
#[inline]
#[must_use]
pub const fn poll_command_byte(index: usize) -> u8 {
    if index < POLL_HEADER.len() {
        POLL_HEADER[index]
    } else {
        CMD_IDLE
    }
}
