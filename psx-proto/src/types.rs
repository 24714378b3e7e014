//! Wire-level types: controller identification, buttons, frames and payloads.

use core::ops::BitOr;
use heapless::Vec;

/// Largest frame the transport will clock: filler, ID, marker and 9 words.
pub const MAX_FRAME_LEN: usize = 21;

/// Number of bytes in front of the payload (filler, ID, marker).
pub const HEADER_LEN: usize = 3;

/// Largest payload carried by a frame.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - HEADER_LEN;

/// Marker byte the controller returns in frame position 2.
pub const FRAME_MARKER: u8 = 0x5A;

/// Variant of the attached controller, derived from the identification byte.
///
/// The high nibble of the ID selects the device family, the low nibble is
/// the number of 16-bit payload words that follow the marker byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerType {
    /// Digital pad (SCPH-1080 and DualShock in digital mode), ID 0x41.
    Digital,
    /// DualShock / Dual Analog in analog mode, ID 0x73.
    DualAnalog,
    /// Dual Analog in flight-stick ("green LED") mode, ID 0x53.
    AnalogJoystick,
    /// NeGcon twist pad, ID 0x23.
    NeGcon,
    /// PlayStation mouse, ID 0x12.
    Mouse,
    /// DualShock in configuration mode, ID 0xF3.
    Config,
    /// Nothing is driving the data line, ID 0xFF.
    None,
    /// Any identification byte not listed above.
    Unrecognized(u8),
}

impl ControllerType {
    pub const ID_DIGITAL: u8 = 0x41;
    pub const ID_DUAL_ANALOG: u8 = 0x73;
    pub const ID_ANALOG_JOYSTICK: u8 = 0x53;
    pub const ID_NEGCON: u8 = 0x23;
    pub const ID_MOUSE: u8 = 0x12;
    pub const ID_CONFIG: u8 = 0xF3;
    pub const ID_NONE: u8 = 0xFF;

    /// Classify an identification byte.
    #[must_use]
    pub const fn from_id(id: u8) -> Self {
        match id {
            Self::ID_DIGITAL => Self::Digital,
            Self::ID_DUAL_ANALOG => Self::DualAnalog,
            Self::ID_ANALOG_JOYSTICK => Self::AnalogJoystick,
            Self::ID_NEGCON => Self::NeGcon,
            Self::ID_MOUSE => Self::Mouse,
            Self::ID_CONFIG => Self::Config,
            Self::ID_NONE => Self::None,
            other => Self::Unrecognized(other),
        }
    }

    /// The identification byte this type was decoded from.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Digital => Self::ID_DIGITAL,
            Self::DualAnalog => Self::ID_DUAL_ANALOG,
            Self::AnalogJoystick => Self::ID_ANALOG_JOYSTICK,
            Self::NeGcon => Self::ID_NEGCON,
            Self::Mouse => Self::ID_MOUSE,
            Self::Config => Self::ID_CONFIG,
            Self::None => Self::ID_NONE,
            Self::Unrecognized(id) => id,
        }
    }

    /// Payload length in bytes announced by the identification byte.
    #[must_use]
    pub const fn payload_len(self) -> usize {
        payload_len_for_id(self.id())
    }
}

/// Payload length in bytes encoded in the low nibble of an ID byte.
///
/// A word count of zero means sixteen words.
#[inline]
#[must_use]
pub const fn payload_len_for_id(id: u8) -> usize {
    let words = (id & 0x0F) as usize;
    if words == 0 {
        32
    } else {
        words * 2
    }
}

/// Pad buttons as an active-high bitfield.
///
/// The wire sends two active-low bytes; bit layout here matches the wire
/// order after inversion: the first byte occupies bits 0..8, the second
/// byte bits 8..16.
///
/// ```
/// use psx_proto::PadButtons;
///
/// let buttons = PadButtons::from_wire([0xFF, 0x7F]);
/// assert!(buttons.is_pressed(PadButtons::SQUARE));
/// assert!(!buttons.is_pressed(PadButtons::CROSS));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadButtons(pub u16);

impl PadButtons {
    pub const SELECT: Self = Self(1 << 0);
    pub const L3: Self = Self(1 << 1);
    pub const R3: Self = Self(1 << 2);
    pub const START: Self = Self(1 << 3);
    pub const UP: Self = Self(1 << 4);
    pub const RIGHT: Self = Self(1 << 5);
    pub const DOWN: Self = Self(1 << 6);
    pub const LEFT: Self = Self(1 << 7);
    pub const L2: Self = Self(1 << 8);
    pub const R2: Self = Self(1 << 9);
    pub const L1: Self = Self(1 << 10);
    pub const R1: Self = Self(1 << 11);
    pub const TRIANGLE: Self = Self(1 << 12);
    pub const CIRCLE: Self = Self(1 << 13);
    pub const CROSS: Self = Self(1 << 14);
    pub const SQUARE: Self = Self(1 << 15);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Build from the two active-low button bytes as they arrive on the wire.
    #[inline]
    #[must_use]
    pub const fn from_wire(bytes: [u8; 2]) -> Self {
        Self(!u16::from_le_bytes(bytes))
    }

    /// Encode back into the two active-low wire bytes.
    #[inline]
    #[must_use]
    pub const fn to_wire(self) -> [u8; 2] {
        (!self.0).to_le_bytes()
    }

    /// Check if all the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, buttons: PadButtons) -> bool {
        (self.0 & buttons.0) == buttons.0
    }

    /// Check if the given button is pressed (alias for contains).
    #[inline]
    #[must_use]
    pub const fn is_pressed(self, button: PadButtons) -> bool {
        self.contains(button)
    }

    /// Check if any of the given buttons is pressed.
    #[inline]
    #[must_use]
    pub const fn intersects(self, buttons: PadButtons) -> bool {
        (self.0 & buttons.0) != 0
    }

    /// The d-pad portion of the bitfield.
    #[inline]
    #[must_use]
    pub const fn direction(self) -> Direction {
        Direction(((self.0 >> 4) & 0x0F) as u8)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for PadButtons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Four-way direction nibble, active high: Up, Right, Down, Left from bit 0.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Direction(pub u8);

impl Direction {
    pub const UP: u8 = 1 << 0;
    pub const RIGHT: u8 = 1 << 1;
    pub const DOWN: u8 = 1 << 2;
    pub const LEFT: u8 = 1 << 3;

    #[inline]
    #[must_use]
    pub const fn up(self) -> bool {
        self.0 & Self::UP != 0
    }

    #[inline]
    #[must_use]
    pub const fn right(self) -> bool {
        self.0 & Self::RIGHT != 0
    }

    #[inline]
    #[must_use]
    pub const fn down(self) -> bool {
        self.0 & Self::DOWN != 0
    }

    #[inline]
    #[must_use]
    pub const fn left(self) -> bool {
        self.0 & Self::LEFT != 0
    }
}

/// Raw positions of the two analog sticks, 0..=255 with centre near 0x80.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogSticks {
    pub right_x: u8,
    pub right_y: u8,
    pub left_x: u8,
    pub left_y: u8,
}

impl AnalogSticks {
    pub const CENTER: u8 = 0x80;

    pub const NEUTRAL: Self = Self {
        right_x: Self::CENTER,
        right_y: Self::CENTER,
        left_x: Self::CENTER,
        left_y: Self::CENTER,
    };
}

/// Bytes received during one command exchange, in the order they were clocked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl RawFrame {
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Build a frame from received bytes, keeping at most `MAX_FRAME_LEN`.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_FRAME_LEN);
        let mut frame = Self::new();
        // Cannot fail: len is clamped to capacity.
        let _ = frame.bytes.extend_from_slice(&bytes[..len]);
        frame
    }

    /// Append a received byte. Returns `false` when the frame is full.
    pub fn push(&mut self, byte: u8) -> bool {
        self.bytes.push(byte).is_ok()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Identification byte, if it was clocked.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<u8> {
        self.bytes.get(1).copied()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RawFrame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RawFrame({=[u8]:02x})", self.as_slice())
    }
}

/// Payload bytes that followed the marker byte in a frame.
///
/// Byte 0 and 1 are the active-low button bytes; analog variants append
/// right X, right Y, left X, left Y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawPayload {
    data: [u8; MAX_PAYLOAD_LEN],
    len: usize,
}

impl Default for RawPayload {
    fn default() -> Self {
        Self::empty()
    }
}

impl RawPayload {
    /// Payload with no bytes (used when nothing is attached).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            data: [0xFF; MAX_PAYLOAD_LEN],
            len: 0,
        }
    }

    /// Copy payload bytes, keeping at most `MAX_PAYLOAD_LEN`.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_PAYLOAD_LEN);
        let mut data = [0xFF; MAX_PAYLOAD_LEN];
        data[..len].copy_from_slice(&bytes[..len]);
        Self { data, len }
    }

    /// Payload of a digital pad with the given buttons held.
    #[must_use]
    pub fn digital(buttons: PadButtons) -> Self {
        Self::from_slice(&buttons.to_wire())
    }

    /// Payload of an analog pad with the given buttons held and stick positions.
    #[must_use]
    pub fn dual_analog(buttons: PadButtons, sticks: AnalogSticks) -> Self {
        let [b1, b2] = buttons.to_wire();
        Self::from_slice(&[
            b1,
            b2,
            sticks.right_x,
            sticks.right_y,
            sticks.left_x,
            sticks.left_y,
        ])
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decoded button state. Missing bytes read as released.
    #[must_use]
    pub const fn buttons(&self) -> PadButtons {
        if self.len < 2 {
            return PadButtons::NONE;
        }
        PadButtons::from_wire([self.data[0], self.data[1]])
    }

    /// Analog stick bytes, present only when the payload carries them.
    #[must_use]
    pub const fn sticks(&self) -> Option<AnalogSticks> {
        if self.len < 6 {
            return None;
        }
        Some(AnalogSticks {
            right_x: self.data[2],
            right_y: self.data[3],
            left_x: self.data[4],
            left_y: self.data[5],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_type_from_id() {
        assert_eq!(ControllerType::from_id(0x41), ControllerType::Digital);
        assert_eq!(ControllerType::from_id(0x73), ControllerType::DualAnalog);
        assert_eq!(ControllerType::from_id(0xFF), ControllerType::None);
        assert_eq!(
            ControllerType::from_id(0x99),
            ControllerType::Unrecognized(0x99)
        );
    }

    #[test]
    fn test_controller_type_id_roundtrip_for_known_codes() {
        for id in [0x41, 0x73, 0x53, 0x23, 0x12, 0xF3, 0xFF] {
            assert_eq!(ControllerType::from_id(id).id(), id);
        }
    }

    #[test]
    fn test_payload_len_from_id_nibble() {
        assert_eq!(ControllerType::Digital.payload_len(), 2);
        assert_eq!(ControllerType::DualAnalog.payload_len(), 6);
        assert_eq!(payload_len_for_id(0x79), 18);
        assert_eq!(payload_len_for_id(0x80), 32);
    }

    #[test]
    fn test_buttons_from_wire_is_active_low() {
        assert_eq!(PadButtons::from_wire([0xFF, 0xFF]), PadButtons::NONE);

        // Start is bit 3 of the first byte
        let buttons = PadButtons::from_wire([0xF7, 0xFF]);
        assert!(buttons.is_pressed(PadButtons::START));
        assert!(!buttons.is_pressed(PadButtons::SELECT));

        // Cross is bit 6 of the second byte
        let buttons = PadButtons::from_wire([0xFF, 0xBF]);
        assert_eq!(buttons, PadButtons::CROSS);
    }

    #[test]
    fn test_buttons_wire_roundtrip() {
        let buttons = PadButtons::SQUARE | PadButtons::L1 | PadButtons::UP;
        assert_eq!(PadButtons::from_wire(buttons.to_wire()), buttons);
    }

    #[test]
    fn test_buttons_intersects() {
        let buttons = PadButtons::L1;
        assert!(buttons.intersects(PadButtons::SQUARE | PadButtons::L1));
        assert!(!buttons.contains(PadButtons::SQUARE | PadButtons::L1));
    }

    #[test]
    fn test_direction_nibble() {
        let dir = (PadButtons::UP | PadButtons::LEFT).direction();
        assert!(dir.up());
        assert!(dir.left());
        assert!(!dir.down());
        assert!(!dir.right());
        assert_eq!(dir.0, Direction::UP | Direction::LEFT);
    }

    #[test]
    fn test_payload_sticks_only_when_present() {
        assert_eq!(RawPayload::digital(PadButtons::NONE).sticks(), None);

        let sticks = AnalogSticks {
            right_x: 1,
            right_y: 2,
            left_x: 3,
            left_y: 4,
        };
        let payload = RawPayload::dual_analog(PadButtons::CIRCLE, sticks);
        assert_eq!(payload.sticks(), Some(sticks));
        assert_eq!(payload.buttons(), PadButtons::CIRCLE);
    }

    #[test]
    fn test_empty_payload_has_no_buttons() {
        assert!(RawPayload::empty().buttons().is_empty());
    }

    #[test]
    fn test_raw_frame_capacity() {
        let mut frame = RawFrame::new();
        for i in 0..MAX_FRAME_LEN {
            assert!(frame.push(i as u8));
        }
        assert!(!frame.push(0));
        assert_eq!(frame.len(), MAX_FRAME_LEN);
        assert_eq!(frame.id(), Some(1));
    }
}
