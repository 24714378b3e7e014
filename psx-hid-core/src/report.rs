//! HID gamepad report and the host echo buffer.

use heapless::Vec;

/// HID gamepad input report.
///
/// Byte layout (7 bytes):
///
/// | Byte | Field |
/// |------|-------|
/// | 0    | Buttons 1-8 |
/// | 1-2  | Reserved (always 0) |
/// | 3    | Stick X |
/// | 4    | Stick Y |
/// | 5    | Throttle X |
/// | 6    | Throttle Y |
///
/// Axes are unsigned with 0x80 as centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidReport {
    /// Button bitfield (8 buttons)
    pub buttons: u8,
    pub stick_x: u8,
    pub stick_y: u8,
    pub throttle_x: u8,
    pub throttle_y: u8,
}

impl HidReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 7;

    /// Centre position of every axis.
    pub const AXIS_CENTER: u8 = 0x80;

    /// No buttons pressed, all axes centred.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: 0,
            stick_x: Self::AXIS_CENTER,
            stick_y: Self::AXIS_CENTER,
            throttle_x: Self::AXIS_CENTER,
            throttle_y: Self::AXIS_CENTER,
        }
    }

    /// Convert the report to bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; Self::SIZE] {
        [
            self.buttons,
            0,
            0,
            self.stick_x,
            self.stick_y,
            self.throttle_x,
            self.throttle_y,
        ]
    }
}

impl Default for HidReport {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Largest host payload echoed back; matches the input report size.
pub const ECHO_CAPACITY: usize = HidReport::SIZE;

/// Copy of a host-to-device report that the device does not interpret.
///
/// The bridge sends it back unchanged on the input-report path; anything
/// past [`ECHO_CAPACITY`] bytes is dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostEcho(Vec<u8, ECHO_CAPACITY>);

impl HostEcho {
    /// Capture a host payload, truncated to [`ECHO_CAPACITY`].
    #[must_use]
    pub fn capture(data: &[u8]) -> Self {
        let len = data.len().min(ECHO_CAPACITY);
        let mut buf = Vec::new();
        // Cannot fail: len is clamped to capacity.
        let _ = buf.extend_from_slice(&data[..len]);
        Self(buf)
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HostEcho {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "HostEcho({=[u8]:02x})", self.as_slice())
    }
}
