//! Button layouts selected by the mode switch.
//!
//! Different host consoles expect different button orders, so one physical
//! pad can be presented in two arrangements. Each layout is a table of
//! (output bit, source buttons) pairs; an output bit is set when any of its
//! source buttons is held.

use psx_proto::PadButtons;

/// One entry of a layout table: output bit and the pad buttons that drive it.
pub type ButtonRoute = (u8, PadButtons);

/// Arrangement of pad buttons on the 8 HID buttons.
///
/// | HID bit | MegaDriveMini | SixButton |
/// |---------|---------------|-----------|
/// | 0 (A)   | Square, L1    | Cross     |
/// | 1 (B)   | Triangle, R1, Cross | Circle |
/// | 2 (C)   | Circle        | R1        |
/// | 3 (D)   | R2            | Square    |
/// | 4 (E1)  | -             | Triangle  |
/// | 5 (E2)  | -             | L1        |
/// | 6       | Select        | Select    |
/// | 7       | Start         | Start     |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonLayout {
    /// Mode pin low. Arrangement for the Mega Drive Mini 2 controller port.
    MegaDriveMini,
    /// Mode pin high (pull-up default). Six-button arcade stick arrangement.
    SixButton,
}

const MEGA_DRIVE_MINI: [ButtonRoute; 6] = [
    (0, PadButtons(PadButtons::SQUARE.0 | PadButtons::L1.0)),
    (
        1,
        PadButtons(PadButtons::TRIANGLE.0 | PadButtons::R1.0 | PadButtons::CROSS.0),
    ),
    (2, PadButtons::CIRCLE),
    (3, PadButtons::R2),
    (6, PadButtons::SELECT),
    (7, PadButtons::START),
];

const SIX_BUTTON: [ButtonRoute; 8] = [
    (0, PadButtons::CROSS),
    (1, PadButtons::CIRCLE),
    (2, PadButtons::R1),
    (3, PadButtons::SQUARE),
    (4, PadButtons::TRIANGLE),
    (5, PadButtons::L1),
    (6, PadButtons::SELECT),
    (7, PadButtons::START),
];

impl ButtonLayout {
    /// Layout for the current level of the mode pin.
    #[inline]
    #[must_use]
    pub const fn from_mode_pin(high: bool) -> Self {
        if high {
            Self::SixButton
        } else {
            Self::MegaDriveMini
        }
    }

    /// The routing table for this layout.
    #[must_use]
    pub const fn routes(self) -> &'static [ButtonRoute] {
        match self {
            Self::MegaDriveMini => &MEGA_DRIVE_MINI,
            Self::SixButton => &SIX_BUTTON,
        }
    }

    /// Map pad buttons onto the HID button byte.
    #[must_use]
    pub fn map(self, buttons: PadButtons) -> u8 {
        map_buttons(self.routes(), buttons)
    }
}

/// Apply a routing table to the pad buttons.
#[must_use]
pub fn map_buttons(routes: &[ButtonRoute], buttons: PadButtons) -> u8 {
    routes
        .iter()
        .filter(|(_, sources)| buttons.intersects(*sources))
        .fold(0u8, |acc, (bit, _)| acc | (1u8 << *bit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_pin_selects_layout() {
        assert_eq!(ButtonLayout::from_mode_pin(false), ButtonLayout::MegaDriveMini);
        assert_eq!(ButtonLayout::from_mode_pin(true), ButtonLayout::SixButton);
    }

    #[test]
    fn test_mega_drive_mini_shared_bits() {
        let layout = ButtonLayout::MegaDriveMini;
        assert_eq!(layout.map(PadButtons::SQUARE), 0b0000_0001);
        assert_eq!(layout.map(PadButtons::L1), 0b0000_0001);
        assert_eq!(layout.map(PadButtons::SQUARE | PadButtons::L1), 0b0000_0001);
        assert_eq!(layout.map(PadButtons::TRIANGLE), 0b0000_0010);
        assert_eq!(layout.map(PadButtons::R1), 0b0000_0010);
        assert_eq!(layout.map(PadButtons::CROSS), 0b0000_0010);
    }

    #[test]
    fn test_mega_drive_mini_leaves_bits_4_and_5_clear() {
        let all = PadButtons(0xFFFF);
        assert_eq!(ButtonLayout::MegaDriveMini.map(all), 0b1100_1111);
    }

    #[test]
    fn test_six_button_layout() {
        let layout = ButtonLayout::SixButton;
        assert_eq!(layout.map(PadButtons::CROSS), 1 << 0);
        assert_eq!(layout.map(PadButtons::CIRCLE), 1 << 1);
        assert_eq!(layout.map(PadButtons::R1), 1 << 2);
        assert_eq!(layout.map(PadButtons::SQUARE), 1 << 3);
        assert_eq!(layout.map(PadButtons::TRIANGLE), 1 << 4);
        assert_eq!(layout.map(PadButtons::L1), 1 << 5);
        assert_eq!(layout.map(PadButtons::SELECT), 1 << 6);
        assert_eq!(layout.map(PadButtons::START), 1 << 7);
    }

    #[test]
    fn test_unmapped_buttons_are_ignored() {
        let unmapped = PadButtons::L2 | PadButtons::L3 | PadButtons::R3 | PadButtons::UP;
        assert_eq!(ButtonLayout::MegaDriveMini.map(unmapped), 0);
        assert_eq!(ButtonLayout::SixButton.map(unmapped | PadButtons::R2), 0);
    }
}
