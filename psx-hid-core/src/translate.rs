//! Decoded controller state to HID report.

use crate::layout::ButtonLayout;
use crate::report::HidReport;
use psx_proto::{ControllerType, Direction, RawPayload};

const AXIS_MIN: u8 = 0x00;
const AXIS_MAX: u8 = 0xFF;

/// Translate one decoded pad reading into a HID report.
///
/// Digital pads use `layout` for their buttons and get a synthetic stick
/// from the d-pad. Dual-analog pads always use
/// [`ButtonLayout::MegaDriveMini`] and pass their sticks through unchanged.
/// Every other controller type yields `None`: nothing is sent this cycle.
///
/// Translation is pure; the same inputs always give the same report.
///
/// # Example
///
/// ```
/// use psx_hid_core::{translate, ButtonLayout};
/// use psx_proto::{ControllerType, PadButtons, RawPayload};
///
/// let payload = RawPayload::digital(PadButtons::START | PadButtons::RIGHT);
/// let report = translate(ControllerType::Digital, &payload, ButtonLayout::SixButton).unwrap();
/// assert_eq!(report.buttons, 0x80);
/// assert_eq!(report.stick_x, 0xFF);
/// ```
#[must_use]
pub fn translate(
    kind: ControllerType,
    payload: &RawPayload,
    layout: ButtonLayout,
) -> Option<HidReport> {
    let buttons = payload.buttons();

    match kind {
        ControllerType::Digital => {
            let (stick_x, stick_y) = dpad_to_axes(buttons.direction());
            Some(HidReport {
                buttons: layout.map(buttons),
                stick_x,
                stick_y,
                throttle_x: HidReport::AXIS_CENTER,
                throttle_y: HidReport::AXIS_CENTER,
            })
        }
        ControllerType::DualAnalog => {
            let sticks = payload.sticks()?;
            Some(HidReport {
                buttons: ButtonLayout::MegaDriveMini.map(buttons),
                stick_x: sticks.left_x,
                stick_y: sticks.left_y,
                throttle_x: sticks.right_x,
                throttle_y: sticks.right_y,
            })
        }
        _ => None,
    }
}

/// Synthesize stick axes from the d-pad.
///
/// Opposite directions held together cancel out to centre.
#[must_use]
pub const fn dpad_to_axes(dir: Direction) -> (u8, u8) {
    (
        axis_from_pair(dir.left(), dir.right()),
        axis_from_pair(dir.up(), dir.down()),
    )
}

#[inline]
const fn axis_from_pair(negative: bool, positive: bool) -> u8 {
    match (negative, positive) {
        (true, false) => AXIS_MIN,
        (false, true) => AXIS_MAX,
        _ => HidReport::AXIS_CENTER,
    }
}
