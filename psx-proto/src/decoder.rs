//! Frame decoding: identification byte validation and payload extraction.

use crate::types::{ControllerType, RawPayload, FRAME_MARKER, HEADER_LEN};

/// Error type for frame decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The frame is shorter than its header or than its ID announces.
    Truncated,
    /// A recognized controller answered without the 0x5A marker.
    BadMarker(u8),
}

/// Outcome of decoding one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadReading {
    pub kind: ControllerType,
    pub payload: RawPayload,
}

/// Decode a received frame into the controller type and its payload.
///
/// Unknown identification bytes are not an error: they yield
/// [`ControllerType::Unrecognized`] and whatever payload bytes were clocked,
/// so the caller can skip translation for this cycle.
///
/// # Example
///
/// ```
/// use psx_proto::{decode, ControllerType, PadButtons};
///
/// // Digital pad with Start held
/// let reading = decode(&[0xFF, 0x41, 0x5A, 0xF7, 0xFF]).unwrap();
/// assert_eq!(reading.kind, ControllerType::Digital);
/// assert!(reading.payload.buttons().is_pressed(PadButtons::START));
/// ```
pub fn decode(frame: &[u8]) -> Result<PadReading, DecodeError> {
    if frame.len() < HEADER_LEN {
        return Err(DecodeError::Truncated);
    }

    let kind = ControllerType::from_id(frame[1]);
    let body = &frame[HEADER_LEN..];

    match kind {
        ControllerType::None => Ok(PadReading {
            kind,
            payload: RawPayload::empty(),
        }),
        ControllerType::Unrecognized(_) => Ok(PadReading {
            kind,
            payload: RawPayload::from_slice(body),
        }),
        _ => {
            if frame[2] != FRAME_MARKER {
                return Err(DecodeError::BadMarker(frame[2]));
            }
            let needed = kind.payload_len();
            if body.len() < needed {
                return Err(DecodeError::Truncated);
            }
            Ok(PadReading {
                kind,
                payload: RawPayload::from_slice(&body[..needed]),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalogSticks, PadButtons};

    #[test]
    fn test_decode_digital() {
        let reading = decode(&[0xFF, 0x41, 0x5A, 0xFF, 0x7F]).unwrap();
        assert_eq!(reading.kind, ControllerType::Digital);
        assert_eq!(reading.payload.len(), 2);
        assert_eq!(reading.payload.buttons(), PadButtons::SQUARE);
        assert_eq!(reading.payload.sticks(), None);
    }

    #[test]
    fn test_decode_dual_analog() {
        let frame = [0xFF, 0x73, 0x5A, 0xFF, 0xFF, 0x10, 0x20, 0x30, 0x40];
        let reading = decode(&frame).unwrap();
        assert_eq!(reading.kind, ControllerType::DualAnalog);
        assert_eq!(
            reading.payload.sticks(),
            Some(AnalogSticks {
                right_x: 0x10,
                right_y: 0x20,
                left_x: 0x30,
                left_y: 0x40,
            })
        );
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let reading = decode(&[0xFF, 0x41, 0x5A, 0xFF, 0xFF, 0x00, 0x00]).unwrap();
        assert_eq!(reading.payload.len(), 2);
    }

    #[test]
    fn test_decode_short_header_is_truncated() {
        assert_eq!(decode(&[]), Err(DecodeError::Truncated));
        assert_eq!(decode(&[0xFF, 0x41]), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_decode_missing_payload_is_truncated() {
        // Analog ID announces 6 payload bytes, only 2 were clocked
        let frame = [0xFF, 0x73, 0x5A, 0xFF, 0xFF];
        assert_eq!(decode(&frame), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_decode_bad_marker() {
        let frame = [0xFF, 0x41, 0x00, 0xFF, 0xFF];
        assert_eq!(decode(&frame), Err(DecodeError::BadMarker(0x00)));
    }

    #[test]
    fn test_decode_unrecognized_is_not_an_error() {
        let reading = decode(&[0xFF, 0x99, 0x00, 0x01]).unwrap();
        assert_eq!(reading.kind, ControllerType::Unrecognized(0x99));
        assert_eq!(reading.payload.as_slice(), &[0x01]);
    }

    #[test]
    fn test_decode_disconnected() {
        let reading = decode(&[0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(reading.kind, ControllerType::None);
        assert!(reading.payload.is_empty());
    }
}
