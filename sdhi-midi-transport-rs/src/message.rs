//! Logical MIDI messages handled by the transport.

use heapless::Vec;

/// Maximum payload length of an [`Message::Exclusive`] message.
pub const EXCLUSIVE_MAX_LENGTH: usize = 16;

/// A logical MIDI message.
///
/// Numeric fields are 7-bit on the wire; the encoder masks every field, so
/// out-of-range values are truncated rather than rejected. Channels are
/// 0-based (0–15).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    ControllerChange { channel: u8, number: u8, value: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ProgramChange { channel: u8, number: u8 },
    /// Registered parameter change. One queue slot, several wire messages.
    Rpn { channel: u8, msb: u8, lsb: u8, value: u8 },
    /// Non-registered parameter change. Same shape as [`Message::Rpn`].
    Nrpn { channel: u8, msb: u8, lsb: u8, value: u8 },
    /// Manufacturer-exclusive message framed by `0xF0 .. 0xF7`.
    Exclusive {
        channel: u8,
        manufacturer_id: u16,
        payload: Vec<u8, EXCLUSIVE_MAX_LENGTH>,
    },
    /// Three literal bytes, for traffic without a dedicated variant.
    Raw([u8; 3]),
}

impl Message {
    /// Build an exclusive message, or `None` if `payload` is longer than
    /// [`EXCLUSIVE_MAX_LENGTH`].
    pub fn exclusive(channel: u8, manufacturer_id: u16, payload: &[u8]) -> Option<Self> {
        Some(Message::Exclusive {
            channel,
            manufacturer_id,
            payload: Vec::from_slice(payload).ok()?,
        })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Message {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Message::ControllerChange { channel, number, value } => {
                defmt::write!(f, "CC ch={} #{}={}", channel, number, value)
            }
            Message::NoteOn { channel, note, velocity } => {
                defmt::write!(f, "NoteOn ch={} note={} vel={}", channel, note, velocity)
            }
            Message::NoteOff { channel, note, velocity } => {
                defmt::write!(f, "NoteOff ch={} note={} vel={}", channel, note, velocity)
            }
            Message::ProgramChange { channel, number } => {
                defmt::write!(f, "Program ch={} #{}", channel, number)
            }
            Message::Rpn { channel, msb, lsb, value } => {
                defmt::write!(f, "RPN ch={} {}:{}={}", channel, msb, lsb, value)
            }
            Message::Nrpn { channel, msb, lsb, value } => {
                defmt::write!(f, "NRPN ch={} {}:{}={}", channel, msb, lsb, value)
            }
            Message::Exclusive {
                channel,
                manufacturer_id,
                payload,
            } => defmt::write!(
                f,
                "SysEx ch={} id={:#x} {:#x}",
                channel,
                *manufacturer_id,
                payload.as_slice()
            ),
            Message::Raw(bytes) => defmt::write!(f, "Raw {:#x}", bytes),
        }
    }
}
