//! Byte-level encoding of [`Message`] and decoding of inbound frames.

use crate::message::{Message, EXCLUSIVE_MAX_LENGTH};

pub(crate) const NOTE_OFF: u8 = 0x80;
pub(crate) const NOTE_ON: u8 = 0x90;
pub(crate) const CONTROL_CHANGE: u8 = 0xB0;
pub(crate) const PROGRAM_CHANGE: u8 = 0xC0;
pub(crate) const EXCLUSIVE_START: u8 = 0xF0;
pub(crate) const EXCLUSIVE_END: u8 = 0xF7;

const DATA_ENTRY_MSB: u8 = 6;
const NRPN_LSB: u8 = 98;
const NRPN_MSB: u8 = 99;
const RPN_LSB: u8 = 100;
const RPN_MSB: u8 = 101;
const NULL_PARAMETER: u8 = 127;

/// Longest encoded message: an exclusive frame with a three-byte
/// manufacturer id and a full payload.
pub const MAX_FRAME_LENGTH: usize = 1 + 3 + EXCLUSIVE_MAX_LENGTH + 1;

/// The wire bytes of one encoded [`Message`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireFrame {
    bytes: [u8; MAX_FRAME_LENGTH],
    len: usize,
}

impl WireFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(&mut self, byte: u8) {
        self.bytes[self.len] = byte;
        self.len += 1;
    }

    fn channel_message(&mut self, status: u8, channel: u8, data: &[u8]) {
        self.push(status | (channel & 0x0F));
        for &byte in data {
            self.push(byte & 0x7F);
        }
    }

    /// Parameter select, data entry, then the null parameter. The status
    /// byte is repeated on every controller message.
    fn parameter_change(&mut self, channel: u8, select: [u8; 2], msb: u8, lsb: u8, value: u8) {
        for (number, data) in [
            (select[0], msb),
            (select[1], lsb),
            (DATA_ENTRY_MSB, value),
            (select[0], NULL_PARAMETER),
            (select[1], NULL_PARAMETER),
        ] {
            self.channel_message(CONTROL_CHANGE, channel, &[number, data]);
        }
    }
}

/// Encode a message into its wire bytes.
///
/// Every data byte is masked to 7 bits.
///
/// # Examples
///
/// ```
/// use midi_transport::{encode, Message};
///
/// let frame = encode(&Message::ControllerChange { channel: 2, number: 7, value: 100 });
/// assert_eq!(frame.as_bytes(), &[0xB2, 7, 100]);
/// ```
pub fn encode(message: &Message) -> WireFrame {
    let mut frame = WireFrame::default();
    match message {
        Message::ControllerChange { channel, number, value } => {
            frame.channel_message(CONTROL_CHANGE, *channel, &[*number, *value]);
        }
        Message::NoteOn { channel, note, velocity } => {
            frame.channel_message(NOTE_ON, *channel, &[*note, *velocity]);
        }
        Message::NoteOff { channel, note, velocity } => {
            frame.channel_message(NOTE_OFF, *channel, &[*note, *velocity]);
        }
        Message::ProgramChange { channel, number } => {
            frame.channel_message(PROGRAM_CHANGE, *channel, &[*number]);
        }
        Message::Rpn { channel, msb, lsb, value } => {
            frame.parameter_change(*channel, [RPN_MSB, RPN_LSB], *msb, *lsb, *value);
        }
        Message::Nrpn { channel, msb, lsb, value } => {
            frame.parameter_change(*channel, [NRPN_MSB, NRPN_LSB], *msb, *lsb, *value);
        }
        Message::Exclusive {
            manufacturer_id,
            payload,
            ..
        } => {
            frame.push(EXCLUSIVE_START);
            if *manufacturer_id > 0xFF {
                frame.push(0x00);
                frame.push((*manufacturer_id >> 8) as u8 & 0x7F);
            }
            frame.push(*manufacturer_id as u8 & 0x7F);
            for &byte in payload {
                frame.push(byte & 0x7F);
            }
            frame.push(EXCLUSIVE_END);
        }
        Message::Raw(bytes) => {
            for &byte in bytes {
                frame.push(byte);
            }
        }
    }
    frame
}

/// Decode a complete three-byte inbound frame.
///
/// Only note off, note on and control change are recognised, on any
/// channel. Anything else returns `None` so the receiver can resynchronise.
pub fn decode(frame: &[u8; 3]) -> Option<Message> {
    let channel = frame[0] & 0x0F;
    let first = frame[1] & 0x7F;
    let second = frame[2] & 0x7F;

    match frame[0] & 0xF0 {
        NOTE_OFF => Some(Message::NoteOff {
            channel,
            note: first,
            velocity: second,
        }),
        NOTE_ON => Some(Message::NoteOn {
            channel,
            note: first,
            velocity: second,
        }),
        CONTROL_CHANGE => Some(Message::ControllerChange {
            channel,
            number: first,
            value: second,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_messages_mask_fields() {
        let frame = encode(&Message::NoteOn { channel: 0x13, note: 0xBC, velocity: 100 });
        assert_eq!(frame.as_bytes(), &[0x93, 0x3C, 100]);

        let frame = encode(&Message::ProgramChange { channel: 9, number: 5 });
        assert_eq!(frame.as_bytes(), &[0xC9, 5]);
    }

    #[test]
    fn nrpn_is_five_controller_messages() {
        let frame = encode(&Message::Nrpn { channel: 9, msb: 0x14, lsb: 36, value: 64 });
        assert_eq!(
            frame.as_bytes(),
            &[
                0xB9, 99, 0x14, //
                0xB9, 98, 36, //
                0xB9, 6, 64, //
                0xB9, 99, 127, //
                0xB9, 98, 127,
            ]
        );
    }

    #[test]
    fn rpn_uses_registered_selectors() {
        let frame = encode(&Message::Rpn { channel: 0, msb: 0, lsb: 2, value: 70 });
        assert_eq!(frame.len(), 15);
        assert_eq!(&frame.as_bytes()[..6], &[0xB0, 101, 0, 0xB0, 100, 2]);
        assert_eq!(&frame.as_bytes()[9..], &[0xB0, 101, 127, 0xB0, 100, 127]);
    }

    #[test]
    fn exclusive_with_short_manufacturer_id() {
        let message = Message::exclusive(9, 0x43, &[0x10, 0x4C, 0x08, 0x09, 0x0B, 0x23]).unwrap();
        assert_eq!(
            encode(&message).as_bytes(),
            &[0xF0, 0x43, 0x10, 0x4C, 0x08, 0x09, 0x0B, 0x23, 0xF7]
        );
    }

    #[test]
    fn exclusive_with_extended_manufacturer_id() {
        let message = Message::exclusive(0, 0x2109, &[0x7F, 0x80]).unwrap();
        assert_eq!(encode(&message).as_bytes(), &[0xF0, 0x00, 0x21, 0x09, 0x7F, 0x00, 0xF7]);
    }

    #[test]
    fn exclusive_ids_below_0x100_take_one_byte() {
        let message = Message::exclusive(0, 0xC3, &[0x01]).unwrap();
        assert_eq!(encode(&message).as_bytes(), &[0xF0, 0x43, 0x01, 0xF7]);

        let message = Message::exclusive(0, 0x100, &[0x01]).unwrap();
        assert_eq!(encode(&message).as_bytes(), &[0xF0, 0x00, 0x01, 0x00, 0x01, 0xF7]);
    }

    #[test]
    fn exclusive_payload_is_bounded() {
        assert!(Message::exclusive(0, 0x43, &[0; EXCLUSIVE_MAX_LENGTH]).is_some());
        assert!(Message::exclusive(0, 0x43, &[0; EXCLUSIVE_MAX_LENGTH + 1]).is_none());

        let full = Message::exclusive(0, 0x2109, &[0; EXCLUSIVE_MAX_LENGTH]).unwrap();
        assert_eq!(encode(&full).len(), MAX_FRAME_LENGTH);
    }

    #[test]
    fn raw_bytes_pass_through() {
        let frame = encode(&Message::Raw([0xF8, 0xFA, 0xFC]));
        assert_eq!(frame.as_bytes(), &[0xF8, 0xFA, 0xFC]);
    }

    #[test]
    fn decode_recognises_notes_and_controllers_on_any_channel() {
        assert_eq!(
            decode(&[0x95, 60, 90]),
            Some(Message::NoteOn { channel: 5, note: 60, velocity: 90 })
        );
        assert_eq!(
            decode(&[0x80, 60, 0]),
            Some(Message::NoteOff { channel: 0, note: 60, velocity: 0 })
        );
        assert_eq!(
            decode(&[0xBF, 7, 127]),
            Some(Message::ControllerChange { channel: 15, number: 7, value: 127 })
        );
    }

    #[test]
    fn decode_rejects_other_statuses() {
        assert_eq!(decode(&[0xC0, 1, 2]), None);
        assert_eq!(decode(&[0x3C, 0x90, 60]), None);
        assert_eq!(decode(&[0xF0, 0x43, 0x10]), None);
    }

    #[test]
    fn decoded_frames_encode_back() {
        for frame in [[0x92, 36, 100], [0x8A, 36, 64], [0xB0, 74, 12]] {
            let message = decode(&frame).unwrap();
            assert_eq!(encode(&message).as_bytes(), &frame);
        }
    }
}
