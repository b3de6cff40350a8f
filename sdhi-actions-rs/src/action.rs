//! Action definitions and the messages each kind produces.

use heapless::Vec;
use midi_transport::{MappedNote, Message};
use sdhi::control_values::Parameter;

/// Most messages a single action emits (a bank change).
pub const MAX_ACTION_MESSAGES: usize = 3;

/// Manufacturer id used by XG parameter changes.
pub const XG_MANUFACTURER_ID: u16 = 0x43;

/// Leading payload byte of an XG parameter change.
const XG_PARAMETER_CHANGE: u8 = 0x08;

const BANK_SELECT_MSB: u8 = 0;
const BANK_SELECT_LSB: u8 = 32;

/// Values one action's fields resolved to in a cycle.
pub(crate) type Values = [i32; 3];

/// One outbound effect bound to control values.
///
/// Each field is a [`Parameter`]: a constant, or a control's value plus an
/// offset. Resolved values are masked to 7 bits when the messages are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Action {
    pub channel: u8,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionKind {
    /// One controller change.
    Controller { number: Parameter, value: Parameter },
    /// Bank select (MSB 127, LSB 0) followed by a program change.
    BankChange { program: Parameter },
    Rpn {
        msb: Parameter,
        lsb: Parameter,
        value: Parameter,
    },
    Nrpn {
        msb: Parameter,
        lsb: Parameter,
        value: Parameter,
    },
    /// Redirect inbound `note` to `value` on this action's channel. Sends
    /// nothing.
    NoteMapping { note: Parameter, value: Parameter },
    /// XG exclusive `[0x08, channel, parameter, value]`.
    XgParameterChange { parameter: Parameter, value: Parameter },
}

impl Action {
    pub const fn new(channel: u8, kind: ActionKind) -> Self {
        Self { channel, kind }
    }

    /// The action's fields in evaluation order, padded with zeros.
    pub(crate) fn parameters(&self) -> [Parameter; 3] {
        const ZERO: Parameter = Parameter::Constant(0);
        match self.kind {
            ActionKind::Controller { number, value } => [number, value, ZERO],
            ActionKind::BankChange { program } => [program, ZERO, ZERO],
            ActionKind::Rpn { msb, lsb, value } | ActionKind::Nrpn { msb, lsb, value } => {
                [msb, lsb, value]
            }
            ActionKind::NoteMapping { note, value } => [note, value, ZERO],
            ActionKind::XgParameterChange { parameter, value } => [parameter, value, ZERO],
        }
    }

    /// Build what this action does for a set of resolved values.
    pub(crate) fn effect(&self, values: &Values) -> Effect {
        let channel = self.channel & 0x0F;
        let [v1, v2, v3] = values.map(data_byte);

        match self.kind {
            ActionKind::Controller { .. } => Effect::send([Message::ControllerChange {
                channel,
                number: v1,
                value: v2,
            }]),
            ActionKind::BankChange { .. } => Effect::send([
                Message::ControllerChange {
                    channel,
                    number: BANK_SELECT_MSB,
                    value: 127,
                },
                Message::ControllerChange {
                    channel,
                    number: BANK_SELECT_LSB,
                    value: 0,
                },
                Message::ProgramChange { channel, number: v1 },
            ]),
            ActionKind::Rpn { .. } => Effect::send([Message::Rpn {
                channel,
                msb: v1,
                lsb: v2,
                value: v3,
            }]),
            ActionKind::Nrpn { .. } => Effect::send([Message::Nrpn {
                channel,
                msb: v1,
                lsb: v2,
                value: v3,
            }]),
            ActionKind::NoteMapping { .. } => Effect::MapNote {
                note: v1,
                target: MappedNote { channel, note: v2 },
            },
            ActionKind::XgParameterChange { .. } => Effect::send([Message::Exclusive {
                channel,
                manufacturer_id: XG_MANUFACTURER_ID,
                payload: [XG_PARAMETER_CHANGE, channel, v1, v2].into_iter().collect(),
            }]),
        }
    }
}

fn data_byte(value: i32) -> u8 {
    (value & 0x7F) as u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect {
    Send(Vec<Message, MAX_ACTION_MESSAGES>),
    MapNote { note: u8, target: MappedNote },
}

impl Effect {
    fn send<const M: usize>(messages: [Message; M]) -> Self {
        Effect::Send(messages.into_iter().collect())
    }

    /// Outbound queue slots this effect needs.
    pub(crate) fn needed(&self) -> usize {
        match self {
            Effect::Send(messages) => messages.len(),
            Effect::MapNote { .. } => 0,
        }
    }
}
