//! MIDI serial transport for the sdhi control surface.
//!
//! The transport is split the same way as the rest of the firmware:
//!
//! - [`Transport`] is shared. It owns the outbound and inbound queues and
//!   the inbound note mapping table, and lives in a `static`.
//! - [`TransportDriver`] is owned by the real-time loop. Each
//!   [`step`](TransportDriver::step) moves at most one byte over a
//!   [`SerialLink`] and never blocks.
//!
//! The main loop reserves queue space with [`Transport::can_send`] before
//! calling [`Transport::send_many`]; overflowing the outbound queue is a
//! programming error and panics. Notes remapped by the real-time loop use a
//! separate queue and never touch that budget.
//!
//! ```
//! use midi_transport::{MappedNote, Message, Transport, TransportConfig};
//!
//! static MIDI: Transport = Transport::new(TransportConfig::DEFAULT);
//!
//! MIDI.set_mapped_note(36, MappedNote { channel: 9, note: 35 });
//! if MIDI.can_send() >= 1 {
//!     MIDI.send_many(&[Message::ProgramChange { channel: 9, number: 8 }]);
//! }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: enable [`defmt::Format`] implementations and transport
//!   logging.

#![no_std]

pub use driver::{TransportDriver, TransportState};
pub use link::SerialLink;
pub use mapping::{MappedNote, NOTE_COUNT};
pub use message::{Message, EXCLUSIVE_MAX_LENGTH};
pub use transport::{
    InboundRouting, Transport, TransportConfig, IN_QUEUE_CAPACITY, MAX_BURST, OUT_QUEUE_CAPACITY,
    REMAP_QUEUE_CAPACITY,
};
pub use wire::{decode, encode, WireFrame, MAX_FRAME_LENGTH};

mod driver;
mod link;
mod mapping;
mod message;
mod transport;
mod wire;
