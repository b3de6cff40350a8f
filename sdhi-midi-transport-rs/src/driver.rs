//! The real-time half of the transport: one byte of serial work per step.

use crate::link::SerialLink;
use crate::transport::Transport;
use crate::wire::{self, WireFrame};

/// What the last [`TransportDriver::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportState {
    /// A byte was received.
    Receiving,
    /// A frame is being transmitted, or a new one was just taken from the
    /// outbound queue.
    Transmitting,
    /// Nothing to do.
    Idle,
}

/// Moves bytes between a [`SerialLink`] and a [`Transport`].
///
/// Reception has priority: while bytes arrive, transmission waits. Inbound
/// bytes are collected into three-byte frames. A frame that does not
/// decode is shifted left by one byte and completed by the next byte,
/// which resynchronises a receiver that started mid-message.
pub struct TransportDriver<'a, L> {
    transport: &'a Transport,
    link: L,
    in_frame: [u8; 3],
    in_position: usize,
    out_frame: WireFrame,
    out_position: usize,
}

impl<'a, L> TransportDriver<'a, L>
where
    L: SerialLink,
{
    pub fn new(transport: &'a Transport, link: L) -> Self {
        Self {
            transport,
            link,
            in_frame: [0; 3],
            in_position: 0,
            out_frame: WireFrame::default(),
            out_position: 0,
        }
    }

    /// Do at most one unit of work. Never blocks.
    pub fn step(&mut self) -> TransportState {
        if self.link.byte_available() {
            let byte = self.link.read_byte();
            self.receive(byte);
            return TransportState::Receiving;
        }

        if self.out_position < self.out_frame.len() {
            if self.link.writable() {
                self.link.write_byte(self.out_frame.as_bytes()[self.out_position]);
                self.out_position += 1;
            }
            return TransportState::Transmitting;
        }

        match self.transport.next_outbound() {
            Some(message) => {
                self.out_frame = wire::encode(&message);
                self.out_position = 0;
                TransportState::Transmitting
            }
            None => TransportState::Idle,
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    fn receive(&mut self, byte: u8) {
        self.in_frame[self.in_position] = byte;
        if self.in_position < 2 {
            self.in_position += 1;
            return;
        }

        match wire::decode(&self.in_frame) {
            Some(message) => {
                self.in_position = 0;
                self.transport.route_inbound(message);
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::trace!("MIDI resync, dropping {=u8:#x}", self.in_frame[0]);
                self.in_frame.copy_within(1.., 0);
            }
        }
    }
}
