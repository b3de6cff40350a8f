//! Message queues and note mapping shared by the two execution contexts.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::mapping::{MappedNote, NoteMap};
use crate::message::Message;

/// Outbound queue depth, in logical messages.
pub const OUT_QUEUE_CAPACITY: usize = 16;
/// Inbound queue depth, in logical messages.
pub const IN_QUEUE_CAPACITY: usize = 32;
/// Depth of the queue holding remapped notes waiting to be re-sent.
pub const REMAP_QUEUE_CAPACITY: usize = 8;
/// Most messages one caller may enqueue between two checks of
/// [`Transport::can_send`].
pub const MAX_BURST: usize = 8;

/// What happens to decoded inbound messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InboundRouting {
    /// Notes are redirected through the mapping table and re-sent; unmapped
    /// notes are dropped. Controller changes go to the inbound queue.
    #[default]
    Remap,
    /// Everything goes to the inbound queue untouched.
    Application,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportConfig {
    pub inbound: InboundRouting,
}

impl TransportConfig {
    pub const DEFAULT: Self = Self {
        inbound: InboundRouting::Remap,
    };
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The shared half of the MIDI transport.
///
/// Lives in a `static`. The main loop enqueues with
/// [`send_many`](Self::send_many) and edits the note mapping; the real-time
/// loop drains and fills the queues through a
/// [`TransportDriver`](crate::TransportDriver).
///
/// The main loop is the only producer of the outbound queue, so a budget
/// read from [`can_send`](Self::can_send) can only grow until it is spent.
/// Remapped notes are produced by the real-time loop and wait in their own
/// queue, which the driver serves first.
///
/// ```
/// use midi_transport::{Message, Transport, TransportConfig};
///
/// static MIDI: Transport = Transport::new(TransportConfig::DEFAULT);
///
/// let budget = MIDI.can_send();
/// assert_eq!(budget, 8);
/// MIDI.send_many(&[Message::ControllerChange { channel: 0, number: 7, value: 90 }]);
/// assert_eq!(MIDI.can_send(), 8);
/// assert_eq!(MIDI.pending(), 1);
/// ```
pub struct Transport {
    config: TransportConfig,
    outbound: Channel<CriticalSectionRawMutex, Message, OUT_QUEUE_CAPACITY>,
    inbound: Channel<CriticalSectionRawMutex, Message, IN_QUEUE_CAPACITY>,
    remapped: Channel<CriticalSectionRawMutex, Message, REMAP_QUEUE_CAPACITY>,
    mapping: NoteMap,
    inbound_overruns: AtomicU32,
    remap_overruns: AtomicU32,
}

impl Transport {
    pub const fn new(config: TransportConfig) -> Self {
        Self {
            config,
            outbound: Channel::new(),
            inbound: Channel::new(),
            remapped: Channel::new(),
            mapping: NoteMap::new(),
            inbound_overruns: AtomicU32::new(0),
            remap_overruns: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> TransportConfig {
        self.config
    }

    /// How many messages may be enqueued right now: the free outbound
    /// space, capped at [`MAX_BURST`].
    pub fn can_send(&self) -> usize {
        self.outbound.free_capacity().min(MAX_BURST)
    }

    /// Messages waiting to be transmitted, remapped notes included.
    pub fn pending(&self) -> usize {
        self.outbound.len() + self.remapped.len()
    }

    /// Enqueue messages for transmission, in order.
    ///
    /// # Panics
    /// If the outbound queue overflows. Callers must stay within the budget
    /// reported by [`can_send`](Self::can_send).
    pub fn send_many(&self, messages: &[Message]) {
        for message in messages {
            if self.outbound.try_send(message.clone()).is_err() {
                panic!("MIDI outbound queue overflow");
            }
        }
    }

    /// Redirect inbound `note` to `target`.
    pub fn set_mapped_note(&self, note: u8, target: MappedNote) {
        self.mapping.set(note, target);
    }

    pub fn clear_mapped_note(&self, note: u8) {
        self.mapping.clear(note);
    }

    pub fn mapped_note(&self, note: u8) -> Option<MappedNote> {
        self.mapping.get(note)
    }

    /// Take the oldest message from the inbound queue.
    pub fn try_receive(&self) -> Option<Message> {
        self.inbound.try_receive().ok()
    }

    /// Inbound messages dropped because the inbound queue was full.
    pub fn inbound_overruns(&self) -> u32 {
        self.inbound_overruns.load(Ordering::Relaxed)
    }

    /// Remapped notes dropped because the remap queue was full.
    pub fn remap_overruns(&self) -> u32 {
        self.remap_overruns.load(Ordering::Relaxed)
    }

    /// Next message to transmit. Remapped notes go first.
    pub(crate) fn next_outbound(&self) -> Option<Message> {
        self.remapped
            .try_receive()
            .or_else(|_| self.outbound.try_receive())
            .ok()
    }

    pub(crate) fn route_inbound(&self, message: Message) {
        if self.config.inbound == InboundRouting::Remap {
            match message {
                Message::NoteOn { note, velocity, .. } => {
                    self.remap(note, |target| Message::NoteOn {
                        channel: target.channel,
                        note: target.note,
                        velocity,
                    });
                    return;
                }
                Message::NoteOff { note, velocity, .. } => {
                    self.remap(note, |target| Message::NoteOff {
                        channel: target.channel,
                        note: target.note,
                        velocity,
                    });
                    return;
                }
                _ => {}
            }
        }

        if self.inbound.try_send(message).is_err() {
            self.inbound_overruns.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "defmt")]
            defmt::warn!("MIDI inbound queue full, message dropped");
        }
    }

    fn remap(&self, note: u8, build: impl FnOnce(MappedNote) -> Message) {
        match self.mapping.get(note) {
            Some(target) => {
                if self.remapped.try_send(build(target)).is_err() {
                    self.remap_overruns.fetch_add(1, Ordering::Relaxed);
                    #[cfg(feature = "defmt")]
                    defmt::warn!("MIDI remap queue full, note {} dropped", note);
                }
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::trace!("unmapped note {} dropped", note);
            }
        }
    }
}
