use midi_transport::{MappedNote, Message, Transport};

/// Where dispatched actions go.
///
/// [`Transport`] is the production sink. The engine always asks for the
/// budget with [`can_send`](Self::can_send) and never enqueues more
/// messages than it reported.
pub trait MessageSink {
    /// Messages that may be enqueued now.
    fn can_send(&self) -> usize;

    /// Enqueue messages in order.
    fn send_many(&self, messages: &[Message]);

    /// Redirect an inbound note.
    fn set_mapped_note(&self, note: u8, target: MappedNote);
}

impl MessageSink for Transport {
    fn can_send(&self) -> usize {
        Transport::can_send(self)
    }

    fn send_many(&self, messages: &[Message]) {
        Transport::send_many(self, messages);
    }

    fn set_mapped_note(&self, note: u8, target: MappedNote) {
        Transport::set_mapped_note(self, note, target);
    }
}
