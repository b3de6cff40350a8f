//! Inbound note remapping table.
//!
//! One atomic entry per inbound note number, so the main loop can rewrite
//! a mapping while the real-time loop reads it without taking a lock.

use core::sync::atomic::{AtomicU16, Ordering};

/// Number of entries: one per 7-bit note number.
pub const NOTE_COUNT: usize = 128;

/// Entry marker for "no mapping". A valid entry never has bit 7 set.
const UNMAPPED: u16 = 0x0080;

/// Where an inbound note is redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MappedNote {
    pub channel: u8,
    pub note: u8,
}

impl MappedNote {
    fn pack(self) -> u16 {
        (u16::from(self.channel & 0x0F) << 8) | u16::from(self.note & 0x7F)
    }

    fn unpack(raw: u16) -> Option<Self> {
        if raw & UNMAPPED != 0 {
            return None;
        }
        Some(Self {
            channel: (raw >> 8) as u8 & 0x0F,
            note: raw as u8 & 0x7F,
        })
    }
}

pub(crate) struct NoteMap {
    entries: [AtomicU16; NOTE_COUNT],
}

impl NoteMap {
    pub(crate) const fn new() -> Self {
        Self {
            entries: [const { AtomicU16::new(UNMAPPED) }; NOTE_COUNT],
        }
    }

    fn entry(&self, note: u8) -> &AtomicU16 {
        &self.entries[usize::from(note & 0x7F)]
    }

    pub(crate) fn set(&self, note: u8, target: MappedNote) {
        self.entry(note).store(target.pack(), Ordering::Relaxed);
    }

    pub(crate) fn clear(&self, note: u8) {
        self.entry(note).store(UNMAPPED, Ordering::Relaxed);
    }

    pub(crate) fn get(&self, note: u8) -> Option<MappedNote> {
        MappedNote::unpack(self.entry(note).load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unmapped() {
        let map = NoteMap::new();
        assert!((0..=127).all(|note| map.get(note).is_none()));
    }

    #[test]
    fn set_get_clear() {
        let map = NoteMap::new();
        let target = MappedNote { channel: 9, note: 35 };

        map.set(36, target);
        assert_eq!(map.get(36), Some(target));
        assert_eq!(map.get(37), None);

        map.clear(36);
        assert_eq!(map.get(36), None);
    }

    #[test]
    fn fields_are_masked() {
        let map = NoteMap::new();
        map.set(36 | 0x80, MappedNote { channel: 0x1A, note: 0xA3 });
        assert_eq!(map.get(36), Some(MappedNote { channel: 0x0A, note: 0x23 }));
    }
}
