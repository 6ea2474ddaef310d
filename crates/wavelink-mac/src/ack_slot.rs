//! Shared slot holding the most recent acknowledgement.

use std::sync::Mutex;

use wavelink_protocol::Frame;

/// Single-frame mailbox between the receiver and the sender.
///
/// The receiver deposits every inbound ACK; the sender clears the slot
/// immediately before each transmission attempt and polls it while the
/// acknowledgement timer runs. Only the latest ACK is kept.
#[derive(Debug, Default)]
pub struct AckSlot {
    slot: Mutex<Option<Frame>>,
}

impl AckSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposits an acknowledgement, replacing any previous one.
    pub fn put(&self, ack: Frame) {
        *self.slot.lock().unwrap() = Some(ack);
    }

    /// Removes and returns the held acknowledgement, if any.
    pub fn take(&self) -> Option<Frame> {
        self.slot.lock().unwrap().take()
    }

    /// Empties the slot.
    pub fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }
}
