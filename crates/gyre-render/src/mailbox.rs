//! Single-slot control mailbox between a caller and the render thread.
//!
//! The mailbox holds at most one pending message. Posting overwrites
//! whatever is pending, so the render thread always acts on the most recent
//! request and never on a backlog. The trade-off is that a quick
//! `WindowSet` / `ForceExit` succession can drop the earlier message; the
//! render loop has to tolerate exiting without ever having initialized.

use std::sync::atomic::{AtomicU8, Ordering};

/// A control request for the render thread.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ControlMessage {
    /// A window is waiting in the shared slot; bring up a rendering context.
    WindowSet,
    /// Release all graphics state and leave the render loop.
    ForceExit,
}

const EMPTY: u8 = 0;
const WINDOW_SET: u8 = 1;
const FORCE_EXIT: u8 = 2;

/// One overwriting message slot.
///
/// `post` publishes with release ordering and `take` consumes with acquire
/// ordering, so anything written before a `post` (the window slot in
/// particular) is visible to the thread that observes the message.
#[derive(Debug, Default)]
pub struct Mailbox {
    slot: AtomicU8,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU8::new(EMPTY),
        }
    }

    /// Posts a message, replacing any pending one.
    pub fn post(&self, msg: ControlMessage) {
        let raw = match msg {
            ControlMessage::WindowSet => WINDOW_SET,
            ControlMessage::ForceExit => FORCE_EXIT,
        };
        self.slot.store(raw, Ordering::Release);
    }

    /// Takes the pending message, leaving the slot empty.
    pub fn take(&self) -> Option<ControlMessage> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            WINDOW_SET => Some(ControlMessage::WindowSet),
            FORCE_EXIT => Some(ControlMessage::ForceExit),
            _ => None,
        }
    }
}
