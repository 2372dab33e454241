//! The single shared modal overlay, as a state machine.
//!
//! The browser layer owns one `ModalSlot` per session and drives it from
//! event handlers. Activation and clearing happen in deferred callbacks
//! (next animation frame, a timer after close); each callback carries the
//! `ModalTicket` it was scheduled for and is ignored if a newer `open`
//! happened in the meantime.

use std::fmt;

/// Identifies one `open` of the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalTicket(u64);

impl fmt::Display for ModalTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    /// No content.
    Empty,
    /// Content set, waiting for the activation frame.
    Open,
    /// Visible.
    Active,
    /// Hidden, content waiting to be cleared.
    Closing,
}

/// Holder for the content of the one overlay.
#[derive(Debug)]
pub struct ModalSlot<C> {
    phase: ModalPhase,
    content: Option<C>,
    epoch: u64,
}

impl<C> Default for ModalSlot<C> {
    fn default() -> Self {
        Self {
            phase: ModalPhase::Empty,
            content: None,
            epoch: 0,
        }
    }
}

impl<C> ModalSlot<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> Option<&mut C> {
        self.content.as_mut()
    }

    /// Ticket of the latest open, while the slot holds content.
    pub fn ticket(&self) -> Option<ModalTicket> {
        (self.phase != ModalPhase::Empty).then_some(ModalTicket(self.epoch))
    }

    pub fn is_current(&self, ticket: ModalTicket) -> bool {
        ticket.0 == self.epoch && self.phase != ModalPhase::Empty
    }

    /// Whether the overlay is showing or about to show.
    pub fn is_open(&self) -> bool {
        matches!(self.phase, ModalPhase::Open | ModalPhase::Active)
    }

    /// Show `content`, replacing whatever the overlay held.
    ///
    /// Returns the ticket for this open and the replaced content, which the
    /// caller must tear down.
    pub fn open(&mut self, content: C) -> (ModalTicket, Option<C>) {
        self.epoch += 1;
        let replaced = self.content.replace(content);
        if replaced.is_some() {
            tracing::debug!(target: "quire::modal", epoch = self.epoch, from = ?self.phase, "replacing modal content");
        }
        self.phase = ModalPhase::Open;
        (ModalTicket(self.epoch), replaced)
    }

    /// Deferred activation. Returns whether the overlay became active.
    pub fn activate(&mut self, ticket: ModalTicket) -> bool {
        if self.is_current(ticket) && self.phase == ModalPhase::Open {
            self.phase = ModalPhase::Active;
            true
        } else {
            tracing::trace!(target: "quire::modal", %ticket, "stale activation ignored");
            false
        }
    }

    /// Start closing. Returns the ticket the deferred clear must present.
    pub fn close(&mut self) -> Option<ModalTicket> {
        if !self.is_open() {
            return None;
        }
        self.phase = ModalPhase::Closing;
        tracing::debug!(target: "quire::modal", epoch = self.epoch, "modal closing");
        Some(ModalTicket(self.epoch))
    }

    /// Deferred clear after a close. Returns the content to tear down.
    pub fn finish_close(&mut self, ticket: ModalTicket) -> Option<C> {
        if !self.is_current(ticket) || self.phase != ModalPhase::Closing {
            tracing::trace!(target: "quire::modal", %ticket, "stale clear ignored");
            return None;
        }
        self.phase = ModalPhase::Empty;
        self.content.take()
    }

    /// Drop the content whatever the phase. Outstanding tickets go stale.
    pub fn clear(&mut self) -> Option<C> {
        self.phase = ModalPhase::Empty;
        self.content.take()
    }

    /// A click on the overlay closes it only when it landed on the backdrop
    /// itself, not on the dialog.
    pub fn dismiss_on_backdrop(&mut self, target_is_backdrop: bool) -> Option<ModalTicket> {
        if target_is_backdrop { self.close() } else { None }
    }

    pub fn dismiss_on_escape(&mut self) -> Option<ModalTicket> {
        self.close()
    }
}
