//! Selection persistence across modal detours.
//!
//! Opening a dialog moves focus out of the rich surface and the platform
//! drops its selection. `SelectionKeeper` holds on to the last range so the
//! deferred insertion can land where the user left off.

use crate::document::{DocRange, RichDocument};

/// A range captured at a point in time.
///
/// Holds node ids, never nodes: it has to be revalidated against the
/// document before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub range: DocRange,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionKeeper {
    saved: Option<SelectionSnapshot>,
}

impl SelectionKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current selection. Without one, any earlier snapshot is kept.
    pub fn capture(&mut self, range: Option<DocRange>) {
        if let Some(range) = range {
            self.saved = Some(SelectionSnapshot { range });
        }
    }

    /// Take the snapshot if it still refers to the document.
    ///
    /// `None` means the caller should insert at the end of the surface.
    pub fn restore(&mut self, doc: &RichDocument) -> Option<DocRange> {
        let snapshot = self.saved.take()?;
        if doc.is_valid_range(&snapshot.range) {
            Some(snapshot.range)
        } else {
            tracing::debug!(
                anchor = %snapshot.range.anchor.node,
                focus = %snapshot.range.focus.node,
                "selection snapshot is stale"
            );
            None
        }
    }

    pub fn discard(&mut self) {
        self.saved = None;
    }

    pub fn snapshot(&self) -> Option<&SelectionSnapshot> {
        self.saved.as_ref()
    }
}
