//! Selection type for plain-text code fields.

use std::ops::Range;

/// A textarea selection in char offsets.
///
/// `anchor` stays where the user started selecting and `head` follows the
/// caret, so a backward selection has `head < anchor`.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A bare caret at `offset`.
    pub fn collapsed(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn is_backward(&self) -> bool {
        self.head < self.anchor
    }

    /// The selected chars, lowest offset first.
    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Pull both ends inside a value `len` chars long. Browsers can report
    /// offsets past the end while a value is being replaced.
    pub fn clamped(self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.head.min(len))
    }
}
