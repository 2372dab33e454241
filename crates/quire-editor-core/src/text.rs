//! Plain-text storage for code fields.
//!
//! The interceptor edits through `TextBuffer`, so it can be tested over any
//! backend; enhanced fields use the ropey-backed `EditorRope`. Offsets are
//! chars throughout. UTF-16 conversion happens at the DOM boundary.

use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

pub trait TextBuffer {
    fn len_chars(&self) -> usize;

    fn insert(&mut self, at: usize, text: &str);

    fn remove(&mut self, range: Range<usize>);

    fn replace(&mut self, range: Range<usize>, text: &str) {
        let at = range.start;
        self.remove(range);
        self.insert(at, text);
    }

    /// Text in `range`, or `None` when the range is out of bounds.
    fn slice(&self, range: Range<usize>) -> Option<SmolStr>;

    fn char_at(&self, at: usize) -> Option<char>;

    /// The whole value.
    fn contents(&self) -> String;

    /// Offset of the first char on the line holding `at`. Only `\n` ends a
    /// line; ropey's own line index also breaks on `\r`, form feeds and
    /// Unicode separators, which a textarea does not.
    fn line_start(&self, at: usize) -> usize {
        let at = at.min(self.len_chars());
        (0..at)
            .rev()
            .find(|&i| self.char_at(i) == Some('\n'))
            .map_or(0, |newline| newline + 1)
    }
}

#[derive(Clone, Default, Debug)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextBuffer for EditorRope {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, at: usize, text: &str) {
        self.rope.insert(at, text);
    }

    fn remove(&mut self, range: Range<usize>) {
        self.rope.remove(range);
    }

    fn slice(&self, range: Range<usize>) -> Option<SmolStr> {
        if range.start > range.end || range.end > self.rope.len_chars() {
            return None;
        }
        Some(self.rope.slice(range).to_smolstr())
    }

    fn char_at(&self, at: usize) -> Option<char> {
        self.rope.get_char(at)
    }

    fn contents(&self) -> String {
        self.rope.to_string()
    }
}

impl From<&str> for EditorRope {
    fn from(value: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(value),
        }
    }
}
