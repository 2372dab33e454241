//! Text analysis helpers.
//!
//! Line-indent detection for code fields, and conversions between the char
//! offsets used by the core and the UTF-16 offsets the DOM reports.

use smol_str::SmolStr;

use crate::text::TextBuffer;

/// Leading whitespace of the line containing `offset`, looking only at the
/// part of the line before `offset`.
pub fn leading_whitespace<T: TextBuffer + ?Sized>(buf: &T, offset: usize) -> SmolStr {
    let line_start = buf.line_start(offset);
    let mut pos = line_start;
    while pos < offset {
        match buf.char_at(pos) {
            Some(c) if c.is_whitespace() && c != '\n' => pos += 1,
            _ => break,
        }
    }
    buf.slice(line_start..pos).unwrap_or_default()
}

/// Convert a UTF-16 code unit offset into a char offset within `s`.
///
/// Offsets past the end clamp to the char length. An offset that lands in the
/// middle of a surrogate pair rounds up to the following char.
pub fn utf16_to_char_offset(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, c) in s.chars().enumerate() {
        if units >= utf16_offset {
            return idx;
        }
        units += c.len_utf16();
    }
    s.chars().count()
}

/// Convert a char offset into a UTF-16 code unit offset within `s`.
pub fn char_to_utf16_offset(s: &str, char_offset: usize) -> usize {
    s.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Length of `s` in chars.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of char offset `char_offset` in `s`, clamped to the end.
pub fn char_to_byte_index(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
