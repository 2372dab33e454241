//! Keystroke interception for code fields.
//!
//! A `CodeField` pairs a text buffer with the field's selection and rewrites
//! three keys before the platform sees them: Tab inserts an indent, opening
//! brackets and quotes insert their closer, and Enter carries the current
//! line's indentation onto the new line.

use crate::actions::{Key, KeyCombo, KeydownResult};
use crate::text::{EditorRope, TextBuffer};
use crate::text_helpers::leading_whitespace;
use crate::types::Selection;

/// Default indent inserted by Tab.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Closing counterpart for an auto-paired opener.
pub fn closing_pair(open: char) -> Option<char> {
    match open {
        '{' => Some('}'),
        '[' => Some(']'),
        '(' => Some(')'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// A plain-text field with a selection, as seen by the keystroke interceptor.
#[derive(Debug, Clone)]
pub struct CodeField<T = EditorRope> {
    buffer: T,
    selection: Selection,
    indent: String,
}

impl CodeField<EditorRope> {
    /// Build a field from its current value and selection (char offsets).
    pub fn from_value(value: &str, selection: Selection) -> Self {
        Self::new(EditorRope::from(value), selection)
    }
}

impl<T: TextBuffer> CodeField<T> {
    pub fn new(buffer: T, selection: Selection) -> Self {
        let selection = selection.clamped(buffer.len_chars());
        Self {
            buffer,
            selection,
            indent: " ".repeat(DEFAULT_INDENT_WIDTH),
        }
    }

    /// Use `width` spaces as the Tab indent.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent = " ".repeat(width);
        self
    }

    pub fn buffer(&self) -> &T {
        &self.buffer
    }

    pub fn value(&self) -> String {
        self.buffer.contents()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Apply the interceptor to a keydown.
    ///
    /// Returns `Handled` when the field was rewritten and the platform's
    /// default action must be suppressed.
    pub fn handle_keydown(&mut self, combo: &KeyCombo) -> KeydownResult {
        if combo.modifiers.has_command() {
            return KeydownResult::NotHandled;
        }

        match &combo.key {
            // Shift+Tab also indents; there is no dedent.
            Key::Tab => {
                self.insert_indent();
                KeydownResult::Handled
            }
            Key::Enter => self.insert_newline_with_indent(),
            key => match key.as_char().and_then(|c| closing_pair(c).map(|d| (c, d))) {
                Some((open, close)) => {
                    self.insert_pair(open, close);
                    KeydownResult::Handled
                }
                None => KeydownResult::NotHandled,
            },
        }
    }

    fn insert_indent(&mut self) {
        let range = self.selection.range();
        let indent = std::mem::take(&mut self.indent);
        self.buffer.replace(range.clone(), &indent);
        self.selection = Selection::collapsed(range.start + indent.chars().count());
        self.indent = indent;
    }

    fn insert_pair(&mut self, open: char, close: char) {
        let (start, end) = (self.selection.start(), self.selection.end());
        if start == end {
            let mut pair = String::with_capacity(2);
            pair.push(open);
            pair.push(close);
            self.buffer.insert(start, &pair);
            self.selection = Selection::collapsed(start + 1);
        } else {
            // Insert the closer first so `start` stays valid.
            self.buffer.insert(end, close.encode_utf8(&mut [0; 4]));
            self.buffer.insert(start, open.encode_utf8(&mut [0; 4]));
            self.selection = Selection::new(start, end + 2);
        }
        tracing::trace!(target: "quire::code", %open, start, end, "auto-paired");
    }

    fn insert_newline_with_indent(&mut self) -> KeydownResult {
        let range = self.selection.range();
        let indent = leading_whitespace(&self.buffer, range.start);
        if indent.is_empty() {
            return KeydownResult::NotHandled;
        }

        let mut inserted = String::with_capacity(indent.len() + 1);
        inserted.push('\n');
        inserted.push_str(&indent);
        self.buffer.replace(range.clone(), &inserted);
        self.selection = Selection::collapsed(range.start + inserted.chars().count());
        KeydownResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Modifiers;

    fn press(value: &str, sel: Selection, key: Key) -> (KeydownResult, String, Selection) {
        let mut field = CodeField::from_value(value, sel);
        let result = field.handle_keydown(&KeyCombo::new(key));
        (result, field.value(), field.selection())
    }

    #[test]
    fn test_tab_inserts_indent_at_every_caret() {
        let s = "let x = 1;";
        for p in 0..=s.len() {
            let (result, value, sel) = press(s, Selection::collapsed(p), Key::Tab);
            assert!(result.is_handled());
            assert_eq!(value, format!("{}    {}", &s[..p], &s[p..]));
            assert_eq!(sel, Selection::collapsed(p + 4));
        }
    }

    #[test]
    fn test_tab_replaces_selection() {
        let (_, value, sel) = press("abcdef", Selection::new(4, 1), Key::Tab);
        assert_eq!(value, "a    ef");
        assert_eq!(sel, Selection::collapsed(5));
    }

    #[test]
    fn test_shift_tab_does_not_dedent() {
        let mut field = CodeField::from_value("    x", Selection::collapsed(4));
        let result = field.handle_keydown(&KeyCombo::shift(Key::Tab));
        assert!(result.is_handled());
        assert_eq!(field.value(), "        x");
    }

    #[test]
    fn test_custom_indent_width() {
        let mut field = CodeField::from_value("x", Selection::collapsed(0)).with_indent_width(2);
        field.handle_keydown(&KeyCombo::new(Key::Tab));
        assert_eq!(field.value(), "  x");
        assert_eq!(field.selection(), Selection::collapsed(2));
    }

    #[test]
    fn test_bracket_pairs_without_selection() {
        for (open, close) in [('{', '}'), ('[', ']'), ('(', ')'), ('"', '"'), ('\'', '\'')] {
            let s = "ab";
            for p in 0..=s.len() {
                let (result, value, sel) =
                    press(s, Selection::collapsed(p), Key::character(open.to_string()));
                assert!(result.is_handled());
                assert_eq!(value, format!("{}{}{}{}", &s[..p], open, close, &s[p..]));
                assert_eq!(sel, Selection::collapsed(p + 1));
            }
        }
    }

    #[test]
    fn test_bracket_wraps_selection() {
        let (result, value, sel) = press("call foo now", Selection::new(5, 8), Key::character("("));
        assert!(result.is_handled());
        assert_eq!(value, "call (foo) now");
        assert_eq!(sel, Selection::new(5, 10));
    }

    #[test]
    fn test_bracket_wraps_backward_selection() {
        let (_, value, sel) = press("xy", Selection::new(2, 0), Key::character("["));
        assert_eq!(value, "[xy]");
        assert_eq!(sel, Selection::new(0, 4));
    }

    #[test]
    fn test_closer_is_not_skipped() {
        // Typing an opener right before an existing closer still inserts a pair.
        let (_, value, _) = press("()", Selection::collapsed(1), Key::character("("));
        assert_eq!(value, "(())");
    }

    #[test]
    fn test_enter_keeps_indent() {
        let s = "fn f() {\n    let x = 1;";
        let end = s.chars().count();
        let (result, value, sel) = press(s, Selection::collapsed(end), Key::Enter);
        assert!(result.is_handled());
        assert_eq!(value, format!("{s}\n    "));
        assert_eq!(sel, Selection::collapsed(end + 5));
    }

    #[test]
    fn test_enter_without_indent_passes_through() {
        let (result, value, sel) = press("top level", Selection::collapsed(3), Key::Enter);
        assert_eq!(result, KeydownResult::NotHandled);
        assert_eq!(value, "top level");
        assert_eq!(sel, Selection::collapsed(3));
    }

    #[test]
    fn test_enter_ignores_carriage_return_lines() {
        // Only `\n` starts a line, so this line has no leading whitespace.
        let s = "x\r    y";
        let (result, value, _) = press(s, Selection::collapsed(7), Key::Enter);
        assert_eq!(result, KeydownResult::NotHandled);
        assert_eq!(value, s);
    }

    #[test]
    fn test_enter_replaces_selection() {
        let (_, value, sel) = press("  abcd", Selection::new(3, 5), Key::Enter);
        assert_eq!(value, "  a\n  d");
        assert_eq!(sel, Selection::collapsed(6));
    }

    #[test]
    fn test_other_keys_pass_through() {
        let (result, value, _) = press("abc", Selection::collapsed(1), Key::character("x"));
        assert_eq!(result, KeydownResult::NotHandled);
        assert_eq!(value, "abc");

        let mut field = CodeField::from_value("abc", Selection::collapsed(1));
        let combo = KeyCombo::with_modifiers(Key::character("["), Modifiers::ctrl());
        assert_eq!(field.handle_keydown(&combo), KeydownResult::NotHandled);
        assert_eq!(field.value(), "abc");
    }
}
