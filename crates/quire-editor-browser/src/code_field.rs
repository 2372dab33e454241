//! Keystroke interception on `<textarea>` code fields.
//!
//! The textarea stays the source of truth. On each keydown the value and
//! selection are read into a `CodeField`, the interceptor runs, and a handled
//! key writes the result back with the default action suppressed.

use gloo_events::{EventListener, EventListenerOptions};
use quire_editor_core::text_helpers::{char_to_utf16_offset, utf16_to_char_offset};
use quire_editor_core::{CodeField, Key, KeyCombo, Modifiers, Selection};
use wasm_bindgen::JsCast;
use web_sys::{HtmlTextAreaElement, KeyboardEvent};

use crate::dom::ENHANCED_ATTR;
use crate::error::BrowserError;

/// Translate a DOM keyboard event.
pub fn key_combo(event: &KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        Key::parse(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}

/// Read the textarea's selection as char offsets into `value`.
pub fn read_selection(
    textarea: &HtmlTextAreaElement,
    value: &str,
) -> Result<Selection, BrowserError> {
    let start = textarea.selection_start()?.unwrap_or(0) as usize;
    let end = textarea.selection_end()?.unwrap_or(start as u32) as usize;
    let start = utf16_to_char_offset(value, start);
    let end = utf16_to_char_offset(value, end);
    let backward = textarea.selection_direction()?.as_deref() == Some("backward");
    Ok(if backward {
        Selection::new(end, start)
    } else {
        Selection::new(start, end)
    })
}

/// Write `value` and `selection` back to the textarea.
pub fn write_field(
    textarea: &HtmlTextAreaElement,
    value: &str,
    selection: Selection,
) -> Result<(), BrowserError> {
    textarea.set_value(value);
    let start = char_to_utf16_offset(value, selection.start()) as u32;
    let end = char_to_utf16_offset(value, selection.end()) as u32;
    let direction = if selection.is_backward() {
        "backward"
    } else {
        "forward"
    };
    textarea.set_selection_range_with_direction(start, end, direction)?;
    Ok(())
}

/// Run the interceptor for one keydown. Returns whether it was handled.
pub fn handle_code_keydown(
    textarea: &HtmlTextAreaElement,
    event: &KeyboardEvent,
    indent_width: usize,
) -> Result<bool, BrowserError> {
    if event.is_composing() {
        return Ok(false);
    }
    let combo = key_combo(event);
    let value = textarea.value();
    let selection = read_selection(textarea, &value)?;

    let mut field = CodeField::from_value(&value, selection).with_indent_width(indent_width);
    if !field.handle_keydown(&combo).is_handled() {
        return Ok(false);
    }
    event.prevent_default();
    write_field(textarea, &field.value(), field.selection())?;
    Ok(true)
}

/// A textarea enhanced as a code field. Dropping it removes the listener.
pub struct CodeFieldBinding {
    textarea: HtmlTextAreaElement,
    _keydown: EventListener,
}

impl CodeFieldBinding {
    pub fn attach(textarea: HtmlTextAreaElement, indent_width: usize) -> Self {
        let target = textarea.clone();
        let keydown = EventListener::new_with_options(
            &textarea,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if let Err(e) = handle_code_keydown(&target, event, indent_width) {
                    tracing::warn!(target: "quire::code", "keydown handling failed: {e}");
                }
            },
        );
        if let Err(e) = textarea.set_attribute(ENHANCED_ATTR, "") {
            tracing::warn!(target: "quire::code", "could not mark field: {:?}", e);
        }
        tracing::debug!(target: "quire::code", name = %textarea.name(), "code field attached");
        Self {
            textarea,
            _keydown: keydown,
        }
    }

    pub fn textarea(&self) -> &HtmlTextAreaElement {
        &self.textarea
    }
}

impl Drop for CodeFieldBinding {
    fn drop(&mut self) {
        if let Err(e) = self.textarea.remove_attribute(ENHANCED_ATTR) {
            tracing::warn!(target: "quire::code", "could not clear marker: {:?}", e);
        }
    }
}
