//! Small DOM helpers shared by the field bindings and dialogs.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::error::BrowserError;

/// Marks elements the surface reader must skip (overlays drawn inside a
/// rich surface).
pub const TRANSIENT_ATTR: &str = "data-quire-transient";

/// Set on textareas that already have an editor attached.
pub const ENHANCED_ATTR: &str = "data-quire-enhanced";

pub fn window() -> Result<Window, BrowserError> {
    web_sys::window().ok_or(BrowserError::MissingWindow)
}

pub fn document() -> Result<Document, BrowserError> {
    window()?.document().ok_or(BrowserError::MissingDocument)
}

/// Create an element with a class list.
pub fn create_html(
    document: &Document,
    tag: &str,
    class: &str,
) -> Result<HtmlElement, BrowserError> {
    let el = document
        .create_element(tag)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| BrowserError::Dom(format!("<{tag}> is not an HTML element")))?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

/// Find a required descendant and cast it.
pub fn query<T: JsCast>(root: &Element, selector: &str) -> Result<T, BrowserError> {
    root.query_selector(selector)?
        .ok_or_else(|| BrowserError::Dom(format!("missing {selector}")))?
        .dyn_into::<T>()
        .map_err(|_| BrowserError::Dom(format!("{selector} has unexpected type")))
}

/// All elements matching `selector`, cast to `T`. Others are skipped.
pub fn query_all<T: JsCast>(root: &Document, selector: &str) -> Result<Vec<T>, BrowserError> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect())
}

pub fn set_class(el: &Element, class: &str, on: bool) {
    if let Err(e) = el.class_list().toggle_with_force(class, on) {
        tracing::warn!("class toggle failed: {:?}", e);
    }
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        tracing::warn!(property, "style update failed: {:?}", e);
    }
}

/// Fire a bubbling `input` event so listeners treat a programmatic change
/// like a user edit.
pub fn dispatch_input(target: &Element) -> Result<(), BrowserError> {
    let init = web_sys::EventInit::new();
    init.set_bubbles(true);
    let event = web_sys::Event::new_with_event_init_dict("input", &init)?;
    target.dispatch_event(&event)?;
    Ok(())
}
