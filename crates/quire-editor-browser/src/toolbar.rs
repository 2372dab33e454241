//! Toolbar buttons for a rich field.

use quire_editor_core::{ActiveFormats, ToolbarCommand, ToolbarItem};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlButtonElement, HtmlElement};

use crate::dom;
use crate::error::BrowserError;
use crate::icons;

pub struct ToolbarButton {
    pub command: ToolbarCommand,
    pub element: HtmlButtonElement,
}

/// The `.rte-toolbar` element and its buttons.
pub struct ToolbarView {
    root: HtmlElement,
    buttons: Vec<ToolbarButton>,
}

impl ToolbarView {
    pub fn build(document: &Document, items: &[ToolbarItem]) -> Result<Self, BrowserError> {
        let root = dom::create_html(document, "div", "rte-toolbar")?;
        let mut buttons = Vec::new();
        for item in items {
            match item {
                ToolbarItem::Separator => {
                    root.append_child(&dom::create_html(document, "div", "rte-separator")?.into())?;
                }
                ToolbarItem::Button(command) => {
                    let element = document
                        .create_element("button")?
                        .dyn_into::<HtmlButtonElement>()
                        .map_err(|_| BrowserError::Dom("button element".into()))?;
                    element.set_type("button");
                    element.set_class_name("rte-btn");
                    element.set_title(command.title);
                    element.set_attribute("data-command", command.id)?;
                    if let Some(icon) = icons::toolbar_icon(command.id) {
                        element.set_inner_html(&icon);
                    }
                    root.append_child(&element)?;
                    buttons.push(ToolbarButton {
                        command: command.clone(),
                        element,
                    });
                }
            }
        }
        let view = Self { root, buttons };
        view.set_enabled(false);
        Ok(view)
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub fn buttons(&self) -> &[ToolbarButton] {
        &self.buttons
    }

    pub fn button(&self, id: &str) -> Option<&HtmlButtonElement> {
        self.buttons
            .iter()
            .find(|b| b.command.id == id)
            .map(|b| &b.element)
    }

    /// Mark inline-format buttons active or not.
    pub fn update_active(&self, formats: &ActiveFormats) {
        for button in &self.buttons {
            if button.command.tracks_active_state() {
                dom::set_class(&button.element, "active", button.command.is_active(formats));
            }
        }
    }

    /// Buttons only work while the selection is in the field's surface.
    pub fn set_enabled(&self, enabled: bool) {
        for button in &self.buttons {
            button.element.set_disabled(!enabled);
        }
        dom::set_class(&self.root, "is-disabled", !enabled);
    }
}
