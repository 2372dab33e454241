//! Rich fields: a contenteditable surface standing in for a `<textarea>`.
//!
//! The textarea is hidden and stays the form value. A `RichSurface` keeps
//! the core `RichField` in step with the live DOM: user edits are read back
//! on `input`, programmatic edits re-render the surface from the tree, and
//! both end with the textarea value rewritten.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use quire_editor_core::{
    CommandAction, CustomFlow, FormatCommand, ImageInsert, LinkRequest, RichField,
    default_toolbar,
};
use web_sys::{HtmlElement, HtmlTextAreaElement};

use crate::catalog::HttpCatalog;
use crate::dom::{self, ENHANCED_ATTR};
use crate::dom_sync::{
    NodeMap, apply_selection, read_selection, read_surface, render_surface, selection_in_surface,
};
use crate::error::BrowserError;
use crate::link_dialog::open_link_dialog;
use crate::media_dialog::open_media_dialog;
use crate::modal::ModalOverlay;
use crate::toolbar::ToolbarView;

/// Shared state of one mounted rich field.
pub struct RichSurface {
    textarea: HtmlTextAreaElement,
    container: HtmlElement,
    content: HtmlElement,
    toolbar: ToolbarView,
    field: RefCell<RichField>,
    map: RefCell<NodeMap>,
}

impl RichSurface {
    /// Build the container after `textarea` and hide the textarea.
    pub fn mount(textarea: HtmlTextAreaElement) -> Result<Rc<Self>, BrowserError> {
        let document = dom::document()?;
        let container = dom::create_html(&document, "div", "rte-container")?;
        let toolbar = ToolbarView::build(&document, &default_toolbar())?;
        let content = dom::create_html(&document, "div", "rte-content")?;
        content.set_content_editable("true");
        let placeholder = textarea.placeholder();
        if !placeholder.is_empty() {
            content.set_attribute("data-placeholder", &placeholder)?;
        }

        let field = RichField::mount(textarea.value());
        let map = render_surface(field.document(), &content, &document)?;

        container.append_child(toolbar.root())?;
        container.append_child(&content)?;
        textarea.after_with_node_1(&container)?;
        dom::set_style(&textarea, "display", "none");
        textarea.set_attribute(ENHANCED_ATTR, "")?;
        tracing::debug!(name = %textarea.name(), "rich field mounted");

        Ok(Rc::new(Self {
            textarea,
            container,
            content,
            toolbar,
            field: RefCell::new(field),
            map: RefCell::new(map),
        }))
    }

    pub fn textarea(&self) -> &HtmlTextAreaElement {
        &self.textarea
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// The contenteditable element.
    pub fn content(&self) -> &HtmlElement {
        &self.content
    }

    pub fn toolbar(&self) -> &ToolbarView {
        &self.toolbar
    }

    pub fn backing_value(&self) -> String {
        self.field.borrow().backing_value().to_string()
    }

    fn write_backing(&self, field: &RichField) {
        if self.textarea.value() != field.backing_value() {
            self.textarea.set_value(field.backing_value());
        }
    }

    /// Re-read the surface after a user edit and sync the textarea.
    pub fn pull(&self) {
        // Skipped when the field is busy re-rendering; that path syncs itself.
        let Ok(mut field) = self.field.try_borrow_mut() else {
            return;
        };
        let map = read_surface(field.document_mut(), &self.content);
        let selection = read_selection(&map, field.document());
        field.set_selection(selection);
        field.sync();
        self.write_backing(&field);
        *self.map.borrow_mut() = map;
    }

    /// Sync the textarea from the tree without re-reading the surface.
    pub fn flush(&self) {
        if let Ok(mut field) = self.field.try_borrow_mut() {
            field.sync();
            self.write_backing(&field);
        }
    }

    /// Record where the page selection sits in the surface.
    pub fn refresh_selection(&self) {
        let Ok(mut field) = self.field.try_borrow_mut() else {
            return;
        };
        let selection = read_selection(&self.map.borrow(), field.document());
        field.set_selection(selection);
    }

    pub fn refresh_toolbar(&self) {
        if let Ok(field) = self.field.try_borrow() {
            self.toolbar.update_active(&field.active_formats());
        }
        self.toolbar
            .set_enabled(selection_in_surface(&self.content));
    }

    fn render(&self, field: &RichField) -> Result<(), BrowserError> {
        let document = dom::document()?;
        let map = render_surface(field.document(), &self.content, &document)?;
        if let Some(selection) = field.selection() {
            apply_selection(&map, field.document(), &selection)?;
        }
        *self.map.borrow_mut() = map;
        Ok(())
    }

    /// Give the surface focus. A toolbar press keeps the page selection, so
    /// this only moves the caret when the selection had already left.
    pub fn focus(&self) {
        if let Err(e) = self.content.focus() {
            tracing::debug!("surface focus failed: {:?}", e);
        }
    }

    /// Re-render from the tree after a programmatic edit.
    fn commit(&self) -> Result<(), BrowserError> {
        self.focus();
        {
            let field = self.field.borrow();
            self.render(&field)?;
            self.write_backing(&field);
        }
        self.refresh_toolbar();
        Ok(())
    }

    /// Run a built-in formatting command on the current selection.
    pub fn run_command(&self, command: FormatCommand) -> Result<(), BrowserError> {
        self.focus();
        self.refresh_selection();
        let applied = self.field.borrow_mut().run_format(command);
        if applied.is_none() {
            tracing::debug!(?command, "no selection in surface, command skipped");
            return Ok(());
        }
        self.commit()
    }

    /// Remember the selection before a dialog takes focus.
    pub fn capture_selection(&self) {
        self.focus();
        self.refresh_selection();
        self.field.borrow_mut().capture_selection();
    }

    pub fn discard_selection(&self) {
        self.field.borrow_mut().discard_selection();
    }

    pub fn apply_link(&self, request: &LinkRequest) -> Result<(), BrowserError> {
        self.field.borrow_mut().apply_link(request);
        self.commit()
    }

    pub fn apply_image(&self, image: &ImageInsert) -> Result<(), BrowserError> {
        self.field.borrow_mut().apply_image(image);
        self.commit()
    }

    /// Remove the container and show the textarea again.
    pub fn unmount(&self) {
        self.flush();
        self.container.remove();
        if let Err(e) = self.textarea.style().remove_property("display") {
            tracing::warn!("could not show textarea: {:?}", e);
        }
        if let Err(e) = self.textarea.remove_attribute(ENHANCED_ATTR) {
            tracing::warn!("could not clear marker: {:?}", e);
        }
    }
}

/// What toolbar dialogs need from the session.
#[derive(Clone)]
pub struct DialogHost {
    pub overlay: Rc<ModalOverlay>,
    pub catalog: HttpCatalog,
    pub upload_url: String,
}

fn run_action(surface: &Rc<RichSurface>, host: &DialogHost, action: CommandAction) {
    let result = match action {
        CommandAction::Format(command) => surface.run_command(command),
        CommandAction::Custom(flow) => {
            surface.capture_selection();
            let opened = match flow {
                CustomFlow::Link => open_link_dialog(&host.overlay, surface),
                CustomFlow::Image => open_media_dialog(
                    &host.overlay,
                    surface,
                    host.catalog.clone(),
                    &host.upload_url,
                )
                .and_then(|dialog| {
                    dialog
                        .ticket()
                        .ok_or_else(|| BrowserError::Dom("media dialog not shown".into()))
                }),
            };
            opened.map(|ticket| tracing::debug!(?flow, %ticket, "dialog opened"))
        }
    };
    if let Err(e) = result {
        tracing::warn!(?action, "toolbar command failed: {e}");
    }
}

/// A mounted rich field with its listeners. Dropping it unmounts the field.
pub struct RichFieldBinding {
    surface: Rc<RichSurface>,
    _listeners: Vec<EventListener>,
}

impl RichFieldBinding {
    pub fn attach(textarea: HtmlTextAreaElement, host: DialogHost) -> Result<Self, BrowserError> {
        let surface = RichSurface::mount(textarea)?;
        let content = surface.content().clone();
        let mut listeners = Vec::new();

        let s = surface.clone();
        listeners.push(EventListener::new(&content, "input", move |_| {
            s.pull();
            s.refresh_toolbar();
        }));
        let s = surface.clone();
        listeners.push(EventListener::new(&content, "blur", move |_| s.flush()));
        for event in ["keyup", "click"] {
            let s = surface.clone();
            listeners.push(EventListener::new(&content, event, move |_| {
                s.refresh_selection();
                s.refresh_toolbar();
            }));
        }

        let s = surface.clone();
        listeners.push(EventListener::new(
            &dom::document()?.into(),
            "selectionchange",
            move |_| {
                s.toolbar().set_enabled(selection_in_surface(s.content()));
            },
        ));

        // Keep the surface selection when a toolbar button is pressed.
        listeners.push(EventListener::new_with_options(
            surface.toolbar().root(),
            "mousedown",
            EventListenerOptions::enable_prevent_default(),
            |event| event.prevent_default(),
        ));

        for button in surface.toolbar().buttons() {
            let s = surface.clone();
            let host = host.clone();
            let action = button.command.action;
            listeners.push(EventListener::new(&button.element, "click", move |_| {
                run_action(&s, &host, action);
            }));
        }

        Ok(Self {
            surface,
            _listeners: listeners,
        })
    }

    pub fn surface(&self) -> &Rc<RichSurface> {
        &self.surface
    }
}

impl Drop for RichFieldBinding {
    fn drop(&mut self) {
        self.surface.unmount();
    }
}
