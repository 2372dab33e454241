//! The media library dialog.
//!
//! The body is redrawn from `MediaFlow`'s phase. Fetches run on the local
//! executor and report back through a weak handle; a response is applied only
//! if the dialog is still the one on show and the flow still waits for that
//! request generation.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use quire_editor_core::{MediaCatalog, MediaFlow, MediaPhase, MediaRequest, ModalTicket};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, KeyboardEvent};

use crate::dom;
use crate::error::BrowserError;
use crate::icons;
use crate::modal::{ModalContent, ModalOverlay};
use crate::rich_field::RichSurface;

fn markup() -> String {
    format!(
        r#"<div class="rte-modal-head">
    <span>Media Library</span>
    <div class="rte-modal-actions">
        <input type="search" class="rte-media-search" id="rte-img-search" placeholder="Search media" autocomplete="off">
        <a class="rte-upload-link" id="rte-img-upload" target="_blank" rel="noopener noreferrer">Upload New</a>
        <button type="button" class="rte-icon-btn" id="rte-img-refresh" title="Refresh Library">{refresh}</button>
        <button type="button" class="rte-modal-close" id="rte-img-close">{close}</button>
    </div>
</div>
<div class="rte-modal-body" id="rte-media-body"></div>
<div class="rte-modal-foot">
    <button type="button" class="btn btn-ghost btn-sm" id="rte-img-cancel">Cancel</button>
    <button type="button" class="btn btn-primary btn-sm" id="rte-img-apply" disabled>Insert Image</button>
</div>"#,
        refresh = icons::REFRESH,
        close = icons::CLOSE
    )
}

/// Live state of an open media dialog.
pub struct MediaDialog<C> {
    flow: RefCell<MediaFlow>,
    body: HtmlElement,
    apply: HtmlButtonElement,
    upload_url: String,
    catalog: C,
    overlay: Weak<ModalOverlay>,
    ticket: Cell<Option<ModalTicket>>,
    items: RefCell<Vec<(HtmlElement, EventListener)>>,
    this: Weak<MediaDialog<C>>,
}

impl<C: MediaCatalog + Clone + 'static> MediaDialog<C> {
    pub fn flow(&self) -> std::cell::Ref<'_, MediaFlow> {
        self.flow.borrow()
    }

    pub fn body(&self) -> &HtmlElement {
        &self.body
    }

    pub fn apply_button(&self) -> &HtmlButtonElement {
        &self.apply
    }

    /// Ticket of the overlay open showing this dialog.
    pub fn ticket(&self) -> Option<ModalTicket> {
        self.ticket.get()
    }

    /// Whether this dialog is still what the overlay shows.
    fn is_shown(&self) -> bool {
        match (self.overlay.upgrade(), self.ticket.get()) {
            (Some(overlay), Some(ticket)) => overlay.is_current(ticket),
            _ => false,
        }
    }

    /// Draw the loading state and fetch.
    pub fn load(&self, request: MediaRequest) {
        self.render();
        let this = self.this.clone();
        let catalog = self.catalog.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = catalog.fetch(request.query.as_deref()).await;
            let Some(dialog) = this.upgrade() else {
                tracing::trace!(target: "quire::media", "dialog gone, response dropped");
                return;
            };
            if !dialog.is_shown() {
                tracing::debug!(target: "quire::media", generation = request.generation, "dialog closed, response dropped");
                return;
            }
            let accepted = dialog.flow.borrow_mut().receive(request.generation, result);
            if accepted {
                dialog.render();
            }
        });
    }

    /// Redraw the body for the current phase.
    pub fn render(&self) {
        if let Err(e) = self.try_render() {
            tracing::warn!(target: "quire::media", "media dialog render failed: {e}");
        }
    }

    fn try_render(&self) -> Result<(), BrowserError> {
        let document = dom::document()?;
        self.items.borrow_mut().clear();
        self.body.set_inner_html("");

        let flow = self.flow.borrow();
        match flow.phase() {
            MediaPhase::Closed => {}
            MediaPhase::Loading => {
                let loader = dom::create_html(&document, "div", "rte-media-loader")?;
                loader.set_inner_html(&format!("{}Loading Media...", icons::SPINNER));
                self.body.append_child(&loader)?;
            }
            MediaPhase::Empty => {
                let empty = dom::create_html(&document, "div", "rte-media-empty")?;
                let message = dom::create_html(&document, "div", "rte-media-message")?;
                message.set_text_content(Some("No images found in Media Library."));
                let upload = upload_link(&document, &self.upload_url, "btn btn-primary btn-sm")?;
                upload.set_text_content(Some("Upload New Image"));
                empty.append_child(&message)?;
                empty.append_child(&upload)?;
                self.body.append_child(&empty)?;
            }
            MediaPhase::Error(_) => {
                let error = dom::create_html(&document, "div", "rte-media-error")?;
                error.set_text_content(Some("Failed to load media."));
                self.body.append_child(&error)?;
            }
            MediaPhase::Populated { items, selected } => {
                let grid = dom::create_html(&document, "div", "rte-media-grid")?;
                let mut tiles = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let tile = dom::create_html(&document, "div", "rte-media-item")?;
                    tile.set_title(&item.title);
                    dom::set_class(&tile, "selected", *selected == Some(index));
                    let img = document.create_element("img")?;
                    img.set_attribute("src", item.thumb_url())?;
                    img.set_attribute("alt", &item.title)?;
                    tile.append_child(&img)?;
                    grid.append_child(&tile)?;

                    let this = self.this.clone();
                    let listener = EventListener::new(&tile, "click", move |_| {
                        if let Some(dialog) = this.upgrade() {
                            dialog.select(index);
                        }
                    });
                    tiles.push((tile, listener));
                }
                self.body.append_child(&grid)?;
                *self.items.borrow_mut() = tiles;
            }
        }
        self.apply.set_disabled(!flow.can_insert());
        Ok(())
    }

    /// Select the tile at `index`, clearing the others.
    pub fn select(&self, index: usize) {
        if !self.flow.borrow_mut().select(index) {
            return;
        }
        for (i, (tile, _)) in self.items.borrow().iter().enumerate() {
            dom::set_class(tile, "selected", i == index);
        }
        self.apply.set_disabled(false);
    }
}

fn upload_link(document: &Document, href: &str, class: &str) -> Result<Element, BrowserError> {
    let link = document.create_element("a")?;
    link.set_class_name(class);
    link.set_attribute("href", href)?;
    link.set_attribute("target", "_blank")?;
    link.set_attribute("rel", "noopener noreferrer")?;
    Ok(link)
}

/// Open the media dialog for `surface`. Its selection must already be captured.
pub fn open_media_dialog<C: MediaCatalog + Clone + 'static>(
    overlay: &Rc<ModalOverlay>,
    surface: &Rc<RichSurface>,
    catalog: C,
    upload_url: &str,
) -> Result<Rc<MediaDialog<C>>, BrowserError> {
    let (dialog, content) = build_media_dialog(overlay, surface, catalog, upload_url)?;
    let ticket = overlay.open(content)?;
    dialog.ticket.set(Some(ticket));
    let request = dialog.flow.borrow_mut().open(None);
    dialog.load(request);
    Ok(dialog)
}

fn build_media_dialog<C: MediaCatalog + Clone + 'static>(
    overlay: &Rc<ModalOverlay>,
    surface: &Rc<RichSurface>,
    catalog: C,
    upload_url: &str,
) -> Result<(Rc<MediaDialog<C>>, ModalContent), BrowserError> {
    let document = dom::document()?;
    let root = dom::create_html(&document, "div", "rte-modal media-modal")?;
    root.set_inner_html(&markup());

    let body: HtmlElement = dom::query(&root, "#rte-media-body")?;
    let apply: HtmlButtonElement = dom::query(&root, "#rte-img-apply")?;
    let search: HtmlInputElement = dom::query(&root, "#rte-img-search")?;
    let refresh: HtmlElement = dom::query(&root, "#rte-img-refresh")?;
    let close: HtmlElement = dom::query(&root, "#rte-img-close")?;
    let cancel: HtmlElement = dom::query(&root, "#rte-img-cancel")?;
    let upload: Element = dom::query(&root, "#rte-img-upload")?;
    upload.set_attribute("href", upload_url)?;

    let dialog = Rc::new_cyclic(|this| MediaDialog {
        flow: RefCell::new(MediaFlow::new()),
        body,
        apply: apply.clone(),
        upload_url: upload_url.to_string(),
        catalog,
        overlay: Rc::downgrade(overlay),
        ticket: Cell::new(None),
        items: RefCell::new(Vec::new()),
        this: this.clone(),
    });

    let mut content = ModalContent::new(root).on_close({
        let dialog = Rc::downgrade(&dialog);
        let surface = Rc::downgrade(surface);
        move || {
            if let Some(dialog) = dialog.upgrade() {
                dialog.flow.borrow_mut().close();
            }
            if let Some(surface) = surface.upgrade() {
                surface.discard_selection();
            }
        }
    });

    let d = dialog.clone();
    content.listen(EventListener::new(&refresh, "click", move |_| {
        let request = d.flow.borrow_mut().refresh();
        d.load(request);
    }));

    let d = dialog.clone();
    let input = search.clone();
    content.listen(EventListener::new(&search, "keydown", move |event| {
        let enter = event
            .dyn_ref::<KeyboardEvent>()
            .is_some_and(|e| e.key() == "Enter");
        if enter {
            let request = d.flow.borrow_mut().search(input.value());
            d.load(request);
        }
    }));

    for button in [&close, &cancel] {
        let overlay = Rc::downgrade(overlay);
        content.listen(EventListener::new(button, "click", move |_| {
            if let Some(overlay) = overlay.upgrade() {
                overlay.close();
            }
        }));
    }

    let d = dialog.clone();
    let weak_overlay = Rc::downgrade(overlay);
    let weak_surface = Rc::downgrade(surface);
    content.listen(EventListener::new(&apply, "click", move |_| {
        let Some(image) = d.flow.borrow_mut().apply() else {
            return;
        };
        if let Some(surface) = weak_surface.upgrade() {
            tracing::debug!(target: "quire::media", url = %image.url, "inserting image");
            if let Err(e) = surface.apply_image(&image) {
                tracing::warn!(target: "quire::media", "image insertion failed: {e}");
            }
        }
        if let Some(overlay) = weak_overlay.upgrade() {
            overlay.close();
        }
    }));

    Ok((dialog, content))
}
