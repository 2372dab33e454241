//! The link insertion dialog.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use quire_editor_core::{LinkFlow, ModalTicket};
use web_sys::{HtmlElement, HtmlInputElement};

use crate::dom;
use crate::error::BrowserError;
use crate::icons;
use crate::modal::{ModalContent, ModalOverlay};
use crate::rich_field::RichSurface;

fn markup() -> String {
    format!(
        r#"<div class="rte-modal-head">
    <span>Insert Link</span>
    <button type="button" class="rte-modal-close" id="rte-link-close">{close}</button>
</div>
<div class="rte-modal-body">
    <div class="rte-form-group">
        <label for="rte-link-url">URL</label>
        <input type="text" id="rte-link-url" placeholder="https://..." autocomplete="off">
    </div>
    <label class="rte-checkbox-label">
        <input type="checkbox" id="rte-link-target" checked> Open in new tab
    </label>
</div>
<div class="rte-modal-foot">
    <button type="button" class="btn btn-ghost btn-sm" id="rte-link-cancel">Cancel</button>
    <button type="button" class="btn btn-primary btn-sm" id="rte-link-apply">Apply Link</button>
</div>"#,
        close = icons::CLOSE
    )
}

/// Open the link dialog for `surface`. Its selection must already be captured.
pub fn open_link_dialog(
    overlay: &Rc<ModalOverlay>,
    surface: &Rc<RichSurface>,
) -> Result<ModalTicket, BrowserError> {
    let document = dom::document()?;
    let root = dom::create_html(&document, "div", "rte-modal")?;
    root.set_inner_html(&markup());

    let url: HtmlInputElement = dom::query(&root, "#rte-link-url")?;
    let new_tab: HtmlInputElement = dom::query(&root, "#rte-link-target")?;
    let close: HtmlElement = dom::query(&root, "#rte-link-close")?;
    let cancel: HtmlElement = dom::query(&root, "#rte-link-cancel")?;
    let apply: HtmlElement = dom::query(&root, "#rte-link-apply")?;

    let flow = Rc::new(RefCell::new(LinkFlow::default()));
    flow.borrow_mut().open();

    let mut content = ModalContent::new(root).on_close({
        let flow = flow.clone();
        let surface = Rc::downgrade(surface);
        move || {
            flow.borrow_mut().cancel();
            if let Some(surface) = surface.upgrade() {
                surface.discard_selection();
            }
        }
    });

    let f = flow.clone();
    let input = url.clone();
    content.listen(EventListener::new(&url, "input", move |_| {
        f.borrow_mut().set_url(input.value());
    }));
    let f = flow.clone();
    let checkbox = new_tab.clone();
    content.listen(EventListener::new(&new_tab, "change", move |_| {
        f.borrow_mut().set_new_tab(checkbox.checked());
    }));

    for button in [&close, &cancel] {
        let overlay = Rc::downgrade(overlay);
        content.listen(EventListener::new(button, "click", move |_| {
            if let Some(overlay) = overlay.upgrade() {
                overlay.close();
            }
        }));
    }

    let weak_overlay = Rc::downgrade(overlay);
    let weak_surface = Rc::downgrade(surface);
    content.listen(EventListener::new(&apply, "click", move |_| {
        let request = flow.borrow_mut().apply();
        if let (Some(request), Some(surface)) = (request, weak_surface.upgrade()) {
            tracing::debug!(href = %request.href, new_tab = request.new_tab, "inserting link");
            if let Err(e) = surface.apply_link(&request) {
                tracing::warn!("link insertion failed: {e}");
            }
        }
        if let Some(overlay) = weak_overlay.upgrade() {
            overlay.close();
        }
    }));

    overlay.open(content)
}
