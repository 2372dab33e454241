//! The shared modal overlay.
//!
//! One backdrop element serves every dialog on the page. Opening swaps its
//! content, activation waits for the next animation frame so the CSS
//! transition runs, and closing clears the content after a short delay.
//! Both deferred steps carry the `ModalTicket` of the open they belong to, so
//! a dialog opened in the meantime is never cleared by an older close.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use quire_editor_core::{ModalPhase, ModalSlot, ModalTicket};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlElement, KeyboardEvent, Node};

use crate::dom;
use crate::error::BrowserError;

/// Dialog content placed in the overlay.
///
/// Dropping it removes its root element and its listeners.
pub struct ModalContent {
    root: HtmlElement,
    listeners: Vec<EventListener>,
    on_close: Option<Box<dyn FnOnce()>>,
}

impl ModalContent {
    pub fn new(root: HtmlElement) -> Self {
        Self {
            root,
            listeners: Vec::new(),
            on_close: None,
        }
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    /// Keep `listener` alive for as long as the content is shown.
    pub fn listen(&mut self, listener: EventListener) {
        self.listeners.push(listener);
    }

    /// Run `f` when the overlay closes with this content. Not run when the
    /// content is replaced by another `open`.
    pub fn on_close(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }
}

impl Drop for ModalContent {
    fn drop(&mut self) {
        self.listeners.clear();
        self.root.remove();
    }
}

#[derive(Default)]
struct OverlayState {
    slot: ModalSlot<ModalContent>,
    backdrop: Option<HtmlElement>,
    listeners: Vec<EventListener>,
    timer: Option<Timeout>,
}

pub struct ModalOverlay {
    state: RefCell<OverlayState>,
    close_delay_ms: u32,
    this: Weak<ModalOverlay>,
}

impl ModalOverlay {
    pub fn new(close_delay_ms: u32) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            state: RefCell::new(OverlayState::default()),
            close_delay_ms,
            this: this.clone(),
        })
    }

    pub fn phase(&self) -> ModalPhase {
        self.state.borrow().slot.phase()
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().slot.is_open()
    }

    /// Whether `ticket` still names the content on show.
    pub fn is_current(&self, ticket: ModalTicket) -> bool {
        let state = self.state.borrow();
        state.slot.is_current(ticket) && state.slot.is_open()
    }

    /// The backdrop element, once something has been opened.
    pub fn backdrop(&self) -> Option<HtmlElement> {
        self.state.borrow().backdrop.clone()
    }

    /// Show `content`, replacing anything already in the overlay.
    pub fn open(&self, content: ModalContent) -> Result<ModalTicket, BrowserError> {
        let (ticket, replaced) = {
            let mut state = self.state.borrow_mut();
            let backdrop = self.ensure_backdrop(&mut state)?;
            backdrop.append_child(content.root())?;
            state.timer = None;
            state.slot.open(content)
        };
        // Torn down outside the borrow: removing a focused node can fire events.
        drop(replaced);

        let this = self.this.clone();
        let activate = Closure::once_into_js(move || {
            if let Some(overlay) = this.upgrade() {
                overlay.activate(ticket);
            }
        });
        dom::window()?.request_animation_frame(activate.unchecked_ref())?;
        tracing::debug!(target: "quire::modal", %ticket, "modal opened");
        Ok(ticket)
    }

    fn ensure_backdrop(&self, state: &mut OverlayState) -> Result<HtmlElement, BrowserError> {
        if let Some(backdrop) = &state.backdrop {
            return Ok(backdrop.clone());
        }
        let document = dom::document()?;
        let backdrop = dom::create_html(&document, "div", "rte-modal-overlay")?;
        document
            .body()
            .ok_or_else(|| BrowserError::Dom("document has no body".into()))?
            .append_child(&backdrop)?;

        let this = self.this.clone();
        let target_backdrop = backdrop.clone();
        state.listeners.push(EventListener::new(&backdrop, "click", move |event| {
            let on_backdrop = event
                .target()
                .and_then(|t| t.dyn_into::<Node>().ok())
                .is_some_and(|node| node.is_same_node(Some(&target_backdrop)));
            if let Some(overlay) = this.upgrade() {
                overlay.dismiss(|slot| slot.dismiss_on_backdrop(on_backdrop));
            }
        }));

        let this = self.this.clone();
        state.listeners.push(EventListener::new(&document, "keydown", move |event| {
            let escape = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|e| e.key() == "Escape");
            if !escape {
                return;
            }
            if let Some(overlay) = this.upgrade() {
                overlay.dismiss(ModalSlot::dismiss_on_escape);
            }
        }));

        state.backdrop = Some(backdrop.clone());
        Ok(backdrop)
    }

    fn activate(&self, ticket: ModalTicket) {
        let focus = {
            let mut state = self.state.borrow_mut();
            if !state.slot.activate(ticket) {
                return;
            }
            if let Some(backdrop) = &state.backdrop {
                dom::set_class(backdrop, "active", true);
            }
            state
                .slot
                .content()
                .and_then(|c| c.root().query_selector("input").ok().flatten())
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        };
        if let Some(input) = focus {
            if let Err(e) = input.focus() {
                tracing::debug!(target: "quire::modal", "focus failed: {:?}", e);
            }
        }
    }

    fn dismiss(&self, how: impl FnOnce(&mut ModalSlot<ModalContent>) -> Option<ModalTicket>) {
        let closing = how(&mut self.state.borrow_mut().slot);
        if let Some(ticket) = closing {
            self.begin_close(ticket);
        }
    }

    /// Hide the overlay. The content is cleared after the close delay.
    pub fn close(&self) {
        let closing = self.state.borrow_mut().slot.close();
        if let Some(ticket) = closing {
            self.begin_close(ticket);
        }
    }

    fn begin_close(&self, ticket: ModalTicket) {
        let on_close = {
            let mut state = self.state.borrow_mut();
            if let Some(backdrop) = &state.backdrop {
                dom::set_class(backdrop, "active", false);
            }
            let this = self.this.clone();
            state.timer = Some(Timeout::new(self.close_delay_ms, move || {
                if let Some(overlay) = this.upgrade() {
                    overlay.finish_close(ticket);
                }
            }));
            state.slot.content_mut().and_then(|c| c.on_close.take())
        };
        if let Some(f) = on_close {
            f();
        }
    }

    fn finish_close(&self, ticket: ModalTicket) {
        // The timer that called us stays in `state.timer` until the next
        // open or close replaces it.
        let content = self.state.borrow_mut().slot.finish_close(ticket);
        if content.is_some() {
            tracing::trace!(target: "quire::modal", %ticket, "modal content cleared");
        }
        drop(content);
    }

    /// Remove the backdrop and everything in it.
    pub fn teardown(&self) {
        let (content, backdrop, listeners, timer) = {
            let mut state = self.state.borrow_mut();
            (
                state.slot.clear(),
                state.backdrop.take(),
                std::mem::take(&mut state.listeners),
                state.timer.take(),
            )
        };
        drop(timer);
        drop(listeners);
        drop(content);
        if let Some(backdrop) = backdrop {
            backdrop.remove();
        }
    }
}
