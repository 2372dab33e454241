//! Drag-to-resize frame for images inside rich surfaces.
//!
//! One frame serves the whole page. Pressing on an image in a surface moves
//! the frame onto it; pressing anywhere else outside the frame hides it.
//! Dragging a corner sets the image's inline width and, on release, fires
//! `input` on the surface so the new size reaches the backing value.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::{EventListener, EventListenerOptions};
use quire_editor_core::{Rect, ResizeHandle, ResizeSession, ScrollOffset, overlay_rect};
use wasm_bindgen::JsCast;
use web_sys::{DomRect, Element, HtmlElement, MouseEvent};

use crate::dom::{self, TRANSIENT_ATTR};
use crate::error::BrowserError;

const SURFACE_SELECTOR: &str = ".rte-content";

fn rect(r: &DomRect) -> Rect {
    Rect::new(r.x(), r.y(), r.width(), r.height())
}

fn event_element(event: &web_sys::Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn surface_of(el: &Element) -> Option<HtmlElement> {
    el.closest(SURFACE_SELECTOR)
        .ok()
        .flatten()
        .and_then(|s| s.dyn_into::<HtmlElement>().ok())
}

pub struct ImageResizer {
    frame: HtmlElement,
    session: RefCell<ResizeSession<HtmlElement>>,
    drag_listeners: RefCell<Vec<EventListener>>,
    listeners: RefCell<Vec<EventListener>>,
    this: Weak<ImageResizer>,
}

impl ImageResizer {
    /// Create the frame and start listening on the document.
    pub fn install(min_width: f64) -> Result<Rc<Self>, BrowserError> {
        let document = dom::document()?;
        let frame = dom::create_html(&document, "div", "rte-resizer")?;
        frame.set_attribute(TRANSIENT_ATTR, "")?;
        frame.set_attribute("contenteditable", "false")?;
        for handle in ResizeHandle::ALL {
            let el = dom::create_html(
                &document,
                "div",
                &format!("rte-resizer-handle {}", handle.as_str()),
            )?;
            el.set_attribute("data-dir", handle.as_str())?;
            frame.append_child(&el)?;
        }

        let resizer = Rc::new_cyclic(|this| Self {
            frame,
            session: RefCell::new(ResizeSession::new(min_width)),
            drag_listeners: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            this: this.clone(),
        });

        let mut listeners = Vec::new();
        let this = resizer.this.clone();
        listeners.push(EventListener::new(&document, "mousedown", move |event| {
            if let Some(resizer) = this.upgrade() {
                resizer.on_document_mousedown(event);
            }
        }));

        let this = resizer.this.clone();
        listeners.push(EventListener::new_with_options(
            &document,
            "scroll",
            EventListenerOptions::run_in_capture_phase(),
            move |event| {
                let on_surface = event_element(event)
                    .is_some_and(|el| el.class_list().contains("rte-content"));
                if let (true, Some(resizer)) = (on_surface, this.upgrade()) {
                    resizer.update_position();
                }
            },
        ));

        let this = resizer.this.clone();
        listeners.push(EventListener::new_with_options(
            &resizer.frame,
            "mousedown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(resizer) = this.upgrade() {
                    resizer.on_handle_mousedown(event);
                }
            },
        ));
        *resizer.listeners.borrow_mut() = listeners;
        Ok(resizer)
    }

    pub fn frame(&self) -> &HtmlElement {
        &self.frame
    }

    pub fn active_image(&self) -> Option<HtmlElement> {
        self.session.borrow().image().cloned()
    }

    fn on_document_mousedown(&self, event: &web_sys::Event) {
        let Some(target) = event_element(event) else {
            return;
        };
        if target.tag_name().eq_ignore_ascii_case("img") {
            if let (Some(surface), Ok(image)) =
                (surface_of(&target), target.clone().dyn_into::<HtmlElement>())
            {
                if let Err(e) = self.attach(image, &surface) {
                    tracing::warn!(target: "quire::resize", "could not attach resizer: {e}");
                }
                return;
            }
        }
        if target.closest(".rte-resizer").ok().flatten().is_none() {
            self.hide();
        }
    }

    /// Put the frame on `image` inside `surface`.
    pub fn attach(&self, image: HtmlElement, surface: &HtmlElement) -> Result<(), BrowserError> {
        let position = dom::window()?
            .get_computed_style(surface)?
            .map(|style| style.get_property_value("position"))
            .transpose()?;
        if position.as_deref() == Some("static") {
            dom::set_style(surface, "position", "relative");
        }
        surface.append_child(&self.frame)?;
        self.drag_listeners.borrow_mut().clear();
        self.session.borrow_mut().attach(image);
        self.update_position();
        Ok(())
    }

    /// Move the frame over the active image.
    pub fn update_position(&self) {
        let Some(image) = self.active_image() else {
            return;
        };
        if self.frame.parent_node().is_none() {
            return;
        }
        let Some(surface) = image.is_connected().then(|| surface_of(&image)).flatten() else {
            self.hide();
            return;
        };
        let placed = overlay_rect(
            rect(&image.get_bounding_client_rect()),
            rect(&surface.get_bounding_client_rect()),
            ScrollOffset {
                left: surface.scroll_left() as f64,
                top: surface.scroll_top() as f64,
            },
        );
        dom::set_style(&self.frame, "left", &format!("{}px", placed.x));
        dom::set_style(&self.frame, "top", &format!("{}px", placed.y));
        dom::set_style(&self.frame, "width", &format!("{}px", placed.width));
        dom::set_style(&self.frame, "height", &format!("{}px", placed.height));
    }

    /// Remove the frame and forget the image.
    pub fn hide(&self) {
        self.frame.remove();
        self.drag_listeners.borrow_mut().clear();
        self.session.borrow_mut().detach();
    }

    fn on_handle_mousedown(&self, event: &web_sys::Event) {
        let (Some(mouse), Some(target)) = (event.dyn_ref::<MouseEvent>(), event_element(event))
        else {
            return;
        };
        let Some(handle) = target
            .get_attribute("data-dir")
            .and_then(|dir| ResizeHandle::from_dir(&dir))
        else {
            return;
        };
        event.prevent_default();
        event.stop_propagation();

        let Some(image) = self.active_image() else {
            return;
        };
        let started = self.session.borrow_mut().begin_drag(
            handle,
            mouse.client_x() as f64,
            image.offset_width() as f64,
        );
        if !started {
            return;
        }
        if let Err(e) = self.listen_drag() {
            tracing::warn!(target: "quire::resize", "drag listeners failed: {e}");
            self.session.borrow_mut().end_drag();
        }
    }

    fn listen_drag(&self) -> Result<(), BrowserError> {
        let document = dom::document()?;
        let this = self.this.clone();
        let on_move = EventListener::new(&document, "mousemove", move |event| {
            let (Some(resizer), Some(mouse)) = (this.upgrade(), event.dyn_ref::<MouseEvent>())
            else {
                return;
            };
            resizer.drag_to(mouse.client_x() as f64);
        });
        let this = self.this.clone();
        let on_up = EventListener::new(&document, "mouseup", move |_| {
            if let Some(resizer) = this.upgrade() {
                resizer.end_drag();
            }
        });
        *self.drag_listeners.borrow_mut() = vec![on_move, on_up];
        Ok(())
    }

    fn drag_to(&self, x: f64) {
        let width = self.session.borrow_mut().drag_to(x);
        let (Some(width), Some(image)) = (width, self.active_image()) else {
            return;
        };
        dom::set_style(&image, "width", &format!("{width}px"));
        dom::set_style(&image, "height", "auto");
        self.update_position();
    }

    fn end_drag(&self) {
        let image = self.session.borrow_mut().end_drag().cloned();
        let listeners = std::mem::take(&mut *self.drag_listeners.borrow_mut());
        drop(listeners);
        let Some(surface) = image.as_deref().and_then(surface_of) else {
            return;
        };
        if let Err(e) = dom::dispatch_input(&surface) {
            tracing::warn!(target: "quire::resize", "could not sync resize: {e}");
        }
    }

    /// Remove the frame and every listener.
    pub fn teardown(&self) {
        self.hide();
        self.listeners.borrow_mut().clear();
    }
}
