//! WASM browser tests for quire-editor-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use quire_editor_browser::dom::{self, TRANSIENT_ATTR};
use quire_editor_browser::{
    CatalogResponse, CodeFieldBinding, EditorError, FormatCommand, HttpCatalog, ImageResizer,
    MediaCatalog, MediaItem, ModalContent, ModalOverlay, RichFieldBinding, RichSurface,
    open_media_dialog,
};
use quire_editor_browser::{
    DialogHost, EditorConfig, EditorSession, ImageInsert, MediaPhase, ModalPhase,
};
use web_sys::{
    EventTarget, HtmlElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent,
    KeyboardEventInit, MouseEvent, MouseEventInit,
};

fn textarea(class: &str, value: &str) -> HtmlTextAreaElement {
    let document = dom::document().unwrap();
    let textarea: HtmlTextAreaElement = document
        .create_element("textarea")
        .unwrap()
        .dyn_into()
        .unwrap();
    textarea.set_class_name(class);
    textarea.set_value(value);
    document.body().unwrap().append_child(&textarea).unwrap();
    textarea
}

fn keydown(target: &EventTarget, key: &str) -> KeyboardEvent {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    init.set_cancelable(true);
    init.set_bubbles(true);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    target.dispatch_event(&event).unwrap();
    event
}

fn mouse(target: &EventTarget, kind: &str, client_x: i32) {
    let init = MouseEventInit::new();
    init.set_client_x(client_x);
    init.set_cancelable(true);
    init.set_bubbles(true);
    let event = MouseEvent::new_with_mouse_event_init_dict(kind, &init).unwrap();
    target.dispatch_event(&event).unwrap();
}

fn host() -> DialogHost {
    DialogHost {
        overlay: ModalOverlay::new(0),
        catalog: HttpCatalog::new("/admin/api/media"),
        upload_url: "/admin/media".into(),
    }
}

fn select_range(node: &web_sys::Node, start: u32, end: u32) {
    let selection = dom::window().unwrap().get_selection().unwrap().unwrap();
    selection.set_base_and_extent(node, start, node, end).unwrap();
}

fn select_contents(node: &web_sys::Node) {
    let len = node.node_value().map(|v| v.encode_utf16().count()).unwrap_or(0) as u32;
    select_range(node, 0, len);
}

fn by_id<T: JsCast>(id: &str) -> T {
    dom::document()
        .unwrap()
        .get_element_by_id(id)
        .unwrap()
        .dyn_into()
        .unwrap()
}

/// Select `"here"` in a field holding `<p>click here</p>` and press the
/// link button.
fn open_link_on_word(surface: &RichSurface) {
    let text = surface.content().first_child().unwrap().first_child().unwrap();
    select_range(&text, 6, 10);
    surface.refresh_toolbar();
    surface.toolbar().button("customLink").unwrap().click();
}

async fn next_tick() {
    let promise = js_sys::Promise::resolve(&wasm_bindgen::JsValue::NULL);
    wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
}

// === Code fields ===

#[wasm_bindgen_test]
fn test_tab_inserts_indent() {
    let ta = textarea("code-editor", "ab");
    let _binding = CodeFieldBinding::attach(ta.clone(), 4);
    ta.set_selection_range(1, 1).unwrap();

    let event = keydown(&ta, "Tab");
    assert!(event.default_prevented());
    assert_eq!(ta.value(), "a    b");
    assert_eq!(ta.selection_start().unwrap(), Some(5));
    ta.remove();
}

#[wasm_bindgen_test]
fn test_quote_wraps_selection() {
    let ta = textarea("code-editor", "let x = y;");
    let _binding = CodeFieldBinding::attach(ta.clone(), 4);
    ta.set_selection_range(8, 9).unwrap();

    keydown(&ta, "(");
    assert_eq!(ta.value(), "let x = (y);");
    assert_eq!(ta.selection_start().unwrap(), Some(8));
    assert_eq!(ta.selection_end().unwrap(), Some(11));
    ta.remove();
}

#[wasm_bindgen_test]
fn test_plain_key_passes_through() {
    let ta = textarea("code-editor", "abc");
    let _binding = CodeFieldBinding::attach(ta.clone(), 4);
    let event = keydown(&ta, "x");
    assert!(!event.default_prevented());
    assert_eq!(ta.value(), "abc");
    ta.remove();
}

// === Rich fields ===

#[wasm_bindgen_test]
fn test_mount_hides_textarea_and_renders() {
    let ta = textarea("rich-text-editor", "<p>Hello</p>");
    let binding = RichFieldBinding::attach(ta.clone(), host()).unwrap();
    let surface = binding.surface();

    assert_eq!(ta.style().get_property_value("display").unwrap(), "none");
    assert_eq!(surface.content().inner_html(), "<p>Hello</p>");
    assert!(surface.container().previous_sibling().unwrap().is_same_node(Some(&ta)));
    assert_eq!(
        surface.toolbar().root().query_selector_all(".rte-btn").unwrap().length(),
        8
    );

    drop(binding);
    assert_eq!(ta.style().get_property_value("display").unwrap(), "");
    ta.remove();
}

#[wasm_bindgen_test]
fn test_input_syncs_backing_value() {
    let ta = textarea("rich-text-editor", "<p>Hello</p>");
    let binding = RichFieldBinding::attach(ta.clone(), host()).unwrap();
    let content = binding.surface().content().clone();

    content.set_inner_html("<p>Hi <b>there</b></p>");
    dom::dispatch_input(&content).unwrap();
    assert_eq!(ta.value(), "<p>Hi <b>there</b></p>");
    drop(binding);
    ta.remove();
}

#[wasm_bindgen_test]
fn test_bold_command() {
    let ta = textarea("rich-text-editor", "<p>Hello</p>");
    let binding = RichFieldBinding::attach(ta.clone(), host()).unwrap();
    let surface: &Rc<RichSurface> = binding.surface();

    let text = surface.content().first_child().unwrap().first_child().unwrap();
    select_contents(&text);
    surface.run_command(FormatCommand::Bold).unwrap();

    assert_eq!(ta.value(), "<p><b>Hello</b></p>");
    assert_eq!(surface.content().inner_html(), "<p><b>Hello</b></p>");
    drop(binding);
    ta.remove();
}

#[wasm_bindgen_test]
fn test_resize_frame_is_not_content() {
    let ta = textarea("rich-text-editor", r#"<p><img src="/a.png" alt="a"></p>"#);
    let binding = RichFieldBinding::attach(ta.clone(), host()).unwrap();
    let surface = binding.surface();
    let resizer = ImageResizer::install(30.0).unwrap();

    let img: HtmlElement = surface
        .content()
        .query_selector("img")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    resizer.attach(img, surface.content()).unwrap();
    assert!(resizer.frame().has_attribute(TRANSIENT_ATTR));
    assert!(resizer.frame().parent_node().is_some());

    dom::dispatch_input(surface.content()).unwrap();
    assert_eq!(ta.value(), r#"<p><img src="/a.png" alt="a"></p>"#);

    resizer.teardown();
    assert!(resizer.active_image().is_none());
    drop(binding);
    ta.remove();
}

#[wasm_bindgen_test]
fn test_resize_drag_updates_backing_value() {
    let ta = textarea(
        "rich-text-editor",
        r#"<p><img src="/a.png" alt="a" style="width: 100px; height: 50px; display: inline-block;"></p>"#,
    );
    let binding = RichFieldBinding::attach(ta.clone(), host()).unwrap();
    let surface = binding.surface();
    let resizer = ImageResizer::install(30.0).unwrap();

    let img: HtmlElement = surface
        .content()
        .query_selector("img")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    mouse(&img, "mousedown", 0);
    assert_eq!(resizer.active_image().as_ref(), Some(&img));

    let start = img.offset_width();
    let handle = resizer.frame().query_selector("[data-dir=se]").unwrap().unwrap();
    let document = dom::document().unwrap();
    mouse(&handle, "mousedown", 200);
    mouse(&document, "mousemove", 240);
    let grown = format!("{}px", start + 40);
    assert_eq!(img.style().get_property_value("width").unwrap(), grown);
    assert_eq!(img.style().get_property_value("height").unwrap(), "auto");

    // Below the 30px floor the image keeps its last width.
    mouse(&document, "mousemove", 210 - start);
    assert_eq!(img.style().get_property_value("width").unwrap(), grown);

    mouse(&document, "mouseup", 210 - start);
    let value = ta.value();
    assert!(value.contains(&format!("width: {grown}")), "{value}");
    assert!(!value.contains("rte-resizer"), "{value}");
    assert!(resizer.frame().parent_node().is_some());

    // The move listener went away with the drag.
    mouse(&document, "mousemove", 400);
    assert_eq!(img.style().get_property_value("width").unwrap(), grown);

    resizer.teardown();
    drop(binding);
    ta.remove();
}

#[wasm_bindgen_test]
fn test_press_outside_hides_resizer() {
    let ta = textarea("rich-text-editor", r#"<p><img src="/a.png" alt="a"></p>"#);
    let binding = RichFieldBinding::attach(ta.clone(), host()).unwrap();
    let resizer = ImageResizer::install(30.0).unwrap();
    let img = binding.surface().content().query_selector("img").unwrap().unwrap();

    mouse(&img, "mousedown", 0);
    assert!(resizer.active_image().is_some());
    mouse(&dom::document().unwrap().body().unwrap(), "mousedown", 0);
    assert!(resizer.active_image().is_none());
    assert!(resizer.frame().parent_node().is_none());

    resizer.teardown();
    drop(binding);
    ta.remove();
}

// === Overlay and dialogs ===

#[wasm_bindgen_test]
fn test_open_replaces_content() {
    let overlay = ModalOverlay::new(0);
    let document = dom::document().unwrap();

    let first = dom::create_html(&document, "div", "first").unwrap();
    let second = dom::create_html(&document, "div", "second").unwrap();
    let a = overlay.open(ModalContent::new(first)).unwrap();
    let b = overlay.open(ModalContent::new(second)).unwrap();

    let backdrop = overlay.backdrop().unwrap();
    assert_eq!(backdrop.child_element_count(), 1);
    assert!(backdrop.query_selector(".second").unwrap().is_some());
    assert!(!overlay.is_current(a));
    assert!(overlay.is_current(b));
    assert_eq!(
        document.query_selector_all(".rte-modal-overlay").unwrap().length(),
        1
    );

    overlay.teardown();
    assert!(overlay.backdrop().is_none());
}

#[wasm_bindgen_test]
fn test_backdrop_and_escape_dismiss() {
    let overlay = ModalOverlay::new(0);
    let document = dom::document().unwrap();

    let dialog = dom::create_html(&document, "div", "rte-modal").unwrap();
    overlay.open(ModalContent::new(dialog.clone())).unwrap();
    dialog.click();
    assert!(overlay.is_open(), "a click inside the dialog must not dismiss it");

    overlay.backdrop().unwrap().click();
    assert!(!overlay.is_open());
    assert_eq!(overlay.phase(), ModalPhase::Closing);

    let dialog = dom::create_html(&document, "div", "rte-modal").unwrap();
    overlay.open(ModalContent::new(dialog)).unwrap();
    keydown(&document, "Enter");
    assert!(overlay.is_open());
    keydown(&document, "Escape");
    assert!(!overlay.is_open());

    overlay.teardown();
}

#[wasm_bindgen_test]
fn test_link_dialog_wraps_captured_selection() {
    let ta = textarea("rich-text-editor", "<p>click here</p>");
    let host = host();
    let binding = RichFieldBinding::attach(ta.clone(), host.clone()).unwrap();
    let surface = binding.surface();

    open_link_on_word(surface);
    let active = dom::document().unwrap().active_element().unwrap();
    let content: &web_sys::Element = surface.content();
    assert_eq!(&active, content);
    assert!(host.overlay.is_open());

    let url: HtmlInputElement = by_id("rte-link-url");
    url.set_value("  https://example.com ");
    dom::dispatch_input(&url).unwrap();
    by_id::<HtmlElement>("rte-link-apply").click();

    assert_eq!(
        ta.value(),
        r#"<p>click <a href="https://example.com" target="_blank" rel="noopener noreferrer">here</a></p>"#
    );
    assert!(!host.overlay.is_open());

    host.overlay.teardown();
    drop(binding);
    ta.remove();
}

#[wasm_bindgen_test]
fn test_link_dialog_cancel_discards_selection() {
    let ta = textarea("rich-text-editor", "<p>click here</p>");
    let host = host();
    let binding = RichFieldBinding::attach(ta.clone(), host.clone()).unwrap();
    let surface = binding.surface();

    open_link_on_word(surface);
    let url: HtmlInputElement = by_id("rte-link-url");
    url.set_value("https://example.com");
    dom::dispatch_input(&url).unwrap();
    by_id::<HtmlElement>("rte-link-cancel").click();

    assert!(!host.overlay.is_open());
    assert_eq!(ta.value(), "<p>click here</p>");

    // With the snapshot gone an insertion lands at the end, not on "here".
    surface
        .apply_image(&ImageInsert {
            url: "/b.png".into(),
            alt: String::new(),
        })
        .unwrap();
    assert_eq!(ta.value(), r#"<p>click here</p><img src="/b.png" alt="">"#);

    host.overlay.teardown();
    drop(binding);
    ta.remove();
}

#[derive(Clone)]
struct FixedCatalog(Vec<MediaItem>);

impl MediaCatalog for FixedCatalog {
    async fn fetch(&self, _query: Option<&str>) -> Result<CatalogResponse, EditorError> {
        Ok(CatalogResponse {
            items: self.0.clone(),
        })
    }
}

fn media(id: i64, mime: &str) -> MediaItem {
    MediaItem {
        id,
        title: format!("Item {id}"),
        url: format!("/uploads/{id}.png"),
        thumb: format!("/uploads/thumbs/{id}.png"),
        mime_type: mime.into(),
    }
}

#[wasm_bindgen_test]
async fn test_media_dialog_inserts_selected_image() {
    let ta = textarea("rich-text-editor", "<p>text</p>");
    let host = host();
    let binding = RichFieldBinding::attach(ta.clone(), host.clone()).unwrap();
    let surface = binding.surface();

    let catalog = FixedCatalog(vec![
        media(1, "image/png"),
        media(2, "application/pdf"),
        media(3, "image/jpeg"),
        media(4, "image/gif"),
    ]);
    let dialog = open_media_dialog(&host.overlay, surface, catalog, "/admin/media").unwrap();
    next_tick().await;
    next_tick().await;

    let tiles = dialog.body().query_selector_all(".rte-media-item").unwrap();
    assert_eq!(tiles.length(), 3);
    assert_eq!(dialog.body().query_selector_all("img").unwrap().length(), 3);
    assert!(dialog.apply_button().disabled());

    let second: HtmlElement = tiles.item(1).unwrap().dyn_into().unwrap();
    second.click();
    assert!(second.class_list().contains("selected"));
    assert!(!dialog.apply_button().disabled());

    dialog.apply_button().click();
    assert_eq!(ta.value(), r#"<p>text</p><img src="/uploads/3.png" alt="Item 3">"#);
    assert!(!host.overlay.is_open());

    host.overlay.teardown();
    drop(binding);
    ta.remove();
}

#[wasm_bindgen_test]
async fn test_media_response_after_close_is_ignored() {
    let ta = textarea("rich-text-editor", "<p>text</p>");
    let host = host();
    let binding = RichFieldBinding::attach(ta.clone(), host.clone()).unwrap();

    let catalog = FixedCatalog(vec![media(1, "image/png")]);
    let dialog =
        open_media_dialog(&host.overlay, binding.surface(), catalog, "/admin/media").unwrap();
    host.overlay.close();
    next_tick().await;
    next_tick().await;

    assert_eq!(dialog.flow().phase(), &MediaPhase::Closed);
    assert!(dialog.body().query_selector(".rte-media-loader").unwrap().is_some());
    assert!(dialog.body().query_selector(".rte-media-item").unwrap().is_none());

    host.overlay.teardown();
    drop(binding);
    ta.remove();
}

#[wasm_bindgen_test]
async fn test_media_response_after_replace_is_ignored() {
    let ta = textarea("rich-text-editor", "<p>text</p>");
    let host = host();
    let binding = RichFieldBinding::attach(ta.clone(), host.clone()).unwrap();

    let catalog = FixedCatalog(vec![media(1, "image/png")]);
    let dialog =
        open_media_dialog(&host.overlay, binding.surface(), catalog, "/admin/media").unwrap();
    let document = dom::document().unwrap();
    let other = dom::create_html(&document, "div", "other").unwrap();
    host.overlay.open(ModalContent::new(other)).unwrap();
    next_tick().await;
    next_tick().await;

    assert_eq!(dialog.flow().phase(), &MediaPhase::Loading);
    assert!(dialog.body().query_selector(".rte-media-item").unwrap().is_none());
    assert!(!dialog.body().is_connected());

    host.overlay.teardown();
    drop(binding);
    ta.remove();
}

// === Session ===

#[wasm_bindgen_test]
fn test_session_enhances_once() {
    let code = textarea("code-editor", "");
    let rich = textarea("rich-text-editor", "<p>x</p>");

    let session = EditorSession::enhance(EditorConfig::default()).unwrap();
    assert_eq!(session.code_fields().len(), 1);
    assert_eq!(session.rich_fields().len(), 1);
    assert!(session.resizer().is_some());

    let again = EditorSession::enhance(EditorConfig::default()).unwrap();
    assert!(again.code_fields().is_empty());
    assert!(again.rich_fields().is_empty());
    drop(again);

    drop(session);
    assert!(dom::document().unwrap().query_selector(".rte-container").unwrap().is_none());
    code.remove();
    rich.remove();
}
