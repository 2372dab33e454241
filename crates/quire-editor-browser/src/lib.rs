//! Browser DOM layer for quire fields.
//!
//! This crate wires `quire-editor-core` to the page. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `code_field`: keystroke interception on code textareas
//! - `dom_sync`: surface DOM ↔ `RichDocument` and selection mapping
//! - `rich_field`: contenteditable surfaces, toolbar wiring, backing sync
//! - `modal`: the shared overlay; `link_dialog`/`media_dialog` fill it
//! - `catalog`: HTTP media catalog
//! - `resize`: the image resize frame
//! - `session`: enhancing a page's fields and tearing them down
//!
//! # Re-exports
//!
//! This crate re-exports `quire-editor-core` for convenience, so consumers
//! only need to depend on `quire-editor-browser`.

// Re-export core crate
pub use quire_editor_core;
pub use quire_editor_core::*;

pub mod catalog;
pub mod code_field;
pub mod dom;
pub mod dom_sync;
pub mod error;
pub mod icons;
pub mod link_dialog;
pub mod media_dialog;
pub mod modal;
pub mod resize;
pub mod rich_field;
pub mod session;
pub mod toolbar;

pub use catalog::HttpCatalog;
pub use code_field::{CodeFieldBinding, handle_code_keydown, key_combo};
pub use dom_sync::{NodeMap, read_surface, render_surface};
pub use error::BrowserError;
pub use media_dialog::{MediaDialog, open_media_dialog};
pub use modal::{ModalContent, ModalOverlay};
pub use resize::ImageResizer;
pub use rich_field::{DialogHost, RichFieldBinding, RichSurface};
pub use session::EditorSession;
pub use toolbar::ToolbarView;
