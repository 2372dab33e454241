//! quire-editor-core: Pure Rust authoring logic without DOM dependencies.
//!
//! This crate provides:
//! - `CodeField` - keystroke interception for plain-text code fields
//! - `RichDocument` - the element/text tree behind a rich field, with markup
//!   parsing and serialization
//! - `RichField` - a document kept in step with its backing value
//! - Formatting commands, selection persistence, the modal slot, the link and
//!   media flows, toolbar model and image-resize geometry

pub mod actions;
pub mod code_field;
pub mod config;
pub mod document;
pub mod error;
pub mod field;
pub mod format;
pub mod link;
pub mod media;
pub mod modal;
pub mod resize;
pub mod selection;
pub mod text;
pub mod text_helpers;
pub mod toolbar;
pub mod types;

pub use actions::{FormatCommand, Key, KeyCombo, KeydownResult, ListKind, Modifiers};
pub use code_field::{CodeField, DEFAULT_INDENT_WIDTH, closing_pair};
pub use config::EditorConfig;
pub use document::{
    Attr, DocPosition, DocRange, Element, NodeId, NodeKind, RichDocument, Tag, TextSegment,
    parse_markup,
};
pub use error::EditorError;
pub use field::RichField;
pub use format::{ActiveFormats, InlineFormat, active_formats, apply_format, is_format_active};
pub use link::{LinkFlow, LinkForm, LinkRequest, insert_link};
pub use media::{
    CatalogResponse, ImageInsert, MediaCatalog, MediaFlow, MediaItem, MediaPhase, MediaRequest,
    insert_image,
};
pub use modal::{ModalPhase, ModalSlot, ModalTicket};
pub use resize::{Rect, ResizeDrag, ResizeHandle, ResizeSession, ScrollOffset, overlay_rect};
pub use selection::{SelectionKeeper, SelectionSnapshot};
pub use smol_str::SmolStr;
pub use text::{EditorRope, TextBuffer};
pub use toolbar::{CommandAction, CustomFlow, ToolbarCommand, ToolbarItem, default_toolbar};
pub use types::Selection;
