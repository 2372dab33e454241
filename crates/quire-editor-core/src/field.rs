//! Rich field: the document tree kept in step with its backing value.
//!
//! The backing value is the only state that outlives the page; the tree and
//! the live surface are views of it. Every mutation made through a
//! `RichField` ends with a `sync`, and the browser layer calls `sync` after
//! reading user edits from the surface.

use crate::actions::FormatCommand;
use crate::document::{DocRange, RichDocument, parse_markup};
use crate::format::{ActiveFormats, active_formats, apply_format};
use crate::link::{LinkRequest, insert_link};
use crate::media::{ImageInsert, insert_image};
use crate::selection::SelectionKeeper;

#[derive(Debug, Clone)]
pub struct RichField {
    doc: RichDocument,
    backing: String,
    selection: Option<DocRange>,
    keeper: SelectionKeeper,
}

impl RichField {
    /// Mount a field over its initial backing value.
    pub fn mount(backing: impl Into<String>) -> Self {
        let backing = backing.into();
        Self {
            doc: parse_markup(&backing),
            backing,
            selection: None,
            keeper: SelectionKeeper::new(),
        }
    }

    pub fn document(&self) -> &RichDocument {
        &self.doc
    }

    /// Mutable access for the surface reader. Call `sync` afterwards.
    pub fn document_mut(&mut self) -> &mut RichDocument {
        &mut self.doc
    }

    pub fn backing_value(&self) -> &str {
        &self.backing
    }

    /// Write the serialized tree to the backing value. Returns whether it changed.
    pub fn sync(&mut self) -> bool {
        let markup = self.doc.to_markup();
        if markup == self.backing {
            return false;
        }
        tracing::trace!(len = markup.len(), "backing value synced");
        self.backing = markup;
        true
    }

    /// Replace the whole tree from markup and sync.
    pub fn load(&mut self, markup: &str) {
        self.doc.replace_with_markup(markup);
        self.selection = None;
        self.sync();
    }

    pub fn selection(&self) -> Option<DocRange> {
        self.selection
    }

    /// Record the surface's selection. A stale range is dropped.
    pub fn set_selection(&mut self, range: Option<DocRange>) {
        self.selection = range.filter(|r| self.doc.is_valid_range(r));
    }

    /// Apply a built-in command to the current selection and sync.
    ///
    /// Returns the new selection, or `None` when there was nothing to act on.
    pub fn run_format(&mut self, command: FormatCommand) -> Option<DocRange> {
        let range = self.selection?;
        let after = apply_format(&mut self.doc, &range, command)?;
        self.selection = Some(after);
        self.sync();
        Some(after)
    }

    pub fn active_formats(&self) -> ActiveFormats {
        self.selection
            .map(|range| active_formats(&self.doc, &range))
            .unwrap_or_default()
    }

    /// Remember the selection before a dialog takes focus.
    pub fn capture_selection(&mut self) {
        self.keeper.capture(self.selection);
    }

    pub fn discard_selection(&mut self) {
        self.keeper.discard();
    }

    fn restore_selection(&mut self) -> Option<DocRange> {
        let restored = self.keeper.restore(&self.doc);
        if restored.is_none() {
            tracing::debug!("no usable selection, inserting at end of surface");
        }
        restored
    }

    pub fn apply_link(&mut self, request: &LinkRequest) -> DocRange {
        let range = self.restore_selection();
        let after = insert_link(&mut self.doc, range, request);
        self.selection = Some(after);
        self.sync();
        after
    }

    pub fn apply_image(&mut self, image: &ImageInsert) -> DocRange {
        let range = self.restore_selection();
        let after = insert_image(&mut self.doc, range, image);
        self.selection = Some(after);
        self.sync();
        after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ListKind;
    use crate::document::DocPosition;
    use crate::format::InlineFormat;
    use crate::link::LinkFlow;

    fn select_all_text(field: &mut RichField) {
        let texts = field.document().text_nodes();
        let first = texts[0];
        let last = *texts.last().unwrap();
        let len = field.document().node_len(last);
        field.set_selection(Some(DocRange::new(
            DocPosition::new(first, 0),
            DocPosition::new(last, len),
        )));
    }

    #[test]
    fn test_bold_end_to_end() {
        let mut field = RichField::mount("<p>Hello</p>");
        select_all_text(&mut field);

        let after = field.run_format(FormatCommand::Bold).unwrap();
        assert_eq!(field.backing_value(), "<p><b>Hello</b></p>");
        assert!(field.active_formats().get(InlineFormat::Bold));

        // The selection still spans the word.
        let doc = field.document();
        assert_eq!(doc.text(after.anchor.node), Some("Hello"));
        assert_eq!((after.anchor.offset, after.focus.offset), (0, 5));
    }

    #[test]
    fn test_mount_keeps_existing_content() {
        let markup = r#"<p>See <a href="/a">this</a> <img src="/i.png" alt="i"></p>"#;
        let mut field = RichField::mount(markup);
        assert!(!field.sync());
        assert_eq!(field.backing_value(), markup);
    }

    #[test]
    fn test_format_without_selection() {
        let mut field = RichField::mount("<p>x</p>");
        assert_eq!(field.run_format(FormatCommand::Italic), None);
        assert_eq!(field.backing_value(), "<p>x</p>");
        assert_eq!(field.active_formats(), ActiveFormats::default());
    }

    #[test]
    fn test_list_round_trip() {
        let mut field = RichField::mount("<p>a</p><p>b</p>");
        select_all_text(&mut field);
        field.run_format(FormatCommand::List(ListKind::Unordered));
        assert_eq!(field.backing_value(), "<ul><li>a</li><li>b</li></ul>");
        field.run_format(FormatCommand::List(ListKind::Unordered));
        assert_eq!(field.backing_value(), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_link_flow_end_to_end() {
        let mut field = RichField::mount("<p>click here</p>");
        let t = field.document().text_nodes()[0];
        field.set_selection(Some(DocRange::new(DocPosition::new(t, 6), DocPosition::new(t, 10))));

        field.capture_selection();
        // Focus moves to the dialog; the surface loses its selection.
        field.set_selection(None);

        let mut flow = LinkFlow::default();
        flow.open();
        flow.set_url("https://example.com");
        let request = flow.apply().unwrap();
        field.apply_link(&request);
        insta::assert_snapshot!(
            field.backing_value(),
            @r#"<p>click <a href="https://example.com" target="_blank" rel="noopener noreferrer">here</a></p>"#
        );
    }

    #[test]
    fn test_image_falls_back_after_rebuild() {
        let mut field = RichField::mount("<p>text</p>");
        let t = field.document().text_nodes()[0];
        field.set_selection(Some(DocRange::collapsed(DocPosition::new(t, 2))));
        field.capture_selection();

        // The surface was re-read while the dialog was open.
        field.load("<p>text</p>");
        field.apply_image(&ImageInsert {
            url: "/a.png".into(),
            alt: "A".into(),
        });
        assert_eq!(field.backing_value(), r#"<p>text</p><img src="/a.png" alt="A">"#);
    }

    #[test]
    fn test_cancel_discards_snapshot() {
        let mut field = RichField::mount("<p>text</p>");
        let t = field.document().text_nodes()[0];
        field.set_selection(Some(DocRange::collapsed(DocPosition::new(t, 2))));
        field.capture_selection();
        field.discard_selection();
        field.apply_image(&ImageInsert {
            url: "/b.png".into(),
            alt: String::new(),
        });
        assert_eq!(field.backing_value(), r#"<p>text</p><img src="/b.png" alt="">"#);
    }
}
