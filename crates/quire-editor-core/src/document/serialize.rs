//! Markup serialization of a `RichDocument`.

use markdown_weaver_escape::{FmtWriter, StrWrite, escape_html, escape_html_body_text};

use super::{NodeId, NodeKind, RichDocument};

impl RichDocument {
    /// Serialize the contents of the root as markup.
    ///
    /// The root itself is not written: it stands for the editable surface.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_children(&mut FmtWriter(&mut out), NodeId::ROOT);
        out
    }

    /// Serialize one node and its subtree.
    pub fn node_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        let _ = self.write_node(&mut FmtWriter(&mut out), id);
        out
    }

    fn write_children<W: StrWrite>(&self, w: &mut W, id: NodeId) -> Result<(), W::Error> {
        for &child in self.children(id) {
            self.write_node(w, child)?;
        }
        Ok(())
    }

    fn write_node<W: StrWrite>(&self, w: &mut W, id: NodeId) -> Result<(), W::Error> {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => write_text(w, text),
            Some(NodeKind::Element(el)) => {
                w.write_str("<")?;
                w.write_str(el.tag.name())?;
                for attr in &el.attrs {
                    w.write_str(" ")?;
                    w.write_str(&attr.name)?;
                    w.write_str("=\"")?;
                    escape_html(&mut *w, &attr.value)?;
                    w.write_str("\"")?;
                }
                w.write_str(">")?;
                if el.tag.is_void() {
                    return Ok(());
                }
                self.write_children(w, id)?;
                w.write_str("</")?;
                w.write_str(el.tag.name())?;
                w.write_str(">")
            }
            None => Ok(()),
        }
    }
}

/// Escaped text, with non-breaking spaces written as `&nbsp;` the way
/// browsers serialize them.
fn write_text<W: StrWrite>(w: &mut W, text: &str) -> Result<(), W::Error> {
    let mut pieces = text.split('\u{a0}');
    if let Some(first) = pieces.next() {
        escape_html_body_text(&mut *w, first)?;
    }
    for piece in pieces {
        w.write_str("&nbsp;")?;
        escape_html_body_text(&mut *w, piece)?;
    }
    Ok(())
}
