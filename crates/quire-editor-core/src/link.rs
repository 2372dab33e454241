//! Link insertion flow.
//!
//! `LinkFlow` tracks the dialog's form state; nothing touches the document
//! until `apply` hands back a `LinkRequest`, which `insert_link` then applies
//! at the restored selection.

use crate::document::{DocPosition, DocRange, Element, NodeId, RichDocument, Tag};

/// Values entered in the link dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkForm {
    pub url: String,
    pub new_tab: bool,
}

impl Default for LinkForm {
    fn default() -> Self {
        Self {
            url: String::new(),
            new_tab: true,
        }
    }
}

/// A confirmed link insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub href: String,
    pub new_tab: bool,
}

impl LinkRequest {
    /// The anchor element this request inserts.
    pub fn element(&self) -> Element {
        let el = Element::new(Tag::A).with_attr("href", self.href.as_str());
        if self.new_tab {
            el.with_attr("target", "_blank")
                .with_attr("rel", "noopener noreferrer")
        } else {
            el
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkFlow {
    #[default]
    Closed,
    Open(LinkForm),
}

impl LinkFlow {
    pub fn open(&mut self) {
        *self = LinkFlow::Open(LinkForm::default());
    }

    pub fn is_open(&self) -> bool {
        matches!(self, LinkFlow::Open(_))
    }

    pub fn form(&self) -> Option<&LinkForm> {
        match self {
            LinkFlow::Open(form) => Some(form),
            LinkFlow::Closed => None,
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        if let LinkFlow::Open(form) = self {
            form.url = url.into();
        }
    }

    pub fn set_new_tab(&mut self, new_tab: bool) {
        if let LinkFlow::Open(form) = self {
            form.new_tab = new_tab;
        }
    }

    /// Confirm the dialog. Always closes; an empty URL counts as cancel.
    pub fn apply(&mut self) -> Option<LinkRequest> {
        let LinkFlow::Open(form) = std::mem::take(self) else {
            return None;
        };
        let href = form.url.trim();
        if href.is_empty() {
            tracing::debug!("empty link URL, nothing inserted");
            return None;
        }
        Some(LinkRequest {
            href: href.to_string(),
            new_tab: form.new_tab,
        })
    }

    pub fn cancel(&mut self) {
        *self = LinkFlow::Closed;
    }
}

/// Turn the selection into a link, or insert one at the caret.
///
/// A caret gets a new link whose text is the URL. A range has its text runs
/// wrapped, replacing any link they were already in. Without a usable range
/// the link is appended at the end of the document. Returns the range to
/// select afterwards.
pub fn insert_link(
    doc: &mut RichDocument,
    range: Option<DocRange>,
    request: &LinkRequest,
) -> DocRange {
    let ordered = range.and_then(|r| r.ordered(doc));

    if let Some((start, end)) = ordered.filter(|(s, e)| s != e) {
        let segments = doc.text_segments(start, end);
        if !segments.is_empty() {
            let nodes: Vec<NodeId> = segments.iter().map(|s| doc.isolate_segment(s)).collect();
            for &node in &nodes {
                while let Some(anchor) = doc.find_ancestor(node, |el| el.tag == Tag::A) {
                    doc.split_out(node, anchor);
                    doc.unwrap(anchor);
                }
            }
            for &node in &nodes {
                if let Some(wrapper) = doc.wrap(node, request.element()) {
                    doc.merge_adjacent(wrapper);
                }
            }
            if let Some(range) = doc.range_over(&nodes) {
                return range;
            }
        }
    }

    let anchor = doc.create_element(request.element());
    let text = doc.create_text(request.href.as_str());
    doc.append_child(anchor, text);

    let at = match ordered {
        Some((_, end)) => {
            // Never nest a link in a link: land just after the enclosing one.
            match doc.find_ancestor_or_self(end.node, |el| el.tag == Tag::A) {
                Some(outer) => match (doc.parent(outer), doc.index_in_parent(outer)) {
                    (Some(parent), Some(index)) => DocPosition::new(parent, index + 1),
                    _ => doc.end_position(),
                },
                None => end,
            }
        }
        None => doc.end_position(),
    };
    let after = doc.insert_at(at, anchor);
    DocRange::collapsed(after)
}
