//! Built-in formatting commands over a `DocRange`.
//!
//! Each `FormatCommand` is a direct mutation of the rich document. Inline
//! toggles split and unwrap or wrap the covered text runs; list commands
//! restructure the top-level blocks the range touches.

use crate::actions::{FormatCommand, ListKind};
use crate::document::{DocPosition, DocRange, Element, NodeId, RichDocument, Tag};

/// Inline formats that toggle on and off and report an active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
}

impl InlineFormat {
    pub fn from_command(command: FormatCommand) -> Option<Self> {
        match command {
            FormatCommand::Bold => Some(InlineFormat::Bold),
            FormatCommand::Italic => Some(InlineFormat::Italic),
            FormatCommand::Underline => Some(InlineFormat::Underline),
            FormatCommand::List(_) | FormatCommand::ClearFormat => None,
        }
    }

    /// Element applied when the format is switched on.
    pub fn wrapper(self) -> Tag {
        match self {
            InlineFormat::Bold => Tag::B,
            InlineFormat::Italic => Tag::I,
            InlineFormat::Underline => Tag::U,
        }
    }

    /// Whether an element with `tag` carries this format.
    pub fn matches(self, tag: &Tag) -> bool {
        match self {
            InlineFormat::Bold => matches!(tag, Tag::B | Tag::Strong),
            InlineFormat::Italic => matches!(tag, Tag::I | Tag::Em),
            InlineFormat::Underline => matches!(tag, Tag::U),
        }
    }
}

/// On/off state of the inline formats at the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveFormats {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl ActiveFormats {
    pub fn get(&self, format: InlineFormat) -> bool {
        match format {
            InlineFormat::Bold => self.bold,
            InlineFormat::Italic => self.italic,
            InlineFormat::Underline => self.underline,
        }
    }
}

fn is_clearable(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::B
            | Tag::Strong
            | Tag::I
            | Tag::Em
            | Tag::U
            | Tag::S
            | Tag::Strike
            | Tag::Font
            | Tag::Span
            | Tag::Sub
            | Tag::Sup
    )
}

/// Apply a formatting command to `range`.
///
/// Returns the range to select afterwards, or `None` if `range` no longer
/// refers to the document.
pub fn apply_format(
    doc: &mut RichDocument,
    range: &DocRange,
    command: FormatCommand,
) -> Option<DocRange> {
    let (start, end) = range.ordered(doc)?;
    tracing::trace!(?command, collapsed = start == end, "apply format");
    match command {
        FormatCommand::Bold => Some(toggle_inline(doc, range, start, end, InlineFormat::Bold)),
        FormatCommand::Italic => {
            Some(toggle_inline(doc, range, start, end, InlineFormat::Italic))
        }
        FormatCommand::Underline => {
            Some(toggle_inline(doc, range, start, end, InlineFormat::Underline))
        }
        FormatCommand::List(kind) => Some(toggle_list(doc, range, start, end, kind)),
        FormatCommand::ClearFormat => Some(clear_format(doc, range, start, end)),
    }
}

fn has_format(doc: &RichDocument, node: NodeId, format: InlineFormat) -> bool {
    doc.find_ancestor(node, |el| format.matches(&el.tag)).is_some()
}

/// Whether `format` is on at `range`.
///
/// A caret reports the format of its surroundings; a selection reports it
/// only when every covered text run carries it.
pub fn is_format_active(doc: &RichDocument, range: &DocRange, format: InlineFormat) -> bool {
    let Some((start, end)) = range.ordered(doc) else {
        return false;
    };
    if start == end {
        return doc
            .find_ancestor_or_self(start.node, |el| format.matches(&el.tag))
            .is_some();
    }
    let segments = doc.text_segments(start, end);
    !segments.is_empty() && segments.iter().all(|s| has_format(doc, s.node, format))
}

pub fn active_formats(doc: &RichDocument, range: &DocRange) -> ActiveFormats {
    ActiveFormats {
        bold: is_format_active(doc, range, InlineFormat::Bold),
        italic: is_format_active(doc, range, InlineFormat::Italic),
        underline: is_format_active(doc, range, InlineFormat::Underline),
    }
}

fn toggle_inline(
    doc: &mut RichDocument,
    range: &DocRange,
    start: DocPosition,
    end: DocPosition,
    format: InlineFormat,
) -> DocRange {
    if start == end {
        return *range;
    }
    let segments = doc.text_segments(start, end);
    if segments.is_empty() {
        return *range;
    }

    let active = segments.iter().all(|s| has_format(doc, s.node, format));
    let nodes: Vec<NodeId> = segments.iter().map(|s| doc.isolate_segment(s)).collect();

    if active {
        for &node in &nodes {
            strip_ancestors(doc, node, |tag| format.matches(tag));
        }
    } else {
        for &node in &nodes {
            if has_format(doc, node, format) {
                continue;
            }
            if let Some(wrapper) = doc.wrap(node, Element::new(format.wrapper())) {
                doc.merge_adjacent(wrapper);
            }
        }
    }
    doc.range_over(&nodes).unwrap_or(*range)
}

/// Split out and unwrap every ancestor of `node` matching `pred`.
fn strip_ancestors(doc: &mut RichDocument, node: NodeId, pred: impl Fn(&Tag) -> bool) {
    while let Some(ancestor) = doc.find_ancestor(node, |el| pred(&el.tag)) {
        doc.split_out(node, ancestor);
        doc.unwrap(ancestor);
    }
}

fn clear_format(
    doc: &mut RichDocument,
    range: &DocRange,
    start: DocPosition,
    end: DocPosition,
) -> DocRange {
    if start == end {
        return *range;
    }
    let segments = doc.text_segments(start, end);
    let nodes: Vec<NodeId> = segments.iter().map(|s| doc.isolate_segment(s)).collect();
    for &node in &nodes {
        strip_ancestors(doc, node, is_clearable);
    }
    doc.range_over(&nodes).unwrap_or(*range)
}

/// Top-level blocks intersecting `[start, end]`.
fn touched_blocks(doc: &RichDocument, start: DocPosition, end: DocPosition) -> Vec<NodeId> {
    use std::cmp::Ordering::{Greater, Less};

    let top = doc.children(NodeId::ROOT).to_vec();
    top.into_iter()
        .enumerate()
        .filter(|&(i, _)| {
            let before = DocPosition::new(NodeId::ROOT, i);
            let after = DocPosition::new(NodeId::ROOT, i + 1);
            doc.compare(start, after) == Some(Less) && doc.compare(end, before) == Some(Greater)
        })
        .map(|(_, id)| id)
        .collect()
}

fn toggle_list(
    doc: &mut RichDocument,
    range: &DocRange,
    start: DocPosition,
    end: DocPosition,
    kind: ListKind,
) -> DocRange {
    let list_tag = match kind {
        ListKind::Ordered => Tag::Ol,
        ListKind::Unordered => Tag::Ul,
    };
    let blocks = touched_blocks(doc, start, end);

    if blocks.is_empty() {
        // Nothing to convert: start an empty list at the caret.
        let index = if start.node == NodeId::ROOT {
            start.offset
        } else {
            doc.children(NodeId::ROOT).len()
        };
        let list = doc.create_element(Element::new(list_tag));
        let item = doc.create_element(Element::new(Tag::Li));
        let br = doc.create_element(Element::new(Tag::Br));
        doc.append_child(item, br);
        doc.append_child(list, item);
        doc.insert_child(NodeId::ROOT, index, list);
        return DocRange::collapsed(DocPosition::new(item, 0));
    }

    if blocks.iter().all(|&b| doc.tag(b) == Some(&list_tag)) {
        for block in blocks {
            for item in doc.children(block).to_vec() {
                if doc.tag(item) == Some(&Tag::Li) {
                    doc.set_tag(item, Tag::P);
                }
            }
            doc.unwrap(block);
        }
        return *range;
    }

    let Some(at) = doc.index_in_parent(blocks[0]) else {
        return *range;
    };
    let list = doc.create_element(Element::new(list_tag));
    doc.insert_child(NodeId::ROOT, at, list);

    let mut open_item: Option<NodeId> = None;
    for block in blocks {
        match doc.tag(block).cloned() {
            Some(Tag::Ul | Tag::Ol) => {
                for child in doc.children(block).to_vec() {
                    if doc.tag(child) == Some(&Tag::Li) {
                        doc.append_child(list, child);
                    } else {
                        let item = doc.create_element(Element::new(Tag::Li));
                        doc.append_child(list, item);
                        doc.append_child(item, child);
                    }
                }
                doc.remove(block);
                open_item = None;
            }
            Some(tag) if tag.is_block() => {
                doc.set_tag(block, Tag::Li);
                doc.append_child(list, block);
                open_item = None;
            }
            _ => {
                // Loose inline content: consecutive runs share one item.
                let item = match open_item {
                    Some(item) => item,
                    None => {
                        let item = doc.create_element(Element::new(Tag::Li));
                        doc.append_child(list, item);
                        open_item = Some(item);
                        item
                    }
                };
                doc.append_child(item, block);
            }
        }
    }

    if doc.is_valid_range(range) {
        *range
    } else {
        DocRange::collapsed(DocPosition::new(list, 0))
    }
}
