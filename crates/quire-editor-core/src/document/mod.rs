//! Rich document tree backing a rich field.
//!
//! The tree mirrors the editable surface: element and text nodes under a
//! root that stands for the surface itself. Nodes live in a generational
//! arena, so a `NodeId` held past a mutation that removed its node can be
//! detected as stale instead of silently pointing at a new node.
//!
//! Positions follow DOM boundary-point rules: inside a text node the offset
//! counts chars, inside an element it counts children.

mod edit;
mod parse;
mod serialize;

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use smol_str::SmolStr;

pub use parse::parse_markup;

/// Handle to a node in a `RichDocument`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// The root node, standing for the editable surface.
    pub const ROOT: NodeId = NodeId {
        index: 0,
        generation: 0,
    };
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}v{}", self.index, self.generation)
    }
}

/// Element tag names the editor knows about. Anything else is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    P,
    Div,
    Br,
    B,
    Strong,
    I,
    Em,
    U,
    S,
    Strike,
    Ul,
    Ol,
    Li,
    A,
    Img,
    Span,
    Font,
    Sub,
    Sup,
    Code,
    Pre,
    Blockquote,
    Hr,
    Heading(u8),
    Other(SmolStr),
}

impl Tag {
    /// Tag from an element name, case-insensitively.
    pub fn from_name(name: &str) -> Tag {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "p" => Tag::P,
            "div" => Tag::Div,
            "br" => Tag::Br,
            "b" => Tag::B,
            "strong" => Tag::Strong,
            "i" => Tag::I,
            "em" => Tag::Em,
            "u" => Tag::U,
            "s" => Tag::S,
            "strike" => Tag::Strike,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "a" => Tag::A,
            "img" => Tag::Img,
            "span" => Tag::Span,
            "font" => Tag::Font,
            "sub" => Tag::Sub,
            "sup" => Tag::Sup,
            "code" => Tag::Code,
            "pre" => Tag::Pre,
            "blockquote" => Tag::Blockquote,
            "hr" => Tag::Hr,
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "h4" => Tag::Heading(4),
            "h5" => Tag::Heading(5),
            "h6" => Tag::Heading(6),
            _ => Tag::Other(SmolStr::new(lower)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tag::P => "p",
            Tag::Div => "div",
            Tag::Br => "br",
            Tag::B => "b",
            Tag::Strong => "strong",
            Tag::I => "i",
            Tag::Em => "em",
            Tag::U => "u",
            Tag::S => "s",
            Tag::Strike => "strike",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::A => "a",
            Tag::Img => "img",
            Tag::Span => "span",
            Tag::Font => "font",
            Tag::Sub => "sub",
            Tag::Sup => "sup",
            Tag::Code => "code",
            Tag::Pre => "pre",
            Tag::Blockquote => "blockquote",
            Tag::Hr => "hr",
            Tag::Heading(1) => "h1",
            Tag::Heading(2) => "h2",
            Tag::Heading(3) => "h3",
            Tag::Heading(4) => "h4",
            Tag::Heading(5) => "h5",
            Tag::Heading(_) => "h6",
            Tag::Other(name) => name.as_str(),
        }
    }

    /// Elements that never have children or a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br | Tag::Img | Tag::Hr)
            || matches!(self, Tag::Other(n) if matches!(n.as_str(), "input" | "wbr" | "source"))
    }

    /// Block containers that a list item can be made from.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Tag::P | Tag::Div | Tag::Heading(_) | Tag::Blockquote | Tag::Pre
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Tag::Ul | Tag::Ol)
    }
}

/// Element attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: SmolStr,
    pub value: String,
}

/// Element node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub attrs: Vec<Attr>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attr {
                name: SmolStr::new(name.to_ascii_lowercase()),
                value,
            }),
        }
    }
}

/// Node payload: an element or a run of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// A point in the document: a node and an offset into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocPosition {
    pub node: NodeId,
    pub offset: usize,
}

impl DocPosition {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A selection in the document. Anchor and focus may be in either order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocRange {
    pub anchor: DocPosition,
    pub focus: DocPosition,
}

impl DocRange {
    pub fn new(anchor: DocPosition, focus: DocPosition) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(pos: DocPosition) -> Self {
        Self {
            anchor: pos,
            focus: pos,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Start and end in document order, or `None` if either end is stale.
    pub fn ordered(&self, doc: &RichDocument) -> Option<(DocPosition, DocPosition)> {
        match doc.compare(self.anchor, self.focus)? {
            Ordering::Greater => Some((self.focus, self.anchor)),
            _ => Some((self.anchor, self.focus)),
        }
    }
}

/// The part of one text node covered by a range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSegment {
    pub node: NodeId,
    pub chars: Range<usize>,
}

/// Tree of element and text nodes under a root standing for the surface.
#[derive(Clone, Debug)]
pub struct RichDocument {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Default for RichDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RichDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                data: Some(NodeData {
                    kind: NodeKind::Element(Element::new(Tag::Div)),
                    parent: None,
                    children: Vec::new(),
                }),
            }],
            free: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    fn data(&self, id: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.data.as_ref()
    }

    fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.data.as_mut()
    }

    /// Whether `id` names a live node, attached or not.
    pub fn exists(&self, id: NodeId) -> bool {
        self.data(id).is_some()
    }

    /// Whether `id` is live and attached under the root.
    pub fn contains(&self, id: NodeId) -> bool {
        let mut current = id;
        // The walk is bounded by the arena size in case of a corrupted cycle.
        for _ in 0..=self.slots.len() {
            if current == NodeId::ROOT {
                return true;
            }
            match self.data(current).and_then(|d| d.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.data(id).map(|d| &d.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id)? {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&Tag> {
        self.element(id).map(|el| &el.tag)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Offset range of a node: chars for text, children for elements.
    pub fn node_len(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(t)) => t.chars().count(),
            Some(NodeKind::Element(_)) => self.children(id).len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children(NodeId::ROOT).is_empty()
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.data = Some(data);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    data: Some(data),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.create(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(text.into()))
    }

    /// Replace the contents of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(data) = self.data_mut(id) {
            if let NodeKind::Text(t) = &mut data.kind {
                *t = text.into();
            }
        }
    }

    /// Insert `child` under `parent` at `index` (clamped), detaching it first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if !self.exists(parent) || !self.exists(child) || parent == child {
            return;
        }
        self.detach(child);
        if let Some(p) = self.data_mut(parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, child);
        }
        if let Some(c) = self.data_mut(child) {
            c.parent = Some(parent);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Unlink a node from its parent, keeping it alive.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.data_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(d) = self.data_mut(id) {
            d.parent = None;
        }
    }

    /// Remove a node and its subtree. Ids into the subtree become stale.
    pub fn remove(&mut self, id: NodeId) {
        if id == NodeId::ROOT {
            return;
        }
        self.detach(id);
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(data) = self.data(current) else {
                continue;
            };
            pending.extend(data.children.iter().copied());
            let slot = &mut self.slots[current.index as usize];
            slot.data = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
        }
    }

    /// Remove every node under the root.
    pub fn clear(&mut self) {
        for child in self.children(NodeId::ROOT).to_vec() {
            self.remove(child);
        }
    }

    /// Position just past the last child of the root.
    pub fn end_position(&self) -> DocPosition {
        DocPosition::new(NodeId::ROOT, self.children(NodeId::ROOT).len())
    }

    /// Whether a position refers to an attached node and an in-range offset.
    pub fn is_valid_position(&self, pos: DocPosition) -> bool {
        self.contains(pos.node) && pos.offset <= self.node_len(pos.node)
    }

    /// Whether both ends of a range are valid positions.
    pub fn is_valid_range(&self, range: &DocRange) -> bool {
        self.is_valid_position(range.anchor) && self.is_valid_position(range.focus)
    }

    /// Child-index path from the root to `pos.node`, followed by the offset.
    fn position_key(&self, pos: DocPosition) -> Option<Vec<usize>> {
        if !self.is_valid_position(pos) {
            return None;
        }
        let mut path = vec![pos.offset];
        let mut current = pos.node;
        while current != NodeId::ROOT {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    /// Order two positions in the document; `None` if either is stale.
    pub fn compare(&self, a: DocPosition, b: DocPosition) -> Option<Ordering> {
        if a.node == b.node {
            return (self.is_valid_position(a) && self.is_valid_position(b))
                .then(|| a.offset.cmp(&b.offset));
        }
        Some(self.position_key(a)?.cmp(&self.position_key(b)?))
    }

    /// Depth-first walk of every attached node below the root, in document order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(NodeId::ROOT).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Text nodes in document order.
    pub fn text_nodes(&self) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|&id| self.is_text(id))
            .collect()
    }

    /// Concatenated text of the document.
    pub fn text_content(&self) -> String {
        self.text_nodes()
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// Nearest ancestor of `id` (excluding `id` and the root) matching `pred`.
    pub fn find_ancestor(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut current = self.parent(id)?;
        while current != NodeId::ROOT {
            if self.element(current).is_some_and(&pred) {
                return Some(current);
            }
            current = self.parent(current)?;
        }
        None
    }

    /// Like `find_ancestor`, but `id` itself is also a candidate.
    pub fn find_ancestor_or_self(
        &self,
        id: NodeId,
        pred: impl Fn(&Element) -> bool,
    ) -> Option<NodeId> {
        if id != NodeId::ROOT && self.element(id).is_some_and(&pred) {
            return Some(id);
        }
        self.find_ancestor(id, pred)
    }

    /// The child of the root that contains `id`.
    pub fn top_level_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let parent = self.parent(current)?;
            if parent == NodeId::ROOT {
                return Some(current);
            }
            current = parent;
        }
    }

    /// The parts of text nodes covered by the range `[start, end)`.
    ///
    /// Empty text nodes and empty intersections are skipped.
    pub fn text_segments(&self, start: DocPosition, end: DocPosition) -> Vec<TextSegment> {
        let mut out = Vec::new();
        for node in self.text_nodes() {
            let len = self.node_len(node);
            if len == 0 {
                continue;
            }
            let node_start = DocPosition::new(node, 0);
            let node_end = DocPosition::new(node, len);

            let from = if start.node == node {
                start.offset.min(len)
            } else if self.compare(node_start, start) != Some(Ordering::Less) {
                0
            } else {
                len
            };
            let to = if end.node == node {
                end.offset.min(len)
            } else if self.compare(node_end, end) != Some(Ordering::Greater) {
                len
            } else {
                0
            };

            if from < to {
                out.push(TextSegment {
                    node,
                    chars: from..to,
                });
            }
        }
        out
    }
}
