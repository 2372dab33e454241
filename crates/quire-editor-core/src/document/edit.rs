//! Structural edits used by formatting and insertion.

use super::{DocPosition, DocRange, Element, NodeId, NodeKind, RichDocument, Tag, TextSegment};
use crate::text_helpers::{char_len, char_to_byte_index};

impl RichDocument {
    /// Split a text node at a char offset.
    ///
    /// The left part keeps `id`; the right part is a new sibling whose id is
    /// returned. Splitting at either end, or a detached node, is a no-op.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        let text = self.text(id)?;
        if offset == 0 || offset >= char_len(text) {
            return None;
        }
        let byte = char_to_byte_index(text, offset);
        let (left, right) = (text[..byte].to_string(), text[byte..].to_string());
        self.set_text(id, left);
        let node = self.create_text(right);
        self.insert_child(parent, index + 1, node);
        Some(node)
    }

    /// Split a segment's text node so the covered chars stand alone.
    pub fn isolate_segment(&mut self, segment: &TextSegment) -> NodeId {
        if segment.chars.end < self.node_len(segment.node) {
            self.split_text(segment.node, segment.chars.end);
        }
        if segment.chars.start > 0 {
            if let Some(right) = self.split_text(segment.node, segment.chars.start) {
                return right;
            }
        }
        segment.node
    }

    /// A detached copy of a node without its children.
    pub fn shallow_clone(&mut self, id: NodeId) -> Option<NodeId> {
        let kind = self.kind(id)?.clone();
        Some(self.create(kind))
    }

    /// Wrap a node in a new element placed where the node was.
    pub fn wrap(&mut self, id: NodeId, element: Element) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        let wrapper = self.create_element(element);
        self.insert_child(parent, index, wrapper);
        self.append_child(wrapper, id);
        Some(wrapper)
    }

    /// Replace an element by its children. Returns the moved children.
    pub fn unwrap(&mut self, id: NodeId) -> Vec<NodeId> {
        let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) else {
            return Vec::new();
        };
        let children = self.children(id).to_vec();
        for (i, &child) in children.iter().enumerate() {
            self.insert_child(parent, index + i, child);
        }
        self.remove(id);
        children
    }

    /// Split every level between `id` and `ancestor` so that `ancestor`
    /// contains nothing but the chain leading to `id`.
    ///
    /// Siblings before and after the chain move into shallow copies of their
    /// parent placed on either side of it.
    pub fn split_out(&mut self, id: NodeId, ancestor: NodeId) {
        let mut child = id;
        while let Some(parent) = self.parent(child) {
            if parent == NodeId::ROOT {
                break;
            }
            let (Some(grand), Some(index)) = (self.parent(parent), self.index_in_parent(child))
            else {
                break;
            };
            let siblings = self.children(parent).to_vec();
            let (before, after) = (&siblings[..index], &siblings[index + 1..]);

            if !before.is_empty() {
                if let (Some(copy), Some(at)) =
                    (self.shallow_clone(parent), self.index_in_parent(parent))
                {
                    self.insert_child(grand, at, copy);
                    for &node in before {
                        self.append_child(copy, node);
                    }
                }
            }
            if !after.is_empty() {
                if let (Some(copy), Some(at)) =
                    (self.shallow_clone(parent), self.index_in_parent(parent))
                {
                    self.insert_child(grand, at + 1, copy);
                    for &node in after {
                        self.append_child(copy, node);
                    }
                }
            }

            if parent == ancestor {
                break;
            }
            child = parent;
        }
    }

    /// Merge an element with identical element siblings on either side.
    ///
    /// Returns the id of the surviving element.
    pub fn merge_adjacent(&mut self, id: NodeId) -> NodeId {
        let mut current = id;
        if let Some(prev) = self.sibling(current, -1) {
            if self.same_element(prev, current) {
                self.move_children(current, prev);
                self.remove(current);
                current = prev;
            }
        }
        if let Some(next) = self.sibling(current, 1) {
            if self.same_element(current, next) {
                self.move_children(next, current);
                self.remove(next);
            }
        }
        current
    }

    fn sibling(&self, id: NodeId, step: isize) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?.checked_add_signed(step)?;
        self.children(parent).get(index).copied()
    }

    fn same_element(&self, a: NodeId, b: NodeId) -> bool {
        matches!((self.element(a), self.element(b)), (Some(x), Some(y)) if x == y)
    }

    fn move_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.children(from).to_vec() {
            self.append_child(to, child);
        }
    }

    /// Change an element's tag, keeping attributes and children.
    pub fn set_tag(&mut self, id: NodeId, tag: Tag) {
        if let Some(el) = self.element_mut(id) {
            el.tag = tag;
        }
    }

    /// Insert a node at a position, splitting a text node if needed.
    ///
    /// An invalid position appends at the end of the document. Returns the
    /// position just after the inserted node.
    pub fn insert_at(&mut self, pos: DocPosition, node: NodeId) -> DocPosition {
        if !self.is_valid_position(pos) {
            return self.append_at_end(node);
        }
        match self.kind(pos.node) {
            Some(NodeKind::Text(_)) => {
                let (Some(parent), Some(index)) =
                    (self.parent(pos.node), self.index_in_parent(pos.node))
                else {
                    return self.append_at_end(node);
                };
                let at = if pos.offset == 0 {
                    index
                } else {
                    self.split_text(pos.node, pos.offset);
                    index + 1
                };
                self.insert_child(parent, at, node);
                DocPosition::new(parent, at + 1)
            }
            Some(NodeKind::Element(el)) if el.tag.is_void() => {
                match (self.parent(pos.node), self.index_in_parent(pos.node)) {
                    (Some(parent), Some(index)) => {
                        self.insert_child(parent, index + 1, node);
                        DocPosition::new(parent, index + 2)
                    }
                    _ => self.append_at_end(node),
                }
            }
            _ => {
                self.insert_child(pos.node, pos.offset, node);
                DocPosition::new(pos.node, pos.offset + 1)
            }
        }
    }

    fn append_at_end(&mut self, node: NodeId) -> DocPosition {
        self.append_child(NodeId::ROOT, node);
        self.end_position()
    }

    /// Remove isolated text nodes, pruning inline elements left empty.
    ///
    /// Returns the position the first node occupied.
    pub fn delete_nodes(&mut self, nodes: &[NodeId]) -> Option<DocPosition> {
        let first = *nodes.first()?;
        let mut at = DocPosition::new(self.parent(first)?, self.index_in_parent(first)?);
        for &node in nodes {
            let parent = self.parent(node);
            self.remove(node);
            let mut current = parent;
            while let Some(id) = current {
                let prunable = id != NodeId::ROOT
                    && self.children(id).is_empty()
                    && self.tag(id).is_some_and(|t| !t.is_void() && !t.is_block() && *t != Tag::Li);
                if !prunable {
                    break;
                }
                current = self.parent(id);
                if at.node == id {
                    if let (Some(p), Some(i)) = (self.parent(id), self.index_in_parent(id)) {
                        at = DocPosition::new(p, i);
                    }
                }
                self.remove(id);
            }
        }
        Some(at)
    }

    /// A range covering whole nodes, from the start of the first to the end of the last.
    pub fn range_over(&self, nodes: &[NodeId]) -> Option<DocRange> {
        let first = *nodes.first()?;
        let last = *nodes.last()?;
        Some(DocRange::new(
            DocPosition::new(first, 0),
            DocPosition::new(last, self.node_len(last)),
        ))
    }
}
