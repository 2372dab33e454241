//! DOM synchronization for rich surfaces.
//!
//! The surface is read into a `RichDocument` after user edits and rebuilt
//! from it after programmatic ones. Either direction produces a `NodeMap`
//! pairing document nodes with the DOM nodes they came from, which is what
//! lets DOM selections and `DocRange`s be translated into each other.

use quire_editor_core::text_helpers::{char_len, char_to_utf16_offset, utf16_to_char_offset};
use quire_editor_core::{
    DocPosition, DocRange, Element, NodeId, NodeKind, RichDocument, Tag,
};
use wasm_bindgen::JsCast;
use web_sys::{Document, Node};

use crate::dom::TRANSIENT_ATTR;
use crate::error::BrowserError;

/// Pairs of document and DOM nodes for one surface.
///
/// The surface itself maps to the document root.
pub struct NodeMap {
    surface: Node,
    pairs: Vec<(NodeId, Node)>,
}

impl NodeMap {
    pub fn new(surface: Node) -> Self {
        Self {
            surface,
            pairs: Vec::new(),
        }
    }

    fn insert(&mut self, id: NodeId, node: Node) {
        self.pairs.push((id, node));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn dom_node(&self, id: NodeId) -> Option<&Node> {
        if id == NodeId::ROOT {
            return Some(&self.surface);
        }
        self.pairs.iter().find(|(n, _)| *n == id).map(|(_, d)| d)
    }

    pub fn node_id(&self, node: &Node) -> Option<NodeId> {
        if self.surface.is_same_node(Some(node)) {
            return Some(NodeId::ROOT);
        }
        self.pairs
            .iter()
            .find(|(_, d)| d.is_same_node(Some(node)))
            .map(|(id, _)| *id)
    }
}

fn is_transient(node: &Node) -> bool {
    node.dyn_ref::<web_sys::Element>()
        .is_some_and(|el| el.has_attribute(TRANSIENT_ATTR))
}

/// Rebuild `doc` from the surface's current DOM.
///
/// Comments and transient overlays are skipped.
pub fn read_surface(doc: &mut RichDocument, surface: &Node) -> NodeMap {
    doc.clear();
    let mut map = NodeMap::new(surface.clone());
    read_children(doc, &mut map, surface, NodeId::ROOT);
    tracing::trace!(nodes = map.len(), "surface read");
    map
}

fn read_children(doc: &mut RichDocument, map: &mut NodeMap, from: &Node, parent: NodeId) {
    let mut child = from.first_child();
    while let Some(node) = child {
        child = node.next_sibling();
        if let Some(id) = read_node(doc, &node) {
            doc.append_child(parent, id);
            map.insert(id, node.clone());
            read_children(doc, map, &node, id);
        }
    }
}

fn read_node(doc: &mut RichDocument, node: &Node) -> Option<NodeId> {
    match node.node_type() {
        Node::TEXT_NODE => Some(doc.create_text(node.node_value().unwrap_or_default())),
        Node::ELEMENT_NODE if !is_transient(node) => {
            let el = node.dyn_ref::<web_sys::Element>()?;
            let mut element = Element::new(Tag::from_name(&el.tag_name().to_ascii_lowercase()));
            let attrs = el.attributes();
            for i in 0..attrs.length() {
                if let Some(attr) = attrs.item(i) {
                    element.set_attr(&attr.name(), attr.value());
                }
            }
            Some(doc.create_element(element))
        }
        _ => None,
    }
}

/// Replace the surface's content with `doc`. Transient overlays are kept.
pub fn render_surface(
    doc: &RichDocument,
    surface: &Node,
    document: &Document,
) -> Result<NodeMap, BrowserError> {
    let mut child = surface.first_child();
    let mut anchor = None;
    while let Some(node) = child {
        child = node.next_sibling();
        if is_transient(&node) {
            anchor.get_or_insert(node);
        } else {
            surface.remove_child(&node)?;
        }
    }

    let mut map = NodeMap::new(surface.clone());
    for &id in doc.children(NodeId::ROOT) {
        let node = build_node(doc, id, document, &mut map)?;
        surface.insert_before(&node, anchor.as_ref())?;
    }
    tracing::trace!(nodes = map.len(), "surface rendered");
    Ok(map)
}

fn build_node(
    doc: &RichDocument,
    id: NodeId,
    document: &Document,
    map: &mut NodeMap,
) -> Result<Node, BrowserError> {
    let node: Node = match doc.kind(id) {
        Some(NodeKind::Text(text)) => document.create_text_node(text).into(),
        Some(NodeKind::Element(element)) => {
            let el = document.create_element(element.tag.name())?;
            for attr in &element.attrs {
                // Attributes the browser rejects are dropped rather than
                // failing the whole render.
                if let Err(e) = el.set_attribute(&attr.name, &attr.value) {
                    tracing::debug!(name = %attr.name, "attribute skipped: {:?}", e);
                }
            }
            el.into()
        }
        None => return Err(BrowserError::Dom(format!("stale node {id}"))),
    };
    map.insert(id, node.clone());
    for &child in doc.children(id) {
        let built = build_node(doc, child, document, map)?;
        node.append_child(&built)?;
    }
    Ok(node)
}

/// Translate a DOM boundary point into a document position.
pub fn dom_to_doc_position(
    map: &NodeMap,
    doc: &RichDocument,
    node: &Node,
    offset: u32,
) -> Option<DocPosition> {
    let id = map.node_id(node)?;
    if doc.is_text(id) {
        let text = doc.text(id)?;
        return Some(DocPosition::new(id, utf16_to_char_offset(text, offset as usize)));
    }
    // Element offsets count DOM children, some of which have no document node.
    let children = node.child_nodes();
    let end = offset.min(children.length());
    let mapped = (0..end)
        .filter_map(|i| children.item(i))
        .filter(|child| map.node_id(child).is_some())
        .count();
    Some(DocPosition::new(id, mapped))
}

/// Translate a document position into a DOM boundary point.
pub fn doc_to_dom_position(
    map: &NodeMap,
    doc: &RichDocument,
    pos: DocPosition,
) -> Option<(Node, u32)> {
    let node = map.dom_node(pos.node)?.clone();
    if let Some(text) = doc.text(pos.node) {
        let offset = pos.offset.min(char_len(text));
        return Some((node, char_to_utf16_offset(text, offset) as u32));
    }
    let children = doc.children(pos.node);
    let dom_children = node.child_nodes();
    let index_of = |child: NodeId| -> Option<u32> {
        let target = map.dom_node(child)?;
        (0..dom_children.length())
            .find(|&i| dom_children.item(i).is_some_and(|n| n.is_same_node(Some(target))))
    };
    let offset = match children.get(pos.offset) {
        Some(&child) => index_of(child)?,
        None => match children.last() {
            Some(&last) => index_of(last)? + 1,
            None => 0,
        },
    };
    Some((node, offset))
}

/// The document range selected in the surface, if the selection is inside it.
pub fn read_selection(map: &NodeMap, doc: &RichDocument) -> Option<DocRange> {
    let selection = web_sys::window()?.get_selection().ok()??;
    let anchor_node = selection.anchor_node()?;
    let focus_node = selection.focus_node()?;
    if !selection_inside(&map.surface, &anchor_node) || !selection_inside(&map.surface, &focus_node)
    {
        return None;
    }
    let anchor = dom_to_doc_position(map, doc, &anchor_node, selection.anchor_offset())?;
    let focus = dom_to_doc_position(map, doc, &focus_node, selection.focus_offset())?;
    Some(DocRange::new(anchor, focus))
}

fn selection_inside(surface: &Node, node: &Node) -> bool {
    surface.contains(Some(node))
}

/// Whether the page selection currently sits inside `surface`.
pub fn selection_in_surface(surface: &Node) -> bool {
    web_sys::window()
        .and_then(|w| w.get_selection().ok().flatten())
        .and_then(|s| s.anchor_node())
        .is_some_and(|node| selection_inside(surface, &node))
}

/// Select `range` in the surface.
pub fn apply_selection(
    map: &NodeMap,
    doc: &RichDocument,
    range: &DocRange,
) -> Result<(), BrowserError> {
    let (Some((anchor, anchor_offset)), Some((focus, focus_offset))) = (
        doc_to_dom_position(map, doc, range.anchor),
        doc_to_dom_position(map, doc, range.focus),
    ) else {
        tracing::debug!("selection has no DOM counterpart, leaving it alone");
        return Ok(());
    };
    let window = web_sys::window().ok_or(BrowserError::MissingWindow)?;
    if let Some(selection) = window.get_selection()? {
        selection.set_base_and_extent(&anchor, anchor_offset, &focus, focus_offset)?;
    }
    Ok(())
}
