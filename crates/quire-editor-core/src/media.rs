//! Media insertion flow.
//!
//! The dialog lists images from an external, read-only catalog. Every fetch
//! is tagged with a request generation; `MediaFlow::receive` only accepts
//! the answer to the latest request of a flow that is still open, so a slow
//! response can never populate a dialog that was refreshed, closed or
//! replaced in the meantime.

use std::future::Future;

use serde::{Deserialize, Deserializer, Serialize};

use crate::document::{DocRange, Element, NodeId, RichDocument, Tag};
use crate::error::EditorError;

/// One catalog entry.
///
/// The catalog sends `null` for a missing title or MIME type; both read as
/// empty, so such an item is listed without a caption or dropped as
/// non-image instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Full-size URL, inserted into the document.
    pub url: String,
    /// Thumbnail URL, shown in the grid.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub thumb: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mime_type: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl MediaItem {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Thumbnail to show, falling back to the full-size URL.
    pub fn thumb_url(&self) -> &str {
        if self.thumb.is_empty() { &self.url } else { &self.thumb }
    }
}

/// Catalog response body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub items: Vec<MediaItem>,
}

impl CatalogResponse {
    pub fn from_json(body: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Source of catalog listings.
pub trait MediaCatalog {
    /// List catalog items, optionally filtered by a search term.
    fn fetch(
        &self,
        query: Option<&str>,
    ) -> impl Future<Output = Result<CatalogResponse, EditorError>>;
}

/// A fetch the caller must perform and report back with `receive`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub generation: u64,
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MediaPhase {
    #[default]
    Closed,
    Loading,
    /// Image items, with the index of the selected one.
    Populated {
        items: Vec<MediaItem>,
        selected: Option<usize>,
    },
    /// The catalog holds no images.
    Empty,
    /// The fetch failed.
    Error(String),
}

/// A confirmed image insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInsert {
    pub url: String,
    pub alt: String,
}

impl ImageInsert {
    pub fn element(&self) -> Element {
        Element::new(Tag::Img)
            .with_attr("src", self.url.as_str())
            .with_attr("alt", self.alt.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MediaFlow {
    phase: MediaPhase,
    generation: u64,
    query: Option<String>,
}

impl MediaFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &MediaPhase {
        &self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != MediaPhase::Closed
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Open the dialog and start the first fetch.
    pub fn open(&mut self, query: Option<String>) -> MediaRequest {
        self.query = query.filter(|q| !q.trim().is_empty());
        self.next_request()
    }

    /// Re-fetch with the current search term, dropping any selection.
    pub fn refresh(&mut self) -> MediaRequest {
        self.next_request()
    }

    /// Re-fetch with a new search term.
    pub fn search(&mut self, query: impl Into<String>) -> MediaRequest {
        let query = query.into();
        self.query = (!query.trim().is_empty()).then_some(query);
        self.next_request()
    }

    fn next_request(&mut self) -> MediaRequest {
        self.generation += 1;
        self.phase = MediaPhase::Loading;
        tracing::debug!(target: "quire::media", generation = self.generation, query = ?self.query, "media fetch");
        MediaRequest {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    /// Whether a response for `generation` would still be accepted.
    pub fn is_pending(&self, generation: u64) -> bool {
        self.phase == MediaPhase::Loading && generation == self.generation
    }

    /// Deliver the result of a fetch. Returns whether it was accepted.
    pub fn receive(
        &mut self,
        generation: u64,
        result: Result<CatalogResponse, EditorError>,
    ) -> bool {
        if !self.is_pending(generation) {
            tracing::debug!(
                target: "quire::media",
                generation,
                current = self.generation,
                "dropping stale media response"
            );
            return false;
        }
        self.phase = match result {
            Ok(response) => {
                let total = response.items.len();
                let items: Vec<MediaItem> =
                    response.items.into_iter().filter(MediaItem::is_image).collect();
                tracing::trace!(target: "quire::media", total, images = items.len(), "media received");
                if items.is_empty() {
                    MediaPhase::Empty
                } else {
                    MediaPhase::Populated {
                        items,
                        selected: None,
                    }
                }
            }
            Err(e) => {
                tracing::warn!(target: "quire::media", "media fetch failed: {e}");
                MediaPhase::Error(e.to_string())
            }
        };
        true
    }

    /// Select the item at `index`, replacing any earlier selection.
    pub fn select(&mut self, index: usize) -> bool {
        match &mut self.phase {
            MediaPhase::Populated { items, selected } if index < items.len() => {
                *selected = Some(index);
                true
            }
            _ => false,
        }
    }

    pub fn selected(&self) -> Option<&MediaItem> {
        match &self.phase {
            MediaPhase::Populated {
                items,
                selected: Some(i),
            } => items.get(*i),
            _ => None,
        }
    }

    pub fn can_insert(&self) -> bool {
        self.selected().is_some()
    }

    /// Confirm the dialog. Without a selection this does nothing and the
    /// dialog stays open.
    pub fn apply(&mut self) -> Option<ImageInsert> {
        let item = self.selected()?;
        let insert = ImageInsert {
            url: item.url.clone(),
            alt: item.title.clone(),
        };
        self.close();
        Some(insert)
    }

    pub fn close(&mut self) {
        self.phase = MediaPhase::Closed;
        self.query = None;
    }
}

/// Insert an image at the selection, replacing selected text.
///
/// Without a usable range the image is appended at the end of the document.
/// Returns a caret just after the image.
pub fn insert_image(
    doc: &mut RichDocument,
    range: Option<DocRange>,
    image: &ImageInsert,
) -> DocRange {
    let img = doc.create_element(image.element());
    let Some((start, end)) = range.and_then(|r| r.ordered(doc)) else {
        return DocRange::collapsed(doc.insert_at(doc.end_position(), img));
    };

    let mut at = start;
    if start != end {
        let segments = doc.text_segments(start, end);
        let nodes: Vec<NodeId> = segments.iter().map(|s| doc.isolate_segment(s)).collect();
        if let Some(pos) = doc.delete_nodes(&nodes) {
            at = pos;
        }
    }
    DocRange::collapsed(doc.insert_at(at, img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocPosition, parse_markup};

    fn item(id: i64, mime: &str) -> MediaItem {
        MediaItem {
            id,
            title: format!("item {id}"),
            url: format!("/uploads/{id}.bin"),
            thumb: format!("/uploads/thumbs/{id}.bin"),
            mime_type: mime.into(),
        }
    }

    fn catalog(mimes: &[&str]) -> CatalogResponse {
        CatalogResponse {
            items: mimes
                .iter()
                .enumerate()
                .map(|(i, m)| item(i as i64, m))
                .collect(),
        }
    }

    #[test]
    fn test_only_images_are_listed() {
        let mut flow = MediaFlow::new();
        let req = flow.open(None);
        let mimes = ["image/png", "application/pdf", "image/jpeg", "video/mp4", "image/webp"];
        assert!(flow.receive(req.generation, Ok(catalog(&mimes))));

        let MediaPhase::Populated { items, selected } = flow.phase() else {
            panic!("expected populated, got {:?}", flow.phase());
        };
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(MediaItem::is_image));
        assert_eq!(*selected, None);
        assert!(!flow.can_insert());
    }

    #[test]
    fn test_null_fields_decode() {
        let body = r#"{"items": [
            {"id": 1, "title": "Cover", "url": "/uploads/1.png", "thumb": "/uploads/t/1.png", "mime_type": "image/png"},
            {"id": 2, "title": null, "url": "/uploads/2.bin", "thumb": null, "mime_type": null},
            {"id": 3, "title": null, "url": "/uploads/3.jpg", "mime_type": "image/jpeg"}
        ]}"#;
        let response = CatalogResponse::from_json(body).unwrap();
        assert_eq!(response.items.len(), 3);
        assert_eq!(response.items[1].mime_type, "");
        assert_eq!(response.items[2].thumb_url(), "/uploads/3.jpg");

        let mut flow = MediaFlow::new();
        let req = flow.open(None);
        assert!(flow.receive(req.generation, Ok(response)));
        let MediaPhase::Populated { items, .. } = flow.phase() else {
            panic!("expected populated, got {:?}", flow.phase());
        };
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, [1, 3]);

        flow.select(1);
        assert_eq!(flow.apply().map(|i| i.alt), Some(String::new()));
    }

    #[test]
    fn test_no_images_is_empty() {
        let mut flow = MediaFlow::new();
        let req = flow.open(None);
        flow.receive(req.generation, Ok(catalog(&["text/plain"])));
        assert_eq!(flow.phase(), &MediaPhase::Empty);

        let req = flow.refresh();
        flow.receive(req.generation, Ok(CatalogResponse::default()));
        assert_eq!(flow.phase(), &MediaPhase::Empty);
    }

    #[test]
    fn test_fetch_error() {
        let mut flow = MediaFlow::new();
        let req = flow.open(None);
        flow.receive(req.generation, Err(EditorError::Catalog("HTTP 500".into())));
        assert!(matches!(flow.phase(), MediaPhase::Error(msg) if msg.contains("HTTP 500")));
        assert!(!flow.can_insert());
        assert_eq!(flow.apply(), None);
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut flow = MediaFlow::new();
        let req = flow.open(None);
        flow.receive(req.generation, Ok(catalog(&["image/png", "image/gif"])));

        assert!(flow.select(0));
        assert!(flow.select(1));
        assert_eq!(flow.selected().map(|i| i.id), Some(1));
        assert!(!flow.select(7));
        assert_eq!(flow.selected().map(|i| i.id), Some(1));
        assert!(flow.can_insert());
    }

    #[test]
    fn test_refresh_resets_selection() {
        let mut flow = MediaFlow::new();
        let req = flow.open(None);
        flow.receive(req.generation, Ok(catalog(&["image/png"])));
        flow.select(0);

        let req = flow.refresh();
        assert_eq!(flow.phase(), &MediaPhase::Loading);
        assert!(!flow.can_insert());
        flow.receive(req.generation, Ok(catalog(&["image/png"])));
        assert!(!flow.can_insert());
    }

    #[test]
    fn test_stale_generation_dropped() {
        let mut flow = MediaFlow::new();
        let first = flow.open(None);
        let second = flow.refresh();
        assert!(!flow.receive(first.generation, Ok(catalog(&["image/png"]))));
        assert_eq!(flow.phase(), &MediaPhase::Loading);
        assert!(flow.receive(second.generation, Ok(catalog(&["image/png", "image/png"]))));
    }

    #[test]
    fn test_response_after_close_dropped() {
        let mut flow = MediaFlow::new();
        let req = flow.open(None);
        flow.close();
        assert!(!flow.receive(req.generation, Ok(catalog(&["image/png"]))));
        assert_eq!(flow.phase(), &MediaPhase::Closed);
    }

    #[test]
    fn test_search_query() {
        let mut flow = MediaFlow::new();
        let req = flow.open(Some("  ".into()));
        assert_eq!(req.query, None);
        let req = flow.search("cat");
        assert_eq!(req.query.as_deref(), Some("cat"));
        assert_eq!(flow.refresh().query.as_deref(), Some("cat"));
    }

    #[test]
    fn test_apply_requires_selection() {
        let mut flow = MediaFlow::new();
        let req = flow.open(None);
        flow.receive(req.generation, Ok(catalog(&["image/png"])));
        assert_eq!(flow.apply(), None);
        assert!(flow.is_open());

        flow.select(0);
        let insert = flow.apply().unwrap();
        assert_eq!(insert.url, "/uploads/0.bin");
        assert_eq!(insert.alt, "item 0");
        assert!(!flow.is_open());
    }

    #[test]
    fn test_decode_catalog() {
        let body = r#"{"items":[{"id":3,"title":"Cat","url":"/u/cat.png","thumb":"/u/t/cat.png","mime_type":"image/png"}]}"#;
        let response = CatalogResponse::from_json(body).unwrap();
        assert_eq!(response.items[0].title, "Cat");
        assert!(CatalogResponse::from_json("{}").unwrap().items.is_empty());
        assert!(matches!(
            CatalogResponse::from_json("not json"),
            Err(EditorError::Decode(_))
        ));
    }

    #[test]
    fn test_insert_image_at_caret() {
        let mut doc = parse_markup("<p>ab</p>");
        let t = doc.text_nodes()[0];
        let image = ImageInsert {
            url: "/u/cat.png".into(),
            alt: "Cat".into(),
        };
        insert_image(&mut doc, Some(DocRange::collapsed(DocPosition::new(t, 1))), &image);
        assert_eq!(doc.to_markup(), r#"<p>a<img src="/u/cat.png" alt="Cat">b</p>"#);
    }

    #[test]
    fn test_insert_image_replaces_selection() {
        let mut doc = parse_markup("<p>one two three</p>");
        let t = doc.text_nodes()[0];
        let image = ImageInsert {
            url: "/x.png".into(),
            alt: String::new(),
        };
        let range = DocRange::new(DocPosition::new(t, 4), DocPosition::new(t, 8));
        insert_image(&mut doc, Some(range), &image);
        assert_eq!(doc.to_markup(), r#"<p>one <img src="/x.png" alt="">three</p>"#);
    }

    #[test]
    fn test_insert_image_fallback() {
        let mut doc = parse_markup("<p>text</p>");
        let after = insert_image(
            &mut doc,
            None,
            &ImageInsert {
                url: "/y.png".into(),
                alt: "Y".into(),
            },
        );
        assert_eq!(doc.to_markup(), r#"<p>text</p><img src="/y.png" alt="Y">"#);
        assert_eq!(after, DocRange::collapsed(doc.end_position()));
    }
}
