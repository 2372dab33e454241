//! Tolerant markup parser for rich-field backing values.
//!
//! Covers the authoring subset the editor produces and whatever a browser
//! surface may hand back: well-formed tags, void elements, quoted and bare
//! attributes, character references. Malformed input never fails; stray
//! close tags are dropped and unclosed elements end at the end of input.

use std::borrow::Cow;

use smol_str::SmolStr;

use super::{Attr, Element, NodeId, RichDocument, Tag};

/// Parse markup into a fresh document.
pub fn parse_markup(markup: &str) -> RichDocument {
    let mut doc = RichDocument::new();
    doc.append_markup(NodeId::ROOT, markup);
    doc
}

impl RichDocument {
    /// Replace the whole document with parsed markup.
    ///
    /// The arena is reused, so ids from before the call stay stale.
    pub fn replace_with_markup(&mut self, markup: &str) {
        self.clear();
        self.append_markup(NodeId::ROOT, markup);
    }

    /// Parse markup and append the resulting nodes under `parent`.
    pub fn append_markup(&mut self, parent: NodeId, markup: &str) {
        let mut parser = MarkupParser {
            doc: self,
            stack: vec![parent],
            text: String::new(),
        };
        parser.run(markup);
    }
}

struct MarkupParser<'d> {
    doc: &'d mut RichDocument,
    stack: Vec<NodeId>,
    text: String,
}

impl MarkupParser<'_> {
    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn run(&mut self, markup: &str) {
        let mut rest = markup;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("<!--") {
                self.flush_text();
                rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            } else if let Some(after) = rest.strip_prefix("</") {
                self.flush_text();
                let end = after.find('>').unwrap_or(after.len());
                let name = after[..end].trim();
                self.close(name);
                rest = after.get(end + 1..).unwrap_or("");
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.flush_text();
                rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
            } else if starts_tag(rest) {
                self.flush_text();
                rest = self.open_tag(&rest[1..]);
            } else {
                // Text runs up to the next '<', or a lone '<' that starts no tag.
                let first = rest.chars().next().map_or(1, char::len_utf8);
                let end = rest[first..].find('<').map_or(rest.len(), |i| i + first);
                self.text.push_str(&rest[..end]);
                rest = &rest[end..];
            }
        }
        self.flush_text();
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.text);
        let text = decode_entities(&raw).into_owned();
        let node = self.doc.create_text(text);
        let parent = self.current();
        self.doc.append_child(parent, node);
    }

    /// Parse a start tag from just after its `<`, returning the remaining input.
    fn open_tag<'a>(&mut self, input: &'a str) -> &'a str {
        let name_end = input
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(input.len());
        let tag = Tag::from_name(&input[..name_end]);
        let mut element = Element::new(tag.clone());
        let mut rest = &input[name_end..];

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            if let Some(after) = rest.strip_prefix("/>") {
                rest = after;
                break;
            }
            if let Some(after) = rest.strip_prefix('>') {
                rest = after;
                break;
            }
            if let Some(after) = rest.strip_prefix('/') {
                rest = after;
                continue;
            }
            let (attr, after) = parse_attr(rest);
            rest = after;
            if let Some(attr) = attr {
                if element.attr(&attr.name).is_none() {
                    element.attrs.push(attr);
                }
            }
        }

        // An opening <p> or <li> implicitly closes an open sibling of the same tag.
        if matches!(tag, Tag::P | Tag::Li) && self.doc.tag(self.current()) == Some(&tag) {
            self.stack.pop();
        }

        let node = self.doc.create_element(element);
        let parent = self.current();
        self.doc.append_child(parent, node);
        if !tag.is_void() {
            self.stack.push(node);
        }
        rest
    }

    fn close(&mut self, name: &str) {
        let tag = Tag::from_name(name);
        // Never pop the node the parse was rooted at.
        let found = self
            .stack
            .iter()
            .skip(1)
            .rposition(|&id| self.doc.tag(id) == Some(&tag));
        if let Some(pos) = found {
            self.stack.truncate(pos + 1);
        }
    }
}

fn starts_tag(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Parse one attribute, returning it and the remaining input.
fn parse_attr(input: &str) -> (Option<Attr>, &str) {
    let name_end = input
        .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/'))
        .unwrap_or(input.len());
    let name = &input[..name_end];
    let mut rest = input[name_end..].trim_start();

    let mut value = String::new();
    if let Some(after) = rest.strip_prefix('=') {
        let after = after.trim_start();
        match after.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &after[1..];
                let end = body.find(quote).unwrap_or(body.len());
                value = decode_entities(&body[..end]).into_owned();
                rest = body.get(end + 1..).unwrap_or("");
            }
            _ => {
                let end = after
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(after.len());
                value = decode_entities(&after[..end]).into_owned();
                rest = &after[end..];
            }
        }
    }

    if name.is_empty() {
        // Skip a junk character so the caller always makes progress.
        let skip = rest.chars().next().map_or(0, char::len_utf8);
        return (None, &rest[skip..]);
    }
    let attr = Attr {
        name: SmolStr::new(name.to_ascii_lowercase()),
        value,
    };
    (Some(attr), rest)
}

/// Decode character references. Unknown references are left as written.
pub(crate) fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').filter(|&semi| semi <= 10) {
            Some(semi) => match decode_reference(&tail[1..semi]) {
                Some(c) => {
                    out.push(c);
                    rest = &tail[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_authoring_subset() {
        let markup = r#"<p>Hello <b>bold</b> and <a href="https://example.com" target="_blank" rel="noopener noreferrer">link</a></p><ul><li>one</li><li>two</li></ul><p><img src="/u/a.png" alt="A" style="width: 120px; height: auto;"><br></p>"#;
        assert_eq!(parse_markup(markup).to_markup(), markup);
    }

    #[test]
    fn test_tolerates_malformed_input() {
        let doc = parse_markup("<p>unclosed <b>bold</i> text</p></div>stray");
        insta::assert_snapshot!(doc.to_markup(), @"<p>unclosed <b>bold text</b></p>stray");
    }

    #[test]
    fn test_implicit_paragraph_close() {
        let doc = parse_markup("<p>one<p>two");
        assert_eq!(doc.to_markup(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_comments_and_doctype_dropped() {
        let doc = parse_markup("<!doctype html><!-- note --><p>x</p>");
        assert_eq!(doc.to_markup(), "<p>x</p>");
    }

    #[test]
    fn test_attributes() {
        let doc = parse_markup("<img src=/a.png alt='it&#39;s' data-x>");
        let img = doc.children(NodeId::ROOT)[0];
        let el = doc.element(img).unwrap();
        assert_eq!(el.tag, Tag::Img);
        assert_eq!(el.attr("src"), Some("/a.png"));
        assert_eq!(el.attr("alt"), Some("it's"));
        assert_eq!(el.attr("data-x"), Some(""));
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let doc = parse_markup("<p>1 < 2</p>");
        assert_eq!(doc.text_content(), "1 < 2");
        assert_eq!(doc.to_markup(), "<p>1 &lt; 2</p>");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#x1F600;&#65;"), "\u{1F600}A");
        assert_eq!(decode_entities("AT&T; &bogus;"), "AT&T; &bogus;");
    }

    #[test]
    fn test_replace_keeps_old_ids_stale() {
        let mut doc = parse_markup("<p>old</p>");
        let old = doc.text_nodes()[0];
        doc.replace_with_markup("<p>new</p>");
        assert!(!doc.contains(old));
        assert_eq!(doc.text_content(), "new");
    }
}
