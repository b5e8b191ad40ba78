//! Markup to tree conversion.
//!
//! The markup handled here is the well-formed HTML the engine itself emits:
//! every element is closed or self-closed, except the HTML void elements.

use crate::data::{DataMw, DataParsoid};
use crate::document::Document;
use crate::error::{DomError, Result};
use crate::node::{ElementData, Node, NodeData, NodeId, Origin};
use quick_xml::Reader;
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn resolve_html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "shy" => Some("\u{ad}"),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        "lrm" => Some("\u{200e}"),
        "rlm" => Some("\u{200f}"),
        "zwnj" => Some("\u{200c}"),
        "zwj" => Some("\u{200d}"),
        "hellip" => Some("\u{2026}"),
        _ => None,
    }
}

/// Unescape character data, keeping the raw text when it holds a stray `&`.
fn unescape_lenient(raw: &str) -> String {
    match unescape_with(raw, resolve_html_entity) {
        Ok(text) => text.into_owned(),
        Err(_) => raw.to_string(),
    }
}

impl Document {
    /// Parse `html` into a new detached fragment of this document.
    ///
    /// `data-parsoid` and `data-mw` attributes are loaded into the nodes'
    /// typed bags. Every node remembers the markup it came from so that an
    /// unmodified subtree can later be serialized verbatim.
    pub fn parse_fragment(&mut self, html: &str) -> Result<NodeId> {
        let input = self.inputs.len();
        self.inputs.push(html.to_string());
        let fragment = self.create_fragment();

        let mut reader = Reader::from_str(html);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        reader.config_mut().check_end_names = false;

        // Open elements with the offset of their `<`
        let mut stack: Vec<(NodeId, usize)> = Vec::new();

        loop {
            let event_start = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| DomError::Syntax {
                message: e.to_string(),
                position: Some(reader.error_position()),
            })?;
            let event_end = reader.buffer_position() as usize;
            let parent = stack.last().map_or(fragment, |&(id, _)| id);
            let origin = Origin {
                input,
                range: event_start..event_end,
            };

            match event {
                Event::Start(e) => {
                    let id = self.element_from_tag(&e)?;
                    self.attach(parent, id);
                    let void = self.tag_name(id).is_some_and(is_void_element);
                    if void {
                        self.node_mut(id).origin = Some(origin);
                    } else {
                        stack.push((id, event_start));
                    }
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if is_void_element(&name) {
                        continue;
                    }
                    let (id, start) = stack
                        .pop()
                        .ok_or_else(|| DomError::UnexpectedEndTag(name.clone()))?;
                    let open = self.tag_name(id).unwrap_or_default();
                    if open != name {
                        return Err(DomError::MismatchedEndTag {
                            expected: open.to_string(),
                            found: name,
                        });
                    }
                    self.node_mut(id).origin = Some(Origin {
                        input,
                        range: start..event_end,
                    });
                }
                Event::Empty(e) => {
                    let id = self.element_from_tag(&e)?;
                    self.node_mut(id).origin = Some(origin);
                    self.attach(parent, id);
                }
                Event::Text(e) => {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    let mut node = Node::new(NodeData::Text(unescape_lenient(&raw)));
                    node.origin = Some(origin);
                    let id = self.alloc(node);
                    self.attach(parent, id);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    let mut node = Node::new(NodeData::Text(text));
                    node.origin = Some(origin);
                    let id = self.alloc(node);
                    self.attach(parent, id);
                }
                Event::Comment(e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    let mut node = Node::new(NodeData::Comment(text));
                    node.origin = Some(origin);
                    let id = self.alloc(node);
                    self.attach(parent, id);
                }
                Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {
                    // Not part of a body fragment
                }
                Event::Eof => break,
            }
        }

        if let Some(&(id, _)) = stack.last() {
            let name = self.tag_name(id).unwrap_or_default().to_string();
            return Err(DomError::UnclosedElement(name));
        }

        Ok(fragment)
    }

    /// Append without marking anything modified.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    fn element_from_tag(&mut self, e: &BytesStart<'_>) -> Result<NodeId> {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let mut element = ElementData {
            name,
            ..ElementData::default()
        };
        let mut dp = DataParsoid::default();
        let mut dmw = None;

        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape_lenient(&raw);
            match key.as_str() {
                "data-parsoid" => {
                    dp = serde_json::from_str::<DataParsoid>(&value).map_err(|err| {
                        DomError::InvalidDataAttribute {
                            attribute: key.clone(),
                            message: err.to_string(),
                        }
                    })?;
                }
                "data-mw" => {
                    dmw = Some(serde_json::from_str::<DataMw>(&value).map_err(|err| {
                        DomError::InvalidDataAttribute {
                            attribute: key.clone(),
                            message: err.to_string(),
                        }
                    })?);
                }
                _ => {
                    if key == "about" {
                        self.note_about_id(&value);
                    }
                    element.attrs.insert(key, value);
                }
            }
        }

        let mut node = Node::new(NodeData::Element(element));
        node.dp = dp;
        node.dmw = dmw;
        Ok(self.alloc(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selser_source_map::OffsetSpan;

    #[test]
    fn test_parse_elements_and_text() {
        let mut doc = Document::new();
        let frag = doc.parse_fragment("<p class=\"a\">x &amp; y<br>z</p>tail").unwrap();
        let children = doc.children(frag).to_vec();
        assert_eq!(children.len(), 2);
        let p = children[0];
        assert_eq!(doc.tag_name(p), Some("p"));
        assert_eq!(doc.attr(p, "class"), Some("a"));
        assert_eq!(doc.text_content(p), "x & yz");
        assert_eq!(doc.children(p).len(), 3);
        assert_eq!(doc.text(children[1]), Some("tail"));
    }

    #[test]
    fn test_parse_loads_data_bags() {
        let mut doc = Document::new();
        let frag = doc
            .parse_fragment(
                r#"<span typeof="mw:Extension/ref" data-parsoid='{"dsr":[0,20,5,6]}' data-mw='{"name":"ref"}'></span>"#,
            )
            .unwrap();
        let span = doc.first_child(frag).unwrap();
        assert_eq!(doc.data_parsoid(span).dsr, Some(OffsetSpan::new(0, 20, 5, 6)));
        assert_eq!(doc.data_mw(span).unwrap().name.as_deref(), Some("ref"));
        assert!(!doc.has_attr(span, "data-parsoid"));
        assert!(doc.has_attr(span, "typeof"));
    }

    #[test]
    fn test_html_entities_and_stray_ampersand() {
        let mut doc = Document::new();
        let frag = doc.parse_fragment("a&nbsp;b").unwrap();
        assert_eq!(doc.text_content(frag), "a\u{a0}b");
        let frag = doc.parse_fragment("b & c").unwrap();
        assert_eq!(doc.text_content(frag), "b & c");
    }

    #[test]
    fn test_mismatched_end_tag() {
        let mut doc = Document::new();
        let err = doc.parse_fragment("<b><i>x</b></i>").unwrap_err();
        assert_eq!(
            err,
            DomError::MismatchedEndTag {
                expected: "i".to_string(),
                found: "b".to_string()
            }
        );
    }

    #[test]
    fn test_unclosed_element() {
        let mut doc = Document::new();
        assert_eq!(
            doc.parse_fragment("<div><p>x</p>").unwrap_err(),
            DomError::UnclosedElement("div".to_string())
        );
    }

    #[test]
    fn test_invalid_data_attribute() {
        let mut doc = Document::new();
        let err = doc.parse_fragment(r#"<b data-mw="{oops"></b>"#).unwrap_err();
        assert!(matches!(err, DomError::InvalidDataAttribute { .. }));
    }

    #[test]
    fn test_parsed_nodes_are_unmodified() {
        let mut doc = Document::new();
        let frag = doc.parse_fragment("<p><b>x</b></p>").unwrap();
        for n in doc.descendants(frag) {
            assert!(!doc.is_modified(n));
        }
    }
}
