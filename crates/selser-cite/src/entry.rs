/*
 * entry.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * One numbered entry of a reference group.
 */

use selser_dom::NodeId;
use std::fmt;

/// Text direction requested for an entry's content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Unset,
    Ltr,
    Rtl,
}

impl Direction {
    /// Parse a `dir` attribute value, case-insensitively. Anything other than
    /// `ltr` or `rtl` is `Unset`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "ltr" => Direction::Ltr,
            "rtl" => Direction::Rtl,
            _ => Direction::Unset,
        }
    }

    /// Class added to the entry's list item.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Direction::Unset => None,
            Direction::Ltr => Some("mw-cite-dir-ltr"),
            Direction::Rtl => Some("mw-cite-dir-rtl"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Unset => "",
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        })
    }
}

/// A resolved citation: one line of a reference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Id base of the citation links, e.g. `cite_ref-smith_3`.
    pub key: String,
    /// Author-given name; empty for anonymous citations.
    pub name: String,
    pub group: String,
    /// 1-based position within the group.
    pub group_index: usize,
    /// Position in the whole document, across groups.
    pub index: usize,
    /// Link id of an anonymous citation. Named citations use `linkbacks`.
    pub id: Option<String>,
    /// Id of the list item, e.g. `cite_note-smith-3`.
    pub target: String,
    /// Content fragment holding the canonical content. Set at most once.
    pub content_id: Option<String>,
    /// Inner HTML of the canonical content, for comparing redefinitions.
    pub cached_html: Option<String>,
    pub dir: Direction,
    /// Citation links in the live tree.
    pub nodes: Vec<NodeId>,
    /// Ids of the citation links, in order of appearance.
    pub linkbacks: Vec<String>,
    /// About ids of citation links inside embedded HTML.
    pub embedded_nodes: Vec<String>,
}

impl ReferenceEntry {
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Record a citation link in the live tree and return its id.
    pub fn add_linkback(&mut self, node: NodeId) -> &str {
        self.nodes.push(node);
        let id = format!("{}-{}", self.key, self.linkbacks.len());
        self.linkbacks.push(id);
        self.linkbacks.last().map_or("", String::as_str)
    }

    /// Text of the citation link, e.g. `[3]` or `[notes 3]`.
    pub fn link_text(&self) -> String {
        if self.group.is_empty() {
            format!("[{}]", self.group_index)
        } else {
            format!("[{} {}]", self.group, self.group_index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(group: &str) -> ReferenceEntry {
        ReferenceEntry {
            key: "cite_ref-a_1".to_string(),
            name: "a".to_string(),
            group: group.to_string(),
            group_index: 3,
            index: 0,
            id: None,
            target: "cite_note-a-1".to_string(),
            content_id: None,
            cached_html: None,
            dir: Direction::Unset,
            nodes: Vec::new(),
            linkbacks: Vec::new(),
            embedded_nodes: Vec::new(),
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::parse("RTL"), Direction::Rtl);
        assert_eq!(Direction::parse("ltr"), Direction::Ltr);
        assert_eq!(Direction::parse("up"), Direction::Unset);
        assert_eq!(Direction::Rtl.css_class(), Some("mw-cite-dir-rtl"));
        assert_eq!(Direction::Unset.css_class(), None);
    }

    #[test]
    fn test_linkbacks_are_numbered_from_zero() {
        let mut doc = selser_dom::Document::new();
        let (a, b) = (doc.create_element("sup"), doc.create_element("sup"));
        let mut e = entry("");
        assert_eq!(e.add_linkback(a), "cite_ref-a_1-0");
        assert_eq!(e.add_linkback(b), "cite_ref-a_1-1");
        assert_eq!(e.nodes, vec![a, b]);
    }

    #[test]
    fn test_link_text() {
        assert_eq!(entry("").link_text(), "[3]");
        assert_eq!(entry("notes").link_text(), "[notes 3]");
    }
}
