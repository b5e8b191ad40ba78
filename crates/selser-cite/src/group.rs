/*
 * group.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * A named group of reference entries and its list rendering.
 */

use crate::entry::ReferenceEntry;
use indexmap::IndexMap;
use selser_dom::{Document, NodeId};

/// The entries of one group, numbered in the order they were first
/// resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceGroup {
    pub name: String,
    entries: Vec<ReferenceEntry>,
    /// Named entries only; anonymous entries are reachable by position.
    index_by_name: IndexMap<String, usize>,
}

impl ReferenceGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the entry named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&ReferenceEntry> {
        self.position(name).and_then(|i| self.entries.get(i))
    }

    pub fn entry(&self, index: usize) -> Option<&ReferenceEntry> {
        self.entries.get(index)
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut ReferenceEntry> {
        self.entries.get_mut(index)
    }

    /// Append `entry`, indexing it by name if it has one. Returns its
    /// position.
    pub(crate) fn push(&mut self, entry: ReferenceEntry) -> usize {
        let position = self.entries.len();
        if entry.is_named() {
            self.index_by_name.insert(entry.name.clone(), position);
        }
        self.entries.push(entry);
        position
    }

    /// Append the list item for `entry` to `refs_list`.
    ///
    /// The entry's content is moved out of the content store, which is then
    /// released.
    pub fn render_line(
        &self,
        doc: &mut Document,
        refs_list: NodeId,
        entry: &ReferenceEntry,
        page_uri: &str,
    ) {
        let li = doc.create_element("li");
        doc.set_attr(li, "about", format!("#{}", entry.target));
        doc.set_attr(li, "id", entry.target.as_str());
        if let Some(class) = entry.dir.css_class() {
            doc.set_attr(li, "class", class);
        }

        let text_span = doc.create_element("span");
        doc.set_attr(text_span, "id", format!("mw-reference-text-{}", entry.target));
        doc.set_attr(text_span, "class", "mw-reference-text");
        if let Some(content_id) = &entry.content_id {
            let content = doc.fragment(content_id).and_then(|f| doc.first_child(f));
            if let Some(content) = content {
                doc.migrate_children(content, text_span);
            }
            doc.clear_fragment(content_id);
        }

        if let [only] = entry.linkbacks.as_slice() {
            let target = entry.id.as_deref().unwrap_or(only);
            let a = self.create_linkback(doc, page_uri, target, "↑");
            doc.set_attr(a, "rel", "mw:referencedBy");
            doc.append_child(li, a);
        } else {
            let span = doc.create_element("span");
            doc.set_attr(span, "rel", "mw:referencedBy");
            for (i, lb) in entry.linkbacks.iter().enumerate() {
                let a = self.create_linkback(doc, page_uri, lb, &(i + 1).to_string());
                doc.append_child(span, a);
            }
            doc.append_child(li, span);
        }

        let space = doc.create_text(" ");
        doc.append_child(li, space);
        doc.append_child(li, text_span);

        doc.append_child(refs_list, li);
        let newline = doc.create_text("\n");
        doc.append_child(refs_list, newline);
    }

    fn create_linkback(&self, doc: &mut Document, page_uri: &str, target: &str, text: &str) -> NodeId {
        let a = doc.create_element("a");
        doc.set_attr(a, "href", format!("{}#{}", page_uri, target));
        if !self.name.is_empty() {
            doc.set_attr(a, "data-mw-group", self.name.as_str());
        }
        let span = doc.create_element("span");
        doc.set_attr(span, "class", "mw-linkback-text");
        let label = doc.create_text(format!("{} ", text));
        doc.append_child(span, label);
        doc.append_child(a, span);
        a
    }
}
