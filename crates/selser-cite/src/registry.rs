/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-document state of the citation passes.
 */

//! The reference registry.
//!
//! One registry lives for one document transformation. It owns every
//! reference group, the stack that tells the extractor where in the tree it
//! is, and the errors that could only be attached after embedded HTML had
//! been serialized.

use crate::config::CiteConfig;
use crate::entry::{Direction, ReferenceEntry};
use crate::group::ReferenceGroup;
use crate::report::RefError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// One frame of the extraction context stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextFrame {
    /// Inside HTML embedded in a data attribute, or inside the content of
    /// another citation.
    Embedded,
    /// Inside the content of an extension tag, e.g. a reference list.
    EmbeddedTagged(String),
}

/// Where the extractor currently is, derived from the context stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    TopLevel,
    InBibliographyList,
    InEmbeddedAttributeHtml,
}

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__+").unwrap());

/// Turn a citation name into something usable inside an element id.
pub fn normalize_key(name: &str) -> String {
    let spaced = WHITESPACE_RE.replace_all(name.trim(), "_");
    UNDERSCORES_RE.replace_all(&spaced, "_").into_owned()
}

#[derive(Debug, Default)]
pub struct ReferenceRegistry {
    config: CiteConfig,
    /// Running count of entries across all groups.
    index: usize,
    groups: IndexMap<String, ReferenceGroup>,
    context: Vec<ContextFrame>,
    /// Group of the reference list being processed, if any.
    pub(crate) references_group: String,
    /// Errors for citation links inside embedded HTML, keyed by about id.
    deferred_errors: IndexMap<String, Vec<RefError>>,
    /// Nesting of citations, lists and embedded HTML currently being walked.
    pub(crate) depth: usize,
}

impl ReferenceRegistry {
    pub fn new(config: CiteConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CiteConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Groups and entries
    // ---------------------------------------------------------------------

    /// Create a new entry in `group`. A non-empty `name` is indexed so later
    /// citations can find it.
    ///
    /// Returns the entry's position in its group.
    pub fn add(&mut self, group: &str, name: &str) -> usize {
        let n = self.index + 1;
        let (key, target) = if name.is_empty() {
            (format!("cite_ref-{}", n), format!("cite_note-{}", n))
        } else {
            let normalized = normalize_key(name);
            (
                format!("cite_ref-{}_{}", normalized, n),
                format!("cite_note-{}-{}", normalized, n),
            )
        };

        let ref_group = self.get_group(group);
        let entry = ReferenceEntry {
            id: name.is_empty().then(|| key.clone()),
            key,
            name: name.to_string(),
            group: group.to_string(),
            group_index: ref_group.len() + 1,
            index: n - 1,
            target,
            content_id: None,
            cached_html: None,
            dir: Direction::Unset,
            nodes: Vec::new(),
            linkbacks: Vec::new(),
            embedded_nodes: Vec::new(),
        };
        tracing::trace!(group, name, key = %entry.key, "new reference entry");
        let position = ref_group.push(entry);
        self.index += 1;
        position
    }

    /// The group named `name`, created empty on first access.
    pub fn get_group(&mut self, name: &str) -> &mut ReferenceGroup {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| ReferenceGroup::new(name))
    }

    pub fn group(&self, name: &str) -> Option<&ReferenceGroup> {
        self.groups.get(name)
    }

    pub fn entry_mut(&mut self, group: &str, position: usize) -> Option<&mut ReferenceEntry> {
        self.groups.get_mut(group)?.entry_mut(position)
    }

    /// Forget a group once its list has been rendered.
    pub fn remove_group(&mut self, name: &str) -> Option<ReferenceGroup> {
        self.groups.shift_remove(name)
    }

    /// Names of the groups not yet rendered, in first-use order.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    // ---------------------------------------------------------------------
    // Context stack
    // ---------------------------------------------------------------------

    pub fn push_context(&mut self, tag: Option<&str>) {
        self.context.push(match tag {
            Some(tag) => ContextFrame::EmbeddedTagged(tag.to_string()),
            None => ContextFrame::Embedded,
        });
    }

    pub fn pop_context(&mut self) -> Option<ContextFrame> {
        self.context.pop()
    }

    /// True anywhere inside a reference list, however deeply nested.
    pub fn in_references_content(&self) -> bool {
        self.context
            .iter()
            .any(|frame| matches!(frame, ContextFrame::EmbeddedTagged(tag) if tag == "references"))
    }

    /// True inside anything other than top-level content.
    pub fn in_embedded_content(&self) -> bool {
        !self.context.is_empty()
    }

    pub fn state(&self) -> ExtractionState {
        if self.in_references_content() {
            ExtractionState::InBibliographyList
        } else if self.in_embedded_content() {
            ExtractionState::InEmbeddedAttributeHtml
        } else {
            ExtractionState::TopLevel
        }
    }

    // ---------------------------------------------------------------------
    // Deferred errors
    // ---------------------------------------------------------------------

    pub fn defer_errors(&mut self, about: impl Into<String>, errs: Vec<RefError>) {
        self.deferred_errors.insert(about.into(), errs);
    }

    pub fn deferred_errors(&self, about: &str) -> Option<&[RefError]> {
        self.deferred_errors.get(about).map(Vec::as_slice)
    }

    pub fn has_deferred_errors(&self) -> bool {
        !self.deferred_errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RefErrorKind;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("smith 2020"), "smith_2020");
        assert_eq!(normalize_key(" a \t b__c "), "a_b_c");
        assert_eq!(normalize_key("plain"), "plain");
    }

    #[test]
    fn test_add_numbers_per_group_and_indexes_per_document() {
        let mut registry = ReferenceRegistry::default();
        assert_eq!(registry.add("", "a"), 0);
        assert_eq!(registry.add("notes", ""), 0);
        assert_eq!(registry.add("", ""), 1);

        let main = registry.group("").unwrap();
        let a = main.get("a").unwrap();
        assert_eq!(a.key, "cite_ref-a_1");
        assert_eq!(a.target, "cite_note-a-1");
        assert_eq!(a.id, None);
        assert_eq!(a.group_index, 1);

        let anon = main.entry(1).unwrap();
        assert_eq!(anon.key, "cite_ref-3");
        assert_eq!(anon.id.as_deref(), Some("cite_ref-3"));
        assert_eq!(anon.group_index, 2);

        let note = registry.group("notes").unwrap().entry(0).unwrap();
        assert_eq!(note.target, "cite_note-2");
        assert_eq!(note.group_index, 1);
        assert_eq!(note.group, "notes");
    }

    #[test]
    fn test_group_indices_are_unique() {
        let mut registry = ReferenceRegistry::default();
        for name in ["a", "", "b", "", "c"] {
            registry.add("g", name);
        }
        let mut indices: Vec<usize> = registry
            .group("g")
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.group_index)
            .collect();
        indices.dedup();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_remove_group() {
        let mut registry = ReferenceRegistry::default();
        registry.add("g", "a");
        assert!(registry.remove_group("g").is_some());
        assert!(registry.group("g").is_none());
        assert!(registry.get_group("g").is_empty());
    }

    #[test]
    fn test_context_stack() {
        let mut registry = ReferenceRegistry::default();
        assert_eq!(registry.state(), ExtractionState::TopLevel);

        registry.push_context(Some("references"));
        assert!(registry.in_references_content());
        assert_eq!(registry.state(), ExtractionState::InBibliographyList);

        registry.push_context(None);
        assert!(registry.in_references_content());
        assert!(registry.in_embedded_content());

        assert_eq!(registry.pop_context(), Some(ContextFrame::Embedded));
        registry.pop_context();
        assert!(!registry.in_embedded_content());

        registry.push_context(None);
        assert!(!registry.in_references_content());
        assert_eq!(registry.state(), ExtractionState::InEmbeddedAttributeHtml);
    }

    #[test]
    fn test_deferred_errors() {
        let mut registry = ReferenceRegistry::default();
        assert!(!registry.has_deferred_errors());
        registry.defer_errors("#mwt3", vec![RefError::new(RefErrorKind::NoText)]);
        assert_eq!(registry.deferred_errors("#mwt3").unwrap().len(), 1);
        assert!(registry.deferred_errors("#mwt4").is_none());
    }
}
