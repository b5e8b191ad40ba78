/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rendering of reference lists.
 */

//! Reference list rendering.
//!
//! A list is rendered once all of its group's citations before it have been
//! resolved. Its author-written content is replaced by one line per entry,
//! numbered in the order the entries were first resolved.
//!
//! ## Output Structure
//!
//! ```html
//! <div class="mw-references-wrap mw-references-columns">
//!   <ol class="mw-references references">
//!     <li about="#cite_note-1" id="cite_note-1">...</li>
//!   </ol>
//! </div>
//! ```
//!
//! ## Configuration
//!
//! - `responsive-references`: wrap lists in the `div` (a list's own
//!   `responsive="0"` turns it off)
//! - `responsive-threshold`: entry count above which the wrapper gets
//!   `mw-references-columns`

use crate::config::CiteConfig;
use crate::registry::ReferenceRegistry;
use crate::report::{RefError, RefErrorKind, add_errors_to_node, report};
use selser_dom::{DataMw, DataMwBody, Document, NodeId};
use selser_source_map::OffsetSpan;

/// Author-supplied parameters of a reference list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencesOptions {
    pub group: Option<String>,
    /// `"0"` turns the responsive wrapper off for this list.
    pub responsive: Option<String>,
}

impl ReferencesOptions {
    pub fn for_group(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            responsive: None,
        }
    }
}

/// Build an empty reference list, moving the children of `content` (if any)
/// into it.
///
/// Returns the outermost node: the responsive wrapper if there is one, the
/// `ol` otherwise.
pub fn create_references(
    doc: &mut Document,
    config: &CiteConfig,
    content: Option<NodeId>,
    opts: &ReferencesOptions,
    auto_generated: bool,
) -> NodeId {
    let ol = doc.create_element("ol");
    doc.add_class(ol, "mw-references");
    doc.add_class(ol, "references");
    if let Some(content) = content {
        doc.migrate_children(content, ol);
    }

    let responsive = match opts.responsive.as_deref() {
        Some(value) => value != "0",
        None => config.responsive_references,
    };
    let frag = if responsive {
        let div = doc.create_element("div");
        doc.add_class(div, "mw-references-wrap");
        doc.append_child(div, ol);
        div
    } else {
        ol
    };

    let group = opts.group.as_deref().filter(|g| !g.is_empty());
    if auto_generated {
        doc.add_type_of(frag, "mw:Extension/references");
        let about = doc.new_about_id();
        doc.set_attr(frag, "about", about);
        let mut dmw = DataMw::extension("references");
        if let (Some(attrs), Some(group)) = (dmw.attrs.as_mut(), group) {
            attrs.insert("group".to_string(), group.to_string());
        }
        doc.set_data_mw(frag, Some(dmw));
    }

    if let Some(group) = group {
        doc.data_parsoid_mut(frag).group = Some(group.to_string());
        doc.set_attr(ol, "data-mw-group", group);
    }

    frag
}

/// Render the group of `refs_node` into it and forget the group.
///
/// Entries with problems that can only be known now (a named entry that
/// never got content, a group without a list of its own) get their errors
/// here, or deferred by about id if their citation links sit in embedded
/// HTML.
pub(crate) fn insert_references_into_dom(
    doc: &mut Document,
    registry: &mut ReferenceRegistry,
    refs_node: NodeId,
    auto_generated: bool,
) {
    let is_tpl_wrapper = doc.has_type_of(refs_node, "mw:Transclusion");
    let group = doc
        .data_parsoid(refs_node)
        .group
        .clone()
        .unwrap_or_default();
    let page_uri = registry.config().page_uri.clone();
    let threshold = registry.config().responsive_threshold;
    let ref_group = registry.remove_group(&group);

    if let Some(ref_group) = &ref_group {
        for entry in ref_group.entries() {
            let mut errs = Vec::new();
            if auto_generated && !group.is_empty() {
                errs.push(
                    RefError::new(RefErrorKind::GroupWithoutReferences).with_param(group.as_str()),
                );
            }
            if entry.is_named() && entry.content_id.is_none() {
                errs.push(RefError::new(RefErrorKind::NoText));
            }
            if errs.is_empty() {
                continue;
            }
            for &node in &entry.nodes {
                add_errors_to_node(doc, node, &errs);
            }
            for about in &entry.embedded_nodes {
                registry.defer_errors(about.as_str(), errs.clone());
            }
            let location = entry
                .nodes
                .first()
                .and_then(|&n| doc.data_parsoid(n).dsr);
            report(doc, &errs, location);
        }
    }

    let nested_refs: Vec<String> = doc
        .descendants(refs_node)
        .into_iter()
        .filter(|&n| doc.is_element_named(n, "sup") && doc.has_type_of(n, "mw:Extension/ref"))
        .map(|n| doc.outer_html(n) + "\n")
        .collect();

    if !is_tpl_wrapper {
        let self_close = doc.data_parsoid(refs_node).self_close;
        if auto_generated {
            doc.data_mw_mut(refs_node).auto_generated = true;
        } else if !nested_refs.is_empty() {
            let html = format!("\n{}", nested_refs.concat());
            doc.data_mw_mut(refs_node).body = Some(DataMwBody::html(html));
        } else if !self_close {
            doc.data_mw_mut(refs_node).body = Some(DataMwBody::html(""));
        } else {
            doc.data_mw_mut(refs_node).body = None;
        }
        if self_close {
            doc.data_parsoid_mut(refs_node).self_close = false;
        }
    }

    let entry_count = ref_group.as_ref().map_or(0, |g| g.len());
    let mut list = refs_node;
    let mut columns = false;
    if doc.has_class(refs_node, "mw-references-wrap") {
        if entry_count > threshold {
            doc.add_class(refs_node, "mw-references-columns");
            columns = true;
        }
        let ol = doc
            .children(refs_node)
            .iter()
            .copied()
            .find(|&n| doc.is_element_named(n, "ol"));
        if let Some(ol) = ol {
            list = ol;
        }
    }
    tracing::debug!(group = %group, entries = entry_count, columns, "rendering reference list");

    doc.clear_children(list);
    if let Some(ref_group) = &ref_group {
        for entry in ref_group.entries() {
            ref_group.render_line(doc, list, entry, &page_uri);
        }
    }
}

/// Append an auto-generated list to the end of `doc` for every group that
/// still has unrendered entries.
pub fn insert_missing_references(doc: &mut Document, registry: &mut ReferenceRegistry) {
    let root = doc.root();
    for group in registry.group_names() {
        let frag = create_references(
            doc,
            registry.config(),
            None,
            &ReferencesOptions::for_group(group.as_str()),
            true,
        );
        if let Some(len) = doc.source_len() {
            doc.data_parsoid_mut(frag).dsr = Some(OffsetSpan::new(len, len, 0, 0));
        }
        let newline = doc.create_text("\n");
        doc.append_child(root, newline);
        doc.append_child(root, frag);
        tracing::debug!(group = %group, "appending auto-generated reference list");
        insert_references_into_dom(doc, registry, frag, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_create_responsive_list() {
        let mut doc = Document::new();
        let frag = create_references(
            &mut doc,
            &CiteConfig::default(),
            None,
            &ReferencesOptions::for_group("notes"),
            false,
        );
        assert_snapshot!(doc.outer_html(frag), @r#"<div class="mw-references-wrap" data-parsoid="{&quot;group&quot;:&quot;notes&quot;}"><ol class="mw-references references" data-mw-group="notes"></ol></div>"#);
    }

    #[test]
    fn test_responsive_attribute_overrides_config() {
        let mut doc = Document::new();
        let opts = ReferencesOptions {
            group: None,
            responsive: Some("0".to_string()),
        };
        let frag = create_references(&mut doc, &CiteConfig::default(), None, &opts, false);
        assert_eq!(doc.tag_name(frag), Some("ol"));

        let config = CiteConfig::default().with_responsive_references(false);
        let opts = ReferencesOptions {
            group: None,
            responsive: Some("1".to_string()),
        };
        let frag = create_references(&mut doc, &config, None, &opts, false);
        assert_eq!(doc.tag_name(frag), Some("div"));
    }

    #[test]
    fn test_auto_generated_list_is_marked() {
        let mut doc = Document::new();
        let config = CiteConfig::default().with_responsive_references(false);
        let frag = create_references(&mut doc, &config, None, &ReferencesOptions::default(), true);
        assert!(doc.has_type_of(frag, "mw:Extension/references"));
        assert_eq!(doc.attr(frag, "about"), Some("#mwt0"));
        let dmw = doc.data_mw(frag).unwrap();
        assert_eq!(dmw.name.as_deref(), Some("references"));
        assert_eq!(dmw.attr("group"), None);
    }

    #[test]
    fn test_content_is_moved_into_list() {
        let mut doc = Document::from_html("<li>a</li><li>b</li>").unwrap();
        let root = doc.root();
        let config = CiteConfig::default().with_responsive_references(false);
        let ol = create_references(&mut doc, &config, Some(root), &ReferencesOptions::default(), false);
        assert!(!doc.has_children(root));
        assert_eq!(doc.children(ol).len(), 2);
    }

    #[test]
    fn test_nothing_to_insert() {
        let mut doc = Document::from_html("<p>plain</p>").unwrap();
        let mut registry = ReferenceRegistry::default();
        insert_missing_references(&mut doc, &mut registry);
        assert_eq!(doc.inner_html(doc.root()), "<p>plain</p>");
    }
}
