/*
 * extractor.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pass that turns sealed citation markers into citation links.
 */

//! Citation extraction.
//!
//! Walks the document once, depth-first and left to right, and resolves
//! every sealed citation marker against the [`ReferenceRegistry`]. Each
//! marker is replaced by a rendered citation link and its content is kept in
//! the content store until the entry's list line is rendered.
//!
//! ## Input
//!
//! - `<sup typeof="mw:DOMFragment/sealed/ref" data-parsoid='{"html":"mwf0"}'>`:
//!   a citation marker. The fragment `mwf0` starts with a `sup` whose
//!   `data-mw` holds the `name`, `follow`, `group` and `dir` attributes and
//!   whose children are the rendered content.
//! - `typeof="mw:Extension/references"`: an author-placed reference list.
//!   Markers inside it define entries instead of citing them.
//! - HTML embedded in data attributes (captions, expanded attributes,
//!   extension bodies) is parsed, walked and serialized back.
//!
//! ## Output
//!
//! ```html
//! <sup about="#mwt1" class="mw-ref reference" id="cite_ref-1" rel="dc:references"
//!      typeof="mw:Extension/ref"><a href="./Main_Page#cite_note-1"
//!      style="counter-reset: mw-Ref 1;"><span class="mw-reflink-text">[1]</span></a></sup>
//! ```
//!
//! Reference lists are rendered as soon as their markers are resolved; see
//! [`crate::render`].

use crate::entry::Direction;
use crate::error::{CiteError, Result};
use crate::registry::ReferenceRegistry;
use crate::render::insert_references_into_dom;
use crate::report::{RefError, RefErrorKind, add_errors_to_node, report};
use selser_dom::{
    DataMwBody, DataParsoid, Document, ExtensionRegistry, NodeId, NodeKind, SerializeOptions,
    process_attribute_embedded_html,
};
use selser_error_reporting::{DiagnosticKind, DiagnosticMessageBuilder};
use selser_source_map::OffsetSpan;

/// Resolve every citation marker in `doc` and render every author-placed
/// reference list.
///
/// Run [`crate::insert_missing_references`] afterwards for citations that
/// no list picked up, then [`crate::flush_deferred_errors`].
///
/// # Errors
///
/// Fails if a marker points at content that is not in the content store.
/// Problems with how citations are used are recorded on the document
/// instead.
pub fn process_references(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &mut ReferenceRegistry,
) -> Result<()> {
    doc.set_max_nesting_depth(registry.config().max_nesting_depth);
    tracing::debug!("extracting citations");
    let root = doc.root();
    process_refs(doc, extensions, registry, root)?;
    tracing::debug!(
        pending_groups = registry.group_names().len(),
        "finished extracting citations"
    );
    Ok(())
}

pub(crate) fn process_refs(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &mut ReferenceRegistry,
    node: NodeId,
) -> Result<()> {
    // Pre-order over plain nesting with an explicit stack. Each entry keeps
    // the parent the node was found under.
    let mut stack = child_frames(doc, node);
    while let Some((child, parent)) = stack.pop() {
        // Hoisting may have moved a later sibling out of its parent
        if doc.parent(child) != Some(parent) {
            continue;
        }
        match doc.classify(child) {
            NodeKind::Text | NodeKind::Comment | NodeKind::Fragment => {}
            NodeKind::SealedFragment { ext } if ext == "ref" => {
                extract_ref_from_node(doc, extensions, registry, child)?;
            }
            NodeKind::ExtensionOutput { ext } if ext == "references" => {
                process_references_list(doc, extensions, registry, child)?;
            }
            NodeKind::SealedFragment { .. }
            | NodeKind::ExtensionOutput { .. }
            | NodeKind::TransclusionWrapper
            | NodeKind::ExpandedAttrs
            | NodeKind::LanguageVariant
            | NodeKind::InlineMedia
            | NodeKind::Plain => {
                registry.push_context(None);
                let result = process_embedded(doc, extensions, registry, child);
                registry.pop_context();
                result?;
                stack.extend(child_frames(doc, child));
            }
        }
    }
    Ok(())
}

/// Children of `node`, last first, paired with `node`.
fn child_frames(doc: &Document, node: NodeId) -> Vec<(NodeId, NodeId)> {
    doc.children(node).iter().rev().map(|&c| (c, node)).collect()
}

fn process_references_list(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &mut ReferenceRegistry,
    list: NodeId,
) -> Result<()> {
    if !registry.in_references_content() {
        registry.references_group = doc.data_parsoid(list).group.clone().unwrap_or_default();
    }
    registry.push_context(Some("references"));
    let result = if doc.has_children(list) {
        descend(doc, registry, list, |doc, registry| {
            process_refs(doc, extensions, registry, list)
        })
    } else {
        Ok(())
    };
    registry.pop_context();
    result?;

    // Nested lists are rendered by the outermost one
    if !registry.in_references_content() {
        registry.references_group.clear();
        insert_references_into_dom(doc, registry, list, false);
    }
    Ok(())
}

/// Extract citations from the HTML embedded in `elt`'s data attributes.
fn process_embedded(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &mut ReferenceRegistry,
    elt: NodeId,
) -> Result<()> {
    let mut failure: Option<CiteError> = None;
    process_attribute_embedded_html(doc, extensions, elt, &mut |doc: &mut Document, html: &str| {
        if failure.is_some() {
            return html.to_string();
        }
        match process_embedded_refs(doc, extensions, registry, elt, html) {
            Ok(processed) => processed,
            Err(err) => {
                failure = Some(err);
                html.to_string()
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn process_embedded_refs(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &mut ReferenceRegistry,
    owner: NodeId,
    html: &str,
) -> Result<String> {
    let mut out = html.to_string();
    descend(doc, registry, owner, |doc, registry| {
        let fragment = match doc.parse_fragment(html) {
            Ok(fragment) => fragment,
            Err(err) => {
                tracing::debug!(node = %owner, error = %err, "leaving unparseable embedded HTML untouched");
                doc.diagnostics_mut().add_diagnostic(err.to_diagnostic());
                return Ok(());
            }
        };
        process_refs(doc, extensions, registry, fragment)?;
        out = doc.serialize(fragment, SerializeOptions::inner().verbatim());
        Ok(())
    })?;
    Ok(out)
}

/// Run `f` one nesting level deeper, or report and skip it if the cap has
/// been reached.
fn descend<F>(doc: &mut Document, registry: &mut ReferenceRegistry, node: NodeId, f: F) -> Result<()>
where
    F: FnOnce(&mut Document, &mut ReferenceRegistry) -> Result<()>,
{
    let limit = registry.config().max_nesting_depth;
    if registry.depth >= limit {
        tracing::warn!(node = %node, limit, "citations nested too deeply; not descending");
        doc.diagnostics_mut().add_diagnostic(
            DiagnosticMessageBuilder::from_catalog(DiagnosticKind::Warning, "C-4-3")
                .add_detail(format!("The limit is {} levels", limit))
                .build(),
        );
        return Ok(());
    }
    registry.depth += 1;
    let result = f(doc, registry);
    registry.depth -= 1;
    result
}

/// True if any descendant of `node` is a sealed citation marker.
fn has_ref(doc: &Document, node: NodeId) -> bool {
    doc.descendants(node)
        .into_iter()
        .any(|n| doc.is_sealed_fragment_of_type(n, "ref"))
}

fn first_element_child(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.children(node).iter().copied().find(|&n| doc.is_element(n))
}

/// Mark output that was moved out of a link.
fn set_misnested(doc: &mut Document, node: NodeId, offset: Option<usize>) {
    let dp = doc.data_parsoid_mut(node);
    dp.misnested = true;
    dp.dsr = Some(OffsetSpan::collapsed(offset));
}

fn extract_ref_from_node(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &mut ReferenceRegistry,
    node: NodeId,
) -> Result<()> {
    let node_dp = doc.data_parsoid(node).clone();
    let is_tpl_wrapper = doc.has_type_of(node, "mw:Transclusion");
    let tpl_dmw = if is_tpl_wrapper {
        doc.data_mw(node).cloned()
    } else {
        None
    };

    let content_id = node_dp
        .html
        .clone()
        .ok_or_else(|| CiteError::MissingContentId(node.to_string()))?;
    let fragment = doc
        .fragment(&content_id)
        .ok_or_else(|| CiteError::UnknownFragment(content_id.clone()))?;
    let c = first_element_child(doc, fragment)
        .ok_or_else(|| CiteError::MalformedContent(content_id.clone()))?;
    let c_dp = doc.data_parsoid(c).clone();
    let mut ref_dmw = doc.data_mw(c).cloned().unwrap_or_default();

    let about = doc
        .attr(node, "about")
        .or_else(|| doc.attr(c, "about"))
        .map(str::to_string);

    let group_attr = ref_dmw.attr("group").map(str::to_string);
    let group_name = group_attr
        .clone()
        .unwrap_or_else(|| registry.references_group.clone());
    let ref_name = ref_dmw.attr("name").unwrap_or_default().to_string();
    let follow_name = ref_dmw.attr("follow").unwrap_or_default().to_string();
    let dir_attr = ref_dmw.attr("dir").map(str::to_string);
    let ref_dir = Direction::parse(dir_attr.as_deref().unwrap_or_default());
    let has_ref_name = !ref_name.is_empty();
    let has_follow = !follow_name.is_empty();

    let mut errs = Vec::new();
    if registry.in_references_content() && group_name != registry.references_group {
        errs.push(
            RefError::new(RefErrorKind::GroupMismatch).with_param(group_attr.unwrap_or_default()),
        );
    }

    let link_back = doc.create_element("sup");

    if has_follow {
        let span = doc.create_element("span");
        doc.add_type_of(span, "mw:Cite/Follow");
        if let Some(about) = &about {
            doc.set_attr(span, "about", about.as_str());
        }
        let space = doc.create_text(" ");
        doc.append_child(span, space);
        doc.migrate_children(c, span);
        doc.append_child(c, span);
    }

    let mut position = None;
    let mut valid_follow = false;
    let mut html = String::new();
    let mut content_differs = false;

    if has_ref_name {
        if has_follow {
            errs.push(RefError::new(RefErrorKind::TooManyKeys));
        }
        let existing = registry
            .group(&group_name)
            .and_then(|g| g.position(&ref_name));
        if let Some(pos) = existing {
            position = Some(pos);
            let canonical = registry
                .group(&group_name)
                .and_then(|g| g.entry(pos))
                .and_then(|e| e.content_id.clone());
            if let Some(canonical) = canonical {
                let cached = doc
                    .fragment(&canonical)
                    .and_then(|f| first_element_child(doc, f))
                    .map(|n| doc.inner_html(n));
                let entry = registry.entry_mut(&group_name, pos);
                if let Some(entry) = entry {
                    if entry.cached_html.is_none() {
                        entry.cached_html = cached;
                    }
                    html = doc.inner_html(c);
                    content_differs = entry.cached_html.as_deref() != Some(html.as_str());
                }
            }
        } else if registry.in_references_content() {
            errs.push(RefError::new(RefErrorKind::ReferencesMissingKey).with_param(ref_name.as_str()));
        }
    } else if has_follow {
        let target = registry
            .group(&group_name)
            .and_then(|g| g.position(&follow_name));
        match target {
            Some(pos) => {
                valid_follow = true;
                position = Some(pos);
            }
            None => {
                errs.push(
                    RefError::new(RefErrorKind::MissingFollowTarget).with_param(follow_name.as_str()),
                );
            }
        }
    } else if registry.in_references_content() {
        errs.push(RefError::new(RefErrorKind::ReferencesNoKey));
    }

    // Inner citations are resolved before this one's content is final
    if !c_dp.empty && has_ref(doc, c) {
        if content_differs {
            registry.push_context(None);
        }
        let result = descend(doc, registry, c, |doc, registry| {
            process_refs(doc, extensions, registry, c)
        });
        if content_differs {
            registry.pop_context();
        }
        result?;
        if content_differs {
            html = doc.inner_html(c);
        }
    }

    let in_embedded = registry.in_embedded_content();
    let pos = match position {
        Some(pos) if valid_follow => {
            let target_content = registry
                .group(&group_name)
                .and_then(|g| g.entry(pos))
                .and_then(|e| e.content_id.clone())
                .and_then(|id| doc.fragment(&id))
                .and_then(|f| first_element_child(doc, f));
            if let Some(target_content) = target_content {
                doc.migrate_children(c, target_content);
            }
            pos
        }
        _ => {
            let pos = match position {
                Some(pos) => pos,
                None => registry.add(&group_name, &ref_name),
            };
            if let Some(entry) = registry.entry_mut(&group_name, pos) {
                if in_embedded {
                    if let Some(about) = &about {
                        entry.embedded_nodes.push(about.clone());
                    }
                } else {
                    entry.add_linkback(link_back);
                }
            }
            pos
        }
    };

    let entry = registry
        .group(&group_name)
        .and_then(|g| g.entry(pos))
        .cloned()
        .ok_or_else(|| CiteError::MalformedContent(content_id.clone()))?;

    if let Some(dir) = &dir_attr {
        if ref_dir == Direction::Unset {
            errs.push(RefError::new(RefErrorKind::InvalidDir).with_param(dir.as_str()));
        }
    }
    if has_ref_name && ref_name.chars().all(|ch| ch.is_ascii_digit()) {
        errs.push(RefError::new(RefErrorKind::NumericKey));
    }

    let extsrc = ref_dmw
        .body
        .as_ref()
        .and_then(|b| b.extsrc.clone())
        .unwrap_or_default();
    let missing_content = c_dp.empty || extsrc.trim().is_empty();

    if missing_content {
        if registry.in_references_content() {
            errs.push(RefError::new(RefErrorKind::EmptyReferencesDefine).with_param(ref_name.as_str()));
        } else if !has_ref_name {
            let kind = if c_dp.self_close {
                RefErrorKind::RefNoKey
            } else {
                RefErrorKind::RefNoInput
            };
            errs.push(RefError::new(kind));
        }

        if c_dp.self_close {
            ref_dmw.body = None;
        } else {
            // Content would be empty html anyway
            doc.clear_children(c);
            ref_dmw.body = Some(DataMwBody::html(extsrc));
        }
    } else {
        if entry.content_id.is_some() && !valid_follow {
            doc.clear_children(c);
        }
        if content_differs {
            // Every differing occurrence keeps its own content for round trip
            errs.push(RefError::new(RefErrorKind::DuplicateKey).with_param(ref_name.as_str()));
            ref_dmw.body = Some(DataMwBody::html(html));
        } else {
            ref_dmw.body = Some(DataMwBody::id(format!("mw-reference-text-{}", entry.target)));
        }
    }

    if let Some(about) = &about {
        doc.set_attr(link_back, "about", about.as_str());
    }
    let class = if valid_follow {
        "mw-ref reference mw-ref-follow"
    } else {
        "mw-ref reference"
    };
    doc.set_attr(link_back, "class", class);
    if !(in_embedded || valid_follow) {
        let id = if entry.is_named() {
            entry.linkbacks.last().cloned()
        } else {
            entry.id.clone()
        };
        if let Some(id) = id {
            doc.set_attr(link_back, "id", id);
        }
    }
    doc.set_attr(link_back, "rel", "dc:references");
    if let Some(type_of) = doc.attr(node, "typeof").map(str::to_string) {
        doc.set_attr(link_back, "typeof", type_of);
    }
    doc.remove_type_of(link_back, "mw:DOMFragment/sealed/ref");
    doc.add_type_of(link_back, "mw:Extension/ref");

    doc.set_data_parsoid(
        link_back,
        DataParsoid {
            src: node_dp.src.clone(),
            dsr: node_dp.dsr,
            pi: node_dp.pi.clone(),
            ..DataParsoid::default()
        },
    );
    let link_dmw = if is_tpl_wrapper {
        tpl_dmw.unwrap_or_default()
    } else {
        ref_dmw
    };
    doc.set_data_mw(link_back, Some(link_dmw));

    if !errs.is_empty() {
        add_errors_to_node(doc, link_back, &errs);
        report(doc, &errs, node_dp.dsr);
    }

    let ref_link = doc.create_element("a");
    doc.set_attr(
        ref_link,
        "href",
        format!("{}#{}", registry.config().page_uri, entry.target),
    );
    doc.set_attr(
        ref_link,
        "style",
        format!("counter-reset: mw-Ref {};", entry.group_index),
    );
    if !entry.group.is_empty() {
        doc.set_attr(ref_link, "data-mw-group", entry.group.as_str());
    }
    let ref_link_span = doc.create_element("span");
    doc.set_attr(ref_link_span, "class", "mw-reflink-text");
    let label = doc.create_text(entry.link_text());
    doc.append_child(ref_link_span, label);
    doc.append_child(ref_link, ref_link_span);
    doc.append_child(link_back, ref_link);

    // A link cannot contain another link: hoist the citation out
    match doc.find_ancestor_named(node, "a") {
        Some(link) => {
            let mut insertion = doc.next_sibling(link);
            while let Some(n) = insertion {
                if doc.is_element_named(n, "sup") && doc.data_parsoid(n).misnested {
                    insertion = doc.next_sibling(n);
                } else {
                    break;
                }
            }
            if let Some(parent) = doc.parent(link) {
                doc.insert_before(parent, link_back, insertion);
            }
            let offset = doc.data_parsoid(link).dsr.and_then(|dsr| dsr.end());
            for n in [link_back, ref_link, ref_link_span] {
                set_misnested(doc, n, offset);
            }
            if let Some(link_about) = doc.attr(link, "about").map(str::to_string) {
                doc.set_attr(link_back, "about", link_about);
            }
            doc.detach(node);
        }
        None => doc.replace_with(node, link_back),
    }

    let entry = registry.entry_mut(&group_name, pos);
    match entry {
        Some(entry) if entry.content_id.is_none() && !missing_content => {
            entry.content_id = Some(content_id);
            entry.dir = ref_dir;
        }
        _ => {
            doc.detach(c);
            doc.clear_fragment(&content_id);
        }
    }
    Ok(())
}
