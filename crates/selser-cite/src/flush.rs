/*
 * flush.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Final pass that attaches errors to citation links in embedded HTML.
 */

//! Deferred error flushing.
//!
//! Citation links inside embedded HTML are serialized back into their data
//! attribute as soon as extraction leaves that HTML, so errors found later
//! (a named entry that never got content) cannot be attached to them at
//! that point. The registry keeps those errors by about id; this pass parses
//! every embedded HTML string again, in the same order as extraction, and
//! attaches them.

use crate::registry::ReferenceRegistry;
use crate::report::add_errors_to_node;
use selser_dom::{
    Document, ExtensionRegistry, NodeId, SerializeOptions, process_attribute_embedded_html,
    process_body_html,
};
use selser_error_reporting::{DiagnosticKind, DiagnosticMessageBuilder};

/// Attach every deferred error to its citation link.
///
/// Does nothing if no errors were deferred.
pub fn flush_deferred_errors(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &ReferenceRegistry,
) {
    if !registry.has_deferred_errors() {
        return;
    }
    tracing::debug!("attaching deferred citation errors");
    let root = doc.root();
    add_embedded_errors(doc, extensions, registry, root, 0);
}

fn add_embedded_errors(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &ReferenceRegistry,
    node: NodeId,
    depth: usize,
) {
    // Pre-order, as in extraction, with an explicit stack for plain nesting
    let mut stack: Vec<NodeId> = doc.children(node).iter().rev().copied().collect();
    while let Some(child) = stack.pop() {
        if !doc.is_element(child) {
            continue;
        }
        let mut proc = |doc: &mut Document, html: &str| {
            flush_string(doc, extensions, registry, html, depth + 1)
        };
        if doc.has_type_of(child, "mw:Extension/ref") {
            process_body_html(doc, child, &mut proc);
            let errs = doc
                .attr(child, "about")
                .and_then(|about| registry.deferred_errors(about));
            if let Some(errs) = errs {
                add_errors_to_node(doc, child, errs);
            }
        } else if doc.has_type_of(child, "mw:Extension/references") {
            process_body_html(doc, child, &mut proc);
        } else {
            process_attribute_embedded_html(doc, extensions, child, &mut proc);
        }
        stack.extend(doc.children(child).iter().rev().copied());
    }
}

fn flush_string(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    registry: &ReferenceRegistry,
    html: &str,
    depth: usize,
) -> String {
    let limit = registry.config().max_nesting_depth;
    if depth > limit {
        tracing::warn!(limit, "embedded content nested too deeply; not descending");
        doc.diagnostics_mut().add_diagnostic(
            DiagnosticMessageBuilder::from_catalog(DiagnosticKind::Warning, "C-4-3")
                .add_detail(format!("The limit is {} levels", limit))
                .build(),
        );
        return html.to_string();
    }
    let fragment = match doc.parse_fragment(html) {
        Ok(fragment) => fragment,
        Err(err) => {
            // Already reported by extraction
            tracing::debug!(error = %err, "leaving unparseable embedded HTML untouched");
            return html.to_string();
        }
    };
    add_embedded_errors(doc, extensions, registry, fragment, depth);
    doc.serialize(fragment, SerializeOptions::inner().verbatim())
}
