//! Offset remapping over a whole tree.
//!
//! Every element may carry up to three source ranges: its `dsr`, the
//! `ext_tag_offsets` of an extension tag, and a scratch `orig_dsr`. The walk
//! here reaches all of them, including those inside attribute-embedded HTML
//! (parsed, walked and re-serialized) and inside sealed fragments (walked in
//! the content store).
//!
//! Two operations are built on the walk:
//! - [`shift_offsets`] applies a span transform to every range.
//! - [`convert_offset_numbering`] changes the unit offsets are counted in,
//!   in two passes: collect every distinct offset, convert the batch once,
//!   then rewrite each range from the lookup table.

use crate::document::Document;
use crate::error::{DomError, Result};
use crate::extension::{ExtensionRegistry, process_attribute_embedded_html};
use crate::node::NodeId;
use crate::serialize::SerializeOptions;
use indexmap::IndexSet;
use selser_error_reporting::{DiagnosticKind, DiagnosticMessageBuilder};
use selser_source_map::{OffsetSpan, OffsetType, convert_offsets};
use std::collections::HashMap;

/// Receives every valid span in the tree and returns its replacement.
///
/// Returning `None` removes the span.
pub trait SpanVisitor {
    fn visit(&mut self, span: OffsetSpan) -> Option<OffsetSpan>;
}

impl<F> SpanVisitor for F
where
    F: FnMut(OffsetSpan) -> Option<OffsetSpan>,
{
    fn visit(&mut self, span: OffsetSpan) -> Option<OffsetSpan> {
        self(span)
    }
}

/// First pass of a numbering conversion: the distinct offsets of every span,
/// in first-seen order.
#[derive(Debug, Default)]
pub struct OffsetCollector {
    offsets: IndexSet<usize>,
}

impl OffsetCollector {
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Convert the collected offsets in one batch and build the lookup table.
    pub fn into_applier(self, source: &str, from: OffsetType, to: OffsetType) -> OffsetApplier {
        let mut converted: Vec<usize> = self.offsets.iter().copied().collect();
        convert_offsets(source, from, to, &mut converted);
        OffsetApplier {
            table: self.offsets.into_iter().zip(converted).collect(),
        }
    }
}

impl SpanVisitor for OffsetCollector {
    fn visit(&mut self, span: OffsetSpan) -> Option<OffsetSpan> {
        if let Some(start) = span.start() {
            self.offsets.insert(start);
            self.offsets.extend(span.inner_start());
        }
        if let Some(end) = span.end() {
            self.offsets.extend(span.inner_end());
            self.offsets.insert(end);
        }
        Some(span)
    }
}

/// Second pass of a numbering conversion: rewrites spans from the table.
///
/// Widths are recomputed from the converted inner and outer bounds rather
/// than converted on their own.
#[derive(Debug, Default)]
pub struct OffsetApplier {
    table: HashMap<usize, usize>,
}

impl OffsetApplier {
    fn lookup(&self, offset: usize) -> usize {
        self.table.get(&offset).copied().unwrap_or(offset)
    }
}

impl SpanVisitor for OffsetApplier {
    fn visit(&mut self, span: OffsetSpan) -> Option<OffsetSpan> {
        let mut open_width = span.open_width();
        let start = span.start().map(|s| {
            let converted = self.lookup(s);
            if let Some(inner) = span.inner_start() {
                open_width = self.lookup(inner).saturating_sub(converted);
            }
            converted
        });
        let mut close_width = span.close_width();
        let end = span.end().map(|e| {
            let converted = self.lookup(e);
            if let Some(inner) = span.inner_end() {
                close_width = converted.saturating_sub(self.lookup(inner));
            }
            converted
        });
        Some(OffsetSpan::from_parts(start, end, open_width, close_width))
    }
}

/// Apply `f` to every span under `root`. A `None` result removes the span.
///
/// Returns `root` to allow chaining.
pub fn shift_offsets<F>(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    root: NodeId,
    mut f: F,
) -> NodeId
where
    F: FnMut(OffsetSpan) -> Option<OffsetSpan>,
{
    walk_node(doc, extensions, root, &mut f, 0);
    root
}

/// Move every span under `root` by `delta`. Spans that would start before
/// offset zero are removed.
pub fn shift_offsets_by(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    root: NodeId,
    delta: isize,
) -> NodeId {
    shift_offsets(doc, extensions, root, |span| span.shifted(delta))
}

/// Apply an arbitrary visitor to every span under `root`.
pub fn visit_offsets(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    root: NodeId,
    visitor: &mut dyn SpanVisitor,
) {
    walk_node(doc, extensions, root, visitor, 0);
}

/// Convert every span in the document from `from` units to `to` units.
///
/// Does nothing beyond recording `to` as the document's offset type when the
/// two are equal or the tree holds no offsets.
///
/// # Errors
///
/// Returns [`DomError::MissingSource`] if the tree holds offsets but the
/// document has no source text to convert them against.
pub fn convert_offset_numbering(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    from: OffsetType,
    to: OffsetType,
) -> Result<()> {
    if from == to {
        doc.set_offset_type(to);
        return Ok(());
    }

    let root = doc.root();
    let mut collector = OffsetCollector::default();
    walk_node(doc, extensions, root, &mut collector, 0);
    if collector.is_empty() {
        doc.set_offset_type(to);
        return Ok(());
    }

    let collected = collector.len();
    let mut applier = {
        let source = doc.source().ok_or(DomError::MissingSource)?;
        collector.into_applier(source, from, to)
    };
    walk_node(doc, extensions, root, &mut applier, 0);
    doc.set_offset_type(to);

    tracing::debug!(offsets = collected, %from, %to, "converted offset numbering");
    Ok(())
}

/// Validate a span and pass it to the visitor. Malformed spans are removed
/// and reported instead.
fn remap_span(
    doc: &mut Document,
    id: NodeId,
    span: OffsetSpan,
    visitor: &mut dyn SpanVisitor,
) -> Option<OffsetSpan> {
    match span.validate() {
        Ok(()) => visitor.visit(span),
        Err(err) => {
            tracing::debug!(node = %id, error = %err, "clearing malformed source range");
            doc.diagnostics_mut().add_diagnostic(
                DiagnosticMessageBuilder::from_catalog(DiagnosticKind::Warning, "C-4-1")
                    .add_detail(err.to_string())
                    .build(),
            );
            None
        }
    }
}

fn walk_node(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    id: NodeId,
    visitor: &mut dyn SpanVisitor,
    depth: usize,
) {
    // Children before their parent. Element nesting is unbounded, so this
    // walks with an explicit stack; `depth` only counts embedded levels.
    let mut stack = vec![(id, false)];
    while let Some((node, children_done)) = stack.pop() {
        if children_done {
            if doc.is_element(node) {
                convert_node(doc, extensions, node, visitor, depth);
            }
            continue;
        }
        stack.push((node, true));
        stack.extend(doc.children(node).iter().rev().map(|&c| (c, false)));
    }
}

fn convert_node(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    id: NodeId,
    visitor: &mut dyn SpanVisitor,
    depth: usize,
) {
    let dsr = doc.data_parsoid(id).dsr;
    if let Some(span) = dsr {
        let new = remap_span(doc, id, span, visitor);
        if new != dsr {
            doc.data_parsoid_mut(id).dsr = new;
        }
    }

    // Scratch data is never stored, so changing it does not dirty the node
    let orig = doc.data_parsoid(id).tmp.orig_dsr;
    if let Some(span) = orig {
        let new = remap_span(doc, id, span, visitor);
        doc.node_mut(id).dp.tmp.orig_dsr = new;
    }

    let ext_offsets = doc.data_parsoid(id).ext_tag_offsets;
    if let Some(span) = ext_offsets {
        let new = remap_span(doc, id, span, visitor);
        if new != ext_offsets {
            doc.data_parsoid_mut(id).ext_tag_offsets = new;
        }
    }

    process_attribute_embedded_html(doc, extensions, id, &mut |doc: &mut Document, html: &str| {
        convert_string(doc, extensions, html, visitor, depth + 1)
    });

    if doc.sealed_fragment_type(id).is_some() {
        let content = doc
            .data_parsoid(id)
            .html
            .as_deref()
            .and_then(|content_id| doc.fragment(content_id));
        if let Some(content) = content {
            if depth + 1 > doc.max_nesting_depth() {
                report_too_deep(doc, id);
            } else {
                walk_node(doc, extensions, content, visitor, depth + 1);
            }
        }
    }
}

fn convert_string(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    html: &str,
    visitor: &mut dyn SpanVisitor,
    depth: usize,
) -> String {
    if depth > doc.max_nesting_depth() {
        let root = doc.root();
        report_too_deep(doc, root);
        return html.to_string();
    }
    let fragment = match doc.parse_fragment(html) {
        Ok(fragment) => fragment,
        Err(err) => {
            tracing::debug!(error = %err, "leaving unparseable embedded HTML untouched");
            doc.diagnostics_mut().add_diagnostic(err.to_diagnostic());
            return html.to_string();
        }
    };
    walk_node(doc, extensions, fragment, visitor, depth);
    doc.serialize(fragment, SerializeOptions::inner().verbatim())
}

fn report_too_deep(doc: &mut Document, id: NodeId) {
    let limit = doc.max_nesting_depth();
    tracing::warn!(node = %id, limit, "embedded content nested too deeply; not descending");
    doc.diagnostics_mut().add_diagnostic(
        DiagnosticMessageBuilder::from_catalog(DiagnosticKind::Warning, "C-4-3")
            .add_detail(format!("The limit is {} levels", limit))
            .build(),
    );
}
