/*
 * handlers.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Extension tag handlers for citations and reference lists.
 */

use crate::config::CiteConfig;
use crate::render::{ReferencesOptions, create_references};
use crate::report::{RefError, RefErrorKind, add_errors_to_node, report};
use indexmap::IndexMap;
use selser_dom::{
    DataMw, Document, EmbeddedHtmlProc, ExtensionRegistry, ExtensionTagHandler, NodeId,
    process_body_html,
};

const REFERENCES_PARAMS: &[&str] = &["group", "responsive"];

/// Handler for `ref` output: the citation content kept inline in
/// `data-mw.body.html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefTagHandler;

impl ExtensionTagHandler for RefTagHandler {
    fn embeds_html_in_attributes(&self) -> bool {
        true
    }

    fn process_attribute_embedded_html(
        &self,
        doc: &mut Document,
        elt: NodeId,
        proc: &mut EmbeddedHtmlProc<'_>,
    ) {
        process_body_html(doc, elt, proc);
    }
}

/// Handler for `references` output: the nested citations recorded in
/// `data-mw.body.html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferencesTagHandler;

impl ExtensionTagHandler for ReferencesTagHandler {
    fn embeds_html_in_attributes(&self) -> bool {
        true
    }

    fn process_attribute_embedded_html(
        &self,
        doc: &mut Document,
        elt: NodeId,
        proc: &mut EmbeddedHtmlProc<'_>,
    ) {
        process_body_html(doc, elt, proc);
    }
}

impl ReferencesTagHandler {
    /// Build an author-placed reference list around the already parsed
    /// children of `content`.
    ///
    /// `attrs` are the tag's attributes; anything other than `group` and
    /// `responsive` is reported. `src` is the tag's source text and
    /// `self_closed` whether it had no body.
    pub fn build_list(
        doc: &mut Document,
        config: &CiteConfig,
        content: NodeId,
        attrs: &IndexMap<String, String>,
        src: Option<&str>,
        self_closed: bool,
    ) -> NodeId {
        let opts = ReferencesOptions {
            group: attrs.get("group").cloned(),
            responsive: attrs.get("responsive").cloned(),
        };
        let frag = create_references(doc, config, Some(content), &opts, false);

        doc.add_type_of(frag, "mw:Extension/references");
        let about = doc.new_about_id();
        doc.set_attr(frag, "about", about);
        let mut dmw = DataMw::extension("references");
        dmw.attrs = Some(attrs.clone());
        doc.set_data_mw(frag, Some(dmw));

        let dp = doc.data_parsoid_mut(frag);
        dp.src = src.map(str::to_string);
        dp.self_close = self_closed;

        let unknown = attrs
            .keys()
            .any(|k| !REFERENCES_PARAMS.contains(&k.to_ascii_lowercase().as_str()));
        if unknown {
            let errs = [RefError::new(RefErrorKind::InvalidParameters)];
            add_errors_to_node(doc, frag, &errs);
            let location = doc.data_parsoid(frag).dsr;
            report(doc, &errs, location);
        }

        frag
    }

    /// True for output the serializer should drop: lists generated for a
    /// named group the author never placed.
    pub fn is_suppressed_on_roundtrip(doc: &Document, node: NodeId) -> bool {
        doc.data_mw(node).is_some_and(|dmw| {
            dmw.auto_generated && !dmw.attr("group").unwrap_or_default().is_empty()
        })
    }
}

/// Register the `ref` and `references` handlers.
pub fn register_cite_handlers(extensions: &mut ExtensionRegistry) {
    extensions.register("ref", Box::new(RefTagHandler));
    extensions.register("references", Box::new(ReferencesTagHandler));
}

/// A registry with only the citation handlers.
pub fn cite_extensions() -> ExtensionRegistry {
    let mut extensions = ExtensionRegistry::new();
    register_cite_handlers(&mut extensions);
    extensions
}
