//! Extension tag handlers and attribute-embedded HTML.
//!
//! Some markup is not stored as children but as HTML strings inside data
//! attributes: template-expanded attributes, language variant text, media
//! captions, and extension bodies. Passes that must see every node (offset
//! remapping, citation extraction) reach that content through
//! [`process_attribute_embedded_html`].

use crate::data::AttribPart;
use crate::document::Document;
use crate::node::NodeId;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Callback that receives one embedded HTML string and returns its
/// replacement.
pub type EmbeddedHtmlProc<'a> = dyn FnMut(&mut Document, &str) -> String + 'a;

/// Behaviour an extension contributes to tree passes.
pub trait ExtensionTagHandler {
    /// Whether this extension's output keeps HTML in its data attributes.
    fn embeds_html_in_attributes(&self) -> bool {
        false
    }

    /// Run `proc` over every HTML string this extension embeds in `elt`.
    ///
    /// Only called when [`embeds_html_in_attributes`](Self::embeds_html_in_attributes)
    /// returns true.
    fn process_attribute_embedded_html(
        &self,
        _doc: &mut Document,
        _elt: NodeId,
        _proc: &mut EmbeddedHtmlProc<'_>,
    ) {
    }
}

/// Extension handlers keyed by tag name.
#[derive(Default)]
pub struct ExtensionRegistry {
    handlers: IndexMap<String, Box<dyn ExtensionTagHandler>>,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn ExtensionTagHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ExtensionTagHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

/// Run `proc` over every HTML string embedded in the data attributes of
/// `elt`, writing changed strings back.
///
/// Visit order is fixed: expanded attributes, then language variant text,
/// then an inline media caption, then the extension's own embedded HTML.
pub fn process_attribute_embedded_html(
    doc: &mut Document,
    extensions: &ExtensionRegistry,
    elt: NodeId,
    proc: &mut EmbeddedHtmlProc<'_>,
) {
    if !doc.has_attr(elt, "typeof") {
        return;
    }

    if doc.has_type_of(elt, "mw:ExpandedAttrs") {
        process_expanded_attrs(doc, elt, proc);
    }

    if doc.has_type_of(elt, "mw:LanguageVariant") {
        process_language_variant(doc, elt, proc);
    }

    if doc.is_inline_media(elt) {
        let caption = doc.data_mw(elt).and_then(|dmw| dmw.caption.clone());
        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            let processed = proc(doc, &caption);
            if processed != caption {
                doc.data_mw_mut(elt).caption = Some(processed);
            }
        }
    }

    let handler = doc
        .ext_tag_name(elt)
        .and_then(|name| extensions.get(name))
        .filter(|h| h.embeds_html_in_attributes());
    if let Some(handler) = handler {
        handler.process_attribute_embedded_html(doc, elt, proc);
    }
}

/// Run `proc` over `data-mw.body.html`, the usual home of an extension's
/// embedded HTML.
pub fn process_body_html(doc: &mut Document, elt: NodeId, proc: &mut EmbeddedHtmlProc<'_>) {
    let Some(html) = doc
        .data_mw(elt)
        .and_then(|dmw| dmw.body_html())
        .map(str::to_string)
    else {
        return;
    };
    let processed = proc(doc, &html);
    if processed != html {
        if let Some(body) = doc.data_mw_mut(elt).body.as_mut() {
            body.html = Some(processed);
        }
    }
}

fn process_expanded_attrs(doc: &mut Document, elt: NodeId, proc: &mut EmbeddedHtmlProc<'_>) {
    let Some(attribs) = doc.data_mw(elt).map(|dmw| dmw.attribs.clone()) else {
        return;
    };
    let mut updated = attribs.clone();
    for (k, v) in updated.iter_mut() {
        for part in [k, v] {
            if let AttribPart::Rich(rich) = part {
                if let Some(html) = rich.html.take() {
                    rich.html = Some(proc(doc, &html));
                }
            }
        }
    }
    if updated != attribs {
        doc.data_mw_mut(elt).attribs = updated;
    }
}

fn process_language_variant(doc: &mut Document, elt: NodeId, proc: &mut EmbeddedHtmlProc<'_>) {
    let Some(raw) = doc.attr(elt, "data-mw-variant").map(str::to_string) else {
        return;
    };
    let mut variant: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(err) => {
            tracing::debug!(node = %elt, error = %err, "skipping unreadable data-mw-variant");
            return;
        }
    };

    let mut changed = false;
    let mut apply = |doc: &mut Document, slot: Option<&mut Value>| {
        if let Some(Value::String(s)) = slot {
            let processed = proc(doc, s);
            if processed != *s {
                *s = processed;
                changed = true;
            }
        }
    };

    apply(doc, variant.pointer_mut("/disabled/t"));
    if let Some(Value::Array(items)) = variant.get_mut("twoway") {
        for item in items.iter_mut() {
            apply(doc, item.get_mut("t"));
        }
    }
    if let Some(Value::Array(items)) = variant.get_mut("oneway") {
        for item in items.iter_mut() {
            apply(doc, item.get_mut("f"));
            apply(doc, item.get_mut("t"));
        }
    }
    apply(doc, variant.pointer_mut("/filter/t"));

    if changed {
        match serde_json::to_string(&variant) {
            Ok(json) => doc.set_attr(elt, "data-mw-variant", json),
            Err(err) => {
                tracing::error!(node = %elt, error = %err, "failed to store data-mw-variant");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(_doc: &mut Document, html: &str) -> String {
        html.to_uppercase()
    }

    fn first(doc: &Document) -> NodeId {
        doc.first_child(doc.root()).unwrap()
    }

    #[test]
    fn test_expanded_attrs() {
        let mut doc = Document::from_html(
            r#"<a typeof="mw:ExpandedAttrs" data-mw='{"attribs":[[{"txt":"href"},{"html":"&lt;b&gt;x&lt;/b&gt;"}]]}'></a>"#,
        )
        .unwrap();
        let a = first(&doc);
        process_attribute_embedded_html(&mut doc, &ExtensionRegistry::new(), a, &mut upper);
        match &doc.data_mw(a).unwrap().attribs[0].1 {
            AttribPart::Rich(rich) => assert_eq!(rich.html.as_deref(), Some("<B>X</B>")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_language_variant_order() {
        let mut doc = Document::from_html(
            r#"<span typeof="mw:LanguageVariant" data-mw-variant='{"twoway":[{"l":"en","t":"a"}],"oneway":[{"f":"b","l":"x","t":"c"}],"filter":{"t":"d"}}'></span>"#,
        )
        .unwrap();
        let span = first(&doc);
        let mut seen = Vec::new();
        process_attribute_embedded_html(
            &mut doc,
            &ExtensionRegistry::new(),
            span,
            &mut |_doc: &mut Document, html: &str| {
                seen.push(html.to_string());
                format!("{}!", html)
            },
        );
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
        let variant: Value =
            serde_json::from_str(doc.attr(span, "data-mw-variant").unwrap()).unwrap();
        assert_eq!(variant["oneway"][0]["t"], "c!");
        assert_eq!(variant["filter"]["t"], "d!");
    }

    #[test]
    fn test_inline_media_caption() {
        let mut doc = Document::from_html(
            r#"<span typeof="mw:File" data-mw='{"caption":"cap"}'></span>"#,
        )
        .unwrap();
        let span = first(&doc);
        process_attribute_embedded_html(&mut doc, &ExtensionRegistry::new(), span, &mut upper);
        assert_eq!(doc.data_mw(span).unwrap().caption.as_deref(), Some("CAP"));
    }

    struct BodyHandler;

    impl ExtensionTagHandler for BodyHandler {
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

    #[test]
    fn test_registered_extension_body() {
        let html = r#"<div typeof="mw:Extension/box" data-mw='{"name":"box","body":{"html":"x"}}'></div>"#;
        let mut doc = Document::from_html(html).unwrap();
        let div = first(&doc);

        process_attribute_embedded_html(&mut doc, &ExtensionRegistry::new(), div, &mut upper);
        assert_eq!(doc.data_mw(div).unwrap().body_html(), Some("x"));
        assert!(!doc.is_modified(div));

        let mut extensions = ExtensionRegistry::new();
        extensions.register("box", Box::new(BodyHandler));
        process_attribute_embedded_html(&mut doc, &extensions, div, &mut upper);
        assert_eq!(doc.data_mw(div).unwrap().body_html(), Some("X"));
    }

    #[test]
    fn test_no_typeof_is_skipped() {
        let mut doc = Document::from_html(r#"<span data-mw='{"caption":"cap"}'></span>"#).unwrap();
        let span = first(&doc);
        let mut calls = 0;
        process_attribute_embedded_html(
            &mut doc,
            &ExtensionRegistry::new(),
            span,
            &mut |_doc: &mut Document, html: &str| {
                calls += 1;
                html.to_string()
            },
        );
        assert_eq!(calls, 0);
    }
}
