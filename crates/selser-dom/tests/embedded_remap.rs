//! Remapping reaches spans hidden in data attributes and fragment stores.

use selser_dom::{
    Document, EmbeddedHtmlProc, ExtensionRegistry, ExtensionTagHandler, NodeId,
    convert_offset_numbering, process_body_html, shift_offsets, shift_offsets_by,
};
use selser_source_map::{OffsetSpan, OffsetType};

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

fn registry() -> ExtensionRegistry {
    let mut extensions = ExtensionRegistry::new();
    extensions.register("box", Box::new(BodyHandler));
    extensions
}

fn first(doc: &Document) -> NodeId {
    doc.first_child(doc.root()).unwrap()
}

/// Parse an embedded HTML string and return the dsr of its first element.
fn embedded_dsr(html: &str) -> Option<OffsetSpan> {
    let doc = Document::from_html(html).unwrap();
    doc.data_parsoid(first(&doc)).dsr
}

#[test]
fn test_shifts_spans_in_registered_extension_body() {
    let html = r#"<div typeof="mw:Extension/box" data-parsoid='{"dsr":[0,30,5,6]}' data-mw='{"name":"box","body":{"html":"&lt;b data-parsoid=&apos;{\"dsr\":[5,10,1,1]}&apos;&gt;x&lt;/b&gt;"}}'></div>"#;
    let mut doc = Document::from_html(html).unwrap();
    let div = first(&doc);
    let root = doc.root();

    shift_offsets_by(&mut doc, &registry(), root, 100);

    assert_eq!(
        doc.data_parsoid(div).dsr,
        Some(OffsetSpan::new(100, 130, 5, 6))
    );
    let body = doc.data_mw(div).unwrap().body_html().unwrap().to_string();
    assert_eq!(embedded_dsr(&body), Some(OffsetSpan::new(105, 110, 1, 1)));
}

#[test]
fn test_unregistered_extension_body_is_left_alone() {
    let html = r#"<div typeof="mw:Extension/box" data-mw='{"name":"box","body":{"html":"&lt;b data-parsoid=&apos;{\"dsr\":[5,10,1,1]}&apos;&gt;x&lt;/b&gt;"}}'></div>"#;
    let mut doc = Document::from_html(html).unwrap();
    let div = first(&doc);
    let root = doc.root();

    shift_offsets_by(&mut doc, &ExtensionRegistry::new(), root, 100);

    let body = doc.data_mw(div).unwrap().body_html().unwrap().to_string();
    assert_eq!(embedded_dsr(&body), Some(OffsetSpan::new(5, 10, 1, 1)));
    assert!(!doc.is_modified(div));
}

#[test]
fn test_shifts_spans_in_sealed_fragment_content() {
    let mut doc = Document::from_html(
        r#"<sup typeof="mw:DOMFragment/sealed/ref" data-parsoid='{"dsr":[0,20,5,6],"html":"mwf0"}'></sup>"#,
    )
    .unwrap();
    doc.put_fragment_html("mwf0", r#"<span data-parsoid='{"dsr":[5,14,0,0]}'>content</span>"#)
        .unwrap();
    let root = doc.root();

    shift_offsets_by(&mut doc, &ExtensionRegistry::new(), root, 2);

    let content = doc.fragment("mwf0").unwrap();
    let span = doc.first_child(content).unwrap();
    assert_eq!(doc.data_parsoid(span).dsr, Some(OffsetSpan::new(7, 16, 0, 0)));
    assert_eq!(
        doc.data_parsoid(first(&doc)).dsr,
        Some(OffsetSpan::new(2, 22, 5, 6))
    );
}

#[test]
fn test_converts_numbering_inside_media_caption() {
    // "é<i>ü</i>": the caption element covers bytes 2..11, chars 1..9
    let source = "é<i>ü</i>";
    let mut doc = Document::from_html(
        r#"<span typeof="mw:File" data-mw='{"caption":"&lt;i data-parsoid=&apos;{\"dsr\":[2,11,3,4]}&apos;&gt;ü&lt;/i&gt;"}'></span>"#,
    )
    .unwrap();
    doc.set_source(source, OffsetType::Byte);
    let media = first(&doc);

    convert_offset_numbering(&mut doc, &ExtensionRegistry::new(), OffsetType::Byte, OffsetType::Char)
        .unwrap();

    let caption = doc.data_mw(media).unwrap().caption.clone().unwrap();
    assert_eq!(embedded_dsr(&caption), Some(OffsetSpan::new(1, 9, 3, 4)));
    assert_eq!(doc.offset_type(), OffsetType::Char);
}

#[test]
fn test_nesting_cap_stops_descent_and_reports() {
    let mut doc = Document::from_html(
        r#"<sup typeof="mw:DOMFragment/sealed/ref" data-parsoid='{"html":"mwf0"}'></sup>"#,
    )
    .unwrap();
    doc.put_fragment_html("mwf0", r#"<span data-parsoid='{"dsr":[5,14,0,0]}'>x</span>"#)
        .unwrap();
    doc.set_max_nesting_depth(0);
    let root = doc.root();

    shift_offsets(&mut doc, &ExtensionRegistry::new(), root, |span| span.shifted(1));

    let content = doc.fragment("mwf0").unwrap();
    let span = doc.first_child(content).unwrap();
    assert_eq!(doc.data_parsoid(span).dsr, Some(OffsetSpan::new(5, 14, 0, 0)));
    let codes: Vec<_> = doc
        .diagnostics()
        .diagnostics()
        .iter()
        .filter_map(|d| d.code.as_deref())
        .collect();
    assert_eq!(codes, vec!["C-4-3"]);
}

#[test]
fn test_unparseable_embedded_html_is_kept_and_reported() {
    let mut doc = Document::from_html(
        r#"<span typeof="mw:File" data-mw='{"caption":"&lt;i&gt;&lt;/b&gt;"}'></span>"#,
    )
    .unwrap();
    let media = first(&doc);
    let root = doc.root();

    shift_offsets_by(&mut doc, &ExtensionRegistry::new(), root, 1);

    assert_eq!(
        doc.data_mw(media).unwrap().caption.as_deref(),
        Some("<i></b>")
    );
    assert!(doc.diagnostics().has_diagnostics());
}
