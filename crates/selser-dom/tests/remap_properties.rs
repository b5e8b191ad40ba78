//! Property tests for offset remapping over whole trees.

use proptest::prelude::*;
use selser_dom::{
    DataMw, Document, ExtensionRegistry, NodeId, convert_offset_numbering, shift_offsets,
};
use selser_source_map::{OffsetSpan, OffsetType, convert_offset};

// =============================================================================
// Helpers
// =============================================================================

const TYPES: [OffsetType; 3] = [OffsetType::Byte, OffsetType::Char, OffsetType::Ucs2];

fn gen_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![Just('x'), Just(' '), Just('ß'), Just('中'), Just('🎉')],
        1..30,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Offsets of every character boundary of `source` in `ty` units.
fn boundaries(source: &str, ty: OffsetType) -> Vec<usize> {
    let mut out = vec![0];
    let mut pos = 0;
    for ch in source.chars() {
        pos += ty.units(ch);
        out.push(pos);
    }
    out
}

/// A valid span whose four bounds fall on character boundaries.
fn span_from_picks(bounds: &[usize], picks: (usize, usize, usize, usize)) -> OffsetSpan {
    let mut idx = [picks.0, picks.1, picks.2, picks.3].map(|p| p % bounds.len());
    idx.sort_unstable();
    let [a, b, c, d] = idx.map(|i| bounds[i]);
    OffsetSpan::new(a, d, b - a, d - c)
}

/// Build a page whose elements carry the given spans. Every third span goes
/// into the caption of an inline media element instead of the main tree.
fn build_page(source: &str, ty: OffsetType, spans: &[OffsetSpan]) -> Document {
    let mut caption_doc = Document::new();
    let caption_root = caption_doc.root();

    let mut doc = Document::new();
    doc.set_source(source, ty);
    let root = doc.root();

    for (i, span) in spans.iter().enumerate() {
        if i % 3 == 2 {
            let el = caption_doc.create_element("i");
            caption_doc.data_parsoid_mut(el).dsr = Some(*span);
            caption_doc.append_child(caption_root, el);
        } else {
            let el = doc.create_element("b");
            doc.data_parsoid_mut(el).dsr = Some(*span);
            let text = doc.create_text(format!("t{}", i));
            doc.append_child(el, text);
            doc.append_child(root, el);
        }
    }

    let media = doc.create_element("span");
    doc.set_attr(media, "typeof", "mw:File");
    doc.set_data_mw(
        media,
        Some(DataMw {
            caption: Some(caption_doc.inner_html(caption_root)),
            ..DataMw::default()
        }),
    );
    doc.append_child(root, media);
    doc
}

fn top_level_spans(doc: &Document) -> Vec<(NodeId, OffsetSpan)> {
    doc.children(doc.root())
        .iter()
        .filter_map(|&id| doc.data_parsoid(id).dsr.map(|span| (id, span)))
        .collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn test_conversion_round_trip_restores_every_span(
        source in gen_source(),
        from in 0usize..3,
        to in 0usize..3,
        picks in prop::collection::vec((0usize..64, 0usize..64, 0usize..64, 0usize..64), 1..10),
    ) {
        let (from, to) = (TYPES[from], TYPES[to]);
        let bounds = boundaries(&source, from);
        let spans: Vec<OffsetSpan> = picks.iter().map(|p| span_from_picks(&bounds, *p)).collect();

        let mut doc = build_page(&source, from, &spans);
        let root = doc.root();
        let extensions = ExtensionRegistry::new();
        let before = doc.inner_html(root);

        convert_offset_numbering(&mut doc, &extensions, from, to).unwrap();
        prop_assert_eq!(doc.offset_type(), to);
        for (id, span) in top_level_spans(&doc) {
            prop_assert!(span.validate().is_ok(), "invalid span on {}", id);
        }

        convert_offset_numbering(&mut doc, &extensions, to, from).unwrap();
        prop_assert_eq!(doc.inner_html(root), before);
        prop_assert!(!doc.diagnostics().has_diagnostics());
    }

    #[test]
    fn test_converted_bounds_match_direct_conversion(
        source in gen_source(),
        picks in prop::collection::vec((0usize..64, 0usize..64, 0usize..64, 0usize..64), 1..10),
    ) {
        let bounds = boundaries(&source, OffsetType::Byte);
        let spans: Vec<OffsetSpan> = picks.iter().map(|p| span_from_picks(&bounds, *p)).collect();
        let mut doc = build_page(&source, OffsetType::Byte, &spans);

        let before = top_level_spans(&doc);
        convert_offset_numbering(&mut doc, &ExtensionRegistry::new(), OffsetType::Byte, OffsetType::Ucs2)
            .unwrap();

        for (id, old) in before {
            let new = doc.data_parsoid(id).dsr.unwrap();
            let conv = |o: usize| convert_offset(&source, OffsetType::Byte, OffsetType::Ucs2, o);
            prop_assert_eq!(new.start(), old.start().map(conv));
            prop_assert_eq!(new.end(), old.end().map(conv));
            prop_assert_eq!(new.inner_start(), old.inner_start().map(conv));
            prop_assert_eq!(new.inner_end(), old.inner_end().map(conv));
        }
    }

    #[test]
    fn test_identity_shift_changes_nothing(
        source in gen_source(),
        picks in prop::collection::vec((0usize..64, 0usize..64, 0usize..64, 0usize..64), 1..10),
    ) {
        let bounds = boundaries(&source, OffsetType::Char);
        let spans: Vec<OffsetSpan> = picks.iter().map(|p| span_from_picks(&bounds, *p)).collect();
        let mut doc = build_page(&source, OffsetType::Char, &spans);
        let root = doc.root();
        let before = doc.inner_html(root);

        shift_offsets(&mut doc, &ExtensionRegistry::new(), root, Some);
        prop_assert_eq!(doc.inner_html(root), before);
    }
}
