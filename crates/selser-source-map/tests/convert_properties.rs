//! Property tests for offset conversion.

use proptest::prelude::*;
use selser_source_map::{OffsetType, convert_offsets};

fn gen_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just('a'),
            Just('<'),
            Just('\n'),
            Just('é'),
            Just('中'),
            Just('😀'),
        ],
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Offsets of every character boundary in `ty` units.
fn boundaries(source: &str, ty: OffsetType) -> Vec<usize> {
    let mut out = vec![0];
    let mut pos = 0;
    for ch in source.chars() {
        pos += ty.units(ch);
        out.push(pos);
    }
    out
}

const TYPES: [OffsetType; 3] = [OffsetType::Byte, OffsetType::Char, OffsetType::Ucs2];

proptest! {
    #[test]
    fn test_boundaries_map_to_boundaries(source in gen_source(), from in 0usize..3, to in 0usize..3) {
        let (from, to) = (TYPES[from], TYPES[to]);
        let mut offsets = boundaries(&source, from);
        convert_offsets(&source, from, to, &mut offsets);
        prop_assert_eq!(offsets, boundaries(&source, to));
    }

    #[test]
    fn test_round_trip_is_identity_on_boundaries(source in gen_source(), from in 0usize..3, to in 0usize..3) {
        let (from, to) = (TYPES[from], TYPES[to]);
        let original = boundaries(&source, from);
        let mut offsets = original.clone();
        convert_offsets(&source, from, to, &mut offsets);
        convert_offsets(&source, to, from, &mut offsets);
        prop_assert_eq!(offsets, original);
    }

    #[test]
    fn test_conversion_is_monotonic(source in gen_source(), mut offsets in prop::collection::vec(0usize..200, 0..20)) {
        offsets.sort_unstable();
        let mut converted = offsets.clone();
        convert_offsets(&source, OffsetType::Byte, OffsetType::Ucs2, &mut converted);
        prop_assert!(converted.windows(2).all(|w| w[0] <= w[1]));
    }
}
