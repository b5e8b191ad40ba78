//! Utility functions for working with source positions

use crate::convert::OffsetType;
use crate::types::Location;

/// Convert an offset to a Location with line and column info
///
/// `offset` is counted in `offset_type` units. Returns None if the offset is
/// out of bounds.
pub fn offset_to_location(source: &str, offset: usize, offset_type: OffsetType) -> Option<Location> {
    if offset > offset_type.len_of(source) {
        return None;
    }

    let mut row = 0;
    let mut column = 0;
    let mut current_offset = 0;

    for ch in source.chars() {
        if current_offset >= offset {
            break;
        }

        if ch == '\n' {
            row += 1;
            column = 0;
        } else {
            column += 1;
        }

        current_offset += offset_type.units(ch);
    }

    Some(Location {
        offset,
        row,
        column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_location_simple() {
        let source = "hello\nworld";

        let loc = offset_to_location(source, 0, OffsetType::Byte).unwrap();
        assert_eq!((loc.row, loc.column), (0, 0));

        let loc = offset_to_location(source, 3, OffsetType::Byte).unwrap();
        assert_eq!((loc.row, loc.column), (0, 3));

        let loc = offset_to_location(source, 6, OffsetType::Byte).unwrap();
        assert_eq!((loc.row, loc.column), (1, 0));

        let loc = offset_to_location(source, 9, OffsetType::Byte).unwrap();
        assert_eq!((loc.row, loc.column), (1, 3));
    }

    #[test]
    fn test_offset_to_location_multibyte() {
        let source = "é\nx";
        let by_byte = offset_to_location(source, 3, OffsetType::Byte).unwrap();
        let by_char = offset_to_location(source, 2, OffsetType::Char).unwrap();
        assert_eq!((by_byte.row, by_byte.column), (1, 0));
        assert_eq!((by_char.row, by_char.column), (1, 0));
    }

    #[test]
    fn test_offset_to_location_out_of_bounds() {
        assert!(offset_to_location("hello", 100, OffsetType::Byte).is_none());
        assert!(offset_to_location("hello", 5, OffsetType::Byte).is_some());
    }
}
