//! Conversion of offsets between numbering systems

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The unit in which source offsets are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetType {
    /// UTF-8 bytes
    #[default]
    Byte,
    /// Unicode code points
    Char,
    /// UTF-16 code units
    Ucs2,
}

impl OffsetType {
    /// Number of units `ch` occupies in this numbering system.
    pub fn units(self, ch: char) -> usize {
        match self {
            OffsetType::Byte => ch.len_utf8(),
            OffsetType::Char => 1,
            OffsetType::Ucs2 => ch.len_utf16(),
        }
    }

    /// Length of `s` in this numbering system.
    pub fn len_of(self, s: &str) -> usize {
        match self {
            OffsetType::Byte => s.len(),
            OffsetType::Char => s.chars().count(),
            OffsetType::Ucs2 => s.encode_utf16().count(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OffsetType::Byte => "byte",
            OffsetType::Char => "char",
            OffsetType::Ucs2 => "ucs2",
        }
    }
}

impl fmt::Display for OffsetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffsetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "byte" => Ok(OffsetType::Byte),
            "char" => Ok(OffsetType::Char),
            "ucs2" => Ok(OffsetType::Ucs2),
            other => Err(format!(
                "unknown offset type '{}' (expected byte, char or ucs2)",
                other
            )),
        }
    }
}

/// Convert `offsets` in place from `from` units to `to` units over `source`.
///
/// The source is scanned once, in offset order, so the cost is linear in the
/// source length plus `O(n log n)` in the number of offsets.
///
/// An offset that falls inside a multi-unit character rounds up to the end of
/// that character. Offsets past the end of the source are extrapolated
/// one-to-one, which keeps the conversion monotonic.
pub fn convert_offsets(source: &str, from: OffsetType, to: OffsetType, offsets: &mut [usize]) {
    if from == to || offsets.is_empty() {
        return;
    }

    let mut order: Vec<usize> = (0..offsets.len()).collect();
    order.sort_by_key(|&i| offsets[i]);

    let mut chars = source.chars();
    let mut in_pos = 0usize;
    let mut out_pos = 0usize;

    for i in order {
        let target = offsets[i];
        while in_pos < target {
            match chars.next() {
                Some(ch) => {
                    in_pos += from.units(ch);
                    out_pos += to.units(ch);
                }
                None => break,
            }
        }
        offsets[i] = if in_pos < target {
            out_pos + (target - in_pos)
        } else {
            out_pos
        };
    }
}

/// Convert a single offset. Prefer [`convert_offsets`] for batches.
pub fn convert_offset(source: &str, from: OffsetType, to: OffsetType, offset: usize) -> usize {
    let mut one = [offset];
    convert_offsets(source, from, to, &mut one);
    one[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    // "a" (1 byte), "é" (2 bytes), "😀" (4 bytes, 2 UTF-16 units), "b"
    const SOURCE: &str = "aé😀b";

    #[test]
    fn test_len_of() {
        assert_eq!(OffsetType::Byte.len_of(SOURCE), 8);
        assert_eq!(OffsetType::Char.len_of(SOURCE), 4);
        assert_eq!(OffsetType::Ucs2.len_of(SOURCE), 5);
    }

    #[test]
    fn test_byte_to_char() {
        let mut offsets = [0, 1, 3, 7, 8];
        convert_offsets(SOURCE, OffsetType::Byte, OffsetType::Char, &mut offsets);
        assert_eq!(offsets, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_byte_to_ucs2() {
        let mut offsets = [8, 7, 3, 1, 0];
        convert_offsets(SOURCE, OffsetType::Byte, OffsetType::Ucs2, &mut offsets);
        assert_eq!(offsets, [5, 4, 2, 1, 0]);
    }

    #[test]
    fn test_ucs2_to_byte() {
        let mut offsets = [0, 2, 4, 5];
        convert_offsets(SOURCE, OffsetType::Ucs2, OffsetType::Byte, &mut offsets);
        assert_eq!(offsets, [0, 3, 7, 8]);
    }

    #[test]
    fn test_same_type_is_noop() {
        let mut offsets = [3, 1];
        convert_offsets(SOURCE, OffsetType::Char, OffsetType::Char, &mut offsets);
        assert_eq!(offsets, [3, 1]);
    }

    #[test]
    fn test_duplicates_convert_identically() {
        let mut offsets = [3, 3, 7, 3];
        convert_offsets(SOURCE, OffsetType::Byte, OffsetType::Char, &mut offsets);
        assert_eq!(offsets, [2, 2, 3, 2]);
    }

    #[test]
    fn test_mid_character_rounds_up() {
        // Byte 2 is inside "é"
        assert_eq!(convert_offset(SOURCE, OffsetType::Byte, OffsetType::Char, 2), 2);
    }

    #[test]
    fn test_past_end_extrapolates() {
        assert_eq!(convert_offset(SOURCE, OffsetType::Byte, OffsetType::Char, 10), 6);
        assert_eq!(convert_offset(SOURCE, OffsetType::Char, OffsetType::Byte, 6), 10);
    }

    #[test]
    fn test_parse_offset_type() {
        assert_eq!("ucs2".parse::<OffsetType>(), Ok(OffsetType::Ucs2));
        assert!("utf32".parse::<OffsetType>().is_err());
        assert_eq!(OffsetType::Char.to_string(), "char");
    }
}
