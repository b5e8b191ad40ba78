//! Document source ranges for selective serialization
//!
//! This crate provides the position bookkeeping that lets an edited tree be
//! serialized back with a minimal diff against its source. Every element
//! produced from source text carries an [`OffsetSpan`] recording where its
//! markup came from, including the widths of its opening and closing
//! constructs.
//!
//! # Overview
//!
//! The core types are:
//! - [`OffsetSpan`]: A source range with open/close widths
//! - [`OffsetType`]: The numbering system the offsets are expressed in
//! - [`convert_offsets`]: Converts a batch of offsets between numbering systems
//!
//! # Example
//!
//! ```rust
//! use selser_source_map::*;
//!
//! // `<b>é</b>` spans 9 bytes but only 8 code points
//! let source = "<b>é</b>";
//! let span = OffsetSpan::new(0, 9, 3, 4);
//! assert_eq!(span.inner_start(), Some(3));
//! assert_eq!(span.inner_end(), Some(5));
//!
//! let mut offsets = [0, 3, 5, 9];
//! convert_offsets(source, OffsetType::Byte, OffsetType::Char, &mut offsets);
//! assert_eq!(offsets, [0, 3, 4, 8]);
//! ```

pub mod convert;
pub mod error;
pub mod types;
pub mod utils;

// Re-export main types
pub use convert::{OffsetType, convert_offset, convert_offsets};
pub use error::SpanError;
pub use types::{Location, OffsetSpan};
pub use utils::offset_to_location;
