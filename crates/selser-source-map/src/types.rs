//! Core types for source ranges

use crate::error::SpanError;
use serde::{Deserialize, Serialize};

/// A location in source text (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Offset from start of source
    pub offset: usize,
    /// Row number (0-indexed)
    pub row: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

/// The source range an element was produced from.
///
/// A span is either closed (both `start` and `end` known) or cleared (both
/// absent, for content without source provenance). `open_width` and
/// `close_width` are the widths of the opening and closing constructs, so the
/// element's content lies in `[inner_start, inner_end]`.
///
/// Spans are values: the remapping engine replaces them wholesale rather than
/// editing them in place.
///
/// On the wire a span is the array `[start, end, openWidth, closeWidth]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<usize>>", into = "[Option<usize>; 4]")]
pub struct OffsetSpan {
    start: Option<usize>,
    end: Option<usize>,
    open_width: usize,
    close_width: usize,
}

impl OffsetSpan {
    /// Create a closed span.
    pub fn new(start: usize, end: usize, open_width: usize, close_width: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            open_width,
            close_width,
        }
    }

    /// Create a span from raw parts, without validation.
    ///
    /// Use [`OffsetSpan::validate`] to check the result.
    pub fn from_parts(
        start: Option<usize>,
        end: Option<usize>,
        open_width: usize,
        close_width: usize,
    ) -> Self {
        Self {
            start,
            end,
            open_width,
            close_width,
        }
    }

    /// A span with no source provenance.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// A zero-width span at `offset`, or a cleared span if the offset is unknown.
    pub fn collapsed(offset: Option<usize>) -> Self {
        match offset {
            Some(o) => Self::new(o, o, 0, 0),
            None => Self::cleared(),
        }
    }

    pub fn start(&self) -> Option<usize> {
        self.start
    }

    pub fn end(&self) -> Option<usize> {
        self.end
    }

    pub fn open_width(&self) -> usize {
        self.open_width
    }

    pub fn close_width(&self) -> usize {
        self.close_width
    }

    /// Offset just past the opening construct.
    pub fn inner_start(&self) -> Option<usize> {
        self.start.map(|s| s + self.open_width)
    }

    /// Offset where the closing construct begins.
    pub fn inner_end(&self) -> Option<usize> {
        self.end.and_then(|e| e.checked_sub(self.close_width))
    }

    /// Both bounds present.
    pub fn is_closed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Both bounds absent.
    pub fn is_cleared(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Length of the span in whatever units it is expressed in.
    pub fn len(&self) -> Option<usize> {
        match (self.start, self.end) {
            (Some(s), Some(e)) => e.checked_sub(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Check `start <= inner_start <= inner_end <= end`.
    pub fn validate(&self) -> Result<(), SpanError> {
        match (self.start, self.end) {
            (None, None) => Ok(()),
            (Some(start), Some(end)) => {
                if start > end {
                    return Err(SpanError::Inverted { start, end });
                }
                if self.open_width + self.close_width > end - start {
                    return Err(SpanError::WidthsExceedSpan {
                        start,
                        end,
                        open_width: self.open_width,
                        close_width: self.close_width,
                    });
                }
                Ok(())
            }
            (start, end) => Err(SpanError::HalfOpen { start, end }),
        }
    }

    /// Move both bounds by `delta`. Returns `None` if a bound would become negative.
    ///
    /// Cleared spans stay cleared.
    pub fn shifted(&self, delta: isize) -> Option<Self> {
        let shift = |o: usize| o.checked_add_signed(delta);
        let start = match self.start {
            Some(s) => Some(shift(s)?),
            None => None,
        };
        let end = match self.end {
            Some(e) => Some(shift(e)?),
            None => None,
        };
        Some(Self { start, end, ..*self })
    }
}

impl TryFrom<Vec<Option<usize>>> for OffsetSpan {
    type Error = String;

    fn try_from(parts: Vec<Option<usize>>) -> Result<Self, Self::Error> {
        if parts.len() < 2 || parts.len() > 4 {
            return Err(format!(
                "source range must have 2 to 4 members, found {}",
                parts.len()
            ));
        }
        let width = |i: usize| parts.get(i).copied().flatten().unwrap_or(0);
        Ok(Self::from_parts(parts[0], parts[1], width(2), width(3)))
    }
}

impl From<OffsetSpan> for [Option<usize>; 4] {
    fn from(span: OffsetSpan) -> Self {
        [
            span.start,
            span.end,
            Some(span.open_width),
            Some(span.close_width),
        ]
    }
}
