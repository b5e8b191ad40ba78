//! Validation errors for source ranges

use thiserror::Error;

/// Ways an [`OffsetSpan`](crate::OffsetSpan) can be inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    /// Only one of `start`/`end` is present.
    #[error("span has only one bound (start: {start:?}, end: {end:?})")]
    HalfOpen {
        start: Option<usize>,
        end: Option<usize>,
    },

    /// `start` is after `end`.
    #[error("span bounds are inverted ({start} > {end})")]
    Inverted { start: usize, end: usize },

    /// The open and close widths do not fit inside the span.
    #[error("open/close widths {open_width}+{close_width} exceed span [{start}, {end}]")]
    WidthsExceedSpan {
        start: usize,
        end: usize,
        open_width: usize,
        close_width: usize,
    },
}
