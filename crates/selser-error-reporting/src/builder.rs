//! Builder API for diagnostic messages.
//!
//! Provides a fluent interface with tidyverse-style methods:
//! `.problem()`, `.add_detail()`, `.add_info()`, `.add_hint()`.

use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent};
use selser_source_map::OffsetSpan;

/// Builder for [`DiagnosticMessage`].
///
/// # Example
///
/// ```
/// use selser_error_reporting::DiagnosticMessageBuilder;
///
/// let msg = DiagnosticMessageBuilder::error("Duplicate Key")
///     .with_code("C-2-3")
///     .problem("The name `smith` was defined twice with different content")
///     .add_info("The first definition is kept")
///     .build();
/// assert_eq!(msg.code.as_deref(), Some("C-2-3"));
/// assert_eq!(msg.details.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Start from a catalog entry: code, title and problem come from the catalog.
    ///
    /// Unknown codes fall back to the internal error entry.
    pub fn from_catalog(kind: DiagnosticKind, code: &str) -> Self {
        match crate::catalog::get_error_info(code) {
            Some(info) => Self::new(kind, info.title.clone())
                .with_code(code)
                .problem(info.message_template.clone()),
            None => Self::new(kind, "Internal Error")
                .with_code("C-0-1")
                .problem(format!("Unknown diagnostic code `{}`", code)),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    /// Set the problem statement.
    pub fn problem(mut self, problem: impl Into<MessageContent>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    /// Add an error detail (✖ bullet).
    pub fn add_detail(self, detail: impl Into<MessageContent>) -> Self {
        self.push_detail(DetailKind::Error, detail.into(), None)
    }

    /// Add an error detail pointing at a source range.
    pub fn add_detail_at(self, detail: impl Into<MessageContent>, location: OffsetSpan) -> Self {
        self.push_detail(DetailKind::Error, detail.into(), Some(location))
    }

    /// Add an info detail (ℹ bullet).
    pub fn add_info(self, info: impl Into<MessageContent>) -> Self {
        self.push_detail(DetailKind::Info, info.into(), None)
    }

    /// Add a note detail (plain bullet).
    pub fn add_note(self, note: impl Into<MessageContent>) -> Self {
        self.push_detail(DetailKind::Note, note.into(), None)
    }

    /// Add a hint. Hints should end with a question mark.
    pub fn add_hint(mut self, hint: impl Into<MessageContent>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn with_location(mut self, location: OffsetSpan) -> Self {
        self.message.location = Some(location);
        self
    }

    /// Like [`with_location`](Self::with_location), ignoring `None`.
    pub fn with_optional_location(mut self, location: Option<OffsetSpan>) -> Self {
        if location.is_some() {
            self.message.location = location;
        }
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }

    fn push_detail(
        mut self,
        kind: DetailKind,
        content: MessageContent,
        location: Option<OffsetSpan>,
    ) -> Self {
        self.message.details.push(DetailItem {
            kind,
            content,
            location,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_full() {
        let msg = DiagnosticMessageBuilder::error("Incompatible types")
            .with_code("C-0-1")
            .problem("Cannot combine these values")
            .add_detail("Left side is a string")
            .add_info("Right side is a number")
            .add_note("Both came from the same list")
            .add_hint("Convert first?")
            .build();

        assert_eq!(msg.kind, DiagnosticKind::Error);
        assert_eq!(msg.details.len(), 3);
        assert_eq!(msg.details[0].kind, DetailKind::Error);
        assert_eq!(msg.details[1].kind, DetailKind::Info);
        assert_eq!(msg.details[2].kind, DetailKind::Note);
        assert_eq!(msg.hints.len(), 1);
    }

    #[test]
    fn test_builder_text_output() {
        let msg = DiagnosticMessageBuilder::warning("Numeric Key")
            .with_code("C-3-1")
            .problem("`1` is a number")
            .add_detail("Names must contain a letter")
            .add_hint("Rename it?")
            .build();
        assert_eq!(
            msg.to_text(None),
            "Warning [C-3-1]: Numeric Key\n`1` is a number\n✖ Names must contain a letter\n? Rename it?\n"
        );
    }

    #[test]
    fn test_from_catalog() {
        let msg = DiagnosticMessageBuilder::from_catalog(DiagnosticKind::Error, "C-2-3").build();
        assert_eq!(msg.title, "Duplicate Key With Different Content");
        assert_eq!(msg.code.as_deref(), Some("C-2-3"));
        assert!(msg.problem.is_some());
    }

    #[test]
    fn test_from_catalog_unknown_code() {
        let msg = DiagnosticMessageBuilder::from_catalog(DiagnosticKind::Error, "C-9-9").build();
        assert_eq!(msg.code.as_deref(), Some("C-0-1"));
    }

    #[test]
    fn test_optional_location() {
        let msg = DiagnosticMessageBuilder::error("x")
            .with_optional_location(None)
            .build();
        assert!(msg.location.is_none());
        let span = OffsetSpan::new(0, 3, 0, 0);
        let msg = DiagnosticMessageBuilder::error("x")
            .with_optional_location(Some(span))
            .build();
        assert_eq!(msg.location, Some(span));
    }
}
