//! Core diagnostic message types.
//!
//! This module defines the fundamental structures for representing diagnostic messages
//! (errors, warnings, info) following tidyverse-style guidelines.

use selser_source_map::{OffsetSpan, OffsetType, convert_offsets, offset_to_location};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An error in the document (the transformation still completes)
    Error,
    /// A warning that indicates a likely problem
    Warning,
    /// Informational message
    Info,
    /// A note providing additional context
    Note,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
            DiagnosticKind::Note => "Note",
        }
    }
}

/// How detail items should be presented (tidyverse x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// Error detail (✖ bullet in tidyverse style)
    Error,
    /// Info detail (i bullet in tidyverse style)
    Info,
    /// Note detail (plain bullet)
    Note,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
            DetailKind::Note => "•",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            DetailKind::Error => "error",
            DetailKind::Info => "info",
            DetailKind::Note => "note",
        }
    }
}

/// The content of a message or detail item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageContent {
    /// Plain text content
    Plain(String),
    /// Markdown content
    Markdown(String),
}

impl MessageContent {
    /// Get the raw string content for display
    pub fn as_str(&self) -> &str {
        match self {
            MessageContent::Plain(s) => s,
            MessageContent::Markdown(s) => s,
        }
    }

    /// Convert to JSON value with type information
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            MessageContent::Plain(s) => json!({
                "type": "plain",
                "content": s
            }),
            MessageContent::Markdown(s) => json!({
                "type": "markdown",
                "content": s
            }),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Markdown(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Markdown(s.to_string())
    }
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    /// The kind of detail (error, info, note)
    pub kind: DetailKind,
    /// The content of the detail
    pub content: MessageContent,
    /// Optional source range this detail points at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<OffsetSpan>,
}

/// Source text a diagnostic's ranges refer to.
#[derive(Debug, Clone, Copy)]
pub struct SourceText<'a> {
    /// Display name (file name or page title)
    pub name: &'a str,
    /// The full source
    pub content: &'a str,
    /// Units the diagnostic ranges are counted in
    pub offset_type: OffsetType,
}

/// A diagnostic message following tidyverse-style structure.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "C-2-3") for searchability
/// 2. **Title**: Brief error message
/// 3. **Kind**: Error, Warning, Info
/// 4. **Problem**: What went wrong
/// 5. **Details**: Specific information (bulleted)
/// 6. **Hints**: Optional guidance for fixing (ends with ?)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    /// Optional error code (e.g., "C-2-3")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Brief title for the error
    pub title: String,

    /// The kind of diagnostic (Error, Warning, Info)
    pub kind: DiagnosticKind,

    /// The problem statement
    pub problem: Option<MessageContent>,

    /// Specific error details
    pub details: Vec<DetailItem>,

    /// Optional hints for fixing (ends with ?)
    pub hints: Vec<MessageContent>,

    /// Source range where the issue occurred, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<OffsetSpan>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Note: Consider using [`DiagnosticMessageBuilder`](crate::DiagnosticMessageBuilder) instead.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    /// Create a warning diagnostic.
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    /// Create an info diagnostic.
    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Get the documentation URL for this error, if it has an error code.
    pub fn docs_url(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| crate::catalog::get_docs_url(code))
    }

    /// Render this diagnostic message as text following tidyverse style.
    ///
    /// Format:
    /// ```text
    /// Error [C-2-3]: title
    /// Problem statement here
    /// ✖ Error detail 1
    /// ℹ Info detail
    /// ? Hint 1
    /// ```
    ///
    /// When `source` is given and the diagnostic has a closed location, an
    /// ariadne snippet of the source replaces the title line.
    ///
    /// # Example
    ///
    /// ```
    /// use selser_error_reporting::DiagnosticMessageBuilder;
    ///
    /// let msg = DiagnosticMessageBuilder::error("Invalid input")
    ///     .problem("Values must be numeric")
    ///     .add_detail("Found text in column 3")
    ///     .add_hint("Convert to numbers first?")
    ///     .build();
    /// let text = msg.to_text(None);
    /// assert!(text.contains("Error: Invalid input"));
    /// assert!(text.contains("Values must be numeric"));
    /// ```
    pub fn to_text(&self, source: Option<&SourceText<'_>>) -> String {
        let mut result = String::new();

        let ariadne = match (self.location, source) {
            (Some(location), Some(source)) => self.render_ariadne_source_context(location, source),
            _ => None,
        };

        match ariadne {
            Some(snippet) => {
                result.push_str(&snippet);
                // ariadne already shows title, code, problem and located details
                for detail in self.details.iter().filter(|d| d.location.is_none()) {
                    let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content.as_str());
                }
            }
            None => {
                match &self.code {
                    Some(code) => {
                        let _ = writeln!(result, "{} [{}]: {}", self.kind.label(), code, self.title);
                    }
                    None => {
                        let _ = writeln!(result, "{}: {}", self.kind.label(), self.title);
                    }
                }

                if let Some(problem) = &self.problem {
                    let _ = writeln!(result, "{}", problem.as_str());
                }

                if let (Some(location), Some(source)) = (self.location, source) {
                    if let Some(start) = location.start() {
                        if let Some(loc) =
                            offset_to_location(source.content, start, source.offset_type)
                        {
                            let _ = writeln!(
                                result,
                                "ℹ At {}:{}:{}",
                                source.name,
                                loc.row + 1,
                                loc.column + 1
                            );
                        }
                    }
                }

                for detail in &self.details {
                    let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content.as_str());
                }
            }
        }

        for hint in &self.hints {
            let _ = writeln!(result, "? {}", hint.as_str());
        }

        result
    }

    /// Render this diagnostic message as a JSON value.
    ///
    /// # Example
    ///
    /// ```
    /// use selser_error_reporting::DiagnosticMessage;
    ///
    /// let msg = DiagnosticMessage::error("Something went wrong");
    /// let json = msg.to_json();
    /// assert_eq!(json["kind"], "error");
    /// assert_eq!(json["title"], "Something went wrong");
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let kind_str = match self.kind {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Info => "info",
            DiagnosticKind::Note => "note",
        };

        let mut obj = json!({
            "kind": kind_str,
            "title": self.title,
        });

        if let Some(code) = &self.code {
            obj["code"] = json!(code);
        }

        if let Some(problem) = &self.problem {
            obj["problem"] = problem.to_json();
        }

        if !self.details.is_empty() {
            let details: Vec<_> = self
                .details
                .iter()
                .map(|d| {
                    let mut detail_obj = json!({
                        "kind": d.kind.as_str(),
                        "content": d.content.to_json()
                    });
                    if let Some(location) = &d.location {
                        detail_obj["location"] = json!(location);
                    }
                    detail_obj
                })
                .collect();
            obj["details"] = json!(details);
        }

        if !self.hints.is_empty() {
            let hints: Vec<_> = self.hints.iter().map(|h| h.to_json()).collect();
            obj["hints"] = json!(hints);
        }

        if let Some(location) = &self.location {
            obj["location"] = json!(location);
        }

        obj
    }

    /// Render source context using ariadne (private helper for to_text).
    fn render_ariadne_source_context(
        &self,
        location: OffsetSpan,
        source: &SourceText<'_>,
    ) -> Option<String> {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        // ariadne counts in code points
        let mut bounds = [location.start()?, location.end()?];
        convert_offsets(source.content, source.offset_type, OffsetType::Char, &mut bounds);
        let main_span = bounds[0]..bounds[1];

        let (report_kind, main_color) = match self.kind {
            DiagnosticKind::Error => (ReportKind::Error, Color::Red),
            DiagnosticKind::Warning => (ReportKind::Warning, Color::Yellow),
            DiagnosticKind::Info => (ReportKind::Advice, Color::Cyan),
            DiagnosticKind::Note => (ReportKind::Advice, Color::Blue),
        };

        let name = source.name.to_string();
        let mut report = Report::build(report_kind, name.clone(), main_span.start);

        if let Some(code) = &self.code {
            report = report.with_message(format!("[{}] {}", code, self.title));
        } else {
            report = report.with_message(&self.title);
        }

        let main_message = match &self.problem {
            Some(problem) => problem.as_str(),
            None => &self.title,
        };
        report = report.with_label(
            Label::new((name.clone(), main_span))
                .with_message(main_message)
                .with_color(main_color),
        );

        for detail in &self.details {
            let Some(detail_loc) = detail.location else {
                continue;
            };
            let (Some(start), Some(end)) = (detail_loc.start(), detail_loc.end()) else {
                continue;
            };
            let mut detail_bounds = [start, end];
            convert_offsets(
                source.content,
                source.offset_type,
                OffsetType::Char,
                &mut detail_bounds,
            );
            let detail_color = match detail.kind {
                DetailKind::Error => Color::Red,
                DetailKind::Info => Color::Cyan,
                DetailKind::Note => Color::Blue,
            };
            report = report.with_label(
                Label::new((name.clone(), detail_bounds[0]..detail_bounds[1]))
                    .with_message(detail.content.as_str())
                    .with_color(detail_color),
            );
        }

        let report = report.finish();
        let mut output = Vec::new();
        report
            .write((name, Source::from(source.content)), &mut output)
            .ok()?;

        String::from_utf8(output).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_content_from_str() {
        let content: MessageContent = "test".into();
        assert_eq!(content.as_str(), "test");
    }

    #[test]
    fn test_diagnostic_message_new() {
        let msg = DiagnosticMessage::new(DiagnosticKind::Error, "Test error");
        assert_eq!(msg.title, "Test error");
        assert_eq!(msg.kind, DiagnosticKind::Error);
        assert!(msg.code.is_none());
        assert!(msg.problem.is_none());
        assert!(msg.details.is_empty());
        assert!(msg.hints.is_empty());
    }

    #[test]
    fn test_with_code() {
        let msg = DiagnosticMessage::error("Test error").with_code("C-1-1");
        assert_eq!(msg.code, Some("C-1-1".to_string()));
        assert!(msg.docs_url().is_none());
    }

    #[test]
    fn test_to_text_includes_code() {
        let msg = DiagnosticMessage::warning("Numeric Key").with_code("C-3-1");
        let text = msg.to_text(None);
        assert_eq!(text, "Warning [C-3-1]: Numeric Key\n");
    }

    #[test]
    fn test_to_text_with_location_and_source() {
        let mut msg = DiagnosticMessage::error("Bad citation");
        msg.location = Some(OffsetSpan::new(6, 11, 0, 0));
        let source = SourceText {
            name: "page",
            content: "hello\nworld",
            offset_type: OffsetType::Byte,
        };
        let text = msg.to_text(Some(&source));
        assert!(text.contains("Bad citation"));
    }

    #[test]
    fn test_to_text_cleared_location_falls_back() {
        let mut msg = DiagnosticMessage::error("Bad citation");
        msg.location = Some(OffsetSpan::cleared());
        let source = SourceText {
            name: "page",
            content: "hello",
            offset_type: OffsetType::Byte,
        };
        assert_eq!(msg.to_text(Some(&source)), "Error: Bad citation\n");
    }

    #[test]
    fn test_to_json() {
        let mut msg = DiagnosticMessage::error("Duplicate").with_code("C-2-3");
        msg.location = Some(OffsetSpan::new(1, 4, 0, 0));
        let json = msg.to_json();
        assert_eq!(json["code"], "C-2-3");
        assert_eq!(json["location"], serde_json::json!([1, 4, 0, 0]));
    }
}
