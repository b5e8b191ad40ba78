//! Error types for tree construction and remapping.

use selser_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use thiserror::Error;

/// Result type alias for selser-dom operations.
pub type Result<T> = std::result::Result<T, DomError>;

/// Errors that can occur while building or converting a tree.
///
/// Problems in the *document* (a malformed source range, say) are not
/// errors; they are reported as diagnostics and the walk continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    /// Markup syntax error from quick-xml.
    #[error("markup syntax error: {message}{}", at_byte(.position))]
    Syntax {
        message: String,
        position: Option<u64>,
    },

    /// End tag without a matching start tag.
    #[error("mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// End tag with no open element.
    #[error("unexpected end tag </{0}>")]
    UnexpectedEndTag(String),

    /// Input ended with open elements.
    #[error("unclosed element <{0}>")]
    UnclosedElement(String),

    /// A `data-parsoid`/`data-mw` attribute did not hold valid JSON.
    #[error("invalid {attribute} attribute: {message}")]
    InvalidDataAttribute { attribute: String, message: String },

    /// No fragment stored under this id.
    #[error("unknown content fragment '{0}'")]
    UnknownFragment(String),

    /// Offset numbering conversion needs the page source.
    #[error("document has no source text to convert offsets against")]
    MissingSource,
}

fn at_byte(position: &Option<u64>) -> String {
    position.map(|p| format!(" at byte {}", p)).unwrap_or_default()
}

impl DomError {
    /// Convert this error to a DiagnosticMessage.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            DomError::Syntax { .. }
            | DomError::MismatchedEndTag { .. }
            | DomError::UnexpectedEndTag(_)
            | DomError::UnclosedElement(_)
            | DomError::InvalidDataAttribute { .. } => {
                DiagnosticMessageBuilder::error("Unparseable Embedded Content")
                    .with_code("C-4-2")
                    .problem(self.to_string())
                    .build()
            }
            DomError::UnknownFragment(_) | DomError::MissingSource => {
                DiagnosticMessageBuilder::error("Internal Error")
                    .with_code("C-0-1")
                    .problem(self.to_string())
                    .build()
            }
        }
    }
}

impl From<quick_xml::Error> for DomError {
    fn from(err: quick_xml::Error) -> Self {
        DomError::Syntax {
            message: err.to_string(),
            position: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for DomError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DomError::Syntax {
            message: format!("attribute error: {}", err),
            position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_display() {
        let err = DomError::Syntax {
            message: "bad".to_string(),
            position: Some(4),
        };
        assert_eq!(err.to_string(), "markup syntax error: bad at byte 4");
        assert_eq!(err.to_diagnostic().code.as_deref(), Some("C-4-2"));
    }

    #[test]
    fn test_missing_source_is_internal() {
        assert_eq!(
            DomError::MissingSource.to_diagnostic().code.as_deref(),
            Some("C-0-1")
        );
    }
}
