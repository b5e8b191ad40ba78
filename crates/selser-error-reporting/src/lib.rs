//! Error reporting and diagnostic messages for document transformations.
//!
//! Document-level problems (a duplicate citation key, a malformed source
//! range) never abort a transformation. They are recorded as
//! [`DiagnosticMessage`]s next to the markers written into the tree, so a
//! caller can show them to an editor or print them to a terminal.
//!
//! - [`DiagnosticMessage`]: The main error message structure
//! - [`DiagnosticMessageBuilder`]: Tidyverse-style builder (`.problem()`, `.add_detail()`, `.add_hint()`)
//! - [`catalog`]: Stable error codes (`C-<subsystem>-<n>`) and their titles
//!
//! Rendering uses ariadne for source snippets when the source text is
//! available, and falls back to plain bullets otherwise.

pub mod builder;
pub mod catalog;
pub mod diagnostic;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_docs_url, get_error_info, get_subsystem};
pub use diagnostic::{
    DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent, SourceText,
};
