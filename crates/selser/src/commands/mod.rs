//! Command implementations for the selser CLI
//!
//! Each command reads a page bundle, hands the document to the library
//! crates, and writes the bundle back out.

pub mod cite;
pub mod offsets;

use selser_dom::Document;
use selser_error_reporting::SourceText;

/// Print every diagnostic collected on `doc` to stderr, with source context
/// when the bundle carried its source. Returns how many were printed.
pub(crate) fn report_diagnostics(doc: &mut Document, name: &str) -> usize {
    let diagnostics = doc.diagnostics_mut().take_diagnostics();
    let offset_type = doc.offset_type();
    let source = doc.source().map(|content| SourceText {
        name,
        content,
        offset_type,
    });
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.to_text(source.as_ref()));
    }
    diagnostics.len()
}
