/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Citation and reference list processing for selser documents.
 */

//! Citations and reference lists.
//!
//! Turns sealed citation markers into numbered citation links and renders
//! the reference lists they point at. One transformation runs three passes
//! over a document, sharing one [`ReferenceRegistry`]:
//!
//! 1. [`process_references`] resolves every marker and renders every
//!    author-placed list.
//! 2. [`insert_missing_references`] appends a list for each group whose
//!    citations no author list picked up.
//! 3. [`flush_deferred_errors`] attaches errors to citation links that live
//!    in HTML embedded in data attributes.
//!
//! Misused citations (a reused name with different content, a definition
//! without a name) never stop the transformation. They are recorded in the
//! `data-mw.errors` of the node concerned and pushed to the document's
//! diagnostic sink.
//!
//! # Example
//!
//! ```rust
//! use selser_cite::{CiteConfig, ReferenceRegistry, cite_extensions};
//! use selser_dom::Document;
//!
//! let mut doc = Document::from_html(
//!     r#"<p>Claim<sup typeof="mw:DOMFragment/sealed/ref" data-parsoid='{"html":"mwf0"}'></sup></p>"#,
//! ).unwrap();
//! doc.put_fragment_html(
//!     "mwf0",
//!     r#"<sup data-mw='{"name":"ref","body":{"extsrc":"Source"}}'>Source</sup>"#,
//! ).unwrap();
//!
//! let extensions = cite_extensions();
//! let mut registry = ReferenceRegistry::new(CiteConfig::default());
//! selser_cite::process_references(&mut doc, &extensions, &mut registry).unwrap();
//! selser_cite::insert_missing_references(&mut doc, &mut registry);
//! selser_cite::flush_deferred_errors(&mut doc, &extensions, &registry);
//!
//! let html = doc.inner_html(doc.root());
//! assert!(html.contains(r#"<span class="mw-reflink-text">[1]</span>"#));
//! assert!(html.contains("Source</span></li>"));
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod extractor;
pub mod flush;
pub mod group;
pub mod handlers;
pub mod registry;
pub mod render;
pub mod report;

pub use config::{CiteConfig, ConfigError};
pub use entry::{Direction, ReferenceEntry};
pub use error::{CiteError, Result};
pub use extractor::process_references;
pub use flush::flush_deferred_errors;
pub use group::ReferenceGroup;
pub use handlers::{ReferencesTagHandler, RefTagHandler, cite_extensions, register_cite_handlers};
pub use registry::{ContextFrame, ExtractionState, ReferenceRegistry, normalize_key};
pub use render::{ReferencesOptions, create_references, insert_missing_references};
pub use report::{RefError, RefErrorKind, add_errors_to_node};
