//! Document trees with source provenance.
//!
//! This crate provides the tree the transformation passes work on:
//!
//! - [`Document`]: an arena of nodes addressed by [`NodeId`], with the usual
//!   navigation and mutation API, typed `data-parsoid`/`data-mw` bags, and a
//!   content-fragment store for sealed extension output
//! - [`Document::parse_fragment`] and [`Document::serialize`]: markup to tree
//!   and back, with selective serialization of unmodified nodes
//! - [`process_attribute_embedded_html`]: access to HTML hidden in data
//!   attributes, extensible through [`ExtensionTagHandler`]
//! - [`remap`]: offset shifting and numbering conversion over every source
//!   range in a tree
//!
//! # Example
//!
//! ```rust
//! use selser_dom::{Document, ExtensionRegistry, SerializeOptions, shift_offsets_by};
//! use selser_source_map::OffsetSpan;
//!
//! let html = r#"<p data-parsoid='{"dsr":[0,5,0,0]}'>hello</p><p>untouched</p>"#;
//! let mut doc = Document::from_html(html).unwrap();
//! let root = doc.root();
//! shift_offsets_by(&mut doc, &ExtensionRegistry::new(), root, 3);
//!
//! let p = doc.first_child(root).unwrap();
//! assert_eq!(doc.data_parsoid(p).dsr, Some(OffsetSpan::new(3, 8, 0, 0)));
//!
//! // The second paragraph was not touched and keeps its original markup
//! let out = doc.serialize(root, SerializeOptions::inner().verbatim());
//! assert!(out.ends_with("<p>untouched</p>"));
//! ```

pub mod context;
pub mod data;
pub mod document;
pub mod error;
pub mod extension;
mod fragments;
pub mod kind;
pub mod node;
mod parse;
pub mod remap;
pub mod serialize;

pub use context::DiagnosticSink;
pub use data::{
    AttribPart, DataMw, DataMwBody, DataMwError, DataParsoid, RichAttribPart, TempData,
};
pub use document::{DEFAULT_MAX_NESTING_DEPTH, Document};
pub use error::{DomError, Result};
pub use extension::{
    EmbeddedHtmlProc, ExtensionRegistry, ExtensionTagHandler, process_attribute_embedded_html,
    process_body_html,
};
pub use kind::NodeKind;
pub use node::{ElementData, NodeData, NodeId};
pub use remap::{
    OffsetApplier, OffsetCollector, SpanVisitor, convert_offset_numbering, shift_offsets,
    shift_offsets_by, visit_offsets,
};
pub use serialize::SerializeOptions;
