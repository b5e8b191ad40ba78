/*
 * report.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Document-level citation problems and how they are recorded.
 */

//! Citation problems found while transforming a document.
//!
//! None of these stop the transformation. Each one is written into the
//! `data-mw.errors` list of the node it concerns (which also gains the
//! `mw:Error` typeof) and pushed to the document's diagnostic sink.

use selser_dom::{DataMwError, Document, NodeId};
use selser_error_reporting::{DiagnosticKind, DiagnosticMessage, DiagnosticMessageBuilder};
use selser_source_map::OffsetSpan;

/// The kinds of citation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefErrorKind {
    /// Both `name` and `follow` were given.
    TooManyKeys,
    /// A definition inside a reference list has no name.
    ReferencesNoKey,
    /// A self-closed citation has no name.
    RefNoKey,
    /// A citation has neither a name nor content.
    RefNoInput,
    /// A definition inside a reference list has no content.
    EmptyReferencesDefine,
    /// A definition inside a reference list names an unused key.
    ReferencesMissingKey,
    /// A follow citation names an entry that does not exist yet.
    MissingFollowTarget,
    /// A name was reused with different content.
    DuplicateKey,
    /// A definition inside a list names a group other than the list's.
    GroupMismatch,
    /// A named entry never received content.
    NoText,
    /// Citations in a named group had no list of their own.
    GroupWithoutReferences,
    /// The name consists only of digits.
    NumericKey,
    /// `dir` is neither `ltr` nor `rtl`.
    InvalidDir,
    /// A reference list was given an unknown parameter.
    InvalidParameters,
}

impl RefErrorKind {
    /// The message key written into `data-mw.errors`.
    pub fn key(self) -> &'static str {
        match self {
            RefErrorKind::TooManyKeys => "cite_error_ref_too_many_keys",
            RefErrorKind::ReferencesNoKey => "cite_error_references_no_key",
            RefErrorKind::RefNoKey => "cite_error_ref_no_key",
            RefErrorKind::RefNoInput => "cite_error_ref_no_input",
            RefErrorKind::EmptyReferencesDefine => "cite_error_empty_references_define",
            // Follow targets share the missing-key message
            RefErrorKind::ReferencesMissingKey | RefErrorKind::MissingFollowTarget => {
                "cite_error_references_missing_key"
            }
            RefErrorKind::DuplicateKey => "cite_error_references_duplicate_key",
            RefErrorKind::GroupMismatch => "cite_error_references_group_mismatch",
            RefErrorKind::NoText => "cite_error_references_no_text",
            RefErrorKind::GroupWithoutReferences => "cite_error_group_refs_without_references",
            RefErrorKind::NumericKey => "cite_error_ref_numeric_key",
            RefErrorKind::InvalidDir => "cite_error_ref_invalid_dir",
            RefErrorKind::InvalidParameters => "cite_error_references_invalid_parameters",
        }
    }

    /// The error catalog code.
    pub fn code(self) -> &'static str {
        match self {
            RefErrorKind::TooManyKeys => "C-1-1",
            RefErrorKind::ReferencesNoKey => "C-1-2",
            RefErrorKind::RefNoKey => "C-1-3",
            RefErrorKind::RefNoInput => "C-1-4",
            RefErrorKind::EmptyReferencesDefine => "C-1-5",
            RefErrorKind::ReferencesMissingKey => "C-2-1",
            RefErrorKind::MissingFollowTarget => "C-2-2",
            RefErrorKind::DuplicateKey => "C-2-3",
            RefErrorKind::GroupMismatch => "C-2-4",
            RefErrorKind::NoText => "C-2-5",
            RefErrorKind::GroupWithoutReferences => "C-2-6",
            RefErrorKind::NumericKey => "C-3-1",
            RefErrorKind::InvalidDir => "C-3-2",
            RefErrorKind::InvalidParameters => "C-3-3",
        }
    }

    pub fn severity(self) -> DiagnosticKind {
        match self {
            RefErrorKind::NumericKey
            | RefErrorKind::InvalidDir
            | RefErrorKind::InvalidParameters => DiagnosticKind::Warning,
            _ => DiagnosticKind::Error,
        }
    }
}

/// One citation problem with its message parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefError {
    pub kind: RefErrorKind,
    pub params: Vec<String>,
}

impl RefError {
    pub fn new(kind: RefErrorKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn to_data_mw_error(&self) -> DataMwError {
        DataMwError {
            key: self.kind.key().to_string(),
            params: self.params.clone(),
        }
    }

    pub fn to_diagnostic(&self, location: Option<OffsetSpan>) -> DiagnosticMessage {
        let mut builder = DiagnosticMessageBuilder::from_catalog(self.kind.severity(), self.kind.code())
            .with_optional_location(location);
        for param in &self.params {
            builder = builder.add_info(format!("`{}`", param));
        }
        builder.build()
    }
}

/// Record `errs` on `node`: mark it `mw:Error` and append to its
/// `data-mw.errors`.
pub fn add_errors_to_node(doc: &mut Document, node: NodeId, errs: &[RefError]) {
    if errs.is_empty() {
        return;
    }
    doc.add_type_of(node, "mw:Error");
    let dmw = doc.data_mw_mut(node);
    dmw.errors.extend(errs.iter().map(RefError::to_data_mw_error));
}

/// Push one diagnostic per error to the document's sink.
pub(crate) fn report(doc: &mut Document, errs: &[RefError], location: Option<OffsetSpan>) {
    for err in errs {
        tracing::debug!(key = err.kind.key(), params = ?err.params, "citation problem");
        doc.diagnostics_mut()
            .add_diagnostic(err.to_diagnostic(location));
    }
}
