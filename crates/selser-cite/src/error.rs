/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Library-level failures of the citation passes.
 */

//! Error types for selser-cite
//!
//! These are failures of the input itself (a sealed citation whose content
//! was never stored, markup that cannot be parsed). Problems with how an
//! author used citations are not errors in this sense; they are recorded on
//! the output document, see [`crate::report`].

use selser_dom::DomError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CiteError {
    #[error("Citation content fragment {0:?} is not in the content store")]
    UnknownFragment(String),

    #[error("Sealed citation on node {0} has no content fragment id")]
    MissingContentId(String),

    #[error("Citation content fragment {0:?} does not start with an element")]
    MalformedContent(String),

    #[error("Tree error: {0}")]
    Dom(#[from] DomError),
}

pub type Result<T> = std::result::Result<T, CiteError>;
