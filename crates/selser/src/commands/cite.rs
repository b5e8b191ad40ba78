//! Cite command - resolve citations in a page bundle
//!
//! Runs the three citation passes over the page: marker extraction and
//! author list rendering, auto-generated lists for leftover groups, and
//! error attachment inside embedded HTML.

use std::path::PathBuf;

use anyhow::{Context, Result};
use selser_cite::{
    CiteConfig, ReferenceRegistry, cite_extensions, flush_deferred_errors,
    insert_missing_references, process_references,
};
use tracing::{debug, info};

use crate::bundle::PageBundle;
use crate::commands::report_diagnostics;

/// Arguments for the cite command.
pub struct CiteArgs {
    pub bundle: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Execute the cite command.
pub fn execute(args: CiteArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => CiteConfig::load_from_path(path)
            .with_context(|| format!("Failed to load citation settings {}", path.display()))?,
        None => CiteConfig::default(),
    };
    debug!(?config, "citation settings");

    let mut doc = PageBundle::read(&args.bundle)?.into_document()?;
    let extensions = cite_extensions();
    let mut registry = ReferenceRegistry::new(config);

    process_references(&mut doc, &extensions, &mut registry)
        .context("Failed to process citations")?;
    insert_missing_references(&mut doc, &mut registry);
    flush_deferred_errors(&mut doc, &extensions, &registry);

    let name = args.bundle.display().to_string();
    let count = report_diagnostics(&mut doc, &name);
    info!(diagnostics = count, "processed citations in {}", name);

    PageBundle::from_document(&doc).write(args.output.as_deref())
}
