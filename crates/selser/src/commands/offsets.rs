//! Offset commands - renumber or move the source ranges of a page bundle

use std::path::PathBuf;

use anyhow::{Context, Result};
use selser_cite::cite_extensions;
use selser_dom::{convert_offset_numbering, shift_offsets_by};
use selser_source_map::OffsetType;
use tracing::info;

use crate::bundle::PageBundle;
use crate::commands::report_diagnostics;

/// Arguments for the convert-offsets command.
pub struct ConvertArgs {
    pub bundle: PathBuf,
    pub from: Option<OffsetType>,
    pub to: OffsetType,
    pub output: Option<PathBuf>,
}

/// Arguments for the shift-offsets command.
pub struct ShiftArgs {
    pub bundle: PathBuf,
    pub by: i64,
    pub output: Option<PathBuf>,
}

/// Convert every range on the page, including those inside citation bodies,
/// to `args.to` units.
pub fn convert(args: ConvertArgs) -> Result<()> {
    let bundle = PageBundle::read(&args.bundle)?;
    let from = args.from.unwrap_or(bundle.offset_type);
    let mut doc = bundle.into_document()?;
    let extensions = cite_extensions();

    convert_offset_numbering(&mut doc, &extensions, from, args.to)
        .with_context(|| format!("Failed to convert offsets from {} to {}", from, args.to))?;

    let name = args.bundle.display().to_string();
    let count = report_diagnostics(&mut doc, &name);
    info!(diagnostics = count, %from, to = %args.to, "converted offsets in {}", name);

    PageBundle::from_document(&doc).write(args.output.as_deref())
}

/// Move every range on the page by `args.by`. Content fragments are reached
/// through their markers.
pub fn shift(args: ShiftArgs) -> Result<()> {
    let delta = isize::try_from(args.by)
        .with_context(|| format!("Shift amount {} is out of range", args.by))?;
    let mut doc = PageBundle::read(&args.bundle)?.into_document()?;
    let extensions = cite_extensions();

    let root = doc.root();
    shift_offsets_by(&mut doc, &extensions, root, delta);

    let name = args.bundle.display().to_string();
    let count = report_diagnostics(&mut doc, &name);
    info!(diagnostics = count, delta, "shifted offsets in {}", name);

    PageBundle::from_document(&doc).write(args.output.as_deref())
}
