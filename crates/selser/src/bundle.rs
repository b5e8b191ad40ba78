//! Page bundles.
//!
//! A bundle is one page as JSON: its HTML, the source text the offsets in
//! the HTML point into, the unit those offsets are counted in, and the
//! content fragments sealed markers refer to.
//!
//! ```json
//! {
//!   "html": "<p>...</p>",
//!   "source": "...",
//!   "offsetType": "byte",
//!   "fragments": { "mwf0": "<sup>...</sup>" }
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use selser_dom::{Document, SerializeOptions};
use selser_source_map::OffsetType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBundle {
    pub html: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default)]
    pub offset_type: OffsetType,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fragments: IndexMap<String, String>,
}

impl PageBundle {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bundle {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse bundle {}", path.display()))
    }

    /// Build the document tree, with its source and content fragments.
    pub fn into_document(self) -> Result<Document> {
        let mut doc = Document::from_html(&self.html).context("Failed to parse page HTML")?;
        match self.source {
            Some(source) => doc.set_source(source, self.offset_type),
            None => doc.set_offset_type(self.offset_type),
        }
        for (id, html) in &self.fragments {
            doc.put_fragment_html(id, html)
                .with_context(|| format!("Failed to parse content fragment {}", id))?;
        }
        Ok(doc)
    }

    /// Capture `doc` as a bundle. Unmodified markup is kept byte for byte.
    pub fn from_document(doc: &Document) -> Self {
        let opts = SerializeOptions::inner().verbatim();
        let fragments = doc
            .fragment_ids()
            .filter_map(|id| {
                let root = doc.fragment(id)?;
                Some((id.to_string(), doc.serialize(root, opts)))
            })
            .collect();
        Self {
            html: doc.serialize(doc.root(), opts),
            source: doc.source().map(str::to_string),
            offset_type: doc.offset_type(),
            fragments,
        }
    }

    /// Write the bundle as pretty JSON to `output`, or to stdout.
    pub fn write(&self, output: Option<&Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize bundle")?;
        match output {
            Some(path) => std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display())),
            None => {
                println!("{}", json);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let bundle: PageBundle = serde_json::from_str(r#"{"html":"<p>x</p>"}"#).unwrap();
        assert_eq!(bundle.source, None);
        assert_eq!(bundle.offset_type, OffsetType::Byte);
        assert!(bundle.fragments.is_empty());
    }

    #[test]
    fn test_document_round_trip_keeps_markup() {
        let mut fragments = IndexMap::new();
        fragments.insert("mwf0".to_string(), "<sup data-x='1'>note</sup>".to_string());
        let bundle = PageBundle {
            html: "<p class='a'>x &amp; y</p>".to_string(),
            source: Some("x & y".to_string()),
            offset_type: OffsetType::Ucs2,
            fragments,
        };

        let doc = bundle.clone().into_document().unwrap();
        assert_eq!(doc.offset_type(), OffsetType::Ucs2);
        assert_eq!(PageBundle::from_document(&doc), bundle);
    }

    #[test]
    fn test_write_and_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.json");
        let bundle = PageBundle {
            html: "<p>x</p>".to_string(),
            offset_type: OffsetType::Char,
            ..PageBundle::default()
        };
        bundle.write(Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains(r#""offsetType": "char""#));
        assert!(!written.contains("fragments"));
        assert_eq!(PageBundle::read(&path).unwrap(), bundle);
    }

    #[test]
    fn test_bad_fragment_is_an_error() {
        let mut fragments = IndexMap::new();
        fragments.insert("mwf0".to_string(), "<sup>".to_string());
        let bundle = PageBundle {
            html: String::new(),
            fragments,
            ..PageBundle::default()
        };
        let err = bundle.into_document().unwrap_err();
        assert!(err.to_string().contains("mwf0"));
    }
}
