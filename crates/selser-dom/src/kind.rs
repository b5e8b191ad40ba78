//! Classification of nodes by their `typeof` markers.

use crate::document::Document;
use crate::node::{NodeData, NodeId};

/// The kinds of node the transformation passes distinguish.
///
/// `typeof` is a word list, so one element can carry several markers; the
/// variants are checked in declaration order and the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Comment,
    Fragment,
    /// Unrendered extension output whose content sits in the fragment store
    /// (`mw:DOMFragment/sealed/<ext>`).
    SealedFragment { ext: String },
    /// Rendered extension output (`mw:Extension/<ext>`).
    ExtensionOutput { ext: String },
    /// Template output wrapper (`mw:Transclusion`).
    TransclusionWrapper,
    /// Element with template-expanded attributes (`mw:ExpandedAttrs`).
    ExpandedAttrs,
    /// Language variant markup (`mw:LanguageVariant`).
    LanguageVariant,
    /// Inline image, video or audio.
    InlineMedia,
    /// Any other element.
    Plain,
}

const MEDIA_TYPES: &[&str] = &["mw:File", "mw:Image", "mw:Video", "mw:Audio"];

impl Document {
    /// Extension name of a sealed fragment, if `id` is one.
    pub fn sealed_fragment_type(&self, id: NodeId) -> Option<&str> {
        self.type_of_with_prefix(id, "mw:DOMFragment/sealed/")
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '_'))
    }

    pub fn is_sealed_fragment_of_type(&self, id: NodeId, ext: &str) -> bool {
        self.sealed_fragment_type(id) == Some(ext)
    }

    /// A `span` whose `typeof` marks it as inline media.
    pub fn is_inline_media(&self, id: NodeId) -> bool {
        self.is_element_named(id, "span")
            && self.attr_words(id, "typeof").any(|w| {
                MEDIA_TYPES
                    .iter()
                    .any(|m| w == *m || w.strip_prefix(m).is_some_and(|rest| rest.starts_with('/')))
            })
    }

    pub fn classify(&self, id: NodeId) -> NodeKind {
        match self.data(id) {
            NodeData::Text(_) => return NodeKind::Text,
            NodeData::Comment(_) => return NodeKind::Comment,
            NodeData::Fragment => return NodeKind::Fragment,
            NodeData::Element(_) => {}
        }
        if let Some(ext) = self.sealed_fragment_type(id) {
            NodeKind::SealedFragment {
                ext: ext.to_string(),
            }
        } else if let Some(ext) = self.ext_tag_name(id) {
            NodeKind::ExtensionOutput {
                ext: ext.to_string(),
            }
        } else if self.has_type_of(id, "mw:Transclusion") {
            NodeKind::TransclusionWrapper
        } else if self.has_type_of(id, "mw:ExpandedAttrs") {
            NodeKind::ExpandedAttrs
        } else if self.has_type_of(id, "mw:LanguageVariant") {
            NodeKind::LanguageVariant
        } else if self.is_inline_media(id) {
            NodeKind::InlineMedia
        } else {
            NodeKind::Plain
        }
    }
}
