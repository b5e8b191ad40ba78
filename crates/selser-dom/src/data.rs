//! Typed node data bags.
//!
//! Elements carry two JSON attributes that the engine reads and writes:
//! `data-parsoid` (private bookkeeping, including the element's source range)
//! and `data-mw` (the public description of extension and template output).
//! Both are loaded into the structs below when markup is parsed and stored
//! back when it is serialized. Members this crate does not model are kept in
//! `extra` so they round-trip untouched.

use indexmap::IndexMap;
use selser_source_map::OffsetSpan;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Contents of the `data-parsoid` attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataParsoid {
    /// Source range of the element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsr: Option<OffsetSpan>,

    /// Original source of the construct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Content fragment id of a sealed fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub empty: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub self_close: bool,

    /// Group of a bibliography list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Set on citation output hoisted out of a link.
    #[serde(default, skip_serializing_if = "is_false")]
    pub misnested: bool,

    /// Range of the extension tag's own markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext_tag_offsets: Option<OffsetSpan>,

    /// Parameter info of a transclusion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pi: Option<Value>,

    /// Scratch data that never leaves the process.
    #[serde(skip)]
    pub tmp: TempData,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataParsoid {
    /// True if storing this bag would produce `{}`.
    pub fn is_empty(&self) -> bool {
        self.dsr.is_none()
            && self.src.is_none()
            && self.html.is_none()
            && !self.empty
            && !self.self_close
            && self.group.is_none()
            && !self.misnested
            && self.ext_tag_offsets.is_none()
            && self.pi.is_none()
            && self.extra.is_empty()
    }
}

/// Process-private data attached to `data-parsoid`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TempData {
    /// Range the element had before a template or extension wrapped it.
    pub orig_dsr: Option<OffsetSpan>,
}

/// Contents of the `data-mw` attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMw {
    /// Extension name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Extension tag attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<DataMwBody>,

    /// Document-level errors reported on this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DataMwError>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_generated: bool,

    /// Caption HTML of inline media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Expanded attribute key/value pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribs: Vec<(AttribPart, AttribPart)>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataMw {
    /// A bag for the output of extension `name`.
    pub fn extension(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            attrs: Some(IndexMap::new()),
            ..Self::default()
        }
    }

    /// Look up an extension attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(name).map(String::as_str)
    }

    /// The embedded body HTML, if the body is stored inline.
    pub fn body_html(&self) -> Option<&str> {
        self.body.as_ref()?.html.as_deref()
    }
}

/// The body of an extension tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMwBody {
    /// Raw source of the body, as written by the author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extsrc: Option<String>,

    /// Body rendered as HTML and stored inline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Id of the element that holds the rendered body elsewhere in the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl DataMwBody {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            ..Self::default()
        }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// One entry of `data-mw.errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMwError {
    /// Message key, e.g. `cite_error_references_duplicate_key`.
    pub key: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl DataMwError {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Key or value of an expanded attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttribPart {
    /// Plain text.
    Text(String),
    /// Text with an HTML rendering.
    Rich(RichAttribPart),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichAttribPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_parsoid_roundtrip_keeps_unknown_members() {
        let json = r#"{"dsr":[0,10,3,4],"stx":"html","selfClose":true}"#;
        let dp: DataParsoid = serde_json::from_str(json).unwrap();
        assert_eq!(dp.dsr, Some(OffsetSpan::new(0, 10, 3, 4)));
        assert!(dp.self_close);
        assert_eq!(dp.extra["stx"], "html");
        assert_eq!(
            serde_json::to_string(&dp).unwrap(),
            r#"{"dsr":[0,10,3,4],"selfClose":true,"stx":"html"}"#
        );
    }

    #[test]
    fn test_data_parsoid_null_widths() {
        let dp: DataParsoid = serde_json::from_str(r#"{"dsr":[5,9,null,null]}"#).unwrap();
        assert_eq!(dp.dsr, Some(OffsetSpan::new(5, 9, 0, 0)));
    }

    #[test]
    fn test_empty_bag() {
        assert!(DataParsoid::default().is_empty());
        assert_eq!(serde_json::to_string(&DataMw::default()).unwrap(), "{}");
    }

    #[test]
    fn test_data_mw_ref() {
        let json = r#"{"name":"ref","attrs":{"name":"x","group":"note"},"body":{"extsrc":"foo"}}"#;
        let dmw: DataMw = serde_json::from_str(json).unwrap();
        assert_eq!(dmw.attr("name"), Some("x"));
        assert_eq!(dmw.attr("group"), Some("note"));
        assert_eq!(dmw.attr("follow"), None);
        assert_eq!(dmw.body.unwrap().extsrc.as_deref(), Some("foo"));
    }

    #[test]
    fn test_attribs() {
        let json = r#"{"attribs":[[{"txt":"title"},{"html":"<b>x</b>"}],["k","v"]]}"#;
        let dmw: DataMw = serde_json::from_str(json).unwrap();
        assert_eq!(dmw.attribs.len(), 2);
        match &dmw.attribs[0].1 {
            AttribPart::Rich(rich) => assert_eq!(rich.html.as_deref(), Some("<b>x</b>")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(serde_json::to_string(&dmw).unwrap(), json);
    }

    #[test]
    fn test_errors_serialize_without_empty_params() {
        let mut dmw = DataMw::default();
        dmw.errors.push(DataMwError::new("cite_error_ref_no_key"));
        dmw.errors
            .push(DataMwError::new("cite_error_references_missing_key").with_param("x"));
        assert_eq!(
            serde_json::to_string(&dmw).unwrap(),
            r#"{"errors":[{"key":"cite_error_ref_no_key"},{"key":"cite_error_references_missing_key","params":["x"]}]}"#
        );
    }
}
