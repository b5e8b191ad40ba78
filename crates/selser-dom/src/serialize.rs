//! Tree to markup conversion.

use crate::data::{DataMw, DataParsoid};
use crate::document::Document;
use crate::node::{NodeData, NodeId};
use crate::parse::is_void_element;
use quick_xml::escape::{escape, partial_escape};
use serde::Serialize;

/// Options for [`Document::serialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit only the node's children.
    pub inner: bool,
    /// Re-emit nodes that were parsed from markup and never modified as
    /// their original bytes (selective serialization).
    pub preserve_unmodified_verbatim: bool,
}

impl SerializeOptions {
    pub fn inner() -> Self {
        Self {
            inner: true,
            ..Self::default()
        }
    }

    pub fn verbatim(mut self) -> Self {
        self.preserve_unmodified_verbatim = true;
        self
    }
}

fn json_attr<T: Serialize>(name: &str, value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(attribute = name, error = %err, "failed to store data attribute");
            "{}".to_string()
        }
    }
}

impl Document {
    /// Serialize `id` (or its children, with `inner`) to markup.
    pub fn serialize(&self, id: NodeId, opts: SerializeOptions) -> String {
        let mut out = String::new();
        if opts.inner {
            for &child in self.children(id) {
                self.write_node(child, opts, &mut out);
            }
        } else {
            self.write_node(id, opts, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        self.serialize(id, SerializeOptions::default())
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        self.serialize(id, SerializeOptions::inner())
    }

    fn write_node(&self, id: NodeId, opts: SerializeOptions, out: &mut String) {
        // Element nesting is unbounded, so walk with an explicit stack
        let mut stack = vec![Step::Open(id)];
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Open(id) => id,
                Step::Close(name) => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                    continue;
                }
            };

            let node = self.node(id);
            if opts.preserve_unmodified_verbatim && !node.modified {
                if let Some(src) = node.origin.as_ref().and_then(|origin| {
                    self.inputs
                        .get(origin.input)
                        .and_then(|input| input.get(origin.range.clone()))
                }) {
                    out.push_str(src);
                    continue;
                }
            }

            match &node.data {
                NodeData::Element(e) => {
                    out.push('<');
                    out.push_str(&e.name);
                    for (k, v) in &e.attrs {
                        write_attr(out, k, v);
                    }
                    if !node.dp.is_empty() {
                        write_attr(out, "data-parsoid", &json_attr::<DataParsoid>("data-parsoid", &node.dp));
                    }
                    if let Some(dmw) = &node.dmw {
                        write_attr(out, "data-mw", &json_attr::<DataMw>("data-mw", dmw));
                    }
                    if node.children.is_empty() && is_void_element(&e.name) {
                        out.push_str("/>");
                        continue;
                    }
                    out.push('>');
                    stack.push(Step::Close(&e.name));
                    stack.extend(node.children.iter().rev().map(|&c| Step::Open(c)));
                }
                NodeData::Text(t) => out.push_str(&partial_escape(t.as_str())),
                NodeData::Comment(t) => {
                    out.push_str("<!--");
                    out.push_str(t);
                    out.push_str("-->");
                }
                NodeData::Fragment => {
                    stack.extend(node.children.iter().rev().map(|&c| Step::Open(c)));
                }
            }
        }
    }
}

enum Step<'a> {
    Open(NodeId),
    Close(&'a str),
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}
