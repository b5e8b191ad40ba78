//! Node storage for the arena tree.

use crate::data::{DataMw, DataParsoid};
use indexmap::IndexMap;
use std::fmt;
use std::ops::Range;

/// Handle to a node in a [`Document`](crate::Document).
///
/// Handles are only meaningful for the document that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
    /// A parentless container, like a DOM `DocumentFragment`.
    Fragment,
}

/// Name and attributes of an element.
///
/// `data-parsoid` and `data-mw` are not kept here; they live in the node's
/// typed bags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementData {
    pub name: String,
    pub attrs: IndexMap<String, String>,
}

/// Where a node's markup came from: a range of one of the markup strings
/// the document has parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Origin {
    pub input: usize,
    pub range: Range<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub dp: DataParsoid,
    pub dmw: Option<DataMw>,
    pub origin: Option<Origin>,
    pub modified: bool,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            dp: DataParsoid::default(),
            dmw: None,
            origin: None,
            modified: false,
        }
    }
}
