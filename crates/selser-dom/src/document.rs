//! The arena document and its tree API.

use crate::context::DiagnosticSink;
use crate::data::{DataMw, DataParsoid};
use crate::error::Result;
use crate::fragments::ContentStore;
use crate::node::{ElementData, Node, NodeData, NodeId};
use selser_source_map::OffsetType;

/// Default cap on nested embedded content and nested markers.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 40;

/// A document tree.
///
/// All nodes live in one arena owned by the document and are addressed by
/// [`NodeId`]. Detached nodes stay in the arena until the document is
/// dropped, so a handle never dangles.
///
/// Nothing is reclaimed before then: every parse of embedded HTML (by the
/// citation passes or by offset remapping) adds its nodes and a copy of its
/// input. Memory therefore grows with the number of passes run over one
/// document. Use a fresh `Document` per page rather than keeping one alive
/// across many remaps.
///
/// The document also owns the content-fragment store, the page source the
/// offset spans refer to, and the diagnostic sink for the transformation.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    pub(crate) inputs: Vec<String>,
    fragments: ContentStore,
    next_about: usize,
    source: Option<String>,
    offset_type: OffsetType,
    max_nesting_depth: usize,
    diagnostics: DiagnosticSink,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document whose root is an empty fragment.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Fragment)],
            root: NodeId(0),
            inputs: Vec::new(),
            fragments: ContentStore::default(),
            next_about: 0,
            source: None,
            offset_type: OffsetType::Byte,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            diagnostics: DiagnosticSink::new(),
        }
    }

    /// Parse `html` as the body of a new document.
    pub fn from_html(html: &str) -> Result<Self> {
        let mut doc = Self::new();
        let parsed = doc.parse_fragment(html)?;
        let root = doc.root;
        doc.migrate_children(parsed, root);
        doc.node_mut(root).modified = false;
        Ok(doc)
    }

    /// The body of the document.
    pub fn root(&self) -> NodeId {
        self.root
    }

    // ---------------------------------------------------------------------
    // Page source and settings
    // ---------------------------------------------------------------------

    /// The source text the offset spans refer to.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Set the source text and the numbering its offsets are counted in.
    pub fn set_source(&mut self, source: impl Into<String>, offset_type: OffsetType) {
        self.source = Some(source.into());
        self.offset_type = offset_type;
    }

    pub fn offset_type(&self) -> OffsetType {
        self.offset_type
    }

    pub fn set_offset_type(&mut self, offset_type: OffsetType) {
        self.offset_type = offset_type;
    }

    /// Length of the source in the current offset numbering.
    pub fn source_len(&self) -> Option<usize> {
        self.source
            .as_deref()
            .map(|s| self.offset_type.len_of(s))
    }

    pub fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    pub fn set_max_nesting_depth(&mut self, depth: usize) {
        self.max_nesting_depth = depth;
    }

    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticSink {
        &mut self.diagnostics
    }

    // ---------------------------------------------------------------------
    // Node creation and inspection
    // ---------------------------------------------------------------------

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Element(ElementData {
            name: name.into(),
            ..ElementData::default()
        })))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text.into())))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(Node::new(NodeData::Fragment))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element(_))
    }

    /// Tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element(e) => Some(&e.name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.tag_name(id) == Some(name)
    }

    /// Content of a text or comment node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(t) | NodeData::Comment(t) => Some(t),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeData::Text(t) | NodeData::Comment(t) = &mut self.node_mut(id).data {
            *t = text.into();
        }
        self.mark_modified(id);
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for d in self.descendants(id) {
            if let NodeData::Text(t) = &self.node(d).data {
                out.push_str(t);
            }
        }
        out
    }

    /// True if `id` or an ancestor was changed since it was parsed.
    pub fn is_modified(&self, id: NodeId) -> bool {
        self.node(id).modified
    }

    /// Mark `id` and all its ancestors as changed.
    pub fn mark_modified(&mut self, id: NodeId) {
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = self.node_mut(n);
            node.modified = true;
            cur = node.parent;
        }
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.node(id).parent?;
        let idx = self.node(parent).children.iter().position(|&c| c == id)?;
        Some((parent, idx))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, idx) = self.index_in_parent(id)?;
        self.node(parent).children.get(idx + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, idx) = self.index_in_parent(id)?;
        idx.checked_sub(1)
            .and_then(|i| self.node(parent).children.get(i).copied())
    }

    /// Nearest proper ancestor element with tag `name`.
    pub fn find_ancestor_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut cur = self.parent(id);
        while let Some(n) = cur {
            if self.is_element_named(n, name) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    /// All descendants of `id` in document order, not including `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.node(n).children.iter().rev().copied());
        }
        out
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Remove `id` from its parent. The node and its subtree stay valid.
    pub fn detach(&mut self, id: NodeId) {
        if let Some((parent, idx)) = self.index_in_parent(id) {
            self.node_mut(parent).children.remove(idx);
            self.node_mut(id).parent = None;
            self.mark_modified(parent);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        self.mark_modified(parent);
    }

    /// Insert `child` before `reference`, or at the end when `reference` is
    /// `None` or not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let idx = reference
            .and_then(|r| self.node(parent).children.iter().position(|&c| c == r))
            .unwrap_or(self.node(parent).children.len());
        self.node_mut(parent).children.insert(idx, child);
        self.node_mut(child).parent = Some(parent);
        self.mark_modified(parent);
    }

    /// Put `new` where `old` is and detach `old`.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) {
        if let Some(parent) = self.parent(old) {
            self.insert_before(parent, new, Some(old));
            self.detach(old);
        }
    }

    /// Move every child of `from` to the end of `to`.
    pub fn migrate_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.node_mut(from).children);
        if children.is_empty() {
            return;
        }
        self.mark_modified(from);
        for child in children {
            self.node_mut(child).parent = None;
            self.append_child(to, child);
        }
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        if children.is_empty() {
            return;
        }
        for child in children {
            self.node_mut(child).parent = None;
        }
        self.mark_modified(id);
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element(e) => e.attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Attributes of an element in document order.
    pub fn attrs(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        let attrs = match &self.node(id).data {
            NodeData::Element(e) => Some(&e.attrs),
            _ => None,
        };
        attrs
            .into_iter()
            .flat_map(|a| a.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let NodeData::Element(e) = &mut self.node_mut(id).data {
            e.attrs.insert(name.into(), value.into());
            self.mark_modified(id);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        let removed = match &mut self.node_mut(id).data {
            NodeData::Element(e) => e.attrs.shift_remove(name),
            _ => None,
        };
        if removed.is_some() {
            self.mark_modified(id);
        }
        removed
    }

    // ---------------------------------------------------------------------
    // typeof / class / rel word lists
    // ---------------------------------------------------------------------

    /// Words of a space-separated attribute.
    pub fn attr_words<'a>(&'a self, id: NodeId, name: &str) -> impl Iterator<Item = &'a str> {
        self.attr(id, name)
            .into_iter()
            .flat_map(|v| v.split_ascii_whitespace())
    }

    fn add_attr_word(&mut self, id: NodeId, name: &str, word: &str) {
        if self.attr_words(id, name).any(|w| w == word) {
            return;
        }
        let value = match self.attr(id, name) {
            Some(v) if !v.trim().is_empty() => format!("{} {}", v.trim(), word),
            _ => word.to_string(),
        };
        self.set_attr(id, name, value);
    }

    fn remove_attr_word(&mut self, id: NodeId, name: &str, word: &str) {
        if !self.attr_words(id, name).any(|w| w == word) {
            return;
        }
        let rest: Vec<&str> = self.attr_words(id, name).filter(|w| *w != word).collect();
        if rest.is_empty() {
            self.remove_attr(id, name);
        } else {
            let value = rest.join(" ");
            self.set_attr(id, name, value);
        }
    }

    pub fn has_type_of(&self, id: NodeId, ty: &str) -> bool {
        self.attr_words(id, "typeof").any(|w| w == ty)
    }

    pub fn add_type_of(&mut self, id: NodeId, ty: &str) {
        self.add_attr_word(id, "typeof", ty);
    }

    pub fn remove_type_of(&mut self, id: NodeId, ty: &str) {
        self.remove_attr_word(id, "typeof", ty);
    }

    /// Suffix of the first `typeof` word starting with `prefix`.
    pub fn type_of_with_prefix(&self, id: NodeId, prefix: &str) -> Option<&str> {
        self.attr_words(id, "typeof")
            .find_map(|w| w.strip_prefix(prefix))
    }

    /// Name of the extension whose output this element is (`mw:Extension/<name>`).
    pub fn ext_tag_name(&self, id: NodeId) -> Option<&str> {
        self.type_of_with_prefix(id, "mw:Extension/")
            .filter(|name| !name.is_empty())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr_words(id, "class").any(|w| w == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        self.add_attr_word(id, "class", class);
    }

    // ---------------------------------------------------------------------
    // Data bags
    // ---------------------------------------------------------------------

    pub fn data_parsoid(&self, id: NodeId) -> &DataParsoid {
        &self.node(id).dp
    }

    /// Mutable access to `data-parsoid`; marks the node modified.
    pub fn data_parsoid_mut(&mut self, id: NodeId) -> &mut DataParsoid {
        self.mark_modified(id);
        &mut self.node_mut(id).dp
    }

    pub fn set_data_parsoid(&mut self, id: NodeId, dp: DataParsoid) {
        self.mark_modified(id);
        self.node_mut(id).dp = dp;
    }

    pub fn data_mw(&self, id: NodeId) -> Option<&DataMw> {
        self.node(id).dmw.as_ref()
    }

    /// Mutable access to `data-mw`, creating an empty bag if needed; marks
    /// the node modified.
    pub fn data_mw_mut(&mut self, id: NodeId) -> &mut DataMw {
        self.mark_modified(id);
        self.node_mut(id).dmw.get_or_insert_with(DataMw::default)
    }

    pub fn set_data_mw(&mut self, id: NodeId, dmw: Option<DataMw>) {
        self.mark_modified(id);
        self.node_mut(id).dmw = dmw;
    }

    // ---------------------------------------------------------------------
    // About ids
    // ---------------------------------------------------------------------

    /// A fresh `#mwt<N>` about id, distinct from every id seen so far.
    pub fn new_about_id(&mut self) -> String {
        let id = format!("#mwt{}", self.next_about);
        self.next_about += 1;
        id
    }

    /// Record an about id read from markup so fresh ids never collide with it.
    pub(crate) fn note_about_id(&mut self, about: &str) {
        if let Some(n) = about
            .strip_prefix("#mwt")
            .and_then(|n| n.parse::<usize>().ok())
        {
            self.next_about = self.next_about.max(n + 1);
        }
    }

    // ---------------------------------------------------------------------
    // Content fragments
    // ---------------------------------------------------------------------

    /// Store a detached subtree and return its fragment id.
    pub fn put_fragment(&mut self, node: NodeId) -> String {
        self.detach(node);
        self.fragments.put(node)
    }

    /// Parse `html` and store the result under `id`, replacing any fragment
    /// already stored there.
    pub fn put_fragment_html(&mut self, id: &str, html: &str) -> Result<()> {
        let node = self.parse_fragment(html)?;
        self.fragments.insert(id, node);
        Ok(())
    }

    /// Root of the fragment stored under `id`.
    pub fn fragment(&self, id: &str) -> Option<NodeId> {
        self.fragments.get(id)
    }

    /// Release a fragment. Returns false if nothing was stored under `id`.
    pub fn clear_fragment(&mut self, id: &str) -> bool {
        self.fragments.clear(id)
    }

    /// Ids of every stored fragment, in insertion order.
    pub fn fragment_ids(&self) -> impl Iterator<Item = &str> {
        self.fragments.ids()
    }
}
