//! Content-fragment store.
//!
//! Sealed extension output points at its content by id instead of holding
//! it as children. The store maps those ids to detached subtrees of the
//! owning document.

use crate::node::NodeId;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct ContentStore {
    fragments: IndexMap<String, NodeId>,
    next_id: usize,
}

impl ContentStore {
    /// Store `node` under a fresh `mwf<N>` id.
    pub fn put(&mut self, node: NodeId) -> String {
        let id = format!("mwf{}", self.next_id);
        self.next_id += 1;
        self.fragments.insert(id.clone(), node);
        id
    }

    /// Store `node` under a caller-chosen id.
    pub fn insert(&mut self, id: &str, node: NodeId) {
        if let Some(n) = id.strip_prefix("mwf").and_then(|n| n.parse::<usize>().ok()) {
            self.next_id = self.next_id.max(n + 1);
        }
        self.fragments.insert(id.to_string(), node);
    }

    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.fragments.get(id).copied()
    }

    pub fn clear(&mut self, id: &str) -> bool {
        self.fragments.shift_remove(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_skip_inserted_ids() {
        let mut store = ContentStore::default();
        store.insert("mwf4", NodeId(1));
        assert_eq!(store.put(NodeId(2)), "mwf5");
        assert_eq!(store.get("mwf4"), Some(NodeId(1)));
    }

    #[test]
    fn test_cleared_ids_are_not_reused() {
        let mut store = ContentStore::default();
        let a = store.put(NodeId(1));
        assert!(store.clear(&a));
        let b = store.put(NodeId(2));
        assert_ne!(a, b);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![b.as_str()]);
    }
}
