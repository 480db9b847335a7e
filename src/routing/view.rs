//! Read-only topology view.
//!
//! A view borrows the store immutably and hides a set of links. Backup-path
//! search runs on a view with the primary path's links excluded, so the shared
//! topology is never edited to answer a routing question.

use std::collections::BTreeSet;

use crate::topology::{LinkKey, NodeId, TopologyStore, Weight};

#[derive(Debug, Clone)]
pub struct TopologyView<'a> {
    store: &'a TopologyStore,
    excluded: BTreeSet<LinkKey>,
}

impl<'a> TopologyView<'a> {
    /// View of the whole topology
    pub fn full(store: &'a TopologyStore) -> Self {
        Self {
            store,
            excluded: BTreeSet::new(),
        }
    }

    /// View of the topology with `excluded` links hidden
    pub fn excluding<I>(store: &'a TopologyStore, excluded: I) -> Self
    where
        I: IntoIterator<Item = LinkKey>,
    {
        Self {
            store,
            excluded: excluded.into_iter().collect(),
        }
    }

    pub fn store(&self) -> &'a TopologyStore {
        self.store
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.store.has_node(id)
    }

    pub fn is_excluded(&self, a: &str, b: &str) -> bool {
        !self.excluded.is_empty() && self.excluded.contains(&LinkKey::new(a, b))
    }

    /// Visible neighbors of `node` in ascending identifier order
    pub fn neighbors<'s>(&'s self, node: &'s str) -> impl Iterator<Item = (&'a NodeId, Weight)> + 's {
        self.store
            .neighbors(node)
            .filter(move |(neighbor, _)| !self.is_excluded(node, neighbor.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_links_are_hidden_both_ways() {
        let mut store = TopologyStore::new();
        for node in ["A", "B", "C"] {
            store.add_node(node);
        }
        store.add_link("A", "B", 1).unwrap();
        store.add_link("A", "C", 1).unwrap();

        let view = TopologyView::excluding(&store, [LinkKey::new("B", "A")]);
        let from_a: Vec<_> = view.neighbors("A").map(|(n, _)| n.as_str()).collect();
        assert_eq!(from_a, vec!["C"]);
        assert_eq!(view.neighbors("B").count(), 0);
        assert!(view.is_excluded("A", "B"));

        // the store itself is untouched
        assert!(store.has_edge("A", "B"));
        assert_eq!(TopologyView::full(&store).neighbors("A").count(), 2);
    }
}
