//! Topology store.
//!
//! Holds the node set and the weighted undirected link set as a sorted
//! adjacency map. Every link is recorded under both endpoints with the same
//! weight; the two entries are always added and removed together.

use std::collections::BTreeMap;

use log::debug;

use super::types::{Link, LinkKey, NodeId, Weight};
use crate::error::ControllerError;

#[derive(Debug, Clone, Default)]
pub struct TopologyStore {
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, Weight>>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns `false` if it was already present.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> bool {
        let id = id.into();
        if self.adjacency.contains_key(&id) {
            return false;
        }
        debug!("topology: inserting node {}", id);
        self.adjacency.insert(id, BTreeMap::new());
        true
    }

    /// Remove a node together with every link incident to it.
    ///
    /// Returns the removed links so callers can drop state derived from them.
    pub fn remove_node(&mut self, id: &str) -> Result<Vec<LinkKey>, ControllerError> {
        let (node, neighbors) = self
            .adjacency
            .remove_entry(id)
            .ok_or_else(|| ControllerError::NodeNotFound(NodeId::from(id)))?;

        let mut removed = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors.into_keys() {
            if let Some(adjacent) = self.adjacency.get_mut(&neighbor) {
                adjacent.remove(id);
            }
            removed.push(LinkKey::new(node.clone(), neighbor));
        }
        debug!("topology: removed node {} and {} incident links", node, removed.len());
        Ok(removed)
    }

    /// Create an undirected link between two existing nodes.
    ///
    /// Fails if either endpoint is missing, the link already exists, the
    /// endpoints are the same node, or the weight is zero.
    pub fn add_link(&mut self, src: &str, dst: &str, weight: Weight) -> Result<LinkKey, ControllerError> {
        self.check_new_link(src, dst, weight)?;
        if self.has_edge(src, dst) {
            return Err(ControllerError::DuplicateLink {
                src: NodeId::from(src),
                dst: NodeId::from(dst),
            });
        }
        self.insert_link(src, dst, weight);
        Ok(LinkKey::new(src, dst))
    }

    /// Change the weight of an existing link, returning the previous weight
    pub fn set_link_weight(&mut self, src: &str, dst: &str, weight: Weight) -> Result<Weight, ControllerError> {
        self.check_new_link(src, dst, weight)?;
        let previous = self.edge_weight(src, dst).ok_or_else(|| ControllerError::LinkNotFound {
            src: NodeId::from(src),
            dst: NodeId::from(dst),
        })?;
        self.insert_link(src, dst, weight);
        Ok(previous)
    }

    /// Remove a link, returning its weight
    pub fn remove_link(&mut self, src: &str, dst: &str) -> Result<Weight, ControllerError> {
        let weight = self.edge_weight(src, dst).ok_or_else(|| ControllerError::LinkNotFound {
            src: NodeId::from(src),
            dst: NodeId::from(dst),
        })?;
        if let Some(adjacent) = self.adjacency.get_mut(src) {
            adjacent.remove(dst);
        }
        if let Some(adjacent) = self.adjacency.get_mut(dst) {
            adjacent.remove(src);
        }
        debug!("topology: removed link {}-{}", src, dst);
        Ok(weight)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    pub fn has_edge(&self, src: &str, dst: &str) -> bool {
        self.edge_weight(src, dst).is_some()
    }

    pub fn edge_weight(&self, src: &str, dst: &str) -> Option<Weight> {
        self.adjacency.get(src)?.get(dst).copied()
    }

    /// Neighbors of `node` in ascending identifier order, with link weights.
    /// Empty for an unknown node.
    pub fn neighbors<'a>(&'a self, node: &str) -> impl Iterator<Item = (&'a NodeId, Weight)> + 'a {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|adjacent| adjacent.iter().map(|(id, weight)| (id, *weight)))
    }

    /// All nodes in ascending identifier order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.adjacency.keys()
    }

    /// All links, each reported once with its endpoints in canonical order
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.adjacency.iter().flat_map(|(a, adjacent)| {
            adjacent
                .iter()
                .filter(move |(b, _)| a < *b)
                .map(move |(b, weight)| Link {
                    a: a.clone(),
                    b: b.clone(),
                    weight: *weight,
                })
        })
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn link_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Resolve a node name to the stored identifier
    pub fn node(&self, id: &str) -> Result<&NodeId, ControllerError> {
        self.adjacency
            .get_key_value(id)
            .map(|(node, _)| node)
            .ok_or_else(|| ControllerError::NodeNotFound(NodeId::from(id)))
    }

    fn check_new_link(&self, src: &str, dst: &str, weight: Weight) -> Result<(), ControllerError> {
        self.node(src)?;
        self.node(dst)?;
        if src == dst {
            return Err(ControllerError::SelfLoop(NodeId::from(src)));
        }
        if weight == 0 {
            return Err(ControllerError::InvalidWeight(weight));
        }
        Ok(())
    }

    fn insert_link(&mut self, src: &str, dst: &str, weight: Weight) {
        if let Some(adjacent) = self.adjacency.get_mut(src) {
            adjacent.insert(NodeId::from(dst), weight);
        }
        if let Some(adjacent) = self.adjacency.get_mut(dst) {
            adjacent.insert(NodeId::from(src), weight);
        }
    }
}
