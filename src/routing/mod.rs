//! Path computation over the switch graph.
//!
//! - `view`: a read-only topology view with an optional set of excluded links
//! - `dijkstra`: shortest path, equal-cost path set, and edge-excluding search
//!
//! Ties between equal-cost paths are broken lexicographically on the node
//! sequence, so results are reproducible regardless of insertion order.

pub mod view;
pub mod dijkstra;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::topology::{DirectedHop, LinkKey, NodeId, TopologyStore};

pub use dijkstra::{all_shortest_paths, compute_paths, shortest_path, shortest_path_excluding};
pub use view::TopologyView;

/// An ordered, non-empty sequence of switches from source to destination inclusive
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<NodeId>);

impl Path {
    /// Build a path from a node sequence. Returns `None` for an empty sequence.
    pub fn from_nodes<I, N>(nodes: I) -> Option<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        let nodes: Vec<NodeId> = nodes.into_iter().map(Into::into).collect();
        if nodes.is_empty() {
            None
        } else {
            Some(Self(nodes))
        }
    }

    pub(crate) fn single(node: NodeId) -> Self {
        Self(vec![node])
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    pub fn source(&self) -> &NodeId {
        &self.0[0]
    }

    pub fn destination(&self) -> &NodeId {
        &self.0[self.0.len() - 1]
    }

    /// Number of hops (links traversed)
    pub fn hop_count(&self) -> usize {
        self.0.len() - 1
    }

    /// Consecutive (switch, next hop) pairs in travel order
    pub fn hops(&self) -> impl Iterator<Item = DirectedHop> + '_ {
        self.0
            .windows(2)
            .map(|pair| DirectedHop::new(pair[0].clone(), pair[1].clone()))
    }

    /// Undirected links used by this path
    pub fn links(&self) -> impl Iterator<Item = LinkKey> + '_ {
        self.0
            .windows(2)
            .map(|pair| LinkKey::new(pair[0].clone(), pair[1].clone()))
    }

    /// Total weight of the path in `topology`, or `None` if a hop is missing
    pub fn cost(&self, topology: &TopologyStore) -> Option<u64> {
        self.0.windows(2).try_fold(0u64, |total, pair| {
            topology
                .edge_weight(pair[0].as_str(), pair[1].as_str())
                .map(|weight| total + u64::from(weight))
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

/// Result of a routing request: the primary path plus every equal-cost path.
///
/// `paths` is in lexicographic order and its first element is `primary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSet {
    pub primary: Path,
    pub paths: Vec<Path>,
    pub cost: u64,
}
