//! Topology type definitions.
//!
//! Nodes are opaque string identifiers ordered lexicographically, which is what
//! every deterministic tie-break in routing relies on. Links are unordered
//! pairs; utilization is keyed by the directed hop a path takes.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Link weight. Always positive.
pub type Weight = u32;

/// Weight used when a link is added without one
pub const DEFAULT_WEIGHT: Weight = 1;

/// Identity of a switch in the topology
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

/// Unordered endpoint pair identifying an undirected link.
///
/// The smaller identifier is always stored first, so `LinkKey::new(a, b)` and
/// `LinkKey::new(b, a)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkKey {
    a: NodeId,
    b: NodeId,
}

impl LinkKey {
    pub fn new(x: impl Into<NodeId>, y: impl Into<NodeId>) -> Self {
        let (x, y) = (x.into(), y.into());
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn endpoints(&self) -> (&NodeId, &NodeId) {
        (&self.a, &self.b)
    }

    pub fn touches(&self, node: &str) -> bool {
        self.a.as_str() == node || self.b.as_str() == node
    }

    /// Both directed hops over this link
    pub fn hops(&self) -> [DirectedHop; 2] {
        [
            DirectedHop::new(self.a.clone(), self.b.clone()),
            DirectedHop::new(self.b.clone(), self.a.clone()),
        ]
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// A directed traversal of a link, from one switch to its next hop
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectedHop {
    pub from: NodeId,
    pub to: NodeId,
}

impl DirectedHop {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.to.clone(), self.from.clone())
    }

    /// The undirected link this hop travels over
    pub fn link(&self) -> LinkKey {
        LinkKey::new(self.from.clone(), self.to.clone())
    }

    pub fn touches(&self, node: &str) -> bool {
        self.from.as_str() == node || self.to.as_str() == node
    }
}

impl fmt::Display for DirectedHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// A link as seen by readers: endpoints in canonical order plus its weight
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: Weight,
}

impl Link {
    pub fn key(&self) -> LinkKey {
        LinkKey::new(self.a.clone(), self.b.clone())
    }
}
