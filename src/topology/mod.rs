//! Network topology module.
//!
//! This module owns the switch graph: node identities, weighted undirected
//! links, and the directed-hop keys used for utilization accounting.

pub mod types;
pub mod store;

// Re-export key types for easier access
pub use types::{DirectedHop, Link, LinkKey, NodeId, Weight, DEFAULT_WEIGHT};
pub use store::TopologyStore;
