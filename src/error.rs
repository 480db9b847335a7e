//! Controller error taxonomy.
//!
//! Structural errors (`NodeNotFound`, `LinkNotFound`, `DuplicateLink`, ...) are
//! returned to the caller of a mutation. Routing errors (`NoPath`,
//! `NoBackupPath`) are per-request conditions: they never leave the controller
//! in a partially-updated state.

use crate::topology::NodeId;

/// Errors produced by topology edits, path computation and flow provisioning
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("link {src}-{dst} not found")]
    LinkNotFound { src: NodeId, dst: NodeId },

    #[error("link {src}-{dst} already exists")]
    DuplicateLink { src: NodeId, dst: NodeId },

    #[error("link from {0} to itself is not allowed")]
    SelfLoop(NodeId),

    #[error("invalid link weight {0}: weights must be positive")]
    InvalidWeight(u32),

    #[error("no path between {src} and {dst}")]
    NoPath { src: NodeId, dst: NodeId },

    #[error("no backup path available for {src} -> {dst}")]
    NoBackupPath { src: NodeId, dst: NodeId },
}

impl ControllerError {
    /// True for the "referenced element does not exist" family
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_) | Self::LinkNotFound { .. })
    }

    /// True for per-request routing conditions
    pub fn is_routing(&self) -> bool {
        matches!(self, Self::NoPath { .. } | Self::NoBackupPath { .. })
    }
}
