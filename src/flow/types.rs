//! Flow entry records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::topology::NodeId;

/// Rule priority; higher is preferred by a forwarding plane
pub type Priority = i32;

/// Priority used when a request does not name one
pub const DEFAULT_PRIORITY: Priority = 1;

/// Destination-based match criterion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowMatch {
    pub destination: NodeId,
}

impl fmt::Display for FlowMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dst={}", self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowAction {
    Forward { next_hop: NodeId },
}

impl fmt::Display for FlowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowAction::Forward { next_hop } => write!(f, "forward to {}", next_hop),
        }
    }
}

/// A forwarding rule installed on one switch. Never mutated after install.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowEntry {
    #[serde(rename = "match")]
    pub flow_match: FlowMatch,
    pub action: FlowAction,
    pub priority: Priority,
    pub backup: bool,
}

impl FlowEntry {
    pub fn forward(destination: NodeId, next_hop: NodeId, priority: Priority, backup: bool) -> Self {
        Self {
            flow_match: FlowMatch { destination },
            action: FlowAction::Forward { next_hop },
            priority,
            backup,
        }
    }

    pub fn destination(&self) -> &NodeId {
        &self.flow_match.destination
    }

    pub fn next_hop(&self) -> &NodeId {
        match &self.action {
            FlowAction::Forward { next_hop } => next_hop,
        }
    }
}

impl fmt::Display for FlowEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "match {} action {} priority {}{}",
            self.flow_match,
            self.action,
            self.priority,
            if self.backup { " (backup)" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_entry_display() {
        let entry = FlowEntry::forward("D".into(), "B".into(), 5, false);
        assert_eq!(entry.to_string(), "match dst=D action forward to B priority 5");
        let backup = FlowEntry::forward("D".into(), "C".into(), 4, true);
        assert_eq!(backup.to_string(), "match dst=D action forward to C priority 4 (backup)");
        assert_eq!(backup.next_hop().as_str(), "C");
    }

    #[test]
    fn test_flow_entry_serializes_match_field() {
        let entry = FlowEntry::forward("D".into(), "B".into(), 1, true);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["match"]["destination"], "D");
        assert_eq!(json["action"]["type"], "forward");
        assert_eq!(json["action"]["next_hop"], "B");
        assert_eq!(json["backup"], true);
    }
}
