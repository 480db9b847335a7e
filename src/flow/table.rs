//! Per-switch flow tables.
//!
//! Entries keep installation order. Nothing here sorts by priority; that is
//! left to whatever forwarding plane consumes the table.

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::FlowEntry;
use crate::topology::{DirectedHop, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlowTable {
    switches: BTreeMap<NodeId, Vec<FlowEntry>>,
}

impl FlowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to a switch's table
    pub fn append(&mut self, switch: NodeId, entry: FlowEntry) {
        self.switches.entry(switch).or_default().push(entry);
    }

    /// Entries of one switch in installation order; empty for unknown switches
    pub fn entries(&self, switch: &str) -> &[FlowEntry] {
        self.switches.get(switch).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &[FlowEntry])> {
        self.switches.iter().map(|(switch, entries)| (switch, entries.as_slice()))
    }

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    pub fn entry_count(&self) -> usize {
        self.switches.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    /// Remove every entry, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.entry_count();
        self.switches.clear();
        removed
    }

    /// Remove entries whose (switch, next hop) traverses `hop`
    pub fn purge_hop(&mut self, hop: &DirectedHop) -> usize {
        let Some(entries) = self.switches.get_mut(&hop.from) else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|entry| entry.next_hop() != &hop.to);
        let removed = before - entries.len();
        if entries.is_empty() {
            self.switches.remove(&hop.from);
        }
        removed
    }

    /// Remove the switch's own table and every entry forwarding to it
    pub fn purge_node(&mut self, node: &str) -> usize {
        let mut removed = self.switches.remove(node).map_or(0, |entries| entries.len());
        for entries in self.switches.values_mut() {
            let before = entries.len();
            entries.retain(|entry| entry.next_hop().as_str() != node);
            removed += before - entries.len();
        }
        self.switches.retain(|_, entries| !entries.is_empty());
        removed
    }
}
