//! Per-directed-hop utilization counters.
//!
//! A counter is the number of installed flow entries forwarding over that hop
//! in that direction. `(u, v)` and `(v, u)` are distinct counters. Counters
//! exist from the moment a link is added and are deleted when the link goes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::topology::{DirectedHop, LinkKey};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkUtilization {
    counters: BTreeMap<DirectedHop, u64>,
}

/// One counter as exposed to readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopUtilization {
    pub from: String,
    pub to: String,
    pub flows: u64,
}

impl LinkUtilization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start both directions of a new link at zero
    pub fn track_link(&mut self, link: &LinkKey) {
        for hop in link.hops() {
            self.counters.insert(hop, 0);
        }
    }

    /// Delete both directions of a link
    pub fn forget_link(&mut self, link: &LinkKey) {
        for hop in link.hops() {
            self.counters.remove(&hop);
        }
    }

    /// Delete every counter touching `node`
    pub fn forget_node(&mut self, node: &str) {
        self.counters.retain(|hop, _| !hop.touches(node));
    }

    pub fn increment(&mut self, hop: DirectedHop) {
        *self.counters.entry(hop).or_insert(0) += 1;
    }

    /// Counter for a directed hop, `None` if the hop is not tracked
    pub fn get(&self, from: &str, to: &str) -> Option<u64> {
        self.counters.get(&DirectedHop::new(from, to)).copied()
    }

    /// Counter for a directed hop, zero if the hop is not tracked
    pub fn count(&self, from: &str, to: &str) -> u64 {
        self.get(from, to).unwrap_or(0)
    }

    /// Zero every counter, keeping the tracked hops
    pub fn reset(&mut self) {
        for count in self.counters.values_mut() {
            *count = 0;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DirectedHop, u64)> {
        self.counters.iter().map(|(hop, count)| (hop, *count))
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Sum of all counters
    pub fn total(&self) -> u64 {
        self.counters.values().sum()
    }
}
