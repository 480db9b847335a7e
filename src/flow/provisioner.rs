//! Flow provisioner.
//!
//! Owns the flow table and the utilization counters. A request is routed
//! against the current topology, every equal-cost path is installed, and a
//! critical request additionally gets a backup path found on a view with the
//! primary links hidden.
//!
//! Installation is not idempotent: installing the same path twice appends a
//! second set of entries and counts every hop twice.

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use super::table::FlowTable;
use super::types::{FlowEntry, Priority, DEFAULT_PRIORITY};
use super::utilization::LinkUtilization;
use crate::config::{BackupExclusion, StaleFlowPolicy};
use crate::error::ControllerError;
use crate::routing::{self, Path};
use crate::topology::{LinkKey, NodeId, TopologyStore};

/// A connect request between two switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRequest {
    pub src: NodeId,
    pub dst: NodeId,
    pub priority: Priority,
    pub critical: bool,
}

impl FlowRequest {
    pub fn new(src: impl Into<NodeId>, dst: impl Into<NodeId>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            priority: DEFAULT_PRIORITY,
            critical: false,
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Priority given to the backup path of a critical request
    pub fn backup_priority(&self) -> Priority {
        self.priority.saturating_sub(1)
    }
}

/// What happened to the backup half of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackupOutcome {
    /// The request was not critical, or source and destination coincide
    NotRequested,
    /// A backup path was installed at the given priority
    Installed { path: Path, priority: Priority },
    /// No route survives once the primary links are excluded
    Unavailable,
}

/// Outcome of a successful `inject_flow`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionReport {
    pub src: NodeId,
    pub dst: NodeId,
    pub priority: Priority,
    pub cost: u64,
    /// First equal-cost path; the one whose links a backup avoids
    pub primary: Path,
    /// Every equal-cost path that was installed, primary first
    pub installed: Vec<Path>,
    pub backup: BackupOutcome,
    /// Flow entries appended to the table by this request
    pub entries_installed: usize,
}

impl InjectionReport {
    /// `NoBackupPath` when a critical request ended up without a backup
    pub fn backup_error(&self) -> Option<ControllerError> {
        match self.backup {
            BackupOutcome::Unavailable => Some(ControllerError::NoBackupPath {
                src: self.src.clone(),
                dst: self.dst.clone(),
            }),
            _ => None,
        }
    }

    pub fn backup_path(&self) -> Option<&Path> {
        match &self.backup {
            BackupOutcome::Installed { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlowProvisioner {
    table: FlowTable,
    utilization: LinkUtilization,
}

impl FlowProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &FlowTable {
        &self.table
    }

    pub fn utilization(&self) -> &LinkUtilization {
        &self.utilization
    }

    /// Install forwarding entries along `path`.
    ///
    /// For each hop `(u, v)`, switch `u` gets an entry matching the path's
    /// destination and forwarding to `v`, and the `(u, v)` counter goes up by
    /// one. Returns the number of entries appended.
    pub fn install_path(&mut self, path: &Path, priority: Priority, backup: bool) -> usize {
        let destination = path.destination();
        let mut installed = 0;
        for hop in path.hops() {
            let entry = FlowEntry::forward(destination.clone(), hop.to.clone(), priority, backup);
            self.table.append(hop.from.clone(), entry);
            self.utilization.increment(hop);
            installed += 1;
        }
        debug!(
            "provisioner: installed {} entries for {} (priority {}, backup {})",
            installed, path, priority, backup
        );
        installed
    }

    /// Route and install a request.
    ///
    /// Returns `Err` (with nothing installed) when an endpoint is missing or
    /// no route exists. A missing backup is not an error: the primaries stay
    /// installed and the report says `BackupOutcome::Unavailable`.
    pub fn inject_flow(
        &mut self,
        topology: &TopologyStore,
        request: &FlowRequest,
        exclusion: BackupExclusion,
    ) -> Result<InjectionReport, ControllerError> {
        let set = routing::compute_paths(topology, request.src.as_str(), request.dst.as_str())?;

        let mut entries_installed = 0;
        for path in &set.paths {
            entries_installed += self.install_path(path, request.priority, false);
        }

        // A path without hops has no links for a backup to avoid
        let backup = if request.critical && set.primary.hop_count() > 0 {
            let excluded: BTreeSet<LinkKey> = match exclusion {
                BackupExclusion::PrimaryPath => set.primary.links().collect(),
                BackupExclusion::AllPrimaryPaths => set.paths.iter().flat_map(|path| path.links()).collect(),
            };
            match routing::shortest_path_excluding(topology, request.src.as_str(), request.dst.as_str(), &excluded) {
                Ok(path) => {
                    let priority = request.backup_priority();
                    entries_installed += self.install_path(&path, priority, true);
                    BackupOutcome::Installed { path, priority }
                }
                Err(ControllerError::NoPath { .. }) => BackupOutcome::Unavailable,
                Err(other) => return Err(other),
            }
        } else {
            BackupOutcome::NotRequested
        };

        Ok(InjectionReport {
            src: request.src.clone(),
            dst: request.dst.clone(),
            priority: request.priority,
            cost: set.cost,
            primary: set.primary,
            installed: set.paths,
            backup,
            entries_installed,
        })
    }

    /// Remove every entry and zero every counter
    pub fn clear(&mut self) -> usize {
        self.utilization.reset();
        self.table.clear()
    }

    /// Start tracking a newly added link
    pub fn link_added(&mut self, link: &LinkKey) {
        self.utilization.track_link(link);
    }

    /// Drop state derived from a removed link. Returns purged entry count.
    pub fn link_removed(&mut self, link: &LinkKey, policy: StaleFlowPolicy) -> usize {
        self.utilization.forget_link(link);
        match policy {
            StaleFlowPolicy::Keep => 0,
            StaleFlowPolicy::Purge => link.hops().iter().map(|hop| self.table.purge_hop(hop)).sum(),
        }
    }

    /// Drop state derived from a removed node and its links
    pub fn node_removed(&mut self, node: &str, links: &[LinkKey], policy: StaleFlowPolicy) -> usize {
        let mut purged = 0;
        for link in links {
            purged += self.link_removed(link, policy);
        }
        self.utilization.forget_node(node);
        if policy == StaleFlowPolicy::Purge {
            purged += self.table.purge_node(node);
        }
        purged
    }
}
