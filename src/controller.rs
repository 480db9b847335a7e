//! The controller context.
//!
//! `Controller` bundles the topology store, the flow provisioner, the routing
//! policy and an event sink. Every operation of the control plane goes through
//! it, and each one runs to completion before returning; there is no internal
//! locking, so sharing a controller between threads needs an outer `Mutex`.

use log::debug;

use crate::config::{DuplicateLinkPolicy, RoutingConfig};
use crate::error::ControllerError;
use crate::events::{ControllerEvent, EventSink, LogSink};
use crate::failure::{self, FailureOutcome};
use crate::flow::{BackupOutcome, FlowProvisioner, FlowRequest, FlowTable, InjectionReport, LinkUtilization};
use crate::routing::{self, PathSet};
use crate::snapshot::{SnapshotReader, TopologySnapshot, UtilizationSnapshot};
use crate::topology::{LinkKey, NodeId, TopologyStore, Weight};

/// What `add_link` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    Added,
    /// The link existed and the overwrite policy replaced its weight
    WeightUpdated { old: Weight },
}

pub struct Controller<S: EventSink = LogSink> {
    topology: TopologyStore,
    provisioner: FlowProvisioner,
    config: RoutingConfig,
    sink: S,
}

impl Controller<LogSink> {
    /// Controller reporting through the `log` facade
    pub fn new(config: RoutingConfig) -> Self {
        Self::with_sink(config, LogSink)
    }
}

impl Default for Controller<LogSink> {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl<S: EventSink> Controller<S> {
    pub fn with_sink(config: RoutingConfig, sink: S) -> Self {
        Self {
            topology: TopologyStore::new(),
            provisioner: FlowProvisioner::new(),
            config,
            sink,
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn topology(&self) -> &TopologyStore {
        &self.topology
    }

    pub fn utilization(&self) -> &LinkUtilization {
        self.provisioner.utilization()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Add a switch. Adding an existing switch changes nothing and returns `false`.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> bool {
        let id = id.into();
        let inserted = self.topology.add_node(id.clone());
        if inserted {
            self.sink.emit(ControllerEvent::NodeAdded { node: id });
        } else {
            debug!("controller: node {} already present", id);
        }
        inserted
    }

    /// Remove a switch, its links, and their utilization counters
    pub fn remove_node(&mut self, id: &str) -> Result<Vec<LinkKey>, ControllerError> {
        let node = self.topology.node(id)?.clone();
        let removed = self.topology.remove_node(id)?;
        let purged = self
            .provisioner
            .node_removed(id, &removed, self.config.stale_flows);

        self.sink.emit(ControllerEvent::NodeRemoved {
            node,
            removed_links: removed.len(),
        });
        self.report_purge(purged);
        Ok(removed)
    }

    /// Add a link between two existing switches.
    ///
    /// An existing link is either rejected with `DuplicateLink` or has its
    /// weight replaced, depending on the configured policy.
    pub fn add_link(&mut self, src: &str, dst: &str, weight: Weight) -> Result<LinkChange, ControllerError> {
        if self.topology.has_edge(src, dst) && self.config.duplicate_links == DuplicateLinkPolicy::Overwrite {
            let old = self.topology.set_link_weight(src, dst, weight)?;
            self.sink.emit(ControllerEvent::LinkWeightUpdated {
                src: NodeId::from(src),
                dst: NodeId::from(dst),
                old,
                new: weight,
            });
            return Ok(LinkChange::WeightUpdated { old });
        }

        let key = self.topology.add_link(src, dst, weight)?;
        self.provisioner.link_added(&key);
        self.sink.emit(ControllerEvent::LinkAdded {
            src: NodeId::from(src),
            dst: NodeId::from(dst),
            weight,
        });
        Ok(LinkChange::Added)
    }

    /// Remove a link and its utilization counters, returning its weight
    pub fn remove_link(&mut self, src: &str, dst: &str) -> Result<Weight, ControllerError> {
        let weight = self.topology.remove_link(src, dst)?;
        let purged = self
            .provisioner
            .link_removed(&LinkKey::new(src, dst), self.config.stale_flows);

        self.sink.emit(ControllerEvent::LinkRemoved {
            src: NodeId::from(src),
            dst: NodeId::from(dst),
        });
        self.report_purge(purged);
        Ok(weight)
    }

    /// A request from `src` to `dst` at the configured default priority
    pub fn flow_request(&self, src: &str, dst: &str) -> FlowRequest {
        FlowRequest::new(src, dst).priority(self.config.default_priority)
    }

    /// Route and install a flow.
    ///
    /// `Err` means nothing was installed. A critical request without a backup
    /// still returns `Ok`; see `InjectionReport::backup_error`.
    pub fn inject_flow(&mut self, request: FlowRequest) -> Result<InjectionReport, ControllerError> {
        let result = self
            .provisioner
            .inject_flow(&self.topology, &request, self.config.backup_exclusion);

        let report = match result {
            Ok(report) => report,
            Err(err) => {
                if let ControllerError::NoPath { src, dst } = &err {
                    self.sink.emit(ControllerEvent::NoPath {
                        src: src.clone(),
                        dst: dst.clone(),
                    });
                }
                return Err(err);
            }
        };

        for path in &report.installed {
            self.sink.emit(ControllerEvent::FlowInstalled {
                src: report.src.clone(),
                dst: report.dst.clone(),
                path: path.clone(),
                priority: report.priority,
                backup: false,
            });
        }
        match &report.backup {
            BackupOutcome::Installed { path, priority } => {
                self.sink.emit(ControllerEvent::FlowInstalled {
                    src: report.src.clone(),
                    dst: report.dst.clone(),
                    path: path.clone(),
                    priority: *priority,
                    backup: true,
                });
            }
            BackupOutcome::Unavailable => {
                self.sink.emit(ControllerEvent::NoBackupPath {
                    src: report.src.clone(),
                    dst: report.dst.clone(),
                });
            }
            BackupOutcome::NotRequested => {}
        }

        Ok(report)
    }

    /// Fail a link if it exists. A missing link is reported, not an error.
    pub fn simulate_failure(&mut self, src: &str, dst: &str) -> FailureOutcome {
        let outcome = failure::simulate_failure(&mut self.topology, src, dst);
        match &outcome {
            FailureOutcome::Failed { link, .. } => {
                let purged = self.provisioner.link_removed(link, self.config.stale_flows);
                self.sink.emit(ControllerEvent::LinkRemoved {
                    src: NodeId::from(src),
                    dst: NodeId::from(dst),
                });
                self.sink.emit(ControllerEvent::LinkFailed {
                    src: NodeId::from(src),
                    dst: NodeId::from(dst),
                });
                self.report_purge(purged);
            }
            FailureOutcome::NotFound => {
                self.sink.emit(ControllerEvent::FailureTargetMissing {
                    src: NodeId::from(src),
                    dst: NodeId::from(dst),
                });
            }
        }
        outcome
    }

    /// Remove every installed entry and zero all counters
    pub fn clear_flow_table(&mut self) -> usize {
        let removed = self.provisioner.clear();
        self.sink.emit(ControllerEvent::FlowTableCleared { removed });
        removed
    }

    /// Route without installing anything
    pub fn compute_paths(&self, src: &str, dst: &str) -> Result<PathSet, ControllerError> {
        routing::compute_paths(&self.topology, src, dst)
    }

    fn report_purge(&mut self, purged: usize) {
        if purged > 0 {
            self.sink.emit(ControllerEvent::StaleFlowsPurged { count: purged });
        }
    }
}

impl<S: EventSink> SnapshotReader for Controller<S> {
    fn topology_snapshot(&self) -> TopologySnapshot {
        TopologySnapshot {
            nodes: self.topology.nodes().cloned().collect(),
            links: self.topology.links().collect(),
        }
    }

    fn utilization_snapshot(&self) -> UtilizationSnapshot {
        self.provisioner
            .utilization()
            .iter()
            .map(|(hop, count)| (hop.clone(), count))
            .collect()
    }

    fn flow_table(&self) -> &FlowTable {
        self.provisioner.table()
    }
}
