//! # sdnsim - a simulation-scale SDN controller
//!
//! This library models the control plane of a software-defined network: a
//! graph of switches joined by weighted links, shortest-path routing over it,
//! per-switch forwarding tables, per-direction link utilization, and link
//! failures.
//!
//! ## Overview
//!
//! Every operation goes through a [`Controller`], which owns the topology, the
//! installed flow entries and the utilization counters. Operations run to
//! completion one at a time and either succeed or leave state unchanged.
//!
//! ## Key Features
//!
//! - **Deterministic routing**: Dijkstra with lexicographic tie-breaking, so
//!   equal inputs always install equal tables
//! - **Equal-cost multipath**: every shortest path is installed, not just one
//! - **Critical flows**: a link-disjoint backup path at one lower priority
//! - **Failure simulation**: links fail without tearing down installed entries
//!   (or with, under the `purge` policy)
//! - **Snapshots**: JSON and GraphViz DOT renderings for external tools
//!
//! ## Architecture
//!
//! - `topology`: switch/link records and the adjacency store
//! - `routing`: path computation and edge-excluding topology views
//! - `flow`: flow entries, flow table, utilization counters, provisioning
//! - `failure`: link failure simulation
//! - `controller`: the context object tying the above together
//! - `events`: notifications emitted by the controller
//! - `snapshot`: read-only views and renderings
//! - `config` / `config_loader`: YAML configuration
//! - `gml_parser`: GML topology import
//! - `shell`: the line-oriented command shell used by the binary
//!
//! ## Example Usage
//!
//! ```rust
//! use sdnsim::{Controller, FlowRequest};
//!
//! let mut controller = Controller::default();
//! for node in ["A", "B", "C", "D"] {
//!     controller.add_node(node);
//! }
//! for (a, b) in [("A", "B"), ("B", "D"), ("A", "C"), ("C", "D")] {
//!     controller.add_link(a, b, 1)?;
//! }
//!
//! let report = controller.inject_flow(FlowRequest::new("A", "D").priority(5))?;
//! assert_eq!(report.installed.len(), 2);
//! # Ok::<(), sdnsim::ControllerError>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   log_level: info
//!
//! routing:
//!   default_priority: 1
//!   duplicate_links: reject          # or overwrite
//!   backup_exclusion: primary_path   # or all_primary_paths
//!   stale_flows: keep                # or purge
//!
//! topology:
//!   path: "lab.gml"
//! ```
//!
//! ## Error Handling
//!
//! Controller operations return [`ControllerError`]. File loading returns
//! `color_eyre::Result` with context attached at each step.

pub mod config;
pub mod config_loader;
pub mod controller;
pub mod error;
pub mod events;
pub mod failure;
pub mod flow;
pub mod gml_parser;
pub mod routing;
pub mod shell;
pub mod snapshot;
pub mod topology;

pub use config::{BackupExclusion, Config, DuplicateLinkPolicy, RoutingConfig, StaleFlowPolicy};
pub use controller::{Controller, LinkChange};
pub use error::ControllerError;
pub use events::{ControllerEvent, EventSink, LogSink, RecordingSink};
pub use failure::FailureOutcome;
pub use flow::{BackupOutcome, FlowEntry, FlowRequest, FlowTable, InjectionReport, LinkUtilization};
pub use routing::{Path, PathSet};
pub use snapshot::SnapshotReader;
pub use topology::{DirectedHop, LinkKey, NodeId, TopologyStore};
