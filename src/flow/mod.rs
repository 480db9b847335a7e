//! Flow provisioning.
//!
//! This module turns routed paths into per-switch forwarding entries and keeps
//! the per-directed-hop utilization counters in step with what is installed.

pub mod types;
pub mod table;
pub mod utilization;
pub mod provisioner;

pub use types::{FlowAction, FlowEntry, FlowMatch, Priority, DEFAULT_PRIORITY};
pub use table::FlowTable;
pub use utilization::{HopUtilization, LinkUtilization};
pub use provisioner::{BackupOutcome, FlowProvisioner, FlowRequest, InjectionReport};
