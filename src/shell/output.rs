//! Plain-text renderings for the shell.

use std::fmt::Write;

use crate::flow::{BackupOutcome, FlowTable, InjectionReport};
use crate::routing::PathSet;
use crate::snapshot::{TopologySnapshot, UtilizationSnapshot};
use crate::topology::{DirectedHop, NodeId};

fn count(utilization: &UtilizationSnapshot, from: &NodeId, to: &NodeId) -> u64 {
    utilization
        .get(&DirectedHop::new(from.clone(), to.clone()))
        .copied()
        .unwrap_or(0)
}

pub fn topology(topology: &TopologySnapshot, utilization: &UtilizationSnapshot) -> String {
    let mut out = String::new();
    let names: Vec<&str> = topology.nodes.iter().map(NodeId::as_str).collect();
    let _ = writeln!(out, "Switches ({}): {}", names.len(), names.join(", "));
    let _ = writeln!(out, "Links ({}):", topology.links.len());
    for link in &topology.links {
        let _ = writeln!(
            out,
            "  {}-{} weight {}  {}->{}: {} flows  {}->{}: {} flows",
            link.a,
            link.b,
            link.weight,
            link.a,
            link.b,
            count(utilization, &link.a, &link.b),
            link.b,
            link.a,
            count(utilization, &link.b, &link.a),
        );
    }
    out
}

pub fn flow_table(table: &FlowTable) -> String {
    if table.is_empty() {
        return "Flow table is empty\n".to_string();
    }
    let mut out = String::new();
    for (switch, entries) in table.iter() {
        let _ = writeln!(out, "Switch {}:", switch);
        for entry in entries {
            let _ = writeln!(out, "  {}", entry);
        }
    }
    out
}

pub fn utilization(utilization: &UtilizationSnapshot) -> String {
    if utilization.is_empty() {
        return "No links\n".to_string();
    }
    let mut out = String::new();
    for (hop, flows) in utilization {
        let _ = writeln!(out, "{}: {} flows", hop, flows);
    }
    out
}

pub fn paths(set: &PathSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Shortest path: {} (cost {})", set.primary, set.cost);
    if set.paths.len() > 1 {
        let _ = writeln!(out, "Equal-cost paths ({}):", set.paths.len());
        for path in &set.paths {
            let _ = writeln!(out, "  {}", path);
        }
    }
    out
}

pub fn injection(report: &InjectionReport) -> String {
    let mut out = String::new();
    for path in &report.installed {
        let _ = writeln!(
            out,
            "Installed {} -> {} via {} (priority {})",
            report.src, report.dst, path, report.priority
        );
    }
    match &report.backup {
        BackupOutcome::Installed { path, priority } => {
            let _ = writeln!(out, "Backup path installed: {} (priority {})", path, priority);
        }
        BackupOutcome::Unavailable => {
            let _ = writeln!(out, "No backup path available for {} -> {}", report.src, report.dst);
        }
        BackupOutcome::NotRequested => {}
    }
    let _ = writeln!(out, "{} flow entries added", report.entries_installed);
    out
}
