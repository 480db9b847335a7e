//! Read-only snapshots for presentation collaborators.
//!
//! Provides:
//! - `SnapshotReader`: the accessor trait the shell and renderers consume
//! - owned topology / utilization snapshots
//! - JSON and GraphViz DOT renderings of a snapshot

use std::collections::BTreeMap;

use serde::Serialize;

use crate::flow::{FlowTable, HopUtilization};
use crate::topology::{DirectedHop, Link, NodeId};

/// Node set and weighted link set at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopologySnapshot {
    pub nodes: Vec<NodeId>,
    pub links: Vec<Link>,
}

/// Directed hop -> number of installed entries over it
pub type UtilizationSnapshot = BTreeMap<DirectedHop, u64>;

/// Everything a renderer needs, in one serialisable value
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSnapshot {
    pub topology: TopologySnapshot,
    pub utilization: Vec<HopUtilization>,
    pub flow_table: FlowTable,
}

/// Read-only view of controller state.
///
/// Implementors hand out copies or shared references only.
pub trait SnapshotReader {
    fn topology_snapshot(&self) -> TopologySnapshot;

    fn utilization_snapshot(&self) -> UtilizationSnapshot;

    fn flow_table(&self) -> &FlowTable;

    fn network_snapshot(&self) -> NetworkSnapshot {
        let utilization = self
            .utilization_snapshot()
            .into_iter()
            .map(|(hop, flows)| HopUtilization {
                from: hop.from.to_string(),
                to: hop.to.to_string(),
                flows,
            })
            .collect();
        NetworkSnapshot {
            topology: self.topology_snapshot(),
            utilization,
            flow_table: self.flow_table().clone(),
        }
    }
}

/// Render a snapshot as pretty-printed JSON
pub fn to_json(snapshot: &NetworkSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// Generate GraphViz DOT format for visualization.
///
/// Each link is labelled with its weight and the flow count in both directions.
pub fn to_dot(topology: &TopologySnapshot, utilization: &UtilizationSnapshot) -> String {
    let count = |from: &NodeId, to: &NodeId| {
        utilization
            .get(&DirectedHop::new(from.clone(), to.clone()))
            .copied()
            .unwrap_or(0)
    };

    let mut dot = String::new();
    dot.push_str("graph SdnTopology {\n");
    dot.push_str("    node [shape=circle, style=filled, fillcolor=lightblue];\n\n");

    for node in &topology.nodes {
        dot.push_str(&format!("    \"{}\";\n", escape(node.as_str())));
    }
    if !topology.links.is_empty() {
        dot.push('\n');
    }

    for link in &topology.links {
        dot.push_str(&format!(
            "    \"{}\" -- \"{}\" [label=\"w={}\\n{}->{}: {} / {}->{}: {}\"];\n",
            escape(link.a.as_str()),
            escape(link.b.as_str()),
            link.weight,
            escape(link.a.as_str()),
            escape(link.b.as_str()),
            count(&link.a, &link.b),
            escape(link.b.as_str()),
            escape(link.a.as_str()),
            count(&link.b, &link.a),
        ));
    }

    dot.push_str("}\n");
    dot
}

fn escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TopologySnapshot, UtilizationSnapshot) {
        let topology = TopologySnapshot {
            nodes: vec!["A".into(), "B".into()],
            links: vec![Link {
                a: "A".into(),
                b: "B".into(),
                weight: 2,
            }],
        };
        let mut utilization = UtilizationSnapshot::new();
        utilization.insert(DirectedHop::new("A", "B"), 3);
        utilization.insert(DirectedHop::new("B", "A"), 0);
        (topology, utilization)
    }

    #[test]
    fn test_dot_labels_both_directions() {
        let (topology, utilization) = sample();
        let dot = to_dot(&topology, &utilization);
        assert!(dot.starts_with("graph SdnTopology {"));
        assert!(dot.contains("\"A\";"));
        assert!(dot.contains("\"A\" -- \"B\" [label=\"w=2\\nA->B: 3 / B->A: 0\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let topology = TopologySnapshot {
            nodes: vec!["sw\"1".into()],
            links: vec![],
        };
        let dot = to_dot(&topology, &UtilizationSnapshot::new());
        assert!(dot.contains("\"sw\\\"1\";"));
    }

    #[test]
    fn test_json_rendering() {
        let (topology, _) = sample();
        let snapshot = NetworkSnapshot {
            topology,
            utilization: vec![HopUtilization {
                from: "A".to_string(),
                to: "B".to_string(),
                flows: 3,
            }],
            flow_table: FlowTable::new(),
        };
        let json = to_json(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["topology"]["nodes"][1], "B");
        assert_eq!(value["topology"]["links"][0]["weight"], 2);
        assert_eq!(value["utilization"][0]["flows"], 3);
        assert!(value["flow_table"].as_object().unwrap().is_empty());
    }
}
