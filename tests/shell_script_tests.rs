#[cfg(test)]
mod shell_script_tests {
    use std::io::Cursor;
    use tempfile::TempDir;

    use sdnsim::config::RoutingConfig;
    use sdnsim::shell::Shell;
    use sdnsim::{Controller, RecordingSink, SnapshotReader};

    const FAILOVER: &str = "\
# diamond with one slow detour
add_node A
add_node B
add_node C
add_node D
add_link A B
add_link B D
add_link A C
add_link C D

inject_flow A D 5 critical
show_flow_table
simulate_failure A B
path A D
simulate_failure A B
remove_link A B
show_utilization
";

    fn run(script: &str) -> (Controller<RecordingSink>, String, usize) {
        let controller = Controller::with_sink(RoutingConfig::default(), RecordingSink::new());
        let mut shell = Shell::new(controller, Vec::new());
        let failures = shell.run(Cursor::new(script), false).unwrap();
        let (controller, out) = shell.into_parts();
        (controller, String::from_utf8(out).unwrap(), failures)
    }

    #[test]
    fn test_failover_script() {
        let (controller, out, failures) = run(FAILOVER);

        // the second failure is reported, the removal of a failed link is an error
        assert_eq!(failures, 1);
        assert!(out.contains("Installed A -> D via A -> B -> D (priority 5)"));
        assert!(out.contains("Installed A -> D via A -> C -> D (priority 5)"));
        assert!(out.contains("Backup path installed: A -> C -> D (priority 4)"));
        assert!(out.contains("Switch A:\n  match dst=D action forward to B priority 5\n"));
        assert!(out.contains("Link A-B failed."));
        assert!(out.contains("Shortest path: A -> C -> D (cost 2)"));
        assert!(out.contains("Link A-B does not exist; nothing to fail."));
        assert!(out.contains("error: link A-B not found"));

        // stale entries over the failed link are kept
        assert_eq!(controller.flow_table().entries("A").len(), 3);
        assert!(!out.contains("A->B:"));
        assert!(out.contains("A->C: 2 flows"));
    }

    #[test]
    fn test_show_topology_formats() {
        let script = "add_node A\nadd_node B\nadd_link A B 4\ninject_flow A B\nshow_topology\nshow_topology dot\nshow_topology json\n";
        let (_, out, failures) = run(script);
        assert_eq!(failures, 0);
        assert!(out.contains("Switches (2): A, B"));
        assert!(out.contains("A-B weight 4  A->B: 1 flows  B->A: 0 flows"));
        assert!(out.contains("graph SdnTopology {"));
        assert!(out.contains("\"flow_table\""));
    }

    #[test]
    fn test_export_writes_files() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("snapshot.json");
        let dot_path = dir.path().join("snapshot.dot");
        let script = format!(
            "add_node A\nadd_node B\nadd_link A B\ninject_flow A B\nexport {} json\nexport {} dot\n",
            json_path.display(),
            dot_path.display()
        );
        let (controller, out, failures) = run(&script);
        assert_eq!(failures, 0);
        assert!(out.contains("Snapshot written to"));

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["topology"]["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["flow_table"]["A"][0]["action"]["next_hop"], "B");
        assert_eq!(json["flow_table"]["A"][0]["match"]["destination"], "B");

        let dot = std::fs::read_to_string(&dot_path).unwrap();
        assert_eq!(
            dot,
            sdnsim::snapshot::to_dot(&controller.topology_snapshot(), &controller.utilization_snapshot())
        );
    }

    #[test]
    fn test_export_to_missing_directory_fails_softly() {
        let (_, out, failures) = run("export /nonexistent/dir/snapshot.json\nadd_node A\n");
        assert_eq!(failures, 1);
        assert!(out.contains("error: failed to write /nonexistent/dir/snapshot.json"));
        assert!(out.contains("Node A added."));
    }

    #[test]
    fn test_clear_flows_resets_counters() {
        let script = "add_node A\nadd_node B\nadd_link A B\ninject_flow A B\ninject_flow B A 2\nclear_flows\nshow_flow_table\n";
        let (controller, out, _) = run(script);
        assert!(out.contains("Flow table cleared (2 entries removed)."));
        assert!(out.contains("Flow table is empty"));
        assert_eq!(controller.utilization().total(), 0);
    }
}
