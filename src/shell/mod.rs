//! Line-oriented command shell over a `Controller`.
//!
//! The shell owns no state of its own: it parses a line, calls one controller
//! operation and writes the result to its output. A failing command prints
//! `error: <message>` and the loop keeps going; only a broken output writer
//! ends it early.

pub mod command;
pub mod output;

pub use command::{parse_line, Command, ExportFormat, FlowOptions, TopologyFormat};

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::error::ErrorKind;
use log::debug;

use crate::controller::{Controller, LinkChange};
use crate::error::ControllerError;
use crate::events::{EventSink, LogSink};
use crate::failure::FailureOutcome;
use crate::snapshot::{self, SnapshotReader};

const PROMPT: &str = "sdn> ";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{0}")]
    Parse(String),

    /// clap rendered a help or usage text instead of a command
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

impl From<clap::Error> for ShellError {
    fn from(err: clap::Error) -> Self {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                ShellError::Usage(err.render().to_string())
            }
            _ => {
                let rendered = err.render().to_string();
                let first = rendered.lines().next().unwrap_or_default();
                ShellError::Parse(first.trim_start_matches("error: ").to_string())
            }
        }
    }
}

/// Whether the loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<W: Write, S: EventSink = LogSink> {
    controller: Controller<S>,
    out: W,
}

impl<W: Write, S: EventSink> Shell<W, S> {
    pub fn new(controller: Controller<S>, out: W) -> Self {
        Self { controller, out }
    }

    pub fn controller(&self) -> &Controller<S> {
        &self.controller
    }

    pub fn into_parts(self) -> (Controller<S>, W) {
        (self.controller, self.out)
    }

    /// Read commands until end of input or `exit`.
    ///
    /// With `interactive` set a prompt is written before each line. Returns
    /// the number of commands that failed.
    pub fn run<R: BufRead>(&mut self, input: R, interactive: bool) -> io::Result<usize> {
        let mut failures = 0;
        let mut lines = input.lines();
        loop {
            if interactive {
                write!(self.out, "{}", PROMPT)?;
                self.out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            match self.execute_line(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(ShellError::Output(err)) => return Err(err),
                Err(ShellError::Usage(text)) => write!(self.out, "{}", text)?,
                Err(err) => {
                    failures += 1;
                    writeln!(self.out, "error: {}", err)?;
                }
            }
        }
        Ok(failures)
    }

    /// Parse and run a single line
    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        match parse_line(line)? {
            Some(command) => self.execute(command),
            None => Ok(Flow::Continue),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, ShellError> {
        debug!("shell: {:?}", command);
        match command {
            Command::AddNode { node } => {
                if self.controller.add_node(node.as_str()) {
                    writeln!(self.out, "Node {} added.", node)?;
                } else {
                    writeln!(self.out, "Node {} already exists.", node)?;
                }
            }
            Command::RemoveNode { node } => {
                let removed = self.controller.remove_node(&node)?;
                writeln!(self.out, "Node {} removed ({} links).", node, removed.len())?;
            }
            Command::AddLink { src, dst, weight } => match self.controller.add_link(&src, &dst, weight)? {
                LinkChange::Added => writeln!(self.out, "Link {}-{} added (weight {}).", src, dst, weight)?,
                LinkChange::WeightUpdated { old } => writeln!(
                    self.out,
                    "Link {}-{} weight changed from {} to {}.",
                    src, dst, old, weight
                )?,
            },
            Command::RemoveLink { src, dst } => {
                self.controller.remove_link(&src, &dst)?;
                writeln!(self.out, "Link {}-{} removed.", src, dst)?;
            }
            Command::InjectFlow { src, dst, options } => {
                let options = FlowOptions::parse(&options)?;
                let mut request = self.controller.flow_request(&src, &dst).critical(options.critical);
                if let Some(priority) = options.priority {
                    request = request.priority(priority);
                }
                let report = self.controller.inject_flow(request)?;
                write!(self.out, "{}", output::injection(&report))?;
            }
            Command::SimulateFailure { src, dst } => match self.controller.simulate_failure(&src, &dst) {
                FailureOutcome::Failed { .. } => writeln!(self.out, "Link {}-{} failed.", src, dst)?,
                FailureOutcome::NotFound => {
                    writeln!(self.out, "Link {}-{} does not exist; nothing to fail.", src, dst)?
                }
            },
            Command::ShowTopology { format } => {
                let rendered = match format {
                    TopologyFormat::Text => output::topology(
                        &self.controller.topology_snapshot(),
                        &self.controller.utilization_snapshot(),
                    ),
                    TopologyFormat::Json => {
                        let mut json = snapshot::to_json(&self.controller.network_snapshot())?;
                        json.push('\n');
                        json
                    }
                    TopologyFormat::Dot => snapshot::to_dot(
                        &self.controller.topology_snapshot(),
                        &self.controller.utilization_snapshot(),
                    ),
                };
                write!(self.out, "{}", rendered)?;
            }
            Command::ShowFlowTable => {
                write!(self.out, "{}", output::flow_table(self.controller.flow_table()))?;
            }
            Command::ShowUtilization => {
                write!(
                    self.out,
                    "{}",
                    output::utilization(&self.controller.utilization_snapshot())
                )?;
            }
            Command::Path { src, dst } => {
                let set = self.controller.compute_paths(&src, &dst)?;
                write!(self.out, "{}", output::paths(&set))?;
            }
            Command::ClearFlows => {
                let removed = self.controller.clear_flow_table();
                writeln!(self.out, "Flow table cleared ({} entries removed).", removed)?;
            }
            Command::Export { file, format } => {
                let rendered = match format {
                    ExportFormat::Json => snapshot::to_json(&self.controller.network_snapshot())?,
                    ExportFormat::Dot => snapshot::to_dot(
                        &self.controller.topology_snapshot(),
                        &self.controller.utilization_snapshot(),
                    ),
                };
                fs::write(&file, rendered).map_err(|source| ShellError::Export {
                    path: file.clone(),
                    source,
                })?;
                writeln!(self.out, "Snapshot written to {}", file.display())?;
            }
            Command::Help => self.help()?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn help(&mut self) -> Result<(), ShellError> {
        const COMMANDS: &[(&str, &str)] = &[
            ("add_node <node>", "add a switch"),
            ("remove_node <node>", "remove a switch and its links"),
            ("add_link <src> <dst> [weight]", "add a link (weight defaults to 1)"),
            ("remove_link <src> <dst>", "remove a link"),
            ("inject_flow <src> <dst> [priority] [critical]", "route and install a flow"),
            ("simulate_failure <src> <dst>", "fail a link"),
            ("show_topology [text|json|dot]", "show switches, links and utilization"),
            ("show_flow_table", "show installed entries by switch"),
            ("show_utilization", "show flows per link direction"),
            ("path <src> <dst>", "show shortest paths without installing"),
            ("clear_flows", "remove every installed entry"),
            ("export <file> [json|dot]", "write a snapshot to a file"),
            ("exit | quit", "leave the shell"),
        ];
        writeln!(self.out, "Commands:")?;
        for (usage, about) in COMMANDS {
            writeln!(self.out, "  {:<48} {}", usage, about)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::events::RecordingSink;
    use std::io::Cursor;

    fn shell() -> Shell<Vec<u8>, RecordingSink> {
        Shell::new(
            Controller::with_sink(RoutingConfig::default(), RecordingSink::new()),
            Vec::new(),
        )
    }

    fn written(shell: Shell<Vec<u8>, RecordingSink>) -> String {
        let (_, out) = shell.into_parts();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_script_runs_to_end() {
        let script = "add_node A\nadd_node B\n\n# link them\nadd_link A B 2\ninject_flow A B\n";
        let mut shell = shell();
        let failures = shell.run(Cursor::new(script), false).unwrap();
        assert_eq!(failures, 0);
        assert_eq!(shell.controller().flow_table().entry_count(), 1);

        let text = written(shell);
        assert!(text.contains("Node A added."));
        assert!(text.contains("Link A-B added (weight 2)."));
        assert!(text.contains("Installed A -> B via A -> B (priority 1)"));
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let script = "add_link A B\nbogus\nadd_node A\nexit\nadd_node B\n";
        let mut shell = shell();
        let failures = shell.run(Cursor::new(script), false).unwrap();
        assert_eq!(failures, 2);
        assert_eq!(shell.controller().topology().node_count(), 1);

        let text = written(shell);
        assert!(text.contains("error: node A not found"));
        assert!(text.contains("error: unrecognized subcommand"));
        assert!(!text.contains("Node B added."));
    }

    #[test]
    fn test_interactive_prompt() {
        let mut shell = shell();
        shell.run(Cursor::new("add_node A\n"), true).unwrap();
        let text = written(shell);
        assert!(text.starts_with(PROMPT));
        assert_eq!(text.matches(PROMPT).count(), 2);
    }

    #[test]
    fn test_critical_flow_reports_backup() {
        let mut shell = shell();
        for line in [
            "add_node A",
            "add_node B",
            "add_node C",
            "add_link A B",
            "add_link B C",
            "add_link A C 5",
            "inject_flow A C 3 critical",
        ] {
            assert_eq!(shell.execute_line(line).unwrap(), Flow::Continue);
        }
        let text = written(shell);
        assert!(text.contains("Backup path installed: A -> C (priority 2)"));
    }

    #[test]
    fn test_path_and_utilization_commands() {
        let mut shell = shell();
        let script = "add_node A\nadd_node B\nadd_link A B\npath A B\ninject_flow A B\nshow_utilization\n";
        shell.run(Cursor::new(script), false).unwrap();
        let text = written(shell);
        assert!(text.contains("Shortest path: A -> B (cost 1)"));
        assert!(text.contains("A->B: 1 flows"));
        assert!(text.contains("B->A: 0 flows"));
    }

    #[test]
    fn test_help_lists_commands() {
        let mut shell = shell();
        shell.execute_line("help").unwrap();
        let text = written(shell);
        assert!(text.contains("inject_flow <src> <dst> [priority] [critical]"));
    }
}
