//! Shell command grammar.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::flow::Priority;
use crate::topology::{Weight, DEFAULT_WEIGHT};

use super::ShellError;

/// Keyword that marks an injected flow as critical
pub const CRITICAL_KEYWORD: &str = "critical";

#[derive(Parser, Debug)]
#[command(
    name = "sdnsim",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

/// One line of shell input
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
#[command(rename_all = "snake_case")]
pub enum Command {
    /// Add a switch
    AddNode { node: String },

    /// Remove a switch and its links
    RemoveNode { node: String },

    /// Add a link between two switches
    AddLink {
        src: String,
        dst: String,
        #[arg(default_value_t = DEFAULT_WEIGHT)]
        weight: Weight,
    },

    /// Remove a link
    RemoveLink { src: String, dst: String },

    /// Route and install a flow: inject_flow <src> <dst> [priority] [critical]
    InjectFlow {
        src: String,
        dst: String,
        #[arg(num_args = 0..=2, allow_negative_numbers = true, value_name = "PRIORITY|critical")]
        options: Vec<String>,
    },

    /// Fail a link
    SimulateFailure { src: String, dst: String },

    /// Show switches and links with utilization
    ShowTopology {
        #[arg(value_enum, default_value_t = TopologyFormat::Text)]
        format: TopologyFormat,
    },

    /// Show installed flow entries by switch
    ShowFlowTable,

    /// Show per-direction link utilization
    ShowUtilization,

    /// Show the shortest path and its equal-cost alternatives
    Path { src: String, dst: String },

    /// Remove every installed flow entry
    ClearFlows,

    /// Write a snapshot to a file
    Export {
        file: PathBuf,
        #[arg(value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },

    /// List commands
    Help,

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyFormat {
    Text,
    Json,
    Dot,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Dot,
}

/// Optional trailing arguments of `inject_flow`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowOptions {
    pub priority: Option<Priority>,
    pub critical: bool,
}

impl FlowOptions {
    /// Accepts an optional priority followed by an optional `critical`
    pub fn parse(options: &[String]) -> Result<Self, ShellError> {
        let mut parsed = FlowOptions::default();
        for (position, option) in options.iter().enumerate() {
            if option.eq_ignore_ascii_case(CRITICAL_KEYWORD) {
                if parsed.critical {
                    return Err(ShellError::InvalidArgument(format!("'{}' given twice", CRITICAL_KEYWORD)));
                }
                parsed.critical = true;
                continue;
            }
            if position > 0 || parsed.critical {
                return Err(ShellError::InvalidArgument(format!(
                    "expected '{}' after the priority, found '{}'",
                    CRITICAL_KEYWORD, option
                )));
            }
            let priority = option
                .parse::<Priority>()
                .map_err(|_| ShellError::InvalidArgument(format!("invalid priority '{}'", option)))?;
            parsed.priority = Some(priority);
        }
        Ok(parsed)
    }
}

/// Parse one line of input.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_line(line: &str) -> Result<Option<Command>, ShellError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let words = trimmed.split_whitespace();
    let parsed = CommandLine::try_parse_from(words).map_err(ShellError::from)?;
    Ok(Some(parsed.command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(
            parse_line("add_node A").unwrap(),
            Some(Command::AddNode { node: "A".to_string() })
        );
        assert_eq!(
            parse_line("  add_link A B  ").unwrap(),
            Some(Command::AddLink {
                src: "A".to_string(),
                dst: "B".to_string(),
                weight: 1
            })
        );
        assert_eq!(parse_line("quit").unwrap(), Some(Command::Exit));
        assert_eq!(
            parse_line("show_topology dot").unwrap(),
            Some(Command::ShowTopology {
                format: TopologyFormat::Dot
            })
        );
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# build the diamond").unwrap(), None);
    }

    #[test]
    fn test_invalid_commands() {
        assert!(parse_line("teleport A").is_err());
        assert!(parse_line("add_link A").is_err());
        assert!(parse_line("add_link A B heavy").is_err());
        assert!(parse_line("inject_flow A B 1 critical extra").is_err());
    }

    #[test]
    fn test_flow_options() {
        let opts = |args: &[&str]| FlowOptions::parse(&args.iter().map(|s| s.to_string()).collect::<Vec<_>>());

        assert_eq!(opts(&[]).unwrap(), FlowOptions::default());
        assert_eq!(
            opts(&["5"]).unwrap(),
            FlowOptions {
                priority: Some(5),
                critical: false
            }
        );
        assert_eq!(
            opts(&["critical"]).unwrap(),
            FlowOptions {
                priority: None,
                critical: true
            }
        );
        assert_eq!(
            opts(&["-2", "critical"]).unwrap(),
            FlowOptions {
                priority: Some(-2),
                critical: true
            }
        );
        assert!(opts(&["critical", "5"]).is_err());
        assert!(opts(&["high"]).is_err());
        assert!(opts(&["critical", "critical"]).is_err());
    }

    #[test]
    fn test_inject_flow_collects_options() {
        let command = parse_line("inject_flow A D 5 critical").unwrap();
        assert_eq!(
            command,
            Some(Command::InjectFlow {
                src: "A".to_string(),
                dst: "D".to_string(),
                options: vec!["5".to_string(), "critical".to_string()],
            })
        );
    }
}
