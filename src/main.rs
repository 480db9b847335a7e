use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use sdnsim::config::Config;
use sdnsim::config_loader::{self, CliOverrides};
use sdnsim::shell::Shell;

/// Simulation-scale SDN controller with an interactive command shell
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the controller configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GML file with the initial topology (overrides the config file)
    #[arg(short, long)]
    topology: Option<PathBuf>,

    /// Run shell commands from a file instead of standard input
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Log filter, e.g. "info" or "sdnsim=debug"
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Configuration is read before logging so its log level can apply
    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => Config::default(),
    };
    let overrides = CliOverrides {
        log_level: args.log_level.clone(),
        topology: args.topology.clone(),
    };
    let level = config_loader::log_filter(&config, &overrides);
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Starting sdnsim controller");
    if let Some(path) = &args.config {
        info!("Loaded configuration from: {:?}", path);
    }
    config_loader::apply_overrides(&mut config, &overrides)?;

    let controller = config_loader::build_controller(&config)?;
    let stdout = io::stdout();
    let mut shell = Shell::new(controller, stdout.lock());

    let failures = match &args.script {
        Some(path) => {
            info!("Running script: {:?}", path);
            let file = File::open(path).wrap_err_with(|| format!("Failed to open script '{}'", path.display()))?;
            shell.run(BufReader::new(file), false)?
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            shell.run(stdin.lock(), interactive)?
        }
    };

    if failures > 0 {
        warn!("{} command(s) failed", failures);
    }
    info!("Controller shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["sdnsim", "--config", "controller.yaml"]);

        assert_eq!(args.config, Some(PathBuf::from("controller.yaml")));
        assert!(args.topology.is_none());
        assert!(args.script.is_none());
        assert!(args.log_level.is_none());
    }

    #[test]
    fn test_script_args() {
        let args = Args::parse_from([
            "sdnsim",
            "--topology",
            "lab.gml",
            "--script",
            "failover.txt",
            "--log-level",
            "debug",
        ]);

        assert_eq!(args.topology, Some(PathBuf::from("lab.gml")));
        assert_eq!(args.script, Some(PathBuf::from("failover.txt")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_log_level_sets_logger_filter() {
        let args = Args::parse_from(["sdnsim", "--log-level", "debug"]);
        let mut config = Config::default();
        config.general.log_level = Some("warn".to_string());
        let overrides = CliOverrides {
            log_level: args.log_level,
            topology: None,
        };
        assert_eq!(config_loader::log_filter(&config, &overrides), "debug");
    }

    #[test]
    fn test_no_args_is_valid() {
        let args = Args::parse_from(["sdnsim"]);
        assert!(args.config.is_none());
    }
}
