use crate::config::{Config, TopologySource};
use crate::controller::Controller;
use crate::events::EventSink;
use crate::gml_parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and parse configuration from a YAML file.
///
/// Logs nothing, so it can run before the logger is set up.
pub fn load_config(config_path: &Path) -> Result<Config> {
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open config file {:?}", config_path))?;

    let mut config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse config file {:?}", config_path))?;

    config.validate()?;

    // GML paths are relative to the config file
    if let Some(TopologySource::Gml { path }) = &mut config.topology {
        let resolved = resolve_relative(config_path, Path::new(path.as_str()));
        *path = resolved.to_string_lossy().into_owned();
    }

    Ok(config)
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub topology: Option<PathBuf>,
}

/// Logger filter for a run: the command line wins over the config file,
/// and "info" applies when neither sets one
pub fn log_filter(config: &Config, overrides: &CliOverrides) -> String {
    overrides
        .log_level
        .as_deref()
        .or_else(|| config.log_level())
        .unwrap_or("info")
        .to_string()
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(level) = &overrides.log_level {
        info!("Log level overridden on the command line: {}", level);
        config.general.log_level = Some(level.clone());
    }

    if let Some(path) = &overrides.topology {
        info!("Topology overridden on the command line: {:?}", path);
        config.topology = Some(TopologySource::Gml {
            path: path.to_string_lossy().into_owned(),
        });
    }

    config.validate()?;

    Ok(())
}

/// Populate `controller` with the configured initial topology
pub fn load_topology<S: EventSink>(config: &Config, controller: &mut Controller<S>) -> Result<()> {
    match &config.topology {
        None => info!("No initial topology configured"),
        Some(TopologySource::Gml { path }) => {
            let graph = gml_parser::parse_gml_file(Path::new(path))?;
            let (nodes, links) = gml_parser::load_into(&graph, controller)?;
            info!("Loaded {} switches and {} links from {}", nodes, links, path);
        }
        Some(TopologySource::Inline { nodes, links }) => {
            for node in nodes {
                controller.add_node(node.as_str());
            }
            for link in links {
                controller
                    .add_link(&link.src, &link.dst, link.weight)
                    .wrap_err_with(|| format!("Failed to add configured link {}-{}", link.src, link.dst))?;
            }
            info!("Loaded {} switches and {} links from configuration", nodes.len(), links.len());
        }
    }

    Ok(())
}

/// Build a controller from a configuration, including its initial topology
pub fn build_controller(config: &Config) -> Result<Controller> {
    let mut controller = Controller::new(config.routing.clone());
    load_topology(config, &mut controller)?;
    Ok(controller)
}

fn resolve_relative(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}
