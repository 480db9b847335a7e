use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::flow::{Priority, DEFAULT_PRIORITY};
use crate::topology::{Weight, DEFAULT_WEIGHT};

/// What `add_link` does when the link already exists
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateLinkPolicy {
    /// Fail with `DuplicateLink`
    #[default]
    Reject,
    /// Replace the weight, keeping utilization counters
    Overwrite,
}

/// Which links a critical flow's backup search must avoid
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackupExclusion {
    /// Links of the primary (first) path only
    #[default]
    PrimaryPath,
    /// Links of every installed equal-cost path
    AllPrimaryPaths,
}

/// What happens to installed entries when the topology element they use goes away
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StaleFlowPolicy {
    /// Leave entries in place until re-provisioned or cleared
    #[default]
    Keep,
    /// Remove entries forwarding over the removed link or node
    Purge,
}

/// Top-level controller configuration
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologySource>,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            if level.trim().is_empty() {
                return Err(ValidationError::InvalidGeneral(
                    "log_level cannot be empty".to_string(),
                ));
            }
        }

        if let Some(topology) = &self.topology {
            match topology {
                TopologySource::Gml { path } => {
                    if path.is_empty() {
                        return Err(ValidationError::InvalidTopology(
                            "GML path cannot be empty".to_string(),
                        ));
                    }
                }
                TopologySource::Inline { nodes, links } => {
                    Self::validate_inline(nodes, links)?;
                }
            }
        }

        Ok(())
    }

    /// Validate an inline node/link list
    fn validate_inline(nodes: &[String], links: &[LinkConfig]) -> Result<(), ValidationError> {
        let mut declared = HashSet::new();
        for node in nodes {
            if node.trim().is_empty() {
                return Err(ValidationError::InvalidTopology(
                    "node ids cannot be empty".to_string(),
                ));
            }
            if !declared.insert(node.as_str()) {
                return Err(ValidationError::InvalidTopology(format!(
                    "duplicate node '{}'",
                    node
                )));
            }
        }

        for link in links {
            for endpoint in [&link.src, &link.dst] {
                if !declared.contains(endpoint.as_str()) {
                    return Err(ValidationError::InvalidTopology(format!(
                        "link {}-{} references undeclared node '{}'",
                        link.src, link.dst, endpoint
                    )));
                }
            }
            if link.weight == 0 {
                return Err(ValidationError::InvalidTopology(format!(
                    "link {}-{} has weight 0; weights must be positive",
                    link.src, link.dst
                )));
            }
        }

        Ok(())
    }

    /// Log level requested by the file, if any
    pub fn log_level(&self) -> Option<&str> {
        self.general.log_level.as_deref()
    }
}

/// Shared general configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Routing and provisioning policy
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RoutingConfig {
    pub default_priority: Priority,
    pub duplicate_links: DuplicateLinkPolicy,
    pub backup_exclusion: BackupExclusion,
    pub stale_flows: StaleFlowPolicy,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            duplicate_links: DuplicateLinkPolicy::default(),
            backup_exclusion: BackupExclusion::default(),
            stale_flows: StaleFlowPolicy::default(),
        }
    }
}

/// Initial topology, either from a GML file or listed inline
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum TopologySource {
    Gml {
        path: String,
    },
    Inline {
        #[serde(default)]
        nodes: Vec<String>,
        #[serde(default)]
        links: Vec<LinkConfig>,
    },
}

/// One inline link
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LinkConfig {
    pub src: String,
    pub dst: String,
    #[serde(default = "default_weight")]
    pub weight: Weight,
}

fn default_weight() -> Weight {
    DEFAULT_WEIGHT
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let yaml = r#"
general:
  log_level: debug
routing:
  default_priority: 10
  duplicate_links: overwrite
  backup_exclusion: all_primary_paths
  stale_flows: purge
topology:
  nodes: [A, B, C]
  links:
    - { src: A, dst: B, weight: 3 }
    - { src: B, dst: C }
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level(), Some("debug"));
        assert_eq!(config.routing.default_priority, 10);
        assert_eq!(config.routing.duplicate_links, DuplicateLinkPolicy::Overwrite);
        assert_eq!(config.routing.backup_exclusion, BackupExclusion::AllPrimaryPaths);
        assert_eq!(config.routing.stale_flows, StaleFlowPolicy::Purge);

        match config.topology {
            Some(TopologySource::Inline { nodes, links }) => {
                assert_eq!(nodes, vec!["A", "B", "C"]);
                assert_eq!(links[0].weight, 3);
                assert_eq!(links[1].weight, DEFAULT_WEIGHT);
            }
            _ => panic!("expected inline topology"),
        }
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: Config = serde_yaml::from_str("general: {}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.routing, RoutingConfig::default());
        assert!(config.topology.is_none());

        let config: Config = serde_yaml::from_str("routing:\n  stale_flows: purge\n").unwrap();
        assert_eq!(config.routing.default_priority, DEFAULT_PRIORITY);
        assert_eq!(config.routing.duplicate_links, DuplicateLinkPolicy::Reject);
        assert_eq!(config.routing.stale_flows, StaleFlowPolicy::Purge);
    }

    #[test]
    fn test_gml_topology_source() {
        let yaml = r#"
topology:
  path: "lab.gml"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.topology, Some(TopologySource::Gml { ref path }) if path == "lab.gml"));
        assert!(config.validate().is_ok());

        let config: Config = serde_yaml::from_str("topology:\n  path: \"\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inline_validation_errors() {
        // Undeclared endpoint
        let yaml = r#"
topology:
  nodes: [A]
  links:
    - { src: A, dst: B }
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());

        // Zero weight
        let yaml = r#"
topology:
  nodes: [A, B]
  links:
    - { src: A, dst: B, weight: 0 }
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());

        // Duplicate node
        let yaml = r#"
topology:
  nodes: [A, A]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_level_rejected() {
        let config: Config = serde_yaml::from_str("general:\n  log_level: \"\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));
    }
}
