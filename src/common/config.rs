//! Bootstrap configuration for a clusterconf node
//!
//! Loaded once at startup from a TOML file; the member table seeds the
//! index-0 configuration every replica starts from.

use crate::common::Result;
use crate::membership::Configuration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Node bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node ID (unique identifier)
    pub node_id: String,

    /// Initial cluster members (node ID → address), this node included
    #[serde(default)]
    pub members: HashMap<String, String>,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl NodeConfig {
    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Build the initial configuration: log index 0, every member a voter
    pub fn initial_configuration(&self) -> Result<Configuration> {
        Configuration::new(0, self.members.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(
            &path,
            r#"
node_id = "n1"

[members]
n1 = "127.0.0.1:5000"
n2 = "127.0.0.1:5001"
"#,
        )
        .unwrap();

        let config = NodeConfig::load(&path).unwrap();
        assert_eq!(config.node_id, "n1");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.members.len(), 2);

        let initial = config.initial_configuration().unwrap();
        assert_eq!(initial.index, 0);
        assert!(initial.is_voter("n1"));
        assert!(initial.is_voter("n2"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = NodeConfig::load("/nonexistent/node.toml").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_members_rejected_at_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "node_id = \"n1\"\n").unwrap();

        let config = NodeConfig::load(&path).unwrap();
        let err = config.initial_configuration().unwrap_err();
        assert!(matches!(err, Error::EmptyMembership));
    }
}
