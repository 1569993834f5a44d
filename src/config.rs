//! Graph configuration: the plain values every [`Graphmaster`](crate::graph::Graphmaster)
//! is built with.
//!
//! Configuration is threaded through construction rather than read from
//! global state, so several graphs with different settings can coexist.
//! It is persisted as TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Tuning knobs for a pattern graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum number of wildcard captures kept per segment. Captures past
    /// this bound are dropped silently.
    #[serde(default = "default_max_stars")]
    pub max_stars: usize,
    /// Collapse `<THAT> * <TOPIC> *` tails into shortcut terminals.
    #[serde(default = "default_enable_shortcuts")]
    pub enable_shortcuts: bool,
    /// Height given to a freshly created node before any terminal is hung
    /// below it.
    #[serde(default = "default_max_graph_height")]
    pub max_graph_height: usize,
    /// Text bound to a zero-or-more wildcard that consumed nothing.
    #[serde(default)]
    pub null_star: String,
    /// Bound on the distinct example inputs remembered per category.
    #[serde(default = "default_max_example_inputs")]
    pub max_example_inputs: usize,
    /// Value substituted for `<bot name="..."/>` when the property is unset.
    #[serde(default = "default_property")]
    pub default_property: String,
}

fn default_max_stars() -> usize {
    1000
}
fn default_enable_shortcuts() -> bool {
    true
}
fn default_max_graph_height() -> usize {
    100_000
}
fn default_max_example_inputs() -> usize {
    100
}
fn default_property() -> String {
    "unknown".into()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_stars: default_max_stars(),
            enable_shortcuts: default_enable_shortcuts(),
            max_graph_height: default_max_graph_height(),
            null_star: String::new(),
            max_example_inputs: default_max_example_inputs(),
            default_property: default_property(),
        }
    }
}

impl GraphConfig {
    /// Same as the default but with shortcut collapsing turned off.
    pub fn without_shortcuts() -> Self {
        Self {
            enable_shortcuts: false,
            ..Default::default()
        }
    }

    /// Reject settings under which no rule could ever match.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_stars == 0 {
            return Err(ConfigError::Invalid {
                message: "max_stars must be > 0".into(),
            });
        }
        if self.max_graph_height == 0 {
            return Err(ConfigError::Invalid {
                message: "max_graph_height must be > 0".into(),
            });
        }
        Ok(())
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GraphConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.enable_shortcuts);
        assert_eq!(config.max_stars, 1000);
        assert_eq!(config.null_star, "");
    }

    #[test]
    fn zero_stars_rejected() {
        let config = GraphConfig {
            max_stars: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("graph.toml");
        let config = GraphConfig {
            max_stars: 8,
            null_star: "nothing".into(),
            ..GraphConfig::without_shortcuts()
        };
        config.save(&path).unwrap();
        let loaded = GraphConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::write(&path, "max_stars = 4\n").unwrap();
        let loaded = GraphConfig::load(&path).unwrap();
        assert_eq!(loaded.max_stars, 4);
        assert_eq!(loaded.max_graph_height, 100_000);
        assert_eq!(loaded.default_property, "unknown");
    }

    #[test]
    fn unreadable_file_is_read_error() {
        let err = GraphConfig::load(Path::new("/nonexistent/graph.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::write(&path, "max_stars = \"many\"\n").unwrap();
        let err = GraphConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
