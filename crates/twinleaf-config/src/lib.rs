use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {reason}")]
    ConfigInvalid {
        config_path: PathBuf,
        reason: String,
    },
}

/// Block type names shared by the replicated document and the editor tree.
///
/// Both sides must agree on these names: the replica stores them verbatim on
/// its block markers and the editor uses the list-item name to decide when a
/// block needs a list wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Block type used for plain paragraphs and for newly initialised documents
    pub paragraph_type: String,
    /// Block type that is rendered as an item inside a list wrapper
    pub list_item_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paragraph_type: "paragraph".to_string(),
            list_item_type: "list-item".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| ConfigError::ConfigInvalid {
                config_path: config_path.to_path_buf(),
                reason,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Writes to the default config path; hosts call this from their settings UI
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/twinleaf");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Block type names end up as marker attributes, so they must be non-empty
    /// and distinct or list detection becomes ambiguous.
    fn validate(&self) -> Result<(), String> {
        if self.paragraph_type.trim().is_empty() {
            return Err("paragraph_type must not be empty".to_string());
        }
        if self.list_item_type.trim().is_empty() {
            return Err("list_item_type must not be empty".to_string());
        }
        if self.paragraph_type == self.list_item_type {
            return Err(format!(
                "paragraph_type and list_item_type are both {:?}",
                self.paragraph_type
            ));
        }
        Ok(())
    }
}
