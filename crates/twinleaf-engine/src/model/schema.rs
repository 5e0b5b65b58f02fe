use serde::{Deserialize, Serialize};
use std::path::Path;
use twinleaf_config::{Config, ConfigError};

/// Block type vocabulary shared by both document representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub paragraph: String,
    pub list_item: String,
}

impl Schema {
    pub fn new(paragraph: impl Into<String>, list_item: impl Into<String>) -> Self {
        Self {
            paragraph: paragraph.into(),
            list_item: list_item.into(),
        }
    }

    /// Schema from the user's config file, or the default one without a file
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::load()?.unwrap_or_default();
        Ok(Self::from(&config))
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config = Config::load_from_path(config_path)?.unwrap_or_default();
        Ok(Self::from(&config))
    }

    /// Whether blocks of this type live inside a list wrapper in the tree
    pub fn is_list_item(&self, block_type: &str) -> bool {
        block_type == self.list_item
    }

    /// Number of tree levels a split creating a block of this type opens
    pub fn split_depth(&self, block_type: &str) -> usize {
        if self.is_list_item(block_type) { 2 } else { 1 }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Schema {
    fn from(config: &Config) -> Self {
        Self::new(&config.paragraph_type, &config.list_item_type)
    }
}
