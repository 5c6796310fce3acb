use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::console::DEFAULT_TITLE_PREFIX;

/// Config file names looked up in every directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = [".bsp-console.json", "bsp-console.json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ConsoleConfig {
    /// Product label put in front of every task title
    pub title_prefix: String,
    /// Project root reported with every started task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<PathBuf>,
    pub activate_tool_window: bool,
    /// Deliver events through a worker thread instead of under the console lock
    pub queued: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
            base_path: None,
            activate_tool_window: true,
            queued: false,
        }
    }
}

impl ConsoleConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse config {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Loads the nearest config above `start_path`, or the defaults when there is none.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                tracing::debug!("Using config file {:?}", path);
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}
