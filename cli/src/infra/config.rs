//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::DeployConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "DOCKHAND_CONFIG";

/// Production implementation of `ConfigStore` that reads a YAML file on disk.
#[derive(Debug, Default)]
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    /// Store reading `path` instead of the default location.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            explicit: Some(path),
        }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<DeployConfig> {
        let path = self.path()?;
        if !path.exists() {
            if self.explicit.is_some() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            return Ok(DeployConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".dockhand").join("config.yaml"))
    }
}
