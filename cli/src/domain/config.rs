//! Operator configuration schema.
//!
//! Pure types only; no I/O, no async, no filesystem access. Every field has a
//! default so an absent or partial `config.yaml` is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.dockhand/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    /// Defaults for values otherwise collected interactively.
    pub defaults: DefaultsConfig,
    /// Local paths.
    pub paths: PathsConfig,
    /// Remote nginx layout.
    pub proxy: ProxyConfig,
    /// Per-stage timeouts.
    pub timeouts: TimeoutsConfig,
    /// Deployment controller tuning.
    pub deploy: DeployTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Branch checked out when none is given.
    pub branch: String,
    /// Private key used when none is given. `~` expands to the home directory.
    pub ssh_key: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            ssh_key: "~/.ssh/id_rsa".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Parent directory of local clones.
    pub work_dir: String,
    /// Directory receiving run logs.
    pub log_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            work_dir: ".".to_string(),
            log_dir: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Directory holding site definitions.
    pub available_dir: String,
    /// Directory holding activation symlinks.
    pub enabled_dir: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            available_dir: "/etc/nginx/sites-available".to_string(),
            enabled_dir: "/etc/nginx/sites-enabled".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub connect_secs: u64,
    pub command_secs: u64,
    pub provision_secs: u64,
    pub transfer_secs: u64,
    pub deploy_secs: u64,
    pub probe_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            command_secs: 60,
            provision_secs: 1200,
            transfer_secs: 900,
            deploy_secs: 1800,
            probe_secs: 10,
        }
    }
}

impl TimeoutsConfig {
    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    #[must_use]
    pub fn command(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }

    #[must_use]
    pub fn provision(&self) -> Duration {
        Duration::from_secs(self.provision_secs)
    }

    #[must_use]
    pub fn transfer(&self) -> Duration {
        Duration::from_secs(self.transfer_secs)
    }

    #[must_use]
    pub fn deploy(&self) -> Duration {
        Duration::from_secs(self.deploy_secs)
    }

    #[must_use]
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployTuning {
    /// Wait between launch and the running-container check.
    pub settle_secs: u64,
    /// Log lines captured when the container fails to start.
    pub log_tail_lines: u32,
}

impl Default for DeployTuning {
    fn default() -> Self {
        Self {
            settle_secs: 10,
            log_tail_lines: 100,
        }
    }
}

impl DeployTuning {
    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
