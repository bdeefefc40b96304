//! Remote file layout for one deployment identity.
//!
//! Paths under the remote home are expressed as shell text (`"$HOME/..."`)
//! because the home directory is only known on the remote side. The app name
//! is validated to a shell-safe charset, so it is placed inside double quotes
//! as-is; operator-configured nginx directories go through [`shell_quote`].

use crate::domain::config::ProxyConfig;
use crate::domain::identity::AppName;
use crate::domain::script::shell_quote;

/// Directory under the remote home holding lifecycle markers.
pub const MARKER_DIR: &str = ".dockhand";

/// Where everything belonging to one deployment lives on the host.
#[derive(Debug, Clone)]
pub struct RemoteLayout {
    name: AppName,
    available_dir: String,
    enabled_dir: String,
}

impl RemoteLayout {
    #[must_use]
    pub fn new(name: &AppName, proxy: &ProxyConfig) -> Self {
        Self {
            name: name.clone(),
            available_dir: proxy.available_dir.trim_end_matches('/').to_string(),
            enabled_dir: proxy.enabled_dir.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &AppName {
        &self.name
    }

    /// Artifact directory, as shell text.
    #[must_use]
    pub fn app_dir(&self) -> String {
        format!("\"$HOME/{}\"", self.name)
    }

    /// Artifact directory relative to the login directory, as rsync expects.
    #[must_use]
    pub fn rsync_dir(&self) -> String {
        format!("{}/", self.name)
    }

    /// Marker directory, as shell text.
    #[must_use]
    pub fn marker_dir(&self) -> String {
        format!("\"$HOME/{MARKER_DIR}\"")
    }

    /// Lifecycle marker file, as shell text.
    #[must_use]
    pub fn marker_file(&self) -> String {
        format!("\"$HOME/{MARKER_DIR}/{}.mode\"", self.name)
    }

    /// Site definition path, unquoted.
    #[must_use]
    pub fn site_available_path(&self) -> String {
        format!("{}/{}", self.available_dir, self.name)
    }

    /// Site definition path, quoted for the shell.
    #[must_use]
    pub fn site_available(&self) -> String {
        shell_quote(&self.site_available_path())
    }

    /// Activation symlink path, quoted for the shell.
    #[must_use]
    pub fn site_enabled(&self) -> String {
        shell_quote(&format!("{}/{}", self.enabled_dir, self.name))
    }

    /// Distribution default site, quoted for the shell.
    #[must_use]
    pub fn default_site(&self) -> String {
        shell_quote(&format!("{}/default", self.enabled_dir))
    }

    /// Backup of the previous site definition kept during validation.
    #[must_use]
    pub fn site_backup(&self) -> String {
        shell_quote(&format!("{}.dockhand-prev", self.site_available_path()))
    }
}
