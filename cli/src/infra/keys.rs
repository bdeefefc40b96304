//! Infrastructure implementation of the `SshKeyProvider` port.

use std::path::Path;

use crate::application::ports::{CommandRunner, KeyStatus, SshKeyProvider};
use crate::domain::InputError;

/// Generates an RSA key pair with `ssh-keygen` when none exists.
pub struct SshKeygen<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> SshKeygen<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> SshKeyProvider for SshKeygen<R> {
    async fn ensure_key(&self, path: &Path) -> Result<KeyStatus, InputError> {
        if path.is_file() {
            return Ok(KeyStatus::Existing);
        }
        let unavailable = |reason: String| InputError::SshKeyUnavailable {
            path: path.display().to_string(),
            reason,
        };
        if path.exists() {
            return Err(unavailable("not a regular file".to_string()));
        }
        if let Some(parent) = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty() && !p.exists())
        {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))
                    .map_err(|e| unavailable(e.to_string()))?;
            }
        }

        let path_str = path.display().to_string();
        tracing::info!(path = %path_str, "generating ssh key pair");
        let out = self
            .runner
            .run(
                "ssh-keygen",
                &["-t", "rsa", "-b", "4096", "-N", "", "-f", &path_str, "-q"],
            )
            .await
            .map_err(|e| unavailable(format!("{e:#}")))?;
        if !out.status.success() {
            return Err(unavailable(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ));
        }
        Ok(KeyStatus::Generated)
    }
}
