//! Infrastructure implementation of the `ArtifactTransfer` port over `rsync`.

use std::path::Path;
use std::time::Duration;

use crate::application::ports::{ArtifactTransfer, CommandRunner, RemoteOutput};
use crate::domain::RemoteError;
use crate::infra::ssh::{SshTarget, remote_output};

/// Mirrors a directory with `rsync -az --delete` over the same ssh options
/// the executor uses.
pub struct RsyncTransfer<R: CommandRunner> {
    runner: R,
    target: SshTarget,
}

impl<R: CommandRunner> RsyncTransfer<R> {
    pub fn new(runner: R, target: SshTarget) -> Self {
        Self { runner, target }
    }
}

impl<R: CommandRunner> ArtifactTransfer for RsyncTransfer<R> {
    async fn mirror(
        &self,
        local: &Path,
        remote_dir: &str,
        timeout: Duration,
    ) -> Result<RemoteOutput, RemoteError> {
        // Trailing slash: copy the contents, not the directory itself.
        let source = format!("{}/", local.display().to_string().trim_end_matches('/'));
        let dest = format!("{}:{remote_dir}", self.target.destination());
        let shell = self.target.rsync_shell();
        let args = [
            "-az",
            "--delete",
            "--exclude",
            ".git",
            "-e",
            shell.as_str(),
            source.as_str(),
            dest.as_str(),
        ];
        tracing::debug!(host = self.target.host(), remote_dir, "rsync");
        let result = self.runner.run_with_timeout("rsync", &args, timeout).await;
        remote_output(result, self.target.host(), "rsync")
    }
}
