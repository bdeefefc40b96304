//! Infrastructure implementation of the `RemoteExecutor` port over `ssh`.
//!
//! `SshExecutor<R>` routes every remote call through a `CommandRunner`, so
//! tests inject a mock runner instead of reaching a host.

use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use crate::application::ports::{CommandRunner, RemoteExecutor, RemoteOutput};
use crate::domain::{DeploymentIdentity, RemoteError, ScriptBlock, shell_quote};
use crate::infra::command_runner::ProcessError;

/// `ssh` reserves this status for its own failures.
pub const SSH_TRANSPORT_EXIT: i32 = 255;

/// Connection parameters shared by `ssh` and `rsync -e`.
#[derive(Debug, Clone)]
pub struct SshTarget {
    host: String,
    destination: String,
    key: PathBuf,
    connect_timeout: Duration,
}

impl SshTarget {
    #[must_use]
    pub fn new(identity: &DeploymentIdentity, connect_timeout: Duration) -> Self {
        Self {
            host: identity.host.to_string(),
            destination: identity.ssh_destination(),
            key: identity.ssh_key.clone(),
            connect_timeout,
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// `user@host`.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Options placed before the destination on every `ssh` invocation.
    ///
    /// `accept-new` trusts a host key on first contact and rejects a changed
    /// one afterwards.
    #[must_use]
    pub fn options(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.key.display().to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs()),
        ]
    }

    /// The `ssh ...` command line handed to `rsync -e`.
    #[must_use]
    pub fn rsync_shell(&self) -> String {
        let mut parts = vec!["ssh".to_string()];
        parts.extend(self.options().iter().map(|o| shell_quote(o)));
        parts.join(" ")
    }
}

/// Convert a runner result into the executor's transport/exit split.
pub(crate) fn remote_output(
    result: anyhow::Result<Output>,
    host: &str,
    what: &str,
) -> Result<RemoteOutput, RemoteError> {
    let out = match result {
        Ok(out) => out,
        Err(err) => {
            return Err(match err.downcast_ref::<ProcessError>() {
                Some(ProcessError::Timeout { secs, .. }) => RemoteError::Timeout {
                    what: what.to_string(),
                    secs: *secs,
                },
                Some(ProcessError::Spawn { program, source }) => RemoteError::Spawn {
                    program: program.clone(),
                    detail: source.to_string(),
                },
                None => RemoteError::Spawn {
                    program: what.to_string(),
                    detail: format!("{err:#}"),
                },
            });
        }
    };
    let exit_code = out.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
    if exit_code == SSH_TRANSPORT_EXIT {
        return Err(RemoteError::Connection {
            host: host.to_string(),
            detail: stderr.trim().to_string(),
        });
    }
    Ok(RemoteOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr,
    })
}

/// Runs commands on the deployment host through `ssh`.
pub struct SshExecutor<R: CommandRunner> {
    runner: R,
    target: SshTarget,
}

impl<R: CommandRunner> SshExecutor<R> {
    pub fn new(runner: R, target: SshTarget) -> Self {
        Self { runner, target }
    }

    fn args<'a>(&'a self, options: &'a [String], tail: &'a [&'a str]) -> Vec<&'a str> {
        let mut args: Vec<&str> = options.iter().map(String::as_str).collect();
        args.push(self.target.destination());
        args.extend_from_slice(tail);
        args
    }
}

impl<R: CommandRunner> RemoteExecutor for SshExecutor<R> {
    async fn exec(&self, command: &str, timeout: Duration) -> Result<RemoteOutput, RemoteError> {
        tracing::debug!(host = self.target.host(), command, "remote exec");
        let options = self.target.options();
        let tail = [command];
        let args = self.args(&options, &tail);
        let result = self.runner.run_with_timeout("ssh", &args, timeout).await;
        remote_output(result, self.target.host(), "ssh")
    }

    async fn run_script(
        &self,
        script: &ScriptBlock,
        timeout: Duration,
    ) -> Result<RemoteOutput, RemoteError> {
        tracing::debug!(host = self.target.host(), block = script.name(), "remote script");
        let options = self.target.options();
        let tail = ["bash", "-s"];
        let args = self.args(&options, &tail);
        let result = self
            .runner
            .run_with_stdin("ssh", &args, script.render().as_bytes(), timeout)
            .await;
        remote_output(result, self.target.host(), script.name())
    }
}
