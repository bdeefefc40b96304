//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`; never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{
    DeployConfig, InputError, ProbeOutcome, RemoteError, RepoError, RepositorySource, ScriptBlock,
};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Captured result of a command that ran on the remote host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RemoteOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best text to show the operator when the command failed: stderr when
    /// present, stdout otherwise.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// What the repository fetcher did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Cloned,
    Updated,
}

/// State of the local private key after `ensure_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Existing,
    Generated,
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with the runner's default timeout and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `input`, bounded by `timeout`.
    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        input: &[u8],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Remote Execution Ports ────────────────────────────────────────────────────

/// Runs commands on the deployment host.
///
/// Transport failures (unreachable host, auth, timeout) are `Err`; a command
/// that ran and exited non-zero is `Ok` with a non-zero `exit_code`.
#[allow(async_fn_in_trait)]
pub trait RemoteExecutor {
    /// Run a one-line command.
    async fn exec(&self, command: &str, timeout: Duration) -> Result<RemoteOutput, RemoteError>;
    /// Run a multi-line block in a single remote shell.
    async fn run_script(
        &self,
        script: &ScriptBlock,
        timeout: Duration,
    ) -> Result<RemoteOutput, RemoteError>;
}

/// Mirrors a local directory onto the deployment host.
#[allow(async_fn_in_trait)]
pub trait ArtifactTransfer {
    /// Copy `local` to `remote_dir` (relative to the remote home), deleting
    /// remote files that have no local counterpart.
    async fn mirror(
        &self,
        local: &Path,
        remote_dir: &str,
        timeout: Duration,
    ) -> Result<RemoteOutput, RemoteError>;
}

// ── Local Ports ───────────────────────────────────────────────────────────────

/// Brings the application source into a local directory.
#[allow(async_fn_in_trait)]
pub trait SourceFetcher {
    /// Clone `source` into `dest`, or update an existing clone.
    async fn fetch(&self, source: &RepositorySource, dest: &Path)
    -> Result<FetchOutcome, RepoError>;
}

/// HTTP reachability checks made from the orchestrator.
#[allow(async_fn_in_trait)]
pub trait HttpProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome;
}

/// Ensures a private key exists at the configured path.
#[allow(async_fn_in_trait)]
pub trait SshKeyProvider {
    /// Generate a key pair at `path` if none exists.
    async fn ensure_key(&self, path: &Path) -> Result<KeyStatus, InputError>;
}

/// Raw local filesystem operations used by application services.
pub trait LocalFs {
    /// Names of the entries directly under `dir`.
    fn list_dir(&self, dir: &Path) -> Result<Vec<String>>;
}

/// Loads operator configuration.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when no file exists.
    fn load(&self) -> Result<DeployConfig>;
    /// Path of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait; no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
