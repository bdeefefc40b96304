//! Infrastructure implementation of the `SourceFetcher` port over `git`.
//!
//! The authenticated URL is only ever passed as a process argument; every
//! captured diagnostic goes through [`RepositorySource::redact`].

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use secrecy::ExposeSecret;

use crate::application::ports::{CommandRunner, FetchOutcome, SourceFetcher};
use crate::domain::{RepoError, RepositorySource};

/// Clones and updates repositories with the `git` CLI.
pub struct GitRepository<R: CommandRunner> {
    runner: R,
    timeout: Duration,
}

impl<R: CommandRunner> GitRepository<R> {
    /// `timeout` bounds each network operation (clone, fetch).
    pub fn new(runner: R, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    async fn git(&self, args: &[&str]) -> anyhow::Result<Output> {
        self.runner.run_with_timeout("git", args, self.timeout).await
    }

    async fn clone_into(&self, source: &RepositorySource, dest: &str) -> Result<(), RepoError> {
        let auth = source.authenticated_url();
        let out = self
            .git(&[
                "clone",
                "--branch",
                &source.branch,
                "--",
                auth.expose_secret(),
                dest,
            ])
            .await
            .map_err(|e| RepoError::CloneFailed(source.redact(&format!("{e:#}"))))?;
        if !out.status.success() {
            return Err(RepoError::CloneFailed(stderr_of(source, &out)));
        }
        // Keep the token out of .git/config.
        let out = self
            .git(&["-C", dest, "remote", "set-url", "origin", &source.url])
            .await
            .map_err(|e| RepoError::CloneFailed(source.redact(&format!("{e:#}"))))?;
        if !out.status.success() {
            return Err(RepoError::CloneFailed(stderr_of(source, &out)));
        }
        Ok(())
    }

    async fn update(&self, source: &RepositorySource, dest: &str) -> Result<(), RepoError> {
        let auth = source.authenticated_url();
        let out = self
            .git(&["-C", dest, "fetch", auth.expose_secret(), &source.branch])
            .await
            .map_err(|e| RepoError::FetchFailed(source.redact(&format!("{e:#}"))))?;
        if !out.status.success() {
            return Err(RepoError::FetchFailed(stderr_of(source, &out)));
        }

        let checkout_failed = |detail: String| RepoError::CheckoutFailed {
            branch: source.branch.clone(),
            detail,
        };
        let out = self
            .git(&["-C", dest, "checkout", &source.branch])
            .await
            .map_err(|e| checkout_failed(source.redact(&format!("{e:#}"))))?;
        if !out.status.success() {
            let out = self
                .git(&["-C", dest, "checkout", "-B", &source.branch, "FETCH_HEAD"])
                .await
                .map_err(|e| checkout_failed(source.redact(&format!("{e:#}"))))?;
            if !out.status.success() {
                return Err(checkout_failed(stderr_of(source, &out)));
            }
        }

        let out = self
            .git(&["-C", dest, "reset", "--hard", "FETCH_HEAD"])
            .await
            .map_err(|e| RepoError::FetchFailed(source.redact(&format!("{e:#}"))))?;
        if !out.status.success() {
            return Err(RepoError::FetchFailed(stderr_of(source, &out)));
        }
        Ok(())
    }
}

fn stderr_of(source: &RepositorySource, out: &Output) -> String {
    source.redact(String::from_utf8_lossy(&out.stderr).trim())
}

impl<R: CommandRunner> SourceFetcher for GitRepository<R> {
    async fn fetch(
        &self,
        source: &RepositorySource,
        dest: &Path,
    ) -> Result<FetchOutcome, RepoError> {
        let available = self
            .runner
            .run("git", &["--version"])
            .await
            .is_ok_and(|out| out.status.success());
        if !available {
            return Err(RepoError::GitUnavailable);
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RepoError::WorkdirUnavailable {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let dest_str = dest.display().to_string();
        if !dest.exists() {
            tracing::info!(dest = %dest_str, branch = %source.branch, "cloning repository");
            self.clone_into(source, &dest_str).await?;
            return Ok(FetchOutcome::Cloned);
        }
        if !dest.join(".git").exists() {
            return Err(RepoError::NotARepository(dest_str));
        }
        tracing::info!(dest = %dest_str, branch = %source.branch, "updating repository");
        self.update(source, &dest_str).await?;
        Ok(FetchOutcome::Updated)
    }
}
