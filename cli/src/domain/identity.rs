//! Deployment identity types and pure input validators.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::error::{InputError, RepoError};

/// Placeholder substituted for the access token in every diagnostic.
pub const REDACTED: &str = "***";

// Patterns are compile-time constants.
#[allow(clippy::expect_used)]
static APP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]{0,127}$").expect("valid regex"));

#[allow(clippy::expect_used)]
static SSH_USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_.-]*$").expect("valid regex"));

#[allow(clippy::expect_used)]
static DOTTED_QUAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").expect("valid regex")
});

// ── AppName ───────────────────────────────────────────────────────────────────

/// Application name derived from the repository URL.
///
/// Used as container name, image tag, remote directory leaf and nginx site
/// name. Always matches `^[a-z0-9][a-z0-9._-]{0,127}$`, which makes it safe to
/// place inside double-quoted shell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppName(String);

impl AppName {
    /// Validate an already-derived name.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::NameUnderivable`] if the name has characters that
    /// docker or the shell would not accept verbatim.
    pub fn new(raw: &str) -> Result<Self, RepoError> {
        if APP_NAME_RE.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(RepoError::NameUnderivable(raw.to_string()))
        }
    }

    /// Derive the name from a repository URL: last path segment, minus a
    /// trailing `.git`, lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::NameUnderivable`] if the basename is empty or
    /// contains characters outside the allowed set.
    pub fn from_repo_url(url: &str) -> Result<Self, RepoError> {
        let trimmed = url.trim().trim_end_matches('/');
        let base = trimmed.rsplit('/').next().unwrap_or_default();
        let base = base.strip_suffix(".git").unwrap_or(base);
        Self::new(&base.to_ascii_lowercase())
            .map_err(|_| RepoError::NameUnderivable(url.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Image reference built for Dockerfile deployments.
    #[must_use]
    pub fn image_tag(&self) -> String {
        format!("{}:latest", self.0)
    }

    /// Compose project name. Compose drops characters outside
    /// `[a-z0-9_-]`, so a dotted name maps to a shorter project.
    #[must_use]
    pub fn compose_project(&self) -> String {
        self.0
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
            .collect()
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Deployment identity ───────────────────────────────────────────────────────

/// The immutable identity every stage operates on.
#[derive(Debug, Clone)]
pub struct DeploymentIdentity {
    pub name: AppName,
    pub host: Ipv4Addr,
    pub ssh_user: String,
    pub ssh_key: PathBuf,
    pub internal_port: u16,
}

impl DeploymentIdentity {
    /// `user@host` destination for ssh and rsync.
    #[must_use]
    pub fn ssh_destination(&self) -> String {
        format!("{}@{}", self.ssh_user, self.host)
    }

    /// Public URL served by the reverse proxy.
    #[must_use]
    pub fn public_url(&self) -> String {
        format!("http://{}/", self.host)
    }
}

// ── Repository source ─────────────────────────────────────────────────────────

/// Where the application source comes from.
///
/// The token is only ever exposed inside [`RepositorySource::authenticated_url`].
#[derive(Debug)]
pub struct RepositorySource {
    pub url: String,
    pub branch: String,
    token: Option<SecretString>,
}

impl RepositorySource {
    #[must_use]
    pub fn new(url: String, branch: String, token: Option<SecretString>) -> Self {
        Self { url, branch, token }
    }

    /// Clone URL with the token placed in the userinfo section.
    #[must_use]
    pub fn authenticated_url(&self) -> SecretString {
        let Some(token) = &self.token else {
            return SecretString::from(self.url.clone());
        };
        let (scheme, rest) = self
            .url
            .split_once("://")
            .unwrap_or(("https", self.url.as_str()));
        SecretString::from(format!("{scheme}://{}@{rest}", token.expose_secret()))
    }

    /// Replace every occurrence of the token in `text` with `***`.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        match &self.token {
            Some(token) if !token.expose_secret().is_empty() => {
                text.replace(token.expose_secret(), REDACTED)
            }
            _ => text.to_string(),
        }
    }
}

// ── Validators ────────────────────────────────────────────────────────────────

/// Validates a repository URL.
///
/// # Errors
///
/// Returns an error unless the URL uses `http`/`https` and has a host and path.
pub fn validate_repo_url(raw: &str) -> Result<String, InputError> {
    let url = raw.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| InputError::InvalidRepoUrl(raw.to_string()))?;
    let valid = rest
        .split_once('/')
        .is_some_and(|(host, path)| !host.is_empty() && !path.trim_matches('/').is_empty())
        && !url.chars().any(char::is_whitespace);
    if !valid {
        return Err(InputError::InvalidRepoUrl(raw.to_string()));
    }
    Ok(url.to_string())
}

/// Validates a git branch name well enough to pass it as an argument.
///
/// # Errors
///
/// Returns an error if the branch is empty, has whitespace, or starts with `-`.
pub fn validate_branch(raw: &str) -> Result<String, InputError> {
    let branch = raw.trim();
    if branch.is_empty() || branch.starts_with('-') || branch.chars().any(char::is_whitespace) {
        return Err(InputError::InvalidBranch(raw.to_string()));
    }
    Ok(branch.to_string())
}

/// Validates the access token.
///
/// # Errors
///
/// Returns [`InputError::EmptyToken`] if the token is empty after trimming.
pub fn validate_token(raw: &str) -> Result<SecretString, InputError> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(InputError::EmptyToken);
    }
    Ok(SecretString::from(token.to_string()))
}

/// Validates the remote login name.
///
/// # Errors
///
/// Returns an error if the name is empty or could be parsed as an ssh option.
pub fn validate_ssh_user(raw: &str) -> Result<String, InputError> {
    let user = raw.trim();
    if !SSH_USER_RE.is_match(user) {
        return Err(InputError::InvalidSshUser(raw.to_string()));
    }
    Ok(user.to_string())
}

/// Validates a dotted-quad IPv4 address with every octet in `0..=255`.
///
/// # Errors
///
/// Returns an error if the shape is wrong or an octet is out of range.
pub fn validate_ipv4(raw: &str) -> Result<Ipv4Addr, InputError> {
    let host = raw.trim();
    if !DOTTED_QUAD_RE.is_match(host) {
        return Err(InputError::InvalidHost(raw.to_string()));
    }
    let mut octets = [0u8; 4];
    for (slot, group) in octets.iter_mut().zip(host.split('.')) {
        *slot = group
            .parse::<u8>()
            .map_err(|_| InputError::InvalidHost(raw.to_string()))?;
    }
    Ok(Ipv4Addr::from(octets))
}

/// Validates an application port.
///
/// # Errors
///
/// Returns an error unless `raw` is all digits and within `1..=65535`.
pub fn validate_port(raw: &str) -> Result<u16, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidPort(raw.to_string()));
    }
    match trimmed.parse::<u16>() {
        Ok(port) if port >= 1 => Ok(port),
        _ => Err(InputError::InvalidPort(raw.to_string())),
    }
}
