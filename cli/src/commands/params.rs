//! Run parameters: flags first, then prompts, then config defaults.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::domain::config::DefaultsConfig;
use crate::domain::identity::{
    validate_branch, validate_ipv4, validate_port, validate_repo_url, validate_ssh_user,
    validate_token,
};
use crate::domain::{AppName, DeploymentIdentity, InputError, RepositorySource};
use crate::infra::fs::expand_home;
use crate::infra::logging::RunKind;

/// Values that identify the repository and the target host.
#[derive(Args, Debug, Default, Clone)]
pub struct ParamArgs {
    /// Repository URL (http:// or https://)
    #[arg(long, value_name = "URL")]
    pub repo: Option<String>,

    /// Access token used to clone the repository
    #[arg(long, env = "DOCKHAND_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Branch to deploy [default: defaults.branch]
    #[arg(long)]
    pub branch: Option<String>,

    /// SSH login on the target host
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// IPv4 address of the target host
    #[arg(long, value_name = "IPV4")]
    pub host: Option<String>,

    /// Private key for SSH [default: defaults.ssh_key]
    #[arg(long, value_name = "PATH")]
    pub key: Option<String>,

    /// Port the application listens on inside the container
    #[arg(long, value_name = "N")]
    pub port: Option<String>,
}

/// Asks the operator for values not passed as flags.
pub trait Prompter {
    /// Free-text answer; `default` is offered and returned on empty input.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Hidden answer for secrets.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn secret(&self, prompt: &str) -> Result<String>;
}

/// Terminal prompts via `dialoguer`.
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        Ok(dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?)
    }
}

/// Validated parameters for one run.
#[derive(Debug)]
pub struct RunParams {
    pub source: RepositorySource,
    pub ssh_user: String,
    pub host: Ipv4Addr,
    pub ssh_key: PathBuf,
    pub port: u16,
}

impl RunParams {
    /// The identity of the deployment named `name`.
    #[must_use]
    pub fn identity(&self, name: AppName) -> DeploymentIdentity {
        DeploymentIdentity {
            name,
            host: self.host,
            ssh_user: self.ssh_user.clone(),
            ssh_key: self.ssh_key.clone(),
            internal_port: self.port,
        }
    }
}

/// Gather and validate every parameter `kind` needs.
///
/// With `prompter` set, missing values are asked for; without it they fall
/// back to `defaults` where one exists and are an error otherwise. Cleanup
/// runs never collect the token.
///
/// # Errors
///
/// Returns [`InputError`] for a missing or invalid value, or an error if a
/// prompt cannot be read.
pub fn collect<P: Prompter>(
    args: &ParamArgs,
    kind: RunKind,
    defaults: &DefaultsConfig,
    prompter: Option<&P>,
) -> Result<RunParams> {
    let url = validate_repo_url(&value(
        args.repo.as_deref(),
        "repo",
        "Repository URL",
        None,
        prompter,
    )?)?;

    let token = match kind {
        RunKind::Cleanup => None,
        RunKind::Deploy => {
            let raw = match (args.token.as_deref(), prompter) {
                (Some(raw), _) => raw.to_string(),
                (None, Some(p)) => p.secret("Access token")?,
                (None, None) => return Err(InputError::Missing("token").into()),
            };
            Some(validate_token(&raw)?)
        }
    };

    let branch = match kind {
        RunKind::Cleanup => args.branch.clone().unwrap_or_else(|| defaults.branch.clone()),
        RunKind::Deploy => value(
            args.branch.as_deref(),
            "branch",
            "Branch",
            Some(&defaults.branch),
            prompter,
        )?,
    };
    let branch = validate_branch(&branch)?;
    let ssh_user = validate_ssh_user(&value(
        args.user.as_deref(),
        "user",
        "SSH user",
        None,
        prompter,
    )?)?;
    let host = validate_ipv4(&value(
        args.host.as_deref(),
        "host",
        "Host IPv4 address",
        None,
        prompter,
    )?)?;
    let key = value(
        args.key.as_deref(),
        "key",
        "SSH private key",
        Some(&defaults.ssh_key),
        prompter,
    )?;
    let port = validate_port(&value(
        args.port.as_deref(),
        "port",
        "Application port",
        None,
        prompter,
    )?)?;

    Ok(RunParams {
        source: RepositorySource::new(url, branch, token),
        ssh_user,
        host,
        ssh_key: expand_home(key.trim())?,
        port,
    })
}

fn value<P: Prompter>(
    flag: Option<&str>,
    field: &'static str,
    prompt: &str,
    default: Option<&str>,
    prompter: Option<&P>,
) -> Result<String> {
    if let Some(flag) = flag {
        return Ok(flag.to_string());
    }
    match (prompter, default) {
        (Some(p), default) => p.text(prompt, default),
        (None, Some(default)) => Ok(default.to_string()),
        (None, None) => Err(InputError::Missing(field).into()),
    }
}
