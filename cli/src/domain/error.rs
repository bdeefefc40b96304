//! Typed domain error enums and the process exit-code contract.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Every variant maps to a fixed exit code; callers
//! script around these numbers, so they never change once assigned.

use thiserror::Error;

/// Exit code used when no typed error is found in an error chain.
pub const EXIT_UNCLASSIFIED: i32 = 1;

/// An error that owns a stable process exit code.
pub trait ExitCoded {
    /// The process exit code reserved for this failure.
    fn exit_code(&self) -> i32;
}

// ── Input errors (10–15) ──────────────────────────────────────────────────────

/// Parameter validation failures. Reported before any remote action.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid repository URL '{0}': must start with http:// or https://")]
    InvalidRepoUrl(String),

    #[error("Invalid branch name '{0}'")]
    InvalidBranch(String),

    #[error("Access token must not be empty")]
    EmptyToken,

    #[error("Invalid SSH username '{0}': must match ^[a-z_][a-z0-9_.-]*$")]
    InvalidSshUser(String),

    #[error("Invalid IPv4 address '{0}'")]
    InvalidHost(String),

    #[error("Invalid port '{0}': must be an integer between 1 and 65535")]
    InvalidPort(String),

    #[error("SSH key {path} is unavailable: {reason}")]
    SshKeyUnavailable { path: String, reason: String },

    #[error("Missing required value: {0} (run interactively or pass it as a flag)")]
    Missing(&'static str),
}

impl ExitCoded for InputError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidRepoUrl(_) | Self::InvalidBranch(_) => 10,
            Self::EmptyToken => 11,
            Self::InvalidSshUser(_) => 12,
            Self::InvalidHost(_) => 13,
            Self::InvalidPort(_) => 14,
            Self::SshKeyUnavailable { .. } => 15,
            Self::Missing(field) => missing_field_code(field),
        }
    }
}

fn missing_field_code(field: &str) -> i32 {
    match field {
        "token" => 11,
        "user" => 12,
        "host" => 13,
        "port" => 14,
        "key" => 15,
        _ => 10,
    }
}

// ── Repository errors (20–27) ─────────────────────────────────────────────────

/// Local repository fetch and bundle inspection failures.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("git clone failed:\n{0}")]
    CloneFailed(String),

    #[error("git fetch failed:\n{0}")]
    FetchFailed(String),

    #[error("cannot check out branch '{branch}':\n{detail}")]
    CheckoutFailed { branch: String, detail: String },

    #[error("cannot prepare work directory {path}: {reason}")]
    WorkdirUnavailable { path: String, reason: String },

    #[error(
        "no build definition in {0}: expected docker-compose.yml, compose.yml or Dockerfile at the project root"
    )]
    NoBuildDefinition(String),

    #[error("cannot derive an application name from '{0}'")]
    NameUnderivable(String),

    #[error("git is not available on this machine. Install git and retry.")]
    GitUnavailable,

    #[error("{0} exists but is not a git repository. Remove it and retry.")]
    NotARepository(String),
}

impl ExitCoded for RepoError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::CloneFailed(_) => 20,
            Self::FetchFailed(_) => 21,
            Self::CheckoutFailed { .. } => 22,
            Self::WorkdirUnavailable { .. } => 23,
            Self::NoBuildDefinition(_) => 24,
            Self::NameUnderivable(_) => 25,
            Self::GitUnavailable => 26,
            Self::NotARepository(_) => 27,
        }
    }
}

// ── Transport errors (40) ─────────────────────────────────────────────────────

/// Failures of the secure-shell transport itself, as opposed to a remote
/// command that ran and exited non-zero.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("cannot reach {host} over SSH: {detail}")]
    Connection { host: String, detail: String },

    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    #[error("cannot start {program}: {detail}")]
    Spawn { program: String, detail: String },
}

impl ExitCoded for RemoteError {
    fn exit_code(&self) -> i32 {
        40
    }
}

// ── Provisioning errors (41–53) ───────────────────────────────────────────────

/// Numbered stages of the environment provisioning block.
///
/// The discriminant is both the remote script's `exit` status for the stage
/// and the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    PackageIndex = 41,
    Prerequisites = 42,
    DockerInstall = 43,
    ComposeInstall = 44,
    NginxInstall = 45,
    DockerGroup = 46,
    DockerService = 47,
    NginxService = 48,
    DockerVerify = 49,
    ComposeVerify = 50,
    NginxVerify = 51,
}

impl ProvisionStage {
    pub const ALL: [Self; 11] = [
        Self::PackageIndex,
        Self::Prerequisites,
        Self::DockerInstall,
        Self::ComposeInstall,
        Self::NginxInstall,
        Self::DockerGroup,
        Self::DockerService,
        Self::NginxService,
        Self::DockerVerify,
        Self::ComposeVerify,
        Self::NginxVerify,
    ];

    /// Map a remote exit status back to its stage.
    #[must_use]
    pub fn from_exit_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::PackageIndex => "refreshing package index",
            Self::Prerequisites => "installing prerequisites",
            Self::DockerInstall => "installing docker",
            Self::ComposeInstall => "installing docker compose",
            Self::NginxInstall => "installing nginx",
            Self::DockerGroup => "adding user to the docker group",
            Self::DockerService => "enabling the docker service",
            Self::NginxService => "enabling the nginx service",
            Self::DockerVerify => "verifying docker",
            Self::ComposeVerify => "verifying docker compose",
            Self::NginxVerify => "verifying nginx",
        }
    }
}

/// Environment provisioning and artifact transfer failures.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("provisioning failed at stage {} ({}):\n{detail}", .stage.code(), .stage.description())]
    Stage { stage: ProvisionStage, detail: String },

    #[error("provisioning script exited with unexpected status {code}:\n{detail}")]
    Script { code: i32, detail: String },

    #[error("cannot create remote directory {path}:\n{detail}")]
    RemoteDirectory { path: String, detail: String },

    #[error("artifact transfer to {target} failed:\n{detail}")]
    Transfer { target: String, detail: String },
}

impl ExitCoded for ProvisionError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Stage { stage, .. } => stage.code(),
            Self::Script { .. } => ProvisionStage::PackageIndex.code(),
            Self::RemoteDirectory { .. } => 52,
            Self::Transfer { .. } => 53,
        }
    }
}

// ── Deployment errors (60–67) ─────────────────────────────────────────────────

/// Container lifecycle failures.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deployment script failed with status {code}:\n{detail}")]
    Script { code: i32, detail: String },

    #[error("no deployment strategy found in {path}:\n{detail}")]
    NoStrategy { path: String, detail: String },

    #[error("docker compose up failed:\n{0}")]
    ComposeUp(String),

    #[error("docker build of {image} failed:\n{detail}")]
    ImageBuild { image: String, detail: String },

    #[error("docker run of {container} failed:\n{detail}")]
    ContainerRun { container: String, detail: String },

    #[error("container '{name}' is not running after startup. Recent logs:\n{logs}")]
    NotRunning { name: String, logs: String },

    #[error("cannot record deployment mode:\n{0}")]
    MarkerWrite(String),

    #[error("cannot clear the previous deployment (recorded mode: {mode}):\n{detail}")]
    StopPrevious { mode: String, detail: String },
}

impl ExitCoded for DeployError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Script { .. } => 60,
            Self::NoStrategy { .. } => 61,
            Self::ComposeUp(_) => 62,
            Self::ImageBuild { .. } => 63,
            Self::ContainerRun { .. } => 64,
            Self::NotRunning { .. } => 65,
            Self::MarkerWrite(_) => 66,
            Self::StopPrevious { .. } => 67,
        }
    }
}

// ── Proxy errors (70–72) ──────────────────────────────────────────────────────

/// Reverse proxy configuration failures.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("cannot install nginx site '{site}':\n{detail}")]
    Install { site: String, detail: String },

    #[error("nginx rejected the configuration; previous site restored:\n{0}")]
    Syntax(String),

    #[error("nginx reload failed:\n{0}")]
    Reload(String),
}

impl ExitCoded for ProxyError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Install { .. } => 70,
            Self::Syntax(_) => 71,
            Self::Reload(_) => 72,
        }
    }
}

// ── Validation errors (80–82) ─────────────────────────────────────────────────

/// Fatal post-deploy validation failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("docker service is not active")]
    EngineInactive,

    #[error("container '{0}' is not in the running container list")]
    ContainerMissing(String),

    #[error("nginx service is not active")]
    ProxyInactive,
}

impl ExitCoded for ValidationError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::EngineInactive => 80,
            Self::ContainerMissing(_) => 81,
            Self::ProxyInactive => 82,
        }
    }
}

// ── Chain lookup ──────────────────────────────────────────────────────────────

/// Find the reserved exit code for the first typed error in `err`'s chain.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<InputError>() {
                return Some(e.exit_code());
            }
            if let Some(e) = cause.downcast_ref::<RepoError>() {
                return Some(e.exit_code());
            }
            if let Some(e) = cause.downcast_ref::<RemoteError>() {
                return Some(e.exit_code());
            }
            if let Some(e) = cause.downcast_ref::<ProvisionError>() {
                return Some(e.exit_code());
            }
            if let Some(e) = cause.downcast_ref::<DeployError>() {
                return Some(e.exit_code());
            }
            if let Some(e) = cause.downcast_ref::<ProxyError>() {
                return Some(e.exit_code());
            }
            cause
                .downcast_ref::<ValidationError>()
                .map(ExitCoded::exit_code)
        })
        .unwrap_or(EXIT_UNCLASSIFIED)
}
