//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod bundle;
pub mod config;
pub mod error;
pub mod health;
pub mod identity;
pub mod layout;
pub mod proxy;
pub mod script;

pub use bundle::{BuildStrategy, DeploymentMode};
pub use config::DeployConfig;
pub use error::{
    DeployError, ExitCoded, InputError, ProvisionError, ProvisionStage, ProxyError, RemoteError,
    RepoError, ValidationError, exit_code_for,
};
pub use health::{CheckResult, CheckSeverity, ProbeOutcome, ValidationReport};
pub use identity::{AppName, DeploymentIdentity, RepositorySource};
pub use layout::RemoteLayout;
pub use proxy::ProxySiteRecord;
pub use script::{ScriptBlock, shell_quote};
