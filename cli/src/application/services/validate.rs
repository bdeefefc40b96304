//! Application service: post-deploy checks.
//!
//! Service and container checks confirm this tool's own work and are fatal.
//! Endpoint checks depend on the application and the network, so they only
//! warn.

use anyhow::Result;

use crate::application::ports::{HttpProbe, ProgressReporter, RemoteExecutor};
use crate::application::services::PS_NAMES;
use crate::domain::config::TimeoutsConfig;
use crate::domain::health::container_running;
use crate::domain::{
    CheckResult, CheckSeverity, DeploymentIdentity, ValidationError, ValidationReport,
};

pub const CHECK_DOCKER: &str = "docker service";
pub const CHECK_CONTAINER: &str = "container running";
pub const CHECK_NGINX: &str = "nginx service";
pub const CHECK_INTERNAL: &str = "internal endpoint";
pub const CHECK_PUBLIC: &str = "public endpoint";

/// Run every check and collect the outcomes.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first failed fatal check.
pub async fn validate_deployment(
    executor: &impl RemoteExecutor,
    probe: &impl HttpProbe,
    reporter: &impl ProgressReporter,
    identity: &DeploymentIdentity,
    timeouts: &TimeoutsConfig,
) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    let docker = executor
        .exec("systemctl is-active --quiet docker", timeouts.command())
        .await?;
    if !docker.success() {
        return Err(ValidationError::EngineInactive.into());
    }
    report.push(CheckResult::pass(CHECK_DOCKER, CheckSeverity::Fatal));

    let ps = executor.exec(PS_NAMES, timeouts.command()).await?;
    if !(ps.success() && container_running(&ps.stdout, &identity.name)) {
        return Err(ValidationError::ContainerMissing(identity.name.to_string()).into());
    }
    report.push(CheckResult::pass(CHECK_CONTAINER, CheckSeverity::Fatal));

    let nginx = executor
        .exec("systemctl is-active --quiet nginx", timeouts.command())
        .await?;
    if !nginx.success() {
        return Err(ValidationError::ProxyInactive.into());
    }
    report.push(CheckResult::pass(CHECK_NGINX, CheckSeverity::Fatal));

    let port = identity.internal_port;
    let internal = executor
        .exec(
            &format!(
                "curl -fsS -o /dev/null -m 5 http://localhost:{port}/ || curl -fsS -o /dev/null -m 5 http://localhost/"
            ),
            timeouts.command(),
        )
        .await?;
    if internal.success() {
        report.push(CheckResult::pass(CHECK_INTERNAL, CheckSeverity::Warning));
    } else {
        let detail = internal.diagnostic();
        reporter.warn(&format!("{CHECK_INTERNAL} did not answer: {detail}"));
        report.push(CheckResult::fail(
            CHECK_INTERNAL,
            CheckSeverity::Warning,
            detail,
        ));
    }

    let url = identity.public_url();
    let outcome = probe.probe(&url, timeouts.probe()).await;
    if outcome.is_reachable() {
        report.push(CheckResult::pass(CHECK_PUBLIC, CheckSeverity::Warning));
    } else {
        reporter.warn(&format!("{url} {}", outcome.describe()));
        report.push(CheckResult::fail(
            CHECK_PUBLIC,
            CheckSeverity::Warning,
            outcome.describe(),
        ));
    }

    Ok(report)
}
