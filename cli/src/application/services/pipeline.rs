//! Application service: the full deployment sequence.
//!
//! connectivity → provision → sync → deploy → proxy → validate, each stage
//! gated on the previous one. Nothing already done is undone on failure;
//! every stage converges when the run is repeated.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{ArtifactTransfer, HttpProbe, ProgressReporter, RemoteExecutor};
use crate::application::services::deploy::{LaunchOutcome, deploy_application};
use crate::application::services::provision::{check_connectivity, ensure_environment};
use crate::application::services::proxy::configure_proxy;
use crate::application::services::sync::sync_artifacts;
use crate::application::services::teardown::{TeardownOutcome, teardown};
use crate::application::services::validate::validate_deployment;
use crate::domain::{
    BuildStrategy, DeployConfig, DeploymentIdentity, ProxySiteRecord, RemoteLayout,
    ValidationReport,
};

/// Ports the remote stages run against.
pub struct RemotePorts<'a, E, T, P, R> {
    pub executor: &'a E,
    pub transfer: &'a T,
    pub probe: &'a P,
    pub reporter: &'a R,
}

/// Result of a successful deployment.
#[derive(Debug, Clone)]
pub struct DeploySummary {
    pub launch: LaunchOutcome,
    pub report: ValidationReport,
    pub public_url: String,
}

/// Run every remote stage for `identity`.
///
/// # Errors
///
/// Returns the first stage failure; its typed error determines the exit
/// code.
pub async fn run_deploy<E, T, P, R>(
    ports: &RemotePorts<'_, E, T, P, R>,
    identity: &DeploymentIdentity,
    bundle: &Path,
    strategy: &BuildStrategy,
    config: &DeployConfig,
) -> Result<DeploySummary>
where
    E: RemoteExecutor,
    T: ArtifactTransfer,
    P: HttpProbe,
    R: ProgressReporter,
{
    let RemotePorts {
        executor,
        transfer,
        probe,
        reporter,
    } = *ports;
    let layout = RemoteLayout::new(&identity.name, &config.proxy);
    let timeouts = &config.timeouts;

    reporter.step(&format!("connecting to {}", identity.ssh_destination()));
    check_connectivity(executor, identity, timeouts).await?;
    reporter.success(&format!("connected to {}", identity.host));

    reporter.step("provisioning docker, compose and nginx");
    ensure_environment(executor, reporter, timeouts).await?;
    reporter.success("environment ready");

    reporter.step("syncing artifacts");
    sync_artifacts(executor, transfer, reporter, &layout, bundle, timeouts).await?;
    reporter.success(&format!("artifacts synced to ~/{}", identity.name));

    reporter.step(&format!("deploying {} ({})", identity.name, strategy.mode().as_str()));
    let launch = deploy_application(
        executor,
        reporter,
        &layout,
        strategy,
        identity.internal_port,
        config,
    )
    .await?;
    reporter.success(&format!("{} is running", identity.name));

    reporter.step("configuring nginx");
    let record = ProxySiteRecord::for_identity(identity);
    configure_proxy(executor, reporter, &layout, &record, timeouts).await?;
    reporter.success("nginx reloaded");

    reporter.step("validating deployment");
    let report = validate_deployment(executor, probe, reporter, identity, timeouts).await?;
    if report.all_passed() {
        reporter.success("all checks passed");
    } else {
        reporter.success("deployment validated with warnings");
    }

    Ok(DeploySummary {
        launch,
        report,
        public_url: identity.public_url(),
    })
}

/// Connect, then tear down everything `identity` deployed.
///
/// # Errors
///
/// Returns a transport error when the host is unreachable.
pub async fn run_teardown(
    executor: &impl RemoteExecutor,
    reporter: &impl ProgressReporter,
    identity: &DeploymentIdentity,
    config: &DeployConfig,
) -> Result<TeardownOutcome> {
    let layout = RemoteLayout::new(&identity.name, &config.proxy);
    reporter.step(&format!("connecting to {}", identity.ssh_destination()));
    check_connectivity(executor, identity, &config.timeouts).await?;
    reporter.step(&format!("tearing down {}", identity.name));
    let outcome = teardown(executor, reporter, &layout, config).await?;
    if outcome.warnings.is_empty() {
        reporter.success(&format!("{} removed", identity.name));
    } else {
        reporter.success(&format!("{} removed with warnings", identity.name));
    }
    Ok(outcome)
}
