//! `dockhand`: fetch, ship and launch an application behind nginx.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ProgressReporter as _;
use crate::application::services::pipeline::{DeploySummary, RemotePorts, run_deploy};
use crate::application::services::source::prepare_source;
use crate::commands::params::RunParams;
use crate::domain::{CheckSeverity, DeploymentIdentity};
use crate::infra::fs::LocalFs;
use crate::infra::git::GitRepository;
use crate::infra::http_probe::UreqProbe;
use crate::infra::rsync::RsyncTransfer;
use crate::infra::ssh::{SshExecutor, SshTarget};
use crate::output::OutputContext;

/// Run a full deployment.
///
/// # Errors
///
/// Returns the first failing stage's error; its typed cause carries the exit
/// code.
pub async fn run(app: &AppContext, params: &RunParams) -> Result<()> {
    let config = &app.config;
    let reporter = app.terminal_reporter();

    let git = GitRepository::new(app.runner(), config.timeouts.transfer());
    let prepared = prepare_source(&git, &LocalFs, &reporter, &params.source, &app.work_dir)
        .await
        .inspect_err(|_| reporter.fail("fetching source failed"))?;
    reporter.success(&format!(
        "{} ready ({})",
        prepared.name,
        prepared.strategy.definition_file()
    ));

    let identity = params.identity(prepared.name.clone());
    let target = SshTarget::new(&identity, config.timeouts.connect());
    let executor = SshExecutor::new(app.runner(), target.clone());
    let transfer = RsyncTransfer::new(app.runner(), target);
    let ports = RemotePorts {
        executor: &executor,
        transfer: &transfer,
        probe: &UreqProbe,
        reporter: &reporter,
    };

    let summary = run_deploy(&ports, &identity, &prepared.bundle, &prepared.strategy, config)
        .await
        .inspect_err(|_| reporter.fail("deployment failed"))?;
    drop(reporter);

    print_summary(&app.output, &identity, &summary);
    Ok(())
}

fn print_summary(ctx: &OutputContext, identity: &DeploymentIdentity, summary: &DeploySummary) {
    if ctx.quiet {
        return;
    }
    println!();
    ctx.header("Deployment complete");
    ctx.kv("Application", identity.name.as_str());
    ctx.kv("Mode", summary.launch.mode.as_str());
    ctx.kv("Replaced", summary.launch.prior.label());
    ctx.kv("Upstream", &format!("http://localhost:{}", identity.internal_port));
    for check in &summary.report.checks {
        match (check.passed, &check.detail) {
            (true, _) => ctx.success(check.name),
            (false, Some(detail)) if check.severity == CheckSeverity::Warning => {
                ctx.warn(&format!("{}: {detail}", check.name));
            }
            (false, _) => ctx.warn(check.name),
        }
    }
    ctx.link("Open", &summary.public_url);
}
