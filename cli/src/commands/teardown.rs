//! `dockhand --cleanup`: remove one deployment from its host.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::pipeline::run_teardown;
use crate::commands::params::RunParams;
use crate::domain::AppName;
use crate::infra::ssh::{SshExecutor, SshTarget};

/// Tear down the deployment named after the repository.
///
/// # Errors
///
/// Returns an error if no name can be derived or the host is unreachable.
pub async fn run(app: &AppContext, params: &RunParams) -> Result<()> {
    let name = AppName::from_repo_url(&params.source.url)?;
    let identity = params.identity(name);
    let target = SshTarget::new(&identity, app.config.timeouts.connect());
    let executor = SshExecutor::new(app.runner(), target);

    let reporter = app.terminal_reporter();
    let outcome = run_teardown(&executor, &reporter, &identity, &app.config)
        .await
        .inspect_err(|_| reporter.fail("cleanup failed"))?;
    drop(reporter);

    let ctx = &app.output;
    if ctx.quiet {
        return Ok(());
    }
    println!();
    ctx.header("Cleanup complete");
    ctx.kv("Application", identity.name.as_str());
    ctx.kv("Host", &identity.host.to_string());
    ctx.kv("Previous mode", outcome.prior.label());
    for warning in &outcome.warnings {
        ctx.warn(warning);
    }
    Ok(())
}
