//! Application service: remove one deployment from the host.
//!
//! Every removal step is best-effort so a half-deployed or empty host tears
//! down cleanly. Only transport failures abort.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteExecutor};
use crate::application::services::deploy::{PriorMode, read_prior_mode, stop_both};
use crate::application::services::{COMPOSE_FN, NOTE_FN, relay_notes};
use crate::domain::config::DeployConfig;
use crate::domain::{RemoteLayout, ScriptBlock};

/// What teardown found and what it could not finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownOutcome {
    pub prior: PriorMode,
    pub warnings: Vec<String>,
}

/// Block that stops both lifecycles, removes the image and the nginx site.
#[must_use]
pub fn teardown_script(layout: &RemoteLayout, prior: PriorMode) -> ScriptBlock {
    let name = layout.name();
    let mut body = String::from(NOTE_FN);
    body.push_str(COMPOSE_FN);
    body.push_str(&stop_both(layout, prior, " --rmi local"));
    body.push_str(&format!(
        "sudo docker rmi {image} >/dev/null 2>&1 || true\nnote \"removing nginx site {name}\"\nsudo rm -f {enabled} {available} {backup} || true\n",
        image = name.image_tag(),
        enabled = layout.site_enabled(),
        available = layout.site_available(),
        backup = layout.site_backup(),
    ));
    ScriptBlock::new("teardown", body)
}

/// Reload nginx after the site is gone. Hosts without nginx are left alone.
const RELOAD_AFTER_REMOVAL: &str = "if command -v nginx >/dev/null 2>&1 || [ -x /usr/sbin/nginx ]; then sudo nginx -t && sudo systemctl reload nginx; fi";

/// Tear down the deployment named by `layout`.
///
/// # Errors
///
/// Returns [`crate::domain::RemoteError`] when the host cannot be reached.
pub async fn teardown(
    executor: &impl RemoteExecutor,
    reporter: &impl ProgressReporter,
    layout: &RemoteLayout,
    config: &DeployConfig,
) -> Result<TeardownOutcome> {
    let mut warnings = Vec::new();
    let prior = read_prior_mode(executor, layout, config).await?;
    reporter.step(&format!("recorded deployment mode: {}", prior.label()));

    let out = executor
        .run_script(&teardown_script(layout, prior), config.timeouts.deploy())
        .await?;
    relay_notes(reporter, &out.stdout);
    if !out.success() {
        warnings.push(format!("container cleanup incomplete: {}", out.diagnostic()));
    }

    let reload = executor
        .exec(RELOAD_AFTER_REMOVAL, config.timeouts.command())
        .await?;
    if !reload.success() {
        warnings.push(format!("nginx reload failed: {}", reload.diagnostic()));
    }

    let remove = executor
        .exec(
            &format!("rm -rf {} {}", layout.app_dir(), layout.marker_file()),
            config.timeouts.command(),
        )
        .await?;
    if !remove.success() {
        warnings.push(format!(
            "cannot remove ~/{}: {}",
            layout.name(),
            remove.diagnostic()
        ));
    }

    for warning in &warnings {
        reporter.warn(warning);
    }
    Ok(TeardownOutcome { prior, warnings })
}
