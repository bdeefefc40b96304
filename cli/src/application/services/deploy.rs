//! Application service: container lifecycle on the remote host.
//!
//! Stop the previous instance, build and launch the new one, record the
//! lifecycle mode, then confirm something named after the app is running.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteExecutor};
use crate::application::services::{COMPOSE_FN, NOTE_FN, PS_NAMES, relay_notes};
use crate::domain::config::DeployConfig;
use crate::domain::health::container_running;
use crate::domain::{BuildStrategy, DeployError, DeploymentMode, RemoteLayout, ScriptBlock};

/// Lifecycle mode found in the remote marker before this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorMode {
    Known(DeploymentMode),
    /// No marker, or one this version does not understand.
    Unknown,
}

impl PriorMode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Known(mode) => mode.as_str(),
            Self::Unknown => "unknown",
        }
    }

    /// Both lifecycles, the recorded one first. A marker only says what the
    /// last successful launch was, so the other path is never skipped.
    #[must_use]
    pub fn stop_order(self) -> [DeploymentMode; 2] {
        match self {
            Self::Known(DeploymentMode::Container) => {
                [DeploymentMode::Container, DeploymentMode::Compose]
            }
            Self::Known(DeploymentMode::Compose) | Self::Unknown => {
                [DeploymentMode::Compose, DeploymentMode::Container]
            }
        }
    }
}

/// What the controller launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub prior: PriorMode,
    pub mode: DeploymentMode,
}

/// Read the lifecycle marker. A missing or unreadable marker is `Unknown`.
///
/// # Errors
///
/// Returns [`crate::domain::RemoteError`] on transport failure only.
pub async fn read_prior_mode(
    executor: &impl RemoteExecutor,
    layout: &RemoteLayout,
    config: &DeployConfig,
) -> Result<PriorMode> {
    let out = executor
        .exec(
            &format!("cat {} 2>/dev/null || true", layout.marker_file()),
            config.timeouts.command(),
        )
        .await?;
    if !out.success() {
        return Ok(PriorMode::Unknown);
    }
    Ok(DeploymentMode::from_marker(&out.stdout).map_or(PriorMode::Unknown, PriorMode::Known))
}

/// Compose `down` for this app, run from its directory when present.
pub(crate) fn compose_down(layout: &RemoteLayout, extra: &str) -> String {
    format!(
        "(cd {dir} 2>/dev/null || cd \"$HOME\"; dc -p {project} down{extra} --remove-orphans)",
        dir = layout.app_dir(),
        project = layout.name().compose_project(),
    )
}

/// Best-effort stop of both lifecycles in `prior`'s order. `down_extra` is
/// appended to compose `down`.
pub(crate) fn stop_both(layout: &RemoteLayout, prior: PriorMode, down_extra: &str) -> String {
    let name = layout.name();
    let mut steps = String::new();
    for mode in prior.stop_order() {
        match mode {
            DeploymentMode::Compose => steps.push_str(&format!(
                "note \"stopping compose project {project}\"\n{down} >/dev/null 2>&1 || true\n",
                project = name.compose_project(),
                down = compose_down(layout, down_extra),
            )),
            DeploymentMode::Container => steps.push_str(&format!(
                "if {exists}; then\n  note \"removing container {name}\"\n  sudo docker rm -f {name} >/dev/null 2>&1 || true\nfi\n",
                exists = container_exists(layout),
            )),
        }
    }
    steps
}

/// Shell test for a container, running or not, named exactly after the app.
fn container_exists(layout: &RemoteLayout) -> String {
    format!(
        "sudo docker ps -a --format '{{{{.Names}}}}' | grep -qx {}",
        layout.name()
    )
}

/// Block that stops whatever an earlier run started. Both stop paths are
/// attempted; the block fails only if a container named after the app
/// survives them, since the launch would then hit a name conflict.
#[must_use]
pub fn stop_previous_script(layout: &RemoteLayout, prior: PriorMode) -> ScriptBlock {
    let mut body = String::from(NOTE_FN);
    body.push_str(COMPOSE_FN);
    body.push_str(&stop_both(layout, prior, ""));
    body.push_str(&format!(
        "if {}; then\n  echo \"container {name} is still present\" >&2\n  exit 67\nfi\n",
        container_exists(layout),
        name = layout.name(),
    ));
    ScriptBlock::new("stop-previous", body)
}

/// Block that builds, launches and records the deployment.
#[must_use]
pub fn launch_script(layout: &RemoteLayout, strategy: &BuildStrategy, port: u16) -> ScriptBlock {
    let name = layout.name();
    let file = strategy.definition_file();
    let mut body = String::from(NOTE_FN);
    body.push_str(COMPOSE_FN);
    body.push_str(&format!(
        "cd {dir} || exit 60\n[ -f {file} ] || {{ echo \"no {file} in $(pwd)\" >&2; exit 61; }}\n",
        dir = layout.app_dir(),
    ));
    match strategy {
        BuildStrategy::Compose { file } => body.push_str(&format!(
            "note \"starting compose project from {file}\"\ndc -p {project} -f {file} up -d --build || exit 62\n",
            project = name.compose_project(),
        )),
        BuildStrategy::Dockerfile => body.push_str(&format!(
            "note \"building image {image}\"\nsudo docker build -t {image} . || exit 63\nnote \"starting container {name}\"\nsudo docker run -d --name {name} -p {port}:{port} --restart unless-stopped {image} >/dev/null || exit 64\n",
            image = name.image_tag(),
        )),
    }
    body.push_str(&format!(
        "mkdir -p {marker_dir} && printf '%s\\n' {mode} > {marker} || exit 66\n",
        marker_dir = layout.marker_dir(),
        marker = layout.marker_file(),
        mode = strategy.mode().as_str(),
    ));
    ScriptBlock::new("launch", body)
}

/// Log tail command for a deployment that did not come up.
fn logs_command(layout: &RemoteLayout, mode: DeploymentMode, lines: u32) -> String {
    match mode {
        DeploymentMode::Container => {
            format!("sudo docker logs --tail {lines} {} 2>&1", layout.name())
        }
        DeploymentMode::Compose => format!(
            "{COMPOSE_FN}cd {dir} && dc -p {project} logs --no-color --tail {lines} 2>&1",
            dir = layout.app_dir(),
            project = layout.name().compose_project(),
        ),
    }
}

/// Stop the previous deployment.
///
/// # Errors
///
/// Returns [`DeployError::StopPrevious`] when a container named after the
/// app is still present after both stop attempts.
pub async fn stop_previous(
    executor: &impl RemoteExecutor,
    reporter: &impl ProgressReporter,
    layout: &RemoteLayout,
    prior: PriorMode,
    config: &DeployConfig,
) -> Result<()> {
    let out = executor
        .run_script(&stop_previous_script(layout, prior), config.timeouts.deploy())
        .await?;
    relay_notes(reporter, &out.stdout);
    if !out.success() {
        return Err(DeployError::StopPrevious {
            mode: prior.label().to_string(),
            detail: out.diagnostic(),
        }
        .into());
    }
    Ok(())
}

/// Build and start the new deployment.
///
/// # Errors
///
/// Returns the [`DeployError`] matching the failed launch step.
pub async fn launch(
    executor: &impl RemoteExecutor,
    reporter: &impl ProgressReporter,
    layout: &RemoteLayout,
    strategy: &BuildStrategy,
    port: u16,
    config: &DeployConfig,
) -> Result<()> {
    let out = executor
        .run_script(&launch_script(layout, strategy, port), config.timeouts.deploy())
        .await?;
    relay_notes(reporter, &out.stdout);
    if out.success() {
        return Ok(());
    }
    let name = layout.name();
    let detail = out.diagnostic();
    let err = match out.exit_code {
        61 => DeployError::NoStrategy {
            path: format!("~/{name}"),
            detail,
        },
        62 => DeployError::ComposeUp(detail),
        63 => DeployError::ImageBuild {
            image: name.image_tag(),
            detail,
        },
        64 => DeployError::ContainerRun {
            container: name.to_string(),
            detail,
        },
        66 => DeployError::MarkerWrite(detail),
        code => DeployError::Script { code, detail },
    };
    Err(err.into())
}

/// Wait for the deployment to settle, then require a matching container.
///
/// # Errors
///
/// Returns [`DeployError::NotRunning`] carrying the recent container logs.
pub async fn confirm_running(
    executor: &impl RemoteExecutor,
    layout: &RemoteLayout,
    mode: DeploymentMode,
    config: &DeployConfig,
) -> Result<()> {
    tokio::time::sleep(config.deploy.settle()).await;
    let ps = executor.exec(PS_NAMES, config.timeouts.command()).await?;
    if ps.success() && container_running(&ps.stdout, layout.name()) {
        return Ok(());
    }
    let logs = executor
        .exec(
            &logs_command(layout, mode, config.deploy.log_tail_lines),
            config.timeouts.command(),
        )
        .await?;
    let mut text = logs.stdout.trim().to_string();
    if text.is_empty() {
        text = logs.diagnostic();
    }
    if text.is_empty() {
        text = "(no logs available)".to_string();
    }
    Err(DeployError::NotRunning {
        name: layout.name().to_string(),
        logs: text,
    }
    .into())
}

/// Full controller run: read marker, stop, launch, confirm.
///
/// # Errors
///
/// Returns the first failing step's error.
pub async fn deploy_application(
    executor: &impl RemoteExecutor,
    reporter: &impl ProgressReporter,
    layout: &RemoteLayout,
    strategy: &BuildStrategy,
    port: u16,
    config: &DeployConfig,
) -> Result<LaunchOutcome> {
    let prior = read_prior_mode(executor, layout, config).await?;
    reporter.step(&format!("previous deployment mode: {}", prior.label()));
    stop_previous(executor, reporter, layout, prior, config).await?;
    launch(executor, reporter, layout, strategy, port, config).await?;
    reporter.step("waiting for the container to settle");
    confirm_running(executor, layout, strategy.mode(), config).await?;
    Ok(LaunchOutcome {
        prior,
        mode: strategy.mode(),
    })
}
