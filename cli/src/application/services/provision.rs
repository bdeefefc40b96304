//! Application service: connectivity check and environment provisioning.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteExecutor};
use crate::application::services::{NOTE_FN, relay_notes};
use crate::domain::config::TimeoutsConfig;
use crate::domain::{DeploymentIdentity, ProvisionError, ProvisionStage, RemoteError, ScriptBlock};

/// Confirm the host accepts a non-interactive SSH session.
///
/// # Errors
///
/// Returns [`RemoteError`] when the host cannot be reached or authentication
/// fails.
pub async fn check_connectivity(
    executor: &impl RemoteExecutor,
    identity: &DeploymentIdentity,
    timeouts: &TimeoutsConfig,
) -> Result<()> {
    let out = executor.exec("true", timeouts.command()).await?;
    if !out.success() {
        return Err(RemoteError::Connection {
            host: identity.host.to_string(),
            detail: out.diagnostic(),
        }
        .into());
    }
    Ok(())
}

/// The provisioning block. Each stage exits with its own status.
#[must_use]
pub fn provision_script() -> ScriptBlock {
    let mut body = String::from("export DEBIAN_FRONTEND=noninteractive\n");
    body.push_str(NOTE_FN);
    body.push_str(&format!(
        r#"note "refreshing package index"
sudo -E apt-get update -qq >/dev/null || exit {index}
sudo -E apt-get install -y -qq ca-certificates curl gnupg lsb-release >/dev/null || exit {prereq}

if command -v docker >/dev/null 2>&1; then
  note "docker already installed"
else
  note "installing docker"
  curl -fsSL https://get.docker.com | sudo sh >/dev/null || exit {docker}
fi

if sudo docker compose version >/dev/null 2>&1 || command -v docker-compose >/dev/null 2>&1; then
  note "docker compose already installed"
else
  note "installing docker compose plugin"
  sudo -E apt-get install -y -qq docker-compose-plugin >/dev/null || exit {compose}
fi

if command -v nginx >/dev/null 2>&1 || [ -x /usr/sbin/nginx ]; then
  note "nginx already installed"
else
  note "installing nginx"
  sudo -E apt-get install -y -qq nginx >/dev/null || exit {nginx}
fi

if id -nG "$(id -un)" | tr ' ' '\n' | grep -x docker >/dev/null; then
  note "$(id -un) already in docker group"
else
  note "adding $(id -un) to docker group"
  sudo usermod -aG docker "$(id -un)" || exit {group}
fi

sudo systemctl enable --now docker >/dev/null 2>&1 || exit {docker_svc}
sudo systemctl enable --now nginx >/dev/null 2>&1 || exit {nginx_svc}

sudo docker --version || exit {docker_ok}
sudo docker compose version || docker-compose --version || exit {compose_ok}
sudo nginx -v 2>&1 || exit {nginx_ok}
note "environment ready"
"#,
        index = ProvisionStage::PackageIndex.code(),
        prereq = ProvisionStage::Prerequisites.code(),
        docker = ProvisionStage::DockerInstall.code(),
        compose = ProvisionStage::ComposeInstall.code(),
        nginx = ProvisionStage::NginxInstall.code(),
        group = ProvisionStage::DockerGroup.code(),
        docker_svc = ProvisionStage::DockerService.code(),
        nginx_svc = ProvisionStage::NginxService.code(),
        docker_ok = ProvisionStage::DockerVerify.code(),
        compose_ok = ProvisionStage::ComposeVerify.code(),
        nginx_ok = ProvisionStage::NginxVerify.code(),
    ));
    ScriptBlock::new("provision", body)
}

/// Install and start docker, compose and nginx where missing.
///
/// # Errors
///
/// Returns [`ProvisionError::Stage`] naming the failed stage, or a
/// [`RemoteError`] on transport failure.
pub async fn ensure_environment(
    executor: &impl RemoteExecutor,
    reporter: &impl ProgressReporter,
    timeouts: &TimeoutsConfig,
) -> Result<()> {
    let out = executor
        .run_script(&provision_script(), timeouts.provision())
        .await?;
    relay_notes(reporter, &out.stdout);
    if out.success() {
        return Ok(());
    }
    let detail = out.diagnostic();
    let err = match ProvisionStage::from_exit_code(out.exit_code) {
        Some(stage) => ProvisionError::Stage { stage, detail },
        None => ProvisionError::Script {
            code: out.exit_code,
            detail,
        },
    };
    Err(err.into())
}
