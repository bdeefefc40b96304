//! Application service: mirror the local bundle onto the host.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{ArtifactTransfer, ProgressReporter, RemoteExecutor};
use crate::domain::config::TimeoutsConfig;
use crate::domain::{ProvisionError, RemoteLayout};

/// Create the remote app directory and mirror `bundle` into it.
///
/// # Errors
///
/// Returns [`ProvisionError::RemoteDirectory`] or
/// [`ProvisionError::Transfer`]; transport failures surface as
/// [`crate::domain::RemoteError`].
pub async fn sync_artifacts(
    executor: &impl RemoteExecutor,
    transfer: &impl ArtifactTransfer,
    reporter: &impl ProgressReporter,
    layout: &RemoteLayout,
    bundle: &Path,
    timeouts: &TimeoutsConfig,
) -> Result<()> {
    let mkdir = executor
        .exec(&format!("mkdir -p {}", layout.app_dir()), timeouts.command())
        .await?;
    if !mkdir.success() {
        return Err(ProvisionError::RemoteDirectory {
            path: format!("~/{}", layout.name()),
            detail: mkdir.diagnostic(),
        }
        .into());
    }

    reporter.step(&format!("mirroring {} to ~/{}", bundle.display(), layout.name()));
    let out = transfer
        .mirror(bundle, &layout.rsync_dir(), timeouts.transfer())
        .await?;
    if !out.success() {
        return Err(ProvisionError::Transfer {
            target: format!("~/{}", layout.name()),
            detail: out.diagnostic(),
        }
        .into());
    }
    Ok(())
}
