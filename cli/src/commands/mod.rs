//! Command implementations

pub mod deploy;
pub mod params;
pub mod teardown;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::{KeyStatus, SshKeyProvider};
use crate::infra::keys::SshKeygen;
use crate::infra::logging::RunKind;
use params::{DialoguerPrompter, ParamArgs, RunParams};

/// Collect parameters for `kind`, prompting unless the run is
/// non-interactive.
///
/// # Errors
///
/// Returns [`crate::domain::InputError`] for missing or invalid values.
pub fn collect_params(app: &AppContext, args: &ParamArgs, kind: RunKind) -> Result<RunParams> {
    let prompter = (!app.non_interactive).then_some(&DialoguerPrompter);
    params::collect(args, kind, &app.config.defaults, prompter)
}

/// Make sure the private key exists, generating one when it does not.
///
/// # Errors
///
/// Returns [`crate::domain::InputError::SshKeyUnavailable`] when no key can be
/// produced.
pub async fn ensure_ssh_key(app: &AppContext, params: &RunParams) -> Result<()> {
    let keygen = SshKeygen::new(app.runner());
    if keygen.ensure_key(&params.ssh_key).await? == KeyStatus::Generated {
        app.output.warn(&format!(
            "Generated a new key at {}. Add {}.pub to ~/.ssh/authorized_keys for {} on {}.",
            params.ssh_key.display(),
            params.ssh_key.display(),
            params.ssh_user,
            params.host,
        ));
    }
    Ok(())
}
