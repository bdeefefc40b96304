//! Application service: nginx site installation.
//!
//! Install, syntax-check and reload are separate remote calls so a rejected
//! configuration is rolled back before anything reloads.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteExecutor};
use crate::domain::config::TimeoutsConfig;
use crate::domain::{ProxyError, ProxySiteRecord, RemoteLayout, ScriptBlock};

/// Heredoc delimiter for the rendered site.
const SITE_EOF: &str = "DOCKHAND_SITE";

/// Block that backs up, writes and enables the site.
#[must_use]
pub fn install_script(layout: &RemoteLayout, record: &ProxySiteRecord) -> ScriptBlock {
    let available = layout.site_available();
    let enabled = layout.site_enabled();
    let backup = layout.site_backup();
    let body = format!(
        r#"sudo mkdir -p "$(dirname {available})" "$(dirname {enabled})" || exit 70
if sudo test -f {available}; then
  sudo cp -p {available} {backup} || exit 70
else
  sudo rm -f {backup}
fi
tmp="$(mktemp)" || exit 70
cat > "$tmp" <<'{SITE_EOF}' || exit 70
{site}{SITE_EOF}
sudo install -m 644 "$tmp" {available} || {{ rm -f "$tmp"; exit 70; }}
rm -f "$tmp"
sudo ln -sfn {available} {enabled} || exit 70
"#,
        site = record.render(),
    );
    ScriptBlock::new("proxy-install", body)
}

/// Block that puts back the previous definition, or removes ours when there
/// was none.
#[must_use]
pub fn rollback_script(layout: &RemoteLayout) -> ScriptBlock {
    let available = layout.site_available();
    let backup = layout.site_backup();
    let body = format!(
        "if sudo test -f {backup}; then\n  sudo mv -f {backup} {available}\nelse\n  sudo rm -f {enabled} {available}\nfi\n",
        enabled = layout.site_enabled(),
    );
    ScriptBlock::new("proxy-rollback", body)
}

/// Install the site, validate it with `nginx -t`, then reload nginx.
///
/// # Errors
///
/// Returns [`ProxyError::Install`], [`ProxyError::Syntax`] (after rolling
/// back) or [`ProxyError::Reload`].
pub async fn configure_proxy(
    executor: &impl RemoteExecutor,
    reporter: &impl ProgressReporter,
    layout: &RemoteLayout,
    record: &ProxySiteRecord,
    timeouts: &TimeoutsConfig,
) -> Result<()> {
    let install = executor
        .run_script(&install_script(layout, record), timeouts.command())
        .await?;
    if !install.success() {
        return Err(ProxyError::Install {
            site: record.name.clone(),
            detail: install.diagnostic(),
        }
        .into());
    }

    let check = executor.exec("sudo nginx -t", timeouts.command()).await?;
    if !check.success() {
        reporter.warn("nginx rejected the new site, restoring the previous definition");
        let rollback = executor
            .run_script(&rollback_script(layout), timeouts.command())
            .await?;
        if !rollback.success() {
            reporter.warn(&format!("rollback incomplete: {}", rollback.diagnostic()));
        }
        return Err(ProxyError::Syntax(check.diagnostic()).into());
    }
    // Validated: drop the backup, and the distro default site now that ours
    // is known to load.
    let finalize = executor
        .exec(
            &format!("sudo rm -f {} {}", layout.site_backup(), layout.default_site()),
            timeouts.command(),
        )
        .await?;
    if !finalize.success() {
        return Err(ProxyError::Install {
            site: record.name.clone(),
            detail: finalize.diagnostic(),
        }
        .into());
    }

    let reload = executor
        .exec("sudo systemctl reload nginx", timeouts.command())
        .await?;
    if !reload.success() {
        return Err(ProxyError::Reload(reload.diagnostic()).into());
    }
    reporter.step(&format!(
        "site {} forwards port {} to {}",
        record.name,
        record.listen_port,
        record.upstream()
    ));
    Ok(())
}
