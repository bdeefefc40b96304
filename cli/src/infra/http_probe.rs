//! Infrastructure implementation of the `HttpProbe` port over `ureq`.

use std::time::Duration;

use crate::application::ports::HttpProbe;
use crate::domain::ProbeOutcome;

/// Blocking `ureq` GET moved onto the blocking pool.
pub struct UreqProbe;

impl HttpProbe for UreqProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let url = url.to_string();
        match tokio::task::spawn_blocking(move || probe_blocking(&url, timeout)).await {
            Ok(outcome) => outcome,
            Err(e) => ProbeOutcome::Unreachable(format!("probe task failed: {e}")),
        }
    }
}

fn probe_blocking(url: &str, timeout: Duration) -> ProbeOutcome {
    // Redirects are not followed: a 3xx already proves nginx is answering.
    let agent = ureq::AgentBuilder::new()
        .timeout(timeout)
        .redirects(0)
        .user_agent(concat!("dockhand/", env!("CARGO_PKG_VERSION")))
        .build();
    match agent.get(url).call() {
        Ok(resp) => ProbeOutcome::from_status(resp.status()),
        Err(ureq::Error::Status(code, _)) => ProbeOutcome::from_status(code),
        Err(ureq::Error::Transport(t)) => ProbeOutcome::Unreachable(t.to_string()),
    }
}
