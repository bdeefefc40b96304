//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`; never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod deploy;
pub mod pipeline;
pub mod provision;
pub mod proxy;
pub mod source;
pub mod sync;
pub mod teardown;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

use crate::application::ports::ProgressReporter;

/// Prefix of progress lines printed by remote script blocks.
pub const NOTE_PREFIX: &str = "[dockhand] ";

/// Shell function every block uses to emit progress lines.
pub(crate) const NOTE_FN: &str = "note() { echo \"[dockhand] $*\"; }\n";

/// Runs compose through the v2 plugin, falling back to the v1 binary.
pub(crate) const COMPOSE_FN: &str = "dc() {\n  if sudo docker compose version >/dev/null 2>&1; then sudo docker compose \"$@\"; else sudo docker-compose \"$@\"; fi\n}\n";

/// Running container names, one per line.
pub(crate) const PS_NAMES: &str = "sudo docker ps --format '{{.Names}}'";

/// Forward `[dockhand] ...` lines from a block's stdout to the reporter.
pub(crate) fn relay_notes(reporter: &impl ProgressReporter, stdout: &str) {
    for note in stdout.lines().filter_map(|l| l.strip_prefix(NOTE_PREFIX)) {
        reporter.step(note.trim());
    }
}
