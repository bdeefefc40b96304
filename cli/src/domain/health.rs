//! Post-deploy check results and pure matching helpers.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use crate::domain::identity::AppName;

// ── Types ─────────────────────────────────────────────────────────────────────

/// Whether a failed check aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSeverity {
    /// Confirms this tool's own actions; failure is fatal.
    Fatal,
    /// Confirms external reachability; failure is reported only.
    Warning,
}

/// Outcome of one validator check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub severity: CheckSeverity,
    pub passed: bool,
    /// Extra context, e.g. the HTTP status or the transport error.
    pub detail: Option<String>,
}

impl CheckResult {
    #[must_use]
    pub fn pass(name: &'static str, severity: CheckSeverity) -> Self {
        Self {
            name,
            severity,
            passed: true,
            detail: None,
        }
    }

    #[must_use]
    pub fn fail(name: &'static str, severity: CheckSeverity, detail: impl Into<String>) -> Self {
        Self {
            name,
            severity,
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// All checks run by the validator, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn push(&mut self, result: CheckResult) {
        self.checks.push(result);
    }

    /// Failed warning-level checks.
    pub fn warnings(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.severity == CheckSeverity::Warning)
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

/// Result of an HTTP probe made from the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx or 3xx response.
    Reachable(u16),
    /// The server answered with 4xx or 5xx.
    HttpStatus(u16),
    /// No HTTP response at all.
    Unreachable(String),
}

impl ProbeOutcome {
    /// Classify an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            Self::Reachable(status)
        } else {
            Self::HttpStatus(status)
        }
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable(_))
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Reachable(code) => format!("HTTP {code}"),
            Self::HttpStatus(code) => format!("answered HTTP {code}"),
            Self::Unreachable(reason) => format!("unreachable: {reason}"),
        }
    }
}

// ── Container matching ────────────────────────────────────────────────────────

/// Whether `docker ps --format '{{.Names}}'` output contains the deployment.
///
/// Bare containers are named exactly `<name>`; compose names them
/// `<name>-<service>-<n>` (v2) or `<name>_<service>_<n>` (v1).
#[must_use]
pub fn container_running(ps_names: &str, name: &AppName) -> bool {
    let project = name.compose_project();
    let name = name.as_str();
    ps_names.lines().map(str::trim).any(|line| {
        line == name
            || [name, project.as_str()].into_iter().any(|prefix| {
                line.strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('-') || rest.starts_with('_'))
            })
    })
}
