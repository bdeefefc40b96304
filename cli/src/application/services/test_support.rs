//! Shared test doubles for service tests.
//!
//! `ScriptedExecutor` answers remote calls from a list of needle rules and
//! records every command it saw, so tests can assert on both the outcome and
//! the exact remote traffic.

use std::cell::RefCell;
use std::time::Duration;

use crate::application::ports::{ProgressReporter, RemoteExecutor, RemoteOutput};
use crate::domain::{RemoteError, ScriptBlock};

/// One remote call as the executor saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exec(String),
    Script { name: &'static str, body: String },
}

impl Call {
    pub fn text(&self) -> &str {
        match self {
            Self::Exec(cmd) => cmd,
            Self::Script { body, .. } => body,
        }
    }
}

enum Reply {
    Output(RemoteOutput),
    Unreachable,
}

struct Rule {
    needle: String,
    reply: Reply,
}

/// Remote executor driven by "first rule whose needle appears in the command".
/// Unmatched calls succeed with empty output.
#[derive(Default)]
pub struct ScriptedExecutor {
    rules: Vec<Rule>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `exit_code` and `stdout` when `needle` matches.
    pub fn on(mut self, needle: &str, exit_code: i32, stdout: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            reply: Reply::Output(RemoteOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        });
        self
    }

    /// Fail with a stderr diagnostic when `needle` matches.
    pub fn fail(mut self, needle: &str, exit_code: i32, stderr: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            reply: Reply::Output(RemoteOutput {
                exit_code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        });
        self
    }

    /// Report a transport failure when `needle` matches.
    pub fn unreachable(mut self, needle: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            reply: Reply::Unreachable,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Whether any recorded call contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.text().contains(needle))
    }

    fn answer(&self, text: &str) -> Result<RemoteOutput, RemoteError> {
        match self.rules.iter().find(|r| text.contains(&r.needle)) {
            Some(Rule {
                reply: Reply::Output(out),
                ..
            }) => Ok(out.clone()),
            Some(Rule {
                reply: Reply::Unreachable,
                ..
            }) => Err(RemoteError::Connection {
                host: "198.51.100.4".to_string(),
                detail: "Connection refused".to_string(),
            }),
            None => Ok(RemoteOutput::default()),
        }
    }
}

impl RemoteExecutor for ScriptedExecutor {
    async fn exec(&self, command: &str, _: Duration) -> Result<RemoteOutput, RemoteError> {
        self.calls.borrow_mut().push(Call::Exec(command.to_string()));
        self.answer(command)
    }

    async fn run_script(
        &self,
        script: &ScriptBlock,
        _: Duration,
    ) -> Result<RemoteOutput, RemoteError> {
        self.calls.borrow_mut().push(Call::Script {
            name: script.name(),
            body: script.body().to_string(),
        });
        self.answer(script.body())
    }
}

/// Reporter that keeps every line for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub lines: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn warnings(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|l| l.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.lines.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.lines.borrow_mut().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.lines.borrow_mut().push(format!("warn: {message}"));
    }
}
