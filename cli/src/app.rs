//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the top-level flags and the loaded
//! configuration, then passed as `&AppContext` to the deploy and teardown
//! handlers.

use std::io::IsTerminal as _;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::DeployConfig;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::expand_home;
use crate::output::{OutputContext, TerminalReporter};

/// Environment variable that skips prompts like `--yes`.
pub const YES_ENV: &str = "DOCKHAND_YES";

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `DOCKHAND_YES` env vars).
    pub yes: bool,
    /// Explicit config file, overriding `DOCKHAND_CONFIG` and the default path.
    pub config: Option<PathBuf>,
    /// Explicit run log directory, overriding `paths.log_dir`.
    pub log_dir: Option<PathBuf>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Operator configuration, defaults filled in.
    pub config: DeployConfig,
    /// Parent directory of local clones.
    pub work_dir: PathBuf,
    /// Directory receiving the run log.
    pub log_dir: PathBuf,
    /// When `true`, missing parameters are errors instead of prompts.
    ///
    /// Set when `--yes` / `-y` is passed, when the `CI` or `DOCKHAND_YES`
    /// environment variables are present, or when stdin is not a terminal.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or a
    /// configured path needs a home directory that cannot be found.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let store = match &flags.behaviour.config {
            Some(path) => YamlConfigStore::with_path(path.clone()),
            None => YamlConfigStore::default(),
        };
        let config = store.load().context("loading configuration")?;
        Self::with_config(flags, config)
    }

    /// Construct an `AppContext` around an already loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured path starts with `~` and the home
    /// directory cannot be determined.
    pub fn with_config(flags: &AppFlags, config: DeployConfig) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var(YES_ENV).is_ok();
        let non_interactive =
            flags.behaviour.yes || ci_env || !std::io::stdin().is_terminal();

        let work_dir = expand_home(&config.paths.work_dir)?;
        let log_dir = match &flags.behaviour.log_dir {
            Some(dir) => dir.clone(),
            None => expand_home(&config.paths.log_dir)?,
        };

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config,
            work_dir,
            log_dir,
            non_interactive,
        })
    }

    /// Process runner handed to each infrastructure adapter.
    #[must_use]
    pub fn runner(&self) -> TokioCommandRunner {
        TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT)
    }

    /// Progress reporter bound to this context's terminal.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
