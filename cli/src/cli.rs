//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;
use crate::commands::params::ParamArgs;
use crate::domain::exit_code_for;
use crate::infra::logging::{RunKind, init_run_log};

/// Provision a Linux host and deploy a containerized app behind nginx
#[derive(Parser)]
#[command(name = "dockhand", version)]
pub struct Cli {
    /// Remove the deployment instead of creating it
    #[arg(long)]
    pub cleanup: bool,

    #[command(flatten)]
    pub params: ParamArgs,

    /// Never prompt; missing values are errors (also CI / DOCKHAND_YES)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Config file [default: ~/.dockhand/config.yaml]
    #[arg(long, value_name = "PATH", env = "DOCKHAND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the run log [default: paths.log_dir]
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Which entry path this invocation takes.
    #[must_use]
    pub fn kind(&self) -> RunKind {
        if self.cleanup {
            RunKind::Cleanup
        } else {
            RunKind::Deploy
        }
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// Returns the failure that ended the run; `domain::exit_code_for` maps it
    /// to the process exit code.
    pub async fn run(self) -> Result<()> {
        let kind = self.kind();
        let Cli {
            params,
            yes,
            quiet,
            no_color,
            config,
            log_dir,
            ..
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags {
                yes,
                config,
                log_dir,
            },
        })?;

        let log = init_run_log(&app.log_dir, kind)?;
        tracing::info!(
            kind = kind.as_str(),
            version = env!("CARGO_PKG_VERSION"),
            "dockhand started"
        );
        app.output.kv("Log", &log.path.display().to_string());

        let result = run_kind(&app, &params, kind).await;
        match &result {
            Ok(()) => tracing::info!("{} finished", kind.as_str()),
            Err(err) => tracing::error!(exit_code = exit_code_for(err), "{err:#}"),
        }
        // The log guard flushes on drop, after the outcome is recorded.
        drop(log);
        result
    }
}

async fn run_kind(app: &AppContext, args: &ParamArgs, kind: RunKind) -> Result<()> {
    let params = commands::collect_params(app, args, kind)?;
    commands::ensure_ssh_key(app, &params).await?;
    match kind {
        RunKind::Deploy => commands::deploy::run(app, &params).await,
        RunKind::Cleanup => commands::teardown::run(app, &params).await,
    }
}
