//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly. Every event is also written to the run log.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY, `step()` drives a spinner that `success()` finishes. Otherwise:
/// - `step()` prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
///
/// All terminal output is suppressed when `ctx.quiet`; the log is not.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
        }
    }

    /// Stop any running spinner with a failure mark. Called before the error
    /// itself is printed.
    pub fn fail(&self, message: &str) {
        tracing::error!("{message}");
        if let Some(pb) = self.spinner.borrow_mut().take() {
            progress::finish_error(&pb, message);
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        tracing::info!("{message}");
        if self.ctx.quiet {
            return;
        }
        if self.ctx.show_progress() {
            let mut slot = self.spinner.borrow_mut();
            match slot.as_ref() {
                Some(pb) => pb.set_message(message.to_string()),
                None => *slot = Some(progress::spinner(message)),
            }
        } else {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        tracing::info!("{message}");
        if self.ctx.quiet {
            return;
        }
        match self.spinner.borrow_mut().take() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => println!("  {} {message}", "✓".style(self.ctx.styles.success)),
        }
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
        if self.ctx.quiet {
            return;
        }
        let line = format!("  {} {message}", "!".style(self.ctx.styles.warning));
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.get_mut().take() {
            pb.finish_and_clear();
        }
    }
}
