//! Dockhand CLI - deploy a containerized app to a remote host behind nginx

use clap::Parser;
use owo_colors::{OwoColorize as _, Stream};

use dockhand_cli::cli::Cli;
use dockhand_cli::domain::exit_code_for;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("  {} {e:#}", "✗".if_supports_color(Stream::Stderr, |t| t.red()));
        std::process::exit(exit_code_for(&e));
    }
}
