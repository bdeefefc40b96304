//! Application service: fetch the application source and inspect the bundle.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::{FetchOutcome, LocalFs, ProgressReporter, SourceFetcher};
use crate::domain::{AppName, BuildStrategy, RepoError, RepositorySource};

/// A local bundle ready to ship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSource {
    pub name: AppName,
    pub bundle: PathBuf,
    pub strategy: BuildStrategy,
    pub fetched: FetchOutcome,
}

/// Clone or update the repository under `work_dir`, then pick a build
/// strategy from the bundle root.
///
/// # Errors
///
/// Returns [`RepoError`] for any fetch failure, an underivable name, or a
/// bundle without a compose file or Dockerfile.
pub async fn prepare_source(
    fetcher: &impl SourceFetcher,
    fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    source: &RepositorySource,
    work_dir: &Path,
) -> Result<PreparedSource> {
    let name = AppName::from_repo_url(&source.url)?;
    let bundle = work_dir.join(name.as_str());

    reporter.step(&format!("fetching {} ({})", source.url, source.branch));
    let fetched = fetcher.fetch(source, &bundle).await?;
    match fetched {
        FetchOutcome::Cloned => reporter.step(&format!("cloned into {}", bundle.display())),
        FetchOutcome::Updated => reporter.step(&format!("updated {}", bundle.display())),
    }

    let entries = fs.list_dir(&bundle)?;
    let strategy = BuildStrategy::select(&entries)
        .ok_or_else(|| RepoError::NoBuildDefinition(bundle.display().to_string()))?;
    reporter.step(&format!("build definition: {}", strategy.definition_file()));

    Ok(PreparedSource {
        name,
        bundle,
        strategy,
        fetched,
    })
}
