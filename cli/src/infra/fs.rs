//! Filesystem infrastructure: implements `LocalFs` and local path helpers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Production `LocalFs` over `std::fs`.
pub struct LocalFs;

impl crate::application::ports::LocalFs for LocalFs {
    fn list_dir(&self, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in
            std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?
        {
            let entry = entry.with_context(|| format!("reading directory {}", dir.display()))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

/// Expand a leading `~` to the home directory.
///
/// # Errors
///
/// Returns an error if the path starts with `~` and the home directory cannot
/// be determined.
pub fn expand_home(raw: &str) -> Result<PathBuf> {
    let rest = match raw.strip_prefix('~') {
        None => return Ok(PathBuf::from(raw)),
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        // `~user/...` is left to the shell.
        Some(_) => return Ok(PathBuf::from(raw)),
    };
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}
