//! Data directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.cache/gh-stale/`
//! - macOS: `~/Library/Caches/gh-stale/`
//! - Windows: `%LOCALAPPDATA%\gh-stale\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "gh-stale";

/// Get the application cache directory
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    Ok(base.join(APP_NAME))
}

/// Default location of the processed-items state for a repository
pub fn state_file_path(owner: &str, repo: &str) -> Result<PathBuf> {
    Ok(cache_dir()?.join(state_file_name(owner, repo)))
}

fn state_file_name(owner: &str, repo: &str) -> String {
    format!("{}__{}.state", owner, repo)
}
