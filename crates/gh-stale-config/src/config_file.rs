//! Options file discovery

use std::path::PathBuf;

/// Options file name looked up in the CWD and the home directory
pub const CONFIG_FILE: &str = ".gh-stale.toml";

/// First existing options file: the CWD wins over the home directory
pub fn find_config_file() -> Option<PathBuf> {
    let home = dirs::home_dir();
    let candidates = std::env::current_dir()
        .ok()
        .into_iter()
        .chain(home)
        .map(|dir| dir.join(CONFIG_FILE));
    first_existing(candidates)
}

fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| path.is_file())
}

/// Read a discovered options file, `None` when absent or unreadable
pub fn load_config_file() -> Option<(PathBuf, String)> {
    let path = find_config_file()?;
    match std::fs::read_to_string(&path) {
        Ok(content) => Some((path, content)),
        Err(e) => {
            log::warn!("Could not read {:?}: {}", path, e);
            None
        }
    }
}
