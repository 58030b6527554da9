//! Configuration for the gh-stale issue bot
//!
//! This crate provides:
//! - Stale options (StaleOptions) loaded from TOML
//! - Per-kind option resolution (ItemKind, KindSettings)
//! - Config file discovery and state file paths

pub mod config_file;
pub mod kind;
pub mod options;
pub mod paths;

pub use config_file::{find_config_file, load_config_file, CONFIG_FILE};
pub use kind::{ItemKind, KindSettings};
pub use options::{parse_list, StaleOptions};
pub use paths::state_file_path;
