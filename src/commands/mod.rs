//! Command implementations for the repo-fleet CLI

pub mod backup;
pub mod completions;
pub mod ls;
pub mod migrate;
pub mod restore;

use std::path::PathBuf;

/// The store directory used when neither flag nor environment names one:
/// `~/.repo-fleet`, falling back to the current directory.
pub fn default_store_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".repo-fleet"))
        .unwrap_or_else(|| PathBuf::from("."))
}
