//! # Run Configuration
//!
//! Immutable configuration for a backup or restore run: scan roots, depth
//! budget, store mode, the ordered taxonomy alias table, the restore
//! category allow-list, and the machine identifier.
//!
//! Configuration is loaded from a `repo-fleet.toml` file when one exists
//! (explicit `--config` path, then the current directory, then
//! `~/.repo-fleet/`), falling back to compiled-in defaults so the tool runs
//! with zero setup. The parsed value is handed to the classifier and the
//! restore engine at construction time; nothing here is ambient mutable
//! state.
//!
//! ## File format
//!
//! ```toml
//! roots = ["/home/u/code", "/mnt/g/code"]
//! max_depth = 5
//! store_mode = "single"
//! restore_categories = ["comm"]
//!
//! [[alias]]
//! category = "frontend"
//! keys = ["frontend", "vue"]
//!
//! [[alias]]
//! category = "learn"
//! keys = ["learn"]
//! pattern = "study|course"
//! ```
//!
//! `[[alias]]` entries keep their file order; the classifier's first-match
//! rule depends on it.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::classify::Alias;
use crate::error::{Error, Result};

/// Default recursion depth budget for the walker.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// The configuration file name searched for in the current directory and
/// under `~/.repo-fleet/`.
pub const CONFIG_FILE_NAME: &str = "repo-fleet.toml";

/// Whether one store file covers all roots or each root gets its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Single,
    Multi,
}

#[derive(Debug, Deserialize)]
struct RawAlias {
    category: String,
    #[serde(default)]
    keys: Vec<String>,
    pattern: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    roots: Vec<PathBuf>,
    max_depth: Option<usize>,
    store_mode: Option<StoreMode>,
    #[serde(default)]
    alias: Vec<RawAlias>,
    restore_categories: Option<Vec<String>>,
    machine: Option<String>,
}

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directories to scan when the CLI names none.
    pub roots: Vec<PathBuf>,
    pub max_depth: usize,
    pub store_mode: StoreMode,
    /// Ordered alias table; order decides classification ties.
    pub aliases: Vec<Alias>,
    /// Categories the restore engine is allowed to materialize.
    pub restore_categories: Vec<String>,
    /// Stable identifier for the host running this process.
    pub machine: String,
}

impl Config {
    /// Load configuration, searching the usual locations.
    ///
    /// An explicit path must exist; the fallback locations are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config {
                    message: format!("configuration file not found: {}", path.display()),
                    hint: None,
                });
            }
            return Self::from_file(path);
        }

        let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
        if cwd_config.exists() {
            return Self::from_file(&cwd_config);
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".repo-fleet").join(CONFIG_FILE_NAME);
            if home_config.exists() {
                return Self::from_file(&home_config);
            }
        }

        debug!("no {} found, using built-in defaults", CONFIG_FILE_NAME);
        Ok(Self::default())
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let raw: RawConfig = toml::from_str(&text)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let aliases = if raw.alias.is_empty() {
            default_aliases()
        } else {
            raw.alias
                .into_iter()
                .map(|entry| {
                    let pattern = entry
                        .pattern
                        .as_deref()
                        .map(Regex::new)
                        .transpose()
                        .map_err(|err| Error::Config {
                            message: format!(
                                "invalid pattern for alias '{}': {}",
                                entry.category, err
                            ),
                            hint: Some("patterns use Rust regex syntax".to_string()),
                        })?;
                    Ok(Alias {
                        category: entry.category,
                        keys: entry.keys,
                        pattern,
                    })
                })
                .collect::<Result<Vec<_>>>()?
        };

        // Default allow-list: every configured category is restorable
        let restore_categories = raw.restore_categories.unwrap_or_else(|| {
            aliases.iter().map(|a| a.category.clone()).collect()
        });

        Ok(Self {
            roots: raw.roots,
            max_depth: raw.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            store_mode: raw.store_mode.unwrap_or(StoreMode::Single),
            aliases,
            restore_categories,
            machine: raw.machine.unwrap_or_else(machine_key),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        let aliases = default_aliases();
        let restore_categories = aliases.iter().map(|a| a.category.clone()).collect();
        Self {
            roots: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            store_mode: StoreMode::Single,
            aliases,
            restore_categories,
            machine: machine_key(),
        }
    }
}

/// The compiled-in taxonomy, used when no config file supplies one.
pub fn default_aliases() -> Vec<Alias> {
    vec![
        Alias::new("ai", &["ai"]),
        Alias::new("vpress", &["vpress"]),
        Alias::new("frontend", &["frontend", "vue"]),
        Alias::new("learn", &["learn"])
            .with_pattern(Regex::new("study|course").expect("hard-coded regex")),
        Alias::new("vsextension", &["vsextension"]),
        Alias::new("comm", &["comm"]),
        Alias::new("net", &["net"]),
        Alias::new("wechat", &["wechat", "wx"]),
    ]
}

/// A stable identifier for the host running a scan.
///
/// Resolution order: `REPO_FLEET_MACHINE`, the usual hostname environment
/// variables, `/etc/hostname`, then a literal fallback. Used to namespace
/// `fromPaths` entries and synthesized remote keys.
pub fn machine_key() -> String {
    for var in ["REPO_FLEET_MACHINE", "HOSTNAME", "COMPUTERNAME"] {
        if let Ok(value) = env::var(var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    if let Ok(contents) = fs::read_to_string("/etc/hostname") {
        let trimmed = contents.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    "machine".to_string()
}
