//! # Persistent Store
//!
//! A versioned, path-keyed map of repository records, loaded and saved as a
//! whole JSON document. The map key is the classified relative path, which
//! is the join key for reconciliation across machines with different root
//! directories.
//!
//! ## Versioning
//!
//! Two states exist: unversioned (pre-release files) and v1. A load of an
//! unversioned file stamps the baseline version and drops the legacy
//! top-level `remotes` and `__version` fields from the old layout. Within
//! v1, every load additionally runs an idempotent key-normalization pass:
//! repo keys carrying a leading path separator (an artifact of an earlier
//! root-path convention that stripped the root by string replacement) are
//! relocated to their clean form, merging onto any pre-existing clean entry
//! with the reconciliation policy.
//!
//! The whole store is read into memory at the start of a run and written
//! whole at the end. There is no partial write and no locking; concurrent
//! runs against the same file are unsupported.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::StoreMode;
use crate::error::{Error, Result};
use crate::merge;
use crate::record::RepoRecord;

/// Baseline store schema version.
pub const STORE_VERSION: &str = "1.0.0";

/// Store files follow `repo.db.<qualifier>.json`.
pub const STORE_FILE_PREFIX: &str = "repo.db.";
const STORE_FILE_SUFFIX: &str = ".json";
const SINGLE_QUALIFIER: &str = "all";

/// The persistent store: a version stamp plus records keyed by classified
/// relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub version: String,
    #[serde(default)]
    pub repos: BTreeMap<String, RepoRecord>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: STORE_VERSION.to_string(),
            repos: BTreeMap::new(),
        }
    }
}

impl Store {
    /// Load a store file, creating a default empty versioned store when the
    /// file is absent. Runs the upgrade and key-normalization passes.
    ///
    /// Unlike a repository config, a store that exists but cannot be read
    /// or parsed is fatal for the run.
    pub fn load(path: &Path, machine_id: &str) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|err| Error::Store {
            message: format!("cannot read store {}: {}", path.display(), err),
        })?;
        let mut value: Value = serde_json::from_str(&text).map_err(|err| Error::Store {
            message: format!("store {} is not valid JSON: {}", path.display(), err),
        })?;

        upgrade(&mut value)?;

        let mut store: Self = serde_json::from_value(value).map_err(|err| Error::Store {
            message: format!("store {} has an unexpected shape: {}", path.display(), err),
        })?;
        normalize_keys(&mut store, machine_id)?;
        Ok(store)
    }

    /// Write the whole store as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// One-time unversioned -> v1 upgrade, plus a version-compatibility check.
fn upgrade(value: &mut Value) -> Result<()> {
    let Some(root) = value.as_object_mut() else {
        return Err(Error::Store {
            message: "store root is not a JSON object".to_string(),
        });
    };

    let versioned = root.get("version").is_some_and(Value::is_string);
    if !versioned {
        // Pre-versioned layout: drop fields the v1 schema restructured
        root.remove("remotes");
        root.remove("__version");
        root.insert(
            "version".to_string(),
            Value::String(STORE_VERSION.to_string()),
        );
        return Ok(());
    }

    let raw = root["version"].as_str().unwrap_or_default();
    let found = Version::parse(raw)?;
    let supported = Version::parse(STORE_VERSION)?;
    if found > supported {
        return Err(Error::StoreVersion {
            found: found.to_string(),
            supported: supported.to_string(),
        });
    }
    Ok(())
}

/// Relocate repo keys carrying a leading path-separator artifact to their
/// clean form. Safe to run on every load: once no stale key remains this is
/// a no-op.
fn normalize_keys(store: &mut Store, machine_id: &str) -> Result<()> {
    let stale: Vec<String> = store
        .repos
        .keys()
        .filter(|key| key.starts_with('/') || key.starts_with('\\'))
        .cloned()
        .collect();

    for key in stale {
        let Some(record) = store.repos.remove(&key) else {
            continue;
        };
        let clean = key.trim_start_matches(['/', '\\']).to_string();
        if clean.is_empty() {
            warn!("store key '{}' is all separators, leaving it in place", key);
            store.repos.insert(key, record);
            continue;
        }
        let merged = match store.repos.get(&clean) {
            Some(existing) => merge::reconcile(Some(existing), &record, machine_id)?,
            None => record,
        };
        store.repos.insert(clean, merged);
    }
    Ok(())
}

/// The store file name for a run mode and root.
pub fn store_file_name(mode: StoreMode, root: &Path) -> String {
    let qualifier = match mode {
        StoreMode::Single => SINGLE_QUALIFIER.to_string(),
        StoreMode::Multi => path_qualifier(root),
    };
    format!("{}{}{}", STORE_FILE_PREFIX, qualifier, STORE_FILE_SUFFIX)
}

/// Encode a root path into a filesystem-safe store-file qualifier.
pub fn path_qualifier(root: &Path) -> String {
    let text = root.to_string_lossy();
    let encoded: String = text
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            ':' => '_',
            c if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect();
    encoded.trim_matches('-').to_string()
}

/// All store files under `dir`, matched by the fixed naming convention,
/// sorted for deterministic processing order.
pub fn find_store_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir
        .join(format!("{}*{}", STORE_FILE_PREFIX, STORE_FILE_SUFFIX))
        .to_string_lossy()
        .into_owned();
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("skipping unreadable store candidate: {}", err);
                None
            }
        })
        .collect();
    files.sort();
    Ok(files)
}
