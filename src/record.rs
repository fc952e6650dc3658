//! # Repository Records
//!
//! The data model persisted in a store file: one `RepoRecord` per tracked
//! repository, keyed by its classified relative path.
//!
//! All maps are `BTreeMap` and observation paths are `BTreeSet`, so every
//! iteration order is deterministic and a saved store is byte-stable across
//! runs. Optional fields skip serialization when absent, which matters for
//! the merge policy: a field a later scan did not produce must not clobber
//! the value an earlier scan recorded.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A single remote of a repository.
///
/// The canonical record only needs `url` to recreate a working remote.
/// `pushurl` is accepted from historical store files and survives a
/// round-trip, but the extractor never emits it; the `migrate` command
/// strips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInfo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushurl: Option<String>,
}

impl RemoteInfo {
    /// A remote carrying only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pushurl: None,
        }
    }
}

/// A submodule declared in `.git/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoduleInfo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// One tracked repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepoRecord {
    /// Derived from the containing folder name, never from remote URLs.
    pub name: String,

    /// Which processor kind produced this record; selects the processor on
    /// restore. Absent in some pre-versioned store files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_kind: Option<String>,

    /// Diagnostic text, populated only when extraction failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Remotes keyed by remote name, or by a synthesized `{machine}{n}` key
    /// for URLs recovered during reconciliation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remotes: BTreeMap<String, RemoteInfo>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub submodules: BTreeMap<String, SubmoduleInfo>,

    /// Every machine and location where this repository has been observed.
    /// Append-only outside of explicit migration.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub from_paths: BTreeMap<String, BTreeSet<String>>,
}

impl RepoRecord {
    /// An empty record for a repository named after its folder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A record standing in for a repository whose config could not be read
    /// or parsed. Carries the diagnostic so discovery can proceed.
    pub fn placeholder(name: impl Into<String>, description: String) -> Self {
        Self {
            name: name.into(),
            description: Some(description),
            ..Self::default()
        }
    }

    /// Every remote URL this record knows about, `pushurl` fallbacks
    /// included, deduplicated in first-seen order.
    pub fn remote_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        for remote in self.remotes.values() {
            if !urls.contains(&remote.url.as_str()) {
                urls.push(&remote.url);
            }
            if let Some(pushurl) = remote.pushurl.as_deref() {
                if !urls.contains(&pushurl) {
                    urls.push(pushurl);
                }
            }
        }
        urls
    }

    /// True if any remote (or pushurl fallback) carries this exact URL.
    pub fn has_remote_url(&self, url: &str) -> bool {
        self.remotes
            .values()
            .any(|r| r.url == url || r.pushurl.as_deref() == Some(url))
    }
}
