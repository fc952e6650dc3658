//! # Repo Fleet Library
//!
//! This library provides the core functionality for inventorying
//! version-controlled source trees across machines and reconstructing them
//! elsewhere. It is designed to be used by the `repo-fleet` command-line
//! tool but can also be integrated into other applications that need to
//! track where a fleet of git repositories lives and what it points at.
//!
//! ## Quick Example
//!
//! ```
//! use repo_fleet::classify::{Alias, Classifier};
//! use repo_fleet::merge;
//! use repo_fleet::record::{RemoteInfo, RepoRecord};
//!
//! // Classify a repository path into its taxonomy bucket
//! let classifier = Classifier::new(vec![Alias::new("frontend", &["frontend", "vue"])]);
//! assert_eq!(classifier.classify("vue-apps/admin"), "frontend/admin");
//!
//! // Reconcile a fresh scan with a previously stored record
//! let mut stored = RepoRecord::new("admin");
//! stored
//!     .remotes
//!     .insert("origin".to_string(), RemoteInfo::new("https://host/a.git"));
//! let incoming = RepoRecord::new("admin");
//! let merged = merge::reconcile(Some(&stored), &incoming, "devbox").unwrap();
//! assert!(merged.has_remote_url("https://host/a.git"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Records (`record`)**: the persisted model — one `RepoRecord` per
//!   repository, holding its remotes, submodules, and every machine+path
//!   where it has been observed.
//! - **Extraction (`gitconfig`)**: turns `.git/config` INI text into a
//!   normalized record, recovering from unreadable configs with placeholder
//!   records so discovery never stops.
//! - **Classification (`classify`)**: buckets repository paths into
//!   taxonomy categories; classified paths are the store keys that join
//!   observations across machines.
//! - **Processors (`processor`)**: the pluggable capability recognizing and
//!   handling one repository kind's backup/restore lifecycle.
//! - **Walking (`walker`)**: bounded-depth sequential discovery; the first
//!   processor to claim a directory stops descent into it.
//! - **Reconciliation (`merge`)**: deep-merges fresh scans over stored
//!   records without ever dropping an observed remote URL.
//! - **Stores (`store`)**: versioned, whole-file JSON persistence with
//!   upgrade and key-normalization passes on load.
//! - **Restore (`restore`, `git`)**: the mirror pipeline — clone missing
//!   repositories and re-add missing remotes via the system git binary.

pub mod classify;
pub mod config;
pub mod error;
pub mod git;
pub mod gitconfig;
pub mod merge;
pub mod output;
pub mod processor;
pub mod record;
pub mod restore;
pub mod store;
pub mod walker;

#[cfg(test)]
mod merge_proptest;
