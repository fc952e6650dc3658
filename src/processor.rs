//! # Repository-Kind Processors
//!
//! A `Processor` is the pluggable unit that knows how to recognize and back
//! up / restore one kind of repository. Only a Git-on-filesystem
//! implementation exists today, but the walker and the restore engine only
//! ever talk to the trait, so other VCS or bundle formats slot in behind
//! it.
//!
//! The registry is an explicit ordered list. At every directory the walker
//! tries processors in registration order and the first `should_backup`
//! claim wins, so traversal outcomes are reproducible and testable.

use std::path::Path;

use log::info;

use crate::error::Result;
use crate::git::{self, RestoreAction};
use crate::gitconfig;
use crate::record::RepoRecord;

/// Context handed to processors during a backup scan.
pub struct ScanContext<'a> {
    /// The directory currently being examined (absolute).
    pub current_dir: &'a Path,
    /// Identifier of the machine running the scan.
    pub machine_id: &'a str,
}

/// Context handed to processors during restore.
pub struct RestoreContext<'a> {
    /// Where the repository should be materialized.
    pub target_dir: &'a Path,
    /// Report planned actions without touching git.
    pub dry_run: bool,
}

/// One repository kind's backup/restore lifecycle.
pub trait Processor {
    /// Stable tag stamped into records and matched on restore.
    fn kind(&self) -> &'static str;

    /// True iff the current directory contains this kind's marker.
    fn should_backup(&self, ctx: &ScanContext<'_>) -> bool;

    /// Extract a record for the claimed directory. Must not fail: an
    /// unreadable repository yields a placeholder record.
    fn backup_repo(&self, ctx: &ScanContext<'_>) -> RepoRecord;

    /// True iff this processor produced `record` and can restore it.
    fn should_restore(&self, record: &RepoRecord) -> bool;

    /// Materialize the repository at the context's target path. Returns
    /// whether any new clone action occurred.
    fn restore_repo(&self, ctx: &RestoreContext<'_>, record: &RepoRecord) -> Result<bool>;
}

/// Kind tag for git working trees.
pub const GIT_KIND: &str = ".git";

/// The Git-on-filesystem processor: marker is a `.git` entry, identity
/// comes from `.git/config`.
pub struct GitProcessor;

impl Processor for GitProcessor {
    fn kind(&self) -> &'static str {
        GIT_KIND
    }

    fn should_backup(&self, ctx: &ScanContext<'_>) -> bool {
        ctx.current_dir.join(".git").exists()
    }

    fn backup_repo(&self, ctx: &ScanContext<'_>) -> RepoRecord {
        info!("backing up {}", ctx.current_dir.display());
        let folder_name = ctx
            .current_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        let config_path = ctx.current_dir.join(".git").join("config");
        let mut record = gitconfig::extract(&config_path, &folder_name);
        record.processor_kind = Some(self.kind().to_string());
        record
            .from_paths
            .entry(ctx.machine_id.to_string())
            .or_default()
            .insert(ctx.current_dir.display().to_string());
        record
    }

    fn should_restore(&self, record: &RepoRecord) -> bool {
        record.processor_kind.as_deref() == Some(GIT_KIND)
    }

    fn restore_repo(&self, ctx: &RestoreContext<'_>, record: &RepoRecord) -> Result<bool> {
        let mut cloned_any = false;
        for (name, remote) in &record.remotes {
            if ctx.dry_run {
                println!(
                    "  would restore {} = {} to {}",
                    name,
                    remote.url,
                    ctx.target_dir.display()
                );
                continue;
            }
            // Best-effort per remote: one failure must not abort the rest
            match git::clone_or_add_remote(ctx.target_dir, name, &remote.url) {
                Ok(RestoreAction::Cloned) => cloned_any = true,
                Ok(RestoreAction::AddedRemote(used)) => {
                    if used != *name {
                        info!("remote {} landed as {} after collisions", name, used);
                    }
                }
                Ok(RestoreAction::AlreadyPresent) => {
                    info!(
                        "remote {} already present with url {} in {}",
                        name,
                        remote.url,
                        ctx.target_dir.display()
                    );
                }
                Err(err) => {
                    log::warn!(
                        "failed restoring remote {} of {}: {}",
                        name,
                        ctx.target_dir.display(),
                        err
                    );
                }
            }
        }
        Ok(cloned_any)
    }
}

/// Ordered processor list; first claim wins.
pub struct ProcessorRegistry {
    processors: Vec<Box<dyn Processor>>,
}

impl ProcessorRegistry {
    pub fn new(processors: Vec<Box<dyn Processor>>) -> Self {
        Self { processors }
    }

    /// The first processor claiming the current directory, if any.
    pub fn find_for_backup(&self, ctx: &ScanContext<'_>) -> Option<&dyn Processor> {
        self.processors
            .iter()
            .find(|p| p.should_backup(ctx))
            .map(AsRef::as_ref)
    }

    /// The first processor accepting this record for restore, if any.
    pub fn find_for_restore(&self, record: &RepoRecord) -> Option<&dyn Processor> {
        self.processors
            .iter()
            .find(|p| p.should_restore(record))
            .map(AsRef::as_ref)
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new(vec![Box::new(GitProcessor)])
    }
}
