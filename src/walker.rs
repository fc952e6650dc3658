//! # Repository Discovery Walker
//!
//! Bounded-depth, strictly sequential, depth-first traversal. At every
//! directory the registered processors are asked, in order, whether the
//! directory is theirs; the first claim produces a record, reconciles it
//! into the store under its classified path, and stops descent — a git
//! repository's internal object and pack files are never walked. Unclaimed
//! directories are descended into until the depth budget runs out.
//!
//! Siblings are visited in file-name order so scan results are
//! deterministic for a given tree.

use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::classify::Classifier;
use crate::error::{Error, Result};
use crate::merge;
use crate::processor::{ProcessorRegistry, ScanContext};
use crate::store::Store;

/// Counters reported after a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Directories examined (claimed or descended).
    pub directories_visited: usize,
    /// Repositories claimed by some processor.
    pub repos_found: usize,
}

/// Walks one root, reconciling discovered repositories into a store.
pub struct Walker<'a> {
    registry: &'a ProcessorRegistry,
    classifier: &'a Classifier,
    machine_id: &'a str,
}

impl<'a> Walker<'a> {
    pub fn new(
        registry: &'a ProcessorRegistry,
        classifier: &'a Classifier,
        machine_id: &'a str,
    ) -> Self {
        Self {
            registry,
            classifier,
            machine_id,
        }
    }

    /// Scan `root` down to `max_depth` levels, merging every discovered
    /// repository into `store` under its classified relative path.
    pub fn scan(&self, root: &Path, max_depth: usize, store: &mut Store) -> Result<ScanSummary> {
        // Canonical absolute paths so fromPaths entries are comparable
        // across runs started from different working directories.
        let root = root.canonicalize().map_err(|err| Error::Path {
            message: format!("cannot resolve root {}: {}", root.display(), err),
        })?;

        let mut summary = ScanSummary::default();
        let mut entries = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            summary.directories_visited += 1;

            let ctx = ScanContext {
                current_dir: entry.path(),
                machine_id: self.machine_id,
            };
            let Some(processor) = self.registry.find_for_backup(&ctx) else {
                continue;
            };

            let record = processor.backup_repo(&ctx);
            let relative = entry.path().strip_prefix(&root).map_err(|_| Error::Path {
                message: format!(
                    "entry {} is not under root {}",
                    entry.path().display(),
                    root.display()
                ),
            })?;
            let key = self.classifier.classify(&relative.to_string_lossy());
            debug!("classified {} as {}", relative.display(), key);

            let merged = merge::reconcile(store.repos.get(&key), &record, self.machine_id)?;
            store.repos.insert(key, merged);
            summary.repos_found += 1;

            // The claimed directory's subtree belongs to the repository
            entries.skip_current_dir();
        }

        Ok(summary)
    }
}
