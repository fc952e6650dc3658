//! # Restore Engine
//!
//! The mirror of discovery: walk a store and, for every record whose
//! category is enabled, reconstruct the candidate path under the target
//! root and hand the record to the processor that claims it.
//!
//! Restoration is best-effort throughout. A record with no matching
//! processor, a failed clone, or a failed remote-add is logged and skipped;
//! the run always processes the remaining entries.

use std::path::Path;

use log::{info, warn};

use crate::processor::{ProcessorRegistry, RestoreContext};
use crate::store::Store;

/// Counters reported after a restore run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Records whose category was enabled and a processor accepted.
    pub attempted: usize,
    /// Records for which a fresh clone occurred.
    pub cloned: usize,
    /// Records skipped by category filter or missing processor.
    pub skipped: usize,
    /// Records whose processor returned an error.
    pub failed: usize,
}

/// Restore every enabled record of `store` under `root`.
///
/// `enabled_categories` is matched against the leading segment of each
/// classified path. Entries are processed in key order.
pub fn restore_all(
    store: &Store,
    root: &Path,
    enabled_categories: &[String],
    registry: &ProcessorRegistry,
    dry_run: bool,
) -> RestoreSummary {
    let total = store.repos.len();
    let mut summary = RestoreSummary::default();

    for (index, (key, record)) in store.repos.iter().enumerate() {
        let category = key.split('/').next().unwrap_or_default();
        if !enabled_categories.iter().any(|c| c.as_str() == category) {
            summary.skipped += 1;
            continue;
        }

        let Some(processor) = registry.find_for_restore(record) else {
            warn!(
                "no processor restores {} (kind {:?}), skipping",
                key, record.processor_kind
            );
            summary.skipped += 1;
            continue;
        };

        let target = root.join(key);
        info!("restoring {}/{}: {}", index + 1, total, key);
        summary.attempted += 1;

        let ctx = RestoreContext {
            target_dir: &target,
            dry_run,
        };
        match processor.restore_repo(&ctx, record) {
            Ok(true) => summary.cloned += 1,
            Ok(false) => {}
            Err(err) => {
                warn!("restore failed for {}: {}", key, err);
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::processor::{Processor, ScanContext};
    use crate::record::{RemoteInfo, RepoRecord};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Records every restore call instead of touching git.
    struct Recording {
        kind: &'static str,
        calls: Arc<Mutex<Vec<PathBuf>>>,
        fail: bool,
    }

    impl Recording {
        fn new(kind: &'static str) -> Self {
            Self {
                kind,
                calls: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }
    }

    impl Processor for Recording {
        fn kind(&self) -> &'static str {
            self.kind
        }
        fn should_backup(&self, _ctx: &ScanContext<'_>) -> bool {
            false
        }
        fn backup_repo(&self, _ctx: &ScanContext<'_>) -> RepoRecord {
            RepoRecord::new("unused")
        }
        fn should_restore(&self, record: &RepoRecord) -> bool {
            record.processor_kind.as_deref() == Some(self.kind)
        }
        fn restore_repo(&self, ctx: &RestoreContext<'_>, _record: &RepoRecord) -> Result<bool> {
            self.calls.lock().unwrap().push(ctx.target_dir.to_path_buf());
            if self.fail {
                return Err(crate::error::Error::Path {
                    message: "stub failure".to_string(),
                });
            }
            Ok(true)
        }
    }

    fn store_with(keys: &[&str]) -> Store {
        let mut store = Store::default();
        for key in keys {
            let mut record = RepoRecord::new(key.rsplit('/').next().unwrap());
            record.processor_kind = Some(".git".to_string());
            record
                .remotes
                .insert("origin".to_string(), RemoteInfo::new("https://host/x.git"));
            store.repos.insert((*key).to_string(), record);
        }
        store
    }

    #[test]
    fn test_restore_filters_by_category() {
        let store = store_with(&["comm/tool", "ai/model", "unclassified/x"]);
        let registry = ProcessorRegistry::new(vec![Box::new(Recording::new(".git"))]);
        let enabled = vec!["comm".to_string()];

        let summary = restore_all(&store, Path::new("/fleet"), &enabled, &registry, false);
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.cloned, 1);
    }

    #[test]
    fn test_restore_target_is_root_joined_with_classified_path() {
        let store = store_with(&["comm/tool"]);
        let recorder = Recording::new(".git");
        let calls = Arc::clone(&recorder.calls);
        let registry = ProcessorRegistry::new(vec![Box::new(recorder)]);

        restore_all(
            &store,
            Path::new("/fleet/code"),
            &["comm".to_string()],
            &registry,
            false,
        );
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[PathBuf::from("/fleet/code/comm/tool")]
        );
    }

    #[test]
    fn test_restore_dispatches_by_kind() {
        let mut store = store_with(&["comm/git-tool"]);
        let mut other = RepoRecord::new("hg-tool");
        other.processor_kind = Some(".hg".to_string());
        store.repos.insert("comm/hg-tool".to_string(), other);

        let registry = ProcessorRegistry::new(vec![Box::new(Recording::new(".git"))]);
        let summary = restore_all(
            &store,
            Path::new("/fleet"),
            &["comm".to_string()],
            &registry,
            false,
        );
        // The .hg record finds no processor and is skipped, not failed
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_restore_failure_does_not_abort_run() {
        let store = store_with(&["comm/a", "comm/b"]);
        let mut failing = Recording::new(".git");
        failing.fail = true;
        let registry = ProcessorRegistry::new(vec![Box::new(failing)]);

        let summary = restore_all(
            &store,
            Path::new("/fleet"),
            &["comm".to_string()],
            &registry,
            false,
        );
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.failed, 2);
    }
}
