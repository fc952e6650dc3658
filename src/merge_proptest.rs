//! Property-based tests for the reconciliation engine.
//!
//! These tests use proptest to generate random record pairs and verify
//! that the merge laws hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::merge::{next_free_key, reconcile};
    use crate::record::{RemoteInfo, RepoRecord};
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn arb_remotes() -> impl Strategy<Value = BTreeMap<String, RemoteInfo>> {
        proptest::collection::btree_map(
            "[a-z]{1,6}",
            "[a-z0-9:/.]{1,12}".prop_map(RemoteInfo::new),
            0..4,
        )
    }

    fn arb_from_paths() -> impl Strategy<Value = BTreeMap<String, BTreeSet<String>>> {
        proptest::collection::btree_map(
            "[a-z]{1,4}",
            proptest::collection::btree_set("/[a-z/]{1,10}", 0..3),
            0..3,
        )
    }

    fn arb_record() -> impl Strategy<Value = RepoRecord> {
        ("[a-z]{1,8}", arb_remotes(), arb_from_paths()).prop_map(
            |(name, remotes, from_paths)| {
                let mut record = RepoRecord::new(name);
                record.remotes = remotes;
                record.from_paths = from_paths;
                record
            },
        )
    }

    proptest! {
        /// Property: every URL present on either side survives reconciliation
        /// under some key
        #[test]
        fn reconcile_preserves_remote_url_union(
            existing in arb_record(),
            incoming in arb_record(),
        ) {
            let merged = reconcile(Some(&existing), &incoming, "m").unwrap();
            for record in [&existing, &incoming] {
                for url in record.remote_urls() {
                    prop_assert!(
                        merged.has_remote_url(url),
                        "url '{}' was dropped by reconcile",
                        url
                    );
                }
            }
        }

        /// Property: fromPaths never shrinks for any machine
        #[test]
        fn reconcile_from_paths_is_monotonic(
            existing in arb_record(),
            incoming in arb_record(),
        ) {
            let merged = reconcile(Some(&existing), &incoming, "m").unwrap();
            for record in [&existing, &incoming] {
                for (machine, paths) in &record.from_paths {
                    let merged_paths = merged.from_paths.get(machine);
                    prop_assert!(
                        merged_paths.is_some_and(|m| paths.is_subset(m)),
                        "fromPaths shrank for machine '{}'",
                        machine
                    );
                }
            }
        }

        /// Property: reconciliation is deterministic
        #[test]
        fn reconcile_is_deterministic(
            existing in arb_record(),
            incoming in arb_record(),
        ) {
            let first = reconcile(Some(&existing), &incoming, "m").unwrap();
            let second = reconcile(Some(&existing), &incoming, "m").unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: re-applying the same scan leaves the record stable —
        /// repeated scans of an unchanged repository must not drift
        #[test]
        fn reconcile_second_application_is_stable(
            existing in arb_record(),
            incoming in arb_record(),
        ) {
            let once = reconcile(Some(&existing), &incoming, "m").unwrap();
            let twice = reconcile(Some(&once), &incoming, "m").unwrap();
            prop_assert_eq!(once, twice);
        }
    }

    proptest! {
        /// Property: the synthesized key is never an existing key and always
        /// starts with the base
        #[test]
        fn next_free_key_avoids_collisions(
            existing in arb_remotes(),
            base in "[a-z]{1,5}",
        ) {
            let key = next_free_key(&existing, &base);
            prop_assert!(!existing.contains_key(&key));
            prop_assert!(key.starts_with(&base));
        }
    }
}
