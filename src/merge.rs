//! # Record Reconciliation
//!
//! Combines a freshly scanned [`RepoRecord`] with whatever record already
//! exists at the same classified path. The policy is deliberately not
//! last-write-wins:
//!
//! 1. the union of remote URLs from both sides is collected up front;
//! 2. the incoming record deep-merges over the existing one;
//! 3. any URL the merge lost is re-inserted under a synthesized
//!    `{machine}{n}` key;
//! 4. `fromPaths` only ever grows.
//!
//! A scan of a shallow or half-configured clone therefore can never erase a
//! remote that an earlier scan observed, while named remotes keep their
//! names.
//!
//! The deep merge operates on `serde_json::Value` so the primitive-array
//! versus object-array distinction is an explicit branch: arrays of
//! primitives merge by order-preserving set union, any other array pair is
//! replaced wholesale by the incoming side (positional merging of
//! heterogeneous objects has no well-defined semantics).

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::Result;
use crate::record::{RemoteInfo, RepoRecord};

/// True for null, bool, number, and string values.
fn is_primitive(value: &Value) -> bool {
    !value.is_object() && !value.is_array()
}

/// Recursively merge `incoming` into `target`.
///
/// Objects merge key-by-key; keys absent from `incoming` survive untouched.
/// All-primitive array pairs union with `target` order preserved and unseen
/// `incoming` items appended. Everything else is replaced by `incoming`.
pub fn deep_merge(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match target_map.get_mut(key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(target_items), Value::Array(incoming_items))
            if target_items.iter().all(is_primitive)
                && incoming_items.iter().all(is_primitive) =>
        {
            for item in incoming_items {
                if !target_items.contains(item) {
                    target_items.push(item.clone());
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// The smallest `{base}{n}` not already used as a key.
///
/// Scans the existing keys rather than counting entries: keys can be
/// deleted or renamed by migrations, so sequential numbering cannot be
/// assumed.
pub fn next_free_key(existing: &BTreeMap<String, RemoteInfo>, base: &str) -> String {
    let mut n: usize = 0;
    loop {
        let key = format!("{}{}", base, n);
        if !existing.contains_key(&key) {
            return key;
        }
        n += 1;
    }
}

/// Reconcile a freshly extracted record with the previously stored one.
///
/// Deterministic for fixed inputs and machine identifier; re-running the
/// same scan leaves the stored record unchanged after the first merge.
pub fn reconcile(
    existing: Option<&RepoRecord>,
    incoming: &RepoRecord,
    machine_id: &str,
) -> Result<RepoRecord> {
    let Some(existing) = existing else {
        return Ok(incoming.clone());
    };

    // URL union, existing side first, before the merge can lose anything.
    let mut urls: Vec<String> = Vec::new();
    for record in [existing, incoming] {
        for url in record.remote_urls() {
            if !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
    }

    let mut merged_value = serde_json::to_value(existing)?;
    let incoming_value = serde_json::to_value(incoming)?;
    deep_merge(&mut merged_value, &incoming_value);
    let mut merged: RepoRecord = serde_json::from_value(merged_value)?;

    for url in urls {
        if !merged.has_remote_url(&url) {
            let key = next_free_key(&merged.remotes, machine_id);
            merged.remotes.insert(key, RemoteInfo::new(url));
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn record_with_remote(name: &str, key: &str, url: &str) -> RepoRecord {
        let mut record = RepoRecord::new(name);
        record.remotes.insert(key.to_string(), RemoteInfo::new(url));
        record
    }

    #[test]
    fn test_deep_merge_scalars_replace() {
        let mut target = json!({"a": 1, "b": "old"});
        deep_merge(&mut target, &json!({"b": "new"}));
        assert_eq!(target, json!({"a": 1, "b": "new"}));
    }

    #[test]
    fn test_deep_merge_objects_merge_recursively() {
        let mut target = json!({"outer": {"keep": 1, "swap": 2}});
        deep_merge(&mut target, &json!({"outer": {"swap": 3, "add": 4}}));
        assert_eq!(target, json!({"outer": {"keep": 1, "swap": 3, "add": 4}}));
    }

    #[test]
    fn test_deep_merge_absent_key_survives() {
        let mut target = json!({"description": "kept"});
        deep_merge(&mut target, &json!({}));
        assert_eq!(target, json!({"description": "kept"}));
    }

    #[test]
    fn test_deep_merge_primitive_arrays_union() {
        let mut target = json!(["a", "b"]);
        deep_merge(&mut target, &json!(["b", "c"]));
        assert_eq!(target, json!(["a", "b", "c"]));
    }

    #[test]
    fn test_deep_merge_object_arrays_replace() {
        let mut target = json!([{"x": 1}, {"x": 2}]);
        deep_merge(&mut target, &json!([{"y": 3}]));
        assert_eq!(target, json!([{"y": 3}]));
    }

    #[test]
    fn test_deep_merge_mixed_array_replaces() {
        // One side holds a non-primitive, so union semantics don't apply
        let mut target = json!(["a", {"x": 1}]);
        deep_merge(&mut target, &json!(["b"]));
        assert_eq!(target, json!(["b"]));
    }

    #[test]
    fn test_next_free_key_scans_gaps() {
        let mut existing = BTreeMap::new();
        existing.insert("devbox0".to_string(), RemoteInfo::new("U0"));
        existing.insert("devbox2".to_string(), RemoteInfo::new("U2"));
        assert_eq!(next_free_key(&existing, "devbox"), "devbox1");
        assert_eq!(next_free_key(&BTreeMap::new(), "devbox"), "devbox0");
    }

    #[test]
    fn test_reconcile_no_existing_returns_incoming() {
        let incoming = record_with_remote("r", "origin", "U1");
        let merged = reconcile(None, &incoming, "M").unwrap();
        assert_eq!(merged, incoming);
    }

    #[test]
    fn test_reconcile_keeps_remote_missing_from_incoming() {
        // A scan whose config temporarily lost its remote section must not
        // erase the stored remote
        let existing = record_with_remote("r", "origin", "U1");
        let incoming = RepoRecord::new("r");
        let merged = reconcile(Some(&existing), &incoming, "M").unwrap();
        assert!(merged.has_remote_url("U1"));
        assert_eq!(merged.remotes["origin"].url, "U1");
    }

    #[test]
    fn test_reconcile_synthesizes_key_for_displaced_url() {
        // Incoming reuses the "origin" name for a different URL; the old
        // URL survives under a synthesized machine key
        let existing = record_with_remote("r", "origin", "U1");
        let incoming = record_with_remote("r", "origin", "U2");
        let merged = reconcile(Some(&existing), &incoming, "M").unwrap();
        assert_eq!(merged.remotes["origin"].url, "U2");
        assert_eq!(merged.remotes["M0"].url, "U1");
        assert_eq!(merged.remotes.len(), 2);
    }

    #[test]
    fn test_reconcile_union_preserves_all_urls() {
        let mut existing = record_with_remote("r", "origin", "U1");
        existing
            .remotes
            .insert("mirror".to_string(), RemoteInfo::new("U2"));
        let incoming = record_with_remote("r", "fork", "U3");
        let merged = reconcile(Some(&existing), &incoming, "M").unwrap();
        for url in ["U1", "U2", "U3"] {
            assert!(merged.has_remote_url(url), "lost {}", url);
        }
    }

    #[test]
    fn test_reconcile_from_paths_union() {
        let mut existing = record_with_remote("r", "origin", "U1");
        existing.from_paths.insert(
            "laptop".to_string(),
            BTreeSet::from(["/old/code/r".to_string()]),
        );
        let mut incoming = record_with_remote("r", "origin", "U1");
        incoming.from_paths.insert(
            "laptop".to_string(),
            BTreeSet::from(["/new/code/r".to_string()]),
        );
        incoming.from_paths.insert(
            "desktop".to_string(),
            BTreeSet::from(["/mnt/code/r".to_string()]),
        );

        let merged = reconcile(Some(&existing), &incoming, "laptop").unwrap();
        assert_eq!(
            merged.from_paths["laptop"],
            BTreeSet::from(["/old/code/r".to_string(), "/new/code/r".to_string()])
        );
        assert_eq!(
            merged.from_paths["desktop"],
            BTreeSet::from(["/mnt/code/r".to_string()])
        );
    }

    #[test]
    fn test_reconcile_repeat_scan_is_stable() {
        let existing = record_with_remote("r", "origin", "U1");
        let mut incoming = record_with_remote("r", "origin", "U1");
        incoming.from_paths.insert(
            "M".to_string(),
            BTreeSet::from(["/code/r".to_string()]),
        );

        let once = reconcile(Some(&existing), &incoming, "M").unwrap();
        let twice = reconcile(Some(&once), &incoming, "M").unwrap();
        assert_eq!(once, twice);

        // And the serialized form is byte-for-byte stable
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn test_reconcile_pushurl_counts_toward_union() {
        let mut existing = RepoRecord::new("r");
        existing.remotes.insert(
            "origin".to_string(),
            RemoteInfo {
                url: "U1".to_string(),
                pushurl: Some("P1".to_string()),
            },
        );
        let incoming = record_with_remote("r", "origin", "U1");
        let merged = reconcile(Some(&existing), &incoming, "M").unwrap();
        // P1 still reachable: the merged origin kept its pushurl
        assert!(merged.has_remote_url("P1"));
    }

    #[test]
    fn test_reconcile_description_not_clobbered_by_success() {
        let mut existing = record_with_remote("r", "origin", "U1");
        existing.description = Some("error: earlier parse failure".to_string());
        let incoming = record_with_remote("r", "origin", "U1");
        let merged = reconcile(Some(&existing), &incoming, "M").unwrap();
        // Incoming had no description field, so the stored diagnostic stays
        assert!(merged.description.is_some());
    }
}
