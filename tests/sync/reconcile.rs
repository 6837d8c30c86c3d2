//! Reconciliation engine tests — every decision branch plus the invariants
//! the rest of the engine relies on.

use std::collections::BTreeSet;

use fav_sync::sync::reconcile::reconcile;
use fav_sync::types::{DocumentHandle, LocalFavorites, RemoteFavorites};

const NOW: i64 = 1_700_000_000_000;

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn local(values: &[&str], update_ms: i64, sync_ms: i64, version: u64) -> LocalFavorites {
    LocalFavorites {
        update_ms,
        sync_ms,
        version,
        ids: ids(values),
    }
}

fn remote(values: &[&str], version: u64) -> RemoteFavorites {
    RemoteFavorites {
        update_ms: 0,
        version,
        ids: ids(values),
        handle: None,
    }
}

// ============================================================================
// Adopt-remote branches
// ============================================================================

#[test]
fn untouched_local_adopts_remote() {
    let l = local(&[], 0, 0, 0);
    let r = remote(&["s1"], 3);

    let out = reconcile(&l, &r, NOW);

    assert!(!out.needs_upload);
    assert_eq!(out.local.ids, ids(&["s1"]));
    assert_eq!(out.local.version, 3);
    assert_eq!(out.local.update_ms, NOW);
    assert_eq!(out.local.sync_ms, NOW);
    assert_eq!(out.remote, r);
}

#[test]
fn missing_update_stamp_adopts_remote() {
    // sync_ms set without update_ms cannot happen under correct use.
    let l = local(&["a"], 0, 50, 1);
    let r = remote(&["b"], 2);

    let out = reconcile(&l, &r, NOW);

    assert!(!out.needs_upload);
    assert_eq!(out.local.ids, ids(&["b"]));
    assert_eq!(out.local.version, 2);
}

#[test]
fn rewound_update_stamp_adopts_remote() {
    let l = local(&["a"], 40, 50, 2);
    let r = remote(&["b"], 5);

    let out = reconcile(&l, &r, NOW);

    assert!(!out.needs_upload);
    assert_eq!(out.local.ids, ids(&["b"]));
    assert_eq!(out.local.version, 5);
}

#[test]
fn clean_local_behind_remote_adopts_remote() {
    let l = local(&["a"], 50, 50, 1);
    let r = remote(&["b"], 2);

    let out = reconcile(&l, &r, NOW);

    assert!(!out.needs_upload);
    assert_eq!(out.local.ids, ids(&["b"]));
    assert_eq!(out.local.version, 2);
}

// ============================================================================
// Merge branches
// ============================================================================

#[test]
fn never_synced_local_merges() {
    let l = local(&["a"], 100, 0, 0);
    let r = remote(&["b"], 2);

    let out = reconcile(&l, &r, NOW);

    assert!(out.needs_upload);
    assert_eq!(out.local.ids, ids(&["a", "b"]));
    assert_eq!(out.local.version, 3);
    assert_eq!(out.remote.ids, ids(&["a", "b"]));
    assert_eq!(out.remote.version, 3);
}

#[test]
fn dirty_local_behind_remote_merges() {
    let l = local(&["s1"], 100, 50, 1);
    let r = remote(&["s2"], 2);

    let out = reconcile(&l, &r, NOW);

    assert!(out.needs_upload);
    assert_eq!(out.local.ids, ids(&["s1", "s2"]));
    assert_eq!(out.local.version, 3);
}

#[test]
fn dirty_local_version_ahead_merges_without_losing_version() {
    // Anomalous: the local counter should never lead the remote one.
    let l = local(&["a"], 100, 50, 5);
    let r = remote(&["b"], 2);

    let out = reconcile(&l, &r, NOW);

    assert!(out.needs_upload);
    assert_eq!(out.local.ids, ids(&["a", "b"]));
    assert_eq!(out.local.version, 6);
    assert_eq!(out.remote.version, 6);
}

#[test]
fn clean_local_version_ahead_merges() {
    let l = local(&["a"], 50, 50, 4);
    let r = remote(&["b"], 2);

    let out = reconcile(&l, &r, NOW);

    assert!(out.needs_upload);
    assert_eq!(out.local.ids, ids(&["a", "b"]));
    assert_eq!(out.local.version, 5);
}

#[test]
fn union_collapses_shared_ids() {
    let l = local(&["a", "b"], 100, 0, 0);
    let r = remote(&["b", "c"], 7);

    let out = reconcile(&l, &r, NOW);

    assert_eq!(out.local.ids, ids(&["a", "b", "c"]));
    assert_eq!(out.local.version, 8);
}

#[test]
fn merge_preserves_remote_handle() {
    let l = local(&["a"], 100, 0, 0);
    let mut r = remote(&["b"], 1);
    r.handle = Some(DocumentHandle::new("file-1"));

    let out = reconcile(&l, &r, NOW);

    assert_eq!(out.remote.handle, Some(DocumentHandle::new("file-1")));
}

// ============================================================================
// Local-wins branch
// ============================================================================

#[test]
fn dirty_local_at_equal_version_wins() {
    let l = local(&["s1", "s2"], 100, 50, 2);
    let r = remote(&["s2"], 2);

    let out = reconcile(&l, &r, NOW);

    assert!(out.needs_upload);
    assert_eq!(out.local.ids, ids(&["s1", "s2"]));
    assert_eq!(out.local.version, 3);
    assert_eq!(out.remote.ids, ids(&["s1", "s2"]));
    assert_eq!(out.remote.version, 3);
}

#[test]
fn local_wins_drops_remote_only_ids() {
    // Deliberate policy: at equal versions the local set overwrites the
    // remote one, even if the remote had extra ids.
    let l = local(&["a"], 100, 50, 1);
    let r = remote(&["a", "b"], 1);

    let out = reconcile(&l, &r, NOW);

    assert!(out.needs_upload);
    assert_eq!(out.local.ids, ids(&["a"]));
    assert_eq!(out.remote.ids, ids(&["a"]));
}

// ============================================================================
// No-op branch and invariants
// ============================================================================

#[test]
fn clean_equal_versions_is_a_no_op() {
    let l = local(&["a"], 50, 50, 2);
    let r = remote(&["a"], 2);

    let out = reconcile(&l, &r, NOW);

    assert!(!out.needs_upload);
    assert_eq!(out.local, l);
    assert_eq!(out.remote, r);
}

#[test]
fn stamps_are_set_together_after_every_changing_branch() {
    let cases = [
        (local(&[], 0, 0, 0), remote(&["x"], 1)),        // adopt
        (local(&["a"], 100, 0, 0), remote(&["b"], 1)),   // merge
        (local(&["a"], 100, 50, 1), remote(&["b"], 1)),  // local wins
        (local(&["a"], 100, 50, 1), remote(&["b"], 9)),  // merge, remote ahead
    ];
    for (l, r) in cases {
        let out = reconcile(&l, &r, NOW);
        assert_eq!(out.local.update_ms, out.local.sync_ms, "{l:?} vs {r:?}");
        assert_eq!(out.local.update_ms, NOW);
    }
}

#[test]
fn sides_converge_after_every_branch() {
    let cases = [
        (local(&[], 0, 0, 0), remote(&["x"], 1)),
        (local(&["a"], 100, 0, 0), remote(&["b"], 1)),
        (local(&["a"], 100, 50, 1), remote(&["b"], 1)),
        (local(&["a"], 100, 50, 1), remote(&["b"], 9)),
        (local(&["a"], 50, 50, 2), remote(&["a"], 2)),
    ];
    for (l, r) in cases {
        let out = reconcile(&l, &r, NOW);
        assert_eq!(out.local.ids, out.remote.ids, "{l:?} vs {r:?}");
        assert_eq!(out.local.version, out.remote.version, "{l:?} vs {r:?}");
    }
}

#[test]
fn version_never_decreases_across_rounds() {
    // Fresh device adopts, mutates, wins, then merges against a far-ahead
    // remote — the version must track the highest value seen so far.
    let mut l = local(&[], 0, 0, 0);

    let out = reconcile(&l, &remote(&["s1"], 3), NOW);
    assert_eq!(out.local.version, 3);
    l = out.local;

    // Local mutation after the sync.
    l.ids.insert("s2".to_string());
    l.update_ms = NOW + 10;

    let out = reconcile(&l, &remote(&["s1"], 3), NOW + 20);
    assert_eq!(out.local.version, 4);
    l = out.local;

    l.ids.insert("s3".to_string());
    l.update_ms = NOW + 30;

    let out = reconcile(&l, &remote(&["s9"], 9), NOW + 40);
    assert!(out.local.version >= 9);
    assert_eq!(out.local.version, 10);
}
