//! Pure conflict resolution between the local and remote favorite records.
//!
//! No I/O. The decision is driven by the local record's two stamps
//! (`update_ms`, `sync_ms`) and the version counters on both sides. The
//! local stamp combinations are classified into an explicit enum so the
//! dispatch is exhaustive — there is no silent fallthrough case.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::types::{LocalFavorites, RemoteFavorites};

/// Result of one reconciliation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub local: LocalFavorites,
    pub remote: RemoteFavorites,
    /// The caller must write `remote` back to the remote store.
    pub needs_upload: bool,
}

/// The local record relative to its own two stamps. Variants are checked in
/// declaration order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalState {
    /// Never mutated, never synced.
    Untouched,
    /// Mutated locally but never synced.
    NeverSynced,
    /// Synced but no mutation stamp — corrupt.
    MissingUpdateStamp,
    /// Mutation stamp older than the sync stamp — corrupt.
    RewoundUpdateStamp,
    /// Unsynced local change pending.
    DirtySinceSync,
    /// No local change since the last sync.
    CleanSinceSync,
}

fn classify(local: &LocalFavorites) -> LocalState {
    match (local.update_ms, local.sync_ms) {
        (0, 0) => LocalState::Untouched,
        (_, 0) => LocalState::NeverSynced,
        (0, _) => LocalState::MissingUpdateStamp,
        (u, s) if u < s => LocalState::RewoundUpdateStamp,
        (u, s) if u > s => LocalState::DirtySinceSync,
        _ => LocalState::CleanSinceSync,
    }
}

/// Decide how local and remote converge.
///
/// Both corrupt states recover by adopting the remote record wholesale.
/// Takes `now_ms` as an argument so callers (and tests) control the stamps
/// written into the outcome.
pub fn reconcile(local: &LocalFavorites, remote: &RemoteFavorites, now_ms: i64) -> Reconciled {
    match classify(local) {
        LocalState::Untouched | LocalState::MissingUpdateStamp | LocalState::RewoundUpdateStamp => {
            adopt_remote(remote, now_ms)
        }
        LocalState::NeverSynced => merge(local, remote, now_ms),
        LocalState::DirtySinceSync => match local.version.cmp(&remote.version) {
            Ordering::Greater => {
                // Should not occur under sequential use: the remote version is
                // always written before the local one records it.
                tracing::warn!(
                    local_version = local.version,
                    remote_version = remote.version,
                    "local version ahead of remote with unsynced changes, merging"
                );
                merge(local, remote, now_ms)
            }
            Ordering::Equal => local_wins(local, remote, now_ms),
            Ordering::Less => merge(local, remote, now_ms),
        },
        LocalState::CleanSinceSync => match local.version.cmp(&remote.version) {
            Ordering::Less => adopt_remote(remote, now_ms),
            Ordering::Greater => merge(local, remote, now_ms),
            Ordering::Equal => Reconciled {
                local: local.clone(),
                remote: remote.clone(),
                needs_upload: false,
            },
        },
    }
}

/// Remote overwrites local; nothing to upload.
fn adopt_remote(remote: &RemoteFavorites, now_ms: i64) -> Reconciled {
    Reconciled {
        local: LocalFavorites {
            update_ms: now_ms,
            sync_ms: now_ms,
            version: remote.version,
            ids: remote.ids.clone(),
        },
        remote: remote.clone(),
        needs_upload: false,
    }
}

/// Union of both sets; both sides move to a version above everything seen.
fn merge(local: &LocalFavorites, remote: &RemoteFavorites, now_ms: i64) -> Reconciled {
    let ids: BTreeSet<String> = local.ids.union(&remote.ids).cloned().collect();
    let version = local.version.max(remote.version) + 1;
    Reconciled {
        local: LocalFavorites {
            update_ms: now_ms,
            sync_ms: now_ms,
            version,
            ids: ids.clone(),
        },
        remote: RemoteFavorites {
            update_ms: now_ms,
            version,
            ids,
            handle: remote.handle.clone(),
        },
        needs_upload: true,
    }
}

/// Local set overwrites remote at a bumped version.
fn local_wins(local: &LocalFavorites, remote: &RemoteFavorites, now_ms: i64) -> Reconciled {
    let version = local.version.max(remote.version) + 1;
    Reconciled {
        local: LocalFavorites {
            update_ms: now_ms,
            sync_ms: now_ms,
            version,
            ids: local.ids.clone(),
        },
        remote: RemoteFavorites {
            update_ms: now_ms,
            version,
            ids: local.ids.clone(),
            handle: remote.handle.clone(),
        },
        needs_upload: true,
    }
}
