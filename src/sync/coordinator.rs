//! Sync round orchestration: download → reconcile → conditional upload →
//! persist.
//!
//! `try_sync` never returns `Err` — transport failures are caught at this
//! boundary, logged, and mapped to an outcome code. Rounds are strictly
//! sequential: the in-flight flag drops overlapping calls instead of queuing
//! them, relying on the next coalesced call to retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::AuthProvider;
use crate::error::RemoteError;
use crate::store::LocalStore;
use crate::types::{
    now_ms, LocalFavorites, RemoteFavorites, FAVORITES_KEY, REMOTE_DOCUMENT_NAME,
    REMOTE_PARENT_FOLDER,
};

use super::reconcile::{reconcile, Reconciled};
use super::types::{RemoteStore, SyncOutcome};

pub struct SyncCoordinator {
    local_store: Arc<dyn LocalStore>,
    remote_store: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
    /// Shared authoritative record — also held by the favorite service.
    record: Arc<Mutex<LocalFavorites>>,
    in_flight: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(
        local_store: Arc<dyn LocalStore>,
        remote_store: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        record: Arc<Mutex<LocalFavorites>>,
    ) -> Self {
        Self {
            local_store,
            remote_store,
            auth,
            record,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one reconciliation round against the remote store.
    ///
    /// Returns `Skipped` without touching any state when a round is already
    /// in flight, `Unsynced` when the remote store was not reached (logged
    /// out or a caught transport failure), `Synced` on convergence.
    pub async fn try_sync(&self) -> SyncOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SyncOutcome::Skipped;
        }
        let outcome = self.run_round().await;
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_round(&self) -> SyncOutcome {
        // Persist the optimistic local state up front so a crash mid-round
        // never loses it.
        let snapshot = self.record.lock().clone();
        self.persist(&snapshot);

        if !self.auth.is_logged_in() {
            tracing::debug!("not signed in, skipping remote round-trip");
            return SyncOutcome::Unsynced;
        }

        match self.reconcile_round(&snapshot).await {
            Ok(local) => {
                self.publish(&snapshot, local);
                SyncOutcome::Synced
            }
            Err(e) => {
                tracing::warn!(error = %e, "sync round failed, keeping local state");
                SyncOutcome::Unsynced
            }
        }
    }

    async fn reconcile_round(&self, snapshot: &LocalFavorites) -> Result<LocalFavorites, RemoteError> {
        let remote = self.download_remote().await?;
        tracing::debug!(
            local_version = snapshot.version,
            remote_version = remote.version,
            "reconciling"
        );

        let Reconciled {
            local,
            remote,
            needs_upload,
        } = reconcile(snapshot, &remote, now_ms());

        if needs_upload {
            self.upload_remote(remote).await?;
        }
        Ok(local)
    }

    /// Install the reconciled record as the new authoritative state. Edits
    /// made while the round-trip was outstanding are carried forward instead
    /// of being overwritten by the pre-round snapshot's result.
    fn publish(&self, snapshot: &LocalFavorites, reconciled: LocalFavorites) {
        let mut record = self.record.lock();
        let published = carry_forward_edits(snapshot, &record, reconciled);
        self.persist(&published);
        *record = published;
    }

    /// Fetch the current remote record. An absent document is an empty
    /// record, not an error.
    async fn download_remote(&self) -> Result<RemoteFavorites, RemoteError> {
        match self.remote_store.find_by_name(REMOTE_DOCUMENT_NAME).await? {
            Some(handle) => {
                let bytes = self.remote_store.download(&handle).await?;
                let mut remote = RemoteFavorites::from_json_bytes(&bytes);
                remote.handle = Some(handle);
                Ok(remote)
            }
            None => Ok(RemoteFavorites::default()),
        }
    }

    /// Update in place when the document exists, otherwise create it. The
    /// handle of a freshly created document is not kept — the next round
    /// resolves it by name again.
    async fn upload_remote(&self, remote: RemoteFavorites) -> Result<(), RemoteError> {
        let body = remote.to_json();
        match &remote.handle {
            Some(handle) => self.remote_store.update(handle, body.as_bytes()).await?,
            None => {
                self.remote_store
                    .create(REMOTE_DOCUMENT_NAME, REMOTE_PARENT_FOLDER, body.as_bytes())
                    .await?;
            }
        }
        Ok(())
    }

    fn persist(&self, record: &LocalFavorites) {
        if let Err(e) = self.local_store.write(FAVORITES_KEY, &record.to_json()) {
            tracing::warn!(error = %e, "failed to persist favorites record");
        }
    }
}

/// Re-apply edits that landed between `snapshot` and `current` on top of the
/// reconciled record: ids added since the snapshot stay added, ids removed
/// stay removed. The result keeps a stamp strictly after the sync time so the
/// carried edits still classify as unsynced — the follow-up round their
/// mutation already scheduled uploads them.
fn carry_forward_edits(
    snapshot: &LocalFavorites,
    current: &LocalFavorites,
    mut reconciled: LocalFavorites,
) -> LocalFavorites {
    if current == snapshot {
        return reconciled;
    }
    for id in current.ids.difference(&snapshot.ids) {
        reconciled.ids.insert(id.clone());
    }
    for id in snapshot.ids.difference(&current.ids) {
        reconciled.ids.remove(id);
    }
    reconciled.update_ms = current.update_ms.max(reconciled.sync_ms + 1);
    reconciled
}
