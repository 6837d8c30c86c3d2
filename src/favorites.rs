//! In-memory favorite set with write-through persistence and coalesced sync.
//!
//! `FavoriteService` owns the authoritative record, the pending-removal
//! overlay, the per-id eviction timers, and the sync coordinator. Mutations
//! are non-blocking: they persist locally right away and schedule a delayed
//! reconciliation round.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::auth::AuthProvider;
use crate::store::LocalStore;
use crate::sync::coordinator::SyncCoordinator;
use crate::sync::debounce::Debouncer;
use crate::sync::types::{RemoteStore, SyncOutcome};
use crate::types::{now_ms, LocalFavorites, FAVORITES_KEY};

/// Timing knobs, overridable for tests.
#[derive(Debug, Clone)]
pub struct FavoriteServiceOptions {
    /// Quiet period before a burst of mutations triggers one sync round.
    pub sync_delay: Duration,
    /// How long a removed id stays visible in the view for undo.
    pub removal_grace: Duration,
}

impl Default for FavoriteServiceOptions {
    fn default() -> Self {
        Self {
            sync_delay: Duration::from_millis(3000),
            removal_grace: Duration::from_millis(8080),
        }
    }
}

pub struct FavoriteService {
    inner: Arc<Inner>,
    /// Coalesces rapid mutations into one sync round per quiet period.
    sync_debounce: Debouncer,
}

struct Inner {
    record: Arc<Mutex<LocalFavorites>>,
    /// Just-removed ids still shown (crossed out) during the grace window.
    removing: Mutex<BTreeSet<String>>,
    /// One independent, restartable eviction timer per removed id.
    evictors: Mutex<HashMap<String, Debouncer>>,
    coordinator: Arc<SyncCoordinator>,
    local_store: Arc<dyn LocalStore>,
    removal_grace: Duration,
}

impl FavoriteService {
    /// Build the service, loading the record from the local store (or empty
    /// defaults). Must be called from within a tokio runtime — mutations
    /// spawn timer tasks.
    pub fn new(
        local_store: Arc<dyn LocalStore>,
        remote_store: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        options: FavoriteServiceOptions,
    ) -> Self {
        let record = Arc::new(Mutex::new(Self::load(local_store.as_ref())));
        let coordinator = Arc::new(SyncCoordinator::new(
            Arc::clone(&local_store),
            remote_store,
            auth,
            Arc::clone(&record),
        ));

        let sync_debounce = {
            let coordinator = Arc::clone(&coordinator);
            Debouncer::new(options.sync_delay, move || {
                let coordinator = Arc::clone(&coordinator);
                async move {
                    coordinator.try_sync().await;
                }
            })
        };

        Self {
            inner: Arc::new(Inner {
                record,
                removing: Mutex::new(BTreeSet::new()),
                evictors: Mutex::new(HashMap::new()),
                coordinator,
                local_store,
                removal_grace: options.removal_grace,
            }),
            sync_debounce,
        }
    }

    fn load(store: &dyn LocalStore) -> LocalFavorites {
        match store.read(FAVORITES_KEY) {
            Ok(Some(text)) => LocalFavorites::from_json(&text),
            Ok(None) => LocalFavorites::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read favorites record, using defaults");
                LocalFavorites::default()
            }
        }
    }

    /// Mark a song as favorite. No-op if already a member.
    pub fn add(&self, id: &str) {
        {
            let mut record = self.inner.record.lock();
            if !record.ids.insert(id.to_string()) {
                return;
            }
            record.update_ms = now_ms();
            self.inner.persist(&record);
        }

        // A re-added id must not be evicted by a stale removal timer.
        self.inner.removing.lock().remove(id);
        self.inner.evictors.lock().remove(id);

        self.sync_debounce.call();
    }

    /// Unmark a favorite. The id stays in the view for the grace window so
    /// the caller can offer undo. No-op if not a member.
    pub fn remove(&self, id: &str) {
        {
            let mut record = self.inner.record.lock();
            if !record.ids.remove(id) {
                return;
            }
            record.update_ms = now_ms();
            self.inner.persist(&record);
        }

        self.inner.removing.lock().insert(id.to_string());
        {
            let mut evictors = self.inner.evictors.lock();
            let evictor = evictors
                .entry(id.to_string())
                .or_insert_with(|| Self::make_evictor(&self.inner, id));
            evictor.call();
        }

        self.sync_debounce.call();
    }

    fn make_evictor(inner: &Arc<Inner>, id: &str) -> Debouncer {
        let weak = Arc::downgrade(inner);
        let id = id.to_string();
        Debouncer::new(inner.removal_grace, move || {
            let weak = weak.clone();
            let id = id.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.removing.lock().remove(&id);
                    inner.evictors.lock().remove(&id);
                }
            }
        })
    }

    /// The set the UI renders: favorites plus ids in their removal grace
    /// window.
    pub fn view(&self) -> BTreeSet<String> {
        let record = self.inner.record.lock();
        let removing = self.inner.removing.lock();
        record.ids.union(&removing).cloned().collect()
    }

    /// Whether the id is a favorite (ignoring the grace-window overlay).
    pub fn is_favorite(&self, id: &str) -> bool {
        self.inner.record.lock().ids.contains(id)
    }

    /// Whether the id is in its removal grace window.
    pub fn is_removing(&self, id: &str) -> bool {
        self.inner.removing.lock().contains(id)
    }

    /// Snapshot of the durable record.
    pub fn record(&self) -> LocalFavorites {
        self.inner.record.lock().clone()
    }

    /// Bypass the coalescing delay and run a sync round now.
    pub async fn sync_now(&self) -> SyncOutcome {
        self.inner.coordinator.try_sync().await
    }
}

impl Inner {
    fn persist(&self, record: &LocalFavorites) {
        if let Err(e) = self.local_store.write(FAVORITES_KEY, &record.to_json()) {
            tracing::warn!(error = %e, "failed to persist favorites record");
        }
    }
}
