//! Sync-specific types: the remote store trait and the round outcome.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::types::DocumentHandle;

// ============================================================================
// RemoteStore — cloud document API
// ============================================================================

/// Key-value-like cloud document store addressed by a stable logical name.
///
/// Implementations handle the provider round-trips (HTTP, auth headers). An
/// absent document is reported as `Ok(None)` from `find_by_name` — absence is
/// normal control flow, not an error.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Resolve the handle of the document with the given logical name.
    async fn find_by_name(&self, name: &str) -> Result<Option<DocumentHandle>, RemoteError>;

    /// Download the document's content.
    async fn download(&self, handle: &DocumentHandle) -> Result<Vec<u8>, RemoteError>;

    /// Create a new document inside the given parent folder and return its
    /// handle.
    async fn create(
        &self,
        name: &str,
        parent_folder: &str,
        content: &[u8],
    ) -> Result<DocumentHandle, RemoteError>;

    /// Replace the content of an existing document in place.
    async fn update(&self, handle: &DocumentHandle, content: &[u8]) -> Result<(), RemoteError>;
}

// ============================================================================
// SyncOutcome
// ============================================================================

/// Tri-state result of a sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A round was already in flight — this call was dropped, not queued.
    Skipped,
    /// The round did not reach the remote store (logged out, or a caught
    /// transport failure). Local state stays authoritative.
    Unsynced,
    /// The round completed and local/remote converged.
    Synced,
}

impl SyncOutcome {
    /// Numeric code exposed to callers: `0` skipped, `-1` unsynced, `1` synced.
    pub fn code(self) -> i32 {
        match self {
            SyncOutcome::Skipped => 0,
            SyncOutcome::Unsynced => -1,
            SyncOutcome::Synced => 1,
        }
    }
}
