use thiserror::Error;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

// ---------------------------------------------------------------------------
// RemoteError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RemoteError {
    /// No bearer credential is available. Callers treat this as an expected
    /// state, not a failure — sync is skipped until sign-in completes.
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote document created without an id")]
    MissingDocumentId,
}

// ---------------------------------------------------------------------------
// FavSyncError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FavSyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Convenience alias — the default error type is `FavSyncError`.
pub type Result<T, E = FavSyncError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
