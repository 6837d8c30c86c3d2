//! Core record types shared across the crate.
//!
//! `LocalFavorites` is the durable local truth, `RemoteFavorites` the durable
//! remote truth. Both parse defensively: a corrupt or partial document
//! degrades to zeroed stamps and an empty set instead of a parse error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Key under which the serialized `LocalFavorites` record lives in the
/// local store.
pub const FAVORITES_KEY: &str = "favorites";

/// Logical name of the shared remote document (one per user).
pub const REMOTE_DOCUMENT_NAME: &str = "hanon-uta-favorites.json";

/// Application-private remote folder the document is created in.
pub const REMOTE_PARENT_FOLDER: &str = "appDataFolder";

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ============================================================================
// DocumentHandle
// ============================================================================

/// Opaque identifier of the remote document, used for update-in-place.
/// Resolved lazily by name lookup when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// LocalFavorites
// ============================================================================

/// The durable local record.
///
/// Wire shape: `{"updateMs": n, "syncMs": n, "version": n, "ids": [..]}`.
/// `ids` serializes as a sorted sequence; the order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFavorites {
    /// Epoch-ms of the most recent local mutation. `0` = never mutated.
    #[serde(rename = "updateMs", default)]
    pub update_ms: i64,

    /// Epoch-ms of the most recent completed reconciliation. `0` = never synced.
    #[serde(rename = "syncMs", default)]
    pub sync_ms: i64,

    /// Bumped on every reconciliation that changes the agreed set.
    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub ids: BTreeSet<String>,
}

impl LocalFavorites {
    /// Parse a persisted record, falling back to empty defaults on corrupt
    /// or empty input.
    pub fn from_json(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match serde_json::from_str(trimmed) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "corrupt local favorites record, using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize local favorites record");
                "{}".to_string()
            }
        }
    }
}

// ============================================================================
// RemoteFavorites
// ============================================================================

/// The durable remote record. Fetched fresh on every reconciliation round
/// and discarded after use.
///
/// Wire shape: `{"updateMs": n, "version": n, "ids": [..]}` — the remote side
/// has no notion of "last synced", only "current version".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFavorites {
    #[serde(rename = "updateMs", default)]
    pub update_ms: i64,

    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub ids: BTreeSet<String>,

    /// Handle of the document this record was downloaded from, if any.
    /// Not part of the wire shape.
    #[serde(skip)]
    pub handle: Option<DocumentHandle>,
}

impl RemoteFavorites {
    /// Parse a downloaded document, falling back to empty defaults on
    /// corrupt input.
    pub fn from_json_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "corrupt remote favorites document, using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize remote favorites record");
                "{}".to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
