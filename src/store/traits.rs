//! Local persistence trait.
//!
//! The engine keeps a single JSON-serialized record under a fixed key. Reads
//! and writes are synchronous — backends are expected to be fast local
//! storage, not network stores.

use crate::error::StoreError;

/// Durable string key-value storage for the engine's records.
///
/// Implementors must be `Send + Sync` so the store can be shared with the
/// background sync task.
pub trait LocalStore: Send + Sync {
    /// Fetch the value stored under `key`. Returns `None` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Persist (insert or replace) `value` under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
