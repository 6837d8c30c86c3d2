//! Credential state read by the sync layer.
//!
//! The engine only ever *reads* auth state — sign-in is triggered by the
//! caller. A missing credential is an expected state that skips sync, never
//! an error.

use parking_lot::RwLock;

/// Read-only view of the current credential state.
pub trait AuthProvider: Send + Sync {
    /// Bearer credential for remote requests, if signed in.
    fn bearer_token(&self) -> Option<String>;

    fn is_logged_in(&self) -> bool {
        self.bearer_token().is_some()
    }
}

/// In-process token holder — the caller's sign-in flow sets and clears it.
#[derive(Default)]
pub struct AccessTokenStore {
    token: RwLock<Option<String>>,
}

impl AccessTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write() = None;
    }
}

impl AuthProvider for AccessTokenStore {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
