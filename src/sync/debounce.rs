//! Restartable delayed-task scheduling.
//!
//! A `Debouncer` wraps an async task factory behind a single pending timer:
//! every `call` restarts the delay and drops the previous pending timer, so
//! a burst of calls produces one firing per quiet period. Once the delay has
//! elapsed the work is spawned as a detached task — a later `call` or
//! `cancel` no longer affects it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

type TaskFactory = dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync;

/// Coalesces rapid calls into one delayed firing. Must be used from within a
/// tokio runtime.
pub struct Debouncer {
    delay: Duration,
    factory: Arc<TaskFactory>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new<F, Fut>(delay: Duration, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            factory: Arc::new(move || Box::pin(f())),
            pending: Mutex::new(None),
        }
    }

    /// (Re)start the delay, dropping any pending timer that has not fired.
    pub fn call(&self) {
        let delay = self.delay;
        let factory = Arc::clone(&self.factory);

        let mut pending = self.pending.lock();
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Spawn the work detached: once the delay has elapsed, aborting
            // this timer task can no longer cancel the work itself.
            tokio::spawn(factory());
        }));
    }

    /// Drop the pending timer, if any. Work that already fired keeps running.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
