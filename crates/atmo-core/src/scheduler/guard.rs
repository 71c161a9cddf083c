//! RAII guard that tracks live worker threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts one live worker; decrements the shared count when dropped, whether
/// the worker returns normally, unwinds, or is never spawned.
pub(super) struct LiveGuard {
    live: Arc<AtomicUsize>,
}

impl LiveGuard {
    pub(super) fn new(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            live: Arc::clone(live),
        }
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
