//! Run control: the two shutdown signals shared by the scheduler and its workers.
//!
//! Both flags are monotone. `stop` asks workers to exit once the queue is
//! empty; `kill` asks them to stop starting transfers and drain what is left
//! as failures. Setting a flag is a single atomic store, so it is safe from a
//! signal handler or any thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop/kill flags for one scheduler run.
#[derive(Debug, Default)]
pub struct CancelSignals {
    stop: AtomicBool,
    kill: AtomicBool,
}

impl CancelSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn request_kill(&self) {
        self.kill.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn kill_requested(&self) -> bool {
        self.kill.load(Ordering::SeqCst)
    }
}

/// Cloneable handle that lets other threads (e.g. a Ctrl-C handler) request
/// stop or kill without holding the scheduler itself.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    signals: Arc<CancelSignals>,
}

impl ShutdownHandle {
    pub(crate) fn new(signals: Arc<CancelSignals>) -> Self {
        Self { signals }
    }

    pub fn request_stop(&self) {
        self.signals.request_stop();
    }

    pub fn request_kill(&self) {
        self.signals.request_kill();
    }

    pub fn kill_requested(&self) -> bool {
        self.signals.kill_requested()
    }
}
