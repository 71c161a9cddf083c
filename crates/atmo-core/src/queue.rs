//! Bounded multi-producer, multi-consumer work queue.
//!
//! Every operation that can block takes a timeout so callers get back control
//! often enough to re-check the stop/kill signals.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use std::time::Duration;

use crate::item::WorkItem;

/// Cloneable handle to one bounded queue of work items.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    tx: Sender<WorkItem>,
    rx: Receiver<WorkItem>,
}

impl WorkQueue {
    /// Queue holding at most `capacity` items (at least 1).
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Push `item`, waiting up to `timeout` for space. Returns the item back
    /// when the queue stayed full.
    pub fn push_timeout(&self, item: WorkItem, timeout: Duration) -> Result<(), WorkItem> {
        match self.tx.send_timeout(item, timeout) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(item)) | Err(SendTimeoutError::Disconnected(item)) => {
                Err(item)
            }
        }
    }

    /// Pop one item, waiting up to `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<WorkItem> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Pop one item without waiting. Each item is handed to exactly one caller.
    pub fn try_pop(&self) -> Option<WorkItem> {
        self.rx.try_recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}
