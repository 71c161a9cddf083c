//! Worker loop: pull items, run the attempt loop, record stats.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::guard::LiveGuard;
use crate::control::CancelSignals;
use crate::item::WorkItem;
use crate::queue::WorkQueue;
use crate::retry::{run_attempts, RetryPolicy, TransferError};
use crate::stats::{human_readable, StatsCollection};
use crate::storage;
use crate::store::{ObjectStore, StoreFactory};
use crate::transfer;

/// Everything one worker thread owns.
pub(super) struct Worker<F> {
    pub(super) id: usize,
    pub(super) queue: WorkQueue,
    pub(super) signals: Arc<CancelSignals>,
    pub(super) factory: Arc<F>,
    pub(super) retry: RetryPolicy,
    pub(super) overwrite: bool,
    pub(super) poll_interval: Duration,
    pub(super) _live: LiveGuard,
}

impl<F: StoreFactory> Worker<F> {
    /// Runs until stop with an empty queue, or kill. Returns this worker's stats.
    pub(super) fn run(self) -> StatsCollection {
        let span = tracing::info_span!("worker", id = self.id);
        let _enter = span.enter();

        let mut stats = StatsCollection::new();
        // Without a session the worker stays up and fails its items, so every
        // dequeued item is still resolved.
        let mut store = match self.factory.connect() {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!("could not open store session: {:#}", e);
                None
            }
        };

        loop {
            if self.signals.kill_requested() {
                break;
            }
            if self.signals.stop_requested() && self.queue.is_empty() {
                break;
            }
            let Some(item) = self.queue.pop_timeout(self.poll_interval) else {
                continue;
            };
            if self.signals.kill_requested() {
                tracing::error!("{}: cancelled before transfer", item.remote_key);
                stats.entry(&item.label).record_failure();
                continue;
            }
            self.process(store.as_mut(), &item, &mut stats);
        }

        if self.signals.kill_requested() {
            while let Some(item) = self.queue.try_pop() {
                tracing::error!("{}: cancelled, not transferred", item.remote_key);
                stats.entry(&item.label).record_failure();
            }
        }

        tracing::debug!("worker exiting: {}", stats.totals());
        stats
    }

    fn process(&self, store: Option<&mut F::Store>, item: &WorkItem, stats: &mut StatsCollection) {
        let path = item.local_path();
        if !self.overwrite && path.exists() {
            tracing::debug!("{} already downloaded", path.display());
            stats.entry(&item.label).record_success(0, Duration::ZERO);
            return;
        }
        let Some(store) = store else {
            tracing::error!("{}: no store session", item.remote_key);
            stats.entry(&item.label).record_failure();
            return;
        };

        let started = Instant::now();
        let max = self.retry.max_attempts;
        let report = run_attempts(&self.retry, &self.signals, |attempt| {
            tracing::debug!("{}: attempt {} of {}", item.remote_key, attempt, max);
            let result = attempt_contained(&mut *store, item);
            if let Err(e) = &result {
                tracing::warn!(
                    "{}: attempt {} of {} failed ({}): {}",
                    item.remote_key,
                    attempt,
                    max,
                    if e.is_local() { "local" } else { "remote" },
                    e
                );
            }
            result
        });

        match report.result {
            Ok(bytes) => {
                let elapsed = started.elapsed();
                tracing::info!(
                    "{} ({}) downloaded in {:.1}s at {}",
                    item.remote_key,
                    human_readable(bytes, None),
                    elapsed.as_secs_f64(),
                    human_readable(bytes, Some(elapsed)),
                );
                stats.entry(&item.label).record_success(bytes, elapsed);
            }
            Err(e) => {
                tracing::error!(
                    "{} failed after {} attempt(s): {}",
                    item.remote_key,
                    report.attempts,
                    e
                );
                storage::remove_partial(path);
                stats.entry(&item.label).record_failure();
            }
        }
    }
}

/// One transfer attempt with panics turned into a failed attempt.
fn attempt_contained<S: ObjectStore + ?Sized>(
    store: &mut S,
    item: &WorkItem,
) -> Result<u64, TransferError> {
    match panic::catch_unwind(AssertUnwindSafe(|| transfer::attempt(store, item))) {
        Ok(result) => result,
        Err(_) => {
            storage::remove_partial(item.local_path());
            Err(TransferError::Transport("transfer panicked".to_string()))
        }
    }
}
