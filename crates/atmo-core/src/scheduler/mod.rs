//! Worker pool scheduler.
//!
//! Owns the bounded work queue, a fixed pool of worker threads and the
//! stop/kill signals. Producers call `enqueue`; `wait` stops the pool, joins
//! every worker and merges their statistics into a [`FinalReport`].

mod guard;
mod report;
mod worker;

pub use report::FinalReport;

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::AtmoConfig;
use crate::control::{CancelSignals, ShutdownHandle};
use crate::item::WorkItem;
use crate::queue::WorkQueue;
use crate::retry::RetryPolicy;
use crate::stats::StatsCollection;
use crate::store::StoreFactory;
use guard::LiveGuard;
use worker::Worker;

/// Upper bound on how long any queue call blocks before re-checking signals.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Runtime options for one scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub workers: usize,
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
    /// Transfer items whose `local_path` already exists.
    pub overwrite: bool,
    /// Queue timeout; clamped to 1ms..=1s.
    pub poll_interval: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from_config(&AtmoConfig::default())
    }
}

impl SchedulerOptions {
    pub fn from_config(cfg: &AtmoConfig) -> Self {
        Self {
            workers: cfg.workers,
            queue_capacity: cfg.queue_capacity,
            retry: RetryPolicy::from(&cfg.retry_or_default()),
            overwrite: cfg.overwrite,
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
        }
    }

    fn effective_poll_interval(&self) -> Duration {
        self.poll_interval
            .clamp(Duration::from_millis(1), MAX_POLL_INTERVAL)
    }
}

/// Why `enqueue` gave up on an item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("run was killed; stop producing items")]
    Killed,
    #[error("no worker is running")]
    NoLiveWorkers,
}

/// A running worker pool.
pub struct Scheduler {
    queue: WorkQueue,
    signals: Arc<CancelSignals>,
    live: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<StatsCollection>>,
    poll_interval: Duration,
    enqueued: AtomicU64,
    started: Instant,
}

impl Scheduler {
    /// Spawns `opts.workers` threads, each opening its own store through
    /// `factory` on its own thread.
    pub fn start<F: StoreFactory>(opts: SchedulerOptions, factory: F) -> Result<Self> {
        if opts.workers == 0 {
            anyhow::bail!("worker count must be at least 1");
        }
        let poll_interval = opts.effective_poll_interval();
        let queue = WorkQueue::bounded(opts.queue_capacity);
        let signals = Arc::new(CancelSignals::new());
        let live = Arc::new(AtomicUsize::new(0));
        let factory = Arc::new(factory);

        let mut workers = Vec::with_capacity(opts.workers);
        for id in 0..opts.workers {
            let worker = Worker {
                id,
                queue: queue.clone(),
                signals: Arc::clone(&signals),
                factory: Arc::clone(&factory),
                retry: opts.retry,
                overwrite: opts.overwrite,
                poll_interval,
                _live: LiveGuard::new(&live),
            };
            let spawned = std::thread::Builder::new()
                .name(format!("atmo-worker-{}", id))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    signals.request_kill();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(e).with_context(|| format!("spawn worker {}", id));
                }
            }
        }
        tracing::debug!(
            "scheduler started: {} workers, queue capacity {}, {} attempt(s) per item",
            opts.workers,
            opts.queue_capacity.max(1),
            opts.retry.max_attempts
        );

        Ok(Self {
            queue,
            signals,
            live,
            workers,
            poll_interval,
            enqueued: AtomicU64::new(0),
            started: Instant::now(),
        })
    }

    /// Queue `item`, blocking while the queue is full. Gives up when the run
    /// is killed or no worker is left to consume it.
    pub fn enqueue(&self, item: WorkItem) -> Result<(), EnqueueError> {
        let mut item = item;
        loop {
            if self.signals.kill_requested() {
                return Err(EnqueueError::Killed);
            }
            if self.live.load(Ordering::SeqCst) == 0 {
                return Err(EnqueueError::NoLiveWorkers);
            }
            match self.queue.push_timeout(item, self.poll_interval) {
                Ok(()) => {
                    self.enqueued.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                Err(back) => item = back,
            }
        }
    }

    /// Workers exit once the queue is empty. Idempotent.
    pub fn request_stop(&self) {
        self.signals.request_stop();
    }

    /// Abort: no new attempts start and queued items are drained as failures.
    /// Idempotent.
    pub fn request_kill(&self) {
        self.signals.request_kill();
    }

    /// Handle for requesting stop/kill from other threads.
    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(Arc::clone(&self.signals))
    }

    /// Items accepted by `enqueue` so far.
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Workers still running.
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Requests stop, joins every worker and merges their statistics.
    /// Items still queued after the workers are gone count as failures.
    pub fn wait(mut self) -> FinalReport {
        self.signals.request_stop();

        let mut stats = StatsCollection::new();
        let mut lost = 0usize;
        for (id, handle) in std::mem::take(&mut self.workers).into_iter().enumerate() {
            match handle.join() {
                Ok(worker_stats) => stats += worker_stats,
                Err(_) => {
                    tracing::warn!("worker {} died without reporting; counting it as zero", id);
                    lost += 1;
                }
            }
        }

        while let Some(item) = self.queue.try_pop() {
            tracing::error!("{}: left in queue, not transferred", item.remote_key);
            stats.entry(&item.label).record_failure();
        }

        let report = FinalReport::new(stats, self.started.elapsed(), lost);
        if report.all_succeeded() {
            tracing::info!("run finished: {}", report);
        } else {
            tracing::warn!("run finished: {}", report);
        }
        report
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        // Dropped without wait(): do not leave threads polling forever.
        self.signals.request_kill();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
