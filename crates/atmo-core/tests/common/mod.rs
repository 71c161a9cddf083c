#![allow(dead_code)]

pub mod range_server;

use std::sync::Arc;
use std::time::Duration;

use atmo_core::retry::RetryPolicy;
use atmo_core::store::{MemoryBucket, MemoryStore};
use atmo_core::SchedulerOptions;

/// Deterministic object body of `len` bytes.
pub fn body(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Scheduler options with a short poll interval so tests finish quickly.
pub fn options(workers: usize, queue_capacity: usize, max_attempts: u32) -> SchedulerOptions {
    SchedulerOptions {
        workers,
        queue_capacity,
        retry: RetryPolicy::with_max_attempts(max_attempts),
        overwrite: false,
        poll_interval: Duration::from_millis(20),
    }
}

/// Store factory handing every worker a session on `bucket`.
pub fn memory_factory(
    bucket: &MemoryBucket,
) -> impl Fn() -> anyhow::Result<MemoryStore> + Send + Sync + 'static {
    let bucket = bucket.clone();
    move || Ok(bucket.store())
}

/// Like `memory_factory`, but each `connect` first waits on `gate` so a test
/// can act before any worker is ready.
pub fn gated_factory(
    bucket: &MemoryBucket,
    gate: Arc<std::sync::RwLock<()>>,
) -> impl Fn() -> anyhow::Result<MemoryStore> + Send + Sync + 'static {
    let bucket = bucket.clone();
    move || {
        let _open = gate.read().unwrap_or_else(|e| e.into_inner());
        Ok(bucket.store())
    }
}
