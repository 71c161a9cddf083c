//! CLI command handlers.

mod completions;
mod fetch;
mod grib;
mod ranges;

pub use completions::run_completions;
pub use fetch::run_fetch;
pub use grib::run_grib;
pub use ranges::run_ranges;

use anyhow::{Context, Result};
use atmo_core::config::AtmoConfig;
use atmo_core::idx::{self, IdxSelection};
use atmo_core::store::{ObjectStore, StoreFactory};
use atmo_core::{FinalReport, Scheduler, SchedulerOptions, WorkItem};

use super::{interrupt, RunArgs};

/// Bucket from the command line, then `fallback` (e.g. the manifest), then config.
fn resolve_bucket(
    cfg: &AtmoConfig,
    flag: Option<String>,
    fallback: Option<String>,
) -> Result<String> {
    flag.or(fallback)
        .or_else(|| cfg.bucket.clone())
        .context("no bucket given: pass --bucket or set `bucket` in the config")
}

/// Config-derived scheduler options with command-line overrides applied.
fn scheduler_options(cfg: &AtmoConfig, run: &RunArgs) -> SchedulerOptions {
    let mut opts = SchedulerOptions::from_config(cfg);
    if let Some(n) = run.workers {
        opts.workers = n;
    }
    if let Some(n) = run.attempts {
        opts.retry.max_attempts = n.max(1);
    }
    if run.overwrite {
        opts.overwrite = true;
    }
    opts
}

/// Starts a scheduler, feeds it `items` and waits for the report. Blocking.
fn run_items<F: StoreFactory>(
    opts: SchedulerOptions,
    factory: F,
    items: Vec<WorkItem>,
) -> Result<FinalReport> {
    let sched = Scheduler::start(opts, factory)?;
    interrupt::install(sched.handle())?;
    let total = items.len();
    for item in items {
        if let Err(e) = sched.enqueue(item) {
            tracing::warn!(
                "stopped queueing after {} of {} items: {}",
                sched.enqueued(),
                total,
                e
            );
            break;
        }
    }
    Ok(sched.wait())
}

/// Fetches `<key>.idx`, sizes `key` and selects the records matching `patterns`.
fn select_from_bucket<S: ObjectStore>(
    store: &mut S,
    key: &str,
    patterns: &[String],
) -> Result<Option<IdxSelection>> {
    let idx_key = format!("{}.idx", key);
    let mut raw = Vec::new();
    store
        .get_object(&idx_key, &mut raw)
        .with_context(|| format!("fetch inventory {}", idx_key))?;
    let text =
        String::from_utf8(raw).with_context(|| format!("inventory {} is not UTF-8", idx_key))?;
    let size = store
        .head_object(key)
        .with_context(|| format!("size of {}", key))?;
    let selection = idx::select(&text, patterns, Some(size))
        .with_context(|| format!("select ranges from {}", idx_key))?;
    Ok(selection)
}
