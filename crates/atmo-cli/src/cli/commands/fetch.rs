//! `atmo fetch <manifest>` – download everything a manifest lists.

use anyhow::{Context, Result};
use atmo_core::config::AtmoConfig;
use atmo_core::manifest::Manifest;
use atmo_core::store::CurlStoreFactory;
use std::path::{Path, PathBuf};

use super::{resolve_bucket, run_items, scheduler_options};
use crate::cli::report::print_report;
use crate::cli::RunArgs;

/// Returns whether every item succeeded.
pub async fn run_fetch(
    cfg: &AtmoConfig,
    manifest_path: &Path,
    out: Option<PathBuf>,
    bucket: Option<String>,
    run: &RunArgs,
) -> Result<bool> {
    let manifest = Manifest::load(manifest_path)?;
    let bucket = resolve_bucket(cfg, bucket, manifest.bucket.clone())?;
    let items = manifest.into_items(out.as_deref())?;
    if items.is_empty() {
        println!("Manifest lists no items.");
        return Ok(true);
    }
    tracing::info!("fetching {} item(s) from {}", items.len(), bucket);

    let opts = scheduler_options(cfg, run);
    let factory = CurlStoreFactory::from_config(cfg, &bucket)?;
    let report = tokio::task::spawn_blocking(move || run_items(opts, factory, items))
        .await
        .context("fetch task join")??;

    print_report(&report, run.json)?;
    Ok(report.all_succeeded())
}
