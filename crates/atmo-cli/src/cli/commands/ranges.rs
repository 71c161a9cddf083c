//! `atmo ranges` – show which byte ranges a `grib` run would fetch.

use anyhow::{Context, Result};
use atmo_core::config::AtmoConfig;
use atmo_core::stats::human_readable;
use atmo_core::store::{CurlStoreFactory, StoreFactory};

use super::{resolve_bucket, select_from_bucket};

pub async fn run_ranges(
    cfg: &AtmoConfig,
    bucket: Option<String>,
    key: &str,
    patterns: &[String],
    json: bool,
) -> Result<()> {
    let bucket = resolve_bucket(cfg, bucket, None)?;
    let factory = CurlStoreFactory::from_config(cfg, &bucket)?;
    let selection = tokio::task::spawn_blocking({
        let key = key.to_string();
        let patterns = patterns.to_vec();
        move || -> Result<_> {
            let mut store = factory.connect()?;
            select_from_bucket(&mut store, &key, &patterns)
        }
    })
    .await
    .context("ranges task join")??;

    let Some(selection) = selection else {
        println!("No inventory record matches the given patterns.");
        return Ok(());
    };
    if json {
        let value = serde_json::json!({
            "key": key,
            "ranges": selection.ranges,
            "total_bytes": selection.total_len(),
            "idx": selection.idx_text(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("{:<24} {:>12}", "RANGE", "SIZE");
    for r in &selection.ranges {
        println!(
            "{:<24} {:>12}",
            r.range_header_value(),
            human_readable(r.len(), None)
        );
    }
    println!("total {}", human_readable(selection.total_len(), None));
    print!("{}", selection.idx_text());
    Ok(())
}
