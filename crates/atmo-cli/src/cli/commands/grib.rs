//! `atmo grib` – fetch selected messages of one GRIB2 file via its `.idx`.

use anyhow::{Context, Result};
use atmo_core::config::AtmoConfig;
use atmo_core::store::{CurlStoreFactory, StoreFactory};
use atmo_core::WorkItem;
use std::path::{Path, PathBuf};

use super::{resolve_bucket, run_items, scheduler_options, select_from_bucket};
use crate::cli::report::print_report;
use crate::cli::RunArgs;

/// Local path for `key` when `--out` is not given: its file name in the cwd.
fn default_out(key: &str) -> PathBuf {
    PathBuf::from(key.rsplit('/').next().unwrap_or(key))
}

fn idx_path(out: &Path) -> PathBuf {
    let mut o = out.as_os_str().to_owned();
    o.push(".idx");
    PathBuf::from(o)
}

pub async fn run_grib(
    cfg: &AtmoConfig,
    bucket: Option<String>,
    key: &str,
    patterns: &[String],
    out: Option<PathBuf>,
    label: &str,
    run: &RunArgs,
) -> Result<bool> {
    let bucket = resolve_bucket(cfg, bucket, None)?;
    let factory = CurlStoreFactory::from_config(cfg, &bucket)?;
    let opts = scheduler_options(cfg, run);
    let out = out.unwrap_or_else(|| default_out(key));
    let key = key.to_string();
    let patterns = patterns.to_vec();
    let label = label.to_string();

    let outcome = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut store = factory.connect()?;
        let Some(selection) = select_from_bucket(&mut store, &key, &patterns)? else {
            return Ok(None);
        };
        tracing::info!(
            "{}: {} message(s), {} range(s)",
            key,
            selection.records.len(),
            selection.ranges.len()
        );
        let item = WorkItem::chunked(label, key, &out, selection.ranges.clone());
        let report = run_items(opts, factory, vec![item])?;
        if report.all_succeeded() {
            let idx = idx_path(&out);
            std::fs::write(&idx, selection.idx_text())
                .with_context(|| format!("write {}", idx.display()))?;
        }
        Ok(Some(report))
    })
    .await
    .context("grib task join")??;

    match outcome {
        Some(report) => {
            print_report(&report, run.json)?;
            Ok(report.all_succeeded())
        }
        None => {
            eprintln!("No inventory record matches the given patterns.");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_out_is_file_name() {
        assert_eq!(
            default_out("hrrr.20190706/conus/hrrr.t00z.wrfsfcf00.grib2"),
            PathBuf::from("hrrr.t00z.wrfsfcf00.grib2")
        );
        assert_eq!(default_out("plain"), PathBuf::from("plain"));
    }

    #[test]
    fn idx_path_appends_suffix() {
        assert_eq!(
            idx_path(Path::new("/data/subset.grib2")),
            PathBuf::from("/data/subset.grib2.idx")
        );
    }
}
