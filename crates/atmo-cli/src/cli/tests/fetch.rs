//! Tests for the fetch subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand, RunArgs};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_fetch_defaults() {
    match parse(&["atmo", "fetch", "radar.toml"]) {
        CliCommand::Fetch {
            manifest,
            out,
            bucket,
            run,
        } => {
            assert_eq!(manifest, Path::new("radar.toml"));
            assert!(out.is_none());
            assert!(bucket.is_none());
            assert_eq!(run, RunArgs::default());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_overrides() {
    match parse(&[
        "atmo",
        "fetch",
        "radar.toml",
        "--out",
        "/data",
        "--bucket",
        "noaa-nexrad-level2",
        "--workers",
        "8",
        "--attempts",
        "5",
        "--overwrite",
        "--json",
    ]) {
        CliCommand::Fetch {
            out, bucket, run, ..
        } => {
            assert_eq!(out.as_deref(), Some(Path::new("/data")));
            assert_eq!(bucket.as_deref(), Some("noaa-nexrad-level2"));
            assert_eq!(run.workers, Some(8));
            assert_eq!(run.attempts, Some(5));
            assert!(run.overwrite);
            assert!(run.json);
        }
        _ => panic!("expected Fetch with overrides"),
    }
}

#[test]
fn cli_parse_fetch_requires_manifest() {
    assert!(Cli::try_parse_from(["atmo", "fetch"]).is_err());
}

#[test]
fn cli_parse_fetch_rejects_bad_worker_count() {
    assert!(Cli::try_parse_from(["atmo", "fetch", "m.toml", "--workers", "many"]).is_err());
}
