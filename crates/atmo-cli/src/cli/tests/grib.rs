//! Tests for grib, ranges and completions subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;

#[test]
fn cli_parse_grib_patterns() {
    match parse(&[
        "atmo",
        "grib",
        "--bucket",
        "noaa-hrrr-bdp-pds",
        "--key",
        "hrrr.20190706/conus/hrrr.t00z.wrfsfcf00.grib2",
        "--pattern",
        "TMP:2 m",
        "--pattern",
        "[UV]GRD:10 m",
    ]) {
        CliCommand::Grib {
            bucket,
            key,
            patterns,
            out,
            label,
            run,
        } => {
            assert_eq!(bucket.as_deref(), Some("noaa-hrrr-bdp-pds"));
            assert_eq!(key, "hrrr.20190706/conus/hrrr.t00z.wrfsfcf00.grib2");
            assert_eq!(patterns, ["TMP:2 m", "[UV]GRD:10 m"]);
            assert!(out.is_none());
            assert_eq!(label, "grib");
            assert!(run.workers.is_none());
        }
        _ => panic!("expected Grib"),
    }
}

#[test]
fn cli_parse_grib_requires_pattern() {
    assert!(Cli::try_parse_from(["atmo", "grib", "--key", "k"]).is_err());
}

#[test]
fn cli_parse_ranges() {
    match parse(&["atmo", "ranges", "--key", "k", "--pattern", "APCP", "--json"]) {
        CliCommand::Ranges {
            bucket,
            key,
            patterns,
            json,
        } => {
            assert!(bucket.is_none());
            assert_eq!(key, "k");
            assert_eq!(patterns, ["APCP"]);
            assert!(json);
        }
        _ => panic!("expected Ranges"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["atmo", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
