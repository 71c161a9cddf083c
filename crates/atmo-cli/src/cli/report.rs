//! Final report output.

use anyhow::Result;
use atmo_core::stats::human_readable;
use atmo_core::FinalReport;

pub fn print_report(report: &FinalReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if !report.labels.is_empty() {
        println!(
            "{:<20} {:>8} {:>8} {:>12} {:>12}",
            "LABEL", "OK", "FAILED", "SIZE", "RATE"
        );
        for (label, s) in report.labels.iter() {
            println!(
                "{:<20} {:>8} {:>8} {:>12} {:>12}",
                label,
                s.success_count,
                s.failure_count,
                human_readable(s.total_bytes, None),
                human_readable(s.total_bytes, Some(s.total_elapsed)),
            );
        }
    }
    println!("{}", report);
    Ok(())
}
