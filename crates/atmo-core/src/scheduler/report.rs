//! Final report returned by `Scheduler::wait`.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::stats::{human_readable, serialize_secs, StatsCollection};

/// Merged outcome of one scheduler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalReport {
    pub success_count: u64,
    pub failure_count: u64,
    /// Bytes transferred by successful items.
    pub total_bytes: u64,
    /// Wall-clock time from scheduler start to the end of `wait`.
    #[serde(serialize_with = "serialize_secs", rename = "elapsed_secs")]
    pub elapsed: Duration,
    /// Per-label breakdown.
    pub labels: StatsCollection,
    /// Workers that died without reporting; they contribute nothing above.
    pub lost_workers: usize,
}

impl FinalReport {
    pub(crate) fn new(labels: StatsCollection, elapsed: Duration, lost_workers: usize) -> Self {
        let totals = labels.totals();
        Self {
            success_count: totals.success_count,
            failure_count: totals.failure_count,
            total_bytes: totals.total_bytes,
            elapsed,
            labels,
            lost_workers,
        }
    }

    /// Items resolved as success or failure.
    pub fn resolved(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// True when nothing failed and every worker reported.
    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0 && self.lost_workers == 0
    }
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed - {} in {:.1}s ({})",
            self.success_count,
            self.failure_count,
            human_readable(self.total_bytes, None),
            self.elapsed.as_secs_f64(),
            human_readable(self.total_bytes, Some(self.elapsed)),
        )?;
        if self.lost_workers > 0 {
            write!(f, " - {} worker(s) lost", self.lost_workers)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> StatsCollection {
        let mut c = StatsCollection::new();
        c.entry("KHGX").record_success(2_000_000, Duration::from_secs(1));
        c.entry("KHGX").record_failure();
        c.entry("KTLX").record_success(1_000_000, Duration::from_secs(1));
        c
    }

    #[test]
    fn totals_come_from_labels() {
        let r = FinalReport::new(labels(), Duration::from_secs(2), 0);
        assert_eq!(r.success_count, 2);
        assert_eq!(r.failure_count, 1);
        assert_eq!(r.total_bytes, 3_000_000);
        assert_eq!(r.resolved(), 3);
        assert!(!r.all_succeeded());
    }

    #[test]
    fn display_summary() {
        let r = FinalReport::new(labels(), Duration::from_secs(2), 1);
        assert_eq!(
            r.to_string(),
            "2 succeeded, 1 failed - 3.0 MB in 2.0s (1.5 MB/s) - 1 worker(s) lost"
        );
    }

    #[test]
    fn serializes_labels_and_elapsed() {
        let r = FinalReport::new(labels(), Duration::from_millis(1500), 0);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["success_count"], 2);
        assert_eq!(json["elapsed_secs"], 1.5);
        assert_eq!(json["labels"]["KTLX"]["total_bytes"], 1_000_000);
    }
}
