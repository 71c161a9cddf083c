//! Transfer statistics keyed by a caller-chosen label.
//!
//! Each worker owns one `StatsCollection` and mutates it without locking.
//! When workers finish, the scheduler merges their collections; merging is a
//! label-wise sum, so it is commutative and associative and the order in
//! which workers report never changes the totals.

mod human;

pub use human::human_readable;

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::time::Duration;

pub(crate) fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Counters for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransferStats {
    pub success_count: u64,
    pub failure_count: u64,
    /// Bytes transferred by successful items.
    pub total_bytes: u64,
    /// Summed transfer time of successful items.
    #[serde(serialize_with = "serialize_secs", rename = "total_elapsed_secs")]
    pub total_elapsed: Duration,
}

impl TransferStats {
    pub fn record_success(&mut self, bytes: u64, elapsed: Duration) {
        self.success_count += 1;
        self.total_bytes += bytes;
        self.total_elapsed += elapsed;
    }

    pub fn record_failure(&mut self) {
        self.failure_count += 1;
    }

    /// Items resolved for this label (succeeded or failed).
    pub fn resolved(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// Average transfer rate in bytes per second (0 if no time was spent).
    pub fn rate(&self) -> f64 {
        let secs = self.total_elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.total_bytes as f64 / secs
    }
}

impl Add for TransferStats {
    type Output = TransferStats;

    fn add(self, other: TransferStats) -> TransferStats {
        TransferStats {
            success_count: self.success_count + other.success_count,
            failure_count: self.failure_count + other.failure_count,
            total_bytes: self.total_bytes + other.total_bytes,
            total_elapsed: self.total_elapsed + other.total_elapsed,
        }
    }
}

impl AddAssign for TransferStats {
    fn add_assign(&mut self, other: TransferStats) {
        *self = *self + other;
    }
}

impl fmt::Display for TransferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "success {} - failed {} - attempts {} - size {} - time {:.1}s - rate {}",
            self.success_count,
            self.failure_count,
            self.resolved(),
            human_readable(self.total_bytes, None),
            self.total_elapsed.as_secs_f64(),
            human_readable(self.total_bytes, Some(self.total_elapsed)),
        )
    }
}

/// Per-label statistics. Labels are created on first use with zeroed counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatsCollection {
    by_label: BTreeMap<String, TransferStats>,
}

impl StatsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for `label`, inserting `TransferStats::default()` if absent.
    pub fn entry(&mut self, label: &str) -> &mut TransferStats {
        self.by_label.entry(label.to_string()).or_default()
    }

    /// Counters for `label` without creating it.
    pub fn get(&self, label: &str) -> Option<&TransferStats> {
        self.by_label.get(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TransferStats)> {
        self.by_label.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Label-wise sum of `self` and `other`.
    pub fn merge(mut self, other: StatsCollection) -> StatsCollection {
        self += other;
        self
    }

    /// Sum over all labels.
    pub fn totals(&self) -> TransferStats {
        self.by_label
            .values()
            .fold(TransferStats::default(), |acc, s| acc + *s)
    }
}

impl Add for StatsCollection {
    type Output = StatsCollection;

    fn add(self, other: StatsCollection) -> StatsCollection {
        self.merge(other)
    }
}

impl AddAssign for StatsCollection {
    fn add_assign(&mut self, other: StatsCollection) {
        for (label, stats) in other.by_label {
            *self.by_label.entry(label).or_default() += stats;
        }
    }
}

impl FromIterator<(String, TransferStats)> for StatsCollection {
    fn from_iter<I: IntoIterator<Item = (String, TransferStats)>>(iter: I) -> Self {
        let mut out = StatsCollection::new();
        for (label, stats) in iter {
            *out.entry(&label) += stats;
        }
        out
    }
}
