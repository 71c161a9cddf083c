//! Work items: one remote object (or an ordered set of its byte ranges) and
//! the local file it lands in.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// A byte range `[start, end]` of a remote object (inclusive on both ends,
/// matching the HTTP `Range` header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Returns `None` if `end < start`.
    pub fn new(start: u64, end: u64) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// Length of this range in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// Range spec in the form curl's `range` option expects (`start-end`).
    pub(crate) fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// One unit of transfer work, immutable once queued.
///
/// `label` only groups items for statistics. `ranges == None` fetches the
/// whole object; `Some(ranges)` fetches each range in order and concatenates
/// them into `local_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub label: String,
    pub remote_key: String,
    pub local_path: PathBuf,
    pub ranges: Option<Vec<ByteRange>>,
}

impl WorkItem {
    /// Item that fetches the whole object.
    pub fn whole(
        label: impl Into<String>,
        remote_key: impl Into<String>,
        local_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            remote_key: remote_key.into(),
            local_path: local_path.into(),
            ranges: None,
        }
    }

    /// Item that fetches `ranges` in order into one file.
    pub fn chunked(
        label: impl Into<String>,
        remote_key: impl Into<String>,
        local_path: impl Into<PathBuf>,
        ranges: Vec<ByteRange>,
    ) -> Self {
        Self {
            label: label.into(),
            remote_key: remote_key.into(),
            local_path: local_path.into(),
            ranges: Some(ranges),
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Sum of all range lengths, or `None` for whole-object items.
    pub fn expected_len(&self) -> Option<u64> {
        self.ranges
            .as_ref()
            .map(|ranges| ranges.iter().map(ByteRange::len).sum())
    }
}
