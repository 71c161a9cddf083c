//! Transfer primitive: one attempt at moving one work item to disk.
//!
//! Never retries; the worker owns the attempt loop. On return the item's
//! `local_path` is either complete and correctly sized or absent.

mod chunked;
mod whole;

use std::time::{Duration, Instant};

use crate::item::WorkItem;
use crate::retry::TransferError;
use crate::storage;
use crate::store::ObjectStore;

/// Result of one transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Bytes now in `local_path`; 0 on failure.
    pub bytes_transferred: u64,
    pub elapsed: Duration,
    pub succeeded: bool,
}

/// Runs one attempt and reports it as a `TransferOutcome`. The failure reason
/// is logged at warn level.
pub fn transfer<S: ObjectStore + ?Sized>(store: &mut S, item: &WorkItem) -> TransferOutcome {
    let started = Instant::now();
    match attempt(store, item) {
        Ok(bytes) => TransferOutcome {
            bytes_transferred: bytes,
            elapsed: started.elapsed(),
            succeeded: true,
        },
        Err(e) => {
            tracing::warn!("{} failed: {}", item.remote_key, e);
            TransferOutcome {
                bytes_transferred: 0,
                elapsed: started.elapsed(),
                succeeded: false,
            }
        }
    }
}

/// Runs one attempt, returning the bytes written or why it failed. Any file
/// left at `local_path` (or its temp file) is removed on failure.
pub fn attempt<S: ObjectStore + ?Sized>(
    store: &mut S,
    item: &WorkItem,
) -> Result<u64, TransferError> {
    let result = match &item.ranges {
        None => whole::fetch_whole(store, &item.remote_key, item.local_path()),
        Some(ranges) => chunked::fetch_chunked(store, &item.remote_key, item.local_path(), ranges),
    };
    if result.is_err() {
        storage::remove_partial(item.local_path());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ByteRange;
    use crate::store::MemoryBucket;

    fn object(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn whole_object_lands_with_exact_size() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = MemoryBucket::new();
        bucket.insert("2011/02/28/KHGX/KHGX_V03.gz", object(4096));
        let item = WorkItem::whole(
            "KHGX",
            "2011/02/28/KHGX/KHGX_V03.gz",
            dir.path().join("KHGX/KHGX_V03.gz"),
        );

        let outcome = transfer(&mut bucket.store(), &item);
        assert!(outcome.succeeded);
        assert_eq!(outcome.bytes_transferred, 4096);
        assert_eq!(std::fs::read(item.local_path()).unwrap(), object(4096));
        assert!(!storage::temp_path(item.local_path()).exists());
    }

    #[test]
    fn chunked_appends_ranges_in_listed_order() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = MemoryBucket::new();
        bucket.insert("g.grib2", b"AAAABBBBCCCCDDDD".to_vec());
        let ranges = vec![
            ByteRange::new(12, 15).unwrap(),
            ByteRange::new(0, 3).unwrap(),
            ByteRange::new(8, 9).unwrap(),
        ];
        let item = WorkItem::chunked("gfs", "g.grib2", dir.path().join("subset.grib2"), ranges);

        let outcome = transfer(&mut bucket.store(), &item);
        assert!(outcome.succeeded);
        assert_eq!(outcome.bytes_transferred, item.expected_len().unwrap());
        assert_eq!(std::fs::read(item.local_path()).unwrap(), b"DDDDAAAACC");
    }

    #[test]
    fn short_chunk_fails_and_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = MemoryBucket::new();
        bucket.insert("g.grib2", object(100));
        bucket.truncate("g.grib2");
        let item = WorkItem::chunked(
            "gfs",
            "g.grib2",
            dir.path().join("subset.grib2"),
            vec![ByteRange::new(0, 9).unwrap()],
        );

        let err = attempt(&mut bucket.store(), &item).unwrap_err();
        assert!(matches!(
            err,
            TransferError::PartialChunk {
                declared: 10,
                received: 9,
                ..
            }
        ));
        assert!(!item.local_path().exists());
        assert!(!storage::temp_path(item.local_path()).exists());
    }

    #[test]
    fn failure_removes_preexisting_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.gz");
        std::fs::write(&path, b"stale").unwrap();
        let bucket = MemoryBucket::new();
        bucket.insert("k", object(10));
        bucket.fail_always("k");

        let outcome = transfer(&mut bucket.store(), &WorkItem::whole("x", "k", &path));
        assert!(!outcome.succeeded);
        assert_eq!(outcome.bytes_transferred, 0);
        assert!(!path.exists());
    }

    #[test]
    fn missing_object_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = MemoryBucket::new();
        let item = WorkItem::whole("x", "nope", dir.path().join("nope"));
        assert!(matches!(
            attempt(&mut bucket.store(), &item),
            Err(TransferError::Http(404))
        ));
        assert!(!item.local_path().exists());
    }
}
