//! In-process object store with fault injection, for tests and dry runs.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ObjectStore, RangeBody};
use crate::item::ByteRange;
use crate::retry::TransferError;

#[derive(Debug, Default)]
struct Fault {
    /// Remaining failing requests; `None` means fail forever.
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
struct BucketState {
    objects: HashMap<String, Vec<u8>>,
    faults: HashMap<String, Fault>,
    /// Keys whose range responses carry one byte less than declared.
    truncated: HashSet<String>,
    get_calls: HashMap<String, u64>,
}

/// Shared set of objects. Clones see the same contents and counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryBucket {
    state: Arc<Mutex<BucketState>>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        // A panicking test thread must not poison the bucket for the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.lock().objects.insert(key.into(), data.into());
    }

    /// The next `n` GETs of `key` fail with HTTP 503.
    pub fn fail_times(&self, key: impl Into<String>, n: u32) {
        self.lock()
            .faults
            .insert(key.into(), Fault { remaining: Some(n) });
    }

    /// Every GET of `key` fails with HTTP 503.
    pub fn fail_always(&self, key: impl Into<String>) {
        self.lock()
            .faults
            .insert(key.into(), Fault { remaining: None });
    }

    /// Ranged GETs of `key` return one byte fewer than they declare.
    pub fn truncate(&self, key: impl Into<String>) {
        self.lock().truncated.insert(key.into());
    }

    /// Number of GET requests (whole or ranged) seen for `key`.
    pub fn get_calls(&self, key: &str) -> u64 {
        self.lock().get_calls.get(key).copied().unwrap_or(0)
    }

    /// A store session over this bucket.
    pub fn store(&self) -> MemoryStore {
        MemoryStore {
            bucket: self.clone(),
        }
    }

    /// Counts the GET and applies any injected fault.
    fn begin_get(&self, state: &mut BucketState, key: &str) -> Result<(), TransferError> {
        *state.get_calls.entry(key.to_string()).or_default() += 1;
        let fail = match state.faults.get_mut(key) {
            Some(Fault { remaining: None }) => true,
            Some(Fault {
                remaining: Some(n),
            }) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        };
        if fail {
            return Err(TransferError::Http(503));
        }
        Ok(())
    }
}

/// Session over a [`MemoryBucket`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bucket: MemoryBucket,
}

impl ObjectStore for MemoryStore {
    fn head_object(&mut self, key: &str) -> Result<u64, TransferError> {
        let state = self.bucket.lock();
        state
            .objects
            .get(key)
            .map(|d| d.len() as u64)
            .ok_or(TransferError::Http(404))
    }

    fn get_object(&mut self, key: &str, sink: &mut dyn Write) -> Result<u64, TransferError> {
        let data = {
            let mut state = self.bucket.lock();
            self.bucket.begin_get(&mut state, key)?;
            state
                .objects
                .get(key)
                .cloned()
                .ok_or(TransferError::Http(404))?
        };
        sink.write_all(&data)?;
        Ok(data.len() as u64)
    }

    fn get_object_range(
        &mut self,
        key: &str,
        range: ByteRange,
    ) -> Result<RangeBody, TransferError> {
        let mut state = self.bucket.lock();
        self.bucket.begin_get(&mut state, key)?;
        let truncated = state.truncated.contains(key);
        let object = state.objects.get(key).ok_or(TransferError::Http(404))?;

        let size = object.len() as u64;
        if range.start >= size {
            return Err(TransferError::Http(416));
        }
        let end = range.end.min(size - 1);
        let mut data = object[range.start as usize..=end as usize].to_vec();
        let declared_len = data.len() as u64;
        if truncated {
            data.pop();
        }
        Ok(RangeBody { data, declared_len })
    }
}
