//! Remote object store seam.
//!
//! The transfer primitive only needs three operations: size lookup, full
//! fetch and ranged fetch. Stores take `&mut self` and are not required to be
//! `Send` or `Sync`: each worker builds its own store through a
//! [`StoreFactory`] on its own thread, so sessions are never shared.

mod http;
mod memory;
mod parse;

pub use http::{CurlOptions, CurlStore, CurlStoreFactory};
pub use memory::{MemoryBucket, MemoryStore};

use std::io::Write;

use crate::item::ByteRange;
use crate::retry::TransferError;

/// Body of a ranged fetch and the length the server declared for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBody {
    pub data: Vec<u8>,
    pub declared_len: u64,
}

/// Size lookup, full fetch and ranged fetch against one bucket.
pub trait ObjectStore {
    /// Size of the object in bytes.
    fn head_object(&mut self, key: &str) -> Result<u64, TransferError>;

    /// Streams the whole object into `sink`; returns the number of bytes written.
    fn get_object(&mut self, key: &str, sink: &mut dyn Write) -> Result<u64, TransferError>;

    /// Fetches exactly `range` (inclusive) of the object.
    fn get_object_range(&mut self, key: &str, range: ByteRange)
        -> Result<RangeBody, TransferError>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for Box<S> {
    fn head_object(&mut self, key: &str) -> Result<u64, TransferError> {
        (**self).head_object(key)
    }

    fn get_object(&mut self, key: &str, sink: &mut dyn Write) -> Result<u64, TransferError> {
        (**self).get_object(key, sink)
    }

    fn get_object_range(
        &mut self,
        key: &str,
        range: ByteRange,
    ) -> Result<RangeBody, TransferError> {
        (**self).get_object_range(key, range)
    }
}

/// Opens a private store session. Called once per worker, on the worker's thread.
pub trait StoreFactory: Send + Sync + 'static {
    type Store: ObjectStore;

    fn connect(&self) -> anyhow::Result<Self::Store>;
}

impl<F, S> StoreFactory for F
where
    F: Fn() -> anyhow::Result<S> + Send + Sync + 'static,
    S: ObjectStore,
{
    type Store = S;

    fn connect(&self) -> anyhow::Result<S> {
        self()
    }
}
