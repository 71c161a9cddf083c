//! Error type for a single transfer attempt.

use thiserror::Error;

/// Why one transfer attempt failed. Every variant is retried by the worker
/// until the attempt limit is reached; exhaustion is reported as a failed item.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had an unexpected status (non-2xx, or not 206 for a range).
    #[error("HTTP {0}")]
    Http(u32),
    /// Whole-object transfer wrote a different number of bytes than the
    /// object's declared size.
    #[error("size mismatch: expected {expected} bytes, wrote {received}")]
    SizeMismatch { expected: u64, received: u64 },
    /// A ranged fetch returned fewer (or more) bytes than it declared.
    #[error("partial chunk {start}-{end}: declared {declared} bytes, got {received}")]
    PartialChunk {
        start: u64,
        end: u64,
        declared: u64,
        received: u64,
    },
    /// Local file could not be created, written, synced or renamed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
    /// Transport failure from a non-curl store (or a store that could not be opened).
    #[error("transport: {0}")]
    Transport(String),
    /// Object key cannot be turned into a request URL.
    #[error("invalid key {0:?}")]
    InvalidKey(String),
}

impl TransferError {
    /// True when the failure came from the local filesystem rather than the remote.
    pub fn is_local(&self) -> bool {
        matches!(self, TransferError::Storage(_))
    }
}
