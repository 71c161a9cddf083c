//! Whole-object mode: size the object, stream it, compare.

use std::path::Path;

use crate::retry::TransferError;
use crate::storage::StorageWriterBuilder;
use crate::store::ObjectStore;

pub(super) fn fetch_whole<S: ObjectStore + ?Sized>(
    store: &mut S,
    key: &str,
    local_path: &Path,
) -> Result<u64, TransferError> {
    let expected = store.head_object(key)?;
    let mut writer = StorageWriterBuilder::create(local_path)?.build();
    let received = store.get_object(key, &mut writer)?;
    if received != expected {
        return Err(TransferError::SizeMismatch { expected, received });
    }
    writer.finalize()?;
    Ok(received)
}
