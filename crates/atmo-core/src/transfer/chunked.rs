//! Chunked mode: fetch each byte range in order and append it.

use std::io::Write;
use std::path::Path;

use crate::item::ByteRange;
use crate::retry::TransferError;
use crate::storage::StorageWriterBuilder;
use crate::store::ObjectStore;

pub(super) fn fetch_chunked<S: ObjectStore + ?Sized>(
    store: &mut S,
    key: &str,
    local_path: &Path,
    ranges: &[ByteRange],
) -> Result<u64, TransferError> {
    let mut writer = StorageWriterBuilder::create(local_path)?.build();
    for range in ranges {
        let body = store.get_object_range(key, *range)?;
        let received = body.data.len() as u64;
        if received != body.declared_len {
            // One bad chunk fails the item; the writer's drop removes the temp file.
            return Err(TransferError::PartialChunk {
                start: range.start,
                end: range.end,
                declared: body.declared_len,
                received,
            });
        }
        writer.write_all(&body.data)?;
    }
    let written = writer.bytes_written();
    writer.finalize()?;
    Ok(written)
}
