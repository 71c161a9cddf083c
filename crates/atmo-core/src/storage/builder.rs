//! Creates the temp file for one item.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use super::temp_path;
use super::writer::StorageWriter;

/// Builder for a new temp download file. Call `build` to get a sequential
/// `StorageWriter`.
pub struct StorageWriterBuilder {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl StorageWriterBuilder {
    /// Create `final_path.part`, creating missing parent directories.
    /// Overwrites a leftover temp file from an earlier run.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("failed to create temp file {}: {}", temp_path.display(), e),
                )
            })?;
        Ok(StorageWriterBuilder {
            file,
            temp_path,
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn build(self) -> StorageWriter {
        StorageWriter::new(self.file, self.temp_path, self.final_path)
    }
}
