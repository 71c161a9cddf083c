//! Sequential writer for one temp download file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Appends to `<final>.part`. `finalize` syncs and renames onto the final
/// path; dropping the writer earlier deletes the temp file.
pub struct StorageWriter {
    file: Option<BufWriter<File>>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    pub(crate) fn new(file: File, temp_path: PathBuf, final_path: PathBuf) -> Self {
        Self {
            file: Some(BufWriter::new(file)),
            temp_path,
            final_path,
            written: 0,
        }
    }

    /// Bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flush, sync and atomically rename the temp file onto the final path.
    /// Fails if the final path is on a different filesystem.
    pub fn finalize(mut self) -> io::Result<()> {
        let Some(buf) = self.file.take() else {
            return Err(io::Error::new(io::ErrorKind::Other, "writer already finalized"));
        };
        let file = buf.into_inner().map_err(|e| e.into_error())?;
        file.set_len(self.written)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&self.temp_path, &self.final_path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!(
                    "failed to rename {} to {}: {}",
                    self.temp_path.display(),
                    self.final_path.display(),
                    e
                ),
            )
        })?;
        // Rename done; nothing left for Drop to clean up.
        self.temp_path = PathBuf::new();
        Ok(())
    }
}

impl Write for StorageWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already finalized"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for StorageWriter {
    fn drop(&mut self) {
        if self.temp_path.as_os_str().is_empty() {
            return;
        }
        drop(self.file.take());
        if let Err(e) = std::fs::remove_file(&self.temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("could not remove {}: {}", self.temp_path.display(), e);
            }
        }
    }
}
