//! Local file lifecycle for one work item.
//!
//! Bytes go to `<local_path>.part` and are renamed onto `local_path` only once
//! the whole item has been written and synced, so a visible `local_path`
//! always holds a complete transfer. A writer that is dropped without
//! `finalize` removes its temp file.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `x.gz` → `x.gz.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Removes `final_path` and its temp file, ignoring files that are not there.
pub fn remove_partial(final_path: &Path) {
    for path in [final_path.to_path_buf(), temp_path(final_path)] {
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!("removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("could not remove {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("KHGX20110228_000316_V03.gz"));
        assert_eq!(p.to_string_lossy(), "KHGX20110228_000316_V03.gz.part");
        let p2 = temp_path(Path::new("/tmp/hrrr.t00z.grib2"));
        assert_eq!(p2.to_string_lossy(), "/tmp/hrrr.t00z.grib2.part");
    }

    #[test]
    fn create_write_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("nested/dir/output.bin");

        let mut writer = StorageWriterBuilder::create(&final_path).unwrap().build();
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        assert_eq!(writer.bytes_written(), 11);
        assert!(temp_path(&final_path).exists());
        assert!(!final_path.exists());
        writer.finalize().unwrap();

        assert!(!temp_path(&final_path).exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
    }

    #[test]
    fn drop_without_finalize_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("out.bin");
        {
            let mut writer = StorageWriterBuilder::create(&final_path).unwrap().build();
            writer.write_all(b"partial").unwrap();
        }
        assert!(!temp_path(&final_path).exists());
        assert!(!final_path.exists());
    }

    #[test]
    fn create_truncates_stale_temp() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("out.bin");
        std::fs::write(temp_path(&final_path), b"stale bytes from a crash").unwrap();
        let mut writer = StorageWriterBuilder::create(&final_path).unwrap().build();
        writer.write_all(b"new").unwrap();
        writer.finalize().unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    }

    #[test]
    fn remove_partial_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("gone.bin");
        remove_partial(&final_path);
        std::fs::write(&final_path, b"x").unwrap();
        std::fs::write(temp_path(&final_path), b"y").unwrap();
        remove_partial(&final_path);
        assert!(!final_path.exists());
        assert!(!temp_path(&final_path).exists());
    }
}
