//! TOML manifests: a list of objects to fetch, fed to the scheduler as work items.
//!
//! ```toml
//! bucket = "noaa-nexrad-level2"
//! root = "/data/radar"
//!
//! [[item]]
//! label = "KHGX"
//! key = "2011/02/28/KHGX/KHGX20110228_000316_V03.gz"
//! path = "KHGX/KHGX20110228_000316_V03.gz"
//!
//! [[item]]
//! label = "hrrr"
//! key = "hrrr.20190706/conus/hrrr.t00z.wrfsfcf00.grib2"
//! ranges = [[0, 1023], [4096, 8191]]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::item::{ByteRange, WorkItem};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("item {index}: empty key")]
    EmptyKey { index: usize },
    #[error("item {index}: range {start}-{end} ends before it starts")]
    InvalidRange { index: usize, start: u64, end: u64 },
}

/// One `[[item]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestItem {
    pub label: String,
    pub key: String,
    /// Local path; defaults to the key. Relative paths resolve against the
    /// output root.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Inclusive `[start, end]` byte ranges, fetched in order.
    #[serde(default)]
    pub ranges: Option<Vec<[u64; 2]>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Bucket for every item, unless overridden on the command line.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Output root for relative item paths.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default, rename = "item")]
    pub items: Vec<ManifestItem>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let data = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(data: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(data)
    }

    /// Converts every entry into a work item. Relative paths resolve against
    /// `out_dir`, else the manifest's `root`, else the current directory.
    pub fn into_items(self, out_dir: Option<&Path>) -> Result<Vec<WorkItem>, ManifestError> {
        let base = out_dir
            .map(Path::to_path_buf)
            .or(self.root)
            .unwrap_or_else(|| PathBuf::from("."));

        self.items
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let key = entry.key.trim_start_matches('/').to_string();
                if key.is_empty() {
                    return Err(ManifestError::EmptyKey { index });
                }
                let rel = entry.path.unwrap_or_else(|| PathBuf::from(&key));
                let local_path = if rel.is_absolute() { rel } else { base.join(rel) };
                match entry.ranges {
                    None => Ok(WorkItem::whole(entry.label, key, local_path)),
                    Some(pairs) => {
                        let ranges = pairs
                            .into_iter()
                            .map(|[start, end]| {
                                ByteRange::new(start, end).ok_or(ManifestError::InvalidRange {
                                    index,
                                    start,
                                    end,
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(WorkItem::chunked(entry.label, key, local_path, ranges))
                    }
                }
            })
            .collect()
    }
}
