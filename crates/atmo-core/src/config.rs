use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per item (including the first).
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds (0 = retry immediately).
    #[serde(default)]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 0,
        }
    }
}

/// Global configuration loaded from `~/.config/atmo/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmoConfig {
    /// Number of concurrent workers (each with its own store session).
    pub workers: usize,
    /// Capacity of the bounded work queue; producers block when it is full.
    pub queue_capacity: usize,
    /// Re-download files that already exist locally.
    #[serde(default)]
    pub overwrite: bool,
    /// How long queue operations wait before re-checking stop/kill (ms, capped at 1000).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Endpoint template; `{bucket}` is replaced with the bucket name.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bucket used when a command does not name one.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Connect timeout per request in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Abort a request whose throughput stays under 1 KiB/s for this many seconds.
    #[serde(default = "default_low_speed_time_secs")]
    pub low_speed_time_secs: u64,
    /// Hard wall-clock timeout per request in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_endpoint() -> String {
    "https://{bucket}.s3.amazonaws.com".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_low_speed_time_secs() -> u64 {
    60
}

fn default_timeout_secs() -> u64 {
    3600
}

impl Default for AtmoConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 10,
            overwrite: false,
            poll_interval_ms: default_poll_interval_ms(),
            endpoint: default_endpoint(),
            bucket: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            low_speed_time_secs: default_low_speed_time_secs(),
            timeout_secs: default_timeout_secs(),
            retry: None,
        }
    }
}

impl AtmoConfig {
    /// Retry section, or the defaults when absent.
    pub fn retry_or_default(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("atmo")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AtmoConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AtmoConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<AtmoConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AtmoConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AtmoConfig::default();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.queue_capacity, 10);
        assert!(!cfg.overwrite);
        assert_eq!(cfg.poll_interval_ms, 1000);
        assert_eq!(cfg.endpoint, "https://{bucket}.s3.amazonaws.com");
        assert_eq!(cfg.retry_or_default().max_attempts, 3);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = AtmoConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: AtmoConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.workers, cfg.workers);
        assert_eq!(parsed.queue_capacity, cfg.queue_capacity);
        assert_eq!(parsed.endpoint, cfg.endpoint);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
    }

    #[test]
    fn config_toml_minimal_uses_defaults() {
        let toml = r#"
            workers = 2
            queue_capacity = 5
        "#;
        let cfg: AtmoConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.queue_capacity, 5);
        assert!(!cfg.overwrite);
        assert!(cfg.bucket.is_none());
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.connect_timeout_secs, 30);
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            workers = 6
            queue_capacity = 20
            overwrite = true
            bucket = "noaa-nexrad-level2"

            [retry]
            max_attempts = 5
            backoff_ms = 100
        "#;
        let cfg: AtmoConfig = toml::from_str(toml).unwrap();
        assert!(cfg.overwrite);
        assert_eq!(cfg.bucket.as_deref(), Some("noaa-nexrad-level2"));
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.backoff_ms, 100);
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "workers = 3\nqueue_capacity = 7\n").unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.queue_capacity, 7);
    }
}
