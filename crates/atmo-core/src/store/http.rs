//! S3-style bucket access over HTTP(S) using libcurl.
//!
//! One `CurlStore` wraps one reusable `Easy` handle, so a worker keeps its
//! connection alive across items. Public buckets (NOAA open data and the
//! like) need no request signing.

use anyhow::Context;
use std::io::Write;
use std::time::Duration;
use url::Url;

use super::parse::{parse_headers, push_header_line};
use super::{ObjectStore, RangeBody, StoreFactory};
use crate::config::AtmoConfig;
use crate::item::ByteRange;
use crate::retry::TransferError;

/// Per-request curl limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays under 1 KiB/s for this long.
    pub low_speed_time: Duration,
    /// Hard wall-clock limit so a stuck transfer eventually fails.
    pub timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(3600),
        }
    }
}

impl CurlOptions {
    pub fn from_config(cfg: &AtmoConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

/// Builds the bucket base URL from an endpoint template such as
/// `https://{bucket}.s3.amazonaws.com`.
pub fn bucket_url(endpoint: &str, bucket: &str) -> anyhow::Result<Url> {
    let raw = endpoint.replace("{bucket}", bucket);
    let url = Url::parse(&raw).with_context(|| format!("invalid endpoint URL: {}", raw))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("endpoint URL cannot hold object paths: {}", raw);
    }
    Ok(url)
}

/// Object store session backed by one curl `Easy` handle.
pub struct CurlStore {
    easy: curl::easy::Easy,
    base: Url,
    opts: CurlOptions,
}

impl CurlStore {
    pub fn new(base: Url, opts: CurlOptions) -> Self {
        Self {
            easy: curl::easy::Easy::new(),
            base,
            opts,
        }
    }

    /// URL of `key` under the bucket base; each `/`-separated key segment is
    /// percent-encoded.
    pub fn object_url(&self, key: &str) -> Result<Url, TransferError> {
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(TransferError::InvalidKey(key.to_string()));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| TransferError::InvalidKey(key.to_string()))?
            .pop_if_empty()
            .extend(key.split('/'));
        Ok(url)
    }

    fn prepare(&mut self, url: &Url) -> Result<(), TransferError> {
        // reset() clears options but keeps the connection cache.
        self.easy.reset();
        self.easy.url(url.as_str())?;
        self.easy.follow_location(true)?;
        self.easy.connect_timeout(self.opts.connect_timeout)?;
        self.easy.low_speed_limit(1024)?;
        self.easy.low_speed_time(self.opts.low_speed_time)?;
        self.easy.timeout(self.opts.timeout)?;
        Ok(())
    }

    fn check_status(&mut self, accept: impl Fn(u32) -> bool) -> Result<(), TransferError> {
        let code = self.easy.response_code()?;
        if !accept(code) {
            return Err(TransferError::Http(code));
        }
        Ok(())
    }
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

impl ObjectStore for CurlStore {
    fn head_object(&mut self, key: &str) -> Result<u64, TransferError> {
        let url = self.object_url(key)?;
        self.prepare(&url)?;
        self.easy.nobody(true)?;

        let mut lines = Vec::new();
        {
            let mut transfer = self.easy.transfer();
            transfer.header_function(|data| {
                push_header_line(&mut lines, data);
                true
            })?;
            transfer.perform()?;
        }
        self.check_status(is_success)?;

        parse_headers(&lines).content_length.ok_or_else(|| {
            TransferError::Transport(format!("HEAD {} sent no Content-Length", key))
        })
    }

    fn get_object(&mut self, key: &str, sink: &mut dyn Write) -> Result<u64, TransferError> {
        let url = self.object_url(key)?;
        self.prepare(&url)?;

        let mut written = 0u64;
        let mut write_err: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = self.easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    // Short count makes curl abort with a write error.
                    Ok(0)
                }
            })?;
            transfer.perform()
        };
        if let Err(e) = performed {
            if let Some(io_err) = write_err {
                return Err(TransferError::Storage(io_err));
            }
            return Err(TransferError::Curl(e));
        }
        self.check_status(is_success)?;
        Ok(written)
    }

    fn get_object_range(
        &mut self,
        key: &str,
        range: ByteRange,
    ) -> Result<RangeBody, TransferError> {
        let url = self.object_url(key)?;
        self.prepare(&url)?;
        self.easy.range(&range.curl_range())?;

        let mut lines = Vec::new();
        let mut data = Vec::with_capacity(range.len().min(1 << 20) as usize);
        {
            let mut transfer = self.easy.transfer();
            transfer.header_function(|h| {
                push_header_line(&mut lines, h);
                true
            })?;
            transfer.write_function(|chunk| {
                data.extend_from_slice(chunk);
                Ok(chunk.len())
            })?;
            transfer.perform()?;
        }
        // A 200 here means the server ignored the Range header.
        self.check_status(|code| code == 206)?;

        let head = parse_headers(&lines);
        if let Some((start, end, _)) = head.content_range {
            if start != range.start || end > range.end {
                return Err(TransferError::Transport(format!(
                    "server returned bytes {}-{} for requested {}",
                    start,
                    end,
                    range.range_header_value()
                )));
            }
        }
        let declared_len = head.content_length.ok_or_else(|| {
            TransferError::Transport(format!("ranged GET {} sent no Content-Length", key))
        })?;
        Ok(RangeBody { data, declared_len })
    }
}

/// Opens one `CurlStore` per worker against a fixed bucket.
#[derive(Debug, Clone)]
pub struct CurlStoreFactory {
    base: Url,
    opts: CurlOptions,
}

impl CurlStoreFactory {
    pub fn new(endpoint: &str, bucket: &str, opts: CurlOptions) -> anyhow::Result<Self> {
        Ok(Self {
            base: bucket_url(endpoint, bucket)?,
            opts,
        })
    }

    /// Factory for `bucket` using the endpoint and limits from `cfg`.
    pub fn from_config(cfg: &AtmoConfig, bucket: &str) -> anyhow::Result<Self> {
        Self::new(&cfg.endpoint, bucket, CurlOptions::from_config(cfg))
    }
}

impl StoreFactory for CurlStoreFactory {
    type Store = CurlStore;

    fn connect(&self) -> anyhow::Result<CurlStore> {
        Ok(CurlStore::new(self.base.clone(), self.opts))
    }
}
