//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a fixed set of objects keyed by URL path (without the leading `/`).
//! Responds to HEAD with Content-Length; responds to GET with Range with
//! 206 Partial Content. Unknown paths get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If true, ranged responses declare one byte more than they send.
    pub short_chunks: bool,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            short_chunks: false,
        }
    }
}

/// Starts a server in a background thread serving `objects`. Returns the base
/// URL (e.g. "http://127.0.0.1:12345/"). The server runs until the process exits.
pub fn start(objects: HashMap<String, Vec<u8>>) -> String {
    start_with_options(objects, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(objects: HashMap<String, Vec<u8>>, opts: RangeServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let objects = Arc::new(objects);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let objects = Arc::clone(&objects);
            thread::spawn(move || handle(stream, &objects, opts));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn handle(
    mut stream: std::net::TcpStream,
    objects: &HashMap<String, Vec<u8>>,
    opts: RangeServerOptions,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path, range) = parse_request(request);
    let Some(body) = objects.get(path.trim_start_matches('/')) else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    };
    let total = body.len() as u64;
    if method.eq_ignore_ascii_case("HEAD") {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\n\
             Connection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if method.eq_ignore_ascii_case("GET") {
        let (status, range_header, slice) = match range.filter(|_| opts.support_ranges) {
            Some((start, end_incl)) => {
                let end_incl = end_incl.min(total.saturating_sub(1));
                if start >= total || start > end_incl {
                    ("416 Range Not Satisfiable", format!("bytes */{}", total), &body[0..0])
                } else {
                    let slice = &body[start as usize..=end_incl as usize];
                    (
                        "206 Partial Content",
                        format!("bytes {}-{}/{}", start, end_incl, total),
                        slice,
                    )
                }
            }
            None => (
                "200 OK",
                format!("bytes 0-{}/{}", total.saturating_sub(1), total),
                &body[..],
            ),
        };
        let declared = if opts.short_chunks && status.starts_with("206") {
            slice.len() + 1
        } else {
            slice.len()
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Range: {}\r\nConnection: close\r\n\r\n",
            status, declared, range_header
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(slice);
        return;
    }
    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
}

/// Returns (method, path, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, &str, Option<(u64, u64)>) {
    let mut method = "";
    let mut path = "";
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            let mut parts = line.split_whitespace();
            method = parts.next().unwrap_or("");
            path = parts.next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if value.to_lowercase().starts_with("bytes=") {
                    let part = value[6..].trim();
                    if let Some((a, b)) = part.split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end = b.trim();
                        let end_incl = if end.is_empty() {
                            u64::MAX
                        } else {
                            end.parse::<u64>().unwrap_or(0)
                        };
                        range = Some((start, end_incl));
                    }
                }
            }
        }
    }
    (method, path, range)
}
