//! Parse HTTP response header lines collected by curl.

/// The parts of a response head the store needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub content_length: Option<u64>,
    /// `Content-Range: bytes start-end/total` as (start, end, total).
    pub content_range: Option<(u64, u64, Option<u64>)>,
}

/// Parse collected header lines into a `ResponseHead`.
///
/// Lines from earlier responses (redirects, `100 Continue`) must already have
/// been dropped by the caller; see [`push_header_line`].
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    head.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-range") {
                head.content_range = parse_content_range(value);
            }
        }
    }
    head
}

/// Collects a raw header line, starting over at each status line so only the
/// final response's headers are kept.
pub(crate) fn push_header_line(lines: &mut Vec<String>, data: &[u8]) {
    if let Ok(s) = std::str::from_utf8(data) {
        let line = s.trim_end();
        if line.starts_with("HTTP/") {
            lines.clear();
        }
        lines.push(line.to_string());
    }
}

/// Parses `bytes 0-99/1234` (total may be `*`).
fn parse_content_range(value: &str) -> Option<(u64, u64, Option<u64>)> {
    let rest = value.strip_prefix("bytes")?.trim();
    let (span, total) = rest.split_once('/')?;
    let (start, end) = span.split_once('-')?;
    let start = start.trim().parse().ok()?;
    let end = end.trim().parse().ok()?;
    let total = total.trim().parse().ok();
    Some((start, end, total))
}
