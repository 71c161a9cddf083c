//! Byte-range selection from GRIB2 `.idx` inventories.
//!
//! NWP model output on public buckets ships a text inventory next to each
//! GRIB2 file. Selecting inventory lines by pattern yields the byte ranges of
//! just those messages, so a chunked work item can fetch a variable subset
//! instead of the whole file. The matched lines are renumbered against the
//! subset so the local copy gets a valid inventory of its own.

mod parse;

pub use parse::{parse_idx, IdxRecord};

use regex::RegexSet;
use thiserror::Error;

use crate::item::ByteRange;

#[derive(Debug, Error)]
pub enum IdxError {
    #[error("idx line {line}: cannot parse {content:?}")]
    Malformed { line: usize, content: String },
    #[error("idx line {line}: offset lower than the previous record")]
    OffsetOrder { line: usize },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("last selected record at offset {offset} needs the object size to bound it")]
    OpenEndedLast { offset: u64 },
    #[error("record offset {offset} is beyond the object size {size}")]
    OffsetBeyondObject { offset: u64, size: u64 },
}

/// Ranges to fetch and the inventory describing the fetched subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxSelection {
    /// Byte ranges in inventory order.
    pub ranges: Vec<ByteRange>,
    /// Matched records, renumbered from 1 with offsets into the subset.
    pub records: Vec<IdxRecord>,
}

impl IdxSelection {
    /// Total bytes the ranges cover.
    pub fn total_len(&self) -> u64 {
        self.ranges.iter().map(ByteRange::len).sum()
    }

    /// Inventory text for the subset file, one record per line.
    pub fn idx_text(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_line());
            out.push('\n');
        }
        out
    }
}

/// Selects the records of `text` whose line matches any of `patterns`
/// (regular expressions). Returns `Ok(None)` when nothing matches.
///
/// A record's range runs from its offset to one byte before the next record
/// with a larger offset. The last message ends at `object_size - 1`, so
/// `object_size` is required when a final message is selected. Sub-messages
/// sharing one offset (`5.1`, `5.2`) share one range.
pub fn select<P: AsRef<str>>(
    text: &str,
    patterns: &[P],
    object_size: Option<u64>,
) -> Result<Option<IdxSelection>, IdxError> {
    let patterns: Vec<&str> = patterns.iter().map(<P as AsRef<str>>::as_ref).collect();
    let set = RegexSet::new(&patterns)?;
    let records = parse_idx(text)?;
    if let (Some(size), Some(last)) = (object_size, records.last()) {
        if last.offset >= size {
            return Err(IdxError::OffsetBeyondObject {
                offset: last.offset,
                size,
            });
        }
    }

    let mut seen = vec![false; patterns.len()];
    let mut ranges: Vec<ByteRange> = Vec::new();
    let mut selected: Vec<IdxRecord> = Vec::new();
    let mut subset_offset = 0u64;

    for (i, record) in records.iter().enumerate() {
        let hits = set.matches(&record.line);
        if !hits.matched_any() {
            continue;
        }
        for p in hits.iter() {
            seen[p] = true;
        }

        let same_message = ranges.last().map(|r| r.start) == Some(record.offset);
        if !same_message {
            let end = message_end(&records[i + 1..], record.offset, object_size)?;
            let range = ByteRange::new(record.offset, end)
                .ok_or(IdxError::OffsetOrder { line: i + 1 })?;
            if let Some(prev) = ranges.last() {
                subset_offset += prev.len();
            }
            ranges.push(range);
        }
        selected.push(IdxRecord {
            number: (selected.len() + 1).to_string(),
            offset: subset_offset,
            fields: record.fields.clone(),
            line: String::new(),
        });
    }

    for (pattern, hit) in patterns.iter().zip(&seen) {
        if !hit {
            tracing::debug!("no idx record matches {:?}", pattern);
        }
    }

    if selected.is_empty() {
        return Ok(None);
    }
    for record in &mut selected {
        record.line = record.to_line();
    }
    Ok(Some(IdxSelection {
        ranges,
        records: selected,
    }))
}

/// Last byte of the message starting at `offset`.
fn message_end(rest: &[IdxRecord], offset: u64, object_size: Option<u64>) -> Result<u64, IdxError> {
    match rest.iter().find(|r| r.offset > offset) {
        Some(next) => Ok(next.offset - 1),
        None => match object_size {
            Some(size) => Ok(size - 1),
            None => Err(IdxError::OpenEndedLast { offset }),
        },
    }
}
