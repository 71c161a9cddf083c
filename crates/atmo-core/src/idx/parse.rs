//! GRIB2 `.idx` inventory lines: `number:offset:fields...`.

use super::IdxError;

/// One inventory line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxRecord {
    /// Message number as written (`5`, or `5.1` for a sub-field).
    pub number: String,
    /// Byte offset of the message in the GRIB file.
    pub offset: u64,
    /// Everything after the offset field, without the leading colon.
    pub fields: String,
    /// The line as it appeared in the inventory.
    pub line: String,
}

impl IdxRecord {
    /// Renders `number:offset:fields`.
    pub fn to_line(&self) -> String {
        format!("{}:{}:{}", self.number, self.offset, self.fields)
    }
}

/// Parses every non-blank line. Offsets must not decrease.
pub fn parse_idx(text: &str) -> Result<Vec<IdxRecord>, IdxError> {
    let mut records: Vec<IdxRecord> = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }
        let malformed = || IdxError::Malformed {
            line: i + 1,
            content: line.to_string(),
        };
        let mut parts = line.splitn(3, ':');
        let number = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let offset: u64 = parts
            .next()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(malformed)?;
        let fields = parts.next().unwrap_or("");
        if let Some(prev) = records.last() {
            if offset < prev.offset {
                return Err(IdxError::OffsetOrder { line: i + 1 });
            }
        }
        records.push(IdxRecord {
            number: number.to_string(),
            offset,
            fields: fields.to_string(),
            line: line.to_string(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fields_after_offset() {
        let recs = parse_idx("1:0:d=2019070600:PRMSL:mean sea level:anl:\n").unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].number, "1");
        assert_eq!(recs[0].offset, 0);
        assert_eq!(recs[0].fields, "d=2019070600:PRMSL:mean sea level:anl:");
        assert_eq!(recs[0].to_line(), recs[0].line);
    }

    #[test]
    fn skips_blank_lines_and_keeps_sub_messages() {
        let text = "1:0:d=1:A:x:anl:\n\n2.1:100:d=1:UGRD:10 m:anl:\r\n2.2:100:d=1:VGRD:10 m:anl:\n";
        let recs = parse_idx(text).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[1].number, "2.1");
        assert_eq!(recs[2].offset, 100);
        assert_eq!(recs[1].fields, "d=1:UGRD:10 m:anl:");
    }

    #[test]
    fn rejects_bad_offset() {
        let err = parse_idx("1:0:a\n2:abc:b\n").unwrap_err();
        assert!(matches!(err, IdxError::Malformed { line: 2, .. }));
        assert!(parse_idx("no colon here").is_err());
    }

    #[test]
    fn rejects_decreasing_offsets() {
        let err = parse_idx("1:500:a\n2:100:b\n").unwrap_err();
        assert!(matches!(err, IdxError::OffsetOrder { line: 2 }));
    }
}
