//! Record pipeline: newline-delimited JSON in, concatenated TLV out.
//!
//! Each input line is one JSON object. Field names are interned through a
//! [`TagRegistry`], so a name carries the same tag in every record of a
//! run; field values map to TLV payloads (boolean -> 16-bit, integer ->
//! 32-bit, string -> text). Each serialized buffer is verified by parsing
//! it back before it is handed to the sink.

use crate::key_table::SetError;
use crate::tag_registry::TagRegistry;
use crate::tlv::{TlvBox, TlvError, TlvRecord};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("tag registry error: {0}")]
    Registry(#[from] SetError),
    #[error("encoded record failed verification: {0}")]
    Verify(#[from] TlvError),
}

/// Totals reported by [`RecordEncoder::encode_stream`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Records encoded and written.
    pub records: usize,
    /// Fields encoded across all records.
    pub fields: usize,
    /// Fields skipped because their value type has no TLV mapping.
    pub skipped_fields: usize,
    /// Total bytes handed to the sink.
    pub bytes_written: usize,
}

/// Stateful encoder for a run of records. The registry persists across
/// records, which is the point: repeated field names keep their tag.
#[derive(Default)]
pub struct RecordEncoder {
    registry: TagRegistry,
}

impl RecordEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry accumulated so far (name -> tag).
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Encode one JSON-object line into a verified TLV buffer.
    ///
    /// Booleans encode as 16-bit integers (0/1), integers that fit `i32`
    /// as 32-bit integers, strings as text. Any other value (null, float,
    /// out-of-range integer, array, object) has no TLV mapping and is
    /// skipped with a warning.
    pub fn encode_record(&mut self, line: &str) -> Result<Vec<u8>, EncodeError> {
        let parsed: Value = serde_json::from_str(line)?;
        let object = parsed.as_object().ok_or(EncodeError::NotAnObject)?;
        let (buf, _skipped) = self.encode_object(object)?;
        Ok(buf)
    }

    fn encode_object(&mut self, object: &Map<String, Value>) -> Result<(Vec<u8>, usize), EncodeError> {
        let mut out = TlvBox::new();
        let mut skipped = 0;
        for (name, value) in object {
            let tag = self.registry.tag_for(name)?;
            match value {
                Value::Bool(b) => out.put_short(tag, i16::from(*b)),
                Value::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                    Some(i) => out.put_int(tag, i),
                    None => {
                        warn!("field {name:?}: unknown data type {value}, skipping");
                        skipped += 1;
                    }
                },
                Value::String(s) => out.put_text(tag, s.as_str()),
                _ => {
                    warn!("field {name:?}: unknown data type {value}, skipping");
                    skipped += 1;
                }
            }
        }

        let buf = out.serialize();
        // Parse the buffer back before accepting it, proving the encoding
        // is self-consistent for this record.
        let record = TlvRecord::parse(&buf)?;
        debug_assert_eq!(record.len(), out.len());
        Ok((buf, skipped))
    }

    /// Drive a stream of newline-delimited records into `sink`. Blank
    /// lines are skipped; any error aborts the run with the sink left at
    /// however far it got.
    pub fn encode_stream<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut sink: W,
    ) -> Result<EncodeSummary, EncodeError> {
        let mut summary = EncodeSummary::default();
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: Value = serde_json::from_str(&line)?;
            let object = parsed.as_object().ok_or(EncodeError::NotAnObject)?;
            let (buf, skipped) = self.encode_object(object)?;
            sink.write_all(&buf)?;
            summary.records += 1;
            summary.fields += object.len() - skipped;
            summary.skipped_fields += skipped;
            summary.bytes_written += buf.len();
        }
        debug!(
            "encoded {} records, {} fields ({} skipped), {} bytes, {} distinct names",
            summary.records,
            summary.fields,
            summary.skipped_fields,
            summary.bytes_written,
            self.registry.len()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str) -> (RecordEncoder, TlvRecord) {
        let mut enc = RecordEncoder::new();
        let buf = enc.encode_record(line).unwrap();
        let rec = TlvRecord::parse(&buf).unwrap();
        (enc, rec)
    }

    /// Invariant: scalar fields map to their TLV payloads under the tags
    /// the registry assigned.
    #[test]
    fn scalars_encode_under_registry_tags() {
        let (enc, rec) = record(r#"{"id": 17, "active": true, "name": "ada"}"#);
        let id = enc.registry().lookup("id").unwrap();
        let active = enc.registry().lookup("active").unwrap();
        let name = enc.registry().lookup("name").unwrap();

        assert_eq!(rec.int(id), Ok(Some(17)));
        assert_eq!(rec.short(active), Ok(Some(1)));
        assert_eq!(rec.text(name), Ok(Some("ada")));
        assert_eq!(rec.len(), 3);
    }

    /// Invariant: unmappable values are skipped; the rest of the record
    /// still encodes. The skipped field's name is still interned, matching
    /// the original flow (lookup happens before the type dispatch).
    #[test]
    fn unmappable_values_are_skipped() {
        let (enc, rec) =
            record(r#"{"ratio": 0.5, "tags": [1, 2], "none": null, "big": 5000000000, "ok": 1}"#);
        assert_eq!(rec.len(), 1);
        let ok = enc.registry().lookup("ok").unwrap();
        assert_eq!(rec.int(ok), Ok(Some(1)));
        assert!(enc.registry().lookup("ratio").is_some());
        assert_eq!(enc.registry().len(), 5);
    }

    /// Invariant: non-object records are rejected.
    #[test]
    fn non_object_rejected() {
        let mut enc = RecordEncoder::new();
        assert!(matches!(
            enc.encode_record("[1, 2, 3]"),
            Err(EncodeError::NotAnObject)
        ));
        assert!(matches!(
            enc.encode_record("not json at all"),
            Err(EncodeError::Json(_))
        ));
    }

    /// Invariant: boolean false encodes as a zero short.
    #[test]
    fn false_is_zero_short() {
        let (enc, rec) = record(r#"{"flag": false}"#);
        let flag = enc.registry().lookup("flag").unwrap();
        assert_eq!(rec.short(flag), Ok(Some(0)));
    }
}
