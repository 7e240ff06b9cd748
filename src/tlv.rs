//! Tag-length-value codec for encoded records.
//!
//! Wire format, per field: `u32` tag (LE), `u32` payload length (LE),
//! payload bytes. Payloads are 2-byte LE integers (`Short`), 4-byte LE
//! integers (`Int`), or UTF-8 text; the type is not encoded, so the decoder
//! keeps raw payloads and interprets them through typed getters, matching
//! the serialize-box / parse-box-then-query shape of classic TLV libraries.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TlvError {
    /// Input ended inside a field header or payload.
    #[error("truncated input while reading {0}")]
    Truncated(&'static str),
    /// A field declared more payload than the buffer holds.
    #[error("declared length {declared} exceeds {remaining} remaining bytes")]
    LengthOutOfBounds { declared: usize, remaining: usize },
    /// A typed getter found a payload of the wrong size.
    #[error("field {tag} has a {len}-byte payload, expected {expected}")]
    WrongLength { tag: u32, len: usize, expected: usize },
    /// A text getter found a payload that is not valid UTF-8.
    #[error("field {tag} payload is not valid UTF-8")]
    InvalidText { tag: u32 },
}

/// A typed value staged for encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum TlvValue {
    Short(i16),
    Int(i32),
    Text(String),
}

impl TlvValue {
    fn payload_len(&self) -> usize {
        match self {
            TlvValue::Short(_) => 2,
            TlvValue::Int(_) => 4,
            TlvValue::Text(s) => s.len(),
        }
    }
}

/// Encoder: collects `(tag, value)` pairs and serializes them into one
/// compact buffer. Tags are not deduplicated; callers that need unique
/// tags per record enforce that upstream (the record pipeline does, by
/// construction, since a JSON object's field names are unique).
#[derive(Default)]
pub struct TlvBox {
    entries: Vec<(u32, TlvValue)>,
}

impl TlvBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_short(&mut self, tag: u32, value: i16) {
        self.entries.push((tag, TlvValue::Short(value)));
    }

    pub fn put_int(&mut self, tag: u32, value: i32) {
        self.entries.push((tag, TlvValue::Int(value)));
    }

    pub fn put_text(&mut self, tag: u32, value: impl Into<String>) {
        self.entries.push((tag, TlvValue::Text(value.into())));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialized size in bytes: an 8-byte header per field plus payloads.
    pub fn encoded_size(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, v)| 8 + v.payload_len())
            .sum()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_size());
        for (tag, value) in &self.entries {
            buf.extend_from_slice(&tag.to_le_bytes());
            buf.extend_from_slice(&(value.payload_len() as u32).to_le_bytes());
            match value {
                TlvValue::Short(v) => buf.extend_from_slice(&v.to_le_bytes()),
                TlvValue::Int(v) => buf.extend_from_slice(&v.to_le_bytes()),
                TlvValue::Text(s) => buf.extend_from_slice(s.as_bytes()),
            }
        }
        buf
    }
}

/// Decoder: one parsed record, holding raw payloads per tag.
#[derive(Debug, PartialEq)]
pub struct TlvRecord {
    fields: Vec<(u32, Vec<u8>)>,
}

impl TlvRecord {
    /// Parse a complete serialized record. The buffer must contain whole
    /// fields and nothing else; trailing or truncated bytes are an error.
    pub fn parse(buf: &[u8]) -> Result<Self, TlvError> {
        let mut fields = Vec::new();
        let mut rest = buf;
        while !rest.is_empty() {
            let tag = take_u32(&mut rest, "field tag")?;
            let len = take_u32(&mut rest, "field length")? as usize;
            if len > rest.len() {
                return Err(TlvError::LengthOutOfBounds {
                    declared: len,
                    remaining: rest.len(),
                });
            }
            let (payload, tail) = rest.split_at(len);
            fields.push((tag, payload.to_vec()));
            rest = tail;
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw payload of the first field carrying `tag`, if any.
    pub fn bytes(&self, tag: u32) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, p)| p.as_slice())
    }

    /// Iterate `(tag, payload)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.fields.iter().map(|(t, p)| (*t, p.as_slice()))
    }

    pub fn short(&self, tag: u32) -> Result<Option<i16>, TlvError> {
        match self.bytes(tag) {
            None => Ok(None),
            Some(p) => {
                let arr: [u8; 2] = p.try_into().map_err(|_| TlvError::WrongLength {
                    tag,
                    len: p.len(),
                    expected: 2,
                })?;
                Ok(Some(i16::from_le_bytes(arr)))
            }
        }
    }

    pub fn int(&self, tag: u32) -> Result<Option<i32>, TlvError> {
        match self.bytes(tag) {
            None => Ok(None),
            Some(p) => {
                let arr: [u8; 4] = p.try_into().map_err(|_| TlvError::WrongLength {
                    tag,
                    len: p.len(),
                    expected: 4,
                })?;
                Ok(Some(i32::from_le_bytes(arr)))
            }
        }
    }

    pub fn text(&self, tag: u32) -> Result<Option<&str>, TlvError> {
        match self.bytes(tag) {
            None => Ok(None),
            Some(p) => core::str::from_utf8(p)
                .map(Some)
                .map_err(|_| TlvError::InvalidText { tag }),
        }
    }
}

fn take_u32(rest: &mut &[u8], what: &'static str) -> Result<u32, TlvError> {
    if rest.len() < 4 {
        return Err(TlvError::Truncated(what));
    }
    let (head, tail) = rest.split_at(4);
    *rest = tail;
    // split_at(4) guarantees the conversion.
    Ok(u32::from_le_bytes(head.try_into().unwrap()))
}
