//! # Dictionary Wire Codec
//!
//! Dictionaries travel in the companion platform's dictionary layout:
//!
//! ```text
//! count: u8
//! repeated count times:
//!     key:    u32 (little endian)
//!     type:   u8  (0 byte array, 1 C string, 2 unsigned int, 3 signed int)
//!     length: u16 (little endian)
//!     data:   [u8; length]
//! ```
//!
//! Integers are written with 4 bytes; 1 and 2 byte integers are accepted when
//! decoding. Strings carry a trailing NUL.

use crate::model::{InboundMessage, Value};
use std::collections::BTreeMap;
use thiserror::Error;

const TYPE_BYTE_ARRAY: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

/// Size of the per-tuple header (key + type + length).
pub const TUPLE_HEADER_LEN: usize = 4 + 1 + 2;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Too many tuples: {0} (max 255)")]
    TooManyTuples(usize),

    #[error("Value for key {key} too long: {len} bytes")]
    ValueTooLong { key: u32, len: usize },

    #[error("String for key {0} contains a NUL byte")]
    InteriorNul(u32),

    #[error("Frame truncated at offset {0}")]
    Truncated(usize),

    #[error("Unknown tuple type {kind} for key {key}")]
    UnknownType { key: u32, kind: u8 },

    #[error("Unsupported integer width {width} for key {key}")]
    IntegerWidth { key: u32, width: usize },

    #[error("String for key {0} is not valid UTF-8")]
    InvalidUtf8(u32),

    #[error("{0} trailing bytes after last tuple")]
    TrailingBytes(usize),
}

/// Serializes a dictionary into a single frame.
pub fn encode(entries: &BTreeMap<u32, Value>) -> Result<Vec<u8>, CodecError> {
    let count = u8::try_from(entries.len()).map_err(|_| CodecError::TooManyTuples(entries.len()))?;
    let mut frame = Vec::with_capacity(1 + entries.len() * (TUPLE_HEADER_LEN + 4));
    frame.push(count);

    for (&key, value) in entries {
        let (kind, data) = match value {
            Value::Int(v) => (TYPE_INT, v.to_le_bytes().to_vec()),
            Value::UInt(v) => (TYPE_UINT, v.to_le_bytes().to_vec()),
            Value::Str(s) => {
                if s.as_bytes().contains(&0) {
                    return Err(CodecError::InteriorNul(key));
                }
                let mut data = Vec::with_capacity(s.len() + 1);
                data.extend_from_slice(s.as_bytes());
                data.push(0);
                (TYPE_CSTRING, data)
            }
            Value::Bytes(b) => (TYPE_BYTE_ARRAY, b.clone()),
        };
        let len = u16::try_from(data.len())
            .map_err(|_| CodecError::ValueTooLong { key, len: data.len() })?;

        frame.extend_from_slice(&key.to_le_bytes());
        frame.push(kind);
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&data);
    }
    Ok(frame)
}

/// Parses a frame received from the peer.
pub fn decode(frame: &[u8]) -> Result<InboundMessage, CodecError> {
    let mut reader = Reader { frame, pos: 0 };
    let count = reader.take(1)?[0];
    let mut message = InboundMessage::new();

    for _ in 0..count {
        let key = u32::from_le_bytes(reader.array::<4>()?);
        let kind = reader.take(1)?[0];
        let len = u16::from_le_bytes(reader.array::<2>()?) as usize;
        let data = reader.take(len)?;

        let value = match kind {
            TYPE_BYTE_ARRAY => Value::Bytes(data.to_vec()),
            TYPE_CSTRING => {
                let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
                let text =
                    std::str::from_utf8(&data[..end]).map_err(|_| CodecError::InvalidUtf8(key))?;
                Value::Str(text.to_string())
            }
            TYPE_UINT => Value::UInt(match *data {
                [a] => u32::from(a),
                [a, b] => u32::from(u16::from_le_bytes([a, b])),
                [a, b, c, d] => u32::from_le_bytes([a, b, c, d]),
                _ => return Err(CodecError::IntegerWidth { key, width: len }),
            }),
            TYPE_INT => Value::Int(match *data {
                [a] => i32::from(a as i8),
                [a, b] => i32::from(i16::from_le_bytes([a, b])),
                [a, b, c, d] => i32::from_le_bytes([a, b, c, d]),
                _ => return Err(CodecError::IntegerWidth { key, width: len }),
            }),
            kind => return Err(CodecError::UnknownType { key, kind }),
        };
        message.insert(key, value);
    }

    let rest = frame.len() - reader.pos;
    if rest > 0 {
        return Err(CodecError::TrailingBytes(rest));
    }
    Ok(message)
}

struct Reader<'a> {
    frame: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.frame.len())
            .ok_or(CodecError::Truncated(self.pos))?;
        let slice = &self.frame[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}
