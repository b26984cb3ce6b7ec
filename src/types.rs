//! Core types for the commit log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width in bytes of the length prefix written before every payload.
pub const LEN_WIDTH: u64 = 8;

/// Logical position of a record in the log (dense, zero-based).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Offset(pub u64);

impl Offset {
    pub fn next(self) -> Self {
        Offset(self.0 + 1)
    }

    pub fn prev(self) -> Option<Self> {
        if self.0 > 0 {
            Some(Offset(self.0 - 1))
        } else {
            None
        }
    }

    /// Index into a dense offset-keyed sequence.
    pub(crate) fn as_index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset({})", self.0)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Offset {
    fn from(value: u64) -> Self {
        Offset(value)
    }
}

/// A single record in the log.
///
/// The value is opaque to every layer of the crate. The offset is assigned by
/// the log at append time; whatever the caller put there is overwritten.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Application-defined payload.
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,

    /// Position in the log (assigned by the log).
    #[serde(default)]
    pub offset: Offset,
}

impl Record {
    /// Create an unassigned record with the given value.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            offset: Offset::default(),
        }
    }
}

/// Where a record's frame lives inside the record store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Byte position of the frame's length prefix.
    pub position: u64,

    /// Total frame width (prefix + payload).
    pub len: u64,
}

impl IndexEntry {
    /// Payload width, excluding the length prefix. Zero for a malformed
    /// entry narrower than the prefix.
    pub fn payload_len(&self) -> u64 {
        self.len.saturating_sub(LEN_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_prev_next() {
        assert_eq!(Offset(0).next(), Offset(1));
        assert_eq!(Offset(1).prev(), Some(Offset(0)));
        assert_eq!(Offset(0).prev(), None);
    }

    #[test]
    fn test_record_json_roundtrip() {
        let record = Record {
            value: b"hi".to_vec(),
            offset: Offset(3),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "value": [104, 105], "offset": 3 }));

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_msgpack_roundtrip() {
        let record = Record {
            value: vec![0, 1, 2, 255],
            offset: Offset(42),
        };
        let bytes = rmp_serde::to_vec(&record).unwrap();
        let back: Record = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_msgpack_value_is_binary() {
        let record = Record {
            value: vec![0xFF; 100],
            offset: Offset(0),
        };
        let bytes = rmp_serde::to_vec(&record).unwrap();
        // array header + bin8 header + payload + offset fixint
        assert_eq!(bytes.len(), 1 + 2 + 100 + 1);
    }

    #[test]
    fn test_index_entry_payload_len() {
        let entry = IndexEntry {
            position: 19,
            len: 19,
        };
        assert_eq!(entry.payload_len(), 11);

        let narrow = IndexEntry { position: 0, len: 3 };
        assert_eq!(narrow.payload_len(), 0);
    }
}
