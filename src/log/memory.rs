//! In-memory log.

use super::{max_offset, offset_not_found, CommitLog};
use crate::error::Result;
use crate::types::{Offset, Record};
use parking_lot::Mutex;

/// Append-only, in-memory sequence of records.
///
/// Nothing is persisted; the log lives as long as its owner.
#[derive(Default)]
pub struct Log {
    records: Mutex<Vec<Record>>,
}

impl Log {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, assigning it the next offset.
    pub fn append(&self, mut record: Record) -> Offset {
        let mut records = self.records.lock();
        record.offset = Offset(records.len() as u64);
        let offset = record.offset;
        records.push(record);
        offset
    }

    /// Read the record at `offset`.
    pub fn read(&self, offset: Offset) -> Result<Record> {
        let records = self.records.lock();
        offset
            .as_index()
            .and_then(|i| records.get(i))
            .cloned()
            .ok_or_else(|| offset_not_found(offset, records.len()))
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest assigned offset, `None` while the log is empty.
    pub fn max_offset(&self) -> Option<Offset> {
        max_offset(self.len())
    }
}

impl CommitLog for Log {
    fn append(&self, record: Record) -> Result<Offset> {
        Ok(Log::append(self, record))
    }

    fn read(&self, offset: Offset) -> Result<Record> {
        Log::read(self, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_append_and_read() {
        let log = Log::new();

        let offset = log.append(Record::new(b"hello".to_vec()));
        assert_eq!(offset, Offset(0));

        let record = log.read(Offset(0)).unwrap();
        assert_eq!(record.value, b"hello");
        assert_eq!(record.offset, Offset(0));
    }

    #[test]
    fn test_caller_offset_is_overwritten() {
        let log = Log::new();
        log.append(Record::new("a"));

        let offset = log.append(Record {
            value: b"b".to_vec(),
            offset: Offset(99),
        });
        assert_eq!(offset, Offset(1));
        assert_eq!(log.read(Offset(1)).unwrap().offset, Offset(1));
    }

    #[test]
    fn test_read_past_end() {
        let log = Log::new();
        log.append(Record::new("only"));

        let err = log.read(Offset(1)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::OffsetNotFound { offset: Offset(1), max_offset: Some(Offset(0)) }
        ));
    }

    #[test]
    fn test_read_empty() {
        let log = Log::new();
        assert!(log.is_empty());
        assert_eq!(log.max_offset(), None);

        let err = log.read(Offset(0)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::OffsetNotFound { offset: Offset(0), max_offset: None }
        ));
    }

    #[test]
    fn test_offsets_are_dense() {
        let log = Log::new();
        for i in 0..10u64 {
            assert_eq!(log.append(Record::new(i.to_be_bytes().to_vec())), Offset(i));
        }
        assert_eq!(log.len(), 10);
        assert_eq!(log.max_offset(), Some(Offset(9)));
    }
}
