//! Offset-addressed logs.
//!
//! [`Log`] keeps records in memory. [`DurableLog`] frames every record into a
//! [`RecordStore`](crate::RecordStore) and keeps only an offset index in
//! memory. Both assign dense, zero-based offsets and implement [`CommitLog`].

mod durable;
mod memory;

pub use durable::DurableLog;
pub use memory::Log;

use crate::error::{Result, StoreError};
use crate::types::{Offset, Record};

/// Produce/consume boundary shared by every log implementation.
pub trait CommitLog: Send + Sync {
    /// Append a record and return the offset assigned to it.
    fn append(&self, record: Record) -> Result<Offset>;

    /// Read the record at `offset`.
    ///
    /// Fails with [`StoreError::OffsetNotFound`] when `offset` is past the
    /// largest assigned offset, including on an empty log.
    fn read(&self, offset: Offset) -> Result<Record>;
}

/// Largest assigned offset of a log holding `len` records.
fn max_offset(len: usize) -> Option<Offset> {
    (len as u64).checked_sub(1).map(Offset)
}

fn offset_not_found(offset: Offset, len: usize) -> StoreError {
    StoreError::OffsetNotFound {
        offset,
        max_offset: max_offset(len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_offset() {
        assert_eq!(max_offset(0), None);
        assert_eq!(max_offset(1), Some(Offset(0)));
        assert_eq!(max_offset(10), Some(Offset(9)));
    }
}
