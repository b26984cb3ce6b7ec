//! Log backed by a record store.

use super::{max_offset, offset_not_found, CommitLog};
use crate::config::LogConfig;
use crate::error::{Result, StoreError};
use crate::store::RecordStore;
use crate::types::{IndexEntry, Offset, Record, LEN_WIDTH};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Offset-addressed log whose records live in a [`RecordStore`].
///
/// Each record is MessagePack-encoded and appended as one frame. The
/// offset → frame index is held in memory and rebuilt by replaying the store
/// when the log is opened.
pub struct DurableLog {
    /// Frame storage.
    store: RecordStore,

    /// Frame location for every assigned offset, indexed by offset.
    index: Mutex<Vec<IndexEntry>>,
}

impl DurableLog {
    /// Open or create a durable log as described by `config`.
    pub fn open(config: LogConfig) -> Result<Self> {
        Self::from_store(RecordStore::open_with_config(&config)?)
    }

    /// Build a durable log over an open store, replaying any existing frames.
    pub fn from_store(store: RecordStore) -> Result<Self> {
        let index = Self::rebuild_index(&store)?;

        info!(
            path = ?store.path(),
            records = index.len(),
            size = store.size(),
            "opened durable log"
        );

        Ok(Self {
            store,
            index: Mutex::new(index),
        })
    }

    /// Replay every frame in the store and map offsets to frame positions.
    fn rebuild_index(store: &RecordStore) -> Result<Vec<IndexEntry>> {
        let mut index = Vec::new();

        for result in store.scan() {
            let (position, payload) = result?;
            let record: Record = rmp_serde::from_slice(&payload)?;

            if record.offset.as_index() != Some(index.len()) {
                return Err(StoreError::Corruption(format!(
                    "frame at position {} holds offset {}, expected {}",
                    position,
                    record.offset,
                    index.len()
                )));
            }

            index.push(IndexEntry {
                position,
                len: LEN_WIDTH + payload.len() as u64,
            });
        }

        debug!(records = index.len(), "rebuilt offset index");
        Ok(index)
    }

    /// Append a record, assigning it the next offset.
    ///
    /// Store failures are returned unchanged and leave the log as it was.
    pub fn append(&self, mut record: Record) -> Result<Offset> {
        let mut index = self.index.lock();
        record.offset = Offset(index.len() as u64);

        let encoded = rmp_serde::to_vec(&record)?;
        let (len, position) = self.store.append(&encoded)?;
        index.push(IndexEntry { position, len });

        Ok(record.offset)
    }

    /// Read the record at `offset`.
    pub fn read(&self, offset: Offset) -> Result<Record> {
        let entry = {
            let index = self.index.lock();
            offset
                .as_index()
                .and_then(|i| index.get(i))
                .copied()
                .ok_or_else(|| offset_not_found(offset, index.len()))?
        };

        let payload = self.store.read(entry.position)?;
        if payload.len() as u64 != entry.payload_len() {
            return Err(StoreError::Corruption(format!(
                "frame at position {} is {} bytes, index expects {}",
                entry.position,
                payload.len(),
                entry.payload_len()
            )));
        }

        Ok(rmp_serde::from_slice(&payload)?)
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.index.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest assigned offset, `None` while the log is empty.
    pub fn max_offset(&self) -> Option<Offset> {
        max_offset(self.len())
    }

    /// Underlying record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Flush and fsync the underlying store.
    pub fn sync(&self) -> Result<()> {
        self.store.sync()
    }

    /// Flush and close the underlying store.
    pub fn close(&self) -> Result<()> {
        self.store.close()
    }
}

impl CommitLog for DurableLog {
    fn append(&self, record: Record) -> Result<Offset> {
        DurableLog::append(self, record)
    }

    fn read(&self, offset: Offset) -> Result<Record> {
        DurableLog::read(self, offset)
    }
}
