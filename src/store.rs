//! Append-only record store.
//!
//! Every record is framed as an 8-byte big-endian length followed by the
//! payload bytes, with no padding between frames:
//!
//! ```text
//! [len: u64 BE][payload: len bytes][len: u64 BE][payload: len bytes]...
//! ```
//!
//! Positions handed out by [`RecordStore::append`] are byte positions of a
//! frame's length prefix. Writes go through a buffer; any read flushes it
//! first so readers always observe every append made so far.

use crate::config::LogConfig;
use crate::error::{Result, StoreError};
use crate::types::LEN_WIDTH;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Mutable state guarded by the store lock.
struct Inner {
    /// Buffered writer over the store file. `None` once closed.
    writer: Option<BufWriter<File>>,

    /// Bytes committed to the store, buffered or not.
    size: u64,
}

impl Inner {
    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        self.writer.as_mut().ok_or(StoreError::Closed)
    }

    /// Flush buffered frames and hand back the file for reading.
    fn flushed_file(&mut self) -> Result<&mut File> {
        let writer = self.writer()?;
        writer.flush()?;
        Ok(writer.get_mut())
    }
}

/// File-backed, append-only byte store with length-prefixed framing.
pub struct RecordStore {
    /// Path to the store file, when opened by path.
    path: Option<PathBuf>,

    /// Writer and size, serialized behind one lock.
    inner: Mutex<Inner>,
}

impl RecordStore {
    /// Open or create a record store at `path` with the default buffer size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(&LogConfig::new(path.as_ref()))
    }

    /// Open a record store as described by `config`.
    pub fn open_with_config(config: &LogConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(config.create_if_missing)
            .open(&config.path)?;

        let mut store = Self::with_capacity(file, config.buffer_capacity)?;
        store.path = Some(config.path.clone());

        info!(
            path = %config.path.display(),
            size = store.size(),
            "opened record store"
        );

        Ok(store)
    }

    /// Wrap an already open file. Pre-existing bytes are kept and new
    /// records are appended after them.
    pub fn new(file: File) -> Result<Self> {
        Self::with_capacity(file, crate::config::DEFAULT_BUFFER_CAPACITY)
    }

    /// Wrap an already open file with a custom write buffer capacity.
    pub fn with_capacity(mut file: File, capacity: usize) -> Result<Self> {
        let size = file.metadata()?.len();
        file.seek(SeekFrom::End(0))?;

        Ok(Self {
            path: None,
            inner: Mutex::new(Inner {
                writer: Some(BufWriter::with_capacity(capacity, file)),
                size,
            }),
        })
    }

    /// Append a payload to the store.
    ///
    /// Returns the number of bytes written (prefix + payload) and the
    /// position of the frame's length prefix.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock();
        let position = inner.size;

        let mut frame = Vec::with_capacity(LEN_WIDTH as usize + payload.len());
        frame.extend_from_slice(&(payload.len() as u64).to_be_bytes());
        frame.extend_from_slice(payload);

        let writer = inner.writer()?;
        if let Err(e) = writer.write_all(&frame) {
            Self::discard_partial_frame(writer, position);
            return Err(e.into());
        }

        let written = frame.len() as u64;
        inner.size += written;
        Ok((written, position))
    }

    /// Undo a frame that made it to disk only partially.
    ///
    /// `BufWriter` only fails while writing through to the file. An empty
    /// buffer after a failure means every earlier frame reached the file and
    /// anything past `position` belongs to the failed frame. The cursor
    /// returns to `position` along with the file length.
    fn discard_partial_frame(writer: &mut BufWriter<File>, position: u64) {
        if !writer.buffer().is_empty() {
            return;
        }
        if let Err(e) = writer.get_ref().set_len(position) {
            warn!(position, error = %e, "failed to truncate partial frame");
            return;
        }
        if let Err(e) = writer.get_mut().seek(SeekFrom::Start(position)) {
            warn!(position, error = %e, "failed to rewind after partial frame");
        }
    }

    /// Read the payload of the frame whose length prefix starts at `position`.
    pub fn read(&self, position: u64) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock();
        let size = inner.size;
        let file = inner.flushed_file()?;

        if position.checked_add(LEN_WIDTH).map_or(true, |end| end > size) {
            return Err(StoreError::PositionOutOfRange { position, size });
        }

        let mut len_bytes = [0u8; LEN_WIDTH as usize];
        read_exact_at(file, &mut len_bytes, position)?;
        let len = u64::from_be_bytes(len_bytes);

        let payload_start = position + LEN_WIDTH;
        if payload_start.checked_add(len).map_or(true, |end| end > size) {
            return Err(StoreError::PositionOutOfRange { position, size });
        }

        let mut payload = vec![0u8; len as usize];
        read_exact_at(file, &mut payload, payload_start)?;
        Ok(payload)
    }

    /// Raw positional read into `buf`, bypassing framing.
    ///
    /// Returns the number of bytes read, which is short only when the end
    /// of the file is reached.
    pub fn read_raw(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.lock();
        let file = inner.flushed_file()?;

        file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        let result = loop {
            if filled == buf.len() {
                break Ok(filled);
            }
            match file.read(&mut buf[filled..]) {
                Ok(0) => break Ok(filled),
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };
        file.seek(SeekFrom::End(0))?;

        Ok(result?)
    }

    /// Get current store size, including buffered bytes.
    ///
    /// Unlike the I/O operations this stays available after
    /// [`close`](Self::close) and reports the final size.
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Path of the store file, if it was opened by path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Push buffered frames to the operating system.
    pub fn flush(&self) -> Result<()> {
        self.inner.lock().writer()?.flush()?;
        Ok(())
    }

    /// Flush and fsync the store file.
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let file = inner.flushed_file()?;
        file.sync_all()?;
        Ok(())
    }

    /// Whether [`close`](Self::close) has completed.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().writer.is_none()
    }

    /// Flush buffered frames and close the file.
    ///
    /// Closing an already closed store is a no-op. If the flush fails the
    /// store stays open and the error is returned.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let Some(writer) = inner.writer.take() else {
            return Ok(());
        };

        match writer.into_inner() {
            Ok(file) => {
                drop(file);
                debug!(path = ?self.path, size = inner.size, "closed record store");
                Ok(())
            }
            Err(e) => {
                let (error, writer) = e.into_parts();
                inner.writer = Some(writer);
                Err(error.into())
            }
        }
    }

    /// Iterate every frame from the start of the store.
    ///
    /// The scan covers the bytes present when it was created; frames
    /// appended afterwards are not visited.
    pub fn scan(&self) -> StoreScanner<'_> {
        StoreScanner {
            store: self,
            position: 0,
            end: self.size(),
        }
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Some(writer) = inner.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!(path = ?self.path, error = %e, "failed to flush record store on drop");
            }
        }
    }
}

/// Seek, fill `buf`, then put the cursor back at the end of the file so a
/// store wrapped around a non-append handle keeps writing at the tail.
fn read_exact_at(file: &mut File, buf: &mut [u8], position: u64) -> Result<()> {
    file.seek(SeekFrom::Start(position))?;
    let result = file.read_exact(buf);
    file.seek(SeekFrom::End(0))?;
    Ok(result?)
}

/// Sequential scan over the frames of a store.
pub struct StoreScanner<'a> {
    store: &'a RecordStore,
    position: u64,
    end: u64,
}

impl<'a> Iterator for StoreScanner<'a> {
    type Item = Result<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.end {
            return None;
        }

        let position = self.position;
        match self.store.read(position) {
            Ok(payload) => {
                self.position += LEN_WIDTH + payload.len() as u64;
                Some(Ok((position, payload)))
            }
            Err(e) => {
                self.position = self.end; // Stop iteration on error
                match e {
                    StoreError::PositionOutOfRange { .. } => Some(Err(truncated(position))),
                    other => Some(Err(other)),
                }
            }
        }
    }
}

fn truncated(position: u64) -> StoreError {
    StoreError::Corruption(format!("truncated frame at position {}", position))
}
