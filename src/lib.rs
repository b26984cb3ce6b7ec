//! # Commit Log
//!
//! The storage core of a produce/consume commit-log service: an append-only,
//! offset-addressed record log over a length-prefixed byte store.
//!
//! ## Core Concepts
//!
//! - **Record store**: file-backed, buffered, append-only frames
//!   (`[u64 BE length][payload]`) addressed by byte position
//! - **Offsets**: dense, zero-based sequence numbers assigned at append time
//! - **Logs**: [`Log`] keeps records in memory; [`DurableLog`] persists them
//!   to a [`RecordStore`] and rebuilds its offset index on open
//!
//! ## Example
//!
//! ```ignore
//! use commitlog::{CommitLog, DurableLog, LogConfig, Offset, Record};
//!
//! let log = DurableLog::open(LogConfig::new("./orders.store"))?;
//!
//! // Produce
//! let offset = log.append(Record::new("order-created"))?;
//!
//! // Consume
//! let record = log.read(offset)?;
//! assert_eq!(record.offset, offset);
//! ```

pub mod config;
pub mod error;
pub mod log;
pub mod store;
pub mod types;

// Re-exports
pub use config::LogConfig;
pub use error::{Result, StoreError};
pub use log::{CommitLog, DurableLog, Log};
pub use store::{RecordStore, StoreScanner};
pub use types::*;
