//! Error types for the commit log.

use crate::types::Offset;
use std::fmt;
use thiserror::Error;

/// Main error type for store and log operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Offset {offset} not found, largest offset is {}", MaxOffset(.max_offset))]
    OffsetNotFound {
        offset: Offset,
        max_offset: Option<Offset>,
    },

    #[error("Position {position} out of range (store size is {size})")]
    PositionOutOfRange { position: u64, size: u64 },

    #[error("Store is closed")]
    Closed,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),
}

/// Renders the largest offset of a possibly empty log.
struct MaxOffset<'a>(&'a Option<Offset>);

impl fmt::Display for MaxOffset<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(offset) => write!(f, "{}", offset),
            None => write!(f, "none (log is empty)"),
        }
    }
}

impl From<rmp_serde::encode::Error> for StoreError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for StoreError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        StoreError::Deserialization(e.to_string())
    }
}

/// Result type for store and log operations.
pub type Result<T> = std::result::Result<T, StoreError>;
