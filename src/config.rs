//! Configuration for opening a durable log.

use std::path::PathBuf;

/// Default capacity of the store's write buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Durable log configuration.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Path to the record store file.
    pub path: PathBuf,

    /// Write buffer capacity in bytes.
    pub buffer_capacity: usize,

    /// Whether to create the store file if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./commitlog.store"),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            create_if_missing: true,
        }
    }
}

impl LogConfig {
    /// Configuration for a store at `path` with default settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}
