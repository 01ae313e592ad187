//! # Error Types
//!
//! Custom error types for GPS Tracklog using `thiserror`.

use thiserror::Error;

/// Main error type for GPS Tracklog
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A single-byte transaction against the storage device failed
    #[error("Storage bus error at offset 0x{address:04X}: {source}")]
    Bus {
        /// Device offset of the failed transaction
        address: u16,
        #[source]
        source: std::io::Error,
    },

    /// Record slot index outside the log region
    #[error("Slot index {index} outside log capacity {capacity}")]
    SlotOutOfRange { index: u16, capacity: u16 },

    /// Storage device smaller than the log region
    #[error("Storage device holds {actual} bytes, log region needs {required}")]
    DeviceTooSmall { required: usize, actual: usize },

    /// Serial transport errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for GPS Tracklog
pub type Result<T> = std::result::Result<T, TrackerError>;
