//! Error types for ebmlcast-media.

use thiserror::Error;

/// Result type for ebmlcast-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ebmlcast-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction parameters were rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A single write is larger than the whole buffer.
    #[error("write size exceeds buffer capacity: {len} > {capacity}")]
    WriteTooLarge { len: usize, capacity: usize },

    /// A single read is larger than the whole buffer.
    #[error("read size exceeds buffer capacity: {len} > {capacity}")]
    ReadTooLarge { len: u64, capacity: usize },

    /// The requested bytes were overwritten or have not been written yet.
    #[error("read range {start}..{end} is outside the retained window {oldest}..{total}")]
    OutOfRange {
        start: u64,
        end: u64,
        oldest: u64,
        total: u64,
    },

    /// The input could not be tokenized.
    #[error("EBML error: {0}")]
    Ebml(#[from] ebmlcast_ebml::Error),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether the error means the buffer is too small for the stream.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::WriteTooLarge { .. } | Self::ReadTooLarge { .. } | Self::OutOfRange { .. }
        )
    }
}
