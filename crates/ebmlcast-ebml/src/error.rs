//! Error types for ebmlcast-ebml.

use thiserror::Error;

/// Result type for ebmlcast-ebml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for EBML tokenizing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bytes at `offset` cannot start an element ID.
    #[error("Invalid element ID at offset {offset}: leading byte {byte:#04x}")]
    InvalidId { offset: u64, byte: u8 },

    /// The bytes at `offset` cannot start an element data size.
    #[error("Invalid element size at offset {offset}: leading byte {byte:#04x}")]
    InvalidSize { offset: u64, byte: u8 },

    /// A non-master element declared an unknown size, so its end cannot be found.
    #[error("Element {id:#x} at offset {offset} has unknown size but cannot contain children")]
    UnknownSizeLeaf { id: u32, offset: u64 },
}
