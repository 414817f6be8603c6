//! Error types for BlockFS
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FsError
pub type Result<T> = std::result::Result<T, FsError>;

/// Unified error type for BlockFS operations
#[derive(Debug, Error)]
pub enum FsError {
    // -------------------------------------------------------------------------
    // Allocation Errors
    // -------------------------------------------------------------------------
    #[error("Insufficient space: requested {requested} blocks, {available} free")]
    InsufficientSpace { requested: usize, available: usize },

    #[error("Invalid size: {size} bytes (must be 1..={max})")]
    InvalidSize { size: usize, max: usize },

    // -------------------------------------------------------------------------
    // Naming Errors
    // -------------------------------------------------------------------------
    #[error("Name too long: {len} bytes (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("File already exists: {0}")]
    DuplicateName(String),

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("File table full ({capacity} files)")]
    TableFull { capacity: usize },

    #[error("Name index full ({capacity} nodes)")]
    IndexFull { capacity: usize },

    // -------------------------------------------------------------------------
    // Access Errors
    // -------------------------------------------------------------------------
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Out of bounds: offset {offset} + length {len} exceeds size {size}")]
    OutOfBounds { offset: usize, len: usize, size: usize },

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt image: {0}")]
    CorruptImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Interpreter Errors
    // -------------------------------------------------------------------------
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl From<bincode::Error> for FsError {
    fn from(err: bincode::Error) -> Self {
        FsError::Serialization(err.to_string())
    }
}
