//! # Error Types
//!
//! This module defines error types used throughout the labelkit library.
//!
//! Every error here is recoverable. Encoding and storage failures degrade the
//! label to its last good state or to defaults; only the CLI reports errors
//! to the user.

use thiserror::Error;

/// Main error type for labelkit operations
#[derive(Debug, Error)]
pub enum LabelKitError {
    /// Identifier could not be encoded as CODE128
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Durable storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Identity provider failure
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Print handoff failure
    #[error(transparent)]
    Print(#[from] PrintError),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The identifier cannot be represented in CODE128.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("Barcode data is empty")]
    Empty,

    #[error("Character {ch:?} at position {position} cannot be encoded in CODE128")]
    UnsupportedCharacter { ch: char, position: usize },

    /// The symbology backend rejected the planned input.
    #[error("CODE128 encoding failed: {0}")]
    Symbology(String),

    /// Even at one dot per module the symbol is wider than the label.
    #[error("Barcode needs {needed} dots but the label has {available}; shorten the FNSKU")]
    TooWide { needed: u32, available: u32 },
}

/// Durable storage unavailable or holding unusable data.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed stored data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Identity provider unreachable or refusing the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Sign-in rejected: {0}")]
    Rejected(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Failure handing a canvas to a print target.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Nothing to print: identifier is empty")]
    EmptyLabel,

    #[error("Refusing to print a preview canvas")]
    PreviewCanvas,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Print spooler error: {0}")]
    Spooler(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
