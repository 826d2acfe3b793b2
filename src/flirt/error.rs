//! Custom error types for the flirt-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// The `Display` strings are the user-facing parse failure messages and
/// are surfaced verbatim by callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlirtError {
    /// The input is too short for the magic, or the magic is not `IDASGN`.
    #[error("Not a valid FLIRT .sig file")]
    NotFlirt,

    /// The version byte is outside the supported 5..=10 range.
    #[error("Unsupported FLIRT version {0}")]
    UnsupportedVersion(u8),

    /// A header section ended before all of its fields could be read.
    #[error("Truncated {section}")]
    Truncated { section: &'static str },

    /// The compressed body could not be inflated.
    #[error("FLIRT decompression failed")]
    Decompression,

    /// The signature tree ended in the middle of a record.
    #[error("Unexpected EOF in tree")]
    UnexpectedEof,

    /// The signature tree contains a structurally invalid record, such as
    /// a pattern node longer than the format allows.
    #[error("Parse error in signature tree")]
    TreeCorrupt,
}

/// A convenience `Result` type alias using the crate's `FlirtError` type.
pub type Result<T> = std::result::Result<T, FlirtError>;
