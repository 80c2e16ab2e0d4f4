//! Error types for unhwp library.

use std::io;
use thiserror::Error;

/// Result type alias for unhwp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during HWP/HWPX processing.
///
/// Every variant is terminal for the parse call that produced it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input matches neither the compound-file nor the zip signature,
    /// or a signature matched but the container is not an HWP document.
    #[error("Unknown file format: {0}")]
    Format(String),

    /// A version field lies outside the supported range.
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    /// Declared lengths exceed the available bytes.
    #[error("Truncated input in {part} at offset {offset}: {detail}")]
    Truncated {
        /// Part (or container layer) being read.
        part: String,
        /// Byte offset where the missing data was expected.
        offset: u64,
        /// What was being read.
        detail: String,
    },

    /// A record's declared size runs past its container's bound.
    #[error("Malformed record in {part} at offset {offset}: {detail}")]
    MalformedRecord {
        /// Part the record stream came from.
        part: String,
        /// Byte offset of the offending record header.
        offset: usize,
        /// Description of the violation.
        detail: String,
    },

    /// Malformed XML markup.
    #[error("XML syntax error in {part} at byte {position}: {detail}")]
    XmlSyntax {
        /// Part the markup came from.
        part: String,
        /// Reader position when the error was detected.
        position: usize,
        /// Description from the XML reader.
        detail: String,
    },

    /// A required part is missing.
    #[error("Structural error: {0}")]
    Structural(String),

    /// A style inherits from itself.
    #[error("Cyclic style inheritance: {}", chain.join(" -> "))]
    CyclicStyle {
        /// Identifiers in walk order, ending with the repeated one.
        chain: Vec<String>,
    },

    /// The document is password protected or distribution locked.
    #[error("Document is encrypted")]
    Encrypted,

    /// A compressed stream failed to inflate.
    #[error("Decompression failed for {part}: {detail}")]
    Compression {
        /// Part being inflated.
        part: String,
        /// Reason reported by the decoder.
        detail: String,
    },

    /// Input exceeds the caller's size limit.
    #[error("Input of {size} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge {
        /// Input size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// Invalid section selection.
    #[error("Invalid section range: {0}")]
    InvalidSectionRange(String),

    /// Error during rendering (JSON serialization).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Shorthand for a [`Error::Truncated`] error.
    pub(crate) fn truncated(part: impl Into<String>, offset: u64, detail: impl Into<String>) -> Self {
        Error::Truncated {
            part: part.into(),
            offset,
            detail: detail.into(),
        }
    }

    /// Shorthand for a [`Error::MalformedRecord`] error.
    pub(crate) fn malformed(part: impl Into<String>, offset: usize, detail: impl Into<String>) -> Self {
        Error::MalformedRecord {
            part: part.into(),
            offset,
            detail: detail.into(),
        }
    }
}
