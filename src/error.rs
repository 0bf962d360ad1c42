//! Error types for the unhwp library.

use std::io;
use thiserror::Error;

/// Result type alias for unhwp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during HWP/HWPX processing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as HWP or HWPX.
    #[error("Unknown file format: not a valid HWP or HWPX document")]
    UnknownFormat,

    /// The HWP binary sub-version is outside the supported range.
    #[error("Unsupported HWP version: {0}")]
    UnsupportedVersion(String),

    /// The compound-file container is not valid (bad magic, bad header).
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// The container directory is internally inconsistent.
    #[error("Corrupt container directory: {0}")]
    CorruptDirectory(String),

    /// A stream referenced by the document does not exist in the container.
    #[error("Missing stream: {0}")]
    MissingStream(String),

    /// A compressed stream could not be decompressed.
    #[error("Decompression error in stream {stream}: {reason}")]
    Decompression {
        /// Name of the stream that failed to decompress
        stream: String,
        /// Underlying decoder message
        reason: String,
    },

    /// A record header declared a payload extending past the end of its stream.
    #[error("Truncated record in stream {stream} at offset {offset}")]
    TruncatedRecord {
        /// Name of the stream being decoded
        stream: String,
        /// Byte offset of the offending record header
        offset: usize,
    },

    /// A record's nesting level jumped by more than one.
    #[error(
        "Malformed record level sequence in stream {stream} at offset {offset}: \
         level {found} follows an open depth of {expected_max}"
    )]
    MalformedLevelSequence {
        /// Name of the stream being decoded
        stream: String,
        /// Byte offset of the offending record header
        offset: usize,
        /// Deepest level a record could legally open at this point
        expected_max: u16,
        /// Level the record actually declared
        found: u16,
    },

    /// The document is password-protected or a distribution document.
    #[error("Document is encrypted")]
    Encrypted,

    /// Text payload could not be decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Structural error in an HWPX package (XML or manifest).
    #[error("HWPX parsing error: {0}")]
    Parse(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::FileNotFound => Error::MissingStream("zip entry".to_string()),
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::InvalidContainer(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
