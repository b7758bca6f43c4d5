//! Error types for codec operations.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Codec error types.
///
/// Variants fall into three kinds: format errors (the input is not a valid
/// stream, or the output buffer cannot hold it), allocation errors, and
/// everything else. See [`Error::is_format_error`] and
/// [`Error::is_allocation_error`].
#[derive(Debug, Error)]
pub enum Error {
    /// Stream does not start with the expected magic number.
    #[error("invalid magic number: expected 0x{expected:08X}, found 0x{found:08X}")]
    InvalidMagic { expected: u32, found: u32 },

    /// Descriptor version bits are not the supported version.
    #[error("unsupported frame version {version}")]
    UnsupportedVersion { version: u8 },

    /// Block-size indicator is not one of the known classes.
    #[error("invalid block size indicator {indicator}")]
    InvalidBlockSize { indicator: u8 },

    /// Back-reference offset is zero or reaches before the start of output.
    #[error("invalid back-reference: offset {offset} at output position {position}")]
    InvalidOffset { offset: usize, position: usize },

    /// Input ended in the middle of a structure.
    #[error("unexpected EOF after {bytes_read} bytes")]
    UnexpectedEof { bytes_read: usize },

    /// Output buffer too small for the decoded data.
    #[error("buffer too small: need {required} bytes, got {provided}")]
    BufferTooSmall { required: usize, provided: usize },

    /// Input data is corrupted in a way not covered by a more specific variant.
    #[error("corrupted data: {message}")]
    CorruptedData { message: String },

    /// Checksum verification failed (strict checksum policy only).
    #[error("{what} checksum mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    ChecksumMismatch {
        what: &'static str,
        expected: u32,
        actual: u32,
    },

    /// Memory allocation failed.
    #[error("allocation failed: could not allocate {requested_bytes} bytes")]
    AllocationFailed { requested_bytes: usize },

    /// Requested output exceeds the configured ceiling.
    #[error("output of {requested} bytes exceeds limit of {limit} bytes")]
    OutputTooLarge { requested: u64, limit: usize },

    /// Unsupported feature or format.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error from underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a corrupted data error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Error::CorruptedData {
            message: message.into(),
        }
    }

    /// Create a corrupted data error with offset context.
    pub fn corrupted_at(message: impl Into<String>, offset: usize) -> Self {
        Error::CorruptedData {
            message: format!("{} at offset {}", message.into(), offset),
        }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(required: usize, provided: usize) -> Self {
        Error::BufferTooSmall { required, provided }
    }

    /// Create an invalid back-reference error.
    pub fn invalid_offset(offset: usize, position: usize) -> Self {
        Error::InvalidOffset { offset, position }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(what: &'static str, expected: u32, actual: u32) -> Self {
        Error::ChecksumMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(bytes_read: usize) -> Self {
        Error::UnexpectedEof { bytes_read }
    }

    /// Whether the error means the input is not a decodable stream.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidMagic { .. }
                | Error::UnsupportedVersion { .. }
                | Error::InvalidBlockSize { .. }
                | Error::InvalidOffset { .. }
                | Error::UnexpectedEof { .. }
                | Error::BufferTooSmall { .. }
                | Error::CorruptedData { .. }
        )
    }

    /// Whether the error is an allocation failure.
    pub fn is_allocation_error(&self) -> bool {
        matches!(
            self,
            Error::AllocationFailed { .. } | Error::OutputTooLarge { .. }
        )
    }

    /// Get error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::InvalidMagic { .. } => "invalid_magic",
            Error::UnsupportedVersion { .. } => "unsupported_version",
            Error::InvalidBlockSize { .. } => "invalid_block_size",
            Error::InvalidOffset { .. } => "invalid_offset",
            Error::UnexpectedEof { .. } => "unexpected_eof",
            Error::BufferTooSmall { .. } => "buffer_too_small",
            Error::CorruptedData { .. } => "corrupted_data",
            Error::ChecksumMismatch { .. } => "checksum_mismatch",
            Error::AllocationFailed { .. } => "allocation_failed",
            Error::OutputTooLarge { .. } => "output_too_large",
            Error::Unsupported(_) => "unsupported",
            Error::InvalidConfig(_) => "invalid_config",
            Error::Io(_) => "io_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_classification() {
        assert!(Error::unexpected_eof(3).is_format_error());
        assert!(Error::invalid_offset(0, 10).is_format_error());
        assert!(Error::buffer_too_small(10, 5).is_format_error());
        assert!(!Error::AllocationFailed { requested_bytes: 1 }.is_format_error());
        assert!(!Error::checksum_mismatch("block", 1, 2).is_format_error());
    }

    #[test]
    fn test_allocation_classification() {
        let err = Error::OutputTooLarge {
            requested: 1 << 40,
            limit: 1 << 30,
        };
        assert!(err.is_allocation_error());
        assert_eq!(err.category(), "output_too_large");
    }

    #[test]
    fn test_messages() {
        let err = Error::InvalidMagic {
            expected: 0x184D2204,
            found: 0,
        };
        assert_eq!(
            err.to_string(),
            "invalid magic number: expected 0x184D2204, found 0x00000000"
        );
        assert_eq!(
            Error::corrupted_at("bad token", 7).to_string(),
            "corrupted data: bad token at offset 7"
        );
    }
}
