//! Error types for the binary timeseries format

use crate::dtype::DataType;
use thiserror::Error;

/// Errors that can occur when encoding or decoding a timeseries region
#[derive(Debug, Error)]
pub enum TimeseriesError {
    /// Endianness marker is neither 1 nor its byte-swapped form 256
    #[error("Corrupt header: endianness marker should be 1 or 256, got {0}")]
    CorruptHeader(i16),

    /// A decoded dtype tag disagrees with the type the caller requested
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Requested data type
        expected: DataType,
        /// Data type found in the buffer
        actual: DataType,
    },

    /// Destination length disagrees with the decoded element count
    #[error("Size mismatch: region holds {expected} samples, destination has room for {actual}")]
    SizeMismatch {
        /// Element count decoded from the region
        expected: usize,
        /// Length of the caller-provided destination
        actual: usize,
    },

    /// Bytes consumed or produced differ from the declared length
    #[error("Framing fault: expected cursor at {expected}, found {actual}")]
    FramingFault {
        /// Cursor position implied by the declared length
        expected: u64,
        /// Actual cursor position after the operation
        actual: u64,
    },

    /// A dtype byte outside the registered set
    #[error("Unknown dtype tag: {0}")]
    UnknownTag(u8),

    /// Data type that is registered but not allowed in this field
    #[error("Unsupported dtype {dtype} for the {field} field")]
    UnsupportedType {
        /// Data type found or requested
        dtype: DataType,
        /// Name of the header field
        field: &'static str,
    },

    /// Timebase with a zero, negative or non-finite sample interval
    #[error("Invalid timebase: {0}")]
    InvalidTimebase(String),

    /// Time window that cannot be resolved to sample indices
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Negative sample count in the data block
    #[error("Invalid sample count: {0}")]
    InvalidCount(i32),

    /// More samples than an int32 length prefix can describe
    #[error("Too many samples for an int32 length prefix: {0}")]
    TooManySamples(usize),

    /// Index range outside the recorded samples
    #[error("Index range {first}..{end} outside of 0..{count}")]
    IndexOutOfRange {
        /// First requested index
        first: usize,
        /// One past the last requested index
        end: usize,
        /// Number of samples in the region
        count: usize,
    },

    /// Fewer bytes available than the payload declares
    #[error("Truncated data: expected {expected} bytes, got {available} bytes")]
    Truncated {
        /// Bytes required from the cursor position
        expected: u64,
        /// Bytes left in the buffer
        available: u64,
    },

    /// Rebuilding a parsed region did not reproduce the input bytes
    #[error("Round-trip mismatch: rebuilt {rebuilt} bytes differ from the {original} input bytes")]
    RoundTripMismatch {
        /// Length of the input
        original: usize,
        /// Length of the rebuilt output
        rebuilt: usize,
    },

    /// Binary parsing error
    #[error("Binary parsing error: {0}")]
    BinRead(String),

    /// IO error during encoding or decoding
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<binrw::Error> for TimeseriesError {
    fn from(e: binrw::Error) -> Self {
        match e {
            binrw::Error::Io(io) => Self::Io(io),
            other => Self::BinRead(other.to_string()),
        }
    }
}

/// Result type alias for timeseries operations
pub type Result<T> = std::result::Result<T, TimeseriesError>;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = TimeseriesError::CorruptHeader(42);
        assert!(err.to_string().contains("42"));

        let err = TimeseriesError::TypeMismatch {
            expected: DataType::Long,
            actual: DataType::Double,
        };
        assert!(err.to_string().contains("long"));
        assert!(err.to_string().contains("double"));

        let err = TimeseriesError::SizeMismatch {
            expected: 10,
            actual: 3,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains('3'));

        let err = TimeseriesError::UnknownTag(7);
        assert!(err.to_string().contains('7'));

        let err = TimeseriesError::Truncated {
            expected: 64,
            available: 5,
        };
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn test_binrw_io_error_unwrapped() {
        let io = std::io::Error::new(ErrorKind::UnexpectedEof, "eof");
        let err = TimeseriesError::from(binrw::Error::Io(io));
        match err {
            TimeseriesError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::UnexpectedEof),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
