//! Error types for RIFF/AVI writing

use std::fmt;
use std::io;

/// Result type for AVI operations
pub type Result<T> = std::result::Result<T, AviError>;

/// Errors that can occur while writing RIFF/AVI data
#[derive(Debug)]
pub enum AviError {
    /// IO error during write or seek
    Io(io::Error),
    /// A chunk or the file would exceed the 32-bit RIFF size limit
    DataTooLong {
        /// The size that did not fit.
        len: u64,
    },
    /// `end_list` called with no open list, or `finish` with lists still open
    UnbalancedList {
        /// Number of lists open at the time of the call.
        open: usize,
    },
    /// A chunk was opened while another chunk was still open
    ChunkStillOpen,
    /// Chunk data was written or a chunk closed with no chunk open
    NoOpenChunk,
    /// The stream format data is too short to be a BITMAPINFOHEADER
    InvalidStreamFormat {
        /// Length of the rejected format blob.
        len: usize,
    },
}

impl fmt::Display for AviError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AviError::Io(e) => write!(f, "IO error: {}", e),
            AviError::DataTooLong { len } => {
                write!(f, "data requires more than 2^32 bytes: {}", len)
            }
            AviError::UnbalancedList { open } => {
                write!(f, "unbalanced list nesting ({} open)", open)
            }
            AviError::ChunkStillOpen => write!(f, "previous chunk has not been closed"),
            AviError::NoOpenChunk => write!(f, "no chunk is open"),
            AviError::InvalidStreamFormat { len } => {
                write!(f, "stream format too short: {} bytes", len)
            }
        }
    }
}

impl std::error::Error for AviError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AviError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for AviError {
    fn from(e: io::Error) -> Self {
        AviError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AviError::DataTooLong { len: 1 << 33 };
        assert!(err.to_string().contains("2^32"));

        let err = AviError::UnbalancedList { open: 2 };
        assert!(err.to_string().contains('2'));
    }
}
