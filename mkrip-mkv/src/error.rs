//! Matroska-specific error types.

use thiserror::Error;

/// Errors produced while reading Matroska documents or extracting tracks.
#[derive(Error, Debug)]
pub enum MkvError {
    /// The stream does not start with the EBML magic `0x1A45DFA3`.
    #[error("not an EBML document (missing 0x1A45DFA3 magic)")]
    InvalidMagic,

    /// The document type is not `matroska`.
    #[error("unsupported document type: {0:?}")]
    UnsupportedDocType(String),

    /// The EBML header carries values this reader cannot honour.
    #[error("invalid EBML header: {0}")]
    InvalidHeader(String),

    /// A VINT width byte was zero or wider than the configured maximum.
    #[error("invalid VINT length at offset {offset}")]
    InvalidVintLength {
        /// Absolute byte offset of the offending VINT.
        offset: u64,
    },

    /// A child element extends beyond its parent's declared size.
    #[error("{element} at offset {offset} overflows its parent")]
    ElementOverflow {
        /// Canonical name of the overflowing element.
        element: &'static str,
        /// Absolute byte offset of the element header.
        offset: u64,
    },

    /// A Cluster appeared before Info and Tracks with no SeekHead to follow.
    #[error("unexpected Cluster at offset {offset}")]
    UnexpectedCluster {
        /// Absolute byte offset of the Cluster header.
        offset: u64,
    },

    /// The stream ended inside a declared-size element.
    #[error("unexpected end of stream at offset {offset}")]
    UnexpectedEof {
        /// Absolute byte offset at which the stream ended.
        offset: u64,
    },

    /// Lacing sizes disagree with the block body length.
    #[error("laced frame sizes ({laced}) disagree with body length ({body})")]
    FrameSizeMismatch {
        /// Sum of the laced frame sizes plus lacing header bytes.
        laced: usize,
        /// Length of the block body.
        body: usize,
    },

    /// Extraction was requested for a codec this library cannot rewrite.
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// A required element is absent.
    #[error("missing required element: {0}")]
    MissingElement(&'static str),

    /// A Block or SimpleBlock payload is malformed.
    #[error("invalid block structure: {0}")]
    InvalidBlock(String),

    /// Codec initialisation data does not have the codec-mandated layout.
    #[error("invalid codec private data: {0}")]
    InvalidCodecPrivate(String),

    /// Nesting depth exceeded the recursion limit.
    #[error("recursion limit exceeded at depth {depth}")]
    RecursionLimit {
        /// The depth at which descent was stopped.
        depth: u32,
    },

    /// Error from the Ogg writer during Vorbis extraction.
    #[error(transparent)]
    Ogg(#[from] mkrip_ogg::OggError),

    /// Error from the AVI writer during video extraction.
    #[error(transparent)]
    Avi(#[from] mkrip_avi::AviError),

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Matroska operations.
pub type Result<T> = std::result::Result<T, MkvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MkvError::InvalidVintLength { offset: 100 };
        assert_eq!(err.to_string(), "invalid VINT length at offset 100");

        let err = MkvError::UnexpectedCluster { offset: 64 };
        assert!(err.to_string().contains("64"));

        let err = MkvError::UnsupportedCodec("V_UNKNOWN".into());
        assert!(err.to_string().contains("V_UNKNOWN"));
    }
}
