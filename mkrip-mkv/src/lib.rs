//! # mkrip-mkv
//!
//! Streaming Matroska (.mkv, .mka, .mk3d, .mks) reading and per-codec track
//! extraction.
//!
//! Matroska is layered over EBML, a self-describing tree of typed elements
//! keyed by variable-length IDs with variable-length sizes. This crate
//! provides:
//!
//! - The EBML layer: VINT codec, element headers, leaf decoding, and a
//!   visitor-driven tree walker for inspection tools ([`ebml`]).
//! - The Matroska schema table ([`elements`]) and typed metadata model
//!   ([`model`]).
//! - A [`Scanner`] that validates the EBML head, loads `Info`/`Tracks`
//!   (following `SeekHead` references on seekable sources) and streams
//!   Clusters, recovering from overflowing and damaged elements.
//! - Block/SimpleBlock parsing with all four lacing schemes ([`block`]).
//! - Track extractors that rewrite frames into MPEG elementary streams, Ogg
//!   Vorbis, AVI, SubRip or SubStation Alpha ([`extract`]).
//!
//! ## Example
//!
//! ```no_run
//! use mkrip_mkv::Scanner;
//!
//! let file = std::fs::File::open("movie.mkv").unwrap();
//! let mut scanner = Scanner::open(std::io::BufReader::new(file)).unwrap();
//!
//! for track in &scanner.tracks().entries {
//!     println!("track {}: {}", track.number, track.codec_id);
//! }
//! while let Some(cluster) = scanner.next_cluster().unwrap() {
//!     println!(
//!         "cluster at tick {}: {} blocks",
//!         cluster.timestamp,
//!         cluster.simple_blocks.len() + cluster.block_groups.len()
//!     );
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod codec;
pub mod ebml;
pub mod elements;
pub mod error;
pub mod extract;
pub mod model;
pub mod scanner;

pub use block::{laced_frames, Block, Lacing};
pub use codec::{codec_type, CodecType};
pub use ebml::{EbmlSource, ElementHeader, ForwardSource, SeekSource, SliceSource, Value, Visitor};
pub use error::{MkvError, Result};
pub use extract::extract_track;
pub use model::{
    BlockGroup, Chapters, Cluster, Cues, EbmlHead, Info, SeekHead, Tags, TrackEntry, Tracks,
};
pub use scanner::{Scanner, ScannerState, DOC_TYPE};

/// Check whether a buffer starts with the EBML magic.
pub fn is_mkv_signature(data: &[u8]) -> bool {
    data.len() >= 4 && data[0..4] == [0x1A, 0x45, 0xDF, 0xA3]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_mkv_signature() {
        assert!(is_mkv_signature(&[0x1A, 0x45, 0xDF, 0xA3]));
        assert!(is_mkv_signature(&[0x1A, 0x45, 0xDF, 0xA3, 0x00]));
        assert!(!is_mkv_signature(&[0x1A, 0x45, 0xDF]));
        assert!(!is_mkv_signature(&[0x00, 0x00, 0x00, 0x00]));
    }
}
