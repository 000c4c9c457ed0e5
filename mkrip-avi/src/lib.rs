//! AVI container writing
//!
//! This crate emits AVI files over the RIFF (Resource Interchange File
//! Format) chunk structure. It is write-only and geared towards wrapping a
//! single pre-compressed video stream:
//!
//! - A random-access [`RiffWriter`] that nests LIST chunks and patches the
//!   size fields once their content is known.
//! - An [`AviWriter`] that lays out `hdrl` (avih + strl), streams frame
//!   chunks into `movi`, and finishes with an `idx1` index.
//!
//! # Example
//!
//! ```no_run
//! use mkrip_avi::{AviWriter, VideoStreamConfig, FourCC};
//!
//! let file = std::fs::File::create("out.avi").unwrap();
//! let config = VideoStreamConfig {
//!     handler: FourCC(*b"MP42"),
//!     width: 320,
//!     height: 240,
//!     scale: 1_000_000,
//!     rate: 25_000_000,
//!     microsec_per_frame: 40_000,
//!     format: vec![0; 40],
//! };
//! let mut avi = AviWriter::new(file, config).unwrap();
//! avi.write_frame(&[0u8; 128], mkrip_avi::AVIIF_KEYFRAME).unwrap();
//! avi.finalize().unwrap();
//! ```

mod chunks;
mod error;
mod muxer;
mod riff;

pub use chunks::{stream_chunk, FourCC, IndexEntry, StreamChunkKind};
pub use chunks::{AVIF_HASINDEX, AVIF_ISINTERLEAVED, AVIIF_KEYFRAME};
pub use error::{AviError, Result};
pub use muxer::{AviWriter, VideoStreamConfig};
pub use riff::RiffWriter;
