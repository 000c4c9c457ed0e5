//! # mkrip-ogg
//!
//! Ogg bitstream writing for the mkrip library.
//!
//! This crate builds Ogg pages as specified by RFC 3533 and embeds Vorbis
//! logical streams into them:
//!
//! - Page serialisation with the segment-table lacing scheme and the
//!   Ogg-specific CRC-32 (polynomial `0x04C11DB7`, MSB-first, zero init,
//!   no final XOR — *not* the IEEE CRC-32).
//! - Vorbis identification/comment header parsing.
//! - A paged [`VorbisWriter`] that lays out the three Vorbis headers the way
//!   the Vorbis I specification requires and batches audio packets into
//!   pages of a configurable minimum size.
//!
//! ## Example
//!
//! ```no_run
//! use mkrip_ogg::VorbisWriter;
//!
//! let out = std::fs::File::create("audio.ogg").unwrap();
//! let mut w = VorbisWriter::new(out, 0x1234_5678);
//! # let (ident, comment, setup, packet) = (vec![], vec![], vec![], vec![]);
//! w.write_ident_header(&ident).unwrap();
//! w.write_setup_headers(&comment, &setup).unwrap();
//! w.write_packet(&packet, 0, true).unwrap();
//! ```

#![warn(clippy::all)]

pub mod crc;
pub mod error;
pub mod page;
pub mod vorbis;

pub use error::{OggError, Result};
pub use page::{build_page, CONTINUED_PACKET, FIRST_PAGE, LAST_PAGE};
pub use vorbis::{CommentHeader, IdentificationHeader, VorbisWriter};
