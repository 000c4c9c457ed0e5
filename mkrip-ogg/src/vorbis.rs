//! Vorbis header parsing and Ogg Vorbis stream writing.
//!
//! Layout rules follow the Vorbis I specification: the identification header
//! sits alone on the first page (marked beginning-of-stream), the comment and
//! setup headers share the second page, and audio packets fill subsequent
//! pages until [`VorbisWriter::min_page_size`] bytes are queued or the last
//! packet arrives.

use crate::error::{OggError, Result};
use crate::page::{self, FIRST_PAGE, LAST_PAGE};
use byteorder::{ByteOrder, LittleEndian};
use std::io::Write;

/// Default minimum payload size before a page is flushed.
pub const DEFAULT_MIN_PAGE_SIZE: usize = 4096;

/// Vorbis identification header, packet type 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentificationHeader {
    /// Vorbis version (must be 0).
    pub version: u32,
    /// Number of audio channels.
    pub channels: u8,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Maximum bitrate hint.
    pub bitrate_max: u32,
    /// Nominal bitrate hint.
    pub bitrate_nominal: u32,
    /// Minimum bitrate hint.
    pub bitrate_min: u32,
    /// Short block size in samples.
    pub blocksize0: u16,
    /// Long block size in samples.
    pub blocksize1: u16,
}

impl IdentificationHeader {
    /// Exact length of an identification header packet.
    pub const LEN: usize = 30;

    /// Parse an identification header packet.
    pub fn parse(b: &[u8]) -> Result<Self> {
        if b.len() != Self::LEN {
            return Err(OggError::InvalidHeader(format!(
                "identification header requires {} bytes, got {}",
                Self::LEN,
                b.len()
            )));
        }
        if b[0] != 1 {
            return Err(OggError::InvalidHeader(format!(
                "identification packet type {}",
                b[0]
            )));
        }
        if &b[1..7] != b"vorbis" {
            return Err(OggError::InvalidHeader("missing vorbis magic".into()));
        }
        if b[29] & 1 != 1 {
            return Err(OggError::InvalidHeader("framing bit not set".into()));
        }
        Ok(IdentificationHeader {
            version: LittleEndian::read_u32(&b[7..11]),
            channels: b[11],
            sample_rate: LittleEndian::read_u32(&b[12..16]),
            bitrate_max: LittleEndian::read_u32(&b[16..20]),
            bitrate_nominal: LittleEndian::read_u32(&b[20..24]),
            bitrate_min: LittleEndian::read_u32(&b[24..28]),
            blocksize0: 1 << (b[28] & 0x0F),
            blocksize1: 1 << (b[28] >> 4),
        })
    }

    /// Block size in samples for an audio packet, selected by bit 1 of its
    /// first byte.
    pub fn packet_blocksize(&self, packet: &[u8]) -> u16 {
        match packet.first() {
            Some(b) if (b >> 1) & 1 == 1 => self.blocksize1,
            _ => self.blocksize0,
        }
    }
}

/// Vorbis comment header, packet type 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentHeader {
    /// Encoder vendor string.
    pub vendor: String,
    /// User comment entries.
    pub user_comments: Vec<String>,
}

impl CommentHeader {
    /// Parse a comment header packet.
    pub fn parse(b: &[u8]) -> Result<Self> {
        let short = || OggError::InvalidHeader("comment header truncated".into());
        if b.len() < 7 || b[0] != 3 || &b[1..7] != b"vorbis" {
            return Err(OggError::InvalidHeader("not a comment header".into()));
        }
        let mut b = &b[7..];

        let read_u32 = |b: &mut &[u8]| -> Result<u32> {
            if b.len() < 4 {
                return Err(short());
            }
            let v = LittleEndian::read_u32(&b[..4]);
            *b = &b[4..];
            Ok(v)
        };

        let n = read_u32(&mut b)? as usize;
        if b.len() < n {
            return Err(short());
        }
        let vendor = String::from_utf8_lossy(&b[..n]).into_owned();
        b = &b[n..];

        let count = read_u32(&mut b)? as usize;
        let mut user_comments = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let m = read_u32(&mut b)? as usize;
            if b.len() < m {
                return Err(short());
            }
            user_comments.push(String::from_utf8_lossy(&b[..m]).into_owned());
            b = &b[m..];
        }

        if b.first().map_or(true, |&f| f & 1 != 1) {
            return Err(OggError::InvalidHeader("framing bit not set".into()));
        }
        Ok(CommentHeader {
            vendor,
            user_comments,
        })
    }
}

/// Writer state; transitions are linear and enforced at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Ident,
    Headers,
    Packets,
    Finished,
}

/// Paged Ogg Vorbis stream writer.
pub struct VorbisWriter<W: Write> {
    sink: W,
    serial: u32,
    sequence: u32,
    state: WriterState,
    /// Queued audio packets waiting for a page flush.
    queue: Vec<Vec<u8>>,
    queued_len: usize,
    /// Minimum queued payload before a page is emitted.
    pub min_page_size: usize,
}

impl<W: Write> VorbisWriter<W> {
    /// Create a writer for one logical bitstream identified by `serial`.
    pub fn new(sink: W, serial: u32) -> Self {
        VorbisWriter {
            sink,
            serial,
            sequence: 0,
            state: WriterState::Ident,
            queue: Vec::new(),
            queued_len: 0,
            min_page_size: DEFAULT_MIN_PAGE_SIZE,
        }
    }

    fn next_sequence(&mut self) -> u32 {
        let s = self.sequence;
        self.sequence += 1;
        s
    }

    /// Write the identification header alone on the first page.
    ///
    /// Emits exactly 58 bytes: 27 header bytes, one lacing byte and the
    /// 30-byte identification packet.
    pub fn write_ident_header(&mut self, ident: &[u8]) -> Result<()> {
        if self.state != WriterState::Ident {
            return Err(OggError::InvalidState {
                expected: "identification header",
            });
        }
        if ident.len() != IdentificationHeader::LEN {
            return Err(OggError::InvalidHeader(format!(
                "identification header requires {} bytes, got {}",
                IdentificationHeader::LEN,
                ident.len()
            )));
        }
        let seq = self.next_sequence();
        let page = page::build_page(FIRST_PAGE, 0, self.serial, seq, &[ident]);
        self.sink.write_all(&page)?;
        self.state = WriterState::Headers;
        Ok(())
    }

    /// Write the comment and setup headers together on the second page.
    pub fn write_setup_headers(&mut self, comment: &[u8], setup: &[u8]) -> Result<()> {
        if self.state != WriterState::Headers {
            return Err(OggError::InvalidState {
                expected: "comment and setup headers",
            });
        }
        let seq = self.next_sequence();
        let page = page::build_page(0, 0, self.serial, seq, &[comment, setup]);
        self.sink.write_all(&page)?;
        self.state = WriterState::Packets;
        Ok(())
    }

    /// Queue an audio packet.
    ///
    /// The queue is flushed once `min_page_size` bytes have accumulated, and
    /// unconditionally when `last` is set (with the end-of-stream flag).
    /// `granule_position` is the position reported if this call flushes a
    /// page.
    pub fn write_packet(&mut self, packet: &[u8], granule_position: u64, last: bool) -> Result<()> {
        if self.state != WriterState::Packets {
            return Err(OggError::InvalidState {
                expected: "audio packets",
            });
        }
        self.queued_len += packet.len();
        self.queue.push(packet.to_vec());
        if last {
            self.state = WriterState::Finished;
            return self.flush_page(LAST_PAGE, granule_position);
        }
        if self.queued_len >= self.min_page_size {
            self.flush_page(0, granule_position)?;
        }
        Ok(())
    }

    fn flush_page(&mut self, header_type: u8, granule_position: u64) -> Result<()> {
        let seq = self.next_sequence();
        let packets: Vec<&[u8]> = self.queue.iter().map(|p| p.as_slice()).collect();
        let page = page::build_page(header_type, granule_position, self.serial, seq, &packets);
        self.sink.write_all(&page)?;
        self.queue.clear();
        self.queued_len = 0;
        Ok(())
    }
}
