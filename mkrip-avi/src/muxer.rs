//! Single-stream AVI writer
//!
//! Layout: `RIFF('AVI ' LIST('hdrl' avih LIST('strl' strh strf))
//! LIST('movi' 00dc...) idx1)`. The header is written up front with
//! placeholder totals (frame count, stream length, suggested buffer size)
//! which are patched in [`AviWriter::finalize`] once all frames are known.

use crate::chunks::{
    ids, stream_chunk, FourCC, IndexEntry, StreamChunkKind, AVIF_HASINDEX, AVIF_ISINTERLEAVED,
};
use crate::error::{AviError, Result};
use crate::riff::RiffWriter;
use std::io::{Seek, Write};

/// Configuration of the single video stream.
#[derive(Debug, Clone)]
pub struct VideoStreamConfig {
    /// Codec handler FourCC (from `biCompression`).
    pub handler: FourCC,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Time base numerator (`dwScale`).
    pub scale: u32,
    /// Time base denominator (`dwRate`).
    pub rate: u32,
    /// Microseconds between frames for the main header.
    pub microsec_per_frame: u32,
    /// `strf` payload, written verbatim (a BITMAPINFOHEADER).
    pub format: Vec<u8>,
}

/// Minimum BITMAPINFOHEADER length.
const BITMAP_INFO_HEADER_LEN: usize = 40;

/// AVI writer wrapping one compressed video stream.
pub struct AviWriter<W: Write + Seek> {
    riff: RiffWriter<W>,
    index: Vec<IndexEntry>,
    chunk_id: FourCC,

    /// Absolute offsets of fields patched during finalize.
    avih_total_frames_at: u64,
    avih_buffer_size_at: u64,
    strh_length_at: u64,
    strh_buffer_size_at: u64,
    /// Offset of the movi `LIST` header; idx1 offsets are relative to it.
    movi_list_at: u64,

    total_frames: u32,
    max_frame_len: u32,
    finalized: bool,
}

impl<W: Write + Seek> AviWriter<W> {
    /// Write the full header and open the `movi` list.
    pub fn new(sink: W, config: VideoStreamConfig) -> Result<Self> {
        if config.format.len() < BITMAP_INFO_HEADER_LEN {
            return Err(AviError::InvalidStreamFormat {
                len: config.format.len(),
            });
        }

        let mut riff = RiffWriter::new(sink, ids::AVI)?;

        riff.begin_list(ids::HDRL)?;

        let avih_at = riff.position()? + 8;
        riff.chunk(ids::AVIH, &main_header(&config))?;

        riff.begin_list(ids::STRL)?;
        let strh_at = riff.position()? + 8;
        riff.chunk(ids::STRH, &stream_header(&config))?;
        riff.chunk(ids::STRF, &config.format)?;
        riff.end_list()?;

        riff.end_list()?;

        let movi_list_at = riff.position()?;
        riff.begin_list(ids::MOVI)?;

        Ok(AviWriter {
            riff,
            index: Vec::new(),
            chunk_id: stream_chunk(0, StreamChunkKind::VideoCompressed),
            avih_total_frames_at: avih_at + 16,
            avih_buffer_size_at: avih_at + 28,
            strh_length_at: strh_at + 32,
            strh_buffer_size_at: strh_at + 36,
            movi_list_at,
            total_frames: 0,
            max_frame_len: 0,
            finalized: false,
        })
    }

    /// Append one frame as a `00dc` chunk and record its index entry.
    pub fn write_frame(&mut self, data: &[u8], flags: u32) -> Result<()> {
        let offset = self.riff.position()? - self.movi_list_at - 8;
        if offset > u32::MAX as u64 {
            return Err(AviError::DataTooLong { len: offset });
        }
        self.riff.chunk(self.chunk_id, data)?;

        self.index.push(IndexEntry {
            chunk_id: self.chunk_id,
            flags,
            offset: offset as u32,
            size: data.len() as u32,
        });
        self.total_frames += 1;
        self.max_frame_len = self.max_frame_len.max(data.len() as u32);
        Ok(())
    }

    /// Number of frames written so far.
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Length of the largest frame written so far.
    pub fn max_frame_len(&self) -> u32 {
        self.max_frame_len
    }

    /// Close `movi`, write the `idx1` index, patch totals and return the
    /// sink.
    pub fn finalize(mut self) -> Result<W> {
        debug_assert!(!self.finalized);
        self.riff.end_list()?;

        self.riff.begin_chunk(ids::IDX1)?;
        let mut entry_buf = Vec::with_capacity(16);
        for entry in &self.index {
            entry_buf.clear();
            entry.write(&mut entry_buf)?;
            self.riff.write_data(&entry_buf)?;
        }
        self.riff.end_chunk()?;

        self.riff
            .patch_u32(self.avih_total_frames_at, self.total_frames)?;
        self.riff
            .patch_u32(self.avih_buffer_size_at, self.max_frame_len)?;
        self.riff.patch_u32(self.strh_length_at, self.total_frames)?;
        self.riff
            .patch_u32(self.strh_buffer_size_at, self.max_frame_len)?;

        self.finalized = true;
        tracing::debug!(frames = self.total_frames, "avi stream finalized");
        self.riff.finish()
    }
}

/// Serialise the 56-byte `avih` main header.
fn main_header(config: &VideoStreamConfig) -> Vec<u8> {
    let mut h = Vec::with_capacity(56);
    h.extend_from_slice(&config.microsec_per_frame.to_le_bytes());
    h.extend_from_slice(&0u32.to_le_bytes()); // max bytes per second
    h.extend_from_slice(&0u32.to_le_bytes()); // padding granularity
    h.extend_from_slice(&(AVIF_HASINDEX | AVIF_ISINTERLEAVED).to_le_bytes());
    h.extend_from_slice(&0u32.to_le_bytes()); // total frames, patched later
    h.extend_from_slice(&0u32.to_le_bytes()); // initial frames
    h.extend_from_slice(&1u32.to_le_bytes()); // stream count
    h.extend_from_slice(&0u32.to_le_bytes()); // buffer size, patched later
    h.extend_from_slice(&config.width.to_le_bytes());
    h.extend_from_slice(&config.height.to_le_bytes());
    h.extend_from_slice(&[0u8; 16]); // reserved
    h
}

/// Serialise the 56-byte `strh` stream header.
fn stream_header(config: &VideoStreamConfig) -> Vec<u8> {
    let mut h = Vec::with_capacity(56);
    h.extend_from_slice(ids::VIDS.as_bytes());
    h.extend_from_slice(config.handler.as_bytes());
    h.extend_from_slice(&0u32.to_le_bytes()); // flags
    h.extend_from_slice(&0u16.to_le_bytes()); // priority
    h.extend_from_slice(&0u16.to_le_bytes()); // language
    h.extend_from_slice(&0u32.to_le_bytes()); // initial frames
    h.extend_from_slice(&config.scale.to_le_bytes());
    h.extend_from_slice(&config.rate.to_le_bytes());
    h.extend_from_slice(&0u32.to_le_bytes()); // start
    h.extend_from_slice(&0u32.to_le_bytes()); // length, patched later
    h.extend_from_slice(&0u32.to_le_bytes()); // buffer size, patched later
    h.extend_from_slice(&0u32.to_le_bytes()); // quality
    h.extend_from_slice(&0u32.to_le_bytes()); // sample size
    h.extend_from_slice(&[0u8; 8]); // frame rectangle
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::AVIIF_KEYFRAME;
    use byteorder::{ByteOrder, LittleEndian};
    use std::io::Cursor;

    fn test_config() -> VideoStreamConfig {
        let mut format = vec![0u8; 40];
        LittleEndian::write_u32(&mut format[0..4], 40);
        LittleEndian::write_u32(&mut format[4..8], 320);
        LittleEndian::write_u32(&mut format[8..12], 240);
        format[16..20].copy_from_slice(b"MP42");
        VideoStreamConfig {
            handler: FourCC(*b"MP42"),
            width: 320,
            height: 240,
            scale: 1_000_000,
            rate: 25_000_000,
            microsec_per_frame: 40_000,
            format,
        }
    }

    fn find(buf: &[u8], needle: &[u8]) -> usize {
        buf.windows(needle.len())
            .position(|w| w == needle)
            .unwrap_or_else(|| panic!("{:?} not found", String::from_utf8_lossy(needle)))
    }

    #[test]
    fn test_rejects_short_format() {
        let config = VideoStreamConfig {
            format: vec![0; 12],
            ..test_config()
        };
        assert!(matches!(
            AviWriter::new(Cursor::new(Vec::new()), config),
            Err(AviError::InvalidStreamFormat { len: 12 })
        ));
    }

    #[test]
    fn test_riff_skeleton() {
        let w = AviWriter::new(Cursor::new(Vec::new()), test_config()).unwrap();
        let buf = w.finalize().unwrap().into_inner();

        assert_eq!(&buf[0..4], b"RIFF");
        assert_eq!(&buf[8..12], b"AVI ");
        assert_eq!(
            LittleEndian::read_u32(&buf[4..8]) as usize,
            buf.len() - 8
        );
        let hdrl = find(&buf, b"hdrl");
        assert_eq!(&buf[hdrl - 8..hdrl - 4], b"LIST");
        find(&buf, b"avih");
        find(&buf, b"strl");
        find(&buf, b"strh");
        find(&buf, b"strf");
        find(&buf, b"movi");
        find(&buf, b"idx1");
    }

    #[test]
    fn test_stream_header_fields() {
        let w = AviWriter::new(Cursor::new(Vec::new()), test_config()).unwrap();
        let buf = w.finalize().unwrap().into_inner();

        let strh = find(&buf, b"strh") + 8;
        assert_eq!(&buf[strh..strh + 4], b"vids");
        assert_eq!(&buf[strh + 4..strh + 8], b"MP42");
        assert_eq!(LittleEndian::read_u32(&buf[strh + 20..strh + 24]), 1_000_000);
        assert_eq!(LittleEndian::read_u32(&buf[strh + 24..strh + 28]), 25_000_000);
    }

    #[test]
    fn test_frames_and_index() {
        let mut w = AviWriter::new(Cursor::new(Vec::new()), test_config()).unwrap();
        w.write_frame(&[1u8; 100], AVIIF_KEYFRAME).unwrap();
        w.write_frame(&[2u8; 60], 0).unwrap();
        w.write_frame(&[3u8; 80], 0).unwrap();
        assert_eq!(w.total_frames(), 3);
        assert_eq!(w.max_frame_len(), 100);
        let buf = w.finalize().unwrap().into_inner();

        // First movi chunk sits 4 bytes after the movi list type.
        let movi = find(&buf, b"movi");
        assert_eq!(&buf[movi + 4..movi + 8], b"00dc");
        assert_eq!(LittleEndian::read_u32(&buf[movi + 8..movi + 12]), 100);

        // idx1 holds three 16-byte entries; the first is a keyframe at
        // offset 4 from the movi list.
        let idx1 = find(&buf, b"idx1");
        assert_eq!(LittleEndian::read_u32(&buf[idx1 + 4..idx1 + 8]), 48);
        let entry = idx1 + 8;
        assert_eq!(&buf[entry..entry + 4], b"00dc");
        assert_eq!(LittleEndian::read_u32(&buf[entry + 4..entry + 8]), AVIIF_KEYFRAME);
        assert_eq!(LittleEndian::read_u32(&buf[entry + 8..entry + 12]), 4);
        assert_eq!(LittleEndian::read_u32(&buf[entry + 12..entry + 16]), 100);

        // Second entry: 100 bytes + 8-byte header after the first chunk.
        let entry2 = entry + 16;
        assert_eq!(LittleEndian::read_u32(&buf[entry2 + 8..entry2 + 12]), 112);

        // avih total frames patched.
        let avih = find(&buf, b"avih") + 8;
        assert_eq!(LittleEndian::read_u32(&buf[avih + 16..avih + 20]), 3);
        assert_eq!(LittleEndian::read_u32(&buf[avih + 28..avih + 32]), 100);
        // strh length patched.
        let strh = find(&buf, b"strh") + 8;
        assert_eq!(LittleEndian::read_u32(&buf[strh + 32..strh + 36]), 3);
    }

    #[test]
    fn test_odd_frame_padding_tracked_in_offsets() {
        let mut w = AviWriter::new(Cursor::new(Vec::new()), test_config()).unwrap();
        w.write_frame(&[1u8; 33], AVIIF_KEYFRAME).unwrap();
        w.write_frame(&[2u8; 10], 0).unwrap();
        let buf = w.finalize().unwrap().into_inner();

        let idx1 = find(&buf, b"idx1");
        let entry2 = idx1 + 8 + 16;
        // 4 + 8 + 33 + 1 pad byte
        assert_eq!(LittleEndian::read_u32(&buf[entry2 + 8..entry2 + 12]), 46);
    }
}
