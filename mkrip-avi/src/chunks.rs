//! RIFF chunk identifiers and index records

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// FourCC (Four Character Code) identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create from a little-endian u32 (e.g. `biCompression`)
    pub fn from_u32_le(v: u32) -> Self {
        FourCC(v.to_le_bytes())
    }

    /// Get as string
    pub fn as_str(&self) -> String {
        String::from_utf8_lossy(&self.0).to_string()
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl std::fmt::Debug for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FourCC(\"{}\")", self.as_str())
    }
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        FourCC(bytes)
    }
}

/// Well-known chunk and list IDs
pub mod ids {
    use super::FourCC;

    pub const RIFF: FourCC = FourCC(*b"RIFF");
    pub const AVI: FourCC = FourCC(*b"AVI ");
    pub const LIST: FourCC = FourCC(*b"LIST");
    pub const HDRL: FourCC = FourCC(*b"hdrl");
    pub const AVIH: FourCC = FourCC(*b"avih");
    pub const STRL: FourCC = FourCC(*b"strl");
    pub const STRH: FourCC = FourCC(*b"strh");
    pub const STRF: FourCC = FourCC(*b"strf");
    pub const MOVI: FourCC = FourCC(*b"movi");
    pub const IDX1: FourCC = FourCC(*b"idx1");
    pub const VIDS: FourCC = FourCC(*b"vids");
}

/// Two-letter suffix of a stream data chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChunkKind {
    /// Compressed video frame (`dc`)
    VideoCompressed,
    /// Uncompressed video frame (`db`)
    VideoUncompressed,
    /// Audio data (`wb`)
    Audio,
    /// Palette change (`pc`)
    PaletteChange,
}

impl StreamChunkKind {
    fn suffix(self) -> [u8; 2] {
        match self {
            StreamChunkKind::VideoCompressed => *b"dc",
            StreamChunkKind::VideoUncompressed => *b"db",
            StreamChunkKind::Audio => *b"wb",
            StreamChunkKind::PaletteChange => *b"pc",
        }
    }
}

/// Build a stream data chunk ID such as `00dc` or `01wb`
pub fn stream_chunk(stream: u8, kind: StreamChunkKind) -> FourCC {
    debug_assert!(stream < 100, "stream id out of range");
    let suffix = kind.suffix();
    FourCC([
        b'0' + stream / 10,
        b'0' + stream % 10,
        suffix[0],
        suffix[1],
    ])
}

/// AVI main header flag: the file has an idx1 index
pub const AVIF_HASINDEX: u32 = 1 << 4;
/// AVI main header flag: the file is interleaved
pub const AVIF_ISINTERLEAVED: u32 = 1 << 8;

/// idx1 entry flag: the chunk is a key frame
pub const AVIIF_KEYFRAME: u32 = 1 << 4;

/// AVI index entry (idx1 format, 16 bytes)
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry {
    /// Data chunk ID
    pub chunk_id: FourCC,
    /// AVIIF_* flags
    pub flags: u32,
    /// Offset from the start of the `movi` list
    pub offset: u32,
    /// Size of the chunk data
    pub size: u32,
}

impl IndexEntry {
    /// Write to a writer
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.chunk_id.as_bytes())?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        writer.write_u32::<LittleEndian>(self.offset)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        Ok(())
    }

    /// Check the keyframe flag
    pub fn is_keyframe(&self) -> bool {
        (self.flags & AVIIF_KEYFRAME) != 0
    }
}
