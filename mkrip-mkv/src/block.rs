//! Block and SimpleBlock parsing, including the four lacing schemes.
//!
//! A block payload starts with a VINT track number, a signed 16-bit
//! timestamp relative to the enclosing Cluster, and one flags byte; the rest
//! is the body, which holds one frame or several laced frames.

use crate::ebml::read_vint_data;
use crate::error::{MkvError, Result};

/// Keyframe flag (SimpleBlock only).
pub const FLAG_KEYFRAME: u8 = 0b1000_0000;
/// Invisible flag.
pub const FLAG_INVISIBLE: u8 = 0b0000_1000;
/// Lacing bits.
pub const FLAG_LACING: u8 = 0b0000_0110;
/// Discardable flag (SimpleBlock only).
pub const FLAG_DISCARDABLE: u8 = 0b0000_0001;

/// Frame packing scheme of a block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lacing {
    /// One frame, no lacing header.
    None,
    /// Sizes as 255-runs.
    Xiph,
    /// All frames the same size.
    FixedSize,
    /// First size as a VINT, then signed VINT deltas.
    Ebml,
}

impl Lacing {
    /// Decode the lacing bits of a flags byte.
    pub fn from_flags(flags: u8) -> Lacing {
        match flags & FLAG_LACING {
            0b000 => Lacing::None,
            0b010 => Lacing::Xiph,
            0b100 => Lacing::FixedSize,
            _ => Lacing::Ebml,
        }
    }
}

/// A parsed Block or SimpleBlock, borrowing the element payload.
///
/// The parser reports raw tick values only; applying the timestamp scale and
/// codec delay is the caller's concern.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    /// Track number the block belongs to.
    pub track_number: u64,
    /// Timestamp in ticks, relative to the enclosing Cluster.
    pub rel_timestamp: i16,
    /// Raw flags byte.
    pub flags: u8,
    body: &'a [u8],
}

impl<'a> Block<'a> {
    /// Parse a Block or SimpleBlock element payload.
    pub fn read(payload: &'a [u8]) -> Result<Block<'a>> {
        let (track_number, vint_len) = read_vint_data(payload)
            .map_err(|_| MkvError::InvalidBlock("invalid track number VINT".into()))?;
        let rest = &payload[vint_len..];
        if rest.len() < 3 {
            return Err(MkvError::InvalidBlock("header truncated".into()));
        }
        Ok(Block {
            track_number,
            rel_timestamp: i16::from_be_bytes([rest[0], rest[1]]),
            flags: rest[2],
            body: &rest[3..],
        })
    }

    /// The body bytes after the block header.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Lacing scheme used by the body.
    pub fn lacing(&self) -> Lacing {
        Lacing::from_flags(self.flags)
    }

    /// Keyframe flag; meaningful for SimpleBlocks only.
    pub fn is_keyframe(&self) -> bool {
        self.flags & FLAG_KEYFRAME != 0
    }

    /// Invisible flag.
    pub fn is_invisible(&self) -> bool {
        self.flags & FLAG_INVISIBLE != 0
    }

    /// Discardable flag; meaningful for SimpleBlocks only.
    pub fn is_discardable(&self) -> bool {
        self.flags & FLAG_DISCARDABLE != 0
    }

    /// Split the body into its codec frames.
    pub fn frames(&self) -> Result<Vec<&'a [u8]>> {
        laced_frames(self.lacing(), self.body)
    }
}

/// Split a block body into frames according to the lacing scheme.
///
/// A laced body starts with one byte `n`; it holds `n + 1` frames. The sizes
/// of the first `n` frames are encoded per scheme, the last frame covers the
/// remainder.
pub fn laced_frames(lacing: Lacing, body: &[u8]) -> Result<Vec<&[u8]>> {
    if lacing == Lacing::None {
        return Ok(vec![body]);
    }
    let &count = body
        .first()
        .ok_or_else(|| MkvError::InvalidBlock("laced body is empty".into()))?;
    let n = count as usize;
    let data = &body[1..];

    let mut sizes = Vec::with_capacity(n);
    let mut header = 0usize; // lacing size-field bytes consumed

    match lacing {
        Lacing::None => unreachable!(),
        Lacing::Xiph => {
            for _ in 0..n {
                let mut size = 0usize;
                loop {
                    let &byte = data.get(header).ok_or(MkvError::FrameSizeMismatch {
                        laced: header + 1,
                        body: data.len(),
                    })?;
                    header += 1;
                    size += byte as usize;
                    if byte != 0xFF {
                        break;
                    }
                }
                sizes.push(size);
            }
        }
        Lacing::FixedSize => {
            let total = data.len();
            if total % (n + 1) != 0 {
                return Err(MkvError::FrameSizeMismatch {
                    laced: total - total % (n + 1),
                    body: total,
                });
            }
            sizes.extend(std::iter::repeat(total / (n + 1)).take(n));
        }
        Lacing::Ebml => {
            if n > 0 {
                let (first, m) = read_vint_data(data)
                    .map_err(|_| MkvError::InvalidBlock("invalid lace size VINT".into()))?;
                header += m;
                sizes.push(first as usize);
                let mut prev = first as i64;
                for _ in 1..n {
                    let (raw, m) = read_vint_data(&data[header..])
                        .map_err(|_| MkvError::InvalidBlock("invalid lace size VINT".into()))?;
                    header += m;
                    // Deltas are zero-centred on the VINT range midpoint.
                    let delta = raw as i64 - ((1i64 << (7 * m - 1)) - 1);
                    prev += delta;
                    if prev < 0 {
                        return Err(MkvError::InvalidBlock("negative laced frame size".into()));
                    }
                    sizes.push(prev as usize);
                }
            }
        }
    }

    let explicit: usize = sizes.iter().sum();
    let rest = &data[header..];
    if explicit > rest.len() {
        return Err(MkvError::FrameSizeMismatch {
            laced: header + explicit,
            body: data.len(),
        });
    }

    let mut frames = Vec::with_capacity(n + 1);
    let mut cursor = rest;
    for size in sizes {
        frames.push(&cursor[..size]);
        cursor = &cursor[size..];
    }
    frames.push(cursor);
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laced_body(prefix: &[u8]) -> Vec<u8> {
        let mut body = prefix.to_vec();
        body.extend(std::iter::repeat(0xFFu8).take(800));
        body.extend(std::iter::repeat(0xFEu8).take(500));
        body.extend(std::iter::repeat(0xFDu8).take(1000));
        body
    }

    #[test]
    fn test_no_lacing() {
        let frames = laced_frames(Lacing::None, &[0x01, 0x02, 0x03, 0x04]).unwrap();
        assert_eq!(frames, vec![&[0x01, 0x02, 0x03, 0x04][..]]);
    }

    #[test]
    fn test_xiph_lacing() {
        // Sizes 800 (0xFF 0xFF 0xFF 0x23) and 500 (0xFF 0xF5); the third
        // frame is the remainder.
        let body = laced_body(&[0x02, 0xFF, 0xFF, 0xFF, 0x23, 0xFF, 0xF5]);
        let frames = laced_frames(Lacing::Xiph, &body).unwrap();
        assert_eq!(
            frames.iter().map(|f| f.len()).collect::<Vec<_>>(),
            vec![800, 500, 1000]
        );
        assert!(frames[0].iter().all(|&b| b == 0xFF));
        assert!(frames[1].iter().all(|&b| b == 0xFE));
        assert!(frames[2].iter().all(|&b| b == 0xFD));
    }

    #[test]
    fn test_ebml_lacing() {
        // First size 800 as VINT 0x43 0x20, then delta -300 as signed VINT
        // 0x5E 0xD3.
        let body = laced_body(&[0x02, 0x43, 0x20, 0x5E, 0xD3]);
        let frames = laced_frames(Lacing::Ebml, &body).unwrap();
        assert_eq!(
            frames.iter().map(|f| f.len()).collect::<Vec<_>>(),
            vec![800, 500, 1000]
        );
        assert!(frames[2].iter().all(|&b| b == 0xFD));
    }

    #[test]
    fn test_fixed_lacing() {
        let mut body = vec![0x02];
        body.extend(std::iter::repeat(0xAAu8).take(800));
        body.extend(std::iter::repeat(0xBBu8).take(800));
        body.extend(std::iter::repeat(0xCCu8).take(800));
        let frames = laced_frames(Lacing::FixedSize, &body).unwrap();
        assert_eq!(
            frames.iter().map(|f| f.len()).collect::<Vec<_>>(),
            vec![800, 800, 800]
        );
    }

    #[test]
    fn test_fixed_lacing_uneven_is_error() {
        let body = vec![0x02; 1 + 802]; // 802 bytes cannot split into 3 frames
        assert!(matches!(
            laced_frames(Lacing::FixedSize, &body),
            Err(MkvError::FrameSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_xiph_lacing_overflow_is_error() {
        // Claims an 800-byte first frame but only 10 bytes follow.
        let mut body = vec![0x01, 0xFF, 0xFF, 0xFF, 0x23];
        body.extend_from_slice(&[0u8; 10]);
        assert!(matches!(
            laced_frames(Lacing::Xiph, &body),
            Err(MkvError::FrameSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_frame_sizes_cover_body() {
        // Lacing header bytes plus frame bytes account for the whole body.
        let body = laced_body(&[0x02, 0xFF, 0xFF, 0xFF, 0x23, 0xFF, 0xF5]);
        let frames = laced_frames(Lacing::Xiph, &body).unwrap();
        let lacing_header = 1 + 6;
        let total: usize = frames.iter().map(|f| f.len()).sum();
        assert_eq!(total, body.len() - lacing_header);
    }

    #[test]
    fn test_block_read_simple() {
        // Track 1, relative timestamp 0x0102, keyframe, no lacing.
        let payload = [0x81, 0x01, 0x02, 0x80, 0xDE, 0xAD, 0xBE, 0xEF];
        let block = Block::read(&payload).unwrap();
        assert_eq!(block.track_number, 1);
        assert_eq!(block.rel_timestamp, 0x0102);
        assert!(block.is_keyframe());
        assert!(!block.is_discardable());
        assert_eq!(block.lacing(), Lacing::None);
        assert_eq!(block.body(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(block.frames().unwrap(), vec![&[0xDE, 0xAD, 0xBE, 0xEF][..]]);
    }

    #[test]
    fn test_block_read_negative_timestamp() {
        let payload = [0x81, 0xFF, 0xFE, 0x00, 0x00];
        let block = Block::read(&payload).unwrap();
        assert_eq!(block.rel_timestamp, -2);
    }

    #[test]
    fn test_block_read_two_byte_track() {
        // Track 257 as a two-byte VINT (0x41 0x01).
        let payload = [0x41, 0x01, 0x00, 0x00, 0x06, 0xAA];
        let block = Block::read(&payload).unwrap();
        assert_eq!(block.track_number, 257);
        assert_eq!(block.lacing(), Lacing::Ebml);
    }

    #[test]
    fn test_block_read_truncated() {
        assert!(Block::read(&[0x81, 0x00]).is_err());
        assert!(Block::read(&[]).is_err());
    }

    #[test]
    fn test_lacing_flags() {
        assert_eq!(Lacing::from_flags(0b0000_0000), Lacing::None);
        assert_eq!(Lacing::from_flags(0b0000_0010), Lacing::Xiph);
        assert_eq!(Lacing::from_flags(0b0000_0100), Lacing::FixedSize);
        assert_eq!(Lacing::from_flags(0b0000_0110), Lacing::Ebml);
    }
}
