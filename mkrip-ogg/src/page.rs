//! Ogg page serialisation per RFC 3533.

use crate::crc;

/// Capture pattern at the start of every page.
pub const MAGIC: &[u8; 4] = b"OggS";

/// Stream structure version.
pub const VERSION: u8 = 0x00;

/// Header-type flag: the page continues a packet from the previous page.
pub const CONTINUED_PACKET: u8 = 0x01;
/// Header-type flag: first page of a logical bitstream (bos).
pub const FIRST_PAGE: u8 = 0x02;
/// Header-type flag: last page of a logical bitstream (eos).
pub const LAST_PAGE: u8 = 0x04;

/// Fixed header length before the segment table.
const HEADER_LEN: usize = 27;

/// Byte range of the CRC field within the header.
const CRC_RANGE: std::ops::Range<usize> = 22..26;

/// Serialise one Ogg page carrying the given packets.
///
/// Each packet contributes `len / 255` lacing bytes of value 255 followed by
/// one byte of `len % 255`; a packet whose length is a multiple of 255 is
/// therefore terminated by a zero lacing byte. The CRC is computed over the
/// whole page with the checksum field zeroed, then patched in place.
pub fn build_page(
    header_type: u8,
    granule_position: u64,
    serial: u32,
    sequence: u32,
    packets: &[&[u8]],
) -> Vec<u8> {
    let mut lacing = Vec::new();
    for packet in packets {
        let mut len = packet.len();
        while len >= 255 {
            lacing.push(255);
            len -= 255;
        }
        lacing.push(len as u8);
    }
    debug_assert!(lacing.len() <= 255, "too many segments for one page");

    let body_len: usize = packets.iter().map(|p| p.len()).sum();
    let mut page = Vec::with_capacity(HEADER_LEN + lacing.len() + body_len);

    page.extend_from_slice(MAGIC);
    page.push(VERSION);
    page.push(header_type);
    page.extend_from_slice(&granule_position.to_le_bytes());
    page.extend_from_slice(&serial.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&0u32.to_le_bytes()); // checksum placeholder
    page.push(lacing.len() as u8);
    page.extend_from_slice(&lacing);
    for packet in packets {
        page.extend_from_slice(packet);
    }

    let sum = crc::checksum(&page);
    page[CRC_RANGE].copy_from_slice(&sum.to_le_bytes());
    page
}

/// Number of lacing bytes a packet of `len` bytes occupies in the segment
/// table.
pub fn lacing_len(len: usize) -> usize {
    len / 255 + 1
}
