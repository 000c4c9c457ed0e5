//! Audio track extraction: MPEG elementary streams and Ogg Vorbis.

use crate::block::{laced_frames, Block, Lacing};
use crate::codec::codec_ids;
use crate::ebml::EbmlSource;
use crate::error::{MkvError, Result};
use crate::model::TrackEntry;
use crate::scanner::Scanner;
use mkrip_ogg::{IdentificationHeader, VorbisWriter};
use rand::rngs::OsRng;
use rand::RngCore;
use std::io::Write;

pub(crate) fn extract<S, W>(scanner: &mut Scanner<S>, track: &TrackEntry, out: W) -> Result<()>
where
    S: EbmlSource,
    W: Write,
{
    match track.codec_id.as_str() {
        codec_ids::A_MPEG_L2 | codec_ids::A_MPEG_L3 => extract_mpeg(scanner, track, out),
        codec_ids::A_VORBIS => extract_vorbis(scanner, track, out),
        _ => Err(MkvError::UnsupportedCodec(track.codec_id.clone())),
    }
}

/// MPEG audio frames are self-describing; the elementary stream is the
/// frames concatenated in file order.
fn extract_mpeg<S, W>(scanner: &mut Scanner<S>, track: &TrackEntry, mut out: W) -> Result<()>
where
    S: EbmlSource,
    W: Write,
{
    while let Some(cluster) = scanner.next_cluster()? {
        for payload in &cluster.simple_blocks {
            let block = Block::read(payload)?;
            if block.track_number != track.number {
                continue;
            }
            for frame in block.frames()? {
                out.write_all(frame)?;
            }
        }
        for group in &cluster.block_groups {
            let block = Block::read(&group.block)?;
            if block.track_number != track.number {
                continue;
            }
            for frame in block.frames()? {
                out.write_all(frame)?;
            }
        }
    }
    Ok(())
}

/// Rewrap Vorbis packets into an Ogg logical stream.
///
/// `CodecPrivate` is Xiph-laced and must carry exactly the identification,
/// comment and setup headers. The granule position advances by a quarter of
/// the sum of two successive packet block sizes, so each packet is held back
/// until its successor's block size is known.
fn extract_vorbis<S, W>(scanner: &mut Scanner<S>, track: &TrackEntry, out: W) -> Result<()>
where
    S: EbmlSource,
    W: Write,
{
    let private = track
        .codec_private
        .as_ref()
        .ok_or(MkvError::MissingElement("CodecPrivate"))?;
    let headers = laced_frames(Lacing::Xiph, private)?;
    if headers.len() != 3 {
        return Err(MkvError::InvalidCodecPrivate(format!(
            "Vorbis requires 3 header packets, got {}",
            headers.len()
        )));
    }

    let ident = IdentificationHeader::parse(headers[0])?;
    let blocksizes = [ident.blocksize0 as u64, ident.blocksize1 as u64];
    // Validated for shape only; comments are copied through untouched.
    mkrip_ogg::CommentHeader::parse(headers[1])?;

    let serial = OsRng.next_u32() >> 1;
    let mut writer = VorbisWriter::new(out, serial);
    writer.write_ident_header(headers[0])?;
    writer.write_setup_headers(headers[1], headers[2])?;

    let mut held: Option<Vec<u8>> = None;
    let mut prev_blocksize = 0u64;
    let mut granule = 0u64;

    while let Some(cluster) = scanner.next_cluster()? {
        let mut packets: Vec<&[u8]> = Vec::new();
        for payload in &cluster.simple_blocks {
            let block = Block::read(payload)?;
            if block.track_number == track.number {
                packets.extend(block.frames()?);
            }
        }
        for group in &cluster.block_groups {
            let block = Block::read(&group.block)?;
            if block.track_number == track.number {
                packets.extend(block.frames()?);
            }
        }

        for packet in packets {
            let blocksize =
                blocksizes[usize::from(packet.first().map_or(0, |&b| (b >> 1) & 1) == 1)];
            if let Some(prev) = held.take() {
                writer.write_packet(&prev, granule, false)?;
                granule += (blocksize + prev_blocksize) / 4;
            }
            prev_blocksize = blocksize;
            held = Some(packet.to_vec());
        }
    }

    if let Some(last) = held {
        writer.write_packet(&last, granule, true)?;
    }
    Ok(())
}
