//! Video track extraction: Microsoft VFW compatibility mode into AVI.

use crate::block::Block;
use crate::codec::codec_ids;
use crate::ebml::EbmlSource;
use crate::error::{MkvError, Result};
use crate::model::TrackEntry;
use crate::scanner::Scanner;
use mkrip_avi::{AviWriter, FourCC, VideoStreamConfig, AVIIF_KEYFRAME};
use std::io::{Seek, Write};

/// BITMAPINFOHEADER is 40 bytes; `biCompression` sits at offset 16.
const BITMAP_INFO_HEADER_LEN: usize = 40;

pub(crate) fn extract<S, W>(scanner: &mut Scanner<S>, track: &TrackEntry, out: W) -> Result<()>
where
    S: EbmlSource,
    W: Write + Seek,
{
    if track.codec_id != codec_ids::V_MS_VFW_FOURCC {
        return Err(MkvError::UnsupportedCodec(track.codec_id.clone()));
    }
    let video = track
        .video
        .as_ref()
        .ok_or(MkvError::MissingElement("Video"))?;
    let private = track
        .codec_private
        .as_ref()
        .ok_or(MkvError::MissingElement("CodecPrivate"))?;
    if private.len() < BITMAP_INFO_HEADER_LEN {
        return Err(MkvError::InvalidCodecPrivate(format!(
            "BITMAPINFOHEADER requires {} bytes, got {}",
            BITMAP_INFO_HEADER_LEN,
            private.len()
        )));
    }
    // A frame rate cannot be derived without a constant frame duration.
    let default_duration = track
        .default_duration
        .ok_or(MkvError::MissingElement("DefaultDuration"))?;

    let scale = scanner.info().timestamp_scale;
    let handler = FourCC::from_u32_le(u32::from_le_bytes([
        private[16],
        private[17],
        private[18],
        private[19],
    ]));

    let config = VideoStreamConfig {
        handler,
        width: video.pixel_width as u32,
        height: video.pixel_height as u32,
        scale: scale as u32,
        rate: (scale as f64 / default_duration as f64 * 1_000_000_000.0) as u32,
        microsec_per_frame: (default_duration as f64 / 1000.0).ceil() as u32,
        format: private.clone(),
    };
    let mut avi = AviWriter::new(out, config)?;

    while let Some(cluster) = scanner.next_cluster()? {
        for payload in &cluster.simple_blocks {
            let block = Block::read(payload)?;
            if block.track_number != track.number {
                continue;
            }
            let keyframe = block.is_keyframe();
            for (i, frame) in block.frames()?.into_iter().enumerate() {
                let flags = if i == 0 && keyframe { AVIIF_KEYFRAME } else { 0 };
                avi.write_frame(frame, flags)?;
            }
        }
        for group in &cluster.block_groups {
            let block = Block::read(&group.block)?;
            if block.track_number != track.number {
                continue;
            }
            // A Block with no references is the keyframe equivalent.
            let keyframe = group.reference_blocks.is_empty();
            for (i, frame) in block.frames()?.into_iter().enumerate() {
                let flags = if i == 0 && keyframe { AVIIF_KEYFRAME } else { 0 };
                avi.write_frame(frame, flags)?;
            }
        }
    }

    avi.finalize()?;
    Ok(())
}
