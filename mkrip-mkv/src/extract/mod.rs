//! Per-codec track extraction.
//!
//! [`extract_track`] drains the scanner's cluster stream and rewrites the
//! frames of one track into a codec-appropriate container or elementary
//! stream. Errors are fatal for the requested track only; the caller decides
//! what to do with a partially written sink.

mod audio;
mod subtitle;
mod video;

use crate::codec::{codec_type, CodecType};
use crate::ebml::EbmlSource;
use crate::error::{MkvError, Result};
use crate::model::{Info, TrackEntry};
use crate::scanner::Scanner;
use std::io::{Seek, Write};

/// Extract one track into `out`, consuming the scanner's cluster stream.
pub fn extract_track<S, W>(scanner: &mut Scanner<S>, track: &TrackEntry, out: W) -> Result<()>
where
    S: EbmlSource,
    W: Write + Seek,
{
    match codec_type(&track.codec_id) {
        Some(CodecType::Video) => video::extract(scanner, track, out),
        Some(CodecType::Audio) => audio::extract(scanner, track, out),
        Some(CodecType::Subtitle) => subtitle::extract(scanner, track, out),
        _ => Err(MkvError::UnsupportedCodec(track.codec_id.clone())),
    }
}

/// Absolute block timestamp in nanoseconds.
///
/// Blocks carry ticks relative to their Cluster; the effective scale is the
/// segment scale multiplied by the track scale, and the codec delay shifts
/// the result towards zero.
pub(crate) fn block_timestamp_ns(
    info: &Info,
    track: &TrackEntry,
    cluster_ts: u64,
    rel_timestamp: i16,
) -> i64 {
    let ticks = cluster_ts as i64 + rel_timestamp as i64;
    let scale = info.timestamp_scale as f64 * track.timestamp_scale;
    (ticks as f64 * scale) as i64 - track.codec_delay as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_timestamp_ns() {
        let info = Info::default(); // 1 ms ticks
        let track = TrackEntry::default();
        assert_eq!(block_timestamp_ns(&info, &track, 1000, 0), 1_000_000_000);
        assert_eq!(block_timestamp_ns(&info, &track, 1000, -500), 500_000_000);
    }

    #[test]
    fn test_block_timestamp_applies_track_scale_and_delay() {
        let info = Info::default();
        let track = TrackEntry {
            timestamp_scale: 2.0,
            codec_delay: 1_000_000,
            ..TrackEntry::default()
        };
        assert_eq!(block_timestamp_ns(&info, &track, 10, 0), 19_000_000);
    }
}
