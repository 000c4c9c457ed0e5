//! Subtitle track extraction: SubRip and SubStation Alpha.

use crate::block::Block;
use crate::codec::{codec_ids, is_ssa};
use crate::ebml::EbmlSource;
use crate::error::{MkvError, Result};
use crate::model::TrackEntry;
use crate::scanner::Scanner;
use std::collections::BTreeMap;
use std::io::Write;

use super::block_timestamp_ns;

/// Duration assumed when neither BlockDuration nor DefaultDuration exists.
const FALLBACK_DURATION_NS: i64 = 1_000_000_000;

pub(crate) fn extract<S, W>(scanner: &mut Scanner<S>, track: &TrackEntry, out: W) -> Result<()>
where
    S: EbmlSource,
    W: Write,
{
    match track.codec_id.as_str() {
        codec_ids::S_TEXT_UTF8 | codec_ids::S_TEXT_ASCII => extract_srt(scanner, track, out),
        id if is_ssa(id) => extract_ssa(scanner, track, out),
        _ => Err(MkvError::UnsupportedCodec(track.codec_id.clone())),
    }
}

/// One timed subtitle event.
struct SubEvent {
    start_ns: i64,
    end_ns: i64,
    payload: Vec<u8>,
}

/// Collect the track's BlockGroups across all clusters.
///
/// SimpleBlocks are ignored: subtitle events need a duration, which only a
/// BlockGroup can carry directly.
fn collect_events<S: EbmlSource>(
    scanner: &mut Scanner<S>,
    track: &TrackEntry,
) -> Result<Vec<SubEvent>> {
    let info = scanner.info().clone();
    let tick_ns = info.timestamp_scale as f64 * track.timestamp_scale;
    let mut events = Vec::new();

    while let Some(cluster) = scanner.next_cluster()? {
        for group in &cluster.block_groups {
            let block = Block::read(&group.block)?;
            if block.track_number != track.number {
                continue;
            }
            let start_ns = block_timestamp_ns(&info, track, cluster.timestamp, block.rel_timestamp);
            let duration_ns = group
                .duration
                .map(|d| (d as f64 * tick_ns) as i64)
                .or(track.default_duration.map(|d| d as i64))
                .unwrap_or(FALLBACK_DURATION_NS);
            events.push(SubEvent {
                start_ns,
                end_ns: start_ns + duration_ns,
                payload: block.body().to_vec(),
            });
        }
    }
    Ok(events)
}

fn extract_srt<S, W>(scanner: &mut Scanner<S>, track: &TrackEntry, mut out: W) -> Result<()>
where
    S: EbmlSource,
    W: Write,
{
    let events = collect_events(scanner, track)?;
    for (i, event) in events.iter().enumerate() {
        write!(
            out,
            "{}\n{} --> {}\n",
            i + 1,
            srt_time(event.start_ns),
            srt_time(event.end_ns)
        )?;
        out.write_all(&event.payload)?;
        out.write_all(b"\n\n")?;
    }
    Ok(())
}

fn extract_ssa<S, W>(scanner: &mut Scanner<S>, track: &TrackEntry, mut out: W) -> Result<()>
where
    S: EbmlSource,
    W: Write,
{
    let private = track
        .codec_private
        .as_ref()
        .ok_or(MkvError::MissingElement("CodecPrivate"))?;
    // The script header travels as CodecPrivate and is reproduced verbatim.
    out.write_all(private)?;

    let format = events_format(private).ok_or_else(|| {
        MkvError::InvalidCodecPrivate("no Format line under [Events]".into())
    })?;
    let computed = format
        .iter()
        .filter(|f| matches!(f.as_str(), "marked" | "start" | "end"))
        .count();
    // Stored events lead with a read-order number and omit the computed
    // columns.
    let stored_fields = format.len() + 1 - computed;

    let events = collect_events(scanner, track)?;
    let mut ordered: BTreeMap<u64, String> = BTreeMap::new();
    for event in &events {
        let text = String::from_utf8_lossy(&event.payload);
        let fields: Vec<&str> = text.splitn(stored_fields, ',').collect();
        if fields.len() < stored_fields {
            return Err(MkvError::InvalidBlock(format!(
                "SubStation Alpha event has {} fields, expected {}",
                fields.len(),
                stored_fields
            )));
        }
        let read_order: u64 = fields[0].trim().parse().map_err(|_| {
            MkvError::InvalidBlock(format!("invalid read order: {:?}", fields[0]))
        })?;

        let mut line = String::from("Dialogue: ");
        let mut next_field = 1;
        for (i, column) in format.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            match column.as_str() {
                "marked" => line.push_str("Marked=0"),
                "start" => line.push_str(&ssa_time(event.start_ns)),
                "end" => line.push_str(&ssa_time(event.end_ns)),
                _ => {
                    line.push_str(fields[next_field]);
                    next_field += 1;
                }
            }
        }
        ordered.insert(read_order, line);
    }

    for line in ordered.values() {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// `HH:MM:SS,mmm`
fn srt_time(ns: i64) -> String {
    let ms = ns.max(0) / 1_000_000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        ms / 3_600_000,
        ms / 60_000 % 60,
        ms / 1000 % 60,
        ms % 1000
    )
}

/// `H:MM:SS.cc`
fn ssa_time(ns: i64) -> String {
    let cs = ns.max(0) / 10_000_000;
    format!(
        "{}:{:02}:{:02}.{:02}",
        cs / 360_000,
        cs / 6000 % 60,
        cs / 100 % 60,
        cs % 100
    )
}

/// The lower-cased `Format:` columns under the `[Events]` section.
fn events_format(script: &[u8]) -> Option<Vec<String>> {
    let text = String::from_utf8_lossy(script);
    let mut in_events = false;
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.len() > 1 && line.starts_with('[') && line.ends_with(']') {
            in_events = line.eq_ignore_ascii_case("[Events]");
            continue;
        }
        if in_events {
            if let Some(rest) = line.strip_prefix("Format: ") {
                return Some(
                    rest.split(',')
                        .map(|f| f.trim().to_ascii_lowercase())
                        .collect(),
                );
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srt_time() {
        assert_eq!(srt_time(0), "00:00:00,000");
        assert_eq!(srt_time(1_234_000_000), "00:00:01,234");
        assert_eq!(srt_time(3_661_005_000_000), "01:01:01,005");
        assert_eq!(srt_time(-5), "00:00:00,000");
    }

    #[test]
    fn test_ssa_time() {
        assert_eq!(ssa_time(0), "0:00:00.00");
        assert_eq!(ssa_time(1_230_000_000), "0:00:01.23");
        assert_eq!(ssa_time(3_661_050_000_000), "1:01:01.05");
    }

    #[test]
    fn test_events_format() {
        let script = b"[Script Info]\nTitle: x\n\n[Events]\nFormat: Layer, Start, End, Style, Text\nDialogue: ignored\n";
        let format = events_format(script).unwrap();
        assert_eq!(format, vec!["layer", "start", "end", "style", "text"]);
    }

    #[test]
    fn test_events_format_missing() {
        assert!(events_format(b"[Script Info]\nTitle: x\n").is_none());
        assert!(events_format(b"").is_none());
    }

    #[test]
    fn test_events_format_ignores_other_sections() {
        let script = b"[V4 Styles]\nFormat: Name, Fontname\n[Events]\nFormat: Marked, Start, End, Text\n";
        let format = events_format(script).unwrap();
        assert_eq!(format, vec!["marked", "start", "end", "text"]);
    }
}
