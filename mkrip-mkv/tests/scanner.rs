//! End-to-end scanner and extraction tests over synthesised documents.

use mkrip_mkv::ebml::encode_vint;
use mkrip_mkv::{elements, extract_track, MkvError, Scanner, ScannerState};
use std::io::Cursor;

// ---------------------------------------------------------------------------
// Document builder
// ---------------------------------------------------------------------------

fn id_bytes(id: u32) -> Vec<u8> {
    let bytes = id.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(3);
    bytes[start..].to_vec()
}

/// Element with a known, minimally encoded size.
fn el(id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = id_bytes(id);
    let (size, len) = encode_vint(payload.len() as u64).unwrap();
    out.extend_from_slice(&size[..len]);
    out.extend_from_slice(payload);
    out
}

/// Element with an unknown size marker; the payload just follows.
fn el_unknown(id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = id_bytes(id);
    out.push(0xFF);
    out.extend_from_slice(payload);
    out
}

fn uint_payload(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}

fn uint_el(id: u32, value: u64) -> Vec<u8> {
    el(id, &uint_payload(value))
}

/// Unsigned element padded to eight bytes, for position fields whose final
/// value is filled in on a second pass.
fn uint_el_wide(id: u32, value: u64) -> Vec<u8> {
    el(id, &value.to_be_bytes())
}

fn str_el(id: u32, value: &str) -> Vec<u8> {
    el(id, value.as_bytes())
}

fn float_el(id: u32, value: f64) -> Vec<u8> {
    el(id, &value.to_be_bytes())
}

fn ebml_head() -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend(uint_el(elements::EBML_VERSION, 1));
    payload.extend(uint_el(elements::EBML_READ_VERSION, 1));
    payload.extend(uint_el(elements::EBML_MAX_ID_LENGTH, 4));
    payload.extend(uint_el(elements::EBML_MAX_SIZE_LENGTH, 8));
    payload.extend(str_el(elements::DOC_TYPE, "matroska"));
    payload.extend(uint_el(elements::DOC_TYPE_VERSION, 2));
    payload.extend(uint_el(elements::DOC_TYPE_READ_VERSION, 2));
    el(elements::EBML, &payload)
}

fn info_el(timestamp_scale: u64, duration: Option<f64>) -> Vec<u8> {
    let mut payload = uint_el(elements::TIMESTAMP_SCALE, timestamp_scale);
    if let Some(d) = duration {
        payload.extend(float_el(elements::DURATION, d));
    }
    payload.extend(str_el(elements::MUXING_APP, "mkrip test builder"));
    payload.extend(str_el(elements::WRITING_APP, "mkrip test builder"));
    el(elements::INFO, &payload)
}

struct TrackSpec {
    number: u64,
    track_type: u8,
    codec_id: &'static str,
    codec_private: Option<Vec<u8>>,
    default_duration: Option<u64>,
}

fn tracks_el(specs: &[TrackSpec]) -> Vec<u8> {
    let mut payload = Vec::new();
    for spec in specs {
        let mut entry = uint_el(elements::TRACK_NUMBER, spec.number);
        entry.extend(uint_el(elements::TRACK_UID, spec.number * 1000 + 7));
        entry.extend(uint_el(elements::TRACK_TYPE, spec.track_type as u64));
        entry.extend(str_el(elements::CODEC_ID, spec.codec_id));
        if let Some(private) = &spec.codec_private {
            entry.extend(el(elements::CODEC_PRIVATE, private));
        }
        if let Some(dd) = spec.default_duration {
            entry.extend(uint_el(elements::DEFAULT_DURATION, dd));
        }
        payload.extend(el(elements::TRACK_ENTRY, &entry));
    }
    el(elements::TRACKS, &payload)
}

fn simple_block(track: u8, rel_ts: i16, flags: u8, body: &[u8]) -> Vec<u8> {
    let mut payload = vec![0x80 | track];
    payload.extend_from_slice(&rel_ts.to_be_bytes());
    payload.push(flags);
    payload.extend_from_slice(body);
    el(elements::SIMPLE_BLOCK, &payload)
}

fn block_group(track: u8, rel_ts: i16, duration: Option<u64>, body: &[u8]) -> Vec<u8> {
    let mut block = vec![0x80 | track];
    block.extend_from_slice(&rel_ts.to_be_bytes());
    block.push(0x00);
    block.extend_from_slice(body);
    let mut payload = el(elements::BLOCK, &block);
    if let Some(d) = duration {
        payload.extend(uint_el(elements::BLOCK_DURATION, d));
    }
    el(elements::BLOCK_GROUP, &payload)
}

fn cluster_el(timestamp: u64, blocks: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = uint_el(elements::TIMESTAMP, timestamp);
    for block in blocks {
        payload.extend_from_slice(block);
    }
    el(elements::CLUSTER, &payload)
}

fn seek_entry(target: u32, position: u64) -> Vec<u8> {
    let mut payload = el(elements::SEEK_ID, &id_bytes(target));
    payload.extend(uint_el_wide(elements::SEEK_POSITION, position));
    el(elements::SEEK, &payload)
}

fn document(segment_payload: &[u8], known_size: bool) -> Vec<u8> {
    let mut doc = ebml_head();
    if known_size {
        doc.extend(el(elements::SEGMENT, segment_payload));
    } else {
        doc.extend(el_unknown(elements::SEGMENT, segment_payload));
    }
    doc
}

fn audio_track(codec_id: &'static str) -> TrackSpec {
    TrackSpec {
        number: 1,
        track_type: elements::TRACK_TYPE_AUDIO,
        codec_id,
        codec_private: None,
        default_duration: None,
    }
}

fn drain<R: std::io::Read + std::io::Seek>(
    scanner: &mut Scanner<mkrip_mkv::SeekSource<R>>,
) -> (usize, Option<MkvError>) {
    let mut count = 0;
    loop {
        match scanner.next_cluster() {
            Ok(Some(_)) => count += 1,
            Ok(None) => return (count, None),
            Err(e) => return (count, Some(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Scanner scenarios
// ---------------------------------------------------------------------------

#[test]
fn basic_linear_file() {
    let mut segment = info_el(1_000_000, Some(87_336.0));
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    segment.extend(cluster_el(0, &[simple_block(1, 0, 0x80, b"one")]));
    segment.extend(cluster_el(40, &[simple_block(1, 0, 0x80, b"two")]));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    assert_eq!(scanner.head().doc_type, "matroska");
    assert_eq!(scanner.head().max_id_length, 4);
    assert_eq!(scanner.head().max_size_length, 8);
    assert_eq!(scanner.head().doc_type_version, 2);
    assert_eq!(scanner.info().timestamp_scale, 1_000_000);
    assert_eq!(scanner.info().duration, Some(87_336.0));
    assert_eq!(scanner.info().duration_ns(), Some(87_336_000_000));
    assert_eq!(scanner.tracks().entries.len(), 1);
    assert_eq!(scanner.tracks().entries[0].codec_id, "A_MPEG/L3");

    let first = scanner.next_cluster().unwrap().unwrap();
    assert_eq!(first.timestamp, 0);
    assert_eq!(first.simple_blocks.len(), 1);
    let second = scanner.next_cluster().unwrap().unwrap();
    assert_eq!(second.timestamp, 40);
    assert!(scanner.next_cluster().unwrap().is_none());
    assert_eq!(scanner.state(), ScannerState::Ended);
}

#[test]
fn fallback_seek_head_is_untrusted() {
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    segment.extend(cluster_el(0, &[simple_block(1, 0, 0x80, b"x")]));
    let doc = document(&segment, true);

    let scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let (seek_head, trusted) = scanner.seek_head();
    assert!(!trusted);
    let ids: Vec<u32> = seek_head.entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![elements::INFO, elements::TRACKS, elements::CLUSTER]);
    // The first entry points at the first Segment child.
    assert_eq!(seek_head.entries[0].position, 0);
}

#[test]
fn unknown_segment_size_live_stream() {
    let mut segment = info_el(1_000_000, None); // live: no Duration
    segment.extend(tracks_el(&[audio_track("A_MPEG/L2")]));
    for i in 0..3u64 {
        segment.extend(cluster_el(i * 40, &[simple_block(1, 0, 0x80, b"pcm")]));
    }
    let doc = document(&segment, false);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    assert!(scanner.info().duration.is_none());
    let (count, err) = drain(&mut scanner);
    assert_eq!(count, 3);
    assert!(err.is_none());
}

#[test]
fn non_default_timestamp_scale() {
    let mut segment = info_el(100_000, Some(475_090.0)); // 100 µs ticks
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    segment.extend(cluster_el(0, &[simple_block(1, 0, 0x80, b"x")]));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    assert_eq!(scanner.info().timestamp_scale, 100_000);
    assert_eq!(scanner.info().duration_ns(), Some(47_509_000_000));
    let (count, err) = drain(&mut scanner);
    assert_eq!(count, 1);
    assert!(err.is_none());
}

#[test]
fn cluster_before_metadata_without_seek_head_fails() {
    let mut segment = cluster_el(0, &[simple_block(1, 0, 0x80, b"x")]);
    segment.extend(info_el(1_000_000, None));
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    let doc = document(&segment, true);

    let result = Scanner::open(Cursor::new(doc));
    assert!(matches!(result, Err(MkvError::UnexpectedCluster { .. })));
}

#[test]
fn metadata_located_through_seek_head() {
    // Layout: SeekHead, clusters, Info, Tracks. Two passes because the
    // SeekHead length is position-independent (wide position fields).
    let build = |pos_info: u64, pos_tracks: u64, pos_cluster: u64| -> Vec<u8> {
        let mut entries = seek_entry(elements::INFO, pos_info);
        entries.extend(seek_entry(elements::TRACKS, pos_tracks));
        entries.extend(seek_entry(elements::CLUSTER, pos_cluster));
        el(elements::SEEK_HEAD, &entries)
    };
    let c1 = cluster_el(0, &[simple_block(1, 0, 0x80, b"one")]);
    let c2 = cluster_el(40, &[simple_block(1, 0, 0x80, b"two")]);
    let info = info_el(1_000_000, Some(80.0));
    let tracks = tracks_el(&[audio_track("A_MPEG/L3")]);

    let sh_len = build(0, 0, 0).len() as u64;
    let pos_cluster = sh_len;
    let pos_info = pos_cluster + (c1.len() + c2.len()) as u64;
    let pos_tracks = pos_info + info.len() as u64;

    let mut segment = build(pos_info, pos_tracks, pos_cluster);
    segment.extend_from_slice(&c1);
    segment.extend_from_slice(&c2);
    segment.extend_from_slice(&info);
    segment.extend_from_slice(&tracks);
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let (seek_head, trusted) = scanner.seek_head();
    assert!(trusted);
    assert_eq!(seek_head.entries.len(), 3);
    assert_eq!(scanner.info().duration, Some(80.0));
    assert_eq!(scanner.tracks().entries.len(), 1);

    let (count, err) = drain(&mut scanner);
    assert_eq!(count, 2);
    assert!(err.is_none(), "unexpected error: {err:?}");
}

#[test]
fn resyncs_over_junk_between_clusters() {
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    segment.extend(cluster_el(0, &[simple_block(1, 0, 0x80, b"one")]));
    segment.extend_from_slice(&[0x00, 0x00, 0x00]); // damaged bytes
    segment.extend(cluster_el(40, &[simple_block(1, 0, 0x80, b"two")]));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let (count, err) = drain(&mut scanner);
    assert_eq!(count, 2);
    assert!(err.is_none(), "unexpected error: {err:?}");
}

#[test]
fn clamps_oversized_child_to_segment_end() {
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    // A Void claiming far more than the Segment has left.
    let mut void = id_bytes(elements::VOID);
    let (size, len) = encode_vint(10_000).unwrap();
    void.extend_from_slice(&size[..len]);
    void.extend_from_slice(&[0u8; 4]);
    segment.extend_from_slice(&void);
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let (count, err) = drain(&mut scanner);
    assert_eq!(count, 0);
    assert!(err.is_none(), "unexpected error: {err:?}");
}

#[test]
fn error_after_partial_success_on_truncation() {
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    segment.extend(cluster_el(0, &[simple_block(1, 0, 0x80, b"one")]));
    // Second cluster truncated: declared larger than the remaining bytes.
    let mut broken = id_bytes(elements::CLUSTER);
    let (size, len) = encode_vint(200).unwrap();
    broken.extend_from_slice(&size[..len]);
    broken.extend(uint_el(elements::TIMESTAMP, 40));
    let mut sb = simple_block(1, 0, 0x80, b"tw");
    sb.truncate(sb.len() - 1);
    broken.extend_from_slice(&sb);
    segment.extend_from_slice(&broken);
    let doc = document(&segment, false);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let (count, err) = drain(&mut scanner);
    assert_eq!(count, 1);
    assert!(matches!(err, Some(MkvError::UnexpectedEof { .. })), "{err:?}");
    assert_eq!(scanner.state(), ScannerState::Failed);
}

#[test]
fn unknown_size_cluster_ends_at_next_cluster() {
    let mut inner = uint_el(elements::TIMESTAMP, 0);
    inner.extend(simple_block(1, 0, 0x80, b"one"));
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    segment.extend(el_unknown(elements::CLUSTER, &inner));
    segment.extend(cluster_el(40, &[simple_block(1, 0, 0x80, b"two")]));
    let doc = document(&segment, false);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let first = scanner.next_cluster().unwrap().unwrap();
    assert_eq!(first.timestamp, 0);
    assert_eq!(first.simple_blocks.len(), 1);
    let second = scanner.next_cluster().unwrap().unwrap();
    assert_eq!(second.timestamp, 40);
    assert!(scanner.next_cluster().unwrap().is_none());
}

#[test]
fn streaming_source_reads_linear_file() {
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    segment.extend(cluster_el(0, &[simple_block(1, 0, 0x80, b"one")]));
    let doc = document(&segment, true);

    // No Seek available at all; metadata precedes clusters so this works.
    let mut scanner = Scanner::open_streaming(&doc[..]).unwrap();
    assert_eq!(scanner.tracks().entries.len(), 1);
    let mut count = 0;
    while scanner.next_cluster().unwrap().is_some() {
        count += 1;
    }
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// Extraction scenarios
// ---------------------------------------------------------------------------

#[test]
fn extracts_mpeg_audio_elementary_stream() {
    // One plain block and one Xiph-laced block with two frames.
    let mut laced = vec![0x01, 0x03]; // 2 frames, first is 3 bytes
    laced.extend_from_slice(b"abcDEFGH");
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[audio_track("A_MPEG/L3")]));
    segment.extend(cluster_el(0, &[simple_block(1, 0, 0x80, b"one")]));
    segment.extend(cluster_el(40, &[simple_block(1, 0, 0x82, &laced)]));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let track = scanner.tracks().entries[0].clone();
    let mut out = Cursor::new(Vec::new());
    extract_track(&mut scanner, &track, &mut out).unwrap();
    assert_eq!(out.into_inner(), b"oneabcDEFGH");
}

#[test]
fn extracts_srt_subtitles() {
    let track_spec = TrackSpec {
        number: 2,
        track_type: elements::TRACK_TYPE_SUBTITLE,
        codec_id: "S_TEXT/UTF8",
        codec_private: None,
        default_duration: None,
    };
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[track_spec]));
    segment.extend(cluster_el(
        5000,
        &[block_group(2, 0, Some(1000), b"Hello")],
    ));
    segment.extend(cluster_el(
        7000,
        &[
            // SimpleBlocks carry no duration and are not subtitle events.
            simple_block(2, 0, 0x80, b"ignored"),
            block_group(2, 500, Some(2000), b"World"),
        ],
    ));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let track = scanner.tracks().entries[0].clone();
    let mut out = Cursor::new(Vec::new());
    extract_track(&mut scanner, &track, &mut out).unwrap();

    let text = String::from_utf8(out.into_inner()).unwrap();
    assert_eq!(
        text,
        "1\n00:00:05,000 --> 00:00:06,000\nHello\n\n\
         2\n00:00:07,500 --> 00:00:09,500\nWorld\n\n"
    );
}

#[test]
fn extracts_ssa_subtitles_in_read_order() {
    let script = b"[Script Info]\nTitle: t\n\n[Events]\nFormat: Marked, Start, End, Style, Text\n";
    let track_spec = TrackSpec {
        number: 3,
        track_type: elements::TRACK_TYPE_SUBTITLE,
        codec_id: "S_TEXT/ASS",
        codec_private: Some(script.to_vec()),
        default_duration: None,
    };
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[track_spec]));
    // Events stored out of display order; read order restores it.
    segment.extend(cluster_el(
        2000,
        &[block_group(3, 0, Some(1000), b"1,Default,second line")],
    ));
    segment.extend(cluster_el(
        1000,
        &[block_group(3, 0, Some(1000), b"0,Default,first line")],
    ));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let track = scanner.tracks().entries[0].clone();
    let mut out = Cursor::new(Vec::new());
    extract_track(&mut scanner, &track, &mut out).unwrap();

    let text = String::from_utf8(out.into_inner()).unwrap();
    let body = text.strip_prefix(std::str::from_utf8(script).unwrap()).unwrap();
    assert_eq!(
        body,
        "Dialogue: Marked=0,0:00:01.00,0:00:02.00,Default,first line\n\
         Dialogue: Marked=0,0:00:02.00,0:00:03.00,Default,second line\n"
    );
}

#[test]
fn extracts_vorbis_into_ogg_pages() {
    // Identification header: 44100 Hz stereo, blocksizes 256/2048.
    let mut ident = vec![1u8];
    ident.extend_from_slice(b"vorbis");
    ident.extend_from_slice(&0u32.to_le_bytes());
    ident.push(2);
    ident.extend_from_slice(&44_100u32.to_le_bytes());
    ident.extend_from_slice(&[0u8; 12]);
    ident.push(0xB8);
    ident.push(1);
    assert_eq!(ident.len(), 30);

    let mut comment = vec![3u8];
    comment.extend_from_slice(b"vorbis");
    comment.extend_from_slice(&4u32.to_le_bytes());
    comment.extend_from_slice(b"test");
    comment.extend_from_slice(&0u32.to_le_bytes());
    comment.push(1);

    let mut setup = vec![5u8];
    setup.extend_from_slice(b"vorbis");
    setup.extend_from_slice(&[0xAA; 8]);

    let mut private = vec![0x02, ident.len() as u8, comment.len() as u8];
    private.extend_from_slice(&ident);
    private.extend_from_slice(&comment);
    private.extend_from_slice(&setup);

    let track_spec = TrackSpec {
        number: 1,
        track_type: elements::TRACK_TYPE_AUDIO,
        codec_id: "A_VORBIS",
        codec_private: Some(private),
        default_duration: None,
    };
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[track_spec]));
    segment.extend(cluster_el(
        0,
        &[
            simple_block(1, 0, 0x80, &[0x00; 10]), // short block
            simple_block(1, 21, 0x00, &[0x02; 10]), // long block
        ],
    ));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let track = scanner.tracks().entries[0].clone();
    let mut out = Cursor::new(Vec::new());
    extract_track(&mut scanner, &track, &mut out).unwrap();
    let bytes = out.into_inner();

    // Ident page, header page, one audio page flagged end-of-stream.
    let pages: Vec<usize> = bytes
        .windows(4)
        .enumerate()
        .filter(|(_, w)| *w == b"OggS")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[1], 58); // the first page is exactly 58 bytes
    let last = pages[2];
    assert_eq!(bytes[last + 5], 0x04); // eos
    // Granule after the first packet pair: (256 + 2048) / 4.
    let granule = u64::from_le_bytes(bytes[last + 6..last + 14].try_into().unwrap());
    assert_eq!(granule, 576);
    assert_eq!(bytes[last + 26], 2); // both packets on the final page
}

#[test]
fn extracts_msvfw_video_into_avi() {
    let mut bih = vec![0u8; 40];
    bih[0..4].copy_from_slice(&40u32.to_le_bytes());
    bih[4..8].copy_from_slice(&320u32.to_le_bytes());
    bih[8..12].copy_from_slice(&240u32.to_le_bytes());
    bih[16..20].copy_from_slice(b"DIV3");

    // Built by hand because the video size lives in a nested Video master.
    let mut entry = uint_el(elements::TRACK_NUMBER, 1);
    entry.extend(uint_el(elements::TRACK_UID, 11));
    entry.extend(uint_el(elements::TRACK_TYPE, elements::TRACK_TYPE_VIDEO as u64));
    entry.extend(str_el(elements::CODEC_ID, "V_MS/VFW/FOURCC"));
    entry.extend(el(elements::CODEC_PRIVATE, &bih));
    entry.extend(uint_el(elements::DEFAULT_DURATION, 40_000_000));
    let mut video = uint_el(elements::PIXEL_WIDTH, 320);
    video.extend(uint_el(elements::PIXEL_HEIGHT, 240));
    entry.extend(el(elements::VIDEO, &video));
    let tracks = el(elements::TRACKS, &el(elements::TRACK_ENTRY, &entry));

    let mut segment = info_el(1_000_000, None);
    segment.extend_from_slice(&tracks);
    segment.extend(cluster_el(
        0,
        &[
            simple_block(1, 0, 0x80, &[0x11; 64]),
            simple_block(1, 40, 0x00, &[0x22; 32]),
        ],
    ));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let track = scanner.tracks().entries[0].clone();
    assert_eq!(track.video.as_ref().unwrap().pixel_width, 320);
    let mut out = Cursor::new(Vec::new());
    extract_track(&mut scanner, &track, &mut out).unwrap();
    let bytes = out.into_inner();

    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"AVI ");
    let strh = bytes.windows(4).position(|w| w == b"strh").unwrap() + 8;
    assert_eq!(&bytes[strh + 4..strh + 8], b"DIV3");
    // rate = scale / DefaultDuration * 1e9 = 1e6 / 4e7 * 1e9 = 25_000_000.
    assert_eq!(
        u32::from_le_bytes(bytes[strh + 24..strh + 28].try_into().unwrap()),
        25_000_000
    );
    let idx1 = bytes.windows(4).position(|w| w == b"idx1").unwrap();
    let entries = u32::from_le_bytes(bytes[idx1 + 4..idx1 + 8].try_into().unwrap()) / 16;
    assert_eq!(entries, 2);
    // First frame is a keyframe, second is not.
    assert_eq!(
        u32::from_le_bytes(bytes[idx1 + 12..idx1 + 16].try_into().unwrap()),
        0x10
    );
    assert_eq!(
        u32::from_le_bytes(bytes[idx1 + 28..idx1 + 32].try_into().unwrap()),
        0
    );
}

#[test]
fn unknown_codec_is_parsed_but_not_extractable() {
    let track_spec = TrackSpec {
        number: 1,
        track_type: elements::TRACK_TYPE_AUDIO,
        codec_id: "A_EXOTIC",
        codec_private: None,
        default_duration: None,
    };
    let mut segment = info_el(1_000_000, None);
    segment.extend(tracks_el(&[track_spec]));
    segment.extend(cluster_el(0, &[simple_block(1, 0, 0x80, b"x")]));
    let doc = document(&segment, true);

    let mut scanner = Scanner::open(Cursor::new(doc)).unwrap();
    let track = scanner.tracks().entries[0].clone();
    assert_eq!(track.codec_id, "A_EXOTIC");
    let mut out = Cursor::new(Vec::new());
    let err = extract_track(&mut scanner, &track, &mut out).unwrap_err();
    assert!(matches!(err, MkvError::UnsupportedCodec(id) if id == "A_EXOTIC"));
}
