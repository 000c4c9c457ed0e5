//! Segment scanner: locates metadata and streams Clusters.
//!
//! The scanner validates the EBML head, finds the Segment, loads `Info` and
//! `Tracks` (following `SeekHead` references where the source allows it) and
//! then yields Clusters one at a time. It tolerates common real-world damage:
//! children overflowing their parent are clamped, and a malformed VINT inside
//! the Segment triggers a one-byte-at-a-time resync instead of a hard stop.

use crate::ebml::{self, ElementHeader, EbmlSource, ForwardSource, SeekSource, SliceSource};
use crate::elements;
use crate::error::{MkvError, Result};
use crate::model::{
    AudioTrack, BlockGroup, ChapterAtom, ChapterDisplay, Chapters, Cluster, CuePoint,
    CueTrackPositions, Cues, EbmlHead, EditionEntry, Info, SeekEntry, SeekHead, SimpleTag, Tag,
    TagTargets, Tags, TrackEntry, Tracks, VideoTrack,
};
use std::io::{Read, Seek};

/// Document type accepted by this scanner.
pub const DOC_TYPE: &str = "matroska";

/// Scanner lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    /// EBML head validated.
    HeaderRead,
    /// Segment element located.
    SegmentFound,
    /// Collecting Info/Tracks/SeekHead.
    MetadataLoading,
    /// Yielding clusters.
    Streaming,
    /// Graceful end of the cluster stream.
    Ended,
    /// A fatal error stopped the scanner.
    Failed,
}

/// Streaming Matroska reader.
pub struct Scanner<S: EbmlSource> {
    src: S,
    state: ScannerState,
    head: EbmlHead,
    segment_start: u64,
    segment_size: Option<u64>,
    info: Info,
    tracks: Tracks,
    have_info: bool,
    have_tracks: bool,
    seek_head: Option<SeekHead>,
    /// Reconstructed index used when the file carries no SeekHead.
    fallback_seek_head: SeekHead,
    cues: Option<Cues>,
    chapters: Option<Chapters>,
    tags: Option<Tags>,
    /// Header read past the end of an unknown-size element, to be consumed
    /// before the next read.
    pending: Option<(ElementHeader, u64)>,
    sought_info: bool,
    sought_tracks: bool,
}

impl<R: Read + Seek> Scanner<SeekSource<R>> {
    /// Open a seekable source positioned at the start of the document.
    pub fn open(reader: R) -> Result<Self> {
        Scanner::from_source(SeekSource::new(reader))
    }
}

impl<R: Read> Scanner<ForwardSource<R>> {
    /// Open a forward-only source; SeekHead-directed jumps are ignored.
    pub fn open_streaming(reader: R) -> Result<Self> {
        Scanner::from_source(ForwardSource::new(reader))
    }
}

impl<S: EbmlSource> Scanner<S> {
    /// Build a scanner over an arbitrary source and load the metadata.
    pub fn from_source(src: S) -> Result<Self> {
        let mut scanner = Scanner {
            src,
            state: ScannerState::HeaderRead,
            head: EbmlHead::default(),
            segment_start: 0,
            segment_size: None,
            info: Info::default(),
            tracks: Tracks::default(),
            have_info: false,
            have_tracks: false,
            seek_head: None,
            fallback_seek_head: SeekHead::default(),
            cues: None,
            chapters: None,
            tags: None,
            pending: None,
            sought_info: false,
            sought_tracks: false,
        };
        scanner.init()?;
        Ok(scanner)
    }

    /// The validated EBML head.
    pub fn head(&self) -> &EbmlHead {
        &self.head
    }

    /// The Segment's Info element.
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// The Segment's Tracks element.
    pub fn tracks(&self) -> &Tracks {
        &self.tracks
    }

    /// The SeekHead, or the reconstructed fallback.
    ///
    /// The second value is `false` when the returned index was reconstructed
    /// by the scanner and cannot be trusted.
    pub fn seek_head(&self) -> (&SeekHead, bool) {
        match &self.seek_head {
            Some(sh) => (sh, true),
            None => (&self.fallback_seek_head, false),
        }
    }

    /// The Cues element, when one was seen before the first cluster.
    pub fn cues(&self) -> Option<&Cues> {
        self.cues.as_ref()
    }

    /// The Chapters element, when present.
    pub fn chapters(&self) -> Option<&Chapters> {
        self.chapters.as_ref()
    }

    /// The Tags element, when present.
    pub fn tags(&self) -> Option<&Tags> {
        self.tags.as_ref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Decode the next Cluster.
    ///
    /// `Ok(None)` marks the graceful end of the stream; errors are fatal and
    /// leave the scanner in [`ScannerState::Failed`].
    pub fn next_cluster(&mut self) -> Result<Option<Cluster>> {
        if matches!(self.state, ScannerState::Ended | ScannerState::Failed) {
            return Ok(None);
        }
        loop {
            let (el, _offset) = match self.next_of() {
                Ok(Some(x)) => x,
                Ok(None) => {
                    self.state = ScannerState::Ended;
                    return Ok(None);
                }
                Err(e) => {
                    self.state = ScannerState::Failed;
                    return Err(e);
                }
            };
            if el.id == elements::CLUSTER {
                match self.decode_cluster(&el) {
                    Ok(cluster) => return Ok(Some(cluster)),
                    Err(e) => {
                        self.state = ScannerState::Failed;
                        return Err(e);
                    }
                }
            }
            if let Err(e) = self.skip_payload(&el) {
                self.state = ScannerState::Failed;
                return Err(e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Initialisation
    // -----------------------------------------------------------------------

    fn init(&mut self) -> Result<()> {
        self.read_head()?;
        self.find_segment()?;
        self.state = ScannerState::MetadataLoading;
        self.load_metadata()?;
        self.state = ScannerState::Streaming;
        Ok(())
    }

    /// Validate the EBML head and decode its fields.
    fn read_head(&mut self) -> Result<()> {
        let el = match ElementHeader::read(&mut self.src) {
            Ok(Some(el)) if el.id == elements::EBML => el,
            Ok(_) => return Err(MkvError::InvalidMagic),
            Err(MkvError::Io(e)) => return Err(MkvError::Io(e)),
            Err(_) => return Err(MkvError::InvalidMagic),
        };
        let size = el
            .size
            .ok_or_else(|| MkvError::InvalidHeader("EBML head has unknown size".into()))?;
        let end = self.src.position() + size;

        let mut head = EbmlHead::default();
        while let Some(child) = next_child(&mut self.src, end)? {
            let size = child.size.unwrap_or(0);
            match child.id {
                elements::EBML_VERSION => head.version = ebml::decode_uint(&mut self.src, size)?,
                elements::EBML_READ_VERSION => {
                    head.read_version = ebml::decode_uint(&mut self.src, size)?
                }
                elements::EBML_MAX_ID_LENGTH => {
                    head.max_id_length = ebml::decode_uint(&mut self.src, size)?
                }
                elements::EBML_MAX_SIZE_LENGTH => {
                    head.max_size_length = ebml::decode_uint(&mut self.src, size)?
                }
                elements::DOC_TYPE => head.doc_type = ebml::decode_string(&mut self.src, size)?,
                elements::DOC_TYPE_VERSION => {
                    head.doc_type_version = ebml::decode_uint(&mut self.src, size)?
                }
                elements::DOC_TYPE_READ_VERSION => {
                    head.doc_type_read_version = ebml::decode_uint(&mut self.src, size)?
                }
                _ => self.src.skip(size).map_err(MkvError::Io)?,
            }
        }

        if head.doc_type != DOC_TYPE {
            return Err(MkvError::UnsupportedDocType(head.doc_type));
        }
        if head.max_id_length > ebml::MAX_ID_LENGTH as u64 {
            return Err(MkvError::InvalidHeader(format!(
                "EBMLMaxIDLength {} exceeds {}",
                head.max_id_length,
                ebml::MAX_ID_LENGTH
            )));
        }
        if head.max_size_length > ebml::MAX_SIZE_LENGTH as u64 {
            return Err(MkvError::InvalidHeader(format!(
                "EBMLMaxSizeLength {} exceeds {}",
                head.max_size_length,
                ebml::MAX_SIZE_LENGTH
            )));
        }
        self.head = head;
        self.state = ScannerState::HeaderRead;
        Ok(())
    }

    /// Consume top-level elements until the Segment is found.
    fn find_segment(&mut self) -> Result<()> {
        loop {
            let offset = self.src.position();
            let el = ElementHeader::read(&mut self.src)?
                .ok_or(MkvError::UnexpectedEof { offset })?;
            match el.id {
                elements::VOID | elements::CRC32 => self.skip_payload(&el)?,
                elements::SEGMENT => {
                    self.segment_size = el.size;
                    self.segment_start = self.src.position();
                    self.state = ScannerState::SegmentFound;
                    return Ok(());
                }
                _ => {
                    return Err(MkvError::InvalidHeader(format!(
                        "expected Segment, found {} at offset {}",
                        el.schema().name,
                        offset
                    )))
                }
            }
        }
    }

    /// Collect Info and Tracks, following SeekHead references where needed.
    fn load_metadata(&mut self) -> Result<()> {
        loop {
            let offset = self.src.position();
            let (el, el_offset) = self
                .next_of()?
                .ok_or(MkvError::UnexpectedEof { offset })?;

            self.record_fallback(&el, el_offset);
            let mut chained_jump = false;

            match el.id {
                elements::SEEK_HEAD => {
                    let (buf, base) = self.read_buffered(&el)?;
                    let mut slice = SliceSource::new(&buf, base);
                    let sh = decode_seek_head(&mut slice, base + buf.len() as u64)?;
                    match self.seek_head.take() {
                        None => {
                            // A second SeekHead may be referenced by the
                            // first; chase it before anything else.
                            if self.src.is_seekable() {
                                let own = el_offset - self.segment_start;
                                let chained = sh
                                    .find(elements::SEEK_HEAD, 0)
                                    .filter(|&p| p != own);
                                if let Some(p) = chained {
                                    self.src
                                        .seek_to(self.segment_start + p)
                                        .map_err(MkvError::Io)?;
                                    chained_jump = true;
                                }
                            }
                            self.seek_head = Some(sh);
                        }
                        Some(mut existing) => {
                            existing.entries.extend(sh.entries);
                            self.seek_head = Some(existing);
                        }
                    }
                }
                elements::INFO => {
                    let (buf, base) = self.read_buffered(&el)?;
                    let mut slice = SliceSource::new(&buf, base);
                    self.info = decode_info(&mut slice, base + buf.len() as u64)?;
                    self.have_info = true;
                }
                elements::TRACKS => {
                    let (buf, base) = self.read_buffered(&el)?;
                    let mut slice = SliceSource::new(&buf, base);
                    self.tracks = decode_tracks(&mut slice, base + buf.len() as u64)?;
                    self.have_tracks = true;
                }
                elements::CUES => {
                    let (buf, base) = self.read_buffered(&el)?;
                    let mut slice = SliceSource::new(&buf, base);
                    self.cues = Some(decode_cues(&mut slice, base + buf.len() as u64)?);
                }
                elements::CHAPTERS => {
                    let (buf, base) = self.read_buffered(&el)?;
                    let mut slice = SliceSource::new(&buf, base);
                    self.chapters = Some(decode_chapters(&mut slice, base + buf.len() as u64)?);
                }
                elements::TAGS => {
                    let (buf, base) = self.read_buffered(&el)?;
                    let mut slice = SliceSource::new(&buf, base);
                    self.tags = Some(decode_tags(&mut slice, base + buf.len() as u64)?);
                }
                elements::CLUSTER => {
                    if self.have_info && self.have_tracks {
                        self.pending = Some((el, el_offset));
                        break;
                    }
                    let followable = self.src.is_seekable()
                        && self.seek_head.as_ref().is_some_and(|sh| {
                            (!self.have_info
                                && !self.sought_info
                                && sh.find(elements::INFO, 0).is_some())
                                || (self.have_info
                                    && !self.have_tracks
                                    && !self.sought_tracks
                                    && sh.find(elements::TRACKS, 0).is_some())
                        });
                    if !followable {
                        return Err(MkvError::UnexpectedCluster { offset: el_offset });
                    }
                    // The jump below moves the cursor; the cluster is left
                    // unread.
                }
                _ => self.skip_payload(&el)?,
            }

            if chained_jump {
                continue;
            }

            // Chase metadata through the SeekHead once per target.
            if self.src.is_seekable() {
                if let Some(sh) = &self.seek_head {
                    if !self.have_info && !self.sought_info {
                        if let Some(p) = sh.find(elements::INFO, 0) {
                            self.sought_info = true;
                            self.src
                                .seek_to(self.segment_start + p)
                                .map_err(MkvError::Io)?;
                            continue;
                        }
                    }
                    if self.have_info && !self.have_tracks && !self.sought_tracks {
                        if let Some(p) = sh.find(elements::TRACKS, 0) {
                            self.sought_tracks = true;
                            self.src
                                .seek_to(self.segment_start + p)
                                .map_err(MkvError::Io)?;
                            continue;
                        }
                    }
                }
            }
            if self.have_info && self.have_tracks {
                break;
            }
        }

        // Position the cursor at the first cluster.
        if self.pending.is_none() {
            let jumped = if self.src.is_seekable() {
                match self
                    .seek_head
                    .as_ref()
                    .and_then(|sh| sh.find(elements::CLUSTER, 0))
                {
                    Some(p) => {
                        self.src
                            .seek_to(self.segment_start + p)
                            .map_err(MkvError::Io)?;
                        true
                    }
                    None => false,
                }
            } else {
                false
            };
            if !jumped {
                self.find_first_cluster()?;
            }
        }
        Ok(())
    }

    /// Linear scan to the first Cluster; its header is stashed as pending.
    fn find_first_cluster(&mut self) -> Result<()> {
        loop {
            let (el, offset) = match self.next_of()? {
                Some(x) => x,
                None => return Ok(()), // no clusters at all
            };
            self.record_fallback(&el, offset);
            if el.id == elements::CLUSTER {
                self.pending = Some((el, offset));
                return Ok(());
            }
            self.skip_payload(&el)?;
        }
    }

    // -----------------------------------------------------------------------
    // Segment-level reading
    // -----------------------------------------------------------------------

    /// Read the next Segment child, clamping overflow and resyncing after a
    /// malformed VINT.
    fn next_of(&mut self) -> Result<Option<(ElementHeader, u64)>> {
        loop {
            if let Some(p) = self.pending.take() {
                return Ok(Some(p));
            }
            if let Some(size) = self.segment_size {
                if self.src.position() >= self.segment_start + size {
                    return Ok(None);
                }
            }
            let offset = self.src.position();
            match ElementHeader::read(&mut self.src) {
                Ok(None) => return Ok(None),
                Ok(Some(mut el)) => {
                    if let (Some(size), Some(own)) = (self.segment_size, el.size) {
                        let end = self.segment_start + size;
                        let remaining = end.saturating_sub(self.src.position());
                        if own > remaining {
                            tracing::warn!(
                                element = el.schema().name,
                                offset,
                                "element overflows Segment, clamping"
                            );
                            el.size = Some(remaining);
                        }
                    }
                    return Ok(Some((el, offset)));
                }
                Err(MkvError::InvalidVintLength { offset }) => {
                    // Resynchronise one byte at a time.
                    tracing::debug!(offset, "malformed VINT in Segment, resyncing");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn skip_payload(&mut self, el: &ElementHeader) -> Result<()> {
        let size = el.size.ok_or_else(|| {
            MkvError::InvalidHeader(format!("cannot skip {} of unknown size", el.schema().name))
        })?;
        let offset = self.src.position();
        self.src.skip(size).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                MkvError::UnexpectedEof { offset }
            } else {
                MkvError::Io(e)
            }
        })
    }

    /// Record a fallback SeekHead entry while no real SeekHead is known.
    fn record_fallback(&mut self, el: &ElementHeader, offset: u64) {
        if self.seek_head.is_none()
            && !matches!(el.id, elements::SEEK_HEAD | elements::VOID | elements::CRC32)
        {
            self.fallback_seek_head.entries.push(SeekEntry {
                id: el.id,
                position: offset - self.segment_start,
            });
        }
    }

    /// Buffer a known-size metadata master and verify a leading CRC-32.
    fn read_buffered(&mut self, el: &ElementHeader) -> Result<(Vec<u8>, u64)> {
        let size = el.size.ok_or_else(|| {
            MkvError::InvalidHeader(format!("{} has unknown size", el.schema().name))
        })?;
        let base = self.src.position();
        let buf = ebml::decode_bytes(&mut self.src, size)?;
        verify_crc(&buf, el);
        Ok((buf, base))
    }

    // -----------------------------------------------------------------------
    // Cluster decoding
    // -----------------------------------------------------------------------

    fn decode_cluster(&mut self, el: &ElementHeader) -> Result<Cluster> {
        let mut cluster = Cluster::default();
        let end = el.size.map(|s| self.src.position() + s);

        loop {
            if let Some(end) = end {
                if self.src.position() >= end {
                    break;
                }
            }
            let offset = self.src.position();
            let mut child = match ElementHeader::read(&mut self.src) {
                Ok(Some(c)) => c,
                Ok(None) => break, // EOF terminates an unknown-size cluster
                Err(e) => return Err(e),
            };
            if end.is_none() && elements::ends_unknown_size(elements::CLUSTER, child.id) {
                self.pending = Some((child, offset));
                break;
            }
            if let (Some(end), Some(size)) = (end, child.size) {
                let remaining = end.saturating_sub(self.src.position());
                if size > remaining {
                    tracing::warn!(
                        element = child.schema().name,
                        offset,
                        "element overflows Cluster, clamping"
                    );
                    child.size = Some(remaining);
                }
            }
            let size = child.size.ok_or_else(|| {
                MkvError::InvalidHeader(format!(
                    "{} has unknown size inside Cluster",
                    child.schema().name
                ))
            })?;
            match child.id {
                elements::TIMESTAMP => {
                    cluster.timestamp = ebml::decode_uint(&mut self.src, size)?;
                }
                elements::POSITION => {
                    cluster.position = Some(ebml::decode_uint(&mut self.src, size)?);
                }
                elements::PREV_SIZE => {
                    cluster.prev_size = Some(ebml::decode_uint(&mut self.src, size)?);
                }
                elements::SIMPLE_BLOCK => {
                    cluster
                        .simple_blocks
                        .push(ebml::decode_bytes(&mut self.src, size)?);
                }
                elements::BLOCK_GROUP => {
                    let end = self.src.position() + size;
                    cluster
                        .block_groups
                        .push(decode_block_group(&mut self.src, end)?);
                }
                _ => self.src.skip(size).map_err(MkvError::Io)?,
            }
        }
        Ok(cluster)
    }
}

// ---------------------------------------------------------------------------
// Shared decode helpers
// ---------------------------------------------------------------------------

/// Read the next child header below `end`, clamping overflow.
fn next_child<S: EbmlSource>(src: &mut S, end: u64) -> Result<Option<ElementHeader>> {
    if src.position() >= end {
        return Ok(None);
    }
    let offset = src.position();
    let mut el = ElementHeader::read(src)?.ok_or(MkvError::UnexpectedEof { offset })?;
    if let Some(size) = el.size {
        let remaining = end.saturating_sub(src.position());
        if size > remaining {
            tracing::warn!(
                element = el.schema().name,
                offset,
                "element overflows its parent, clamping"
            );
            el.size = Some(remaining);
        }
    }
    Ok(Some(el))
}

/// Validate a leading CRC-32 child covering the rest of the master payload.
fn verify_crc(buf: &[u8], el: &ElementHeader) {
    let mut src = SliceSource::new(buf, 0);
    let first = match ElementHeader::read(&mut src) {
        Ok(Some(first)) if first.id == elements::CRC32 && first.size == Some(4) => first,
        _ => return,
    };
    let start = first.header_size;
    if buf.len() < start + 4 {
        return;
    }
    let stored = u32::from_le_bytes([
        buf[start],
        buf[start + 1],
        buf[start + 2],
        buf[start + 3],
    ]);
    let computed = ebml::crc32_ieee(&buf[start + 4..]);
    if stored != computed {
        tracing::warn!(
            element = el.schema().name,
            stored,
            computed,
            "CRC-32 mismatch"
        );
    }
}

fn decode_seek_head<S: EbmlSource>(src: &mut S, end: u64) -> Result<SeekHead> {
    let mut sh = SeekHead::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        if el.id == elements::SEEK {
            let end = src.position() + size;
            let mut id = 0u32;
            let mut position = None;
            while let Some(child) = next_child(src, end)? {
                let size = child.size.unwrap_or(0);
                match child.id {
                    elements::SEEK_ID => {
                        id = ebml::decode_uint(src, size)? as u32;
                    }
                    elements::SEEK_POSITION => {
                        position = Some(ebml::decode_uint(src, size)?);
                    }
                    _ => src.skip(size).map_err(MkvError::Io)?,
                }
            }
            if let Some(position) = position {
                sh.entries.push(SeekEntry { id, position });
            }
        } else {
            src.skip(size).map_err(MkvError::Io)?;
        }
    }
    Ok(sh)
}

fn decode_info<S: EbmlSource>(src: &mut S, end: u64) -> Result<Info> {
    let mut info = Info::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::SEGMENT_UUID => info.uuid = Some(ebml::decode_bytes(src, size)?),
            elements::SEGMENT_FILENAME => {
                info.filename = Some(ebml::decode_string(src, size)?)
            }
            elements::TIMESTAMP_SCALE => {
                info.timestamp_scale = ebml::decode_uint(src, size)?;
                if info.timestamp_scale == 0 {
                    return Err(MkvError::InvalidHeader("TimestampScale is zero".into()));
                }
            }
            elements::DURATION => info.duration = Some(ebml::decode_float(src, size)?),
            elements::DATE_UTC => info.date_utc = Some(ebml::decode_int(src, size)?),
            elements::TITLE => info.title = Some(ebml::decode_string(src, size)?),
            elements::MUXING_APP => info.muxing_app = ebml::decode_string(src, size)?,
            elements::WRITING_APP => info.writing_app = ebml::decode_string(src, size)?,
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(info)
}

fn decode_tracks<S: EbmlSource>(src: &mut S, end: u64) -> Result<Tracks> {
    let mut tracks = Tracks::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        if el.id == elements::TRACK_ENTRY {
            let end = src.position() + size;
            let track = decode_track_entry(src, end)?;
            if tracks.by_number(track.number).is_some() {
                tracing::warn!(number = track.number, "duplicate track number");
            }
            tracks.entries.push(track);
        } else {
            src.skip(size).map_err(MkvError::Io)?;
        }
    }
    Ok(tracks)
}

fn decode_track_entry<S: EbmlSource>(src: &mut S, end: u64) -> Result<TrackEntry> {
    let mut track = TrackEntry::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::TRACK_NUMBER => track.number = ebml::decode_uint(src, size)?,
            elements::TRACK_UID => track.uid = ebml::decode_uint(src, size)?,
            elements::TRACK_TYPE => track.track_type = ebml::decode_uint(src, size)? as u8,
            elements::FLAG_ENABLED => track.enabled = ebml::decode_uint(src, size)? != 0,
            elements::FLAG_DEFAULT => track.default = ebml::decode_uint(src, size)? != 0,
            elements::FLAG_FORCED => track.forced = ebml::decode_uint(src, size)? != 0,
            elements::FLAG_LACING => track.lacing = ebml::decode_uint(src, size)? != 0,
            elements::DEFAULT_DURATION => {
                track.default_duration = Some(ebml::decode_uint(src, size)?)
            }
            elements::TRACK_TIMESTAMP_SCALE => {
                track.timestamp_scale = ebml::decode_float(src, size)?
            }
            elements::NAME => track.name = Some(ebml::decode_string(src, size)?),
            elements::LANGUAGE | elements::LANGUAGE_BCP47 => {
                track.language = Some(ebml::decode_string(src, size)?)
            }
            elements::CODEC_ID => track.codec_id = ebml::decode_string(src, size)?,
            elements::CODEC_PRIVATE => {
                track.codec_private = Some(ebml::decode_bytes(src, size)?)
            }
            elements::CODEC_DELAY => track.codec_delay = ebml::decode_uint(src, size)?,
            elements::SEEK_PRE_ROLL => track.seek_pre_roll = ebml::decode_uint(src, size)?,
            elements::VIDEO => {
                let end = src.position() + size;
                track.video = Some(decode_video(src, end)?);
            }
            elements::AUDIO => {
                let end = src.position() + size;
                track.audio = Some(decode_audio(src, end)?);
            }
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(track)
}

fn decode_video<S: EbmlSource>(src: &mut S, end: u64) -> Result<VideoTrack> {
    let mut video = VideoTrack::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::PIXEL_WIDTH => video.pixel_width = ebml::decode_uint(src, size)?,
            elements::PIXEL_HEIGHT => video.pixel_height = ebml::decode_uint(src, size)?,
            elements::DISPLAY_WIDTH => {
                video.display_width = Some(ebml::decode_uint(src, size)?)
            }
            elements::DISPLAY_HEIGHT => {
                video.display_height = Some(ebml::decode_uint(src, size)?)
            }
            elements::FLAG_INTERLACED => {
                video.interlaced = ebml::decode_uint(src, size)? == 1
            }
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(video)
}

fn decode_audio<S: EbmlSource>(src: &mut S, end: u64) -> Result<AudioTrack> {
    let mut audio = AudioTrack::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::SAMPLING_FREQUENCY => {
                audio.sampling_frequency = ebml::decode_float(src, size)?
            }
            elements::OUTPUT_SAMPLING_FREQUENCY => {
                audio.output_sampling_frequency = Some(ebml::decode_float(src, size)?)
            }
            elements::CHANNELS => audio.channels = ebml::decode_uint(src, size)?,
            elements::BIT_DEPTH => audio.bit_depth = Some(ebml::decode_uint(src, size)?),
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(audio)
}

fn decode_block_group<S: EbmlSource>(src: &mut S, end: u64) -> Result<BlockGroup> {
    let mut group = BlockGroup::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::BLOCK => group.block = ebml::decode_bytes(src, size)?,
            elements::BLOCK_DURATION => {
                group.duration = Some(ebml::decode_uint(src, size)?)
            }
            elements::REFERENCE_BLOCK => {
                group.reference_blocks.push(ebml::decode_int(src, size)?)
            }
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(group)
}

fn decode_cues<S: EbmlSource>(src: &mut S, end: u64) -> Result<Cues> {
    let mut cues = Cues::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        if el.id == elements::CUE_POINT {
            let end = src.position() + size;
            let mut point = CuePoint::default();
            while let Some(child) = next_child(src, end)? {
                let size = child.size.unwrap_or(0);
                match child.id {
                    elements::CUE_TIME => point.time = ebml::decode_uint(src, size)?,
                    elements::CUE_TRACK_POSITIONS => {
                        let end = src.position() + size;
                        point.positions.push(decode_cue_positions(src, end)?);
                    }
                    _ => src.skip(size).map_err(MkvError::Io)?,
                }
            }
            cues.points.push(point);
        } else {
            src.skip(size).map_err(MkvError::Io)?;
        }
    }
    Ok(cues)
}

fn decode_cue_positions<S: EbmlSource>(src: &mut S, end: u64) -> Result<CueTrackPositions> {
    let mut pos = CueTrackPositions::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::CUE_TRACK => pos.track = ebml::decode_uint(src, size)?,
            elements::CUE_CLUSTER_POSITION => {
                pos.cluster_position = ebml::decode_uint(src, size)?
            }
            elements::CUE_RELATIVE_POSITION => {
                pos.relative_position = Some(ebml::decode_uint(src, size)?)
            }
            elements::CUE_BLOCK_NUMBER => {
                pos.block_number = Some(ebml::decode_uint(src, size)?)
            }
            elements::CUE_DURATION => pos.duration = Some(ebml::decode_uint(src, size)?),
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(pos)
}

fn decode_chapters<S: EbmlSource>(src: &mut S, end: u64) -> Result<Chapters> {
    let mut chapters = Chapters::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        if el.id == elements::EDITION_ENTRY {
            let end = src.position() + size;
            let mut edition = EditionEntry::default();
            while let Some(child) = next_child(src, end)? {
                let size = child.size.unwrap_or(0);
                match child.id {
                    elements::EDITION_UID => edition.uid = ebml::decode_uint(src, size)?,
                    elements::EDITION_FLAG_HIDDEN => {
                        edition.hidden = ebml::decode_uint(src, size)? != 0
                    }
                    elements::EDITION_FLAG_DEFAULT => {
                        edition.default = ebml::decode_uint(src, size)? != 0
                    }
                    elements::EDITION_FLAG_ORDERED => {
                        edition.ordered = ebml::decode_uint(src, size)? != 0
                    }
                    elements::CHAPTER_ATOM => {
                        let end = src.position() + size;
                        edition.atoms.push(decode_chapter_atom(src, end, 0)?);
                    }
                    _ => src.skip(size).map_err(MkvError::Io)?,
                }
            }
            chapters.editions.push(edition);
        } else {
            src.skip(size).map_err(MkvError::Io)?;
        }
    }
    Ok(chapters)
}

fn decode_chapter_atom<S: EbmlSource>(src: &mut S, end: u64, depth: u32) -> Result<ChapterAtom> {
    if depth > ebml::MAX_RECURSION_DEPTH {
        return Err(MkvError::RecursionLimit { depth });
    }
    let mut atom = ChapterAtom {
        enabled: true,
        ..ChapterAtom::default()
    };
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::CHAPTER_UID => atom.uid = ebml::decode_uint(src, size)?,
            elements::CHAPTER_STRING_UID => {
                atom.string_uid = Some(ebml::decode_string(src, size)?)
            }
            elements::CHAPTER_TIME_START => atom.time_start = ebml::decode_uint(src, size)?,
            elements::CHAPTER_TIME_END => {
                atom.time_end = Some(ebml::decode_uint(src, size)?)
            }
            elements::CHAPTER_FLAG_HIDDEN => {
                atom.hidden = ebml::decode_uint(src, size)? != 0
            }
            elements::CHAPTER_FLAG_ENABLED => {
                atom.enabled = ebml::decode_uint(src, size)? != 0
            }
            elements::CHAPTER_DISPLAY => {
                let end = src.position() + size;
                let mut display = ChapterDisplay::default();
                while let Some(child) = next_child(src, end)? {
                    let size = child.size.unwrap_or(0);
                    match child.id {
                        elements::CHAP_STRING => {
                            display.string = ebml::decode_string(src, size)?
                        }
                        elements::CHAP_LANGUAGE => {
                            display.language = Some(ebml::decode_string(src, size)?)
                        }
                        _ => src.skip(size).map_err(MkvError::Io)?,
                    }
                }
                atom.displays.push(display);
            }
            elements::CHAPTER_ATOM => {
                let end = src.position() + size;
                atom.atoms.push(decode_chapter_atom(src, end, depth + 1)?);
            }
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(atom)
}

fn decode_tags<S: EbmlSource>(src: &mut S, end: u64) -> Result<Tags> {
    let mut tags = Tags::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        if el.id == elements::TAG {
            let end = src.position() + size;
            let mut tag = Tag::default();
            while let Some(child) = next_child(src, end)? {
                let size = child.size.unwrap_or(0);
                match child.id {
                    elements::TARGETS => {
                        let end = src.position() + size;
                        tag.targets = decode_tag_targets(src, end)?;
                    }
                    elements::SIMPLE_TAG => {
                        let end = src.position() + size;
                        tag.simple_tags.push(decode_simple_tag(src, end, 0)?);
                    }
                    _ => src.skip(size).map_err(MkvError::Io)?,
                }
            }
            tags.tags.push(tag);
        } else {
            src.skip(size).map_err(MkvError::Io)?;
        }
    }
    Ok(tags)
}

fn decode_tag_targets<S: EbmlSource>(src: &mut S, end: u64) -> Result<TagTargets> {
    let mut targets = TagTargets::default();
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::TARGET_TYPE_VALUE => {
                targets.type_value = Some(ebml::decode_uint(src, size)?)
            }
            elements::TARGET_TYPE => {
                targets.target_type = Some(ebml::decode_string(src, size)?)
            }
            elements::TAG_TRACK_UID => targets.track_uids.push(ebml::decode_uint(src, size)?),
            elements::TAG_EDITION_UID => {
                targets.edition_uids.push(ebml::decode_uint(src, size)?)
            }
            elements::TAG_CHAPTER_UID => {
                targets.chapter_uids.push(ebml::decode_uint(src, size)?)
            }
            elements::TAG_ATTACHMENT_UID => {
                targets.attachment_uids.push(ebml::decode_uint(src, size)?)
            }
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(targets)
}

fn decode_simple_tag<S: EbmlSource>(src: &mut S, end: u64, depth: u32) -> Result<SimpleTag> {
    if depth > ebml::MAX_RECURSION_DEPTH {
        return Err(MkvError::RecursionLimit { depth });
    }
    let mut tag = SimpleTag {
        default: true,
        ..SimpleTag::default()
    };
    while let Some(el) = next_child(src, end)? {
        let size = el.size.unwrap_or(0);
        match el.id {
            elements::TAG_NAME => tag.name = ebml::decode_string(src, size)?,
            elements::TAG_LANGUAGE => tag.language = Some(ebml::decode_string(src, size)?),
            elements::TAG_DEFAULT => tag.default = ebml::decode_uint(src, size)? != 0,
            elements::TAG_STRING => tag.string = Some(ebml::decode_string(src, size)?),
            elements::TAG_BINARY => tag.binary = Some(ebml::decode_bytes(src, size)?),
            elements::SIMPLE_TAG => {
                let end = src.position() + size;
                tag.tags.push(decode_simple_tag(src, end, depth + 1)?);
            }
            _ => src.skip(size).map_err(MkvError::Io)?,
        }
    }
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // Minimal EBML head: matroska, version fields at their defaults.
    fn minimal_head() -> Vec<u8> {
        let mut data = vec![0x1A, 0x45, 0xDF, 0xA3, 0x93];
        data.extend_from_slice(&[0x42, 0x86, 0x81, 0x01]); // EBMLVersion 1
        data.extend_from_slice(&[0x42, 0xF7, 0x81, 0x01]); // EBMLReadVersion 1
        data.extend_from_slice(&[0x42, 0xF2, 0x81, 0x04]); // EBMLMaxIDLength 4
        data.extend_from_slice(&[0x42, 0xF3, 0x81, 0x08]); // EBMLMaxSizeLength 8
        data.extend_from_slice(&[0x42, 0x82, 0x88]);
        data.extend_from_slice(b"matroska");
        data
    }

    #[test]
    fn test_rejects_bad_magic() {
        let result = Scanner::open(Cursor::new(vec![0x00u8, 0x01, 0x02, 0x03]));
        assert!(matches!(result, Err(MkvError::InvalidMagic)));
    }

    #[test]
    fn test_rejects_wrong_doctype() {
        let mut data = vec![0x1A, 0x45, 0xDF, 0xA3, 0x87];
        data.extend_from_slice(&[0x42, 0x82, 0x84]);
        data.extend_from_slice(b"webm");
        let result = Scanner::open(Cursor::new(data));
        assert!(matches!(result, Err(MkvError::UnsupportedDocType(d)) if d == "webm"));
    }

    #[test]
    fn test_rejects_oversized_id_length() {
        let mut data = vec![0x1A, 0x45, 0xDF, 0xA3, 0x8F];
        data.extend_from_slice(&[0x42, 0x82, 0x88]);
        data.extend_from_slice(b"matroska");
        data.extend_from_slice(&[0x42, 0xF2, 0x81, 0x05]); // EBMLMaxIDLength 5
        let result = Scanner::open(Cursor::new(data));
        assert!(matches!(result, Err(MkvError::InvalidHeader(_))));
    }

    #[test]
    fn test_missing_metadata_before_cluster_fails() {
        let mut data = minimal_head();
        data.extend_from_slice(&[0x18, 0x53, 0x80, 0x67, 0xFF]); // Segment, unknown size
        data.extend_from_slice(&[0x1F, 0x43, 0xB6, 0x75, 0x80]); // empty Cluster
        let result = Scanner::open(Cursor::new(data));
        assert!(matches!(result, Err(MkvError::UnexpectedCluster { .. })));
    }

    #[test]
    fn test_verify_crc_accepts_match() {
        // CRC-32 child followed by a Void element; just exercises the path.
        let mut payload = vec![0xBF, 0x84];
        let body = [0xEC, 0x82, 0x00, 0x00];
        payload.extend_from_slice(&ebml::crc32_ieee(&body).to_le_bytes());
        payload.extend_from_slice(&body);
        let el = ElementHeader {
            id: elements::INFO,
            size: Some(payload.len() as u64),
            header_size: 5,
        };
        verify_crc(&payload, &el);
    }
}
