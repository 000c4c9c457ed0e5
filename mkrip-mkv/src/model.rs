//! Typed mirror of the decoded Matroska metadata.

/// Default timestamp scale (1 millisecond in nanoseconds).
pub const DEFAULT_TIMESTAMP_SCALE: u64 = 1_000_000;

/// EBML document header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbmlHead {
    /// EBML version used to create the document.
    pub version: u64,
    /// Minimum EBML version required to read the document.
    pub read_version: u64,
    /// Maximum ID length in bytes.
    pub max_id_length: u64,
    /// Maximum size length in bytes.
    pub max_size_length: u64,
    /// Document type (`matroska` for this library).
    pub doc_type: String,
    /// Document type version.
    pub doc_type_version: u64,
    /// Minimum document type version required to read.
    pub doc_type_read_version: u64,
}

impl Default for EbmlHead {
    fn default() -> Self {
        EbmlHead {
            version: 1,
            read_version: 1,
            max_id_length: 4,
            max_size_length: 8,
            doc_type: String::new(),
            doc_type_version: 1,
            doc_type_read_version: 1,
        }
    }
}

/// Segment information.
#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    /// Segment UUID (16 bytes when present).
    pub uuid: Option<Vec<u8>>,
    /// Segment filename.
    pub filename: Option<String>,
    /// Nanoseconds per timestamp tick.
    pub timestamp_scale: u64,
    /// Duration in timestamp ticks (stored as a float).
    pub duration: Option<f64>,
    /// Creation date, nanoseconds since 2001-01-01.
    pub date_utc: Option<i64>,
    /// Title.
    pub title: Option<String>,
    /// Muxing application.
    pub muxing_app: String,
    /// Writing application.
    pub writing_app: String,
}

impl Default for Info {
    fn default() -> Self {
        Info {
            uuid: None,
            filename: None,
            timestamp_scale: DEFAULT_TIMESTAMP_SCALE,
            duration: None,
            date_utc: None,
            title: None,
            muxing_app: String::new(),
            writing_app: String::new(),
        }
    }
}

impl Info {
    /// Duration in nanoseconds, when known.
    pub fn duration_ns(&self) -> Option<u64> {
        self.duration.map(|d| (d * self.timestamp_scale as f64) as u64)
    }
}

/// One SeekHead entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekEntry {
    /// Target element ID.
    pub id: u32,
    /// Offset of the target from the first Segment child.
    pub position: u64,
}

/// Index of top-level elements within the Segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeekHead {
    /// Entries in file order.
    pub entries: Vec<SeekEntry>,
}

impl SeekHead {
    /// Position of the `n`-th entry pointing at `id`.
    pub fn find(&self, id: u32, n: usize) -> Option<u64> {
        self.entries
            .iter()
            .filter(|e| e.id == id)
            .nth(n)
            .map(|e| e.position)
    }
}

/// Video settings of a track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoTrack {
    /// Frame width in pixels.
    pub pixel_width: u64,
    /// Frame height in pixels.
    pub pixel_height: u64,
    /// Display width (aspect ratio hint).
    pub display_width: Option<u64>,
    /// Display height (aspect ratio hint).
    pub display_height: Option<u64>,
    /// Interlacing flag.
    pub interlaced: bool,
}

/// Audio settings of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    /// Sampling frequency in Hz.
    pub sampling_frequency: f64,
    /// Real output sampling frequency (SBR).
    pub output_sampling_frequency: Option<f64>,
    /// Channel count.
    pub channels: u64,
    /// Bits per sample.
    pub bit_depth: Option<u64>,
}

impl Default for AudioTrack {
    fn default() -> Self {
        AudioTrack {
            sampling_frequency: 8000.0,
            output_sampling_frequency: None,
            channels: 1,
            bit_depth: None,
        }
    }
}

/// One entry of the Tracks element.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEntry {
    /// Track number used in blocks (1-based).
    pub number: u64,
    /// Unique track identifier.
    pub uid: u64,
    /// Raw track type value.
    pub track_type: u8,
    /// Enabled flag.
    pub enabled: bool,
    /// Default flag.
    pub default: bool,
    /// Forced flag.
    pub forced: bool,
    /// Whether blocks of this track may use lacing.
    pub lacing: bool,
    /// Nanoseconds per frame, when constant.
    pub default_duration: Option<u64>,
    /// Track-specific multiplier on the segment timestamp scale.
    pub timestamp_scale: f64,
    /// Track name.
    pub name: Option<String>,
    /// Language (ISO 639-2).
    pub language: Option<String>,
    /// Codec identifier (e.g. `A_VORBIS`).
    pub codec_id: String,
    /// Codec initialisation data.
    pub codec_private: Option<Vec<u8>>,
    /// Codec-built-in delay in nanoseconds.
    pub codec_delay: u64,
    /// Seek pre-roll in nanoseconds.
    pub seek_pre_roll: u64,
    /// Video settings.
    pub video: Option<VideoTrack>,
    /// Audio settings.
    pub audio: Option<AudioTrack>,
}

impl Default for TrackEntry {
    fn default() -> Self {
        TrackEntry {
            number: 0,
            uid: 0,
            track_type: 0,
            enabled: true,
            default: true,
            forced: false,
            lacing: true,
            default_duration: None,
            timestamp_scale: 1.0,
            name: None,
            language: None,
            codec_id: String::new(),
            codec_private: None,
            codec_delay: 0,
            seek_pre_roll: 0,
            video: None,
            audio: None,
        }
    }
}

/// The Tracks element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tracks {
    /// Track entries in file order.
    pub entries: Vec<TrackEntry>,
}

impl Tracks {
    /// Find a track by its block-level track number.
    pub fn by_number(&self, number: u64) -> Option<&TrackEntry> {
        self.entries.iter().find(|t| t.number == number)
    }
}

/// A BlockGroup and its decoded children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockGroup {
    /// Raw Block payload.
    pub block: Vec<u8>,
    /// Duration in track ticks.
    pub duration: Option<u64>,
    /// Relative timestamps of referenced blocks; empty means keyframe.
    pub reference_blocks: Vec<i64>,
}

/// One Cluster of media data.
///
/// Each scanner read yields one of these; it owns its block payloads and
/// stays valid after the next read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    /// Base timestamp in segment ticks.
    pub timestamp: u64,
    /// Cluster position within the Segment.
    pub position: Option<u64>,
    /// Size of the previous cluster.
    pub prev_size: Option<u64>,
    /// Raw SimpleBlock payloads in file order.
    pub simple_blocks: Vec<Vec<u8>>,
    /// BlockGroups in file order.
    pub block_groups: Vec<BlockGroup>,
}

impl Cluster {
    /// Whether the cluster carries no block data.
    pub fn is_empty(&self) -> bool {
        self.simple_blocks.is_empty() && self.block_groups.is_empty()
    }
}

/// Position of one track within a cue point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueTrackPositions {
    /// Track number.
    pub track: u64,
    /// Cluster offset from the first Segment child.
    pub cluster_position: u64,
    /// Relative position of the block inside the cluster.
    pub relative_position: Option<u64>,
    /// Block number within the cluster.
    pub block_number: Option<u64>,
    /// Duration in segment ticks.
    pub duration: Option<u64>,
}

/// One seeking index point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CuePoint {
    /// Timestamp in segment ticks.
    pub time: u64,
    /// Track positions.
    pub positions: Vec<CueTrackPositions>,
}

/// The Cues element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cues {
    /// Cue points in file order.
    pub points: Vec<CuePoint>,
}

/// Localised chapter title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterDisplay {
    /// Chapter title.
    pub string: String,
    /// Language code.
    pub language: Option<String>,
}

/// One chapter marker; atoms nest recursively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterAtom {
    /// Chapter UID.
    pub uid: u64,
    /// Chapter string UID.
    pub string_uid: Option<String>,
    /// Start time in nanoseconds.
    pub time_start: u64,
    /// End time in nanoseconds.
    pub time_end: Option<u64>,
    /// Hidden flag.
    pub hidden: bool,
    /// Enabled flag.
    pub enabled: bool,
    /// Localised titles.
    pub displays: Vec<ChapterDisplay>,
    /// Nested chapter atoms.
    pub atoms: Vec<ChapterAtom>,
}

/// One chapter edition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditionEntry {
    /// Edition UID.
    pub uid: u64,
    /// Hidden flag.
    pub hidden: bool,
    /// Default flag.
    pub default: bool,
    /// Ordered flag.
    pub ordered: bool,
    /// Top-level chapter atoms.
    pub atoms: Vec<ChapterAtom>,
}

/// The Chapters element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chapters {
    /// Editions in file order.
    pub editions: Vec<EditionEntry>,
}

/// Targets of a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTargets {
    /// Logical target level.
    pub type_value: Option<u64>,
    /// Logical target name.
    pub target_type: Option<String>,
    /// Tagged track UIDs.
    pub track_uids: Vec<u64>,
    /// Tagged edition UIDs.
    pub edition_uids: Vec<u64>,
    /// Tagged chapter UIDs.
    pub chapter_uids: Vec<u64>,
    /// Tagged attachment UIDs.
    pub attachment_uids: Vec<u64>,
}

/// One name/value tag; simple tags nest recursively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleTag {
    /// Tag name.
    pub name: String,
    /// Tag language.
    pub language: Option<String>,
    /// Default-language flag.
    pub default: bool,
    /// String value.
    pub string: Option<String>,
    /// Binary value.
    pub binary: Option<Vec<u8>>,
    /// Nested simple tags.
    pub tags: Vec<SimpleTag>,
}

/// A tag with its targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// What the tag applies to.
    pub targets: TagTargets,
    /// The tag values.
    pub simple_tags: Vec<SimpleTag>,
}

/// The Tags element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    /// Tags in file order.
    pub tags: Vec<Tag>,
}
