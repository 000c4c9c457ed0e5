//! Matroska element IDs and the schema table.
//!
//! The table mirrors the published Matroska schema: each known element ID
//! maps to its canonical name and value type. Unknown IDs resolve to the
//! [`UNKNOWN`] sentinel and are skippable.

// =============================================================================
// EBML header elements
// =============================================================================

/// EBML header.
pub const EBML: u32 = 0x1A45DFA3;
/// EBMLVersion.
pub const EBML_VERSION: u32 = 0x4286;
/// EBMLReadVersion.
pub const EBML_READ_VERSION: u32 = 0x42F7;
/// EBMLMaxIDLength.
pub const EBML_MAX_ID_LENGTH: u32 = 0x42F2;
/// EBMLMaxSizeLength.
pub const EBML_MAX_SIZE_LENGTH: u32 = 0x42F3;
/// DocType.
pub const DOC_TYPE: u32 = 0x4282;
/// DocTypeVersion.
pub const DOC_TYPE_VERSION: u32 = 0x4287;
/// DocTypeReadVersion.
pub const DOC_TYPE_READ_VERSION: u32 = 0x4285;

// =============================================================================
// Segment
// =============================================================================

/// Segment, the root container for all Matroska data.
pub const SEGMENT: u32 = 0x18538067;

/// SeekHead (index of top-level elements).
pub const SEEK_HEAD: u32 = 0x114D9B74;
/// Seek entry.
pub const SEEK: u32 = 0x4DBB;
/// SeekID.
pub const SEEK_ID: u32 = 0x53AB;
/// SeekPosition.
pub const SEEK_POSITION: u32 = 0x53AC;

// =============================================================================
// Segment information
// =============================================================================

/// Info.
pub const INFO: u32 = 0x1549A966;
/// SegmentUUID.
pub const SEGMENT_UUID: u32 = 0x73A4;
/// SegmentFilename.
pub const SEGMENT_FILENAME: u32 = 0x7384;
/// TimestampScale (nanoseconds per tick, default 1000000 = 1 ms).
pub const TIMESTAMP_SCALE: u32 = 0x2AD7B1;
/// Duration (in segment ticks, stored as a float).
pub const DURATION: u32 = 0x4489;
/// DateUTC (nanoseconds since 2001-01-01).
pub const DATE_UTC: u32 = 0x4461;
/// Title.
pub const TITLE: u32 = 0x7BA9;
/// MuxingApp.
pub const MUXING_APP: u32 = 0x4D80;
/// WritingApp.
pub const WRITING_APP: u32 = 0x5741;

// =============================================================================
// Cluster
// =============================================================================

/// Cluster (contains blocks of media data).
pub const CLUSTER: u32 = 0x1F43B675;
/// Cluster Timestamp.
pub const TIMESTAMP: u32 = 0xE7;
/// SilentTracks.
pub const SILENT_TRACKS: u32 = 0x5854;
/// SilentTrackNumber.
pub const SILENT_TRACK_NUMBER: u32 = 0x58D7;
/// Position of the Cluster in the Segment.
pub const POSITION: u32 = 0xA7;
/// PrevSize (size of the previous Cluster).
pub const PREV_SIZE: u32 = 0xAB;
/// SimpleBlock.
pub const SIMPLE_BLOCK: u32 = 0xA3;
/// BlockGroup.
pub const BLOCK_GROUP: u32 = 0xA0;
/// Block.
pub const BLOCK: u32 = 0xA1;
/// BlockDuration (in track ticks).
pub const BLOCK_DURATION: u32 = 0x9B;
/// ReferencePriority.
pub const REFERENCE_PRIORITY: u32 = 0xFA;
/// ReferenceBlock (timestamp offset to a referenced frame).
pub const REFERENCE_BLOCK: u32 = 0xFB;
/// CodecState.
pub const CODEC_STATE: u32 = 0xA4;
/// DiscardPadding.
pub const DISCARD_PADDING: u32 = 0x75A2;

// =============================================================================
// Tracks
// =============================================================================

/// Tracks.
pub const TRACKS: u32 = 0x1654AE6B;
/// TrackEntry.
pub const TRACK_ENTRY: u32 = 0xAE;
/// TrackNumber.
pub const TRACK_NUMBER: u32 = 0xD7;
/// TrackUID.
pub const TRACK_UID: u32 = 0x73C5;
/// TrackType.
pub const TRACK_TYPE: u32 = 0x83;
/// FlagEnabled.
pub const FLAG_ENABLED: u32 = 0xB9;
/// FlagDefault.
pub const FLAG_DEFAULT: u32 = 0x88;
/// FlagForced.
pub const FLAG_FORCED: u32 = 0x55AA;
/// FlagLacing.
pub const FLAG_LACING: u32 = 0x9C;
/// MinCache.
pub const MIN_CACHE: u32 = 0x6DE7;
/// MaxCache.
pub const MAX_CACHE: u32 = 0x6DF8;
/// DefaultDuration (nanoseconds per frame).
pub const DEFAULT_DURATION: u32 = 0x23E383;
/// TrackTimestampScale (float multiplier on the segment scale).
pub const TRACK_TIMESTAMP_SCALE: u32 = 0x23314F;
/// MaxBlockAdditionID.
pub const MAX_BLOCK_ADDITION_ID: u32 = 0x55EE;
/// Name.
pub const NAME: u32 = 0x536E;
/// Language (ISO 639-2).
pub const LANGUAGE: u32 = 0x22B59C;
/// LanguageBCP47.
pub const LANGUAGE_BCP47: u32 = 0x22B59D;
/// CodecID.
pub const CODEC_ID: u32 = 0x86;
/// CodecPrivate.
pub const CODEC_PRIVATE: u32 = 0x63A2;
/// CodecName.
pub const CODEC_NAME: u32 = 0x258688;
/// CodecDecodeAll.
pub const CODEC_DECODE_ALL: u32 = 0xAA;
/// TrackOverlay.
pub const TRACK_OVERLAY: u32 = 0x6FAB;
/// CodecDelay (nanoseconds).
pub const CODEC_DELAY: u32 = 0x56AA;
/// SeekPreRoll (nanoseconds).
pub const SEEK_PRE_ROLL: u32 = 0x56BB;

// =============================================================================
// Video
// =============================================================================

/// Video settings.
pub const VIDEO: u32 = 0xE0;
/// FlagInterlaced.
pub const FLAG_INTERLACED: u32 = 0x9A;
/// FieldOrder.
pub const FIELD_ORDER: u32 = 0x9D;
/// StereoMode.
pub const STEREO_MODE: u32 = 0x53B8;
/// AlphaMode.
pub const ALPHA_MODE: u32 = 0x53C0;
/// PixelWidth.
pub const PIXEL_WIDTH: u32 = 0xB0;
/// PixelHeight.
pub const PIXEL_HEIGHT: u32 = 0xBA;
/// PixelCropBottom.
pub const PIXEL_CROP_BOTTOM: u32 = 0x54AA;
/// PixelCropTop.
pub const PIXEL_CROP_TOP: u32 = 0x54BB;
/// PixelCropLeft.
pub const PIXEL_CROP_LEFT: u32 = 0x54CC;
/// PixelCropRight.
pub const PIXEL_CROP_RIGHT: u32 = 0x54DD;
/// DisplayWidth.
pub const DISPLAY_WIDTH: u32 = 0x54B0;
/// DisplayHeight.
pub const DISPLAY_HEIGHT: u32 = 0x54BA;
/// DisplayUnit.
pub const DISPLAY_UNIT: u32 = 0x54B2;
/// AspectRatioType.
pub const ASPECT_RATIO_TYPE: u32 = 0x54B3;
/// ColourSpace.
pub const COLOUR_SPACE: u32 = 0x2EB524;

// =============================================================================
// Audio
// =============================================================================

/// Audio settings.
pub const AUDIO: u32 = 0xE1;
/// SamplingFrequency.
pub const SAMPLING_FREQUENCY: u32 = 0xB5;
/// OutputSamplingFrequency.
pub const OUTPUT_SAMPLING_FREQUENCY: u32 = 0x78B5;
/// Channels.
pub const CHANNELS: u32 = 0x9F;
/// BitDepth.
pub const BIT_DEPTH: u32 = 0x6264;

// =============================================================================
// Content encoding
// =============================================================================

/// ContentEncodings.
pub const CONTENT_ENCODINGS: u32 = 0x6D80;
/// ContentEncoding.
pub const CONTENT_ENCODING: u32 = 0x6240;
/// ContentEncodingOrder.
pub const CONTENT_ENCODING_ORDER: u32 = 0x5031;
/// ContentEncodingScope.
pub const CONTENT_ENCODING_SCOPE: u32 = 0x5032;
/// ContentEncodingType.
pub const CONTENT_ENCODING_TYPE: u32 = 0x5033;
/// ContentCompression.
pub const CONTENT_COMPRESSION: u32 = 0x5034;
/// ContentCompAlgo.
pub const CONTENT_COMP_ALGO: u32 = 0x4254;
/// ContentCompSettings.
pub const CONTENT_COMP_SETTINGS: u32 = 0x4255;

// =============================================================================
// Cues
// =============================================================================

/// Cues.
pub const CUES: u32 = 0x1C53BB6B;
/// CuePoint.
pub const CUE_POINT: u32 = 0xBB;
/// CueTime.
pub const CUE_TIME: u32 = 0xB3;
/// CueTrackPositions.
pub const CUE_TRACK_POSITIONS: u32 = 0xB7;
/// CueTrack.
pub const CUE_TRACK: u32 = 0xF7;
/// CueClusterPosition.
pub const CUE_CLUSTER_POSITION: u32 = 0xF1;
/// CueRelativePosition.
pub const CUE_RELATIVE_POSITION: u32 = 0xF0;
/// CueDuration (in segment ticks).
pub const CUE_DURATION: u32 = 0xB2;
/// CueBlockNumber.
pub const CUE_BLOCK_NUMBER: u32 = 0x5378;

// =============================================================================
// Attachments
// =============================================================================

/// Attachments.
pub const ATTACHMENTS: u32 = 0x1941A469;
/// AttachedFile.
pub const ATTACHED_FILE: u32 = 0x61A7;
/// FileDescription.
pub const FILE_DESCRIPTION: u32 = 0x467E;
/// FileName.
pub const FILE_NAME: u32 = 0x466E;
/// FileMediaType.
pub const FILE_MEDIA_TYPE: u32 = 0x4660;
/// FileData.
pub const FILE_DATA: u32 = 0x465C;
/// FileUID.
pub const FILE_UID: u32 = 0x46AE;

// =============================================================================
// Chapters
// =============================================================================

/// Chapters.
pub const CHAPTERS: u32 = 0x1043A770;
/// EditionEntry.
pub const EDITION_ENTRY: u32 = 0x45B9;
/// EditionUID.
pub const EDITION_UID: u32 = 0x45BC;
/// EditionFlagHidden.
pub const EDITION_FLAG_HIDDEN: u32 = 0x45BD;
/// EditionFlagDefault.
pub const EDITION_FLAG_DEFAULT: u32 = 0x45DB;
/// EditionFlagOrdered.
pub const EDITION_FLAG_ORDERED: u32 = 0x45DD;
/// ChapterAtom (may nest recursively).
pub const CHAPTER_ATOM: u32 = 0xB6;
/// ChapterUID.
pub const CHAPTER_UID: u32 = 0x73C4;
/// ChapterStringUID.
pub const CHAPTER_STRING_UID: u32 = 0x5654;
/// ChapterTimeStart.
pub const CHAPTER_TIME_START: u32 = 0x91;
/// ChapterTimeEnd.
pub const CHAPTER_TIME_END: u32 = 0x92;
/// ChapterFlagHidden.
pub const CHAPTER_FLAG_HIDDEN: u32 = 0x98;
/// ChapterFlagEnabled.
pub const CHAPTER_FLAG_ENABLED: u32 = 0x4598;
/// ChapterDisplay.
pub const CHAPTER_DISPLAY: u32 = 0x80;
/// ChapString.
pub const CHAP_STRING: u32 = 0x85;
/// ChapLanguage.
pub const CHAP_LANGUAGE: u32 = 0x437C;
/// ChapCountry.
pub const CHAP_COUNTRY: u32 = 0x437E;

// =============================================================================
// Tags
// =============================================================================

/// Tags.
pub const TAGS: u32 = 0x1254C367;
/// Tag.
pub const TAG: u32 = 0x7373;
/// Targets.
pub const TARGETS: u32 = 0x63C0;
/// TargetTypeValue.
pub const TARGET_TYPE_VALUE: u32 = 0x68CA;
/// TargetType.
pub const TARGET_TYPE: u32 = 0x63CA;
/// TagTrackUID.
pub const TAG_TRACK_UID: u32 = 0x63C5;
/// TagEditionUID.
pub const TAG_EDITION_UID: u32 = 0x63C9;
/// TagChapterUID.
pub const TAG_CHAPTER_UID: u32 = 0x63C4;
/// TagAttachmentUID.
pub const TAG_ATTACHMENT_UID: u32 = 0x63C6;
/// SimpleTag (may nest recursively).
pub const SIMPLE_TAG: u32 = 0x67C8;
/// TagName.
pub const TAG_NAME: u32 = 0x45A3;
/// TagLanguage.
pub const TAG_LANGUAGE: u32 = 0x447A;
/// TagDefault.
pub const TAG_DEFAULT: u32 = 0x4484;
/// TagString.
pub const TAG_STRING: u32 = 0x4487;
/// TagBinary.
pub const TAG_BINARY: u32 = 0x4485;

// =============================================================================
// Global elements
// =============================================================================

/// Void (padding).
pub const VOID: u32 = 0xEC;
/// CRC-32.
pub const CRC32: u32 = 0xBF;

// =============================================================================
// Track types
// =============================================================================

/// Track type: video.
pub const TRACK_TYPE_VIDEO: u8 = 1;
/// Track type: audio.
pub const TRACK_TYPE_AUDIO: u8 = 2;
/// Track type: subtitle.
pub const TRACK_TYPE_SUBTITLE: u8 = 17;
/// Track type: buttons.
pub const TRACK_TYPE_BUTTONS: u8 = 18;

// =============================================================================
// Schema table
// =============================================================================

/// Element value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Master element (contains other elements).
    Master,
    /// Unsigned integer.
    UnsignedInt,
    /// Signed integer.
    SignedInt,
    /// Floating point.
    Float,
    /// ASCII string.
    String,
    /// UTF-8 string.
    Utf8,
    /// Binary data.
    Binary,
    /// Date (nanoseconds since 2001-01-01).
    Date,
}

/// Schema information for one element ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaEntry {
    /// Canonical element name.
    pub name: &'static str,
    /// Value type.
    pub kind: ElementKind,
}

/// Sentinel entry for IDs absent from the schema.
pub const UNKNOWN: SchemaEntry = SchemaEntry {
    name: "Unknown",
    kind: ElementKind::Binary,
};

const fn entry(name: &'static str, kind: ElementKind) -> SchemaEntry {
    SchemaEntry { name, kind }
}

/// Look up the schema entry for an element ID.
pub fn schema(id: u32) -> Option<SchemaEntry> {
    use ElementKind::*;
    let e = match id {
        EBML => entry("EBML", Master),
        EBML_VERSION => entry("EBMLVersion", UnsignedInt),
        EBML_READ_VERSION => entry("EBMLReadVersion", UnsignedInt),
        EBML_MAX_ID_LENGTH => entry("EBMLMaxIDLength", UnsignedInt),
        EBML_MAX_SIZE_LENGTH => entry("EBMLMaxSizeLength", UnsignedInt),
        DOC_TYPE => entry("DocType", String),
        DOC_TYPE_VERSION => entry("DocTypeVersion", UnsignedInt),
        DOC_TYPE_READ_VERSION => entry("DocTypeReadVersion", UnsignedInt),

        SEGMENT => entry("Segment", Master),

        SEEK_HEAD => entry("SeekHead", Master),
        SEEK => entry("Seek", Master),
        SEEK_ID => entry("SeekID", Binary),
        SEEK_POSITION => entry("SeekPosition", UnsignedInt),

        INFO => entry("Info", Master),
        SEGMENT_UUID => entry("SegmentUUID", Binary),
        SEGMENT_FILENAME => entry("SegmentFilename", Utf8),
        TIMESTAMP_SCALE => entry("TimestampScale", UnsignedInt),
        DURATION => entry("Duration", Float),
        DATE_UTC => entry("DateUTC", Date),
        TITLE => entry("Title", Utf8),
        MUXING_APP => entry("MuxingApp", Utf8),
        WRITING_APP => entry("WritingApp", Utf8),

        CLUSTER => entry("Cluster", Master),
        TIMESTAMP => entry("Timestamp", UnsignedInt),
        SILENT_TRACKS => entry("SilentTracks", Master),
        SILENT_TRACK_NUMBER => entry("SilentTrackNumber", UnsignedInt),
        POSITION => entry("Position", UnsignedInt),
        PREV_SIZE => entry("PrevSize", UnsignedInt),
        SIMPLE_BLOCK => entry("SimpleBlock", Binary),
        BLOCK_GROUP => entry("BlockGroup", Master),
        BLOCK => entry("Block", Binary),
        BLOCK_DURATION => entry("BlockDuration", UnsignedInt),
        REFERENCE_PRIORITY => entry("ReferencePriority", UnsignedInt),
        REFERENCE_BLOCK => entry("ReferenceBlock", SignedInt),
        CODEC_STATE => entry("CodecState", Binary),
        DISCARD_PADDING => entry("DiscardPadding", SignedInt),

        TRACKS => entry("Tracks", Master),
        TRACK_ENTRY => entry("TrackEntry", Master),
        TRACK_NUMBER => entry("TrackNumber", UnsignedInt),
        TRACK_UID => entry("TrackUID", UnsignedInt),
        TRACK_TYPE => entry("TrackType", UnsignedInt),
        FLAG_ENABLED => entry("FlagEnabled", UnsignedInt),
        FLAG_DEFAULT => entry("FlagDefault", UnsignedInt),
        FLAG_FORCED => entry("FlagForced", UnsignedInt),
        FLAG_LACING => entry("FlagLacing", UnsignedInt),
        MIN_CACHE => entry("MinCache", UnsignedInt),
        MAX_CACHE => entry("MaxCache", UnsignedInt),
        DEFAULT_DURATION => entry("DefaultDuration", UnsignedInt),
        TRACK_TIMESTAMP_SCALE => entry("TrackTimestampScale", Float),
        MAX_BLOCK_ADDITION_ID => entry("MaxBlockAdditionID", UnsignedInt),
        NAME => entry("Name", Utf8),
        LANGUAGE => entry("Language", String),
        LANGUAGE_BCP47 => entry("LanguageBCP47", String),
        CODEC_ID => entry("CodecID", String),
        CODEC_PRIVATE => entry("CodecPrivate", Binary),
        CODEC_NAME => entry("CodecName", Utf8),
        CODEC_DECODE_ALL => entry("CodecDecodeAll", UnsignedInt),
        TRACK_OVERLAY => entry("TrackOverlay", UnsignedInt),
        CODEC_DELAY => entry("CodecDelay", UnsignedInt),
        SEEK_PRE_ROLL => entry("SeekPreRoll", UnsignedInt),

        VIDEO => entry("Video", Master),
        FLAG_INTERLACED => entry("FlagInterlaced", UnsignedInt),
        FIELD_ORDER => entry("FieldOrder", UnsignedInt),
        STEREO_MODE => entry("StereoMode", UnsignedInt),
        ALPHA_MODE => entry("AlphaMode", UnsignedInt),
        PIXEL_WIDTH => entry("PixelWidth", UnsignedInt),
        PIXEL_HEIGHT => entry("PixelHeight", UnsignedInt),
        PIXEL_CROP_BOTTOM => entry("PixelCropBottom", UnsignedInt),
        PIXEL_CROP_TOP => entry("PixelCropTop", UnsignedInt),
        PIXEL_CROP_LEFT => entry("PixelCropLeft", UnsignedInt),
        PIXEL_CROP_RIGHT => entry("PixelCropRight", UnsignedInt),
        DISPLAY_WIDTH => entry("DisplayWidth", UnsignedInt),
        DISPLAY_HEIGHT => entry("DisplayHeight", UnsignedInt),
        DISPLAY_UNIT => entry("DisplayUnit", UnsignedInt),
        ASPECT_RATIO_TYPE => entry("AspectRatioType", UnsignedInt),
        COLOUR_SPACE => entry("ColourSpace", Binary),

        AUDIO => entry("Audio", Master),
        SAMPLING_FREQUENCY => entry("SamplingFrequency", Float),
        OUTPUT_SAMPLING_FREQUENCY => entry("OutputSamplingFrequency", Float),
        CHANNELS => entry("Channels", UnsignedInt),
        BIT_DEPTH => entry("BitDepth", UnsignedInt),

        CONTENT_ENCODINGS => entry("ContentEncodings", Master),
        CONTENT_ENCODING => entry("ContentEncoding", Master),
        CONTENT_ENCODING_ORDER => entry("ContentEncodingOrder", UnsignedInt),
        CONTENT_ENCODING_SCOPE => entry("ContentEncodingScope", UnsignedInt),
        CONTENT_ENCODING_TYPE => entry("ContentEncodingType", UnsignedInt),
        CONTENT_COMPRESSION => entry("ContentCompression", Master),
        CONTENT_COMP_ALGO => entry("ContentCompAlgo", UnsignedInt),
        CONTENT_COMP_SETTINGS => entry("ContentCompSettings", Binary),

        CUES => entry("Cues", Master),
        CUE_POINT => entry("CuePoint", Master),
        CUE_TIME => entry("CueTime", UnsignedInt),
        CUE_TRACK_POSITIONS => entry("CueTrackPositions", Master),
        CUE_TRACK => entry("CueTrack", UnsignedInt),
        CUE_CLUSTER_POSITION => entry("CueClusterPosition", UnsignedInt),
        CUE_RELATIVE_POSITION => entry("CueRelativePosition", UnsignedInt),
        CUE_DURATION => entry("CueDuration", UnsignedInt),
        CUE_BLOCK_NUMBER => entry("CueBlockNumber", UnsignedInt),

        ATTACHMENTS => entry("Attachments", Master),
        ATTACHED_FILE => entry("AttachedFile", Master),
        FILE_DESCRIPTION => entry("FileDescription", Utf8),
        FILE_NAME => entry("FileName", Utf8),
        FILE_MEDIA_TYPE => entry("FileMediaType", String),
        FILE_DATA => entry("FileData", Binary),
        FILE_UID => entry("FileUID", UnsignedInt),

        CHAPTERS => entry("Chapters", Master),
        EDITION_ENTRY => entry("EditionEntry", Master),
        EDITION_UID => entry("EditionUID", UnsignedInt),
        EDITION_FLAG_HIDDEN => entry("EditionFlagHidden", UnsignedInt),
        EDITION_FLAG_DEFAULT => entry("EditionFlagDefault", UnsignedInt),
        EDITION_FLAG_ORDERED => entry("EditionFlagOrdered", UnsignedInt),
        CHAPTER_ATOM => entry("ChapterAtom", Master),
        CHAPTER_UID => entry("ChapterUID", UnsignedInt),
        CHAPTER_STRING_UID => entry("ChapterStringUID", Utf8),
        CHAPTER_TIME_START => entry("ChapterTimeStart", UnsignedInt),
        CHAPTER_TIME_END => entry("ChapterTimeEnd", UnsignedInt),
        CHAPTER_FLAG_HIDDEN => entry("ChapterFlagHidden", UnsignedInt),
        CHAPTER_FLAG_ENABLED => entry("ChapterFlagEnabled", UnsignedInt),
        CHAPTER_DISPLAY => entry("ChapterDisplay", Master),
        CHAP_STRING => entry("ChapString", Utf8),
        CHAP_LANGUAGE => entry("ChapLanguage", String),
        CHAP_COUNTRY => entry("ChapCountry", String),

        TAGS => entry("Tags", Master),
        TAG => entry("Tag", Master),
        TARGETS => entry("Targets", Master),
        TARGET_TYPE_VALUE => entry("TargetTypeValue", UnsignedInt),
        TARGET_TYPE => entry("TargetType", String),
        TAG_TRACK_UID => entry("TagTrackUID", UnsignedInt),
        TAG_EDITION_UID => entry("TagEditionUID", UnsignedInt),
        TAG_CHAPTER_UID => entry("TagChapterUID", UnsignedInt),
        TAG_ATTACHMENT_UID => entry("TagAttachmentUID", UnsignedInt),
        SIMPLE_TAG => entry("SimpleTag", Master),
        TAG_NAME => entry("TagName", Utf8),
        TAG_LANGUAGE => entry("TagLanguage", String),
        TAG_DEFAULT => entry("TagDefault", UnsignedInt),
        TAG_STRING => entry("TagString", Utf8),
        TAG_BINARY => entry("TagBinary", Binary),

        VOID => entry("Void", Binary),
        CRC32 => entry("CRC-32", Binary),

        _ => return None,
    };
    Some(e)
}

/// Check whether an element is a master element.
pub fn is_master(id: u32) -> bool {
    matches!(schema(id), Some(e) if e.kind == ElementKind::Master)
}

/// Whether encountering `child` terminates an unknown-size `parent`.
///
/// An element with an unknown size ends at the first element that can only
/// occur at the parent's own level or above. Only Segment and Cluster appear
/// with unknown sizes in practice.
pub fn ends_unknown_size(parent: u32, child: u32) -> bool {
    match parent {
        SEGMENT => matches!(child, SEGMENT | EBML),
        CLUSTER => matches!(
            child,
            SEGMENT
                | EBML
                | SEEK_HEAD
                | INFO
                | TRACKS
                | CLUSTER
                | CUES
                | ATTACHMENTS
                | CHAPTERS
                | TAGS
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_ids() {
        assert_eq!(EBML, 0x1A45DFA3);
        assert_eq!(SEGMENT, 0x18538067);
        assert_eq!(CLUSTER, 0x1F43B675);
        assert_eq!(TRACKS, 0x1654AE6B);
        assert_eq!(CUES, 0x1C53BB6B);
    }

    #[test]
    fn test_schema_lookup() {
        assert_eq!(schema(SEGMENT).unwrap().name, "Segment");
        assert_eq!(schema(SEGMENT).unwrap().kind, ElementKind::Master);
        assert_eq!(schema(TIMESTAMP_SCALE).unwrap().kind, ElementKind::UnsignedInt);
        assert_eq!(schema(DURATION).unwrap().kind, ElementKind::Float);
        assert_eq!(schema(CODEC_ID).unwrap().kind, ElementKind::String);
        assert_eq!(schema(DATE_UTC).unwrap().kind, ElementKind::Date);
        assert_eq!(schema(REFERENCE_BLOCK).unwrap().kind, ElementKind::SignedInt);
        assert!(schema(0x0BAD_F00D).is_none());
    }

    #[test]
    fn test_is_master() {
        assert!(is_master(EBML));
        assert!(is_master(BLOCK_GROUP));
        assert!(is_master(CHAPTER_ATOM));
        assert!(!is_master(TRACK_NUMBER));
        assert!(!is_master(SIMPLE_BLOCK));
    }

    #[test]
    fn test_ends_unknown_size() {
        assert!(ends_unknown_size(SEGMENT, SEGMENT));
        assert!(!ends_unknown_size(SEGMENT, CLUSTER));
        assert!(!ends_unknown_size(SEGMENT, INFO));
        assert!(ends_unknown_size(CLUSTER, CLUSTER));
        assert!(ends_unknown_size(CLUSTER, CUES));
        assert!(!ends_unknown_size(CLUSTER, SIMPLE_BLOCK));
        assert!(!ends_unknown_size(CLUSTER, TIMESTAMP));
    }
}
