//! Codec identifiers and classification.

/// Broad codec class, derived from the codec-ID prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecType {
    /// `V_` codecs.
    Video,
    /// `A_` codecs.
    Audio,
    /// `S_` codecs.
    Subtitle,
    /// `B_` codecs.
    Button,
}

/// Classify a codec ID by its prefix.
pub fn codec_type(codec_id: &str) -> Option<CodecType> {
    match codec_id.get(..2)? {
        "V_" => Some(CodecType::Video),
        "A_" => Some(CodecType::Audio),
        "S_" => Some(CodecType::Subtitle),
        "B_" => Some(CodecType::Button),
        _ => None,
    }
}

/// Well-known codec ID strings.
pub mod codec_ids {
    // Audio
    /// AAC.
    pub const A_AAC: &str = "A_AAC";
    /// AC-3.
    pub const A_AC3: &str = "A_AC3";
    /// MPEG layer 1.
    pub const A_MPEG_L1: &str = "A_MPEG/L1";
    /// MPEG layer 2.
    pub const A_MPEG_L2: &str = "A_MPEG/L2";
    /// MPEG layer 3 (MP3).
    pub const A_MPEG_L3: &str = "A_MPEG/L3";
    /// Vorbis.
    pub const A_VORBIS: &str = "A_VORBIS";
    /// Opus.
    pub const A_OPUS: &str = "A_OPUS";
    /// FLAC.
    pub const A_FLAC: &str = "A_FLAC";
    /// PCM little-endian integer.
    pub const A_PCM_INT_LIT: &str = "A_PCM/INT/LIT";

    // Video
    /// Microsoft VFW compatibility mode; CodecPrivate is a BITMAPINFOHEADER.
    pub const V_MS_VFW_FOURCC: &str = "V_MS/VFW/FOURCC";
    /// H.264/AVC.
    pub const V_MPEG4_ISO_AVC: &str = "V_MPEG4/ISO/AVC";
    /// H.265/HEVC.
    pub const V_MPEGH_ISO_HEVC: &str = "V_MPEGH/ISO/HEVC";
    /// VP8.
    pub const V_VP8: &str = "V_VP8";
    /// VP9.
    pub const V_VP9: &str = "V_VP9";
    /// AV1.
    pub const V_AV1: &str = "V_AV1";

    // Subtitles
    /// UTF-8 plain text.
    pub const S_TEXT_UTF8: &str = "S_TEXT/UTF8";
    /// ASCII plain text.
    pub const S_TEXT_ASCII: &str = "S_TEXT/ASCII";
    /// SubStation Alpha.
    pub const S_TEXT_SSA: &str = "S_TEXT/SSA";
    /// Advanced SubStation Alpha.
    pub const S_TEXT_ASS: &str = "S_TEXT/ASS";
    /// Legacy alias of [`S_TEXT_SSA`].
    pub const S_SSA: &str = "S_SSA";
    /// Legacy alias of [`S_TEXT_ASS`].
    pub const S_ASS: &str = "S_ASS";
    /// WebVTT.
    pub const S_TEXT_WEBVTT: &str = "S_TEXT/WEBVTT";
    /// VobSub.
    pub const S_VOBSUB: &str = "S_VOBSUB";
    /// VobSub, zlib-compressed.
    pub const S_VOBSUB_ZLIB: &str = "S_VOBSUB/ZLIB";
    /// HDMV presentation graphics.
    pub const S_HDMV_PGS: &str = "S_HDMV/PGS";
}

/// Whether the codec is one of the SubStation Alpha variants.
pub fn is_ssa(codec_id: &str) -> bool {
    matches!(
        codec_id,
        codec_ids::S_TEXT_SSA | codec_ids::S_TEXT_ASS | codec_ids::S_SSA | codec_ids::S_ASS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_type_prefixes() {
        assert_eq!(codec_type("V_MS/VFW/FOURCC"), Some(CodecType::Video));
        assert_eq!(codec_type("A_VORBIS"), Some(CodecType::Audio));
        assert_eq!(codec_type("S_TEXT/UTF8"), Some(CodecType::Subtitle));
        assert_eq!(codec_type("B_VOBBTN"), Some(CodecType::Button));
        assert_eq!(codec_type("X_NONSENSE"), None);
        assert_eq!(codec_type(""), None);
        assert_eq!(codec_type("A"), None);
    }

    #[test]
    fn test_is_ssa() {
        assert!(is_ssa("S_TEXT/SSA"));
        assert!(is_ssa("S_TEXT/ASS"));
        assert!(is_ssa("S_SSA"));
        assert!(is_ssa("S_ASS"));
        assert!(!is_ssa("S_TEXT/UTF8"));
    }
}
