use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One decoded 18-byte CD-TEXT pack: 4 header bytes, 12 payload bytes and a
/// big-endian CRC-16 over the first 16.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPack {
    pub pack_type: u8,
    /// 0 means the whole album rather than a single track.
    pub track_number: u8,
    pub sequence_number: u8,
    /// 0-7; block 0 is the primary character set, higher blocks carry
    /// alternate-language copies.
    pub block_number: u8,
    pub character_position: u8,
    pub payload: [u8; 12],
    pub crc: u16,
    pub crc_valid: bool,
    /// Ordinal position in the source stream. Diagnostics only; the
    /// reconstruction order comes from the sequence number.
    pub pack_index: usize,
}

impl RawPack {
    pub fn kind(&self) -> FieldKind {
        FieldKind::from_pack_type(self.pack_type)
    }
}

/// Semantic meaning of a pack, selected by its type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKind {
    Title,
    Performer,
    Songwriter,
    Composer,
    Arranger,
    Message,
    DiscId,
    Genre,
    TocInfo,
    TocInfo2,
    Reserved(u8),
    ClosedInfo,
    UpcIsrc,
    SizeInfo,
    Unknown(u8),
}

impl FieldKind {
    pub fn from_pack_type(value: u8) -> Self {
        match value {
            0x80 => Self::Title,
            0x81 => Self::Performer,
            0x82 => Self::Songwriter,
            0x83 => Self::Composer,
            0x84 => Self::Arranger,
            0x85 => Self::Message,
            0x86 => Self::DiscId,
            0x87 => Self::Genre,
            0x88 => Self::TocInfo,
            0x89 => Self::TocInfo2,
            0x8A..=0x8C => Self::Reserved(value),
            0x8D => Self::ClosedInfo,
            0x8E => Self::UpcIsrc,
            0x8F => Self::SizeInfo,
            _ => Self::Unknown(value),
        }
    }

    /// Text-bearing kinds are split per track; everything else is disc-level.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Title | Self::Performer | Self::Songwriter | Self::Composer | Self::Arranger
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "TITLE"),
            Self::Performer => write!(f, "PERFORMER"),
            Self::Songwriter => write!(f, "SONGWRITER"),
            Self::Composer => write!(f, "COMPOSER"),
            Self::Arranger => write!(f, "ARRANGER"),
            Self::Message => write!(f, "MESSAGE"),
            Self::DiscId => write!(f, "DISC_ID"),
            Self::Genre => write!(f, "GENRE"),
            Self::TocInfo => write!(f, "TOC_INFO"),
            Self::TocInfo2 => write!(f, "TOC_INFO2"),
            Self::Reserved(value) => write!(f, "RESERVED_{value:02X}"),
            Self::ClosedInfo => write!(f, "CLOSED_INFO"),
            Self::UpcIsrc => write!(f, "ISRC"),
            Self::SizeInfo => write!(f, "SIZE_INFO"),
            Self::Unknown(value) => write!(f, "UNKNOWN_{value:02X}"),
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Reconstructed fields for one track; track 0 holds the album-level values.
/// A key is present only when the source carried a value for it, which may
/// be the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub track_number: u8,
    pub fields: BTreeMap<FieldKind, String>,
}

impl TrackRecord {
    pub fn new(track_number: u8) -> Self {
        Self {
            track_number,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        self.fields.get(&kind).map(String::as_str)
    }
}

/// Character set the payload bytes are rendered with. Double-byte sets are
/// detected but not transcoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EncodingKind {
    #[default]
    Ascii,
    Latin1,
    ShiftJisLike,
    Unknown,
}

/// Numeric genre code with its optional human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreInfo {
    pub code: u16,
    pub label: String,
}

/// The complete decode result. Always produced; `success` only drops to
/// `false` when the input held no usable pack at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCdText {
    pub success: bool,
    pub album_title: Option<String>,
    pub album_artist: Option<String>,
    pub disc_id: Option<String>,
    pub genre: Option<GenreInfo>,
    pub upc: Option<String>,
    pub encoding: EncodingKind,
    pub track_count: usize,
    pub tracks: Vec<TrackRecord>,
    pub raw_pack_count: usize,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_type_table_is_complete() {
        assert_eq!(FieldKind::from_pack_type(0x80), FieldKind::Title);
        assert_eq!(FieldKind::from_pack_type(0x81), FieldKind::Performer);
        assert_eq!(FieldKind::from_pack_type(0x82), FieldKind::Songwriter);
        assert_eq!(FieldKind::from_pack_type(0x83), FieldKind::Composer);
        assert_eq!(FieldKind::from_pack_type(0x84), FieldKind::Arranger);
        assert_eq!(FieldKind::from_pack_type(0x85), FieldKind::Message);
        assert_eq!(FieldKind::from_pack_type(0x86), FieldKind::DiscId);
        assert_eq!(FieldKind::from_pack_type(0x87), FieldKind::Genre);
        assert_eq!(FieldKind::from_pack_type(0x88), FieldKind::TocInfo);
        assert_eq!(FieldKind::from_pack_type(0x89), FieldKind::TocInfo2);
        assert_eq!(FieldKind::from_pack_type(0x8A), FieldKind::Reserved(0x8A));
        assert_eq!(FieldKind::from_pack_type(0x8C), FieldKind::Reserved(0x8C));
        assert_eq!(FieldKind::from_pack_type(0x8D), FieldKind::ClosedInfo);
        assert_eq!(FieldKind::from_pack_type(0x8E), FieldKind::UpcIsrc);
        assert_eq!(FieldKind::from_pack_type(0x8F), FieldKind::SizeInfo);
        assert_eq!(FieldKind::from_pack_type(0x00), FieldKind::Unknown(0x00));
        assert_eq!(FieldKind::from_pack_type(0x90), FieldKind::Unknown(0x90));
    }

    #[test]
    fn field_kinds_serialize_as_labels() {
        let mut fields = BTreeMap::new();
        fields.insert(FieldKind::Title, "A".to_string());
        fields.insert(FieldKind::Unknown(0x42), "B".to_string());
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["TITLE"], "A");
        assert_eq!(value["UNKNOWN_42"], "B");
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(ParsedCdText::default()).unwrap();
        assert!(value.get("rawPackCount").is_some());
        assert!(value.get("trackCount").is_some());
        assert!(value.get("albumTitle").is_some());
    }
}
