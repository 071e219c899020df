use crate::cdtext::encoding;
use crate::cdtext::error::DecodeWarning;
use crate::cdtext::models::{EncodingKind, GenreInfo};
use crate::cdtext::stream::FieldStream;

/// Disc geometry and character-set description carried by the size-info
/// packs: character code, then first and last track number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeInfo {
    pub character_code: u8,
    pub first_track: u8,
    pub last_track: u8,
}

impl SizeInfo {
    pub fn track_count(&self) -> usize {
        (self.last_track - self.first_track) as usize + 1
    }
}

pub fn parse_size_info(
    stream: &FieldStream,
    warnings: &mut Vec<DecodeWarning>,
) -> Option<SizeInfo> {
    let raw = &stream.raw;
    if raw.len() < 3 {
        warnings.push(DecodeWarning::ShortSizeInfo(raw.len()));
        return None;
    }

    let info = SizeInfo {
        character_code: raw[0],
        first_track: raw[1],
        last_track: raw[2],
    };
    if info.first_track == 0 || info.last_track < info.first_track || info.last_track > 99 {
        warnings.push(DecodeWarning::BadTrackRange {
            first: info.first_track,
            last: info.last_track,
        });
        return None;
    }

    Some(info)
}

/// First two bytes are the big-endian genre code, the rest up to the
/// terminator is the label.
pub fn parse_genre(
    stream: &FieldStream,
    encoding_kind: EncodingKind,
    warnings: &mut Vec<DecodeWarning>,
) -> Option<GenreInfo> {
    let raw = &stream.raw;
    if raw.len() < 2 {
        warnings.push(DecodeWarning::ShortGenre(raw.len()));
        return None;
    }

    let code = u16::from_be_bytes([raw[0], raw[1]]);
    let label_bytes = raw[2..].split(|&byte| byte == 0).next().unwrap_or_default();
    Some(GenreInfo {
        code,
        label: encoding::render(label_bytes, encoding_kind),
    })
}

/// The album-level disc identifier string, exposed as-is.
pub fn parse_disc_id(stream: &FieldStream, encoding_kind: EncodingKind) -> Option<String> {
    let bytes = stream.raw.split(|&byte| byte == 0).next().unwrap_or_default();
    if bytes.is_empty() {
        None
    } else {
        Some(encoding::render(bytes, encoding_kind))
    }
}
