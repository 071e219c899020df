use crate::cdtext::error::DecodeWarning;
use crate::cdtext::models::EncodingKind;

/// Maps the size-info character code onto the encoding used to render
/// payload bytes. A missing size-info pack falls back to plain ASCII.
pub fn resolve(character_code: Option<u8>, warnings: &mut Vec<DecodeWarning>) -> EncodingKind {
    match character_code {
        None | Some(0x00) => EncodingKind::Ascii,
        Some(0x01) => EncodingKind::Latin1,
        Some(0x80) => EncodingKind::ShiftJisLike,
        Some(code) => {
            warnings.push(DecodeWarning::UnknownCharacterCode(code));
            EncodingKind::Unknown
        }
    }
}

/// Renders one terminated segment as text. Single-byte sets map bytes to
/// code points directly, dropping control bytes. Double-byte and unknown
/// sets keep every byte so nothing is lost before the caller transcodes.
pub fn render(bytes: &[u8], encoding: EncodingKind) -> String {
    match encoding {
        EncodingKind::Ascii | EncodingKind::Latin1 => bytes
            .iter()
            .filter(|&&byte| byte >= 0x20)
            .map(|&byte| byte as char)
            .collect(),
        EncodingKind::ShiftJisLike | EncodingKind::Unknown => {
            bytes.iter().map(|&byte| byte as char).collect()
        }
    }
}
