use crate::cdtext::models::FieldKind;
use thiserror::Error;

/// Non-fatal findings collected while decoding. Each stage returns these
/// alongside its output; nothing here is ever raised as an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeWarning {
    #[error("dropped a trailing half byte from the hex input")]
    OddHexDigit,

    #[error("input ends with {0} stray byte(s), not enough for a full 18-byte pack")]
    Structural(usize),

    #[error("pack {index} ({kind}) has CRC {stored:#06x}, expected {computed:#06x}")]
    Crc {
        index: usize,
        kind: FieldKind,
        stored: u16,
        computed: u16,
    },

    #[error("{kind} block {block}: duplicate sequence number {sequence}, keeping the first pack")]
    DuplicateSequence {
        kind: FieldKind,
        block: u8,
        sequence: u8,
    },

    #[error("{kind} block {block}: sequence numbers jump from {from} to {to}")]
    SequenceGap {
        kind: FieldKind,
        block: u8,
        from: u8,
        to: u8,
    },

    #[error("pack {index} has unknown pack type {pack_type:#04x} and was skipped")]
    UnknownPack { index: usize, pack_type: u8 },

    #[error("{kind} block {block}: track boundary at track {track} without a terminator")]
    Boundary { kind: FieldKind, block: u8, track: u8 },

    #[error("size info payload is {0} byte(s), too short to describe the disc")]
    ShortSizeInfo(usize),

    #[error("size info track range {first}..={last} is not usable")]
    BadTrackRange { first: u8, last: u8 },

    #[error("size info character code {0:#04x} is not a known encoding")]
    UnknownCharacterCode(u8),

    #[error("genre payload is {0} byte(s), expected at least a 2-byte code")]
    ShortGenre(usize),

    #[error("no decodable packs in input")]
    Empty,

    #[error("decoder fault: {0}")]
    Fault(String),
}
