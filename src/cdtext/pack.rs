use crate::cdtext::error::DecodeWarning;
use crate::cdtext::models::RawPack;
use binrw::prelude::*;
use crc::{CRC_16_GSM, Crc};
use std::io::Cursor;

pub const PACK_SIZE: usize = 18;
pub const PAYLOAD_SIZE: usize = 12;

/// Wire layout of one CD-TEXT pack.
#[derive(Debug, Clone, BinRead, BinWrite)]
#[brw(big)]
pub struct PackFrame {
    pub pack_type: u8,
    pub track_number: u8,
    pub sequence_number: u8,
    /// Block number in the upper nibble, character position in the lower.
    pub block_char: u8,
    pub payload: [u8; 12],
    pub crc: u16,
}

impl PackFrame {
    pub fn block_number(&self) -> u8 {
        self.block_char >> 4
    }

    pub fn character_position(&self) -> u8 {
        self.block_char & 0x0F
    }
}

/// CD-TEXT checksum: CRC-16 with polynomial 0x1021 over the 16 header and
/// payload bytes, transmitted bit-inverted (the CRC-16/GSM parameter set).
pub fn crc16_cdtext(data: &[u8]) -> u16 {
    let crc = Crc::<u16>::new(&CRC_16_GSM);
    crc.checksum(data)
}

/// Slices the buffer into fixed 18-byte packs and validates each checksum.
/// A mismatch keeps the pack and records a warning; captured dumps routinely
/// zero the CRC bytes and must stay decodable.
pub fn read_packs(buffer: &[u8], warnings: &mut Vec<DecodeWarning>) -> Vec<RawPack> {
    let pack_count = buffer.len() / PACK_SIZE;
    let remainder = buffer.len() % PACK_SIZE;
    if remainder != 0 {
        warnings.push(DecodeWarning::Structural(remainder));
    }

    let mut packs = Vec::with_capacity(pack_count);
    for index in 0..pack_count {
        let raw = &buffer[index * PACK_SIZE..(index + 1) * PACK_SIZE];
        let mut cursor = Cursor::new(raw);
        let frame = match PackFrame::read(&mut cursor) {
            Ok(frame) => frame,
            Err(err) => {
                warnings.push(DecodeWarning::Fault(err.to_string()));
                continue;
            }
        };

        let computed = crc16_cdtext(&raw[..16]);
        let crc_valid = computed == frame.crc;
        let pack = RawPack {
            pack_type: frame.pack_type,
            track_number: frame.track_number,
            sequence_number: frame.sequence_number,
            block_number: frame.block_number(),
            character_position: frame.character_position(),
            payload: frame.payload,
            crc: frame.crc,
            crc_valid,
            pack_index: index,
        };
        if !crc_valid {
            warnings.push(DecodeWarning::Crc {
                index,
                kind: pack.kind(),
                stored: frame.crc,
                computed,
            });
        }
        packs.push(pack);
    }

    packs
}
