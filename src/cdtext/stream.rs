use crate::cdtext::error::DecodeWarning;
use crate::cdtext::models::{FieldKind, RawPack};
use crate::cdtext::pack::PAYLOAD_SIZE;
use std::collections::BTreeMap;
use std::mem;

/// One reconstructed `(field kind, block)` stream: the terminator-split
/// segments in order, plus the raw concatenated payload for the disc-level
/// interpreters.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStream {
    pub kind: FieldKind,
    pub block: u8,
    /// Header track number of the group's first pack; 0 when the stream
    /// starts with album-level text.
    pub first_track: u8,
    /// Split segments. Empty segments are preserved so that the segment
    /// ordinal keeps lining up with track numbers.
    pub segments: Vec<Vec<u8>>,
    pub raw: Vec<u8>,
}

/// Groups packs by `(kind, block)`, orders each group by sequence number and
/// rebuilds the byte streams. Unknown pack types are skipped with a warning.
pub fn reconstruct(packs: &[RawPack], warnings: &mut Vec<DecodeWarning>) -> Vec<FieldStream> {
    let mut groups: BTreeMap<(FieldKind, u8), Vec<&RawPack>> = BTreeMap::new();
    for pack in packs {
        let kind = pack.kind();
        if let FieldKind::Unknown(pack_type) = kind {
            warnings.push(DecodeWarning::UnknownPack {
                index: pack.pack_index,
                pack_type,
            });
            continue;
        }
        groups.entry((kind, pack.block_number)).or_default().push(pack);
    }

    groups
        .into_iter()
        .map(|((kind, block), group)| rebuild_group(kind, block, group, warnings))
        .collect()
}

fn rebuild_group(
    kind: FieldKind,
    block: u8,
    mut group: Vec<&RawPack>,
    warnings: &mut Vec<DecodeWarning>,
) -> FieldStream {
    // Stable, so a duplicated sequence number keeps its source order and the
    // first occurrence wins below.
    group.sort_by_key(|pack| pack.sequence_number);

    let mut ordered: Vec<&RawPack> = Vec::with_capacity(group.len());
    for pack in group {
        match ordered.last() {
            Some(previous) if previous.sequence_number == pack.sequence_number => {
                warnings.push(DecodeWarning::DuplicateSequence {
                    kind,
                    block,
                    sequence: pack.sequence_number,
                });
            }
            Some(previous)
                if pack.sequence_number as u16 > previous.sequence_number as u16 + 1 =>
            {
                warnings.push(DecodeWarning::SequenceGap {
                    kind,
                    block,
                    from: previous.sequence_number,
                    to: pack.sequence_number,
                });
                ordered.push(pack);
            }
            _ => ordered.push(pack),
        }
    }

    let first_track = ordered.first().map_or(0, |pack| pack.track_number);
    let mut raw = Vec::with_capacity(ordered.len() * PAYLOAD_SIZE);
    let mut segments: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut previous_track = first_track;

    for pack in &ordered {
        if pack.track_number != previous_track {
            // The header says a new track starts here; bytes still pending
            // belong to the previous track even though their terminator
            // never arrived.
            if !current.is_empty() {
                warnings.push(DecodeWarning::Boundary {
                    kind,
                    block,
                    track: pack.track_number,
                });
                segments.push(mem::take(&mut current));
            }
            previous_track = pack.track_number;
        }

        raw.extend_from_slice(&pack.payload);
        for &byte in &pack.payload {
            if byte == 0 {
                segments.push(mem::take(&mut current));
            } else {
                current.push(byte);
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    FieldStream {
        kind,
        block,
        first_track,
        segments,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_pack(pack_type: u8, track: u8, sequence: u8, payload: &[u8]) -> RawPack {
        let mut body = [0u8; 12];
        body[..payload.len()].copy_from_slice(payload);
        RawPack {
            pack_type,
            track_number: track,
            sequence_number: sequence,
            block_number: 0,
            character_position: 0,
            payload: body,
            crc: 0,
            crc_valid: true,
            pack_index: sequence as usize,
        }
    }

    #[test]
    fn empty_segments_are_preserved() {
        let packs = vec![raw_pack(0x80, 0, 0, b"X\0\0Y\0ZZZZZZZ")];
        let mut warnings = Vec::new();
        let streams = reconstruct(&packs, &mut warnings);
        assert_eq!(streams.len(), 1);
        assert_eq!(
            streams[0].segments,
            vec![b"X".to_vec(), Vec::new(), b"Y".to_vec(), b"ZZZZZZZ".to_vec()]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn payloads_concatenate_in_sequence_order() {
        let packs = vec![
            raw_pack(0x80, 0, 1, b"tti\0\0\0\0\0\0\0\0\0"),
            raw_pack(0x80, 0, 0, b"Eros Ramazzo"),
        ];
        let mut warnings = Vec::new();
        let streams = reconstruct(&packs, &mut warnings);
        assert_eq!(streams[0].segments[0], b"Eros Ramazzotti".to_vec());
        assert!(warnings.is_empty());
    }

    #[test]
    fn duplicate_sequence_keeps_first_occurrence() {
        let packs = vec![
            raw_pack(0x80, 0, 0, b"first\0\0\0\0\0\0\0"),
            raw_pack(0x80, 0, 0, b"second\0\0\0\0\0\0"),
        ];
        let mut warnings = Vec::new();
        let streams = reconstruct(&packs, &mut warnings);
        assert_eq!(streams[0].segments[0], b"first".to_vec());
        assert!(matches!(
            warnings.as_slice(),
            [DecodeWarning::DuplicateSequence { sequence: 0, .. }]
        ));
    }

    #[test]
    fn sequence_gap_warns_but_reconstruction_continues() {
        let packs = vec![
            raw_pack(0x80, 0, 0, b"ABCDEFGHIJKL"),
            raw_pack(0x80, 0, 2, b"MNOP\0\0\0\0\0\0\0\0"),
        ];
        let mut warnings = Vec::new();
        let streams = reconstruct(&packs, &mut warnings);
        // No filler bytes; the available payloads join directly.
        assert_eq!(streams[0].segments[0], b"ABCDEFGHIJKLMNOP".to_vec());
        assert!(matches!(
            warnings.as_slice(),
            [DecodeWarning::SequenceGap { from: 0, to: 2, .. }]
        ));
    }

    #[test]
    fn track_change_without_terminator_forces_boundary() {
        let packs = vec![
            raw_pack(0x80, 1, 0, b"ABCDEFGHIJKL"),
            raw_pack(0x80, 2, 1, b"XYZ\0\0\0\0\0\0\0\0\0"),
        ];
        let mut warnings = Vec::new();
        let streams = reconstruct(&packs, &mut warnings);
        assert_eq!(streams[0].first_track, 1);
        assert_eq!(streams[0].segments[0], b"ABCDEFGHIJKL".to_vec());
        assert_eq!(streams[0].segments[1], b"XYZ".to_vec());
        assert!(matches!(
            warnings.as_slice(),
            [DecodeWarning::Boundary { track: 2, .. }]
        ));
    }

    #[test]
    fn track_change_after_terminator_is_silent() {
        let packs = vec![
            raw_pack(0x80, 1, 0, b"ABC\0\0\0\0\0\0\0\0\0"),
            raw_pack(0x80, 2, 1, b"XYZ\0\0\0\0\0\0\0\0\0"),
        ];
        let mut warnings = Vec::new();
        reconstruct(&packs, &mut warnings);
        assert!(warnings.is_empty());
    }

    #[test]
    fn groups_split_by_kind_and_block() {
        let mut other_block = raw_pack(0x80, 0, 0, b"alt\0\0\0\0\0\0\0\0\0");
        other_block.block_number = 1;
        let packs = vec![
            raw_pack(0x80, 0, 0, b"main\0\0\0\0\0\0\0\0"),
            raw_pack(0x81, 0, 0, b"artist\0\0\0\0\0\0"),
            other_block,
        ];
        let mut warnings = Vec::new();
        let streams = reconstruct(&packs, &mut warnings);
        assert_eq!(streams.len(), 3);
    }

    #[test]
    fn unknown_pack_types_are_skipped_with_warning() {
        let packs = vec![
            raw_pack(0x80, 0, 0, b"title\0\0\0\0\0\0\0"),
            raw_pack(0x00, 0, 1, b"garbage\0\0\0\0\0"),
        ];
        let mut warnings = Vec::new();
        let streams = reconstruct(&packs, &mut warnings);
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].segments[0], b"title".to_vec());
        assert!(matches!(
            warnings.as_slice(),
            [DecodeWarning::UnknownPack { pack_type: 0x00, .. }]
        ));
    }
}
