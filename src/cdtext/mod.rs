use crate::cdtext::error::DecodeWarning;
use crate::cdtext::models::{EncodingKind, FieldKind, ParsedCdText, TrackRecord};
use crate::cdtext::stream::FieldStream;
use log::debug;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

pub mod disc;
pub mod encoding;
pub mod error;
pub mod hexdump;
pub mod models;
pub mod pack;
pub mod stream;

/// Decodes CD-TEXT from a hex dump, e.g. a `CDTEXT.BIN` rendered by a
/// mastering report. Formatting characters are stripped before decoding.
pub fn decode_hex(input: &str) -> ParsedCdText {
    let mut warnings = Vec::new();
    let buffer = hexdump::normalize(input, &mut warnings);
    decode_guarded(&buffer, warnings)
}

/// Decodes raw `CDTEXT.BIN` bytes into structured album and track metadata.
///
/// Always returns a value: malformed regions degrade into warnings, and
/// `success` only drops to `false` when no usable pack exists at all.
pub fn decode(input: &[u8]) -> ParsedCdText {
    decode_guarded(input, Vec::new())
}

fn decode_guarded(buffer: &[u8], warnings: Vec<DecodeWarning>) -> ParsedCdText {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| decode_inner(buffer, warnings.clone())));
    match attempt {
        Ok(parsed) => parsed,
        Err(fault) => faulted(fault, warnings),
    }
}

/// Callers (including an automated formatting layer) rely on always getting
/// a result back, so an internal fault becomes a failed result instead of
/// unwinding further.
fn faulted(fault: Box<dyn Any + Send>, mut warnings: Vec<DecodeWarning>) -> ParsedCdText {
    let message = fault
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| fault.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown internal fault".to_string());
    warnings.push(DecodeWarning::Fault(message));

    ParsedCdText {
        warnings: render_warnings(&warnings),
        ..ParsedCdText::default()
    }
}

fn render_warnings(warnings: &[DecodeWarning]) -> Vec<String> {
    warnings.iter().map(ToString::to_string).collect()
}

fn decode_inner(buffer: &[u8], mut warnings: Vec<DecodeWarning>) -> ParsedCdText {
    let packs = pack::read_packs(buffer, &mut warnings);
    debug!("read {} pack(s) from {} input byte(s)", packs.len(), buffer.len());

    let classifiable = packs.iter().filter(|pack| !pack.kind().is_unknown()).count();
    let streams = stream::reconstruct(&packs, &mut warnings);

    if classifiable == 0 {
        warnings.push(DecodeWarning::Empty);
        return ParsedCdText {
            raw_pack_count: packs.len(),
            warnings: render_warnings(&warnings),
            ..ParsedCdText::default()
        };
    }

    let primary: Vec<&FieldStream> = streams.iter().filter(|s| s.block == 0).collect();
    for alternate in streams.iter().filter(|s| s.block != 0) {
        debug!(
            "ignoring alternate-language block {} for {}",
            alternate.block, alternate.kind
        );
    }

    let size_info = primary
        .iter()
        .find(|s| s.kind == FieldKind::SizeInfo)
        .and_then(|s| disc::parse_size_info(s, &mut warnings));
    let resolved = encoding::resolve(size_info.map(|info| info.character_code), &mut warnings);
    debug!("resolved text encoding: {resolved:?}");

    let mut records: BTreeMap<u8, TrackRecord> = BTreeMap::new();
    let mut disc_id = None;
    let mut genre = None;

    for stream in &primary {
        match stream.kind {
            FieldKind::Title
            | FieldKind::Performer
            | FieldKind::Songwriter
            | FieldKind::Composer
            | FieldKind::Arranger
            | FieldKind::UpcIsrc => assign_segments(stream, resolved, &mut records),
            FieldKind::Message => {
                if let Some(first) = stream.segments.first().filter(|s| !s.is_empty()) {
                    let record = records.entry(0).or_insert_with(|| TrackRecord::new(0));
                    record
                        .fields
                        .insert(FieldKind::Message, encoding::render(first, resolved));
                }
            }
            FieldKind::DiscId => disc_id = disc::parse_disc_id(stream, resolved),
            FieldKind::Genre => genre = disc::parse_genre(stream, resolved, &mut warnings),
            FieldKind::TocInfo | FieldKind::TocInfo2 | FieldKind::ClosedInfo => {
                // No structured interpretation; keep the raw stream visible
                // for diagnostics.
                let record = records.entry(0).or_insert_with(|| TrackRecord::new(0));
                record.fields.insert(stream.kind, hex::encode(&stream.raw));
            }
            FieldKind::SizeInfo => {}
            FieldKind::Reserved(_) => debug!("skipping reserved stream {}", stream.kind),
            FieldKind::Unknown(_) => {}
        }
    }

    let max_text_track = packs
        .iter()
        .filter(|pack| pack.block_number == 0 && pack.kind().is_text())
        .map(|pack| pack.track_number)
        .max()
        .unwrap_or(0);
    let track_count = size_info.map_or(max_text_track as usize, |info| info.track_count());
    records.retain(|&number, _| number == 0 || number as usize <= track_count);

    let upc = records
        .get_mut(&0)
        .and_then(|album| album.fields.remove(&FieldKind::UpcIsrc))
        .filter(|value| !value.is_empty());
    let album_title = records
        .get(&0)
        .and_then(|album| album.field(FieldKind::Title))
        .map(str::to_string);
    let album_artist = records
        .get(&0)
        .and_then(|album| album.field(FieldKind::Performer))
        .map(str::to_string);
    records.retain(|_, record| !record.fields.is_empty());

    ParsedCdText {
        success: true,
        album_title,
        album_artist,
        disc_id,
        genre,
        upc,
        encoding: resolved,
        track_count,
        tracks: records.into_values().collect(),
        raw_pack_count: packs.len(),
        warnings: render_warnings(&warnings),
    }
}

/// Maps a stream's split segments onto track slots: the first segment lands
/// on the group's starting track (0 is the album slot) and each following
/// segment advances one track.
fn assign_segments(
    stream: &FieldStream,
    encoding_kind: EncodingKind,
    records: &mut BTreeMap<u8, TrackRecord>,
) {
    for (offset, segment) in stream.segments.iter().enumerate() {
        let Ok(slot) = u8::try_from(stream.first_track as usize + offset) else {
            break;
        };
        let record = records.entry(slot).or_insert_with(|| TrackRecord::new(slot));
        record
            .fields
            .insert(stream.kind, encoding::render(segment, encoding_kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdtext::models::GenreInfo;
    use crate::cdtext::pack::crc16_cdtext;

    fn make_pack(pack_type: u8, track: u8, sequence: u8, payload: &[u8]) -> [u8; 18] {
        let mut raw = [0u8; 18];
        raw[0] = pack_type;
        raw[1] = track;
        raw[2] = sequence;
        raw[4..4 + payload.len()].copy_from_slice(payload);
        let crc = crc16_cdtext(&raw[..16]);
        raw[16..].copy_from_slice(&crc.to_be_bytes());
        raw
    }

    fn concat(packs: &[[u8; 18]]) -> Vec<u8> {
        packs.iter().flat_map(|pack| pack.iter().copied()).collect()
    }

    fn track<'a>(parsed: &'a ParsedCdText, number: u8) -> &'a TrackRecord {
        parsed
            .tracks
            .iter()
            .find(|record| record.track_number == number)
            .unwrap()
    }

    #[test]
    fn album_title_spans_multiple_packs() {
        // Captured fixtures ship with zeroed CRC bytes; decoding must still
        // succeed with warnings.
        let mut first = make_pack(0x80, 0, 0, b"Eros Ramazzo");
        let mut second = make_pack(0x80, 0, 1, b"tti\0\0\0\0\0\0\0\0\0");
        first[16..].copy_from_slice(&[0, 0]);
        second[16..].copy_from_slice(&[0, 0]);

        let parsed = decode(&concat(&[first, second]));
        assert!(parsed.success);
        assert_eq!(parsed.album_title.as_deref(), Some("Eros Ramazzotti"));
        assert_eq!(parsed.raw_pack_count, 2);
        assert_eq!(parsed.track_count, 0);
        assert!(!parsed.warnings.is_empty());
    }

    #[test]
    fn track_title_spans_multiple_packs() {
        let packs = concat(&[
            make_pack(0x80, 1, 0, b"L'Ombra Del "),
            make_pack(0x80, 1, 1, b"Gigante\0\0\0\0\0"),
        ]);
        let parsed = decode(&packs);
        assert!(parsed.success);
        assert_eq!(parsed.track_count, 1);
        assert_eq!(
            track(&parsed, 1).field(FieldKind::Title),
            Some("L'Ombra Del Gigante")
        );
    }

    #[test]
    fn decoding_is_idempotent() {
        let packs = concat(&[
            make_pack(0x80, 0, 0, b"Album\0\0\0\0\0\0\0"),
            make_pack(0x81, 0, 0, b"Artist\0\0\0\0\0\0"),
        ]);
        assert_eq!(decode(&packs), decode(&packs));
    }

    #[test]
    fn crc_bytes_never_change_reconstructed_text() {
        let intact = concat(&[
            make_pack(0x80, 0, 0, b"Eros Ramazzo"),
            make_pack(0x80, 0, 1, b"tti\0\0\0\0\0\0\0\0\0"),
        ]);
        let mut corrupted = intact.clone();
        corrupted[16] ^= 0xFF;
        corrupted[17] ^= 0xFF;

        let good = decode(&intact);
        let bad = decode(&corrupted);
        assert_eq!(good.album_title, bad.album_title);
        assert_eq!(good.tracks, bad.tracks);
        assert!(good.warnings.is_empty());
        assert!(bad.warnings.iter().any(|warning| warning.contains("CRC")));
    }

    #[test]
    fn unknown_pack_type_is_skipped_once() {
        let packs = concat(&[
            make_pack(0x80, 0, 0, b"Eros Ramazzo"),
            make_pack(0x00, 0, 0, b"junk\0\0\0\0\0\0\0\0"),
            make_pack(0x80, 0, 1, b"tti\0\0\0\0\0\0\0\0\0"),
        ]);
        let parsed = decode(&packs);
        assert_eq!(parsed.album_title.as_deref(), Some("Eros Ramazzotti"));
        assert_eq!(
            parsed
                .warnings
                .iter()
                .filter(|warning| warning.contains("unknown pack type"))
                .count(),
            1
        );
    }

    #[test]
    fn partial_pack_fails_with_structural_warning() {
        let parsed = decode(&[0x80; 17]);
        assert!(!parsed.success);
        assert_eq!(parsed.raw_pack_count, 0);
        assert!(parsed.warnings.iter().any(|warning| warning.contains("stray byte")));
    }

    #[test]
    fn empty_input_fails() {
        let parsed = decode(&[]);
        assert!(!parsed.success);
        assert_eq!(parsed.raw_pack_count, 0);
    }

    #[test]
    fn size_info_drives_track_count_and_encoding() {
        let packs = concat(&[
            make_pack(0x8F, 0, 0, &[0x01, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            make_pack(0x80, 0, 0, b"Album\0One\0Tw"),
        ]);
        let parsed = decode(&packs);
        assert!(parsed.success);
        assert_eq!(parsed.encoding, EncodingKind::Latin1);
        assert_eq!(parsed.track_count, 2);
    }

    #[test]
    fn size_info_overrides_observed_track_numbers() {
        let packs = concat(&[
            make_pack(0x8F, 0, 0, &[0x00, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            make_pack(0x80, 0, 0, b"Album\0\0\0\0\0\0\0"),
            make_pack(0x80, 1, 1, b"One\0\0\0\0\0\0\0\0\0"),
            make_pack(0x80, 2, 2, b"Two\0\0\0\0\0\0\0\0\0"),
        ]);
        let parsed = decode(&packs);
        assert_eq!(parsed.track_count, 1);
        assert!(parsed.tracks.iter().all(|record| record.track_number <= 1));
    }

    #[test]
    fn upc_and_isrcs_are_attributed() {
        let packs = concat(&[
            make_pack(0x8F, 0, 0, &[0x00, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            make_pack(0x8E, 0, 0, b"60249812345\0"),
            make_pack(0x8E, 1, 1, b"USFI1760000\0"),
        ]);
        let parsed = decode(&packs);
        assert_eq!(parsed.upc.as_deref(), Some("60249812345"));
        assert_eq!(
            track(&parsed, 1).field(FieldKind::UpcIsrc),
            Some("USFI1760000")
        );
    }

    #[test]
    fn genre_and_disc_id_are_extracted() {
        let mut genre_payload = vec![0x00, 0x11];
        genre_payload.extend_from_slice(b"Dance\0\0\0\0\0");
        let packs = concat(&[
            make_pack(0x80, 0, 0, b"Album\0\0\0\0\0\0\0"),
            make_pack(0x86, 0, 0, b"DISC1234\0\0\0\0"),
            make_pack(0x87, 0, 0, &genre_payload),
        ]);
        let parsed = decode(&packs);
        assert_eq!(parsed.disc_id.as_deref(), Some("DISC1234"));
        assert_eq!(
            parsed.genre,
            Some(GenreInfo {
                code: 0x11,
                label: "Dance".to_string()
            })
        );
    }

    #[test]
    fn hex_and_binary_inputs_agree() {
        let packs = concat(&[
            make_pack(0x80, 0, 0, b"Album\0\0\0\0\0\0\0"),
            make_pack(0x81, 0, 0, b"Artist\0\0\0\0\0\0"),
        ]);
        let dump = packs
            .chunks(18)
            .map(hex::encode)
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(decode_hex(&dump), decode(&packs));
    }

    #[test]
    fn random_pack_streams_always_decode() {
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        for _ in 0..64 {
            let pack_count = (next() % 40) as usize;
            let mut buffer = Vec::with_capacity(pack_count * 18);
            for sequence in 0..pack_count {
                let mut payload = [0u8; 12];
                for byte in &mut payload {
                    *byte = (next() & 0xFF) as u8;
                }
                buffer.extend_from_slice(&make_pack(
                    0x80 + (next() % 16) as u8,
                    (next() % 100) as u8,
                    sequence as u8,
                    &payload,
                ));
            }

            let parsed = decode(&buffer);
            assert_eq!(parsed.raw_pack_count, pack_count);
        }
    }
}
