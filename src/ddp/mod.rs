use crate::cdtext;
use crate::cdtext::models::{FieldKind, ParsedCdText};
use crate::ddp::error::{DdpError, DdpResult};
use crate::ddp::models::{
    BYTES_PER_SECTOR, DdpFile, DdpId, DdpTrack, ID_RECORD_SIZE, LEAD_IN_FRAMES, MS_RECORD_SIZE,
    MsEntry, PQ_RECORD_SIZE, ParsedDdp, PqEntry, frames_to_msf, msf_to_frames,
};
use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod error;
pub mod models;

/// Control files are small; anything bigger is an audio image we never load.
const MAX_CONTROL_FILE_SIZE: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileRole {
    MapStream,
    DiscId,
    PqDescriptor,
    CdText,
    Audio,
    Other,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapStream => write!(f, "Map Stream"),
            Self::DiscId => write!(f, "Disc ID"),
            Self::PqDescriptor => write!(f, "PQ Descriptor"),
            Self::CdText => write!(f, "CD-TEXT"),
            Self::Audio => write!(f, "Audio"),
            Self::Other => write!(f, "Other"),
        }
    }
}

fn classify(name: &str, size: u64) -> FileRole {
    let upper = name.to_uppercase();
    if upper == "DDPMS" {
        FileRole::MapStream
    } else if upper == "DDPID" {
        FileRole::DiscId
    } else if upper.contains("PQ") {
        FileRole::PqDescriptor
    } else if upper.contains("CDTEXT") || upper.contains("CD-TEXT") {
        FileRole::CdText
    } else if size > MAX_CONTROL_FILE_SIZE || upper.ends_with(".DAT") {
        FileRole::Audio
    } else {
        FileRole::Other
    }
}

/// Parses the control files of one DDP master folder. `DDPMS` is the only
/// required member; everything else degrades to an absent section.
pub struct DdpParser {
    root: PathBuf,
}

impl DdpParser {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub async fn parse(&self) -> DdpResult<ParsedDdp> {
        let mut result = ParsedDdp::default();
        let mut map_stream = None;
        let mut disc_id = None;
        let mut pq_descriptor = None;
        let mut cd_text = None;

        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let role = classify(&name, metadata.len());
            debug!("{name}: {role} ({} bytes)", metadata.len());
            match role {
                FileRole::MapStream => map_stream = Some(entry.path()),
                FileRole::DiscId => disc_id = Some(entry.path()),
                FileRole::PqDescriptor => pq_descriptor = Some(entry.path()),
                FileRole::CdText => cd_text = Some(entry.path()),
                FileRole::Audio | FileRole::Other => {}
            }
            result.summary.files.push(DdpFile {
                name,
                size: metadata.len(),
                role: role.to_string(),
            });
        }
        result.summary.files.sort_by(|a, b| a.name.cmp(&b.name));

        let map_stream =
            map_stream.ok_or_else(|| DdpError::MissingMapStream(self.root.clone()))?;
        result.ms_entries = parse_ms(&fs::read(&map_stream).await?);
        debug!("parsed {} map stream record(s)", result.ms_entries.len());

        if let Some(path) = disc_id {
            let id = parse_id(&fs::read(&path).await?);
            if !id.upc.is_empty() {
                result.summary.upc = Some(id.upc.clone());
            }
            result.id = Some(id);
        }

        if let Some(path) = pq_descriptor {
            result.pq_entries = parse_pq(&fs::read(&path).await?);
            result.summary.has_pq = true;
        }

        if let Some(path) = cd_text {
            let parsed = cdtext::decode(&fs::read(&path).await?);
            result.summary.has_cd_text = true;
            result.summary.album_title = parsed.album_title.clone();
            result.summary.performer = parsed.album_artist.clone();
            result.cd_text = Some(parsed);
        }

        result.tracks = build_tracks(
            &result.ms_entries,
            &result.pq_entries,
            result.cd_text.as_ref(),
        );
        result.summary.track_count = result.tracks.len();
        result.summary.total_duration = total_duration(&result.ms_entries);

        Ok(result)
    }
}

/// DDP control files are fixed-column ISO 8859-1 text.
fn field(block: &[u8], range: Range<usize>) -> String {
    block.get(range).map_or_else(String::new, |bytes| {
        bytes
            .iter()
            .map(|&byte| byte as char)
            .collect::<String>()
            .trim()
            .to_string()
    })
}

fn parse_id(bytes: &[u8]) -> DdpId {
    let block = bytes.get(..ID_RECORD_SIZE).unwrap_or(bytes);
    DdpId {
        level: field(block, 0..8),
        upc: field(block, 8..21),
        master_id_start: field(block, 21..29),
        master_id_length: field(block, 29..37),
        media_type: field(block, 37..38),
        master_id: field(block, 38..86),
        book_flag: field(block, 86..87),
        media_kind: field(block, 87..89),
        side_count: field(block, 89..90),
        side: field(block, 90..91),
        layer_count: field(block, 91..92),
        layer: field(block, 92..93),
        text: field(block, 95..128),
    }
}

fn parse_ms(bytes: &[u8]) -> Vec<MsEntry> {
    bytes
        .chunks_exact(MS_RECORD_SIZE)
        .map(|block| {
            let stream_length: u32 = field(block, 14..22).parse().unwrap_or(0);
            let content_mode = field(block, 38..40).to_uppercase();
            let file_size = if content_mode == "DA" || content_mode == "DV" {
                u64::from(stream_length) * BYTES_PER_SECTOR
            } else {
                u64::from(stream_length)
            };
            MsEntry {
                version: field(block, 0..4),
                stream_type: field(block, 4..6),
                stream_pointer: field(block, 6..14),
                stream_length,
                stream_start: field(block, 22..30),
                subcode_mode: field(block, 30..38),
                content_mode,
                source_storage_mode: field(block, 40..41),
                scramble: field(block, 41..42),
                pregap1: field(block, 42..46),
                pregap2: field(block, 46..50),
                postgap: field(block, 50..54),
                media: field(block, 54..55),
                track: field(block, 55..57),
                index: field(block, 57..59),
                isrc: field(block, 59..71),
                blocking: field(block, 71..74),
                stream_ident: field(block, 74..91),
                new_flag: field(block, 91..92),
                next_pregap1: field(block, 92..96),
                pause_add: field(block, 96..104),
                offset: field(block, 104..113),
                file_size,
            }
        })
        .collect()
}

fn parse_pq(bytes: &[u8]) -> Vec<PqEntry> {
    let mut entries: Vec<PqEntry> = bytes
        .chunks_exact(PQ_RECORD_SIZE)
        .map(|block| PqEntry {
            version: field(block, 0..4),
            track: field(block, 4..6),
            index: field(block, 6..8),
            hours: field(block, 8..10),
            minutes: field(block, 10..12),
            seconds: field(block, 12..14),
            frames: field(block, 14..16),
            control: field(block, 16..18),
            control2: field(block, 18..20),
            isrc: field(block, 20..32),
            upc: field(block, 32..45),
            text: field(block, 45..64),
            pre_gap: None,
            duration: None,
        })
        .collect();
    derive_timing(&mut entries);
    entries
}

/// Fills pre-gap and duration on every index-01 track-start record: the gap
/// comes from the preceding record, the duration runs to the next pause or
/// the `AA` lead-out.
fn derive_timing(entries: &mut [PqEntry]) {
    for i in 0..entries.len() {
        if entries[i].index != "01" || entries[i].track.eq_ignore_ascii_case("AA") {
            continue;
        }

        let start = entry_frames(&entries[i]);
        if i > 0 {
            let previous = entry_frames(&entries[i - 1]);
            entries[i].pre_gap = Some(start.saturating_sub(previous));
        }

        let track_number = entries[i].track.parse::<u8>().ok();
        let end = entries[i + 1..]
            .iter()
            .find(|next| {
                let next_pause = next.index == "00"
                    && track_number
                        .is_some_and(|number| next.track.parse::<u8>().ok() == Some(number + 1));
                let leadout = next.track.eq_ignore_ascii_case("AA") && next.index == "01";
                next_pause || leadout
            })
            .map(entry_frames);
        if let Some(end) = end {
            entries[i].duration = Some(frames_to_msf(end.saturating_sub(start)));
        }
    }
}

fn entry_frames(entry: &PqEntry) -> u32 {
    msf_to_frames(&entry.minutes, &entry.seconds, &entry.frames)
}

fn track_slot(tracks: &mut BTreeMap<u8, DdpTrack>, number: u8) -> &mut DdpTrack {
    tracks.entry(number).or_insert_with(|| DdpTrack {
        number,
        ..DdpTrack::default()
    })
}

fn build_tracks(
    ms_entries: &[MsEntry],
    pq_entries: &[PqEntry],
    cd_text: Option<&ParsedCdText>,
) -> Vec<DdpTrack> {
    let mut tracks: BTreeMap<u8, DdpTrack> = BTreeMap::new();

    for ms in ms_entries {
        if ms.content_mode != "DA" {
            continue;
        }
        let Ok(number) = ms.track.parse::<u8>() else {
            continue;
        };
        if number == 0 {
            continue;
        }
        let track = track_slot(&mut tracks, number);
        if track.isrc.is_none() && !ms.isrc.is_empty() {
            track.isrc = Some(ms.isrc.clone());
        }
        if track.stream_ident.is_none() && !ms.stream_ident.is_empty() {
            track.stream_ident = Some(ms.stream_ident.clone());
        }
    }

    for pq in pq_entries {
        if pq.index != "01" || pq.track.eq_ignore_ascii_case("AA") {
            continue;
        }
        let Ok(number) = pq.track.parse::<u8>() else {
            continue;
        };
        if number == 0 {
            continue;
        }
        let track = track_slot(&mut tracks, number);
        track.duration = pq.duration.clone();
        track.pre_gap = pq.pre_gap;
        track.start_time = Some(format!("{}:{}:{}", pq.minutes, pq.seconds, pq.frames));
        if track.isrc.is_none() && !pq.isrc.is_empty() {
            track.isrc = Some(pq.isrc.clone());
        }
    }

    if let Some(text) = cd_text {
        for record in &text.tracks {
            if record.track_number == 0 {
                continue;
            }
            let get = |kind: FieldKind| {
                record
                    .field(kind)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            };
            let track = track_slot(&mut tracks, record.track_number);
            track.title = get(FieldKind::Title);
            track.performer = get(FieldKind::Performer);
            track.songwriter = get(FieldKind::Songwriter);
            if track.isrc.is_none() {
                track.isrc = get(FieldKind::UpcIsrc);
            }
        }
    }

    tracks.into_values().collect()
}

/// Program length from the last audio stream's start and length.
fn total_duration(ms_entries: &[MsEntry]) -> Option<String> {
    let last = ms_entries
        .iter()
        .rev()
        .find(|entry| entry.content_mode == "DA")?;
    let start: u32 = last.stream_start.trim().parse().unwrap_or(0);
    Some(frames_to_msf(start + last.stream_length))
}

/// Frame offsets of each track start, lead-in adjusted: the inputs a
/// disc-id lookup service wants. The lookup itself lives with the caller.
pub fn track_offsets(pq_entries: &[PqEntry]) -> Vec<u32> {
    pq_entries
        .iter()
        .filter(|entry| entry.index == "01" && !entry.track.eq_ignore_ascii_case("AA"))
        .map(|entry| entry_frames(entry) + LEAD_IN_FRAMES)
        .collect()
}

pub fn leadout_offset(pq_entries: &[PqEntry]) -> u32 {
    if let Some(leadout) = pq_entries
        .iter()
        .find(|entry| entry.track.eq_ignore_ascii_case("AA") && entry.index == "01")
    {
        return entry_frames(leadout) + LEAD_IN_FRAMES;
    }
    pq_entries
        .last()
        .map_or(0, |entry| entry_frames(entry) + LEAD_IN_FRAMES)
}
