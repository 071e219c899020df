use crate::cdtext::models::ParsedCdText;
use serde::Serialize;

pub const ID_RECORD_SIZE: usize = 128;
pub const MS_RECORD_SIZE: usize = 128;
pub const PQ_RECORD_SIZE: usize = 64;
pub const BYTES_PER_SECTOR: u64 = 2352;
pub const FRAMES_PER_SECOND: u32 = 75;
/// Two-second lead-in added to absolute frame positions for disc-id lookups.
pub const LEAD_IN_FRAMES: u32 = 150;

/// The 128-byte DDPID record identifying the master.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdpId {
    pub level: String,
    pub upc: String,
    pub master_id_start: String,
    pub master_id_length: String,
    pub media_type: String,
    pub master_id: String,
    pub book_flag: String,
    pub media_kind: String,
    pub side_count: String,
    pub side: String,
    pub layer_count: String,
    pub layer: String,
    pub text: String,
}

/// One 128-byte DDPMS map-stream record. Field layout follows the DDP v2.00
/// column positions; values are kept as the trimmed source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MsEntry {
    pub version: String,
    pub stream_type: String,
    pub stream_pointer: String,
    pub stream_length: u32,
    pub stream_start: String,
    pub subcode_mode: String,
    pub content_mode: String,
    pub source_storage_mode: String,
    pub scramble: String,
    pub pregap1: String,
    pub pregap2: String,
    pub postgap: String,
    pub media: String,
    pub track: String,
    pub index: String,
    pub isrc: String,
    pub blocking: String,
    pub stream_ident: String,
    pub new_flag: String,
    pub next_pregap1: String,
    pub pause_add: String,
    pub offset: String,
    /// Bytes on disk: audio and video streams count sectors, everything
    /// else counts bytes directly.
    pub file_size: u64,
}

/// One 64-byte PQ descriptor record with derived timing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PqEntry {
    pub version: String,
    /// Track number, or "AA" for the lead-out.
    pub track: String,
    pub index: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub frames: String,
    pub control: String,
    pub control2: String,
    pub isrc: String,
    pub upc: String,
    pub text: String,
    /// Frames between the preceding index-00 record and this track start.
    pub pre_gap: Option<u32>,
    /// MM:SS:FF to the next pause or the lead-out.
    pub duration: Option<String>,
}

/// One track of the combined listing, merged from the map stream, the PQ
/// descriptor and CD-TEXT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdpTrack {
    pub number: u8,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub songwriter: Option<String>,
    pub isrc: Option<String>,
    pub stream_ident: Option<String>,
    pub start_time: Option<String>,
    pub duration: Option<String>,
    pub pre_gap: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdpFile {
    pub name: String,
    pub size: u64,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdpSummary {
    pub track_count: usize,
    pub upc: Option<String>,
    pub album_title: Option<String>,
    pub performer: Option<String>,
    pub total_duration: Option<String>,
    pub has_pq: bool,
    pub has_cd_text: bool,
    pub files: Vec<DdpFile>,
}

/// Everything extracted from one DDP folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDdp {
    pub id: Option<DdpId>,
    pub ms_entries: Vec<MsEntry>,
    pub pq_entries: Vec<PqEntry>,
    pub cd_text: Option<ParsedCdText>,
    pub tracks: Vec<DdpTrack>,
    pub summary: DdpSummary,
}

pub fn msf_to_frames(minutes: &str, seconds: &str, frames: &str) -> u32 {
    let minutes: u32 = minutes.trim().parse().unwrap_or(0);
    let seconds: u32 = seconds.trim().parse().unwrap_or(0);
    let frames: u32 = frames.trim().parse().unwrap_or(0);
    (minutes * 60 + seconds) * FRAMES_PER_SECOND + frames
}

pub fn frames_to_msf(frames: u32) -> String {
    let seconds = frames / FRAMES_PER_SECOND;
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 60,
        seconds % 60,
        frames % FRAMES_PER_SECOND
    )
}
