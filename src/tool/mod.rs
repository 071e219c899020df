//! Boundary adapter between the decoder and a tool-calling LLM runtime.
//!
//! The runtime registers [`definition`] and forwards each call to
//! [`execute`]; the decoder itself stays unaware of scheduling, transport
//! and presentation, and this module stays out of the decoding core.

use crate::cdtext;
use crate::cdtext::models::{FieldKind, RawPack, TrackRecord};
use serde::Deserialize;
use serde_json::{Value, json};

pub const TOOL_NAME: &str = "parse_cdtext";

/// One tool call as the runtime hands it over.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeRequest {
    /// Hex dump of the CD-TEXT data; spaces and newlines are fine.
    pub hex_data: String,
    /// Attach the raw pack dump for debugging.
    #[serde(default)]
    pub include_raw_packs: bool,
}

/// Tool definition the runtime registers.
pub fn definition() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Parse CD-TEXT binary data from DDP masters or disc images. \
            Call this tool when hexadecimal data appears to be CD-TEXT \
            (packs starting with bytes like 80, 81, 82). Returns structured \
            album, track and code metadata.",
        "parameters": {
            "type": "object",
            "properties": {
                "hexData": {
                    "type": "string",
                    "description": "Hexadecimal string containing CD-TEXT data; spaces and newlines allowed"
                },
                "includeRawPacks": {
                    "type": "boolean",
                    "default": false,
                    "description": "Include the raw pack dump for debugging"
                }
            },
            "required": ["hexData"]
        }
    })
}

/// Runs one tool call. Always yields a JSON value; decode failures come
/// back as `success: false` with the warning trail instead of an error.
pub fn execute(request: &DecodeRequest) -> Value {
    let parsed = cdtext::decode_hex(&request.hex_data);
    if !parsed.success {
        return json!({
            "success": false,
            "error": parsed.warnings.join("; "),
        });
    }

    let rows: Vec<Value> = parsed.tracks.iter().filter_map(track_row).collect();
    let mut response = json!({
        "success": true,
        "album": {
            "title": parsed.album_title.as_deref().unwrap_or("Unknown Album"),
            "artist": parsed.album_artist.as_deref().unwrap_or("Unknown Artist"),
        },
        "trackCount": parsed.track_count,
        "tracks": rows,
        "discId": parsed.disc_id,
        "genre": parsed.genre,
        "upc": parsed.upc,
        "encoding": parsed.encoding,
        "warnings": parsed.warnings,
    });

    if request.include_raw_packs {
        let mut warnings = Vec::new();
        let buffer = cdtext::hexdump::normalize(&request.hex_data, &mut warnings);
        let packs = cdtext::pack::read_packs(&buffer, &mut warnings);
        response["rawPacks"] = pack_dump(&packs);
    }

    response
}

/// Rows with no usable data are dropped so the runtime never renders
/// placeholder tracks.
fn track_row(record: &TrackRecord) -> Option<Value> {
    let field = |kind: FieldKind| record.field(kind).filter(|value| !value.is_empty());
    let title = field(FieldKind::Title);
    let performer = field(FieldKind::Performer);
    let isrc = field(FieldKind::UpcIsrc);
    if title.is_none() && performer.is_none() && isrc.is_none() {
        return None;
    }

    let number = if record.track_number == 0 {
        json!("Album")
    } else {
        json!(record.track_number)
    };
    Some(json!({
        "number": number,
        "title": title,
        "performer": performer,
        "songwriter": field(FieldKind::Songwriter),
        "composer": field(FieldKind::Composer),
        "isrc": isrc,
        "message": field(FieldKind::Message),
    }))
}

/// Per-pack dump with the header fields and the payload as hex.
pub(crate) fn pack_dump(packs: &[RawPack]) -> Value {
    let rows: Vec<Value> = packs
        .iter()
        .map(|pack| {
            json!({
                "packType": format!("{:#04x}", pack.pack_type),
                "packTypeName": pack.kind().to_string(),
                "trackNumber": pack.track_number,
                "sequenceNumber": pack.sequence_number,
                "blockNumber": pack.block_number,
                "characterPosition": pack.character_position,
                "payload": hex::encode(pack.payload),
                "crc": format!("{:04x}", pack.crc),
                "crcValid": pack.crc_valid,
            })
        })
        .collect();
    Value::Array(rows)
}
