//! On-disk save image: bitcode payload, lz4 when it helps, fixed header.

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};

use crate::error::SaveError;
use crate::file_header::{self, FLAG_COMPRESSED};

/// Current save data schema version. Bump when `SaveData` or any extension
/// payload changes incompatibly.
pub const SAVE_VERSION: u32 = 1;

/// Everything a save file carries. Feature state lives in `extensions`,
/// keyed by each resource's `SAVE_KEY`.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct SaveData {
    pub version: u32,
    pub tick: u64,
    pub extensions: BTreeMap<String, Vec<u8>>,
}

impl SaveData {
    pub fn new(tick: u64, extensions: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            version: SAVE_VERSION,
            tick,
            extensions,
        }
    }
}

/// Encode to the on-disk format. The payload is compressed only when lz4
/// actually shrinks it; the header flag records which way it went.
pub fn encode_save(data: &SaveData) -> Vec<u8> {
    let raw = bitcode::encode(data);
    let uncompressed_size = raw.len() as u32;
    let compressed = lz4_flex::compress_prepend_size(&raw);
    let (payload, flags) = if compressed.len() < raw.len() {
        (compressed, FLAG_COMPRESSED)
    } else {
        (raw, 0)
    };
    file_header::wrap_with_header(&payload, flags, data.tick, uncompressed_size)
}

/// Decode a full save file image.
pub fn decode_save(bytes: &[u8]) -> Result<SaveData, SaveError> {
    let (header, payload) = file_header::unwrap_header(bytes)?;
    let raw = if header.is_compressed() {
        lz4_flex::decompress_size_prepended(payload)
            .map_err(|e| SaveError::Decode(e.to_string()))?
    } else {
        payload.to_vec()
    };
    let data: SaveData = bitcode::decode(&raw)?;
    if data.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data)
}
