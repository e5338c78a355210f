// ---------------------------------------------------------------------------
// file_header – save file header with magic bytes, flags, and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "CPLN"
//   [4..8]   Header layout version (u32)
//   [8..12]  Flags (u32: bit 0 = lz4-compressed payload)
//   [12..20] Tick the image was taken at (u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the payload (everything after the header)
//
// On save: encode SaveData -> maybe compress -> prepend header.
// On load: check magic -> validate checksum -> strip header -> decompress ->
// decode SaveData.

use xxhash_rust::xxh32::xxh32;

use crate::error::SaveError;

/// Magic bytes identifying a colony planner save file.
pub const MAGIC: [u8; 4] = *b"CPLN";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Current header layout version. Distinct from the SaveData version, which
/// tracks schema changes; this one only tracks the header bytes themselves.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Flag bit 0: the payload is lz4-compressed.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub tick: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }
}

/// Wrap a payload with a header: `[header (28 bytes)] ++ [payload]`.
/// `uncompressed_size` is the payload's size before any compression.
pub fn wrap_with_header(payload: &[u8], flags: u32, tick: u64, uncompressed_size: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&HEADER_FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&tick.to_le_bytes());
    out.extend_from_slice(&uncompressed_size.to_le_bytes());
    out.extend_from_slice(&xxh32(payload, XXHASH_SEED).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Parse and validate the header, returning it with the payload slice.
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Err(SaveError::NotASaveFile);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Truncated {
            len: bytes.len(),
            need: HEADER_SIZE,
        });
    }

    let format_version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    let flags = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let tick = u64::from_le_bytes(bytes[12..20].try_into().unwrap());
    let uncompressed_size = u32::from_le_bytes(bytes[20..24].try_into().unwrap());
    let checksum = u32::from_le_bytes(bytes[24..28].try_into().unwrap());

    if format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::HeaderVersion {
            found: format_version,
            supported: HEADER_FORMAT_VERSION,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != checksum {
        return Err(SaveError::ChecksumMismatch {
            expected: checksum,
            found: computed,
        });
    }

    Ok((
        FileHeader {
            format_version,
            flags,
            tick,
            uncompressed_size,
            checksum,
        },
        payload,
    ))
}
