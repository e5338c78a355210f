//! Typed errors for save and load operations.

use std::fmt;

#[derive(Debug)]
pub enum SaveError {
    /// I/O failure: file missing, permission denied, disk full.
    Io(std::io::Error),
    /// Payload failed to decode (bitcode or lz4).
    Decode(String),
    /// The file does not start with the planner save magic.
    NotASaveFile,
    /// The file is shorter than a complete header.
    Truncated { len: usize, need: usize },
    /// Payload checksum does not match the header.
    ChecksumMismatch { expected: u32, found: u32 },
    /// The header layout version is from a newer build.
    HeaderVersion { found: u32, supported: u32 },
    /// The save data schema version is from a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Decode(msg) => write!(f, "decoding error: {msg}"),
            Self::NotASaveFile => write!(f, "not a planner save file (bad magic)"),
            Self::Truncated { len, need } => {
                write!(f, "save file truncated: {len} bytes, header needs {need}")
            }
            Self::ChecksumMismatch { expected, found } => write!(
                f,
                "save file corrupted: checksum mismatch (expected {expected:#010X}, got {found:#010X})"
            ),
            Self::HeaderVersion { found, supported } => write!(
                f,
                "save header layout v{found} is newer than the supported v{supported}"
            ),
            Self::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "save data is v{found}, this build supports up to v{expected_max}"
            ),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
