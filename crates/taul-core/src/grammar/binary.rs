//! Binary serialization for grammars.
//!
//! Image layout: 4-byte magic, format version (u32 LE), CRC32 of the
//! payload (u32 LE), then a postcard encoding of the grammar data. The wire
//! format is stable across processes and hosts of the same format version;
//! the behavioural contract is that deserializing a serialized grammar
//! yields a grammar indistinguishable from the original.

use super::json::GrammarError;
use super::{Grammar, GrammarData};

/// Magic bytes at the start of every grammar image.
pub const MAGIC: [u8; 4] = *b"TAUL";

/// Current image format version.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 12;

impl Grammar {
    /// Serialize to the binary image format.
    pub fn to_binary(&self) -> Vec<u8> {
        let payload =
            postcard::to_allocvec(self.data()).expect("grammar serialization should not fail");
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        out.extend_from_slice(&payload);
        out
    }

    /// Deserialize from the binary image format.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, GrammarError> {
        if bytes.len() < HEADER_LEN {
            return Err(GrammarError::ImageTooSmall(bytes.len()));
        }
        if bytes[0..4] != MAGIC {
            return Err(GrammarError::InvalidMagic);
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != FORMAT_VERSION {
            return Err(GrammarError::UnsupportedVersion(version));
        }
        let checksum = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let payload = &bytes[HEADER_LEN..];
        let actual = crc32fast::hash(payload);
        if checksum != actual {
            return Err(GrammarError::ChecksumMismatch {
                header: checksum,
                actual,
            });
        }
        let data: GrammarData = postcard::from_bytes(payload)?;
        Ok(Grammar::from_data(data))
    }
}
