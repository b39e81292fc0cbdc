//! JSON serialization for grammars.
//!
//! A human-readable export of the same data the binary image carries. The
//! binary format is the one with the stability contract; JSON is for
//! inspection and tests.

use super::{Grammar, GrammarData};

/// Errors from grammar serialization and deserialization.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("invalid magic: expected TAUL")]
    InvalidMagic,

    #[error("unsupported grammar format version {0}")]
    UnsupportedVersion(u32),

    #[error("grammar image too small ({0} bytes)")]
    ImageTooSmall(usize),

    #[error("grammar image checksum mismatch: header {header:08x}, actual {actual:08x}")]
    ChecksumMismatch { header: u32, actual: u32 },

    #[error("malformed grammar payload: {0}")]
    Payload(#[from] postcard::Error),

    #[error("malformed grammar JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Grammar {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self.data()).expect("grammar serialization should not fail")
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let data: GrammarData = serde_json::from_str(json)?;
        Ok(Grammar::from_data(data))
    }
}
