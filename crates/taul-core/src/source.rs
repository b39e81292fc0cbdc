//! Source positions.
//!
//! Positions are unsigned byte offsets into the original source string;
//! lengths are in bytes. Glyph and token spans are always measured against
//! the same string the reader was bound to.

/// Byte offset into the source string.
pub type SourcePos = u32;
