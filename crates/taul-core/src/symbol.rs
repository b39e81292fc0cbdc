//! Concrete symbol values.
//!
//! A symbol is an `(id, position, length)` triple. Failure symbols carry a
//! position and length but no meaningful terminal id; end-of-input symbols
//! carry a position only. The engine is generic over [`Symbol`] so one
//! matcher serves both the glyph and token domains.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::SourcePos;
use crate::symbol_id::SymbolId;

/// Common surface of [`Glyph`] and [`Token`].
pub trait Symbol: Copy + PartialEq + fmt::Debug + fmt::Display {
    fn id(&self) -> SymbolId;
    fn pos(&self) -> SourcePos;
    fn len(&self) -> u32;

    #[inline]
    fn is_end(&self) -> bool {
        self.id().is_end()
    }

    #[inline]
    fn is_failure(&self) -> bool {
        self.id().is_failure()
    }

    #[inline]
    fn is_normal(&self) -> bool {
        !self.is_end() && !self.is_failure()
    }

    /// First byte covered by the symbol.
    #[inline]
    fn low_pos(&self) -> SourcePos {
        self.pos()
    }

    /// One past the last byte covered by the symbol.
    #[inline]
    fn high_pos(&self) -> SourcePos {
        self.pos() + self.len()
    }
}

/// A decoded Unicode scalar value with its source span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Glyph {
    pub id: SymbolId,
    pub pos: SourcePos,
    pub len: u32,
}

impl Glyph {
    pub fn normal(cp: char, pos: SourcePos) -> Self {
        Self {
            id: SymbolId::new(cp as u32),
            pos,
            len: cp.len_utf8() as u32,
        }
    }

    pub fn end(pos: SourcePos) -> Self {
        Self {
            id: SymbolId::END_OF_INPUT,
            pos,
            len: 0,
        }
    }

    /// The codepoint, if this is a normal glyph.
    pub fn cp(&self) -> Option<char> {
        if self.is_normal() {
            char::from_u32(self.id.as_u32())
        } else {
            None
        }
    }
}

impl Symbol for Glyph {
    #[inline]
    fn id(&self) -> SymbolId {
        self.id
    }

    #[inline]
    fn pos(&self) -> SourcePos {
        self.pos
    }

    #[inline]
    fn len(&self) -> u32 {
        self.len
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cp() {
            Some(cp) => write!(f, "{:?} at {}", cp, self.pos),
            None => write!(f, "{} at {}", self.id, self.pos),
        }
    }
}

/// Lexer output: a normal token bearing an LPR id and source span, a failure
/// token, or end-of-input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub id: SymbolId,
    pub pos: SourcePos,
    pub len: u32,
}

impl Token {
    pub fn normal(lpr_index: u32, pos: SourcePos, len: u32) -> Self {
        Self {
            id: SymbolId::new(lpr_index),
            pos,
            len,
        }
    }

    pub fn failure(pos: SourcePos, len: u32) -> Self {
        Self {
            id: SymbolId::FAILURE,
            pos,
            len,
        }
    }

    pub fn end(pos: SourcePos) -> Self {
        Self {
            id: SymbolId::END_OF_INPUT,
            pos,
            len: 0,
        }
    }

    /// Index of the LPR that matched this token, if it is a normal token.
    pub fn lpr_index(&self) -> Option<u32> {
        if self.is_normal() {
            Some(self.id.as_u32())
        } else {
            None
        }
    }
}

impl Symbol for Token {
    #[inline]
    fn id(&self) -> SymbolId {
        self.id
    }

    #[inline]
    fn pos(&self) -> SourcePos {
        self.pos
    }

    #[inline]
    fn len(&self) -> u32 {
        self.len
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lpr_index() {
            Some(index) => write!(f, "token(lpr {}) [{}, {})", index, self.low_pos(), self.high_pos()),
            None => write!(f, "{} [{}, {})", self.id, self.low_pos(), self.high_pos()),
        }
    }
}
