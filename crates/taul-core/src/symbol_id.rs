//! Symbol identifiers.
//!
//! A symbol id is a 32-bit integer partitioned per domain: terminal ids
//! occupy `0..T` (`T == 0x110000` for glyphs, `T == lpr count` for tokens),
//! nonterminal ids occupy `T..` in parse-table row order, and the two
//! sentinels sit at the very top of the id space so they are shared by both
//! domains.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of terminal ids in the glyph domain (the Unicode scalar value
/// space; surrogate codepoints are carved out of sets, not of the id space).
pub const GLYPH_TERMINALS: u32 = 0x11_0000;

/// Identifier of a terminal, nonterminal, or sentinel symbol.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Sentinel id of the end-of-input symbol.
    ///
    /// Sentinels stop short of `u32::MAX` so every id remains representable
    /// inside a half-open `[low, high)` range with `u32` bounds.
    pub const END_OF_INPUT: SymbolId = SymbolId(u32::MAX - 2);
    /// Sentinel id of the failure symbol.
    pub const FAILURE: SymbolId = SymbolId(u32::MAX - 1);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_end(self) -> bool {
        self == Self::END_OF_INPUT
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        self == Self::FAILURE
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::END_OF_INPUT => write!(f, "SymbolId(end-of-input)"),
            Self::FAILURE => write!(f, "SymbolId(failure)"),
            Self(raw) => write!(f, "SymbolId({raw})"),
        }
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::END_OF_INPUT => f.write_str("end-of-input"),
            Self::FAILURE => f.write_str("failure"),
            Self(raw) => write!(f, "{raw}"),
        }
    }
}

/// Nonterminal id allocation of one domain.
///
/// `base` is the first nonterminal id (equal to the domain's terminal
/// count), `primary` the number of declared rules, and `total` the number of
/// parse-table rows including loader-synthesised helper rows. Helper rows
/// carry ids like any other row but are never surfaced in output events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonterminalIdAllocs {
    pub base: u32,
    pub primary: u32,
    pub total: u32,
}

impl NonterminalIdAllocs {
    #[inline]
    pub fn id_of_row(&self, row: u32) -> SymbolId {
        debug_assert!(row < self.total);
        SymbolId::new(self.base + row)
    }

    #[inline]
    pub fn row_of_id(&self, id: SymbolId) -> Option<u32> {
        let raw = id.as_u32();
        if raw >= self.base && raw - self.base < self.total {
            Some(raw - self.base)
        } else {
            None
        }
    }

    /// Whether `row` belongs to a declared rule rather than a helper.
    #[inline]
    pub fn is_primary_row(&self, row: u32) -> bool {
        row < self.primary
    }
}
