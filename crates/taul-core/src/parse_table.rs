//! LL(1) parse tables.
//!
//! One table per symbol domain. Rows are densely indexed by nonterminal row
//! index (declared rules first, loader-synthesised helper rows after).
//! Within a row, dispatch is a sorted range map from terminal id intervals
//! to alternative indices; a missing entry means "abort". Terminal matcher
//! sets are interned in the table so stack entries stay `Copy`.

use serde::{Deserialize, Serialize};

use crate::symbol_id::SymbolId;
use crate::symbol_set::{IdRange, SymbolSet};

/// One grammar symbol inside a production alternative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableSym {
    /// Consume one input symbol whose id lies in the interned set.
    Terminal { set: u32 },
    /// Peek one input symbol and require its id to lie in (or, negated,
    /// outside) the interned set, without consuming it.
    Assertion { set: u32, negated: bool },
    /// Expand another table row.
    Nonterminal { row: u32 },
}

/// One production alternative: the symbols to match, left to right.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub syms: Vec<TableSym>,
}

/// Parse-table row of one nonterminal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub alts: Vec<Alternative>,
    /// Sorted, disjoint `(terminal id range, alternative index)` entries.
    pub dispatch: Vec<(IdRange, u32)>,
}

impl TableRow {
    pub fn lookup(&self, terminal: SymbolId) -> Option<u32> {
        let raw = terminal.as_u32();
        let idx = self.dispatch.partition_point(|(r, _)| r.high <= raw);
        match self.dispatch.get(idx) {
            Some((r, alt)) if r.contains(terminal) => Some(*alt),
            _ => None,
        }
    }
}

/// Parse table of one symbol domain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParseTable<S> {
    rows: Vec<TableRow>,
    sets: Vec<SymbolSet<S>>,
}

impl<S> Default for ParseTable<S> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            sets: Vec::new(),
        }
    }
}

impl<S> ParseTable<S> {
    pub fn new(rows: Vec<TableRow>, sets: Vec<SymbolSet<S>>) -> Self {
        Self { rows, sets }
    }

    #[inline]
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    #[inline]
    pub fn row(&self, row: u32) -> &TableRow {
        &self.rows[row as usize]
    }

    /// Alternative chosen for `(nonterminal row, lookahead terminal)`, or
    /// `None` for "abort".
    #[inline]
    pub fn lookup(&self, row: u32, terminal: SymbolId) -> Option<u32> {
        self.rows[row as usize].lookup(terminal)
    }

    #[inline]
    pub fn alternative(&self, row: u32, alt: u32) -> &[TableSym] {
        &self.rows[row as usize].alts[alt as usize].syms
    }

    #[inline]
    pub fn set(&self, idx: u32) -> &SymbolSet<S> {
        &self.sets[idx as usize]
    }
}
