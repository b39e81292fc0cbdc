//! FIRST/FOLLOW/prefix-set computation.
//!
//! Standard fixed-point iteration over the lowered productions, with two
//! deviations that reproduce the engine's observable routing:
//! - assertions (`lookahead`, `lookahead-not`, `end`) contribute their
//!   (complemented) set to FIRST and count as non-nullable, even though
//!   they consume nothing at runtime;
//! - every primary row's FOLLOW is seeded with end-of-input, because every
//!   declared rule may be used as a start rule.

use taul_core::{SymbolId, SymbolSet, TableSym};

use crate::lower::Lowered;

pub(crate) struct Analysis<S> {
    pub(crate) first: Vec<SymbolSet<S>>,
    pub(crate) follow: Vec<SymbolSet<S>>,
    pub(crate) nullable: Vec<bool>,
    /// Per row, per alternative: `FIRST(alt) ∪ (FOLLOW(row) if nullable)`.
    pub(crate) alt_prefix: Vec<Vec<SymbolSet<S>>>,
}

pub(crate) fn analyze<S>(low: &Lowered<S>) -> Analysis<S> {
    let n = low.rows.len();
    let mut first: Vec<SymbolSet<S>> = vec![SymbolSet::new(); n];
    let mut nullable = vec![false; n];

    loop {
        let mut changed = false;
        for row in 0..n {
            let mut row_first = SymbolSet::new();
            let mut row_nullable = false;
            for alt in &low.rows[row] {
                let (f, nl) = seq_first(alt, low, &first, &nullable);
                row_first.union_with(&f);
                row_nullable |= nl;
            }
            if row_first != first[row] {
                first[row] = row_first;
                changed = true;
            }
            if row_nullable != nullable[row] {
                nullable[row] = row_nullable;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut follow: Vec<SymbolSet<S>> = vec![SymbolSet::new(); n];
    for item in follow.iter_mut().take(low.primary as usize) {
        item.add_id(SymbolId::END_OF_INPUT);
    }
    loop {
        let mut changed = false;
        for row in 0..n {
            for alt in &low.rows[row] {
                for (i, sym) in alt.iter().enumerate() {
                    let TableSym::Nonterminal { row: r } = *sym else {
                        continue;
                    };
                    let (rest_first, rest_nullable) =
                        seq_first(&alt[i + 1..], low, &first, &nullable);
                    let mut add = rest_first;
                    if rest_nullable {
                        add = add.union(&follow[row]);
                    }
                    let merged = follow[r as usize].union(&add);
                    if merged != follow[r as usize] {
                        follow[r as usize] = merged;
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    let alt_prefix = (0..n)
        .map(|row| {
            low.rows[row]
                .iter()
                .map(|alt| {
                    let (f, nl) = seq_first(alt, low, &first, &nullable);
                    if nl {
                        f.union(&follow[row])
                    } else {
                        f
                    }
                })
                .collect()
        })
        .collect();

    Analysis {
        first,
        follow,
        nullable,
        alt_prefix,
    }
}

/// FIRST set and nullability of a symbol sequence under the current
/// `first`/`nullable` tables.
fn seq_first<S>(
    syms: &[TableSym],
    low: &Lowered<S>,
    first: &[SymbolSet<S>],
    nullable: &[bool],
) -> (SymbolSet<S>, bool) {
    let mut acc = SymbolSet::new();
    for sym in syms {
        match *sym {
            TableSym::Terminal { set } => {
                acc.union_with(&low.sets[set as usize]);
                return (acc, false);
            }
            TableSym::Assertion { set, negated } => {
                if negated {
                    acc.union_with(&low.universe.difference(&low.sets[set as usize]));
                } else {
                    acc.union_with(&low.sets[set as usize]);
                }
                return (acc, false);
            }
            TableSym::Nonterminal { row } => {
                acc.union_with(&first[row as usize]);
                if !nullable[row as usize] {
                    return (acc, false);
                }
            }
        }
    }
    (acc, true)
}
