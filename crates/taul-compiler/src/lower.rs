//! Lowering expression trees to parse-table productions.
//!
//! Each rule becomes one primary table row; nested composites become hidden
//! helper rows appended after the primaries. Helper rows never surface in
//! output events, so `optional`/`kleene-star`/`kleene-plus` and
//! multi-alternative groups cost no observable structure.
//!
//! Lowering runs only on validated expression trees (the definition pass
//! raised no errors), so leaf resolution may assume context rules hold.

use std::collections::HashMap;

use taul_core::{IdRange, SymbolId, SymbolSet, TableSym, GLYPH_TERMINALS};

use crate::expr::{AltList, Expr, RuleExpr};
use crate::literals;
use crate::loader::Decls;

/// Lowered productions of one domain.
pub(crate) struct Lowered<S> {
    /// Row → alternatives → symbol sequence. Primary rows first.
    pub(crate) rows: Vec<Vec<Vec<TableSym>>>,
    /// Interned terminal sets referenced by `TableSym::{Terminal, Assertion}`.
    pub(crate) sets: Vec<SymbolSet<S>>,
    /// Owning primary row of each row, for diagnostics.
    pub(crate) row_owner: Vec<u32>,
    /// All terminal ids `any`/`not` range over. Never contains end-of-input.
    pub(crate) universe: SymbolSet<S>,
    /// Number of primary rows.
    pub(crate) primary: u32,
}

/// How one atomic expression lowers in a given domain.
pub(crate) enum Leaf<S> {
    /// Consume these terminal sets, in order.
    Consume(Vec<SymbolSet<S>>),
    /// Assert end-of-input without consuming.
    AssertEnd,
    /// Expand the primary row of another rule.
    Rule(u32),
}

pub(crate) trait LeafResolver<S> {
    fn resolve(&self, expr: &Expr) -> Leaf<S>;
}

/// Every Unicode scalar value; surrogates are not scalars and stay out.
pub(crate) fn glyph_universe<S>() -> SymbolSet<S> {
    SymbolSet::from_ranges([
        IdRange {
            low: 0,
            high: 0xD800,
        },
        IdRange {
            low: 0xE000,
            high: GLYPH_TERMINALS,
        },
    ])
}

/// Every token id `any`/`not` range over: all normal tokens plus the
/// failure sentinel.
pub(crate) fn token_universe<S>(lpr_count: u32) -> SymbolSet<S> {
    let mut universe = SymbolSet::from_ranges([IdRange {
        low: 0,
        high: lpr_count,
    }]);
    universe.add_id(SymbolId::FAILURE);
    universe
}

/// Leaf resolution for LPR expression trees (glyph domain).
pub(crate) struct LprLeaves<'d, S> {
    pub(crate) decls: &'d Decls,
    pub(crate) universe: SymbolSet<S>,
}

impl<S> LeafResolver<S> for LprLeaves<'_, S> {
    fn resolve(&self, expr: &Expr) -> Leaf<S> {
        match expr {
            Expr::End => Leaf::AssertEnd,
            Expr::Any => Leaf::Consume(vec![self.universe.clone()]),
            Expr::String(s) => Leaf::Consume(
                literals::parse_string(s)
                    .chars()
                    .map(|cp| SymbolSet::singleton(SymbolId::new(cp as u32)))
                    .collect(),
            ),
            Expr::Charset(s) => {
                let set = SymbolSet::from_ranges(literals::parse_charset(s).into_iter().map(
                    |(low, high)| IdRange {
                        low: low as u32,
                        high: high as u32 + 1,
                    },
                ));
                Leaf::Consume(vec![set])
            }
            Expr::Name(name) => {
                let index = self
                    .decls
                    .lpr_index(name)
                    .expect("name leaves are resolved by the definition pass");
                Leaf::Rule(index as u32)
            }
            // token/failure leaves never survive validation in LPR scope
            _ => {
                debug_assert!(false, "unexpected LPR leaf: {expr:?}");
                Leaf::Consume(Vec::new())
            }
        }
    }
}

/// Leaf resolution for PPR expression trees (token domain).
pub(crate) struct PprLeaves<'d, S> {
    pub(crate) decls: &'d Decls,
    pub(crate) lpr_count: u32,
    /// Constant spelling of each simple LPR, for `string` leaves.
    pub(crate) spellings: &'d HashMap<String, u32>,
    pub(crate) universe: SymbolSet<S>,
}

impl<S> LeafResolver<S> for PprLeaves<'_, S> {
    fn resolve(&self, expr: &Expr) -> Leaf<S> {
        match expr {
            Expr::End => Leaf::AssertEnd,
            Expr::Any => Leaf::Consume(vec![self.universe.clone()]),
            Expr::Token => Leaf::Consume(vec![SymbolSet::from_ranges([IdRange {
                low: 0,
                high: self.lpr_count,
            }])]),
            Expr::Failure => Leaf::Consume(vec![SymbolSet::singleton(SymbolId::FAILURE)]),
            Expr::String(s) => {
                let spelling = literals::parse_string(s);
                match self.spellings.get(&spelling) {
                    Some(&lpr) => Leaf::Consume(vec![SymbolSet::singleton(SymbolId::new(lpr))]),
                    None => {
                        log::warn!("no LPR spells the literal '{spelling}'; matcher is empty");
                        Leaf::Consume(vec![SymbolSet::new()])
                    }
                }
            }
            Expr::Name(name) => {
                if let Some(index) = self.decls.lpr_index(name) {
                    Leaf::Consume(vec![SymbolSet::singleton(SymbolId::new(index as u32))])
                } else {
                    let index = self
                        .decls
                        .ppr_index(name)
                        .expect("name leaves are resolved by the definition pass");
                    Leaf::Rule(index as u32)
                }
            }
            _ => {
                debug_assert!(false, "unexpected PPR leaf: {expr:?}");
                Leaf::Consume(Vec::new())
            }
        }
    }
}

/// Constant spelling of an LPR whose definition is a plain string sequence,
/// used to resolve `string` leaves in PPR context.
pub(crate) fn constant_spelling(rule: &RuleExpr) -> Option<String> {
    if rule.alts.len() != 1 {
        return None;
    }
    seq_spelling(&rule.alts[0])
}

fn seq_spelling(exprs: &[Expr]) -> Option<String> {
    let mut out = String::new();
    for expr in exprs {
        match expr {
            Expr::String(s) => out.push_str(&literals::parse_string(s)),
            Expr::Sequence(alts) if alts.len() == 1 => out.push_str(&seq_spelling(&alts[0])?),
            _ => return None,
        }
    }
    Some(out)
}

/// Lower every rule of one domain.
pub(crate) fn lower_rules<S, R: LeafResolver<S>>(
    exprs: &[RuleExpr],
    resolver: &R,
    universe: SymbolSet<S>,
) -> Lowered<S> {
    let primary = exprs.len() as u32;
    let mut lw = Lowerer {
        rows: vec![Vec::new(); exprs.len()],
        sets: Vec::new(),
        set_cache: HashMap::new(),
        row_owner: (0..primary).collect(),
        universe,
        resolver,
    };
    for (i, rule) in exprs.iter().enumerate() {
        let alts = lw.lower_alts(i as u32, &rule.alts);
        lw.rows[i] = alts;
    }
    Lowered {
        rows: lw.rows,
        sets: lw.sets,
        row_owner: lw.row_owner,
        universe: lw.universe,
        primary,
    }
}

struct Lowerer<'r, S, R> {
    rows: Vec<Vec<Vec<TableSym>>>,
    sets: Vec<SymbolSet<S>>,
    set_cache: HashMap<Vec<IdRange>, u32>,
    row_owner: Vec<u32>,
    universe: SymbolSet<S>,
    resolver: &'r R,
}

impl<S, R: LeafResolver<S>> Lowerer<'_, S, R> {
    fn intern(&mut self, set: SymbolSet<S>) -> u32 {
        let key: Vec<IdRange> = set.ranges().collect();
        if let Some(&idx) = self.set_cache.get(&key) {
            return idx;
        }
        let idx = self.sets.len() as u32;
        self.sets.push(set);
        self.set_cache.insert(key, idx);
        idx
    }

    fn new_row(&mut self, owner: u32) -> u32 {
        let row = self.rows.len() as u32;
        self.rows.push(Vec::new());
        self.row_owner.push(owner);
        row
    }

    fn lower_alts(&mut self, owner: u32, alts: &AltList) -> Vec<Vec<TableSym>> {
        alts.iter()
            .map(|alt| {
                let mut syms = Vec::new();
                self.lower_seq(owner, alt, &mut syms);
                syms
            })
            .collect()
    }

    fn lower_seq(&mut self, owner: u32, exprs: &[Expr], out: &mut Vec<TableSym>) {
        for expr in exprs {
            self.lower_expr(owner, expr, out);
        }
    }

    fn lower_expr(&mut self, owner: u32, expr: &Expr, out: &mut Vec<TableSym>) {
        match expr {
            Expr::Sequence(alts) => {
                if alts.len() == 1 {
                    self.lower_seq(owner, &alts[0], out);
                } else {
                    let row = self.helper(owner, alts, false);
                    out.push(TableSym::Nonterminal { row });
                }
            }
            Expr::Optional(alts) => {
                let row = self.helper(owner, alts, true);
                out.push(TableSym::Nonterminal { row });
            }
            Expr::KleeneStar(alts) => {
                let row = self.star_helper(owner, alts);
                out.push(TableSym::Nonterminal { row });
            }
            Expr::KleenePlus(alts) => {
                // one mandatory round, then a star helper for the rest
                if alts.len() == 1 {
                    self.lower_seq(owner, &alts[0], out);
                } else {
                    let row = self.helper(owner, alts, false);
                    out.push(TableSym::Nonterminal { row });
                }
                let rest = self.star_helper(owner, alts);
                out.push(TableSym::Nonterminal { row: rest });
            }
            Expr::Lookahead(alts) => {
                let set = self.union_of_single_terminals(alts);
                let set = self.intern(set);
                out.push(TableSym::Assertion {
                    set,
                    negated: false,
                });
            }
            Expr::LookaheadNot(alts) => {
                let set = self.union_of_single_terminals(alts);
                let set = self.intern(set);
                out.push(TableSym::Assertion { set, negated: true });
            }
            Expr::Not(alts) => {
                let set = self.union_of_single_terminals(alts);
                let complement = self.universe.difference(&set);
                let set = self.intern(complement);
                out.push(TableSym::Terminal { set });
            }
            leaf => match self.resolver.resolve(leaf) {
                Leaf::Consume(sets) => {
                    for set in sets {
                        let set = self.intern(set);
                        out.push(TableSym::Terminal { set });
                    }
                }
                Leaf::AssertEnd => {
                    let set = self.intern(SymbolSet::singleton(SymbolId::END_OF_INPUT));
                    out.push(TableSym::Assertion {
                        set,
                        negated: false,
                    });
                }
                Leaf::Rule(row) => out.push(TableSym::Nonterminal { row }),
            },
        }
    }

    /// Helper row holding `alts` verbatim, plus an empty alternative when
    /// `optional`.
    fn helper(&mut self, owner: u32, alts: &AltList, optional: bool) -> u32 {
        let row = self.new_row(owner);
        let mut lowered = self.lower_alts(owner, alts);
        if optional {
            lowered.push(Vec::new());
        }
        self.rows[row as usize] = lowered;
        row
    }

    /// Helper row `H → alt_i H | ε` implementing zero-or-more repetition.
    fn star_helper(&mut self, owner: u32, alts: &AltList) -> u32 {
        let row = self.new_row(owner);
        let mut lowered: Vec<Vec<TableSym>> = alts
            .iter()
            .map(|alt| {
                let mut syms = Vec::new();
                self.lower_seq(owner, alt, &mut syms);
                syms.push(TableSym::Nonterminal { row });
                syms
            })
            .collect();
        lowered.push(Vec::new());
        self.rows[row as usize] = lowered;
        row
    }

    /// Union of the single-terminal alternatives of a `lookahead`-family
    /// construct; validation guarantees each alternative is one consuming
    /// terminal.
    fn union_of_single_terminals(&mut self, alts: &AltList) -> SymbolSet<S> {
        let mut union = SymbolSet::new();
        for alt in alts {
            debug_assert_eq!(alt.len(), 1);
            let Some(expr) = alt.first() else { continue };
            match self.resolver.resolve(expr) {
                Leaf::Consume(sets) => {
                    debug_assert_eq!(sets.len(), 1);
                    if let Some(set) = sets.first() {
                        union.union_with(set);
                    }
                }
                _ => debug_assert!(false, "non-terminal inside single-terminal scope"),
            }
        }
        union
    }
}
