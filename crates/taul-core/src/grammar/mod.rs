//! The grammar model.
//!
//! A [`Grammar`] is immutable once constructed and shared by handle; cloning
//! is a reference-count bump. It holds the LPR and PPR metadata in
//! declaration order, the two parse tables derived for the glyph and token
//! domains, and name→index mappings with globally unique rule names.

mod binary;
mod json;


pub use binary::{FORMAT_VERSION, MAGIC};
pub use json::GrammarError;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::parse_table::ParseTable;
use crate::qualifier::Qualifier;
use crate::symbol::{Glyph, Token};
use crate::symbol_id::{NonterminalIdAllocs, SymbolId, GLYPH_TERMINALS};
use crate::symbol_set::{GlyphSet, TokenSet};

/// Metadata of one lexical production rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LexerRule {
    pub name: String,
    pub index: u32,
    pub qualifier: Qualifier,
    pub first: GlyphSet,
    pub follow: GlyphSet,
    pub prefix: GlyphSet,
}

/// Metadata of one parser production rule.
///
/// PPRs may not carry `skip`/`support`, so the qualifier is always
/// [`Qualifier::None`]; it is kept here so LPR and PPR metadata read alike.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParserRule {
    pub name: String,
    pub index: u32,
    pub qualifier: Qualifier,
    pub first: TokenSet,
    pub follow: TokenSet,
    pub prefix: TokenSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct GrammarData {
    pub(crate) lprs: IndexMap<String, LexerRule>,
    pub(crate) pprs: IndexMap<String, ParserRule>,
    pub(crate) lpr_table: ParseTable<Glyph>,
    pub(crate) ppr_table: ParseTable<Token>,
}

/// Handle to an immutable, loaded grammar.
#[derive(Clone)]
pub struct Grammar {
    data: Arc<GrammarData>,
}

impl Grammar {
    /// Assemble a grammar from loader output. Rule indices must equal the
    /// rules' positions in declaration order.
    pub fn from_parts(
        lprs: Vec<LexerRule>,
        pprs: Vec<ParserRule>,
        lpr_table: ParseTable<Glyph>,
        ppr_table: ParseTable<Token>,
    ) -> Self {
        let lprs: IndexMap<String, LexerRule> =
            lprs.into_iter().map(|r| (r.name.clone(), r)).collect();
        let pprs: IndexMap<String, ParserRule> =
            pprs.into_iter().map(|r| (r.name.clone(), r)).collect();
        debug_assert!(lprs.values().enumerate().all(|(i, r)| r.index as usize == i));
        debug_assert!(pprs.values().enumerate().all(|(i, r)| r.index as usize == i));
        Self {
            data: Arc::new(GrammarData {
                lprs,
                pprs,
                lpr_table,
                ppr_table,
            }),
        }
    }

    pub(crate) fn from_data(data: GrammarData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    pub(crate) fn data(&self) -> &GrammarData {
        &self.data
    }

    /// Number of LPRs.
    pub fn lprs(&self) -> usize {
        self.data.lprs.len()
    }

    /// Number of PPRs.
    pub fn pprs(&self) -> usize {
        self.data.pprs.len()
    }

    /// Number of LPRs not qualified `support`; these are the rules the
    /// grammar-wide lexer tries.
    pub fn nonsupport_lprs(&self) -> usize {
        self.data
            .lprs
            .values()
            .filter(|r| r.qualifier != Qualifier::Support)
            .count()
    }

    /// LPR ref by index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn lpr_at(&self, index: usize) -> LprRef<'_> {
        let (_, rule) = self.data.lprs.get_index(index).expect("LPR index out of bounds");
        LprRef {
            rule,
            gram: &self.data,
        }
    }

    /// PPR ref by index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn ppr_at(&self, index: usize) -> PprRef<'_> {
        let (_, rule) = self.data.pprs.get_index(index).expect("PPR index out of bounds");
        PprRef {
            rule,
            gram: &self.data,
        }
    }

    pub fn lpr_by_index(&self, index: usize) -> Option<LprRef<'_>> {
        self.data.lprs.get_index(index).map(|(_, rule)| LprRef {
            rule,
            gram: &self.data,
        })
    }

    pub fn ppr_by_index(&self, index: usize) -> Option<PprRef<'_>> {
        self.data.pprs.get_index(index).map(|(_, rule)| PprRef {
            rule,
            gram: &self.data,
        })
    }

    pub fn lpr(&self, name: &str) -> Option<LprRef<'_>> {
        self.data.lprs.get(name).map(|rule| LprRef {
            rule,
            gram: &self.data,
        })
    }

    pub fn ppr(&self, name: &str) -> Option<PprRef<'_>> {
        self.data.pprs.get(name).map(|rule| PprRef {
            rule,
            gram: &self.data,
        })
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.has_lpr(name) || self.has_ppr(name)
    }

    pub fn has_lpr(&self, name: &str) -> bool {
        self.data.lprs.contains_key(name)
    }

    pub fn has_ppr(&self, name: &str) -> bool {
        self.data.pprs.contains_key(name)
    }

    /// The glyph-domain parse table driving LPR matching.
    pub fn lpr_parse_table(&self) -> &ParseTable<Glyph> {
        &self.data.lpr_table
    }

    /// The token-domain parse table driving PPR matching.
    pub fn ppr_parse_table(&self) -> &ParseTable<Token> {
        &self.data.ppr_table
    }

    pub fn lpr_id_allocs(&self) -> NonterminalIdAllocs {
        NonterminalIdAllocs {
            base: GLYPH_TERMINALS,
            primary: self.lprs() as u32,
            total: self.data.lpr_table.row_count().max(self.lprs() as u32),
        }
    }

    pub fn ppr_id_allocs(&self) -> NonterminalIdAllocs {
        NonterminalIdAllocs {
            base: self.lprs() as u32,
            primary: self.pprs() as u32,
            total: self.data.ppr_table.row_count().max(self.pprs() as u32),
        }
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) || *self.data == *other.data
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("lprs", &self.data.lprs.keys().collect::<Vec<_>>())
            .field("pprs", &self.data.pprs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grammar ({} LPRs, {} PPRs)", self.lprs(), self.pprs())?;
        for rule in self.data.lprs.values() {
            writeln!(f, "    lpr {} (index {}, {})", rule.name, rule.index, rule.qualifier)?;
        }
        for rule in self.data.pprs.values() {
            writeln!(f, "    ppr {} (index {})", rule.name, rule.index)?;
        }
        Ok(())
    }
}

/// Immutable reference to an LPR. Becomes unusable when the grammar borrow
/// ends; copy it freely within one.
#[derive(Clone, Copy)]
pub struct LprRef<'g> {
    rule: &'g LexerRule,
    gram: &'g GrammarData,
}

impl<'g> LprRef<'g> {
    pub fn name(&self) -> &'g str {
        &self.rule.name
    }

    pub fn index(&self) -> u32 {
        self.rule.index
    }

    /// Token-domain terminal id of tokens produced by this LPR.
    pub fn id(&self) -> SymbolId {
        SymbolId::new(self.rule.index)
    }

    pub fn qualifier(&self) -> Qualifier {
        self.rule.qualifier
    }

    pub fn first_set(&self) -> &'g GlyphSet {
        &self.rule.first
    }

    pub fn follow_set(&self) -> &'g GlyphSet {
        &self.rule.follow
    }

    /// The set the glyph-domain parse table keys on:
    /// `FIRST ∪ (FOLLOW if the rule is nullable)`.
    pub fn prefix_set(&self) -> &'g GlyphSet {
        &self.rule.prefix
    }
}

impl PartialEq for LprRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.gram, other.gram) && self.rule.index == other.rule.index
    }
}

impl fmt::Debug for LprRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LprRef({})", self.rule.name)
    }
}

impl fmt::Display for LprRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rule.name)
    }
}

/// Immutable reference to a PPR.
#[derive(Clone, Copy)]
pub struct PprRef<'g> {
    rule: &'g ParserRule,
    gram: &'g GrammarData,
}

impl<'g> PprRef<'g> {
    pub fn name(&self) -> &'g str {
        &self.rule.name
    }

    pub fn index(&self) -> u32 {
        self.rule.index
    }

    /// Token-domain nonterminal id of this PPR.
    pub fn id(&self) -> SymbolId {
        SymbolId::new(self.gram.lprs.len() as u32 + self.rule.index)
    }

    pub fn qualifier(&self) -> Qualifier {
        self.rule.qualifier
    }

    pub fn first_set(&self) -> &'g TokenSet {
        &self.rule.first
    }

    pub fn follow_set(&self) -> &'g TokenSet {
        &self.rule.follow
    }

    /// The set the token-domain parse table keys on.
    pub fn prefix_set(&self) -> &'g TokenSet {
        &self.rule.prefix
    }
}

impl PartialEq for PprRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.gram, other.gram) && self.rule.index == other.rule.index
    }
}

impl fmt::Debug for PprRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PprRef({})", self.rule.name)
    }
}

impl fmt::Display for PprRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rule.name)
    }
}
