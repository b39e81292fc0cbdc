//! Core data model for TAUL grammars.
//!
//! This crate contains:
//! - Symbol identifiers and the two concrete symbol types (`Glyph`, `Token`)
//! - Symbol sets (ordered, disjoint id ranges)
//! - The grammar model (`Grammar`, rule metadata, rule refs) and its
//!   binary/JSON serialization
//! - LL(1) parse tables shared by the lexer and parser engines

pub mod grammar;
pub mod parse_table;
pub mod qualifier;
pub mod source;
pub mod symbol;
pub mod symbol_id;
pub mod symbol_set;


pub use grammar::{Grammar, GrammarError, LexerRule, LprRef, ParserRule, PprRef};
pub use parse_table::{Alternative, ParseTable, TableRow, TableSym};
pub use qualifier::Qualifier;
pub use source::SourcePos;
pub use symbol::{Glyph, Symbol, Token};
pub use symbol_id::{NonterminalIdAllocs, SymbolId, GLYPH_TERMINALS};
pub use symbol_set::{GlyphSet, IdRange, SymbolSet, TokenSet};
