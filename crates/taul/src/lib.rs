//! TAUL (Text Analysis Utility Language): a library for building lexers
//! and parsers from a declarative grammar specification.
//!
//! A grammar is loaded either from a compiled spec binary ([`load`]) or
//! from TAUL source text ([`load_source`]); input characters then flow
//! through a pipeline of streams producing glyphs, tokens, and finally a
//! parse tree:
//!
//! ```
//! let gram = taul::load_source(
//!     "lexer section:
//!      NUMBER : [0-9]+ ;
//!      skip WS : [ \\t\\r\\n]+ ;
//!
//!      parser section:
//!      Numbers : NUMBER* end ;",
//! )
//! .unwrap();
//!
//! let tree = taul::parse_str(&gram, "Numbers", "10 20 30");
//! assert!(!tree.is_aborted());
//! ```
//!
//! The crates behind this facade:
//! - `taul-core` - symbols, symbol sets, the grammar model, parse tables
//! - `taul-spec` - the spec-instruction binary format
//! - `taul-compiler` - the loader/compiler and the TAUL text frontend
//! - `taul-engine` - the LL(1) engine, lexer/parser pipelines, parse trees

pub use taul_core::{
    Glyph, Grammar, GrammarError, LexerRule, LprRef, ParserRule, PprRef, Qualifier, SourcePos,
    Symbol, SymbolId, SymbolSet, Token,
};

pub use taul_spec::{
    DecodeError, ErrorCounter, Spec, SpecErrorKind, SpecInstr, SpecOpcode, SpecVisitor, SpecWriter,
};

pub use taul_compiler::{
    compile, compile_file, load, load_source, load_with, Diagnostic, Diagnostics,
    DiagnosticsPrinter, Error, Result, Severity,
};

pub use taul_engine::{
    parse_str, tokenize, GlyphStream, Lexer, Listener, NodeRef, ParseTree, Parser, StringReader,
    SymbolStream, TokenObserver, TokenStream,
};
