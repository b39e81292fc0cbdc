//! The parser pipeline.
//!
//! Composes the engine over a bound token stream and routes output events
//! into a parse-tree builder, a listener, or both. Multiple `parse` calls
//! against the same bound source are supported; each call advances the
//! stream by one start-rule match.

use taul_core::{
    Grammar, NonterminalIdAllocs, ParseTable, SymbolId, SymbolSet, Token,
};

use crate::engine::{Engine, EnginePolicy};
use crate::lexer::Lexer;
use crate::listener::Listener;
use crate::stream::TokenStream;
use crate::string_reader::StringReader;
use crate::tree::ParseTree;

struct ParserPolicy<'g, 'src, 'b> {
    gram: &'g Grammar,
    source: Option<&'src mut dyn TokenStream>,
    listener: Option<&'src mut dyn Listener>,
    result: Option<&'b mut ParseTree>,
}

impl ParserPolicy<'_, '_, '_> {
    fn peek_source(&mut self) -> Token {
        match self.source.as_deref_mut() {
            Some(source) => source.peek(),
            None => Token::end(0),
        }
    }
}

impl EnginePolicy for ParserPolicy<'_, '_, '_> {
    type Sym = Token;

    fn parse_table(gram: &Grammar) -> &ParseTable<Token> {
        gram.ppr_parse_table()
    }

    fn nonterminal_allocs(gram: &Grammar) -> NonterminalIdAllocs {
        gram.ppr_id_allocs()
    }

    fn peek(&mut self) -> Token {
        self.peek_source()
    }

    fn next(&mut self) -> Token {
        match self.source.as_deref_mut() {
            Some(source) => source.next(),
            None => Token::end(0),
        }
    }

    fn reinit_output(&mut self, _start_rule: u32) {}

    fn output_startup(&mut self) {
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.on_startup();
        }
    }

    fn output_shutdown(&mut self) {
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.on_shutdown();
        }
    }

    fn output_terminal(&mut self, terminal: Token) {
        if let Some(tree) = self.result.as_deref_mut() {
            tree.lexical(terminal);
        }
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.on_lexical(terminal);
        }
    }

    fn output_nonterminal_begin(&mut self, nonterminal: SymbolId) {
        let index = nonterminal.as_u32() - self.gram.ppr_id_allocs().base;
        let pos = self.peek_source().pos;
        let ppr = self.gram.ppr_at(index as usize);
        if let Some(tree) = self.result.as_deref_mut() {
            tree.syntactic(ppr, pos);
        }
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.on_syntactic(ppr, pos);
        }
    }

    fn output_nonterminal_end(&mut self) {
        if let Some(tree) = self.result.as_deref_mut() {
            tree.close();
        }
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.on_close();
        }
    }

    fn output_terminal_error(&mut self, _expected: &SymbolSet<Token>, input: Token) {
        self.abort_output(input.pos);
    }

    fn output_nonterminal_error(&mut self, _nonterminal: SymbolId, input: Token) {
        self.abort_output(input.pos);
    }
}

impl ParserPolicy<'_, '_, '_> {
    fn abort_output(&mut self, pos: u32) {
        if let Some(tree) = self.result.as_deref_mut() {
            tree.abort(pos);
        }
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.on_abort(pos);
        }
    }
}

/// The parser: engine-over-tokens with tree and listener output.
///
/// After binding a source, [`reset`](Parser::reset) must be called before
/// the first parse.
pub struct Parser<'src> {
    gram: Grammar,
    source: Option<&'src mut dyn TokenStream>,
    listener: Option<&'src mut dyn Listener>,
    engine: Engine,
    valid: bool,
}

impl<'src> Parser<'src> {
    pub fn new(gram: Grammar) -> Self {
        Self {
            gram,
            source: None,
            listener: None,
            engine: Engine::new(),
            valid: false,
        }
    }

    /// Bind the upstream token producer. Invalidates the parser until the
    /// next `reset`.
    pub fn bind_source(&mut self, source: &'src mut dyn TokenStream) {
        self.source = Some(source);
        self.valid = false;
    }

    /// Bind a listener. Listener changes require no reset.
    pub fn bind_listener(&mut self, listener: &'src mut dyn Listener) {
        self.listener = Some(listener);
    }

    /// Parse one `start_rule` match into a sealed tree, emitting to the
    /// bound listener as well.
    ///
    /// # Panics
    /// Panics if the grammar has no PPR named `start_rule`, or if the
    /// parser was not reset after binding a source.
    pub fn parse(&mut self, start_rule: &str) -> ParseTree {
        let mut tree = ParseTree::new(self.gram.clone());
        self.perform_parse(start_rule, Some(&mut tree));
        tree
    }

    /// Parse without building a tree; only the listener matters.
    pub fn parse_notree(&mut self, start_rule: &str) {
        self.perform_parse(start_rule, None);
    }

    fn perform_parse(&mut self, start_rule: &str, result: Option<&mut ParseTree>) {
        assert!(
            self.valid,
            "parser requires a reset after binding a source"
        );
        let row = self
            .gram
            .ppr(start_rule)
            .unwrap_or_else(|| panic!("grammar has no PPR named '{start_rule}'"))
            .index();
        let source = self.source.take();
        let listener = self.listener.take();
        let mut policy = ParserPolicy {
            gram: &self.gram,
            source,
            listener,
            result,
        };
        self.engine.run(&self.gram, &mut policy, row);
        self.source = policy.source.take();
        self.listener = policy.listener.take();
    }

    /// Discard in-progress state and reset the bound upstream.
    pub fn reset(&mut self) {
        if let Some(source) = self.source.as_deref_mut() {
            source.reset();
        }
        self.valid = true;
    }
}

/// Build the whole `reader → lexer → parser` chain over a string and parse
/// one `start_rule` match.
pub fn parse_str(gram: &Grammar, start_rule: &str, text: &str) -> ParseTree {
    let mut reader = StringReader::new(text);
    let mut lexer = Lexer::new(gram.clone());
    lexer.bind_source(&mut reader);
    let mut parser = Parser::new(gram.clone());
    parser.bind_source(&mut lexer);
    parser.reset();
    parser.parse(start_rule)
}
