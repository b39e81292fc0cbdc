//! The lexer pipeline.
//!
//! Composes the engine over glyphs with the book-keeping that turns
//! per-LPR matching into a cut, coalesced token stream: an input queue
//! with playback (so a failed LPR attempt rewinds), a matcher policy that
//! accumulates the matched span into one token, and a puller that merges
//! contiguous failures, inserts end-of-input, and cuts `skip` tokens.

use taul_core::{
    Glyph, Grammar, NonterminalIdAllocs, ParseTable, Qualifier, Symbol, SymbolId, SymbolSet, Token,
};

use crate::engine::{Engine, EnginePolicy};
use crate::stream::{GlyphStream, SymbolStream, TokenObserver};
use crate::string_reader::StringReader;

/// Glyphs recorded up-front per matcher attempt.
const RESERVED_INPUT: usize = 64;

/// Records consumed glyphs so a failed match attempt can rewind. After a
/// successful match the consumed prefix is discarded with [`forget`].
///
/// [`forget`]: InputQueue::forget
#[derive(Debug)]
struct InputQueue {
    recorded: Vec<Glyph>,
    current: usize,
    total_forgot: usize,
}

impl InputQueue {
    fn new() -> Self {
        Self {
            recorded: Vec::with_capacity(RESERVED_INPUT),
            current: 0,
            total_forgot: 0,
        }
    }

    /// Total glyphs consumed since the last reset; used to detect pulls
    /// that consumed no input.
    fn number(&self) -> usize {
        self.current + self.total_forgot
    }

    fn peek(&mut self, source: &mut dyn GlyphStream) -> Glyph {
        if self.current == self.recorded.len() {
            self.recorded.push(source.next());
        }
        self.recorded[self.current]
    }

    fn next(&mut self, source: &mut dyn GlyphStream) -> Glyph {
        let glyph = self.peek(source);
        // never advance past end-of-input; the puller depends on this
        if !glyph.is_end() {
            self.current += 1;
        }
        glyph
    }

    /// Rewind to the start of the recorded prefix.
    fn playback(&mut self) {
        self.current = 0;
    }

    /// Discard the consumed prefix; it can no longer be rewound to.
    fn forget(&mut self) {
        self.total_forgot += self.current;
        self.recorded.drain(..self.current);
        self.current = 0;
    }

    fn reset(&mut self) {
        self.recorded.clear();
        self.current = 0;
        self.total_forgot = 0;
    }
}

/// Engine policy that matches one LPR and accumulates the matched span
/// into a token.
struct MatcherPolicy<'a> {
    input: &'a mut InputQueue,
    source: &'a mut dyn GlyphStream,
    result: Token,
}

impl EnginePolicy for MatcherPolicy<'_> {
    type Sym = Glyph;

    fn parse_table(gram: &Grammar) -> &ParseTable<Glyph> {
        gram.lpr_parse_table()
    }

    fn nonterminal_allocs(gram: &Grammar) -> NonterminalIdAllocs {
        gram.lpr_id_allocs()
    }

    fn peek(&mut self) -> Glyph {
        self.input.peek(self.source)
    }

    fn next(&mut self) -> Glyph {
        self.input.next(self.source)
    }

    fn reinit_output(&mut self, start_rule: u32) {
        let pos = self.input.peek(self.source).pos;
        self.result = Token::normal(start_rule, pos, 0);
    }

    fn output_terminal(&mut self, terminal: Glyph) {
        let low = self.result.low_pos().min(terminal.low_pos());
        let high = self.result.high_pos().max(terminal.high_pos());
        self.result.pos = low;
        self.result.len = high - low;
    }

    fn output_nonterminal_begin(&mut self, _nonterminal: SymbolId) {}

    fn output_nonterminal_end(&mut self) {}

    fn output_terminal_error(&mut self, _expected: &SymbolSet<Glyph>, input: Glyph) {
        self.result = Token::failure(input.pos, 0);
    }

    fn output_nonterminal_error(&mut self, _nonterminal: SymbolId, input: Glyph) {
        self.result = Token::failure(input.pos, 0);
    }
}

/// The lexer: a token stream over a bound glyph stream.
///
/// After binding a source, [`reset`] must be called before the first read.
///
/// [`reset`]: SymbolStream::reset
pub struct Lexer<'src> {
    gram: Grammar,
    source: Option<&'src mut dyn GlyphStream>,
    observer: Option<&'src mut dyn TokenObserver>,
    /// Whether `skip`-qualified tokens are cut from the public stream.
    pub cut_skip_tokens: bool,
    valid: bool,
    input: InputQueue,
    engine: Engine,
    latest: Option<Token>,
    current: Option<Token>,
    pending: Option<Token>,
    last_pending_consumed_no_input: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(gram: Grammar) -> Self {
        Self {
            gram,
            source: None,
            observer: None,
            cut_skip_tokens: true,
            valid: false,
            input: InputQueue::new(),
            engine: Engine::new(),
            latest: None,
            current: None,
            pending: None,
            last_pending_consumed_no_input: false,
        }
    }

    /// Bind the upstream glyph producer. Invalidates the lexer until the
    /// next `reset`.
    pub fn bind_source(&mut self, source: &'src mut dyn GlyphStream) {
        self.source = Some(source);
        self.valid = false;
    }

    /// Bind a token tap. Observer changes require no reset.
    pub fn bind_observer(&mut self, observer: &'src mut dyn TokenObserver) {
        self.observer = Some(observer);
    }

    /// Match one LPR against the upcoming glyphs; rewinds on failure.
    fn match_lpr(&mut self, lpr_index: u32) -> Token {
        let source = self
            .source
            .as_deref_mut()
            .expect("lexer requires a bound source");
        let mut policy = MatcherPolicy {
            input: &mut self.input,
            source,
            result: Token::failure(0, 0),
        };
        self.engine.run(&self.gram, &mut policy, lpr_index);
        let result = policy.result;
        if result.is_failure() {
            self.input.playback();
        }
        result
    }

    /// Try each non-`support` LPR in declaration order; first success wins.
    fn match_with_all_lprs(&mut self) -> Token {
        // covers the edge case where every LPR is support-qualified
        let pos = {
            let source = self
                .source
                .as_deref_mut()
                .expect("lexer requires a bound source");
            self.input.peek(source).pos
        };
        let mut result = Token::failure(pos, 0);
        for index in 0..self.gram.lprs() {
            if self.gram.lpr_at(index).qualifier() == Qualifier::Support {
                continue;
            }
            result = self.match_lpr(index as u32);
            if !result.is_failure() {
                break;
            }
        }
        result
    }

    /// Produce the next raw token, before failure coalescing.
    fn resolve_pending(&mut self) -> Token {
        if self.last_pending_consumed_no_input {
            // the last pull consumed nothing; consume one glyph so the
            // stream cannot loop on zero-width matches
            let source = self
                .source
                .as_deref_mut()
                .expect("lexer requires a bound source");
            let input = self.input.next(source);
            return if input.is_end() {
                Token::end(input.pos)
            } else {
                Token::failure(input.pos, input.len)
            };
        }

        let mut result = self.match_with_all_lprs();
        if result.len == 0 {
            let at_end = {
                let source = self
                    .source
                    .as_deref_mut()
                    .expect("lexer requires a bound source");
                self.input.peek(source).is_end()
            };
            if at_end {
                // a zero-width result at end of text is the end token
                result = Token::end(result.pos);
            } else if result.is_normal() {
                // zero-length normal tokens never surface; route them into
                // the failure-coalescing path instead
                result = Token::failure(result.pos, 0);
            }
        }
        result
    }

    fn generate_pending(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let before = self.input.number();
        let pending = self.resolve_pending();
        let after = self.input.number();
        self.last_pending_consumed_no_input = before == after;
        self.input.forget();
        log::trace!("lexer pending token: {pending}");
        self.pending = Some(pending);
    }

    /// Move or merge the pending token into the current slot. Contiguous
    /// failures merge by extending the length.
    fn try_merge_pending_into_current(&mut self) -> bool {
        debug_assert!(self.pending.is_some());
        let Some(current) = self.current else {
            self.current = self.pending.take();
            return true;
        };
        let pending = self.pending.expect("checked above");
        if current.is_failure()
            && pending.is_failure()
            && current.high_pos() == pending.low_pos()
        {
            self.current = Some(Token::failure(current.pos, current.len + pending.len));
            self.pending = None;
            return true;
        }
        false
    }

    fn pull_no_cut(&mut self) -> Token {
        debug_assert!(self.current.is_none());
        loop {
            self.generate_pending();
            if !self.try_merge_pending_into_current() {
                break;
            }
        }
        self.current
            .take()
            .expect("the merge loop always produces a current token")
    }

    /// Produce the next public token, cutting `skip` tokens unless
    /// disabled. The observer sees every token regardless of cutting.
    fn pull(&mut self) -> Token {
        loop {
            let result = self.pull_no_cut();
            if let Some(observer) = self.observer.as_deref_mut() {
                observer.observe(result);
            }
            if !self.cut_skip_tokens || !result.is_normal() {
                return result;
            }
            let lpr = result.lpr_index().expect("normal tokens carry an LPR index");
            if self.gram.lpr_at(lpr as usize).qualifier() != Qualifier::Skip {
                return result;
            }
        }
    }

    fn resolve_latest(&mut self) -> Token {
        assert!(
            self.valid,
            "lexer requires a reset after binding a source"
        );
        if self.latest.is_none() {
            self.latest = Some(self.pull());
        }
        self.latest.expect("resolved above")
    }
}

impl SymbolStream for Lexer<'_> {
    type Sym = Token;

    fn peek(&mut self) -> Token {
        self.resolve_latest()
    }

    fn next(&mut self) -> Token {
        let result = self.resolve_latest();
        // force the next peek to pull again
        self.latest = None;
        result
    }

    fn done(&mut self) -> bool {
        self.peek().is_end()
    }

    fn reset(&mut self) {
        self.input.reset();
        self.latest = None;
        self.current = None;
        self.pending = None;
        self.last_pending_consumed_no_input = false;
        if let Some(source) = self.source.as_deref_mut() {
            source.reset();
        }
        self.valid = true;
    }
}

/// Tokenize a whole string, returning every public token up to and
/// including the end-of-input token.
pub fn tokenize(gram: &Grammar, text: &str) -> Vec<Token> {
    let mut reader = StringReader::new(text);
    let mut lexer = Lexer::new(gram.clone());
    lexer.bind_source(&mut reader);
    lexer.reset();
    let mut out = Vec::new();
    loop {
        let token = lexer.next();
        let at_end = token.is_end();
        out.push(token);
        if at_end {
            break;
        }
    }
    out
}
