//! Recursive-descent parser emitting spec instructions.
//!
//! The parser builds one spec fragment per expression and stitches
//! fragments together with [`Spec::concat`], so composite instructions can
//! be written before their operands even though the text is parsed operands
//! first. `pos` instructions are emitted ahead of every rule and primary so
//! loader diagnostics point back into the source text.

use std::ops::Range;

use taul_core::Qualifier;
use taul_spec::{Spec, SpecErrorKind, SpecWriter};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::expr::RuleKind;

use super::lexer::{lex, TaulToken};

pub(crate) fn compile_source(source: &str, diags: &mut Diagnostics) -> Spec {
    let mut tokens = Vec::new();
    for (result, span) in lex(source) {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => diags.push(Diagnostic::error(
                SpecErrorKind::SyntaxError,
                span.clone(),
                format!("unrecognized text '{}'", &source[span]),
            )),
        }
    }
    let parser = Parser {
        tokens,
        idx: 0,
        eof: source.len(),
        diags,
        section: RuleKind::Lpr,
        decls: Vec::new(),
        defs: Vec::new(),
    };
    parser.run()
}

struct Parser<'s, 'd> {
    tokens: Vec<(TaulToken<'s>, Range<usize>)>,
    idx: usize,
    eof: usize,
    diags: &'d mut Diagnostics,
    section: RuleKind,
    decls: Vec<(RuleKind, String)>,
    defs: Vec<Spec>,
}

impl<'s> Parser<'s, '_> {
    fn peek(&self) -> Option<TaulToken<'s>> {
        self.tokens.get(self.idx).map(|(t, _)| *t)
    }

    fn span(&self) -> Range<usize> {
        self.tokens
            .get(self.idx)
            .map(|(_, s)| s.clone())
            .unwrap_or(self.eof..self.eof)
    }

    fn bump(&mut self) -> Option<TaulToken<'s>> {
        let token = self.peek()?;
        self.idx += 1;
        Some(token)
    }

    fn eat(&mut self, expected: TaulToken<'s>) -> bool {
        if self.peek() == Some(expected) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let span = self.span();
        self.diags
            .push(Diagnostic::error(SpecErrorKind::SyntaxError, span, message));
    }

    /// Skip to just past the next `;`, or to the next section header.
    fn sync(&mut self) {
        while let Some(token) = self.peek() {
            match token {
                TaulToken::Semicolon => {
                    self.idx += 1;
                    return;
                }
                TaulToken::KwLexer | TaulToken::KwParser => return,
                _ => self.idx += 1,
            }
        }
    }

    fn run(mut self) -> Spec {
        while let Some(token) = self.peek() {
            match token {
                TaulToken::KwLexer | TaulToken::KwParser => self.parse_section(),
                TaulToken::KwSkip | TaulToken::KwSupport | TaulToken::Identifier(_) => {
                    self.parse_rule()
                }
                _ => {
                    self.error("expected a rule or section header");
                    self.bump();
                    self.sync();
                }
            }
        }

        let mut writer = SpecWriter::new();
        for (kind, name) in &self.decls {
            writer = match kind {
                RuleKind::Lpr => writer.lpr_decl(name),
                RuleKind::Ppr => writer.ppr_decl(name),
            };
        }
        let mut spec = writer.done();
        for def in &self.defs {
            spec = Spec::concat(&spec, def);
        }
        spec
    }

    fn parse_section(&mut self) {
        let header = self.bump().expect("caller peeked a section keyword");
        self.section = if header == TaulToken::KwLexer {
            RuleKind::Lpr
        } else {
            RuleKind::Ppr
        };
        if !self.eat(TaulToken::KwSection) {
            self.error("expected 'section' after section keyword");
        }
        if !self.eat(TaulToken::Colon) {
            self.error("expected ':' after section header");
        }
    }

    fn parse_rule(&mut self) {
        let start = self.span().start;

        let mut qualifiers = Vec::new();
        loop {
            match self.peek() {
                Some(TaulToken::KwSkip) => {
                    qualifiers.push(Qualifier::Skip);
                    self.idx += 1;
                }
                Some(TaulToken::KwSupport) => {
                    qualifiers.push(Qualifier::Support);
                    self.idx += 1;
                }
                _ => break,
            }
        }
        if qualifiers.len() > 1 {
            self.diags.push(Diagnostic::error(
                SpecErrorKind::IllegalMultipleQualifiers,
                start..self.span().start,
                "a rule may carry at most one qualifier",
            ));
        }

        let name = match self.peek() {
            Some(TaulToken::Identifier(name)) => {
                self.idx += 1;
                name.to_owned()
            }
            _ => {
                self.error("expected a rule name");
                self.sync();
                return;
            }
        };
        if !self.eat(TaulToken::Colon) {
            self.error("expected ':' after rule name");
            self.sync();
            return;
        }

        let branches = self.parse_alternation();
        if !self.eat(TaulToken::Semicolon) {
            self.error("expected ';' after rule body");
            self.sync();
        }

        // a misplaced qualifier on a PPR is left for the loader to reject
        let qualifier = qualifiers.first().copied().unwrap_or(Qualifier::None);
        let kind = self.section;
        self.decls.push((kind, name.clone()));

        let mut writer = SpecWriter::new().pos(start as u32);
        writer = match kind {
            RuleKind::Lpr => writer.lpr(&name, qualifier),
            RuleKind::Ppr => writer.ppr(&name, qualifier),
        };
        for (i, branch) in branches.iter().enumerate() {
            if i > 0 {
                writer = writer.alternative();
            }
            writer = writer.write_spec(branch);
        }
        self.defs.push(writer.close().done());
    }

    fn parse_alternation(&mut self) -> Vec<Spec> {
        let mut branches = vec![self.parse_sequence()];
        while self.eat(TaulToken::VBar) {
            branches.push(self.parse_sequence());
        }
        branches
    }

    /// Zero or more units; zero units is an empty (epsilon) alternative.
    fn parse_sequence(&mut self) -> Spec {
        let mut spec = Spec::default();
        while self.starts_unary() {
            let unit = self.parse_unary();
            spec = Spec::concat(&spec, &unit);
        }
        spec
    }

    fn starts_unary(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                TaulToken::KwEnd
                    | TaulToken::KwAny
                    | TaulToken::KwToken
                    | TaulToken::KwFailure
                    | TaulToken::Identifier(_)
                    | TaulToken::String(_)
                    | TaulToken::Charset(_)
                    | TaulToken::ParenOpen
                    | TaulToken::Ampersand
                    | TaulToken::Minus
                    | TaulToken::Tilde
            )
        )
    }

    fn parse_unary(&mut self) -> Spec {
        let start = self.span().start as u32;
        let prefix = match self.peek() {
            Some(TaulToken::Ampersand) => Some(SpecWriter::new().pos(start).lookahead()),
            Some(TaulToken::Minus) => Some(SpecWriter::new().pos(start).lookahead_not()),
            Some(TaulToken::Tilde) => Some(SpecWriter::new().pos(start).not()),
            _ => None,
        };
        match prefix {
            Some(writer) => {
                self.idx += 1;
                let inner = self.parse_unary();
                writer.write_spec(&inner).close().done()
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Spec {
        let mut spec = self.parse_primary();
        loop {
            let start = self.span().start as u32;
            let wrapper = match self.peek() {
                Some(TaulToken::Question) => SpecWriter::new().pos(start).optional(),
                Some(TaulToken::Star) => SpecWriter::new().pos(start).kleene_star(),
                Some(TaulToken::Plus) => SpecWriter::new().pos(start).kleene_plus(),
                _ => break,
            };
            self.idx += 1;
            spec = wrapper.write_spec(&spec).close().done();
        }
        spec
    }

    fn parse_primary(&mut self) -> Spec {
        let span = self.span();
        let start = span.start as u32;
        match self.peek() {
            Some(TaulToken::KwEnd) => {
                self.idx += 1;
                SpecWriter::new().pos(start).end().done()
            }
            Some(TaulToken::KwAny) => {
                self.idx += 1;
                SpecWriter::new().pos(start).any().done()
            }
            Some(TaulToken::KwToken) => {
                self.idx += 1;
                SpecWriter::new().pos(start).token().done()
            }
            Some(TaulToken::KwFailure) => {
                self.idx += 1;
                SpecWriter::new().pos(start).failure().done()
            }
            Some(TaulToken::String(text)) => {
                self.idx += 1;
                // strip the quotes; escapes stay raw for the loader
                SpecWriter::new()
                    .pos(start)
                    .string(&text[1..text.len() - 1])
                    .done()
            }
            Some(TaulToken::Charset(text)) => {
                self.idx += 1;
                SpecWriter::new()
                    .pos(start)
                    .charset(&text[1..text.len() - 1])
                    .done()
            }
            Some(TaulToken::Identifier(name)) => {
                self.idx += 1;
                SpecWriter::new().pos(start).name(name).done()
            }
            Some(TaulToken::ParenOpen) => {
                self.idx += 1;
                let branches = self.parse_alternation();
                if !self.eat(TaulToken::ParenClose) {
                    self.error("expected ')' to close group");
                }
                let mut writer = SpecWriter::new().pos(start).sequence();
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        writer = writer.alternative();
                    }
                    writer = writer.write_spec(branch);
                }
                writer.close().done()
            }
            _ => {
                self.error("expected an expression");
                Spec::default()
            }
        }
    }
}
