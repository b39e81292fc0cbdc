//! Token definitions for TAUL grammar source.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum TaulToken<'src> {
    #[token("lexer")]
    KwLexer,

    #[token("parser")]
    KwParser,

    #[token("section")]
    KwSection,

    #[token("skip")]
    KwSkip,

    #[token("support")]
    KwSupport,

    #[token("end")]
    KwEnd,

    #[token("any")]
    KwAny,

    #[token("token")]
    KwToken,

    #[token("failure")]
    KwFailure,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token("|")]
    VBar,

    #[token("?")]
    Question,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("~")]
    Tilde,

    #[token("&")]
    Ampersand,

    #[token("-")]
    Minus,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[regex(r"[a-zA-Z_][0-9a-zA-Z_]*")]
    Identifier(&'src str),

    /// A `'...'` literal including its quotes.
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    String(&'src str),

    /// A `[...]` literal including its brackets.
    #[regex(r"\[(?:[^\]\\]|\\.)*\]")]
    Charset(&'src str),

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    #[token("\r")]
    Newline,

    #[regex(r"#[^\n\r]*", allow_greedy = true)]
    LineComment,

    /// `!# ... #!`; an unterminated block comment runs to end of input.
    #[regex(r"!#(?:[^#]|#[^!])*(?:#!)?")]
    BlockComment,
}

impl TaulToken<'_> {
    pub(crate) fn is_trivia(&self) -> bool {
        matches!(
            self,
            TaulToken::Whitespace
                | TaulToken::Newline
                | TaulToken::LineComment
                | TaulToken::BlockComment
        )
    }
}

/// Lexed token stream with trivia removed. Unlexable fragments surface as
/// `Err` items carrying their span, contiguous runs coalesced.
pub(crate) fn lex(source: &str) -> Vec<(Result<TaulToken<'_>, ()>, Range<usize>)> {
    let mut out: Vec<(Result<TaulToken<'_>, ()>, Range<usize>)> = Vec::new();
    for (result, span) in TaulToken::lexer(source).spanned() {
        match result {
            Ok(token) if token.is_trivia() => {}
            Ok(token) => out.push((Ok(token), span)),
            Err(()) => match out.last_mut() {
                Some((Err(()), last)) if last.end == span.start => last.end = span.end,
                _ => out.push((Err(()), span)),
            },
        }
    }
    out
}
