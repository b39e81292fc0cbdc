//! Stream traits shared by every pipeline stage.
//!
//! Every stage exposes `peek`/`next`/`done`/`reset`; `reset` clears local
//! state and propagates upstream through the bound source. Binding a new
//! source invalidates the stage until the next `reset`.

use taul_core::{Glyph, Symbol, Token};

/// A pull stream of one symbol domain.
pub trait SymbolStream {
    type Sym: Symbol;

    /// The next symbol, without consuming it.
    fn peek(&mut self) -> Self::Sym;

    /// Consume and return the next symbol. At end-of-input this returns the
    /// end symbol without advancing, so it may be called repeatedly.
    fn next(&mut self) -> Self::Sym;

    /// Whether the end-of-input symbol has been reached.
    fn done(&mut self) -> bool;

    /// Clear local state and reset the bound upstream.
    fn reset(&mut self);
}

/// A stream of glyphs (decoded characters).
pub trait GlyphStream: SymbolStream<Sym = Glyph> {}

impl<T: SymbolStream<Sym = Glyph> + ?Sized> GlyphStream for T {}

/// A stream of tokens.
pub trait TokenStream: SymbolStream<Sym = Token> {}

impl<T: SymbolStream<Sym = Token> + ?Sized> TokenStream for T {}

/// Non-intrusive tap on a lexer's output; receives every token, including
/// the `skip`-qualified ones the public stream cuts.
pub trait TokenObserver {
    fn observe(&mut self, token: Token);
}
