//! Parser output listener.

use taul_core::{PprRef, SourcePos, Token};

/// Receiver of parse events, live during a parse or replayed from a sealed
/// tree.
///
/// Callback order per parse: `on_startup`, then a well-bracketed sequence
/// of `on_syntactic`/`on_lexical`/`on_close`, with `on_abort` at most once
/// (after which only the outstanding `on_close` calls occur), then
/// `on_shutdown`.
pub trait Listener {
    fn on_startup(&mut self) {}
    fn on_shutdown(&mut self) {}

    /// A nonterminal subtree opened.
    fn on_syntactic(&mut self, ppr: PprRef<'_>, pos: SourcePos);

    /// A leaf token (normal or failure).
    fn on_lexical(&mut self, token: Token);

    /// The innermost open subtree closed.
    fn on_close(&mut self);

    /// The parse failed at `pos`; the tree is sealed in the aborted state.
    fn on_abort(&mut self, pos: SourcePos);
}
