//! Shared helpers for engine tests.

use taul_core::{Grammar, PprRef, SourcePos, Token};
use taul_spec::Spec;

use crate::listener::Listener;

/// One recorded listener callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TraceEvent {
    Startup,
    Syntactic { ppr: u32, pos: SourcePos },
    Lexical(Token),
    Close,
    Abort(SourcePos),
    Shutdown,
}

/// Listener that records every callback for comparison.
#[derive(Debug, Default)]
pub(crate) struct TraceListener {
    pub(crate) events: Vec<TraceEvent>,
}

impl Listener for TraceListener {
    fn on_startup(&mut self) {
        self.events.push(TraceEvent::Startup);
    }

    fn on_shutdown(&mut self) {
        self.events.push(TraceEvent::Shutdown);
    }

    fn on_syntactic(&mut self, ppr: PprRef<'_>, pos: SourcePos) {
        self.events.push(TraceEvent::Syntactic {
            ppr: ppr.index(),
            pos,
        });
    }

    fn on_lexical(&mut self, token: Token) {
        self.events.push(TraceEvent::Lexical(token));
    }

    fn on_close(&mut self) {
        self.events.push(TraceEvent::Close);
    }

    fn on_abort(&mut self, pos: SourcePos) {
        self.events.push(TraceEvent::Abort(pos));
    }
}

pub(crate) fn load(spec: &Spec) -> Grammar {
    taul_compiler::load(spec).expect("test grammar must load")
}

pub(crate) fn syntactic(ppr: u32, pos: SourcePos) -> TraceEvent {
    TraceEvent::Syntactic { ppr, pos }
}

pub(crate) fn lexical(lpr: u32, pos: SourcePos, len: u32) -> TraceEvent {
    TraceEvent::Lexical(Token::normal(lpr, pos, len))
}

pub(crate) fn lexical_failure(pos: SourcePos, len: u32) -> TraceEvent {
    TraceEvent::Lexical(Token::failure(pos, len))
}
