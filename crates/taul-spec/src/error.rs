//! Load-time error kinds and the error counter.
//!
//! Loading never stops at the first problem: the loader raises, counts, and
//! keeps walking, then returns no grammar when the count is nonzero.

use std::collections::HashMap;
use std::fmt;

/// Kind of a load-time diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecErrorKind {
    /// Something went wrong inside the loader itself.
    InternalError,
    /// A source file handed to the frontend could not be read.
    SourceCodeNotFound,
    /// The frontend could not parse TAUL source text.
    SyntaxError,
    /// A rule definition carries more than one qualifier.
    IllegalMultipleQualifiers,
    /// The spec ends with composite expression scopes still open.
    ScopeNotClosed,
    /// A `close` instruction with no scope to close.
    StrayClose,
    /// An LPR and a PPR share a name.
    RuleNameConflict,
    /// A declared rule was never defined.
    RuleNeverDefined,
    /// A rule definition names a rule that was never declared.
    RuleNeverDeclared,
    /// A rule was defined twice.
    RuleAlreadyDefined,
    /// A `name` reference to a rule that does not exist.
    RuleNotFound,
    /// A `name` reference inside an LPR resolves to a PPR.
    RuleMayNotBePpr,
    /// An `lpr`/`ppr` definition instruction inside an expression scope.
    IllegalRuleDeclare,
    /// Instruction not allowed inside LPR scope.
    IllegalInLprScope,
    /// Instruction not allowed inside PPR scope.
    IllegalInPprScope,
    /// Instruction requires an LPR or PPR scope.
    IllegalInNoScope,
    /// A PPR carries a `skip` or `support` qualifier.
    IllegalQualifier,
    /// A construct inside a single-terminal scope produces a nonterminal or
    /// more than one terminal.
    IllegalInSingleTerminalScope,
    /// An `alternative` divider with no scope that supports alternation.
    IllegalInNoAlternationScope,
    /// A second subexpression inside a single-subexpression scope.
    IllegalInSingleSubexprScope,
    /// An `end` subexpression where end-of-input may not be matched.
    IllegalInNoEndSubexprScope,
    /// Two alternatives of one nonterminal have overlapping prefix sets.
    IllegalAmbiguity,
}

impl fmt::Display for SpecErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpecErrorKind::InternalError => "internal-error",
            SpecErrorKind::SourceCodeNotFound => "source-code-not-found",
            SpecErrorKind::SyntaxError => "syntax-error",
            SpecErrorKind::IllegalMultipleQualifiers => "illegal-multiple-qualifiers",
            SpecErrorKind::ScopeNotClosed => "scope-not-closed",
            SpecErrorKind::StrayClose => "stray-close",
            SpecErrorKind::RuleNameConflict => "rule-name-conflict",
            SpecErrorKind::RuleNeverDefined => "rule-never-defined",
            SpecErrorKind::RuleNeverDeclared => "rule-never-declared",
            SpecErrorKind::RuleAlreadyDefined => "rule-already-defined",
            SpecErrorKind::RuleNotFound => "rule-not-found",
            SpecErrorKind::RuleMayNotBePpr => "rule-may-not-be-ppr",
            SpecErrorKind::IllegalRuleDeclare => "illegal-rule-declare",
            SpecErrorKind::IllegalInLprScope => "illegal-in-lpr-scope",
            SpecErrorKind::IllegalInPprScope => "illegal-in-ppr-scope",
            SpecErrorKind::IllegalInNoScope => "illegal-in-no-scope",
            SpecErrorKind::IllegalQualifier => "illegal-qualifier",
            SpecErrorKind::IllegalInSingleTerminalScope => "illegal-in-single-terminal-scope",
            SpecErrorKind::IllegalInNoAlternationScope => "illegal-in-no-alternation-scope",
            SpecErrorKind::IllegalInSingleSubexprScope => "illegal-in-single-subexpr-scope",
            SpecErrorKind::IllegalInNoEndSubexprScope => "illegal-in-no-end-subexpr-scope",
            SpecErrorKind::IllegalAmbiguity => "illegal-ambiguity",
        };
        f.write_str(name)
    }
}

/// Per-kind tally of load-time errors.
#[derive(Clone, Debug, Default)]
pub struct ErrorCounter {
    counts: HashMap<SpecErrorKind, usize>,
    total: usize,
}

impl ErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, kind: SpecErrorKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.total += 1;
    }

    /// Number of errors of one kind.
    pub fn count(&self, kind: SpecErrorKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Number of errors overall.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
