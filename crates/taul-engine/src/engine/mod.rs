//! The LL(1) parse engine shared by the lexer and the parser.
//!
//! A symbol-generic, table-driven, stack-based predictive matcher. The
//! engine interprets a parse table over one symbol domain and reports
//! everything it does through an [`EnginePolicy`]; the two concrete
//! policies (lexer matcher, parser) are the only difference between
//! tokenizing and parsing.

use taul_core::{
    Grammar, NonterminalIdAllocs, ParseTable, Symbol, SymbolId, SymbolSet, TableSym,
};

/// Policy hook of one engine instantiation: where the table lives, where
/// input comes from, and where output events go.
pub trait EnginePolicy {
    type Sym: Symbol;

    fn parse_table(gram: &Grammar) -> &ParseTable<Self::Sym>;
    fn nonterminal_allocs(gram: &Grammar) -> NonterminalIdAllocs;

    fn peek(&mut self) -> Self::Sym;
    fn next(&mut self) -> Self::Sym;

    /// Prepare the downstream output object for a fresh parse of
    /// `start_rule` (a primary row index).
    fn reinit_output(&mut self, start_rule: u32);

    fn output_startup(&mut self) {}
    fn output_shutdown(&mut self) {}

    /// A terminal matched and was consumed.
    fn output_terminal(&mut self, terminal: Self::Sym);

    /// A primary nonterminal opened. Emitted before its table row is
    /// consulted, so an immediately-aborting rule still brackets its abort.
    fn output_nonterminal_begin(&mut self, nonterminal: SymbolId);

    /// The matching close of the last unclosed `output_nonterminal_begin`.
    fn output_nonterminal_end(&mut self);

    /// A terminal (or assertion) failed against `input`.
    fn output_terminal_error(&mut self, expected: &SymbolSet<Self::Sym>, input: Self::Sym);

    /// No alternative of `nonterminal` applies to `input`.
    fn output_nonterminal_error(&mut self, nonterminal: SymbolId, input: Self::Sym);
}

/// One entry of the engine's work stack.
#[derive(Clone, Copy, Debug)]
enum StackEntry {
    /// Consume one symbol in the interned set.
    Terminal { set: u32 },
    /// Peek one symbol; require membership (or non-membership).
    Assertion { set: u32, negated: bool },
    /// Expand a table row.
    Nonterminal { row: u32 },
    /// Frame marker pushed under a row's symbols; closes the row.
    EndMarker { row: u32 },
}

/// The stack machine. The work stack is a single pre-reserved buffer,
/// reused across parses without reallocation in the steady state.
#[derive(Debug, Default)]
pub struct Engine {
    stack: Vec<StackEntry>,
}

/// Stack capacity reserved up-front.
const RESERVED_STACK: usize = 64;

impl Engine {
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(RESERVED_STACK),
        }
    }

    /// Run one parse from `start_rule` (a primary row index) until the work
    /// stack empties, by success or abort.
    pub fn run<P: EnginePolicy>(&mut self, gram: &Grammar, policy: &mut P, start_rule: u32) {
        let table = P::parse_table(gram);
        let allocs = P::nonterminal_allocs(gram);

        policy.reinit_output(start_rule);
        policy.output_startup();
        self.stack.clear();
        self.stack.push(StackEntry::Nonterminal { row: start_rule });

        while let Some(&top) = self.stack.last() {
            match top {
                StackEntry::Terminal { set } => {
                    let expected = table.set(set);
                    let input = policy.next();
                    if expected.contains(input.id()) {
                        self.stack.pop();
                        policy.output_terminal(input);
                    } else {
                        policy.output_terminal_error(expected, input);
                        self.abort(policy, &allocs);
                    }
                }
                StackEntry::Assertion { set, negated } => {
                    let expected = table.set(set);
                    let input = policy.peek();
                    if expected.contains(input.id()) != negated {
                        self.stack.pop();
                    } else {
                        policy.output_terminal_error(expected, input);
                        self.abort(policy, &allocs);
                    }
                }
                StackEntry::Nonterminal { row } => {
                    let input = policy.peek();
                    if allocs.is_primary_row(row) {
                        policy.output_nonterminal_begin(allocs.id_of_row(row));
                    }
                    self.stack.pop();
                    self.stack.push(StackEntry::EndMarker { row });
                    match table.lookup(row, input.id()) {
                        Some(alt) => {
                            for sym in table.alternative(row, alt).iter().rev() {
                                self.stack.push(match *sym {
                                    TableSym::Terminal { set } => StackEntry::Terminal { set },
                                    TableSym::Assertion { set, negated } => {
                                        StackEntry::Assertion { set, negated }
                                    }
                                    TableSym::Nonterminal { row } => {
                                        StackEntry::Nonterminal { row }
                                    }
                                });
                            }
                        }
                        None => {
                            policy.output_nonterminal_error(allocs.id_of_row(row), input);
                            self.abort(policy, &allocs);
                        }
                    }
                }
                StackEntry::EndMarker { row } => {
                    self.stack.pop();
                    if allocs.is_primary_row(row) {
                        policy.output_nonterminal_end();
                    }
                }
            }
        }

        policy.output_shutdown();
    }

    /// Unwind the whole stack, closing every open primary frame.
    fn abort<P: EnginePolicy>(&mut self, policy: &mut P, allocs: &NonterminalIdAllocs) {
        log::trace!("engine abort; unwinding {} stack entries", self.stack.len());
        while let Some(entry) = self.stack.pop() {
            if let StackEntry::EndMarker { row } = entry {
                if allocs.is_primary_row(row) {
                    policy.output_nonterminal_end();
                }
            }
        }
    }
}
