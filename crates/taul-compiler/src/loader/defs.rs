//! Pass 2: rule definitions and expression-tree construction.
//!
//! The pass maintains a stack of open expression scopes. The innermost
//! rule frame decides whether references resolve against the LPR or PPR
//! namespace, and a single-terminal-scope counter tracks whether the walk
//! is inside a `lookahead`/`lookahead-not`/`not` construct, which must
//! resolve to exactly one terminal.

use taul_core::{Qualifier, SourcePos};
use taul_spec::{SpecErrorKind, SpecInstr, SpecOpcode};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::expr::{AltList, Expr, RuleExpr, RuleKind};
use crate::literals;

use super::{point, Decls};

/// Definition-pass output: qualifiers and expression trees by rule index.
#[derive(Debug, Default)]
pub(crate) struct RuleDefs {
    pub(crate) lpr_qualifiers: Vec<Qualifier>,
    pub(crate) lpr_exprs: Vec<Option<RuleExpr>>,
    pub(crate) ppr_exprs: Vec<Option<RuleExpr>>,
}

struct Frame {
    opcode: SpecOpcode,
    /// `Some` for rule scopes: kind, name, and the rule index when the
    /// definition is registrable.
    rule: Option<(RuleKind, String, Option<usize>)>,
    alts: AltList,
    current: Vec<Expr>,
    /// Whether this frame entered single-terminal scope.
    sts: bool,
}

struct DefinitionPass<'d> {
    decls: &'d Decls,
    diags: &'d mut Diagnostics,
    pos: SourcePos,
    frames: Vec<Frame>,
    sts_depth: usize,
    out: RuleDefs,
}

pub(crate) fn definition_pass(
    instrs: &[(SpecInstr<'_>, usize)],
    decls: &Decls,
    diags: &mut Diagnostics,
) -> RuleDefs {
    let mut pass = DefinitionPass {
        decls,
        diags,
        pos: 0,
        frames: Vec::new(),
        sts_depth: 0,
        out: RuleDefs {
            lpr_qualifiers: vec![Qualifier::None; decls.lprs.len()],
            lpr_exprs: vec![None; decls.lprs.len()],
            ppr_exprs: vec![None; decls.pprs.len()],
        },
    };
    for (instr, _) in instrs {
        pass.dispatch(instr);
    }
    pass.finish();
    pass.out
}

impl DefinitionPass<'_> {
    fn raise(&mut self, kind: SpecErrorKind, message: String) {
        self.diags
            .push(Diagnostic::error(kind, point(self.pos), message));
    }

    /// Kind of the innermost enclosing rule scope.
    fn context_kind(&self) -> Option<RuleKind> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.rule.as_ref().map(|(kind, ..)| *kind))
    }

    fn dispatch(&mut self, instr: &SpecInstr<'_>) {
        match instr {
            SpecInstr::Pos(p) => self.pos = *p,
            SpecInstr::Close => self.on_close(),
            SpecInstr::Alternative => self.on_alternative(),
            SpecInstr::LprDecl(name) | SpecInstr::PprDecl(name) => self.on_decl(name),
            SpecInstr::Lpr(name, q) => self.on_rule(RuleKind::Lpr, name, *q),
            SpecInstr::Ppr(name, q) => self.on_rule(RuleKind::Ppr, name, *q),
            SpecInstr::End => self.on_end(),
            SpecInstr::Any => self.leaf(Expr::Any),
            SpecInstr::String(s) => self.on_string(s),
            SpecInstr::Charset(s) => self.on_charset(s),
            SpecInstr::Token => self.on_token_or_failure(Expr::Token),
            SpecInstr::Failure => self.on_token_or_failure(Expr::Failure),
            SpecInstr::Name(name) => self.on_name(name),
            SpecInstr::Sequence => self.composite(SpecOpcode::Sequence, false),
            SpecInstr::Lookahead => self.composite(SpecOpcode::Lookahead, true),
            SpecInstr::LookaheadNot => self.composite(SpecOpcode::LookaheadNot, true),
            SpecInstr::Not => self.composite(SpecOpcode::Not, true),
            SpecInstr::Optional => self.composite(SpecOpcode::Optional, false),
            SpecInstr::KleeneStar => self.composite(SpecOpcode::KleeneStar, false),
            SpecInstr::KleenePlus => self.composite(SpecOpcode::KleenePlus, false),
        }
    }

    fn on_decl(&mut self, name: &str) {
        // declarations are pass-1 work; inside a rule scope they are
        // misplaced instructions
        match self.context_kind() {
            Some(RuleKind::Lpr) => self.raise(
                SpecErrorKind::IllegalInLprScope,
                format!("declaration of '{name}' inside an LPR scope"),
            ),
            Some(RuleKind::Ppr) => self.raise(
                SpecErrorKind::IllegalInPprScope,
                format!("declaration of '{name}' inside a PPR scope"),
            ),
            None => {}
        }
    }

    fn on_rule(&mut self, kind: RuleKind, name: &str, qualifier: Qualifier) {
        if !self.frames.is_empty() {
            self.raise(
                SpecErrorKind::IllegalRuleDeclare,
                format!("definition of '{name}' inside an expression scope"),
            );
        }

        let declared = match kind {
            RuleKind::Lpr => self.decls.lpr_index(name),
            RuleKind::Ppr => self.decls.ppr_index(name),
        };
        let mut index = declared;
        if declared.is_none() {
            self.raise(
                SpecErrorKind::RuleNeverDeclared,
                format!("definition of undeclared rule '{name}'"),
            );
        }

        if let Some(idx) = declared {
            let already = match kind {
                RuleKind::Lpr => self.out.lpr_exprs[idx].is_some(),
                RuleKind::Ppr => self.out.ppr_exprs[idx].is_some(),
            };
            if already {
                self.raise(
                    SpecErrorKind::RuleAlreadyDefined,
                    format!("rule '{name}' is already defined"),
                );
                index = None;
            }
        }

        match kind {
            RuleKind::Lpr => {
                if let Some(idx) = index {
                    self.out.lpr_qualifiers[idx] = qualifier;
                }
            }
            RuleKind::Ppr => {
                if qualifier != Qualifier::None {
                    self.raise(
                        SpecErrorKind::IllegalQualifier,
                        format!("PPR '{name}' may not carry the '{qualifier}' qualifier"),
                    );
                }
            }
        }

        self.frames.push(Frame {
            opcode: match kind {
                RuleKind::Lpr => SpecOpcode::Lpr,
                RuleKind::Ppr => SpecOpcode::Ppr,
            },
            rule: Some((kind, name.to_owned(), index)),
            alts: Vec::new(),
            current: Vec::new(),
            sts: false,
        });
    }

    fn on_close(&mut self) {
        let Some(mut frame) = self.frames.pop() else {
            self.raise(
                SpecErrorKind::StrayClose,
                "close with no open scope".to_owned(),
            );
            return;
        };
        if frame.sts {
            self.sts_depth -= 1;
        }
        frame.alts.push(std::mem::take(&mut frame.current));

        if let Some((kind, _, index)) = frame.rule {
            let expr = RuleExpr { alts: frame.alts };
            match (kind, index) {
                (RuleKind::Lpr, Some(idx)) => self.out.lpr_exprs[idx] = Some(expr),
                (RuleKind::Ppr, Some(idx)) => self.out.ppr_exprs[idx] = Some(expr),
                _ => {}
            }
            return;
        }

        let composite = match frame.opcode {
            SpecOpcode::Sequence => Expr::Sequence(frame.alts),
            SpecOpcode::Lookahead => Expr::Lookahead(frame.alts),
            SpecOpcode::LookaheadNot => Expr::LookaheadNot(frame.alts),
            SpecOpcode::Not => Expr::Not(frame.alts),
            SpecOpcode::Optional => Expr::Optional(frame.alts),
            SpecOpcode::KleeneStar => Expr::KleeneStar(frame.alts),
            SpecOpcode::KleenePlus => Expr::KleenePlus(frame.alts),
            // composite frames are only ever pushed for the opcodes above
            _ => return,
        };
        // composites are only pushed with a parent frame in place
        if let Some(parent) = self.frames.last_mut() {
            parent.current.push(composite);
        }
    }

    fn on_alternative(&mut self) {
        match self.frames.last_mut() {
            Some(frame) => frame.alts.push(std::mem::take(&mut frame.current)),
            None => self.raise(
                SpecErrorKind::IllegalInNoAlternationScope,
                "alternative divider with no scope that supports alternation".to_owned(),
            ),
        }
    }

    fn on_end(&mut self) {
        if !self.frames.is_empty() && self.sts_depth > 0 {
            self.raise(
                SpecErrorKind::IllegalInNoEndSubexprScope,
                "end-of-input may not be matched here".to_owned(),
            );
        }
        self.leaf(Expr::End);
    }

    fn on_string(&mut self, s: &str) {
        if !self.frames.is_empty()
            && self.sts_depth > 0
            && self.context_kind() == Some(RuleKind::Lpr)
            && literals::parse_string(s).chars().count() != 1
        {
            self.raise(
                SpecErrorKind::IllegalInSingleTerminalScope,
                format!("string '{s}' must match exactly one character here"),
            );
        }
        self.leaf(Expr::String(s.to_owned()));
    }

    fn on_charset(&mut self, s: &str) {
        if self.context_kind() == Some(RuleKind::Ppr) {
            self.raise(
                SpecErrorKind::IllegalInPprScope,
                "charsets match glyphs, not tokens".to_owned(),
            );
        }
        self.leaf(Expr::Charset(s.to_owned()));
    }

    fn on_token_or_failure(&mut self, expr: Expr) {
        if self.context_kind() == Some(RuleKind::Lpr) {
            self.raise(
                SpecErrorKind::IllegalInLprScope,
                "token matchers are only valid in PPR scope".to_owned(),
            );
        }
        self.leaf(expr);
    }

    fn on_name(&mut self, name: &str) {
        match self.context_kind() {
            Some(RuleKind::Lpr) => {
                if self.decls.lprs.contains(name) {
                    if self.sts_depth > 0 {
                        self.raise(
                            SpecErrorKind::IllegalInSingleTerminalScope,
                            format!("reference to LPR '{name}' is not a single terminal"),
                        );
                    }
                } else if self.decls.pprs.contains(name) {
                    self.raise(
                        SpecErrorKind::RuleMayNotBePpr,
                        format!("LPRs may not reference PPR '{name}'"),
                    );
                } else {
                    self.raise(
                        SpecErrorKind::RuleNotFound,
                        format!("no rule named '{name}'"),
                    );
                }
            }
            Some(RuleKind::Ppr) => {
                if self.decls.lprs.contains(name) {
                    // an LPR reference is a single token terminal; fine in
                    // single-terminal scope
                } else if self.decls.pprs.contains(name) {
                    if self.sts_depth > 0 {
                        self.raise(
                            SpecErrorKind::IllegalInSingleTerminalScope,
                            format!("reference to PPR '{name}' is not a single terminal"),
                        );
                    }
                } else {
                    self.raise(
                        SpecErrorKind::RuleNotFound,
                        format!("no rule named '{name}'"),
                    );
                }
            }
            None => {}
        }
        self.leaf(Expr::Name(name.to_owned()));
    }

    /// Whether the innermost frame allows another subexpression in its
    /// current alternative; `None` when no scope is open at all.
    fn subexpr_room(&self) -> Option<bool> {
        let top = self.frames.last()?;
        Some(!is_single_subexpr_scope(top.opcode) || top.current.is_empty())
    }

    fn leaf(&mut self, expr: Expr) {
        match self.subexpr_room() {
            None => {
                self.raise(
                    SpecErrorKind::IllegalInNoScope,
                    "expression instruction outside any rule scope".to_owned(),
                );
                return;
            }
            Some(false) => self.raise(
                SpecErrorKind::IllegalInSingleSubexprScope,
                "this scope takes exactly one subexpression per alternative".to_owned(),
            ),
            Some(true) => {}
        }
        self.frames
            .last_mut()
            .expect("scope checked above")
            .current
            .push(expr);
    }

    fn composite(&mut self, opcode: SpecOpcode, sts: bool) {
        match self.subexpr_room() {
            None => {
                self.raise(
                    SpecErrorKind::IllegalInNoScope,
                    format!("'{opcode}' outside any rule scope"),
                );
                return;
            }
            Some(room) => {
                if self.sts_depth > 0 {
                    self.raise(
                        SpecErrorKind::IllegalInSingleTerminalScope,
                        format!("'{opcode}' cannot resolve to a single terminal"),
                    );
                } else if !room {
                    self.raise(
                        SpecErrorKind::IllegalInSingleSubexprScope,
                        "this scope takes exactly one subexpression per alternative".to_owned(),
                    );
                }
            }
        }
        if sts {
            self.sts_depth += 1;
        }
        self.frames.push(Frame {
            opcode,
            rule: None,
            alts: Vec::new(),
            current: Vec::new(),
            sts,
        });
    }

    fn finish(&mut self) {
        while let Some(frame) = self.frames.pop() {
            if frame.sts {
                self.sts_depth -= 1;
            }
            let what = match &frame.rule {
                Some((_, name, _)) => format!("rule '{name}'"),
                None => format!("'{}' expression", frame.opcode),
            };
            self.raise(
                SpecErrorKind::ScopeNotClosed,
                format!("{what} is still open at end of spec"),
            );
        }

        for (idx, name) in self.decls.lprs.iter().enumerate() {
            if self.out.lpr_exprs[idx].is_none() {
                self.raise(
                    SpecErrorKind::RuleNeverDefined,
                    format!("LPR '{name}' was declared but never defined"),
                );
            }
        }
        for (idx, name) in self.decls.pprs.iter().enumerate() {
            if self.out.ppr_exprs[idx].is_none() {
                self.raise(
                    SpecErrorKind::RuleNeverDefined,
                    format!("PPR '{name}' was declared but never defined"),
                );
            }
        }
    }
}

fn is_single_subexpr_scope(opcode: SpecOpcode) -> bool {
    matches!(
        opcode,
        SpecOpcode::Lookahead | SpecOpcode::LookaheadNot | SpecOpcode::Not
    )
}
