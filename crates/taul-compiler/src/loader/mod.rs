//! The grammar loader: a two-pass walk over a spec binary.
//!
//! Pass 1 registers every `lpr_decl`/`ppr_decl` by name, assigning indices
//! in declaration order. Pass 2 walks the definitions, building one
//! validated expression tree per rule. Both passes raise diagnostics
//! instead of stopping; a grammar is produced only when the walk ends with
//! zero errors.

mod defs;

use indexmap::IndexSet;

use taul_core::{Grammar, SourcePos};
use taul_spec::{DecodeError, Spec, SpecErrorKind, SpecInstr};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::tables;

pub(crate) use defs::RuleDefs;

/// Declaration registries from pass 1; iteration order is declaration
/// order, which fixes each rule's index.
#[derive(Debug, Default)]
pub(crate) struct Decls {
    pub(crate) lprs: IndexSet<String>,
    pub(crate) pprs: IndexSet<String>,
}

impl Decls {
    pub(crate) fn lpr_index(&self, name: &str) -> Option<usize> {
        self.lprs.get_index_of(name)
    }

    pub(crate) fn ppr_index(&self, name: &str) -> Option<usize> {
        self.pprs.get_index_of(name)
    }
}

/// Load a grammar from a spec, collecting diagnostics. Returns `None` when
/// any error diagnostic was raised.
pub(crate) fn load_spec(
    spec: &Spec,
    diags: &mut Diagnostics,
) -> Result<Option<Grammar>, DecodeError> {
    let instrs = spec.decode()?;

    let decls = declaration_pass(&instrs, diags);
    log::debug!(
        "loader pass 1: {} LPR decls, {} PPR decls",
        decls.lprs.len(),
        decls.pprs.len()
    );

    let defs = defs::definition_pass(&instrs, &decls, diags);
    if diags.has_errors() {
        return Ok(None);
    }

    let gram = tables::build_grammar(&decls, &defs, diags);
    if diags.has_errors() {
        return Ok(None);
    }
    log::debug!("loaded grammar: {} LPRs, {} PPRs", gram.lprs(), gram.pprs());
    Ok(Some(gram))
}

fn declaration_pass(instrs: &[(SpecInstr<'_>, usize)], diags: &mut Diagnostics) -> Decls {
    let mut decls = Decls::default();
    let mut pos: SourcePos = 0;
    for (instr, _) in instrs {
        match *instr {
            SpecInstr::Pos(p) => pos = p,
            SpecInstr::LprDecl(name) => {
                if decls.lprs.contains(name) || decls.pprs.contains(name) {
                    diags.push(Diagnostic::error(
                        SpecErrorKind::RuleNameConflict,
                        point(pos),
                        format!("rule name '{name}' is already taken"),
                    ));
                } else {
                    decls.lprs.insert(name.to_owned());
                }
            }
            SpecInstr::PprDecl(name) => {
                if decls.lprs.contains(name) || decls.pprs.contains(name) {
                    diags.push(Diagnostic::error(
                        SpecErrorKind::RuleNameConflict,
                        point(pos),
                        format!("rule name '{name}' is already taken"),
                    ));
                } else {
                    decls.pprs.insert(name.to_owned());
                }
            }
            _ => {}
        }
    }
    decls
}

pub(crate) fn point(pos: SourcePos) -> std::ops::Range<usize> {
    let pos = pos as usize;
    pos..pos
}
