//! Parse-table generation and ambiguity detection.

use std::collections::HashMap;

use taul_core::{
    Alternative, Grammar, IdRange, LexerRule, ParseTable, ParserRule, Qualifier, SymbolSet,
    TableRow,
};

use crate::analysis::{analyze, Analysis};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::expr::RuleExpr;
use crate::loader::{Decls, RuleDefs};
use crate::lower::{
    constant_spelling, glyph_universe, lower_rules, token_universe, LprLeaves, Lowered, PprLeaves,
};
use taul_spec::SpecErrorKind;

/// Lower, analyze, and assemble a grammar from validated definitions.
pub(crate) fn build_grammar(decls: &Decls, defs: &RuleDefs, diags: &mut Diagnostics) -> Grammar {
    let lpr_exprs: Vec<RuleExpr> = defs
        .lpr_exprs
        .iter()
        .map(|e| e.clone().expect("all rules are defined when no errors were raised"))
        .collect();
    let ppr_exprs: Vec<RuleExpr> = defs
        .ppr_exprs
        .iter()
        .map(|e| e.clone().expect("all rules are defined when no errors were raised"))
        .collect();
    let lpr_count = lpr_exprs.len() as u32;

    let mut spellings: HashMap<String, u32> = HashMap::new();
    for (i, expr) in lpr_exprs.iter().enumerate() {
        if let Some(spelling) = constant_spelling(expr) {
            spellings.entry(spelling).or_insert(i as u32);
        }
    }

    let lpr_low = lower_rules(
        &lpr_exprs,
        &LprLeaves {
            decls,
            universe: glyph_universe(),
        },
        glyph_universe(),
    );
    let ppr_low = lower_rules(
        &ppr_exprs,
        &PprLeaves {
            decls,
            lpr_count,
            spellings: &spellings,
            universe: token_universe(lpr_count),
        },
        token_universe(lpr_count),
    );

    let lpr_an = analyze(&lpr_low);
    let ppr_an = analyze(&ppr_low);

    let lpr_owner_names: Vec<&str> = decls.lprs.iter().map(String::as_str).collect();
    let ppr_owner_names: Vec<&str> = decls.pprs.iter().map(String::as_str).collect();
    let lpr_table = build_table(&lpr_low, &lpr_an, &lpr_owner_names, diags);
    let ppr_table = build_table(&ppr_low, &ppr_an, &ppr_owner_names, diags);

    let lprs: Vec<LexerRule> = decls
        .lprs
        .iter()
        .enumerate()
        .map(|(i, name)| LexerRule {
            name: name.clone(),
            index: i as u32,
            qualifier: defs.lpr_qualifiers[i],
            first: lpr_an.first[i].clone(),
            follow: lpr_an.follow[i].clone(),
            prefix: row_prefix(&lpr_an, i),
        })
        .collect();
    let pprs: Vec<ParserRule> = decls
        .pprs
        .iter()
        .enumerate()
        .map(|(i, name)| ParserRule {
            name: name.clone(),
            index: i as u32,
            qualifier: Qualifier::None,
            first: ppr_an.first[i].clone(),
            follow: ppr_an.follow[i].clone(),
            prefix: row_prefix(&ppr_an, i),
        })
        .collect();

    Grammar::from_parts(lprs, pprs, lpr_table, ppr_table)
}

/// Rule-level prefix set: the union of its alternatives' prefix sets, i.e.
/// the dispatch domain of its row.
fn row_prefix<S>(an: &Analysis<S>, row: usize) -> SymbolSet<S> {
    let mut out = SymbolSet::new();
    for prefix in &an.alt_prefix[row] {
        out.union_with(prefix);
    }
    out
}

fn build_table<S>(
    low: &Lowered<S>,
    an: &Analysis<S>,
    owner_names: &[&str],
    diags: &mut Diagnostics,
) -> ParseTable<S> {
    let mut rows_out = Vec::with_capacity(low.rows.len());
    for (row, alts) in low.rows.iter().enumerate() {
        let mut entries: Vec<(IdRange, u32)> = Vec::new();
        for (k, prefix) in an.alt_prefix[row].iter().enumerate() {
            for range in prefix.ranges() {
                entries.push((range, k as u32));
            }
        }
        entries.sort_by_key(|(range, _)| range.low);

        // overlapping prefix sets make the row non-deterministic
        let mut dispatch: Vec<(IdRange, u32)> = Vec::with_capacity(entries.len());
        let mut ambiguous = false;
        for (range, alt) in entries {
            match dispatch.last() {
                Some((prev, _)) if range.low < prev.high => ambiguous = true,
                _ => dispatch.push((range, alt)),
            }
        }
        if ambiguous {
            let owner = low.row_owner[row] as usize;
            let name = owner_names.get(owner).copied().unwrap_or("<unknown>");
            diags.push(Diagnostic::error(
                SpecErrorKind::IllegalAmbiguity,
                0..0,
                format!("alternatives of rule '{name}' have overlapping prefix sets"),
            ));
        }

        rows_out.push(TableRow {
            alts: alts
                .iter()
                .map(|syms| Alternative { syms: syms.clone() })
                .collect(),
            dispatch,
        });
    }
    ParseTable::new(rows_out, low.sets.clone())
}
