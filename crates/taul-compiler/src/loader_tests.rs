//! Tests for the two-pass loader and its diagnostics.

use taul_core::{Qualifier, SymbolId};
use taul_spec::{ErrorCounter, Spec, SpecErrorKind, SpecWriter};

use crate::diagnostics::Diagnostics;
use crate::{load, load_with, Error};

fn load_err(spec: &Spec) -> Diagnostics {
    match load(spec) {
        Err(Error::Load(diags)) => diags,
        Ok(_) => panic!("expected load failure, got a grammar"),
        Err(other) => panic!("expected load failure, got {other:?}"),
    }
}

/// LPRs `A: 'a'`, `B: 'b'`; PPR `f: A B`.
fn abf_spec() -> Spec {
    SpecWriter::new()
        .lpr_decl("A")
        .lpr_decl("B")
        .ppr_decl("f")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .lpr("B", Qualifier::None)
        .string("b")
        .close()
        .ppr("f", Qualifier::None)
        .name("A")
        .name("B")
        .close()
        .done()
}

#[test]
fn loads_a_minimal_grammar() {
    let gram = load(&abf_spec()).unwrap();
    assert_eq!(gram.lprs(), 2);
    assert_eq!(gram.pprs(), 1);
    assert!(gram.has_lpr("A"));
    assert!(gram.has_ppr("f"));
    assert_eq!(gram.lpr_at(1).index(), 1);
    assert_eq!(gram.ppr_at(0).qualifier(), Qualifier::None);
}

#[test]
fn load_is_deterministic() {
    let spec = abf_spec();
    let first = load(&spec).unwrap();
    let second = load(&spec).unwrap();
    assert_eq!(first, second);
}

#[test]
fn qualifiers_are_recorded() {
    let spec = SpecWriter::new()
        .lpr_decl("WS")
        .lpr_decl("FRAG")
        .lpr("WS", Qualifier::Skip)
        .charset(" \\t")
        .close()
        .lpr("FRAG", Qualifier::Support)
        .string("x")
        .close()
        .done();
    let gram = load(&spec).unwrap();
    assert_eq!(gram.lpr_at(0).qualifier(), Qualifier::Skip);
    assert_eq!(gram.lpr_at(1).qualifier(), Qualifier::Support);
    assert_eq!(gram.nonsupport_lprs(), 1);
}

#[test]
fn rule_name_conflict() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .ppr_decl("A")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::RuleNameConflict), 1);
}

#[test]
fn duplicate_declaration_is_a_conflict() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::RuleNameConflict), 1);
}

#[test]
fn stray_close() {
    let spec = SpecWriter::new().close().done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::StrayClose), 1);
}

#[test]
fn scope_not_closed() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .string("a")
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::ScopeNotClosed), 1);
}

#[test]
fn rule_never_declared() {
    let spec = SpecWriter::new()
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::RuleNeverDeclared), 1);
}

#[test]
fn defining_a_ppr_name_as_lpr_is_never_declared() {
    let spec = SpecWriter::new()
        .ppr_decl("f")
        .lpr("f", Qualifier::None)
        .string("a")
        .close()
        .done();
    let diags = load_err(&spec);
    assert!(diags.count_of(SpecErrorKind::RuleNeverDeclared) >= 1);
}

#[test]
fn rule_never_defined() {
    let spec = SpecWriter::new().lpr_decl("A").ppr_decl("f").done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::RuleNeverDefined), 2);
}

#[test]
fn rule_already_defined() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .lpr("A", Qualifier::None)
        .string("b")
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::RuleAlreadyDefined), 1);
}

#[test]
fn ppr_may_not_carry_qualifiers() {
    let spec = SpecWriter::new()
        .ppr_decl("f")
        .ppr("f", Qualifier::Skip)
        .any()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalQualifier), 1);
}

#[test]
fn rule_definitions_may_not_nest() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr_decl("B")
        .lpr("A", Qualifier::None)
        .lpr("B", Qualifier::None)
        .string("b")
        .close()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalRuleDeclare), 1);
}

#[test]
fn token_and_failure_are_ppr_only() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .token()
        .failure()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInLprScope), 2);
}

#[test]
fn charset_is_lpr_only() {
    let spec = SpecWriter::new()
        .ppr_decl("f")
        .ppr("f", Qualifier::None)
        .charset("a-z")
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInPprScope), 1);
}

#[test]
fn expressions_require_a_rule_scope() {
    let spec = SpecWriter::new().any().done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInNoScope), 1);
}

#[test]
fn alternative_requires_an_alternation_scope() {
    let spec = SpecWriter::new().alternative().done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInNoAlternationScope), 1);
}

#[test]
fn name_must_resolve() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .name("missing")
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::RuleNotFound), 1);
}

#[test]
fn lpr_may_not_reference_ppr() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .ppr_decl("f")
        .lpr("A", Qualifier::None)
        .name("f")
        .close()
        .ppr("f", Qualifier::None)
        .any()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::RuleMayNotBePpr), 1);
}

#[test]
fn single_terminal_scope_rejects_nonterminals_and_composites() {
    // lookahead of an LPR reference inside an LPR is a nonterminal
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr_decl("B")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .lpr("B", Qualifier::None)
        .lookahead()
        .name("A")
        .close()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInSingleTerminalScope), 1);

    // a kleene-star cannot resolve to one terminal
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .not()
        .kleene_star()
        .string("a")
        .close()
        .close()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInSingleTerminalScope), 1);
}

#[test]
fn single_terminal_scope_rejects_long_strings() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .lookahead()
        .string("ab")
        .close()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInSingleTerminalScope), 1);
}

#[test]
fn lookahead_takes_one_subexpr_per_alternative() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .lookahead()
        .charset("a")
        .charset("b")
        .close()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInSingleSubexprScope), 1);

    // one subexpr per alternative is fine
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .lookahead()
        .charset("a")
        .alternative()
        .charset("b")
        .close()
        .string("x")
        .close()
        .done();
    assert!(load(&spec).is_ok());
}

#[test]
fn end_is_illegal_inside_single_terminal_scopes() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .lookahead_not()
        .end()
        .close()
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalInNoEndSubexprScope), 1);
}

#[test]
fn overlapping_alternatives_are_ambiguous() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .ppr_decl("f")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .ppr("f", Qualifier::None)
        .name("A")
        .alternative()
        .name("A")
        .close()
        .done();
    let diags = load_err(&spec);
    assert_eq!(diags.count_of(SpecErrorKind::IllegalAmbiguity), 1);
}

#[test]
fn two_nullable_alternatives_are_ambiguous() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .ppr_decl("f")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .ppr("f", Qualifier::None)
        .optional()
        .name("A")
        .close()
        .alternative()
        .optional()
        .name("A")
        .close()
        .close()
        .done();
    let diags = load_err(&spec);
    assert!(diags.count_of(SpecErrorKind::IllegalAmbiguity) >= 1);
}

#[test]
fn ambiguity_inside_composites_is_detected() {
    // ('a' | 'a')* is ambiguous within the helper row
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr("A", Qualifier::None)
        .kleene_star()
        .string("a")
        .alternative()
        .string("a")
        .close()
        .close()
        .done();
    let diags = load_err(&spec);
    assert!(diags.count_of(SpecErrorKind::IllegalAmbiguity) >= 1);
}

#[test]
fn errors_accumulate_instead_of_stopping() {
    let spec = SpecWriter::new()
        .close() // stray-close
        .lpr("A", Qualifier::None) // never declared
        .token() // illegal in lpr scope
        .close()
        .done();
    let mut counter = ErrorCounter::new();
    let result = load_with(&spec, &mut counter);
    assert!(result.is_err());
    assert_eq!(counter.count(SpecErrorKind::StrayClose), 1);
    assert_eq!(counter.count(SpecErrorKind::RuleNeverDeclared), 1);
    assert_eq!(counter.count(SpecErrorKind::IllegalInLprScope), 1);
    assert_eq!(counter.total(), 3);
}

#[test]
fn ppr_strings_resolve_to_spelling_lprs() {
    let spec = SpecWriter::new()
        .lpr_decl("A")
        .lpr_decl("B")
        .ppr_decl("f")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .lpr("B", Qualifier::None)
        .string("b")
        .close()
        .ppr("f", Qualifier::None)
        .string("b")
        .close()
        .done();
    let gram = load(&spec).unwrap();
    // f's prefix set keys on B's token id, not A's
    let f = gram.ppr("f").unwrap();
    assert!(f.prefix_set().contains(SymbolId::new(1)));
    assert!(!f.prefix_set().contains(SymbolId::new(0)));
}

#[test]
fn decode_failures_surface_as_decode_errors() {
    let good = SpecWriter::new().lpr_decl("A").done();
    let mut bytes = good.bytes().to_vec();
    bytes[0] = 0xEE;
    let corrupt = Spec::from_bytes(bytes);
    match load(&corrupt) {
        Err(Error::Decode(_)) => {}
        other => panic!("expected a decode error, got {other:?}"),
    }
}
