//! Tests for the spec binary format.

use taul_core::Qualifier;

use crate::error::{ErrorCounter, SpecErrorKind};
use crate::opcode::{SpecOpcode, SPEC_OPCODES};
use crate::spec::{Spec, SpecWriter};
use crate::stepper::{DecodeError, SpecInstr, SpecVisitor};

/// One of every instruction, exercising every operand shape.
fn every_instruction() -> Spec {
    SpecWriter::new()
        .pos(42)
        .lpr_decl("A")
        .ppr_decl("f")
        .lpr("A", Qualifier::Skip)
        .string("abc")
        .charset("0-9")
        .close()
        .ppr("f", Qualifier::None)
        .sequence()
        .name("A")
        .alternative()
        .token()
        .failure()
        .any()
        .end()
        .close()
        .lookahead()
        .lookahead_not()
        .not()
        .optional()
        .kleene_star()
        .kleene_plus()
        .close()
        .done()
}

#[test]
fn opcode_bytes_round_trip() {
    for byte in 0..SPEC_OPCODES as u8 {
        let opcode = SpecOpcode::from_u8(byte).unwrap();
        assert_eq!(opcode.to_u8(), byte);
    }
    assert_eq!(SpecOpcode::from_u8(SPEC_OPCODES as u8), None);
}

#[test]
fn read_round_trips_every_instruction() {
    let spec = every_instruction();
    let instrs: Vec<SpecInstr<'_>> = spec.decode().unwrap().into_iter().map(|(i, _)| i).collect();
    assert_eq!(
        instrs,
        vec![
            SpecInstr::Pos(42),
            SpecInstr::LprDecl("A"),
            SpecInstr::PprDecl("f"),
            SpecInstr::Lpr("A", Qualifier::Skip),
            SpecInstr::String("abc"),
            SpecInstr::Charset("0-9"),
            SpecInstr::Close,
            SpecInstr::Ppr("f", Qualifier::None),
            SpecInstr::Sequence,
            SpecInstr::Name("A"),
            SpecInstr::Alternative,
            SpecInstr::Token,
            SpecInstr::Failure,
            SpecInstr::Any,
            SpecInstr::End,
            SpecInstr::Close,
            SpecInstr::Lookahead,
            SpecInstr::LookaheadNot,
            SpecInstr::Not,
            SpecInstr::Optional,
            SpecInstr::KleeneStar,
            SpecInstr::KleenePlus,
            SpecInstr::Close,
        ]
    );
}

#[test]
fn strings_may_hold_any_utf8() {
    let spec = SpecWriter::new().string("héllo — € \0\n").done();
    let (instr, next) = spec.read(0).unwrap();
    assert_eq!(instr, SpecInstr::String("héllo — € \0\n"));
    assert_eq!(next, spec.len());
}

#[test]
fn concat_preserves_instruction_order() {
    let a = SpecWriter::new().lpr_decl("A").done();
    let b = SpecWriter::new().lpr("A", Qualifier::None).close().done();
    let joined = Spec::concat(&a, &b);
    let instrs: Vec<SpecInstr<'_>> = joined.decode().unwrap().into_iter().map(|(i, _)| i).collect();
    assert_eq!(
        instrs,
        vec![
            SpecInstr::LprDecl("A"),
            SpecInstr::Lpr("A", Qualifier::None),
            SpecInstr::Close,
        ]
    );
}

#[test]
fn write_spec_embeds_another_spec() {
    let inner = SpecWriter::new().any().done();
    let outer = SpecWriter::new()
        .optional()
        .write_spec(&inner)
        .close()
        .done();
    let instrs: Vec<SpecInstr<'_>> = outer.decode().unwrap().into_iter().map(|(i, _)| i).collect();
    assert_eq!(
        instrs,
        vec![SpecInstr::Optional, SpecInstr::Any, SpecInstr::Close]
    );
}

struct CollectingVisitor {
    started: bool,
    finished: bool,
    seen: Vec<(SpecOpcode, Option<SpecOpcode>)>,
}

impl SpecVisitor for CollectingVisitor {
    fn on_startup(&mut self) {
        self.started = true;
    }

    fn on_shutdown(&mut self) {
        self.finished = true;
    }

    fn on_instr(&mut self, instr: SpecInstr<'_>, lookahead: Option<SpecOpcode>) {
        self.seen.push((instr.opcode(), lookahead));
    }
}

#[test]
fn step_provides_one_opcode_lookahead() {
    let spec = SpecWriter::new().sequence().any().close().done();
    let mut visitor = CollectingVisitor {
        started: false,
        finished: false,
        seen: Vec::new(),
    };
    spec.step(&mut visitor).unwrap();
    assert!(visitor.started);
    assert!(visitor.finished);
    assert_eq!(
        visitor.seen,
        vec![
            (SpecOpcode::Sequence, Some(SpecOpcode::Any)),
            (SpecOpcode::Any, Some(SpecOpcode::Close)),
            (SpecOpcode::Close, None),
        ]
    );
}

#[test]
fn step_of_empty_spec_only_bookends() {
    let spec = Spec::default();
    let mut visitor = CollectingVisitor {
        started: false,
        finished: false,
        seen: Vec::new(),
    };
    spec.step(&mut visitor).unwrap();
    assert!(visitor.started);
    assert!(visitor.finished);
    assert!(visitor.seen.is_empty());
}

#[test]
fn decode_rejects_unknown_opcode() {
    let mut spec = Spec::default();
    spec.bin.push(0xEE);
    assert_eq!(
        spec.read(0),
        Err(DecodeError::UnknownOpcode {
            byte: 0xEE,
            offset: 0
        })
    );
}

#[test]
fn decode_rejects_truncated_operands() {
    // a string opcode whose length prefix overruns the buffer
    let mut spec = Spec::default();
    spec.bin.push(SpecOpcode::Name.to_u8());
    spec.bin.extend_from_slice(&100u32.to_le_bytes());
    spec.bin.extend_from_slice(b"abc");
    assert!(matches!(
        spec.read(0),
        Err(DecodeError::UnexpectedEnd(_))
    ));

    // a pos opcode missing its operand entirely
    let mut spec = Spec::default();
    spec.bin.push(SpecOpcode::Pos.to_u8());
    assert!(matches!(spec.read(0), Err(DecodeError::UnexpectedEnd(_))));
}

#[test]
fn decode_rejects_bad_qualifier_and_utf8() {
    let mut spec = SpecWriter::new().lpr("A", Qualifier::None).done();
    let last = spec.bin.len() - 1;
    spec.bin[last] = 9;
    assert!(matches!(
        spec.read(0),
        Err(DecodeError::UnknownQualifier { byte: 9, .. })
    ));

    let mut spec = Spec::default();
    spec.bin.push(SpecOpcode::Name.to_u8());
    spec.bin.extend_from_slice(&2u32.to_le_bytes());
    spec.bin.extend_from_slice(&[0xFF, 0xFE]);
    assert!(matches!(
        spec.read(0),
        Err(DecodeError::InvalidUtf8 { .. })
    ));
}

#[test]
fn error_counter_tallies_by_kind() {
    let mut counter = ErrorCounter::new();
    assert!(counter.is_empty());
    counter.raise(SpecErrorKind::StrayClose);
    counter.raise(SpecErrorKind::StrayClose);
    counter.raise(SpecErrorKind::RuleNameConflict);
    assert_eq!(counter.count(SpecErrorKind::StrayClose), 2);
    assert_eq!(counter.count(SpecErrorKind::RuleNameConflict), 1);
    assert_eq!(counter.count(SpecErrorKind::IllegalAmbiguity), 0);
    assert_eq!(counter.total(), 3);
}

#[test]
fn error_kind_names_are_kebab_case() {
    assert_eq!(SpecErrorKind::RuleNameConflict.to_string(), "rule-name-conflict");
    assert_eq!(
        SpecErrorKind::IllegalInSingleTerminalScope.to_string(),
        "illegal-in-single-terminal-scope"
    );
}
