//! Spec buffers and the spec writer.

use taul_core::{Qualifier, SourcePos};

use crate::opcode::SpecOpcode;

/// A compiled spec: the instruction byte sequence a grammar is loaded from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Spec {
    pub(crate) bin: Vec<u8>,
}

impl Spec {
    /// Wrap raw instruction bytes, e.g. read back from a file. Validity is
    /// checked on decode, not here.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bin: bytes.into() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bin
    }

    pub fn len(&self) -> usize {
        self.bin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bin.is_empty()
    }

    /// Concatenate two specs; instructions of `b` follow those of `a`.
    pub fn concat(a: &Spec, b: &Spec) -> Spec {
        let mut bin = Vec::with_capacity(a.bin.len() + b.bin.len());
        bin.extend_from_slice(&a.bin);
        bin.extend_from_slice(&b.bin);
        Spec { bin }
    }
}

/// Appends instructions to a spec under construction.
///
/// Strings are length-prefixed with a 32-bit little-endian byte count;
/// positions and qualifiers are encoded inline after the opcode byte.
#[derive(Clone, Debug, Default)]
pub struct SpecWriter {
    temp: Spec,
}

impl SpecWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn op(mut self, opcode: SpecOpcode) -> Self {
        self.temp.bin.push(opcode.to_u8());
        self
    }

    fn str_operand(mut self, s: &str) -> Self {
        self.temp.bin.extend_from_slice(&(s.len() as u32).to_le_bytes());
        self.temp.bin.extend_from_slice(s.as_bytes());
        self
    }

    /// Record a source position for diagnostics raised by later
    /// instructions.
    pub fn pos(mut self, new_pos: SourcePos) -> Self {
        self = self.op(SpecOpcode::Pos);
        self.temp.bin.extend_from_slice(&new_pos.to_le_bytes());
        self
    }

    pub fn close(self) -> Self {
        self.op(SpecOpcode::Close)
    }

    pub fn alternative(self) -> Self {
        self.op(SpecOpcode::Alternative)
    }

    pub fn lpr_decl(self, name: &str) -> Self {
        self.op(SpecOpcode::LprDecl).str_operand(name)
    }

    pub fn ppr_decl(self, name: &str) -> Self {
        self.op(SpecOpcode::PprDecl).str_operand(name)
    }

    pub fn lpr(self, name: &str, qualifier: Qualifier) -> Self {
        let mut w = self.op(SpecOpcode::Lpr).str_operand(name);
        w.temp.bin.push(qualifier.to_u8());
        w
    }

    pub fn ppr(self, name: &str, qualifier: Qualifier) -> Self {
        let mut w = self.op(SpecOpcode::Ppr).str_operand(name);
        w.temp.bin.push(qualifier.to_u8());
        w
    }

    pub fn end(self) -> Self {
        self.op(SpecOpcode::End)
    }

    pub fn any(self) -> Self {
        self.op(SpecOpcode::Any)
    }

    pub fn string(self, s: &str) -> Self {
        self.op(SpecOpcode::String).str_operand(s)
    }

    pub fn charset(self, s: &str) -> Self {
        self.op(SpecOpcode::Charset).str_operand(s)
    }

    pub fn token(self) -> Self {
        self.op(SpecOpcode::Token)
    }

    pub fn failure(self) -> Self {
        self.op(SpecOpcode::Failure)
    }

    pub fn name(self, name: &str) -> Self {
        self.op(SpecOpcode::Name).str_operand(name)
    }

    pub fn sequence(self) -> Self {
        self.op(SpecOpcode::Sequence)
    }

    pub fn lookahead(self) -> Self {
        self.op(SpecOpcode::Lookahead)
    }

    pub fn lookahead_not(self) -> Self {
        self.op(SpecOpcode::LookaheadNot)
    }

    pub fn not(self) -> Self {
        self.op(SpecOpcode::Not)
    }

    pub fn optional(self) -> Self {
        self.op(SpecOpcode::Optional)
    }

    pub fn kleene_star(self) -> Self {
        self.op(SpecOpcode::KleeneStar)
    }

    pub fn kleene_plus(self) -> Self {
        self.op(SpecOpcode::KleenePlus)
    }

    /// Append every instruction of an already-written spec.
    pub fn write_spec(mut self, other: &Spec) -> Self {
        self.temp.bin.extend_from_slice(&other.bin);
        self
    }

    /// Finish writing and take the spec.
    pub fn done(self) -> Spec {
        self.temp
    }
}
