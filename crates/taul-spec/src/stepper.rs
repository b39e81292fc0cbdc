//! Spec decoding and the visitor walk.

use taul_core::{Qualifier, SourcePos};

use crate::opcode::SpecOpcode;
use crate::spec::Spec;

/// Decoding failure. Ill-formed buffers fail deterministically; they never
/// panic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of spec at offset {0}")]
    UnexpectedEnd(usize),

    #[error("unknown opcode byte {byte:#04x} at offset {offset}")]
    UnknownOpcode { byte: u8, offset: usize },

    #[error("unknown qualifier byte {byte:#04x} at offset {offset}")]
    UnknownQualifier { byte: u8, offset: usize },

    #[error("string operand at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
}

/// One decoded spec instruction. String operands borrow the spec buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecInstr<'s> {
    Pos(SourcePos),
    Close,
    Alternative,
    LprDecl(&'s str),
    PprDecl(&'s str),
    Lpr(&'s str, Qualifier),
    Ppr(&'s str, Qualifier),
    End,
    Any,
    String(&'s str),
    Charset(&'s str),
    Token,
    Failure,
    Name(&'s str),
    Sequence,
    Lookahead,
    LookaheadNot,
    Not,
    Optional,
    KleeneStar,
    KleenePlus,
}

impl SpecInstr<'_> {
    pub fn opcode(&self) -> SpecOpcode {
        match self {
            SpecInstr::Pos(_) => SpecOpcode::Pos,
            SpecInstr::Close => SpecOpcode::Close,
            SpecInstr::Alternative => SpecOpcode::Alternative,
            SpecInstr::LprDecl(_) => SpecOpcode::LprDecl,
            SpecInstr::PprDecl(_) => SpecOpcode::PprDecl,
            SpecInstr::Lpr(..) => SpecOpcode::Lpr,
            SpecInstr::Ppr(..) => SpecOpcode::Ppr,
            SpecInstr::End => SpecOpcode::End,
            SpecInstr::Any => SpecOpcode::Any,
            SpecInstr::String(_) => SpecOpcode::String,
            SpecInstr::Charset(_) => SpecOpcode::Charset,
            SpecInstr::Token => SpecOpcode::Token,
            SpecInstr::Failure => SpecOpcode::Failure,
            SpecInstr::Name(_) => SpecOpcode::Name,
            SpecInstr::Sequence => SpecOpcode::Sequence,
            SpecInstr::Lookahead => SpecOpcode::Lookahead,
            SpecInstr::LookaheadNot => SpecOpcode::LookaheadNot,
            SpecInstr::Not => SpecOpcode::Not,
            SpecInstr::Optional => SpecOpcode::Optional,
            SpecInstr::KleeneStar => SpecOpcode::KleeneStar,
            SpecInstr::KleenePlus => SpecOpcode::KleenePlus,
        }
    }
}

/// Receiver of a spec walk.
///
/// `lookahead` is the opcode of the instruction after the current one, or
/// `None` at the end of the spec.
pub trait SpecVisitor {
    fn on_startup(&mut self) {}
    fn on_shutdown(&mut self) {}
    fn on_instr(&mut self, instr: SpecInstr<'_>, lookahead: Option<SpecOpcode>);
}

impl Spec {
    /// Decode the instruction at `offset`, returning it and the offset of
    /// the next instruction.
    pub fn read(&self, offset: usize) -> Result<(SpecInstr<'_>, usize), DecodeError> {
        let mut cursor = Cursor {
            bytes: &self.bin,
            offset,
        };
        let instr = cursor.read_instr()?;
        Ok((instr, cursor.offset))
    }

    /// Walk the spec front-to-back, invoking the visitor per instruction
    /// with one-opcode lookahead.
    ///
    /// The whole buffer is decoded before the first visit, so an ill-formed
    /// spec fails without the visitor seeing a half-valid prefix.
    pub fn step<V: SpecVisitor>(&self, visitor: &mut V) -> Result<(), DecodeError> {
        let instrs = self.decode()?;
        visitor.on_startup();
        for (i, (instr, _)) in instrs.iter().enumerate() {
            let lookahead = instrs.get(i + 1).map(|(next, _)| next.opcode());
            visitor.on_instr(*instr, lookahead);
        }
        visitor.on_shutdown();
        Ok(())
    }

    /// Decode the whole spec into a list of `(instruction, byte offset)`
    /// pairs.
    pub fn decode(&self) -> Result<Vec<(SpecInstr<'_>, usize)>, DecodeError> {
        let mut out = Vec::new();
        let mut offset = 0;
        while offset < self.bin.len() {
            let at = offset;
            let (instr, next) = self.read(offset)?;
            out.push((instr, at));
            offset = next;
        }
        Ok(out)
    }
}

struct Cursor<'s> {
    bytes: &'s [u8],
    offset: usize,
}

impl<'s> Cursor<'s> {
    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .bytes
            .get(self.offset)
            .ok_or(DecodeError::UnexpectedEnd(self.offset))?;
        self.offset += 1;
        Ok(byte)
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let end = self.offset + 4;
        let slice = self
            .bytes
            .get(self.offset..end)
            .ok_or(DecodeError::UnexpectedEnd(self.offset))?;
        self.offset = end;
        Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn read_str(&mut self) -> Result<&'s str, DecodeError> {
        let at = self.offset;
        let len = self.read_u32()? as usize;
        let end = self
            .offset
            .checked_add(len)
            .ok_or(DecodeError::UnexpectedEnd(at))?;
        let slice = self
            .bytes
            .get(self.offset..end)
            .ok_or(DecodeError::UnexpectedEnd(self.offset))?;
        self.offset = end;
        std::str::from_utf8(slice).map_err(|_| DecodeError::InvalidUtf8 { offset: at })
    }

    fn read_qualifier(&mut self) -> Result<Qualifier, DecodeError> {
        let at = self.offset;
        let byte = self.read_u8()?;
        Qualifier::from_u8(byte).ok_or(DecodeError::UnknownQualifier { byte, offset: at })
    }

    fn read_instr(&mut self) -> Result<SpecInstr<'s>, DecodeError> {
        let at = self.offset;
        let byte = self.read_u8()?;
        let opcode =
            SpecOpcode::from_u8(byte).ok_or(DecodeError::UnknownOpcode { byte, offset: at })?;
        Ok(match opcode {
            SpecOpcode::Pos => SpecInstr::Pos(self.read_u32()?),
            SpecOpcode::Close => SpecInstr::Close,
            SpecOpcode::Alternative => SpecInstr::Alternative,
            SpecOpcode::LprDecl => SpecInstr::LprDecl(self.read_str()?),
            SpecOpcode::PprDecl => SpecInstr::PprDecl(self.read_str()?),
            SpecOpcode::Lpr => {
                let name = self.read_str()?;
                SpecInstr::Lpr(name, self.read_qualifier()?)
            }
            SpecOpcode::Ppr => {
                let name = self.read_str()?;
                SpecInstr::Ppr(name, self.read_qualifier()?)
            }
            SpecOpcode::End => SpecInstr::End,
            SpecOpcode::Any => SpecInstr::Any,
            SpecOpcode::String => SpecInstr::String(self.read_str()?),
            SpecOpcode::Charset => SpecInstr::Charset(self.read_str()?),
            SpecOpcode::Token => SpecInstr::Token,
            SpecOpcode::Failure => SpecInstr::Failure,
            SpecOpcode::Name => SpecInstr::Name(self.read_str()?),
            SpecOpcode::Sequence => SpecInstr::Sequence,
            SpecOpcode::Lookahead => SpecInstr::Lookahead,
            SpecOpcode::LookaheadNot => SpecInstr::LookaheadNot,
            SpecOpcode::Not => SpecInstr::Not,
            SpecOpcode::Optional => SpecInstr::Optional,
            SpecOpcode::KleeneStar => SpecInstr::KleeneStar,
            SpecOpcode::KleenePlus => SpecInstr::KleenePlus,
        })
    }
}
