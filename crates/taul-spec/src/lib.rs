//! Spec binary format for TAUL.
//!
//! A spec is an ordered, self-describing sequence of grammar-construction
//! instructions encoded as bytes (little-endian on the wire, so images are
//! portable). This crate contains:
//! - The opcode set and operand shapes ([`SpecOpcode`], [`SpecInstr`])
//! - A writer ([`SpecWriter`]) and the stepper that walks a spec with
//!   one-instruction lookahead ([`Spec::step`], [`SpecVisitor`])
//! - The load-time error kinds and error counter shared with the loader

pub mod error;
pub mod opcode;
pub mod spec;
pub mod stepper;

#[cfg(test)]
mod spec_tests;

pub use error::{ErrorCounter, SpecErrorKind};
pub use opcode::SpecOpcode;
pub use spec::{Spec, SpecWriter};
pub use stepper::{DecodeError, SpecInstr, SpecVisitor};
