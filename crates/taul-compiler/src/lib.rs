//! TAUL grammar compiler: spec loader, LL(1) table generation, and the TAUL
//! text frontend.
//!
//! This crate provides the compilation pipeline:
//! - `loader` - two-pass spec walk building validated expression trees
//! - `lower` - expression trees to parse-table productions
//! - `analysis` - FIRST/FOLLOW/prefix fixed point
//! - `tables` - dispatch generation and ambiguity detection
//! - `frontend` - TAUL source text to spec binary
//! - `diagnostics` - error collection and rendering

pub mod diagnostics;
pub mod literals;

mod analysis;
mod expr;
mod frontend;
mod loader;
mod lower;
mod tables;

#[cfg(test)]
mod loader_tests;

use taul_core::Grammar;
use taul_spec::{DecodeError, ErrorCounter, Spec, SpecErrorKind};

pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsPrinter, Severity};

/// Errors that can occur while loading or compiling a grammar.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The spec binary itself could not be decoded.
    #[error("malformed spec binary: {0}")]
    Decode(#[from] DecodeError),

    /// The spec decoded but failed validation; the diagnostics hold the
    /// individual errors.
    #[error("grammar loading failed with {} errors", .0.error_count())]
    Load(Diagnostics),

    /// TAUL source text failed to compile to a spec.
    #[error("grammar compilation failed with {} errors", .0.error_count())]
    Compile(Diagnostics),

    /// A source file could not be read.
    #[error("cannot read grammar source {path}: {source}")]
    SourceNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for loader and frontend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Load a grammar from a spec binary.
pub fn load(spec: &Spec) -> Result<Grammar> {
    let mut counter = ErrorCounter::new();
    load_with(spec, &mut counter)
}

/// Load a grammar from a spec binary, tallying errors into `counter`.
pub fn load_with(spec: &Spec, counter: &mut ErrorCounter) -> Result<Grammar> {
    let mut diags = Diagnostics::new();
    let result = loader::load_spec(spec, &mut diags)?;
    for diag in diags.iter() {
        counter.raise(diag.kind);
    }
    match result {
        Some(gram) if !diags.has_errors() => Ok(gram),
        _ => Err(Error::Load(diags)),
    }
}

/// Compile TAUL source text to a spec binary.
pub fn compile(source: &str) -> Result<Spec> {
    let mut diags = Diagnostics::new();
    let spec = frontend::compile_source(source, &mut diags);
    if diags.has_errors() {
        Err(Error::Compile(diags))
    } else {
        Ok(spec)
    }
}

/// Compile a TAUL source file to a spec binary.
pub fn compile_file(path: impl AsRef<std::path::Path>) -> Result<Spec> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| {
        // the counter kind for this failure is source-code-not-found
        log::warn!("{}: {}", SpecErrorKind::SourceCodeNotFound, path.display());
        Error::SourceNotFound {
            path: path.display().to_string(),
            source,
        }
    })?;
    compile(&source)
}

/// Compile TAUL source text and load the resulting grammar in one step.
pub fn load_source(source: &str) -> Result<Grammar> {
    let spec = compile(source)?;
    load(&spec)
}
