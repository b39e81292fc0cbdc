//! Diagnostics for grammar loading and compilation.

mod collection;
mod message;
mod printer;


pub use collection::Diagnostics;
pub use message::{Diagnostic, Severity};
pub use printer::DiagnosticsPrinter;
