//! Diagnostic message types.

use std::fmt;
use std::ops::Range;

use taul_spec::SpecErrorKind;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single loader or frontend diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: SpecErrorKind,
    /// Byte span into the source the spec was compiled from. Spec binaries
    /// carry positions only as `pos` hints, so the span may be empty.
    pub span: Range<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: SpecErrorKind, span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn warning(kind: SpecErrorKind, span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}: {} ({})",
            self.severity, self.span.start, self.span.end, self.message, self.kind
        )
    }
}
