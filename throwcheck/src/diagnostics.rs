//! Structured diagnostics for the throws-clause checker.
//!
//! Diagnostics accumulate in an append-only [`DiagnosticSink`] that is an
//! explicit value threaded through the check, then sorted once by source
//! position. Severity of conformance findings is governed by
//! [`CheckOptions`](crate::options::CheckOptions), never by the sink.

use serde::{Deserialize, Serialize};
use throwcheck_parser::Span;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// Stable machine-readable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// A propagated type is not covered by the declared clause.
    UndeclaredException,
    /// A declared-empty clause has a throw site.
    EmptyClauseViolation,
    /// A callee with no known signature; treated as unconstrained.
    UnresolvedCallee,
    /// An escape with no determinable static type; assumed safe.
    OpaqueEscape,
    /// A clause or declaration names an unknown type.
    UnknownType,
    /// A type is declared more than once.
    DuplicateType,
    /// Defensive fixed-point cap reached: a modeling defect, not user error.
    FixedPointCap,
    /// Trailing comma in a throws clause.
    TrailingComma,
    /// `throws` followed by something that is not a type.
    MissingThrowsType,
    /// Malformed source, forwarded from the parser.
    Syntax,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UndeclaredException => "undeclared-exception-type",
            DiagnosticCode::EmptyClauseViolation => "empty-clause-violation",
            DiagnosticCode::UnresolvedCallee => "unresolved-callee",
            DiagnosticCode::OpaqueEscape => "opaque-escape",
            DiagnosticCode::UnknownType => "unknown-type",
            DiagnosticCode::DuplicateType => "duplicate-type",
            DiagnosticCode::FixedPointCap => "fixed-point-cap",
            DiagnosticCode::TrailingComma => "trailing-comma",
            DiagnosticCode::MissingThrowsType => "missing-type-after-throws",
            DiagnosticCode::Syntax => "syntax-error",
        }
    }
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self { severity, code, message: message.into(), span }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, code, message, span)
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, code, message, span)
    }

    pub fn note(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Note, code, message, span)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        write!(
            f,
            "{}[{}]: {} (line {}, column {})",
            severity,
            self.code.as_str(),
            self.message,
            self.span.start_line,
            self.span.start_column
        )
    }
}

/// Append-only diagnostic collector.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Finish collection: deterministic sort by source position, then
    /// severity (errors first within a position), then code.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by(|a, b| {
            (a.span.start, a.span.end)
                .cmp(&(b.span.start, b.span.end))
                .then(b.severity.cmp(&a.severity))
                .then(a.code.as_str().cmp(b.code.as_str()))
        });
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_at(start: usize) -> Span {
        Span::new(start, start + 1, 1, 1, start + 1, start + 2)
    }

    #[test]
    fn test_finish_sorts_by_position() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::note(
            DiagnosticCode::UnresolvedCallee,
            "later",
            span_at(10),
        ));
        sink.push(Diagnostic::error(
            DiagnosticCode::UndeclaredException,
            "earlier",
            span_at(2),
        ));

        let sorted = sink.finish();
        assert_eq!(sorted[0].message, "earlier");
        assert_eq!(sorted[1].message, "later");
    }

    #[test]
    fn test_error_count() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::warning(
            DiagnosticCode::UndeclaredException,
            "w",
            span_at(0),
        ));
        sink.push(Diagnostic::error(
            DiagnosticCode::EmptyClauseViolation,
            "e",
            span_at(1),
        ));
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::error(
            DiagnosticCode::UndeclaredException,
            "function 'f' may propagate SyntaxError",
            Span::new(4, 5, 2, 2, 1, 2),
        );
        let text = diag.to_string();
        assert!(text.contains("undeclared-exception-type"));
        assert!(text.contains("line 2"));
    }
}
