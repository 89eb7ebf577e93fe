//! Conformance checking of declared clauses against collected propagation.
//!
//! Every collected site must be covered by the declared set; a declared
//! empty clause makes any site a violation. Over-declaration is permitted:
//! the clause is a documentation contract, not a tight bound.
//! Unconstrained callables are never checked.

use crate::analysis::collect::Collected;
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
use crate::options::CheckOptions;
use crate::types::{ParamBounds, ThrowsClause, TypeTable};

/// Check one callable with a declared clause.
pub fn check_callable(
    name: &str,
    clause: &ThrowsClause,
    collected: &Collected,
    bounds: &ParamBounds,
    table: &TypeTable,
    options: CheckOptions,
    sink: &mut DiagnosticSink,
) {
    let Some(admitted) = clause.admitted_set(table) else {
        return;
    };
    let severity = if options.warn_only { Severity::Warning } else { Severity::Error };

    for site in &collected.sites {
        if admitted.contains_bounded(&site.thrown, bounds, table) {
            continue;
        }

        if admitted.is_empty() {
            sink.push(Diagnostic::new(
                severity,
                DiagnosticCode::EmptyClauseViolation,
                format!(
                    "function '{}' declares an empty throws clause but may propagate {} ({})",
                    name,
                    table.display(&site.thrown),
                    site.describe_origin(),
                ),
                site.span,
            ));
            continue;
        }

        if site.thrown.is_opaque() {
            // Unknown, assumed safe: distinguishable from "provably safe"
            // but never escalated to an error.
            sink.push(Diagnostic::note(
                DiagnosticCode::OpaqueEscape,
                format!(
                    "an escape in function '{}' has no determinable type and cannot \
                     be verified against its throws clause ({})",
                    name,
                    site.describe_origin(),
                ),
                site.span,
            ));
            continue;
        }

        sink.push(Diagnostic::new(
            severity,
            DiagnosticCode::UndeclaredException,
            format!(
                "function '{}' may propagate {}, which is not declared in its \
                 throws clause ({})",
                name,
                table.display(&site.thrown),
                site.describe_origin(),
            ),
            site.span,
        ));
    }
}
