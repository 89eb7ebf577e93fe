//! Public API for checking source text.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Severity};
use crate::options::CheckOptions;
use crate::pipeline::run_check;

/// An inferred effective clause, for advisory display only. No author
/// contract exists to violate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredClause {
    pub function: String,
    pub clause: String,
}

/// Everything one check run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Sorted by source position.
    pub diagnostics: Vec<Diagnostic>,
    /// Effective clauses of unconstrained callables, when inference is on.
    pub inferred: Vec<InferredClause>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Machine-readable rendering of the report.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Check source text with default options.
pub fn check_source(source: &str) -> CheckReport {
    run_check(source, CheckOptions::default())
}

/// Check source text with explicit options.
pub fn check_source_with_options(source: &str, options: CheckOptions) -> CheckReport {
    run_check(source, options)
}
