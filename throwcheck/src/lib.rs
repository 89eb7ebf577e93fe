//! Static throws-clause checking for a small function language.
//!
//! A callable signature may declare the exception types it can propagate
//! (`throws TypeError, RangeError`), promise silence (bare `throws`), or
//! say nothing and have an effective clause inferred. This crate collects,
//! per callable body, the set of types that can escape it — honoring
//! catch/rethrow scoping and call-graph propagation with fixed-point
//! iteration over recursion — and checks collected propagation against
//! declared clauses. Analysis only: diagnostics, never runtime behavior.
//!
//! # Example
//!
//! ```
//! use throwcheck::check_source;
//!
//! let report = check_source(
//!     "function f()::Int throws TypeError\n    throw(RangeError())\nend",
//! );
//! assert!(report.has_errors());
//! ```

// Core modules
pub mod analysis;
pub mod diagnostics;
pub mod options;
pub mod types;

// Pipeline: parse, declare, analyze
pub mod pipeline;

// Rust API for programmatic use
pub mod api;
pub use api::{check_source, check_source_with_options, CheckReport, InferredClause};

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
pub use options::CheckOptions;
pub use types::{
    Bindings, ConditionalThrows, ExceptionSet, ExceptionType, ThrowsClause, TypeId, TypeTable,
};

// Re-export the front end so downstream users need only one dependency.
pub use throwcheck_parser as parser;
